use futures::executor::block_on;
use spark_query::ordering::Direction;
use spark_query::{AsyncSequence, Cancellation, KeyComparer, KeySelector, ops};

use crate::case::{TckCase, TckSuite};
use crate::fixtures::MatrixElement;
use crate::harness::{self, AdapterFactory, Shape};
use crate::matrix::matrix_cases;
use crate::order_by::verify_ordering;

const CASES: &[TckCase] = matrix_cases![
    sync_selector,
    await_selector,
    cancellable_selector,
    sync_selector_with_comparer,
    await_selector_with_comparer,
    cancellable_selector_with_comparer,
    null_source,
    null_selector,
    null_comparer,
    cancelled,
];

const SUITE: TckSuite = TckSuite {
    name: "order_by_descending",
    cases: CASES,
};

/// 返回 `OrderByDescending` 套件。
pub const fn suite() -> &'static TckSuite {
    &SUITE
}

fn sync_selector<T: MatrixElement>(factory: &dyn AdapterFactory) {
    verify_ordering::<T>(factory, Direction::Descending, Shape::Sync, false);
}

fn await_selector<T: MatrixElement>(factory: &dyn AdapterFactory) {
    verify_ordering::<T>(factory, Direction::Descending, Shape::Await, false);
}

fn cancellable_selector<T: MatrixElement>(factory: &dyn AdapterFactory) {
    verify_ordering::<T>(factory, Direction::Descending, Shape::AwaitWithCancellation, false);
}

fn sync_selector_with_comparer<T: MatrixElement>(factory: &dyn AdapterFactory) {
    verify_ordering::<T>(factory, Direction::Descending, Shape::Sync, true);
}

fn await_selector_with_comparer<T: MatrixElement>(factory: &dyn AdapterFactory) {
    verify_ordering::<T>(factory, Direction::Descending, Shape::Await, true);
}

fn cancellable_selector_with_comparer<T: MatrixElement>(factory: &dyn AdapterFactory) {
    verify_ordering::<T>(factory, Direction::Descending, Shape::AwaitWithCancellation, true);
}

fn null_source<T: MatrixElement>(_factory: &dyn AdapterFactory) {
    for shape in Shape::ALL {
        let result = ops::order_by_descending::<T, T>(None, Some(harness::shifted_selector(shape)));
        harness::assert_argument_null(result, ops::SOURCE);

        let result = ops::order_by_descending_with_comparer::<T, T>(
            None,
            Some(harness::shifted_selector(shape)),
            Some(KeyComparer::default()),
        );
        harness::assert_argument_null(result, ops::SOURCE);
    }
}

fn null_selector<T: MatrixElement>(factory: &dyn AdapterFactory) {
    let view = block_on(harness::arrange::<T>(factory));
    for result in [
        ops::order_by_descending::<T, T>(Some(&view), None),
        ops::order_by_descending_with_comparer(
            Some(&view),
            None::<KeySelector<T, T>>,
            Some(KeyComparer::default()),
        ),
    ] {
        harness::assert_argument_null(result, ops::KEY_SELECTOR);
    }
}

/// 显式比较器重载不接受缺失的比较器。
fn null_comparer<T: MatrixElement>(factory: &dyn AdapterFactory) {
    let view = block_on(harness::arrange::<T>(factory));
    let result = ops::order_by_descending_with_comparer::<T, T>(
        Some(&view),
        Some(harness::shifted_selector(Shape::Sync)),
        None,
    );
    harness::assert_argument_null(result, ops::COMPARER);
}

fn cancelled<T: MatrixElement>(factory: &dyn AdapterFactory) {
    block_on(async {
        let view = harness::arrange::<T>(factory).await;
        let token = Cancellation::cancelled();
        for shape in Shape::ALL {
            let ordered = harness::expect_ok(ops::order_by_descending(
                Some(&view),
                Some(harness::shifted_selector::<T>(shape)),
            ));
            harness::assert_cancelled(ordered.to_list(&token).await);

            let ordered = harness::expect_ok(ops::order_by_descending_with_comparer(
                Some(&view),
                Some(harness::shifted_selector::<T>(shape)),
                Some(KeyComparer::<T>::default().reversed()),
            ));
            harness::assert_cancelled(ordered.to_list(&token).await);
        }
    });
}

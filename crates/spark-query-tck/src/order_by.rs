use std::cmp::Ordering;

use futures::executor::block_on;
use spark_query::ordering::Direction;
use spark_query::{AsyncSequence, Cancellation, KeyComparer, KeySelector, ops};

use crate::case::{TckCase, TckSuite};
use crate::fixtures::MatrixElement;
use crate::harness::{self, AdapterFactory, Shape};
use crate::matrix::matrix_cases;
use crate::reference;

const CASES: &[TckCase] = matrix_cases![
    sync_selector,
    await_selector,
    cancellable_selector,
    sync_selector_with_comparer,
    await_selector_with_comparer,
    cancellable_selector_with_comparer,
    null_source,
    null_selector,
    cancelled,
];

const SUITE: TckSuite = TckSuite {
    name: "order_by",
    cases: CASES,
};

/// 返回 `OrderBy` 套件。
pub const fn suite() -> &'static TckSuite {
    &SUITE
}

fn by_magnitude<T: MatrixElement>(left: &T, right: &T) -> Ordering {
    left.magnitude().value_cmp(&right.magnitude())
}

/// 以 `+3` 为键排序，并与同步参考逐元素比对。
///
/// # 教案式说明
/// - **意图 (Why)**：升序与降序两个套件共享同一套比对流程，区别只在方向；
/// - **逻辑 (How)**：`with_comparer` 为真时使用“按绝对值”比较器，基线中的正负对称值因此成为等键，
///   稳定性与比较器是否被遵守都会反映在结果顺序上；
/// - **契约 (What)**：结果必须与 `reference::order_by*` 完全一致，包括等键元素的相对顺序。
pub(crate) fn verify_ordering<T: MatrixElement>(
    factory: &dyn AdapterFactory,
    direction: Direction,
    shape: Shape,
    with_comparer: bool,
) {
    block_on(async {
        let view = harness::arrange::<T>(factory).await;
        let baseline = T::baseline();
        let selector = harness::shifted_selector::<T>(shape);
        let compare: fn(&T, &T) -> Ordering = if with_comparer {
            by_magnitude::<T>
        } else {
            T::value_cmp
        };

        let (expected, ordered) = match direction {
            Direction::Ascending => (
                reference::order_by(&baseline, T::shifted, compare),
                if with_comparer {
                    ops::order_by_with_comparer(
                        Some(&view),
                        Some(selector),
                        Some(KeyComparer::new(compare)),
                    )
                } else {
                    ops::order_by(Some(&view), Some(selector))
                },
            ),
            Direction::Descending => (
                reference::order_by_descending(&baseline, T::shifted, compare),
                if with_comparer {
                    ops::order_by_descending_with_comparer(
                        Some(&view),
                        Some(selector),
                        Some(KeyComparer::new(compare)),
                    )
                } else {
                    ops::order_by_descending(Some(&view), Some(selector))
                },
            ),
        };
        let ordered = harness::expect_ok(ordered);
        let actual = harness::expect_ok(ordered.to_list(&Cancellation::new()).await);
        harness::assert_equivalent(&actual, &expected);
    });
}

fn sync_selector<T: MatrixElement>(factory: &dyn AdapterFactory) {
    verify_ordering::<T>(factory, Direction::Ascending, Shape::Sync, false);
}

fn await_selector<T: MatrixElement>(factory: &dyn AdapterFactory) {
    verify_ordering::<T>(factory, Direction::Ascending, Shape::Await, false);
}

fn cancellable_selector<T: MatrixElement>(factory: &dyn AdapterFactory) {
    verify_ordering::<T>(factory, Direction::Ascending, Shape::AwaitWithCancellation, false);
}

fn sync_selector_with_comparer<T: MatrixElement>(factory: &dyn AdapterFactory) {
    verify_ordering::<T>(factory, Direction::Ascending, Shape::Sync, true);
}

fn await_selector_with_comparer<T: MatrixElement>(factory: &dyn AdapterFactory) {
    verify_ordering::<T>(factory, Direction::Ascending, Shape::Await, true);
}

fn cancellable_selector_with_comparer<T: MatrixElement>(factory: &dyn AdapterFactory) {
    verify_ordering::<T>(factory, Direction::Ascending, Shape::AwaitWithCancellation, true);
}

fn null_source<T: MatrixElement>(_factory: &dyn AdapterFactory) {
    for shape in Shape::ALL {
        let result = ops::order_by::<T, T>(None, Some(harness::shifted_selector(shape)));
        harness::assert_argument_null(result, ops::SOURCE);

        let result = ops::order_by_with_comparer::<T, T>(
            None,
            Some(harness::shifted_selector(shape)),
            Some(KeyComparer::new(by_magnitude::<T>)),
        );
        harness::assert_argument_null(result, ops::SOURCE);
    }
}

fn null_selector<T: MatrixElement>(factory: &dyn AdapterFactory) {
    let view = block_on(harness::arrange::<T>(factory));
    let result = ops::order_by::<T, T>(Some(&view), None::<KeySelector<T, T>>);
    harness::assert_argument_null(result, ops::KEY_SELECTOR);
}

fn cancelled<T: MatrixElement>(factory: &dyn AdapterFactory) {
    block_on(async {
        let view = harness::arrange::<T>(factory).await;
        let token = Cancellation::cancelled();
        for shape in Shape::ALL {
            let selector = harness::shifted_selector::<T>(shape);
            let ordered = harness::expect_ok(ops::order_by(Some(&view), Some(selector)));
            harness::assert_cancelled(ordered.to_list(&token).await);

            let ordered = harness::expect_ok(ops::order_by_with_comparer(
                Some(&view),
                Some(harness::shifted_selector::<T>(shape)),
                Some(KeyComparer::new(by_magnitude::<T>)),
            ));
            harness::assert_cancelled(ordered.to_list(&token).await);
        }
    });
}

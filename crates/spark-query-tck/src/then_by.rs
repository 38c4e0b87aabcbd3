//! `ThenBy` / `ThenByDescending`：主键按绝对值升序，次级键为元素本身。
//!
//! 基线中的正负对称值（如 `3` 与 `-3`）以及可空类型的多个 `None` 在主键上相等，
//! 次级键的方向与形态因此直接决定结果顺序。

use futures::executor::block_on;
use spark_query::{AsyncQueryable, AsyncSequence, Cancellation, KeyComparer, KeySelector, ops};

use crate::case::{TckCase, TckSuite};
use crate::fixtures::MatrixElement;
use crate::harness::{self, AdapterFactory, Shape};
use crate::matrix::matrix_cases;
use crate::reference;

const CASES: &[TckCase] = matrix_cases![
    sync_secondary,
    await_secondary,
    cancellable_secondary,
    sync_secondary_descending,
    await_secondary_descending,
    cancellable_secondary_descending,
    reversed_comparer_matches_descending,
    null_source,
    null_selector,
    cancelled,
];

const SUITE: TckSuite = TckSuite {
    name: "then_by",
    cases: CASES,
};

/// 返回 `ThenBy` 套件。
pub const fn suite() -> &'static TckSuite {
    &SUITE
}

fn identity<T: Clone>(item: &T) -> T {
    item.clone()
}

fn primary<T: MatrixElement>(view: &AsyncQueryable<T>) -> spark_query::OrderedAsyncQueryable<T> {
    view.order_by(KeySelector::sync(T::magnitude))
}

fn verify_secondary<T: MatrixElement>(
    factory: &dyn AdapterFactory,
    shape: Shape,
    descending: bool,
) {
    block_on(async {
        let view = harness::arrange::<T>(factory).await;
        let baseline = T::baseline();
        let expected = reference::then_by(&baseline, T::magnitude, identity::<T>, descending);

        let ordered = primary(&view);
        let selector = shape.selector(identity::<T>);
        let ordered = harness::expect_ok(if descending {
            ops::then_by_descending(Some(&ordered), Some(selector))
        } else {
            ops::then_by(Some(&ordered), Some(selector))
        });
        assert_eq!(ordered.sort_key_count(), 2);

        let actual = harness::expect_ok(ordered.to_list(&Cancellation::new()).await);
        harness::assert_equivalent(&actual, &expected);
    });
}

fn sync_secondary<T: MatrixElement>(factory: &dyn AdapterFactory) {
    verify_secondary::<T>(factory, Shape::Sync, false);
}

fn await_secondary<T: MatrixElement>(factory: &dyn AdapterFactory) {
    verify_secondary::<T>(factory, Shape::Await, false);
}

fn cancellable_secondary<T: MatrixElement>(factory: &dyn AdapterFactory) {
    verify_secondary::<T>(factory, Shape::AwaitWithCancellation, false);
}

fn sync_secondary_descending<T: MatrixElement>(factory: &dyn AdapterFactory) {
    verify_secondary::<T>(factory, Shape::Sync, true);
}

fn await_secondary_descending<T: MatrixElement>(factory: &dyn AdapterFactory) {
    verify_secondary::<T>(factory, Shape::Await, true);
}

fn cancellable_secondary_descending<T: MatrixElement>(factory: &dyn AdapterFactory) {
    verify_secondary::<T>(factory, Shape::AwaitWithCancellation, true);
}

/// 升序 + 反向比较器与 `ThenByDescending` 结果相同。
fn reversed_comparer_matches_descending<T: MatrixElement>(factory: &dyn AdapterFactory) {
    block_on(async {
        let view = harness::arrange::<T>(factory).await;
        let baseline = T::baseline();
        let expected = reference::then_by(&baseline, T::magnitude, identity::<T>, true);

        let ordered = harness::expect_ok(ops::then_by_with_comparer(
            Some(&primary(&view)),
            Some(KeySelector::sync(identity::<T>)),
            Some(KeyComparer::<T>::default().reversed()),
        ));
        let actual = harness::expect_ok(ordered.to_list(&Cancellation::new()).await);
        harness::assert_equivalent(&actual, &expected);
    });
}

/// 四个 `ThenBy*` 重载都拒绝缺失的有序来源。
fn null_source<T: MatrixElement>(_factory: &dyn AdapterFactory) {
    for shape in Shape::ALL {
        let results = [
            ops::then_by::<T, T>(None, Some(shape.selector(identity::<T>))),
            ops::then_by_descending::<T, T>(None, Some(shape.selector(identity::<T>))),
            ops::then_by_with_comparer::<T, T>(
                None,
                Some(shape.selector(identity::<T>)),
                Some(KeyComparer::default()),
            ),
            ops::then_by_descending_with_comparer::<T, T>(
                None,
                Some(shape.selector(identity::<T>)),
                Some(KeyComparer::default()),
            ),
        ];
        for result in results {
            harness::assert_argument_null(result, ops::SOURCE);
        }
    }
}

fn null_selector<T: MatrixElement>(factory: &dyn AdapterFactory) {
    let view = block_on(harness::arrange::<T>(factory));
    let ordered = primary(&view);
    harness::assert_argument_null(
        ops::then_by_descending::<T, T>(Some(&ordered), None),
        ops::KEY_SELECTOR,
    );
    harness::assert_argument_null(
        ops::then_by_with_comparer::<T, T>(Some(&ordered), None, Some(KeyComparer::default())),
        ops::KEY_SELECTOR,
    );
}

fn cancelled<T: MatrixElement>(factory: &dyn AdapterFactory) {
    block_on(async {
        let view = harness::arrange::<T>(factory).await;
        let ordered = primary(&view);
        let token = Cancellation::cancelled();
        for shape in Shape::ALL {
            let chained = [
                ops::then_by(Some(&ordered), Some(shape.selector(identity::<T>))),
                ops::then_by_descending(Some(&ordered), Some(shape.selector(identity::<T>))),
                ops::then_by_with_comparer(
                    Some(&ordered),
                    Some(shape.selector(identity::<T>)),
                    Some(KeyComparer::<T>::default().reversed()),
                ),
                ops::then_by_descending_with_comparer(
                    Some(&ordered),
                    Some(shape.selector(identity::<T>)),
                    Some(KeyComparer::default()),
                ),
            ];
            for chained in chained {
                let chained = harness::expect_ok(chained);
                harness::assert_cancelled(chained.to_list(&token).await);
            }
        }
    });
}

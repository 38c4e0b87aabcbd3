use futures::executor::block_on;
use spark_query::{Cancellation, ValueEquality, ops};

use crate::case::{TckCase, TckSuite};
use crate::fixtures::MatrixElement;
use crate::harness::{self, AdapterFactory};
use crate::matrix::matrix_cases;
use crate::reference;

const CASES: &[TckCase] = matrix_cases![
    probe_present,
    probe_absent,
    magnitude_comparer,
    missing_comparer_uses_default,
    null_source,
    cancelled,
];

const SUITE: TckSuite = TckSuite {
    name: "contains",
    cases: CASES,
};

/// 返回 `Contains` 套件。
pub const fn suite() -> &'static TckSuite {
    &SUITE
}

/// 基线中存在的值：异步结果与参考结果一致，且为 `true`。
fn probe_present<T: MatrixElement>(factory: &dyn AdapterFactory) {
    block_on(async {
        let view = harness::arrange::<T>(factory).await;
        let baseline = T::baseline();
        let probe = T::probe();

        let expected = reference::contains(&baseline, &probe);
        let actual = harness::expect_ok(
            ops::contains_async(Some(&view), probe, &Cancellation::new()).await,
        );
        assert_eq!(actual, expected);
        assert!(actual, "基线包含探针值 5");
    });
}

/// 基线中不存在的值。
fn probe_absent<T: MatrixElement>(factory: &dyn AdapterFactory) {
    block_on(async {
        let view = harness::arrange::<T>(factory).await;
        let baseline = T::baseline();
        let absent = T::absent();

        let expected = reference::contains(&baseline, &absent);
        let actual = harness::expect_ok(view.contains(absent).await);
        assert_eq!(actual, expected);
        assert!(!actual);
    });
}

/// 显式比较器必须被遵守：按绝对值比较时 7 与基线中的 -7 相等。
fn magnitude_comparer<T: MatrixElement>(factory: &dyn AdapterFactory) {
    block_on(async {
        let view = harness::arrange::<T>(factory).await;
        let baseline = T::baseline();
        let value = T::sample(7);
        let by_magnitude = |a: &T, b: &T| a.magnitude().value_eq(&b.magnitude());

        let expected = reference::contains_by(&baseline, &value, by_magnitude);
        let actual = harness::expect_ok(
            ops::contains_with_comparer_async(
                Some(&view),
                value.clone(),
                Some(ValueEquality::new(by_magnitude)),
                &Cancellation::new(),
            )
            .await,
        );
        assert_eq!(actual, expected);
        assert!(actual);
        assert!(
            !reference::contains(&baseline, &value),
            "默认语义下 7 不在基线中，否则本用例无法区分比较器是否生效"
        );
    });
}

/// 比较器缺失时回退到默认相等语义。
fn missing_comparer_uses_default<T: MatrixElement>(factory: &dyn AdapterFactory) {
    block_on(async {
        let view = harness::arrange::<T>(factory).await;
        let baseline = T::baseline();
        for value in [T::probe(), T::sample(7)] {
            let expected = reference::contains(&baseline, &value);
            let actual = harness::expect_ok(
                ops::contains_with_comparer_async(Some(&view), value, None, &Cancellation::new())
                    .await,
            );
            assert_eq!(actual, expected);
        }
    });
}

fn same_magnitude<T: MatrixElement>() -> ValueEquality<T> {
    ValueEquality::new(|a: &T, b: &T| a.magnitude().value_eq(&b.magnitude()))
}

/// 每个重载都拒绝缺失的来源，比较器存在与否不影响校验顺序。
fn null_source<T: MatrixElement>(_factory: &dyn AdapterFactory) {
    block_on(async {
        let token = Cancellation::new();
        let result = ops::contains_async::<T>(None, T::probe(), &token).await;
        harness::assert_argument_null(result, ops::SOURCE);

        for comparer in [Some(same_magnitude::<T>()), None] {
            let result =
                ops::contains_with_comparer_async::<T>(None, T::probe(), comparer, &token).await;
            harness::assert_argument_null(result, ops::SOURCE);
        }
    });
}

/// 预先取消的令牌让所有重载失败，包括不会下推的显式比较器路径。
fn cancelled<T: MatrixElement>(factory: &dyn AdapterFactory) {
    block_on(async {
        let view = harness::arrange::<T>(factory).await;
        let token = Cancellation::cancelled();

        harness::assert_cancelled(ops::contains_async(Some(&view), T::probe(), &token).await);
        harness::assert_cancelled(
            ops::contains_with_comparer_async(
                Some(&view),
                T::probe(),
                Some(same_magnitude::<T>()),
                &token,
            )
            .await,
        );
        harness::assert_cancelled(
            view.contains_by(T::probe(), same_magnitude::<T>(), &token).await,
        );
    });
}

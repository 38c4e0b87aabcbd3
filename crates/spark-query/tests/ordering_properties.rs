//! 排序性质：任意输入下，异步排序与标准库稳定排序逐元素一致。
//!
//! # 教案级说明
//! - **意图 (Why)**：固定样例只能覆盖少量等键分布，使用 proptest 随机生成输入以覆盖重复键、空值与长度为零的序列；
//! - **手法 (How)**：键选择器取模制造大量等键，再以 `slice::sort_by`（稳定）计算期望结果；
//! - **契约 (What)**：升序、降序、次级键三种组合都必须与参考结果完全相同。

use futures::executor::block_on;
use proptest::prelude::*;
use spark_query::prelude::*;

fn view_of<T: QueryValue>(items: Vec<T>) -> AsyncQueryable<T> {
    AsyncQueryable::from_source(MemorySource::new(items))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn ascending_matches_stable_reference(items in proptest::collection::vec(-50i32..50, 0..64)) {
        let mut expected = items.clone();
        expected.sort_by_key(|p| p.rem_euclid(7));

        let actual = block_on(
            view_of(items)
                .order_by(KeySelector::sync(|p: &i32| p.rem_euclid(7)))
                .to_list(&Cancellation::new()),
        );
        prop_assert_eq!(actual.ok(), Some(expected));
    }

    #[test]
    fn descending_nullable_matches_stable_reference(
        items in proptest::collection::vec(proptest::option::of(-20i64..20), 0..64),
    ) {
        let key = |p: &Option<i64>| p.map(|v| v / 4);
        let mut expected = items.clone();
        expected.sort_by(|a, b| key(b).value_cmp(&key(a)));

        let actual = block_on(
            view_of(items)
                .order_by_descending(KeySelector::awaitable(move |p: &Option<i64>| {
                    let k = key(p);
                    async move { k }
                }))
                .to_list(&Cancellation::new()),
        );
        prop_assert_eq!(actual.ok(), Some(expected));
    }

    #[test]
    fn then_by_matches_lexicographic_reference(items in proptest::collection::vec(-30i64..30, 0..48)) {
        let mut expected = items.clone();
        expected.sort_by(|a, b| a.rem_euclid(3).cmp(&b.rem_euclid(3)).then(b.cmp(a)));

        let actual = block_on(
            view_of(items)
                .order_by(KeySelector::sync(|p: &i64| p.rem_euclid(3)))
                .then_by_descending(KeySelector::cancellable(|p: &i64, _token| {
                    let k = *p;
                    async move { k }
                }))
                .to_list(&Cancellation::new()),
        );
        prop_assert_eq!(actual.ok(), Some(expected));
    }
}

//! 同步参考实现：等价性断言的准绳。
//!
//! 只使用标准库迭代器与稳定的 `slice::sort_by`，不依赖适配层的任何执行路径。

use std::cmp::Ordering;

use spark_query::QueryValue;

/// `Contains`，默认相等语义。
pub fn contains<T: QueryValue>(baseline: &[T], value: &T) -> bool {
    baseline.iter().any(|item| item.value_eq(value))
}

/// `Contains`，显式相等比较器，以 `(元素, 目标值)` 顺序调用。
pub fn contains_by<T>(baseline: &[T], value: &T, equals: impl Fn(&T, &T) -> bool) -> bool {
    baseline.iter().any(|item| equals(item, value))
}

/// 稳定排序，比较器作用于元素本身。
pub fn sort_stable<T: Clone>(baseline: &[T], compare: impl Fn(&T, &T) -> Ordering) -> Vec<T> {
    let mut sorted = baseline.to_vec();
    sorted.sort_by(|left, right| compare(left, right));
    sorted
}

/// `OrderBy`：按键升序。
pub fn order_by<T: Clone, K>(
    baseline: &[T],
    key: impl Fn(&T) -> K,
    compare: impl Fn(&K, &K) -> Ordering,
) -> Vec<T> {
    sort_stable(baseline, |left, right| compare(&key(left), &key(right)))
}

/// `OrderByDescending`：按键降序，等键保持输入顺序。
pub fn order_by_descending<T: Clone, K>(
    baseline: &[T],
    key: impl Fn(&T) -> K,
    compare: impl Fn(&K, &K) -> Ordering,
) -> Vec<T> {
    sort_stable(baseline, |left, right| compare(&key(right), &key(left)))
}

/// `OrderBy(primary).ThenBy(secondary)`，两级键均使用默认比较器。
pub fn then_by<T: Clone, P: QueryValue, S: QueryValue>(
    baseline: &[T],
    primary: impl Fn(&T) -> P,
    secondary: impl Fn(&T) -> S,
    secondary_descending: bool,
) -> Vec<T> {
    sort_stable(baseline, |left, right| {
        primary(left)
            .value_cmp(&primary(right))
            .then_with(|| {
                let ordering = secondary(left).value_cmp(&secondary(right));
                if secondary_descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descending_keeps_ties_in_input_order() {
        let items = [(1, 'a'), (2, 'b'), (1, 'c')];
        let sorted = order_by_descending(&items, |p| p.0, |a: &i32, b: &i32| a.cmp(b));
        assert_eq!(sorted, vec![(2, 'b'), (1, 'a'), (1, 'c')]);
    }

    #[test]
    fn nulls_sort_first_with_default_comparer() {
        let items = [Some(3), None, Some(-1)];
        let sorted = order_by(&items, |p: &Option<i32>| p.map(|v| v + 3), QueryValue::value_cmp);
        assert_eq!(sorted, vec![None, Some(-1), Some(3)]);
    }
}

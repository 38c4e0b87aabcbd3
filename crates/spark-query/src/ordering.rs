//! 稳定多键排序引擎。
//!
//! # 教案式说明
//! - **意图 (Why)**：`OrderBy` / `OrderByDescending` / `ThenBy` 的结果必须与同步参考实现逐元素一致，
//!   这要求：稳定排序（等键保持输入顺序）、降序同样稳定、次级键只在前序键相等时生效；
//! - **逻辑 (How)**：
//!   1. 每个排序子句先对全部元素求键，得到一列“键列”（类型擦除为 [`KeyColumn`]）；
//!   2. 对下标数组执行 `slice::sort_by`（稳定排序），比较时依次询问各键列，遇到非 `Equal` 即返回；
//!   3. 按排好序的下标重排元素；
//! - **契约 (What)**：每次键求值之后都检查取消信号，取消时返回 [`QueryError::Cancelled`](crate::QueryError::Cancelled)，
//!   不产出部分结果；
//! - **设计取舍 (Trade-offs)**：先求完全部键再排序，使异步选择器的求值次数恰为元素个数，
//!   代价是需要额外一列键的存储。

use std::cmp::Ordering;

use crate::cancellation::Cancellation;
use crate::error::Result;
use crate::future::BoxFuture;
use crate::selector::{KeyComparer, KeySelector};

/// 排序方向。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// 已求值的键列。
pub(crate) trait KeyColumn: Send {
    /// 比较第 `left` 与第 `right` 个元素的键（已考虑方向）。
    fn compare(&self, left: usize, right: usize) -> Ordering;
}

/// 类型擦除的排序子句。
pub(crate) trait SortClause<T>: Send + Sync {
    /// 对全部元素求键，返回键列。
    fn evaluate<'a>(
        &'a self,
        items: &'a [T],
        cancellation: &'a Cancellation,
    ) -> BoxFuture<'a, Result<Box<dyn KeyColumn>>>;

    /// 选择器的重载形态名称。
    fn shape(&self) -> &'static str;

    fn direction(&self) -> Direction;
}

pub(crate) struct TypedClause<T, K> {
    selector: KeySelector<T, K>,
    comparer: KeyComparer<K>,
    direction: Direction,
}

impl<T, K> TypedClause<T, K> {
    pub(crate) fn new(
        selector: KeySelector<T, K>,
        comparer: KeyComparer<K>,
        direction: Direction,
    ) -> Self {
        Self {
            selector,
            comparer,
            direction,
        }
    }
}

struct TypedColumn<K> {
    keys: Vec<K>,
    comparer: KeyComparer<K>,
    direction: Direction,
}

impl<K: Send + Sync + 'static> KeyColumn for TypedColumn<K> {
    fn compare(&self, left: usize, right: usize) -> Ordering {
        match self.direction {
            Direction::Ascending => self.comparer.compare(&self.keys[left], &self.keys[right]),
            Direction::Descending => self.comparer.compare(&self.keys[right], &self.keys[left]),
        }
    }
}

impl<T, K> SortClause<T> for TypedClause<T, K>
where
    T: Send + Sync + 'static,
    K: Send + Sync + 'static,
{
    fn evaluate<'a>(
        &'a self,
        items: &'a [T],
        cancellation: &'a Cancellation,
    ) -> BoxFuture<'a, Result<Box<dyn KeyColumn>>> {
        Box::pin(async move {
            let mut keys = Vec::with_capacity(items.len());
            for item in items {
                let key = self.selector.select(item, cancellation).await;
                cancellation.check()?;
                keys.push(key);
            }
            Ok(Box::new(TypedColumn {
                keys,
                comparer: self.comparer.clone(),
                direction: self.direction,
            }) as Box<dyn KeyColumn>)
        })
    }

    fn shape(&self) -> &'static str {
        self.selector.shape()
    }

    fn direction(&self) -> Direction {
        self.direction
    }
}

/// 依次求出全部子句的键列，并返回稳定排序后的元素。
pub(crate) async fn sort_items<T>(
    items: Vec<T>,
    clauses: &[std::sync::Arc<dyn SortClause<T>>],
    cancellation: &Cancellation,
) -> Result<Vec<T>> {
    let mut columns = Vec::with_capacity(clauses.len());
    for clause in clauses {
        columns.push(clause.evaluate(&items, cancellation).await?);
    }
    let order = stable_order(items.len(), &columns);
    cancellation.check()?;
    Ok(permute(items, &order))
}

/// 计算稳定排序后的下标序列。
fn stable_order(len: usize, columns: &[Box<dyn KeyColumn>]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    order.sort_by(|&left, &right| {
        columns
            .iter()
            .map(|column| column.compare(left, right))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
    order
}

fn permute<T>(items: Vec<T>, order: &[usize]) -> Vec<T> {
    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    order
        .iter()
        .filter_map(|&index| slots.get_mut(index).and_then(Option::take))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::QueryValue;
    use futures::executor::block_on;
    use std::sync::Arc;

    fn clause<K: QueryValue>(
        selector: KeySelector<(i32, char), K>,
        direction: Direction,
    ) -> Arc<dyn SortClause<(i32, char)>> {
        Arc::new(TypedClause::new(selector, KeyComparer::default(), direction))
    }

    #[test]
    fn equal_keys_keep_input_order_in_both_directions() {
        let items = vec![(2, 'a'), (1, 'b'), (2, 'c'), (1, 'd')];
        let token = Cancellation::new();

        let ascending = block_on(sort_items(
            items.clone(),
            &[clause(KeySelector::sync(|p: &(i32, char)| p.0), Direction::Ascending)],
            &token,
        ))
        .expect("排序不应失败");
        assert_eq!(ascending, vec![(1, 'b'), (1, 'd'), (2, 'a'), (2, 'c')]);

        let descending = block_on(sort_items(
            items,
            &[clause(KeySelector::sync(|p: &(i32, char)| p.0), Direction::Descending)],
            &token,
        ))
        .expect("排序不应失败");
        assert_eq!(descending, vec![(2, 'a'), (2, 'c'), (1, 'b'), (1, 'd')]);
    }

    #[test]
    fn secondary_key_breaks_ties_only() {
        let items = vec![(2, 'z'), (1, 'y'), (2, 'a'), (1, 'b')];
        let token = Cancellation::new();
        let sorted = block_on(sort_items(
            items,
            &[
                clause(KeySelector::sync(|p: &(i32, char)| p.0), Direction::Ascending),
                clause(
                    KeySelector::sync(|p: &(i32, char)| i64::from(u32::from(p.1))),
                    Direction::Descending,
                ),
            ],
            &token,
        ))
        .expect("排序不应失败");
        assert_eq!(sorted, vec![(1, 'y'), (1, 'b'), (2, 'z'), (2, 'a')]);
    }

    #[test]
    fn cancellation_during_key_evaluation_yields_no_result() {
        let token = Cancellation::new();
        let caller = token.clone();
        let selector = KeySelector::cancellable(move |p: &(i32, char), _child: Cancellation| {
            let key = p.0;
            let caller = caller.clone();
            async move {
                if key == 1 {
                    caller.cancel();
                }
                key
            }
        });
        let result = block_on(sort_items(
            vec![(3, 'a'), (1, 'b'), (2, 'c')],
            &[clause(selector, Direction::Ascending)],
            &token,
        ));
        assert!(matches!(result, Err(crate::QueryError::Cancelled)));
    }

    #[test]
    fn no_clauses_preserve_order() {
        let token = Cancellation::new();
        let sorted = block_on(sort_items(vec![(3, 'c'), (1, 'a')], &[], &token)).expect("不应失败");
        assert_eq!(sorted, vec![(3, 'c'), (1, 'a')]);
    }
}

//! 带参数校验的算子入口。
//!
//! # 教案式说明
//! - **意图 (Why)**：查询往往由上层动态拼装（例如由配置或请求描述生成），来源与键选择器可能缺失。
//!   这些入口把“缺失参数”表达为 `None`，并在触达任何提供者之前返回 `query.argument_null`，
//!   让契约测试能够逐一验证空来源、空选择器、预先取消三类前置条件；
//! - **逻辑 (How)**：按“来源 → 键选择器 → 比较器”的顺序校验，全部通过后委托给 [`AsyncQueryable`]
//!   / [`OrderedAsyncQueryable`] 的方法；
//! - **契约 (What)**：
//!   - 排序类入口是同步函数，校验失败立即返回，不产生任何异步工作；
//!   - 终端入口是异步函数，校验位于第一次挂起之前，失败时不会扫描、不会等待；
//!   - 相等比较器缺失时回退到默认语义，与同步参考实现保持一致。

use crate::cancellation::Cancellation;
use crate::error::{QueryError, Result};
use crate::queryable::{AsyncQueryable, AsyncSequence, OrderedAsyncQueryable};
use crate::selector::{KeyComparer, KeySelector, ValueEquality};
use crate::value::QueryValue;

/// 来源参数名。
pub const SOURCE: &str = "source";
/// 键选择器参数名。
pub const KEY_SELECTOR: &str = "key_selector";
/// 比较器参数名。
pub const COMPARER: &str = "comparer";

fn require<T>(argument: Option<T>, name: &'static str) -> Result<T> {
    argument.ok_or_else(|| QueryError::argument_null(name))
}

/// `Contains`：以默认相等语义判断来源是否包含 `value`。
pub async fn contains_async<T: QueryValue>(
    source: Option<&AsyncQueryable<T>>,
    value: T,
    cancellation: &Cancellation,
) -> Result<bool> {
    let source = require(source, SOURCE)?;
    source.contains_with_cancellation(value, cancellation).await
}

/// `Contains`：带相等比较器的重载；比较器缺失时使用默认语义。
pub async fn contains_with_comparer_async<T: QueryValue>(
    source: Option<&AsyncQueryable<T>>,
    value: T,
    comparer: Option<ValueEquality<T>>,
    cancellation: &Cancellation,
) -> Result<bool> {
    let source = require(source, SOURCE)?;
    match comparer {
        Some(comparer) => source.contains_by(value, comparer, cancellation).await,
        None => source.contains_with_cancellation(value, cancellation).await,
    }
}

/// `OrderBy`：以默认比较器升序排序，选择器可为三种形态之一。
pub fn order_by<T: QueryValue, K: QueryValue>(
    source: Option<&AsyncQueryable<T>>,
    key_selector: Option<KeySelector<T, K>>,
) -> Result<OrderedAsyncQueryable<T>> {
    let source = require(source, SOURCE)?;
    let key_selector = require(key_selector, KEY_SELECTOR)?;
    Ok(source.order_by(key_selector))
}

/// `OrderBy`：带显式比较器的重载。
pub fn order_by_with_comparer<T, K>(
    source: Option<&AsyncQueryable<T>>,
    key_selector: Option<KeySelector<T, K>>,
    comparer: Option<KeyComparer<K>>,
) -> Result<OrderedAsyncQueryable<T>>
where
    T: QueryValue,
    K: Send + Sync + 'static,
{
    let source = require(source, SOURCE)?;
    let key_selector = require(key_selector, KEY_SELECTOR)?;
    let comparer = require(comparer, COMPARER)?;
    Ok(source.order_by_with_comparer(key_selector, comparer))
}

/// `OrderByDescending`：以默认比较器降序排序。
pub fn order_by_descending<T: QueryValue, K: QueryValue>(
    source: Option<&AsyncQueryable<T>>,
    key_selector: Option<KeySelector<T, K>>,
) -> Result<OrderedAsyncQueryable<T>> {
    let source = require(source, SOURCE)?;
    let key_selector = require(key_selector, KEY_SELECTOR)?;
    Ok(source.order_by_descending(key_selector))
}

/// `OrderByDescending`：带显式比较器的重载。
pub fn order_by_descending_with_comparer<T, K>(
    source: Option<&AsyncQueryable<T>>,
    key_selector: Option<KeySelector<T, K>>,
    comparer: Option<KeyComparer<K>>,
) -> Result<OrderedAsyncQueryable<T>>
where
    T: QueryValue,
    K: Send + Sync + 'static,
{
    let source = require(source, SOURCE)?;
    let key_selector = require(key_selector, KEY_SELECTOR)?;
    let comparer = require(comparer, COMPARER)?;
    Ok(source.order_by_descending_with_comparer(key_selector, comparer))
}

/// `ThenBy`：追加升序次级键。
pub fn then_by<T: QueryValue, K: QueryValue>(
    source: Option<&OrderedAsyncQueryable<T>>,
    key_selector: Option<KeySelector<T, K>>,
) -> Result<OrderedAsyncQueryable<T>> {
    let source = require(source, SOURCE)?;
    let key_selector = require(key_selector, KEY_SELECTOR)?;
    Ok(source.then_by(key_selector))
}

/// `ThenBy`：带显式比较器的重载。
pub fn then_by_with_comparer<T, K>(
    source: Option<&OrderedAsyncQueryable<T>>,
    key_selector: Option<KeySelector<T, K>>,
    comparer: Option<KeyComparer<K>>,
) -> Result<OrderedAsyncQueryable<T>>
where
    T: QueryValue,
    K: Send + Sync + 'static,
{
    let source = require(source, SOURCE)?;
    let key_selector = require(key_selector, KEY_SELECTOR)?;
    let comparer = require(comparer, COMPARER)?;
    Ok(source.then_by_with_comparer(key_selector, comparer))
}

/// `ThenByDescending`：追加降序次级键。
pub fn then_by_descending<T: QueryValue, K: QueryValue>(
    source: Option<&OrderedAsyncQueryable<T>>,
    key_selector: Option<KeySelector<T, K>>,
) -> Result<OrderedAsyncQueryable<T>> {
    let source = require(source, SOURCE)?;
    let key_selector = require(key_selector, KEY_SELECTOR)?;
    Ok(source.then_by_descending(key_selector))
}

/// `ThenByDescending`：带显式比较器的重载。
pub fn then_by_descending_with_comparer<T, K>(
    source: Option<&OrderedAsyncQueryable<T>>,
    key_selector: Option<KeySelector<T, K>>,
    comparer: Option<KeyComparer<K>>,
) -> Result<OrderedAsyncQueryable<T>>
where
    T: QueryValue,
    K: Send + Sync + 'static,
{
    let source = require(source, SOURCE)?;
    let key_selector = require(key_selector, KEY_SELECTOR)?;
    let comparer = require(comparer, COMPARER)?;
    Ok(source.then_by_descending_with_comparer(key_selector, comparer))
}

/// `ToList`：物化任意异步序列。
pub async fn to_list_async<T, S>(source: Option<&S>, cancellation: &Cancellation) -> Result<Vec<T>>
where
    T: QueryValue,
    S: AsyncSequence<T> + ?Sized,
{
    let source = require(source, SOURCE)?;
    source.to_list(cancellation).await
}

/// `Count`：统计任意异步序列的元素个数。
pub async fn count_async<T, S>(source: Option<&S>, cancellation: &Cancellation) -> Result<usize>
where
    T: QueryValue,
    S: AsyncSequence<T> + ?Sized,
{
    let source = require(source, SOURCE)?;
    source.count(cancellation).await
}

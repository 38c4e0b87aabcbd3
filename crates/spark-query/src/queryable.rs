//! 异步可查询视图。
//!
//! # 教案式说明
//! - **意图 (Why)**：调用方面向 [`AsyncQueryable`] 编写查询，不关心底层是内存集合还是数据库；
//!   排序类算子是惰性的，只记录子句，终端算子（`contains`、`to_list`、`count`）才真正触达提供者；
//! - **逻辑 (How)**：
//!   - 终端算子在触达提供者之前先检查取消信号；
//!   - 扫描期间每隔 `cancellation_check_interval` 个元素复查一次，并按 `materialization_limit` 控制物化规模；
//!   - 结束前再检查一次取消，确保“已取消”绝不伴随结果返回；
//! - **契约 (What)**：视图本身不可变，克隆成本为常数；排序算子返回新的 [`OrderedAsyncQueryable`]，
//!   原视图不受影响。

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use tracing::Instrument;

use crate::cancellation::Cancellation;
use crate::config::AdapterOptions;
use crate::error::{QueryError, Result};
use crate::observability::{SPAN_EXECUTE, TARGET, fields};
use crate::ordering::{self, Direction, SortClause, TypedClause};
use crate::selector::{KeyComparer, KeySelector, ValueEquality};
use crate::source::QuerySource;
use crate::value::QueryValue;

/// 可物化的异步序列。
///
/// [`AsyncQueryable`] 与 [`OrderedAsyncQueryable`] 均实现该 trait，
/// [`ops::to_list_async`](crate::ops::to_list_async) 等入口据此统一处理两种视图。
#[async_trait]
pub trait AsyncSequence<T: QueryValue>: Send + Sync {
    /// 物化全部元素。
    async fn to_list(&self, cancellation: &Cancellation) -> Result<Vec<T>>;

    /// 统计元素个数。
    async fn count(&self, cancellation: &Cancellation) -> Result<usize>;
}

/// 面向某一元素类型的异步可查询视图。
pub struct AsyncQueryable<T: QueryValue> {
    source: Arc<dyn QuerySource<T>>,
    options: Arc<AdapterOptions>,
}

impl<T: QueryValue> Clone for AsyncQueryable<T> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            options: Arc::clone(&self.options),
        }
    }
}

impl<T: QueryValue> fmt::Debug for AsyncQueryable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncQueryable")
            .field("element_type", &T::TYPE_NAME)
            .field("source", &self.source.name())
            .finish()
    }
}

impl<T: QueryValue> AsyncQueryable<T> {
    /// 以提供者与配置构造视图。
    pub fn new(source: Arc<dyn QuerySource<T>>, options: Arc<AdapterOptions>) -> Self {
        Self { source, options }
    }

    /// 直接包装单个提供者，使用默认配置。
    pub fn from_source(source: impl QuerySource<T>) -> Self {
        Self::new(Arc::new(source), Arc::new(AdapterOptions::default()))
    }

    /// 提供者名称。
    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// 当前生效的配置。
    pub fn options(&self) -> &AdapterOptions {
        &self.options
    }

    /// 以默认相等语义判断是否包含 `value`，使用一个永不取消的令牌。
    pub async fn contains(&self, value: T) -> Result<bool> {
        self.contains_with_cancellation(value, &Cancellation::new()).await
    }

    /// 以默认相等语义判断是否包含 `value`。
    ///
    /// 配置允许时优先尝试提供者下推，提供者不支持则回退到扫描。
    pub async fn contains_with_cancellation(
        &self,
        value: T,
        cancellation: &Cancellation,
    ) -> Result<bool> {
        self.run_contains(value, None, cancellation).await
    }

    /// 以显式相等比较器判断是否包含 `value`；显式比较器永不下推。
    pub async fn contains_by(
        &self,
        value: T,
        equality: ValueEquality<T>,
        cancellation: &Cancellation,
    ) -> Result<bool> {
        self.run_contains(value, Some(equality), cancellation).await
    }

    /// 以默认比较器按键升序排序。
    pub fn order_by<K: QueryValue>(
        &self,
        key_selector: KeySelector<T, K>,
    ) -> OrderedAsyncQueryable<T> {
        self.order_by_with_comparer(key_selector, KeyComparer::default())
    }

    /// 以显式比较器按键升序排序。
    pub fn order_by_with_comparer<K>(
        &self,
        key_selector: KeySelector<T, K>,
        comparer: KeyComparer<K>,
    ) -> OrderedAsyncQueryable<T>
    where
        K: Send + Sync + 'static,
    {
        OrderedAsyncQueryable::first(self.clone(), key_selector, comparer, Direction::Ascending)
    }

    /// 以默认比较器按键降序排序。
    pub fn order_by_descending<K: QueryValue>(
        &self,
        key_selector: KeySelector<T, K>,
    ) -> OrderedAsyncQueryable<T> {
        self.order_by_descending_with_comparer(key_selector, KeyComparer::default())
    }

    /// 以显式比较器按键降序排序。
    pub fn order_by_descending_with_comparer<K>(
        &self,
        key_selector: KeySelector<T, K>,
        comparer: KeyComparer<K>,
    ) -> OrderedAsyncQueryable<T>
    where
        K: Send + Sync + 'static,
    {
        OrderedAsyncQueryable::first(self.clone(), key_selector, comparer, Direction::Descending)
    }

    async fn run_contains(
        &self,
        value: T,
        equality: Option<ValueEquality<T>>,
        cancellation: &Cancellation,
    ) -> Result<bool> {
        let span = tracing::debug_span!(
            target: TARGET,
            SPAN_EXECUTE,
            { fields::OPERATOR } = "contains",
            { fields::ELEMENT_TYPE } = T::TYPE_NAME,
            { fields::SOURCE } = %self.source.name(),
        );
        async move {
            cancellation.check().inspect_err(log_cancelled)?;

            if equality.is_none() && self.options.allow_pushdown {
                if let Some(answer) = self.source.contains_native(&value, cancellation).await {
                    tracing::trace!(target: TARGET, "contains answered by provider pushdown");
                    let answer = answer?;
                    cancellation.check().inspect_err(log_cancelled)?;
                    return Ok(answer);
                }
            }

            let equality = equality.unwrap_or_default();
            let interval = self.options.cancellation_check_interval.max(1);
            let mut stream = self.source.scan(cancellation);
            let mut scanned = 0usize;
            let mut found = false;
            while let Some(item) = stream.next().await {
                let item = item.inspect_err(log_cancelled)?;
                scanned += 1;
                if equality.equals(&item, &value) {
                    found = true;
                    break;
                }
                if scanned % interval == 0 {
                    cancellation.check().inspect_err(log_cancelled)?;
                }
            }
            cancellation.check().inspect_err(log_cancelled)?;
            tracing::event!(
                target: TARGET,
                tracing::Level::DEBUG,
                { fields::ELEMENTS } = scanned,
                { fields::FOUND } = found,
                "contains finished"
            );
            Ok(found)
        }
        .instrument(span)
        .await
    }

    /// 扫描并物化全部元素，遵守取消检查间隔与物化上限。
    async fn materialize(&self, cancellation: &Cancellation) -> Result<Vec<T>> {
        cancellation.check().inspect_err(log_cancelled)?;
        let interval = self.options.cancellation_check_interval.max(1);
        let limit = self.options.materialization_limit;
        let mut stream = self.source.scan(cancellation);
        let mut items = Vec::new();
        while let Some(item) = stream.next().await {
            items.push(item.inspect_err(log_cancelled)?);
            if let Some(limit) = limit {
                if items.len() > limit {
                    tracing::event!(
                        target: TARGET,
                        tracing::Level::DEBUG,
                        { fields::LIMIT } = limit,
                        "materialization limit exceeded"
                    );
                    return Err(QueryError::BudgetExceeded { limit });
                }
            }
            if items.len() % interval == 0 {
                cancellation.check().inspect_err(log_cancelled)?;
            }
        }
        cancellation.check().inspect_err(log_cancelled)?;
        Ok(items)
    }
}

#[async_trait]
impl<T: QueryValue> AsyncSequence<T> for AsyncQueryable<T> {
    async fn to_list(&self, cancellation: &Cancellation) -> Result<Vec<T>> {
        let span = tracing::debug_span!(
            target: TARGET,
            SPAN_EXECUTE,
            { fields::OPERATOR } = "to_list",
            { fields::ELEMENT_TYPE } = T::TYPE_NAME,
            { fields::SOURCE } = %self.source.name(),
        );
        async move {
            let items = self.materialize(cancellation).await?;
            tracing::event!(
                target: TARGET,
                tracing::Level::DEBUG,
                { fields::ELEMENTS } = items.len(),
                "to_list finished"
            );
            Ok(items)
        }
        .instrument(span)
        .await
    }

    async fn count(&self, cancellation: &Cancellation) -> Result<usize> {
        let span = tracing::debug_span!(
            target: TARGET,
            SPAN_EXECUTE,
            { fields::OPERATOR } = "count",
            { fields::ELEMENT_TYPE } = T::TYPE_NAME,
            { fields::SOURCE } = %self.source.name(),
        );
        async move {
            cancellation.check().inspect_err(log_cancelled)?;
            let interval = self.options.cancellation_check_interval.max(1);
            let mut stream = self.source.scan(cancellation);
            let mut count = 0usize;
            while let Some(item) = stream.next().await {
                item.inspect_err(log_cancelled)?;
                count += 1;
                if count % interval == 0 {
                    cancellation.check().inspect_err(log_cancelled)?;
                }
            }
            cancellation.check().inspect_err(log_cancelled)?;
            tracing::event!(target: TARGET, tracing::Level::DEBUG, { fields::ELEMENTS } = count, "count finished");
            Ok(count)
        }
        .instrument(span)
        .await
    }
}

/// 已附加排序子句的视图。
///
/// # 契约说明（What）
/// - 首个子句来自 `order_by*`，后续子句来自 `then_by*`，仅在前序键相等时参与比较；
/// - 升序与降序都是稳定排序，等键元素保持提供者扫描顺序。
pub struct OrderedAsyncQueryable<T: QueryValue> {
    base: AsyncQueryable<T>,
    clauses: Vec<Arc<dyn SortClause<T>>>,
}

impl<T: QueryValue> Clone for OrderedAsyncQueryable<T> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            clauses: self.clauses.clone(),
        }
    }
}

impl<T: QueryValue> fmt::Debug for OrderedAsyncQueryable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let clauses: Vec<(&'static str, Direction)> = self
            .clauses
            .iter()
            .map(|clause| (clause.shape(), clause.direction()))
            .collect();
        f.debug_struct("OrderedAsyncQueryable")
            .field("base", &self.base)
            .field("clauses", &clauses)
            .finish()
    }
}

impl<T: QueryValue> OrderedAsyncQueryable<T> {
    fn first<K>(
        base: AsyncQueryable<T>,
        key_selector: KeySelector<T, K>,
        comparer: KeyComparer<K>,
        direction: Direction,
    ) -> Self
    where
        K: Send + Sync + 'static,
    {
        Self {
            base,
            clauses: vec![Arc::new(TypedClause::new(key_selector, comparer, direction))],
        }
    }

    fn push<K>(
        &self,
        key_selector: KeySelector<T, K>,
        comparer: KeyComparer<K>,
        direction: Direction,
    ) -> Self
    where
        K: Send + Sync + 'static,
    {
        let mut next = self.clone();
        next.clauses
            .push(Arc::new(TypedClause::new(key_selector, comparer, direction)));
        next
    }

    /// 排序键个数。
    pub fn sort_key_count(&self) -> usize {
        self.clauses.len()
    }

    /// 以默认比较器追加升序次级键。
    pub fn then_by<K: QueryValue>(&self, key_selector: KeySelector<T, K>) -> Self {
        self.push(key_selector, KeyComparer::default(), Direction::Ascending)
    }

    /// 以显式比较器追加升序次级键。
    pub fn then_by_with_comparer<K>(
        &self,
        key_selector: KeySelector<T, K>,
        comparer: KeyComparer<K>,
    ) -> Self
    where
        K: Send + Sync + 'static,
    {
        self.push(key_selector, comparer, Direction::Ascending)
    }

    /// 以默认比较器追加降序次级键。
    pub fn then_by_descending<K: QueryValue>(&self, key_selector: KeySelector<T, K>) -> Self {
        self.push(key_selector, KeyComparer::default(), Direction::Descending)
    }

    /// 以显式比较器追加降序次级键。
    pub fn then_by_descending_with_comparer<K>(
        &self,
        key_selector: KeySelector<T, K>,
        comparer: KeyComparer<K>,
    ) -> Self
    where
        K: Send + Sync + 'static,
    {
        self.push(key_selector, comparer, Direction::Descending)
    }
}

#[async_trait]
impl<T: QueryValue> AsyncSequence<T> for OrderedAsyncQueryable<T> {
    async fn to_list(&self, cancellation: &Cancellation) -> Result<Vec<T>> {
        let span = tracing::debug_span!(
            target: TARGET,
            SPAN_EXECUTE,
            { fields::OPERATOR } = "order_by",
            { fields::ELEMENT_TYPE } = T::TYPE_NAME,
            { fields::SOURCE } = %self.base.source_name(),
            { fields::SORT_KEYS } = self.clauses.len(),
        );
        async move {
            let items = self.base.materialize(cancellation).await?;
            let sorted = ordering::sort_items(items, &self.clauses, cancellation)
                .await
                .inspect_err(log_cancelled)?;
            tracing::event!(
                target: TARGET,
                tracing::Level::DEBUG,
                { fields::ELEMENTS } = sorted.len(),
                "order_by finished"
            );
            Ok(sorted)
        }
        .instrument(span)
        .await
    }

    async fn count(&self, cancellation: &Cancellation) -> Result<usize> {
        self.base.count(cancellation).await
    }
}

fn log_cancelled(err: &QueryError) {
    if err.is_cancelled() {
        tracing::debug!(target: TARGET, "query cancelled by caller");
    }
}

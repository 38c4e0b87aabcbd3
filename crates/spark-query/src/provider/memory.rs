use std::borrow::Cow;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream;

use crate::cancellation::Cancellation;
use crate::error::{QueryError, Result};
use crate::future::BoxStream;
use crate::source::QuerySource;
use crate::value::QueryValue;

/// 内存集合提供者。
///
/// # 教案式说明
/// - **意图 (Why)**：为内存集合提供最直接的异步视图，同时作为契约测试的参考提供者，
///   让 TCK 在没有外部依赖的情况下即可跑通全部套件；
/// - **逻辑 (How)**：元素以 `Arc<[T]>` 共享，扫描时逐个克隆产出，每产出一个元素前检查取消位；
///   `contains_native` 在启用下推时直接遍历切片，省去流式开销；
/// - **契约 (What)**：内容在构造后不可变，多次扫描顺序一致；被取消时以 `Err(Cancelled)` 结束流，
///   之后不再产出任何元素。
#[derive(Clone, Debug)]
pub struct MemorySource<T> {
    name: Cow<'static, str>,
    items: Arc<[T]>,
    pushdown: bool,
}

impl<T: QueryValue> MemorySource<T> {
    /// 以元素集合构造提供者，名称默认为 `memory<类型名>`。
    pub fn new(items: impl Into<Arc<[T]>>) -> Self {
        Self {
            name: Cow::Owned(format!("memory<{}>", T::TYPE_NAME)),
            items: items.into(),
            pushdown: true,
        }
    }

    /// 覆盖提供者名称。
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// 关闭 `Contains` 下推，强制走扫描路径。
    pub fn without_pushdown(mut self) -> Self {
        self.pushdown = false;
        self
    }
}

#[async_trait]
impl<T: QueryValue> QuerySource<T> for MemorySource<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn scan<'a>(&'a self, cancellation: &'a Cancellation) -> BoxStream<'a, Result<T>> {
        let items = &self.items;
        Box::pin(stream::unfold(0usize, move |index| async move {
            let item = items.get(index)?;
            if cancellation.is_cancelled() {
                return Some((Err(QueryError::Cancelled), items.len()));
            }
            Some((Ok(item.clone()), index + 1))
        }))
    }

    async fn contains_native(
        &self,
        value: &T,
        cancellation: &Cancellation,
    ) -> Option<Result<bool>> {
        if !self.pushdown {
            return None;
        }
        if let Err(err) = cancellation.check() {
            return Some(Err(err));
        }
        Some(Ok(self.items.iter().any(|item| item.value_eq(value))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use futures_util::StreamExt;

    #[test]
    fn scan_yields_items_in_insertion_order() {
        let source = MemorySource::new(vec![3, 1, 2]);
        let token = Cancellation::new();
        let items: Vec<i32> =
            block_on(source.scan(&token).map(|r| r.expect("扫描不应失败")).collect());
        assert_eq!(items, vec![3, 1, 2]);
        assert_eq!(source.name(), "memory<i32>");
    }

    #[test]
    fn custom_name_reaches_the_view() {
        let source = MemorySource::new(vec![Some(2.5f32)]).with_name("orders.cache");
        assert_eq!(source.name(), "orders.cache");

        let view = crate::AsyncQueryable::from_source(source);
        assert_eq!(view.source_name(), "orders.cache");
        assert!(block_on(view.contains(Some(2.5))).expect("contains 不应失败"));
    }

    #[test]
    fn scan_stops_with_cancelled_error() {
        let source = MemorySource::new(vec![Some(1i64), None]);
        let token = Cancellation::cancelled();
        let results: Vec<Result<Option<i64>>> = block_on(source.scan(&token).collect());
        assert_eq!(results.len(), 1, "取消后只产出一次错误");
        assert!(matches!(results[0], Err(QueryError::Cancelled)));
    }

    #[test]
    fn pushdown_can_be_disabled() {
        let token = Cancellation::new();
        let source = MemorySource::new(vec![1.0f64, f64::NAN]);
        let answer = block_on(source.contains_native(&f64::NAN, &token));
        assert!(matches!(answer, Some(Ok(true))));

        let scan_only = source.without_pushdown();
        assert!(block_on(scan_only.contains_native(&1.0, &token)).is_none());
    }
}

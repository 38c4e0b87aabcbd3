//! 异步适配器工厂与类型化数据源目录。
//!
//! # 教案式说明
//! - **意图 (Why)**：调用方按元素类型索取 [`AsyncQueryable`] 视图，而不必知道背后是哪一个提供者；
//!   提供者可能需要异步预热（建立连接、加载元数据），因此构造过程本身是异步的；
//! - **逻辑 (How)**：
//!   1. [`AdapterBuilder`] 以 `TypeId` 为键登记数据源，重复登记记录为延迟错误；
//!   2. [`AdapterBuilder::build`] 先校验配置，再依次调用每个数据源的 `prepare`；
//!   3. 构造完成的 [`QueryAdapter`] 是不可变目录，克隆只复制 `Arc`；
//! - **契约 (What)**：
//!   - 同一元素类型只能登记一个数据源，否则 `build` 返回 `query.duplicate_source`；
//!   - 任何数据源预热失败时 `build` 返回该错误，不会产出半初始化的适配器；
//!   - [`QueryAdapter::view`] 对未登记的类型返回 `query.source_not_registered`。

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::AdapterOptions;
use crate::error::{QueryError, Result};
use crate::future::BoxFuture;
use crate::observability::{TARGET, fields};
use crate::queryable::AsyncQueryable;
use crate::source::QuerySource;
use crate::value::QueryValue;

/// 类型擦除的目录条目。
trait CatalogEntry: Send + Sync {
    fn element_type(&self) -> &'static str;

    fn source_name(&self) -> &str;

    fn prepare(&self) -> BoxFuture<'_, Result<()>>;

    fn as_any(&self) -> &dyn Any;
}

struct TypedEntry<T: QueryValue> {
    source: Arc<dyn QuerySource<T>>,
}

impl<T: QueryValue> CatalogEntry for TypedEntry<T> {
    fn element_type(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn source_name(&self) -> &str {
        self.source.name()
    }

    fn prepare(&self) -> BoxFuture<'_, Result<()>> {
        self.source.prepare()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

type Catalog = HashMap<TypeId, Box<dyn CatalogEntry>>;

/// 已装配完成的查询适配器。
#[derive(Clone)]
pub struct QueryAdapter {
    catalog: Arc<Catalog>,
    options: Arc<AdapterOptions>,
}

impl QueryAdapter {
    /// 创建构建器。
    pub fn builder() -> AdapterBuilder {
        AdapterBuilder::default()
    }

    /// 获取元素类型 `T` 的异步可查询视图。
    pub fn view<T: QueryValue>(&self) -> Result<AsyncQueryable<T>> {
        let entry = self
            .catalog
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.as_any().downcast_ref::<TypedEntry<T>>())
            .ok_or(QueryError::SourceNotRegistered {
                element_type: T::TYPE_NAME,
            })?;
        Ok(AsyncQueryable::new(
            Arc::clone(&entry.source),
            Arc::clone(&self.options),
        ))
    }

    /// 已登记的元素类型名，按字典序排列。
    pub fn element_types(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.catalog.values().map(|entry| entry.element_type()).collect();
        names.sort_unstable();
        names
    }

    /// 当前生效的配置。
    pub fn options(&self) -> &AdapterOptions {
        &self.options
    }
}

impl fmt::Debug for QueryAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryAdapter")
            .field("element_types", &self.element_types())
            .field("options", &self.options)
            .finish()
    }
}

/// [`QueryAdapter`] 的构建器。
///
/// 登记阶段不返回 `Result`，以便链式书写；首个登记错误会被保存并在 [`build`](Self::build) 时返回。
#[derive(Default)]
pub struct AdapterBuilder {
    catalog: Catalog,
    options: AdapterOptions,
    deferred: Option<QueryError>,
}

impl AdapterBuilder {
    /// 替换配置。
    pub fn options(mut self, options: AdapterOptions) -> Self {
        self.options = options;
        self
    }

    /// 登记元素类型 `T` 的数据源。
    pub fn source<T, S>(self, source: S) -> Self
    where
        T: QueryValue,
        S: QuerySource<T>,
    {
        self.shared_source(Arc::new(source) as Arc<dyn QuerySource<T>>)
    }

    /// 登记一个已共享的数据源，便于多个适配器复用同一个后端连接。
    pub fn shared_source<T: QueryValue>(mut self, source: Arc<dyn QuerySource<T>>) -> Self {
        let key = TypeId::of::<T>();
        if self.catalog.contains_key(&key) {
            self.deferred.get_or_insert(QueryError::DuplicateSource {
                element_type: T::TYPE_NAME,
            });
            return self;
        }
        self.catalog.insert(key, Box::new(TypedEntry { source }));
        self
    }

    /// 校验配置、预热全部数据源并产出适配器。
    pub async fn build(self) -> Result<QueryAdapter> {
        if let Some(err) = self.deferred {
            return Err(err);
        }
        self.options.validate()?;
        for entry in self.catalog.values() {
            entry.prepare().await.inspect_err(|err| {
                tracing::event!(
                    target: TARGET,
                    tracing::Level::WARN,
                    { fields::ELEMENT_TYPE } = entry.element_type(),
                    { fields::SOURCE } = entry.source_name(),
                    { fields::ERROR_CODE } = err.code(),
                    "query source failed to prepare"
                );
            })?;
        }
        tracing::event!(
            target: TARGET,
            tracing::Level::DEBUG,
            { fields::SOURCES } = self.catalog.len(),
            "query adapter ready"
        );
        Ok(QueryAdapter {
            catalog: Arc::new(self.catalog),
            options: Arc::new(self.options),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::codes;
    use crate::provider::memory::MemorySource;
    use futures::executor::block_on;

    #[test]
    fn view_resolves_registered_types_only() {
        let adapter = block_on(
            QueryAdapter::builder()
                .source(MemorySource::new(vec![1i32, 2, 3]))
                .source(MemorySource::new(vec![Some(1i64), None]))
                .build(),
        )
        .expect("装配应成功");

        assert_eq!(adapter.element_types(), vec!["Option<i64>", "i32"]);
        assert!(adapter.view::<i32>().is_ok());
        let err = adapter.view::<f64>().expect_err("f64 未登记");
        assert_eq!(err.code(), codes::SOURCE_NOT_REGISTERED);
    }

    #[test]
    fn duplicate_registration_fails_at_build() {
        let result = block_on(
            QueryAdapter::builder()
                .source(MemorySource::new(vec![1i32]))
                .source(MemorySource::new(vec![2i32]))
                .build(),
        );
        let err = result.expect_err("重复登记必须失败");
        assert_eq!(err.code(), codes::DUPLICATE_SOURCE);
    }

    #[test]
    fn invalid_options_fail_at_build() {
        let mut options = AdapterOptions::default();
        options.cancellation_check_interval = 0;
        let err = block_on(QueryAdapter::builder().options(options).build())
            .expect_err("非法配置必须失败");
        assert_eq!(err.code(), codes::CONFIGURATION);
    }
}

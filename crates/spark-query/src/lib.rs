#![deny(unsafe_code)]
#![doc = "spark-query: 将异步可查询（async queryable）契约适配到任意底层查询提供者的核心库。"]
#![doc = ""]
#![doc = "== 分层概览 =="]
#![doc = "1. `source`：提供者接缝，任何能够异步产出元素的后端（内存集合、数据库驱动等）实现 [`QuerySource`] 即可接入。"]
#![doc = "2. `adapter`：异步工厂装配类型化的数据源目录，并按元素类型暴露 [`AsyncQueryable`] 视图。"]
#![doc = "3. `queryable` / `ordering`：`Contains`、`OrderBy`、`OrderByDescending`、`ThenBy` 等算子的异步执行路径。"]
#![doc = "4. `ops`：带参数校验的算子入口，缺失的来源或选择器以 `None` 表达并返回 `query.argument_null`。"]
#![doc = ""]
#![doc = "== 契约测试 =="]
#![doc = "任何提供者实现都应通过 `spark-query-tck` 的全部套件；套件以同步参考实现为准绳逐项比对结果。"]

pub mod adapter;
pub mod cancellation;
pub mod config;
pub mod error;
pub mod future;
pub mod observability;
pub mod ops;
pub mod ordering;
pub mod provider;
pub mod queryable;
pub mod selector;
pub mod source;
pub mod value;

pub use adapter::{AdapterBuilder, QueryAdapter};
pub use cancellation::Cancellation;
pub use config::AdapterOptions;
pub use error::{ErrorCategory, QueryError, Result};
pub use future::{BoxFuture, BoxStream};
pub use provider::memory::MemorySource;
pub use queryable::{AsyncQueryable, AsyncSequence, OrderedAsyncQueryable};
pub use selector::{KeyComparer, KeySelector, ValueEquality};
pub use source::QuerySource;
pub use value::QueryValue;

/// 常用类型的一站式导入。
///
/// 用法：`use spark_query::prelude::*;`
pub mod prelude {
    pub use crate::{
        AdapterOptions, AsyncQueryable, AsyncSequence, Cancellation, KeyComparer, KeySelector,
        MemorySource, OrderedAsyncQueryable, QueryAdapter, QueryError, QuerySource, QueryValue,
        Result, ValueEquality,
    };
}

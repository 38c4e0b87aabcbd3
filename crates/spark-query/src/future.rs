use std::future::Future;
use std::pin::Pin;

pub use futures_util::stream::Stream;

/// `BoxFuture` 是 `spark-query` 在对象安全接缝处使用的通用 Future 包装。
///
/// # 契约说明（What）
/// - 约束 Future 为 `Send + 'a`，可安全跨线程；
/// - 提供者与键选择器均以该类型返回异步结果，避免在 trait 中暴露泛型 Future。
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// `BoxStream` 为对象安全的流包装。
///
/// # 契约说明（What）
/// - 封装任何实现 `Stream + Send` 的类型，生命周期由 `'a` 限定；
/// - [`QuerySource::scan`](crate::QuerySource::scan) 以此返回底层元素序列。
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

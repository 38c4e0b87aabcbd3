//! 用例执行所需的工厂接缝与断言工具。
//!
//! # 教案式说明
//! - **意图 (Why)**：每个用例都要经历“取新适配器 → 取视图 → 执行 → 比对”四步，集中在此处避免各套件重复样板；
//! - **逻辑 (How)**：[`AdapterFactory`] 以异步方法产出全新适配器，任何 `Fn() -> Future<Output = Result<QueryAdapter>>`
//!   都自动实现该 trait；断言工具在失败时给出期望值与实际值的完整对比；
//! - **契约 (What)**：所有断言失败均以 `panic` 表达，由 `case::run_suite` 附加上下文。

use std::fmt::Debug;
use std::future::Future;

use async_trait::async_trait;
use spark_query::error::codes;
use spark_query::value::sequence_eq;
use spark_query::{AsyncQueryable, Cancellation, KeySelector, QueryAdapter, QueryValue, Result};

use crate::fixtures::MatrixElement;

/// 异步适配器工厂。
///
/// 每次调用都应返回互不共享可变状态的新实例。
#[async_trait]
pub trait AdapterFactory: Send + Sync {
    async fn create(&self) -> Result<QueryAdapter>;
}

#[async_trait]
impl<F, Fut> AdapterFactory for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<QueryAdapter>> + Send,
{
    async fn create(&self) -> Result<QueryAdapter> {
        (self)().await
    }
}

/// 取一个全新的适配器并返回 `T` 的视图。
pub async fn arrange<T: QueryValue>(factory: &dyn AdapterFactory) -> AsyncQueryable<T> {
    let adapter = match factory.create().await {
        Ok(adapter) => adapter,
        Err(err) => panic!("适配器工厂失败：{err}"),
    };
    match adapter.view::<T>() {
        Ok(view) => view,
        Err(err) => panic!("适配器未暴露 {} 视图：{err}", T::TYPE_NAME),
    }
}

/// 键选择器的三种重载形态。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    Sync,
    Await,
    AwaitWithCancellation,
}

impl Shape {
    /// 全部形态，顺序与用例表一致。
    pub const ALL: [Shape; 3] = [Shape::Sync, Shape::Await, Shape::AwaitWithCancellation];

    /// 以指定形态包装投影函数。
    pub fn selector<T, K>(self, project: fn(&T) -> K) -> KeySelector<T, K>
    where
        T: Send + Sync + 'static,
        K: Send + 'static,
    {
        match self {
            Shape::Sync => KeySelector::sync(project),
            Shape::Await => KeySelector::awaitable(move |item: &T| {
                let key = project(item);
                async move { key }
            }),
            Shape::AwaitWithCancellation => {
                KeySelector::cancellable(move |item: &T, _cancellation: Cancellation| {
                    let key = project(item);
                    async move { key }
                })
            }
        }
    }
}

/// 便捷入口：以指定形态包装 `+3` 投影。
pub fn shifted_selector<T: MatrixElement>(shape: Shape) -> KeySelector<T, T> {
    shape.selector(T::shifted)
}

/// 断言两个序列在元素语义下逐项相等。
#[track_caller]
pub fn assert_equivalent<T: QueryValue>(actual: &[T], expected: &[T]) {
    assert!(
        sequence_eq(actual, expected),
        "异步结果与同步参考不一致（{}）\n  实际：{actual:?}\n  期望：{expected:?}",
        T::TYPE_NAME
    );
}

/// 断言结果为缺失参数错误，且参数名匹配。
#[track_caller]
pub fn assert_argument_null<T: Debug>(result: Result<T>, argument: &str) {
    match result {
        Err(err) if err.code() == codes::ARGUMENT_NULL => assert_eq!(
            err.missing_argument(),
            Some(argument),
            "缺失参数名不符"
        ),
        other => panic!("期望 {} ({argument})，实际为 {other:?}", codes::ARGUMENT_NULL),
    }
}

/// 断言结果为取消错误，且没有伴随任何结果。
#[track_caller]
pub fn assert_cancelled<T: Debug>(result: Result<T>) {
    match result {
        Err(err) if err.is_cancelled() => {}
        other => panic!("期望 {}，实际为 {other:?}", codes::CANCELLED),
    }
}

/// 取出成功结果，失败时给出错误码。
#[track_caller]
pub fn expect_ok<T>(result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("算子不应失败：[{}] {err}", err.code()),
    }
}

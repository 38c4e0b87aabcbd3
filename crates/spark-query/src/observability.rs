//! 可观测性键名契约与日志安装入口。
//!
//! 教案式说明（Why）：算子执行路径统一使用这里的 Span 名称与字段键，避免日志检索时出现多种拼写。
//! 契约定义（What）：常量一经发布不可修改；字段值均为稳定字符串（算子名、类型名、提供者名）。
//! 实现细节（How）：执行入口创建 `spark_query.execute` Span，并在开始、下推、取消、完成时记录事件。

use thiserror::Error;
use tracing::dispatcher;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt};

/// 日志 target，执行路径上的全部事件都挂在该 target 下。
pub const TARGET: &str = "spark_query";

/// 算子执行 Span 名称。
pub const SPAN_EXECUTE: &str = "spark_query.execute";

/// Span / 事件字段键。
pub mod fields {
    /// 算子名称，例如 `contains`、`order_by`。
    pub const OPERATOR: &str = "query.operator";
    /// 元素类型名，取自 [`QueryValue::TYPE_NAME`](crate::QueryValue::TYPE_NAME)。
    pub const ELEMENT_TYPE: &str = "query.element_type";
    /// 提供者名称。
    pub const SOURCE: &str = "query.source";
    /// 物化的元素个数。
    pub const ELEMENTS: &str = "query.elements";
    /// 排序键的个数（`OrderBy` 加上全部 `ThenBy`）。
    pub const SORT_KEYS: &str = "query.sort_keys";
    /// `Contains` 是否命中。
    pub const FOUND: &str = "query.found";
    /// 触发的物化上限。
    pub const LIMIT: &str = "query.limit";
    /// 适配器登记的数据源个数。
    pub const SOURCES: &str = "query.sources";
    /// 失败时的稳定错误码，取自 [`QueryError::code`](crate::QueryError::code)。
    pub const ERROR_CODE: &str = "error.code";
}

/// 安装日志订阅器失败的原因。
#[derive(Debug, Error)]
pub enum InstallError {
    /// 外部已经设置了全局 `tracing` Subscriber。
    #[error("a global tracing subscriber is already installed")]
    SubscriberAlreadySet,
    /// 设置全局 Subscriber 失败。
    #[error("failed to install the global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// 安装 `fmt + EnvFilter` 日志订阅器。
///
/// # 教案式说明
/// - **意图（Why）**：宿主与测试只需调用一次即可看到适配层的结构化日志；
/// - **逻辑（How）**：优先读取 `RUST_LOG`，缺省为 `info`；若外部已设置全局 Subscriber 则拒绝覆盖；
/// - **契约（What）**：成功后全局生效；重复调用返回 [`InstallError::SubscriberAlreadySet`]。
pub fn install_subscriber() -> Result<(), InstallError> {
    if dispatcher::has_been_set() {
        return Err(InstallError::SubscriberAlreadySet);
    }
    let subscriber = tracing_subscriber::registry()
        .with(build_env_filter())
        .with(tracing_subscriber::fmt::layer());
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 为适配层对外暴露的错误语义提供集中定义：参数缺失、取消、数据源未注册、物化预算超限、提供者故障；
//! - 每个变体映射到稳定错误码，日志与契约测试均以错误码而非自然语言做判定。
//!
//! ## 设计要求（What）
//! - 所有错误类型实现 `thiserror::Error`，保证与 `std::error::Error` 生态兼容；
//! - 错误码遵循 `<领域>.<语义>` 命名约定，集中登记在 [`codes`] 模块；
//! - 参数校验与取消属于前置条件违例，不可重试、不可部分恢复。

use std::borrow::Cow;
use std::error::Error as StdError;

use thiserror::Error;

/// 适配层稳定错误码集合。
///
/// # 契约说明（What）
/// - 码值一经发布不可修改，只允许追加；
/// - 契约测试通过 [`QueryError::code`] 与这些常量比对，而不解析错误消息。
pub mod codes {
    /// 必填参数（来源、键选择器）缺失。
    pub const ARGUMENT_NULL: &str = "query.argument_null";
    /// 调用方提供的取消信号已触发。
    pub const CANCELLED: &str = "query.cancelled";
    /// 适配器中未注册请求的元素类型。
    pub const SOURCE_NOT_REGISTERED: &str = "query.source_not_registered";
    /// 同一元素类型重复注册数据源。
    pub const DUPLICATE_SOURCE: &str = "query.duplicate_source";
    /// 物化元素数量超过配置上限。
    pub const BUDGET_EXCEEDED: &str = "query.budget_exceeded";
    /// 底层提供者返回故障。
    pub const PROVIDER: &str = "query.provider";
    /// 配置解析或校验失败。
    pub const CONFIGURATION: &str = "query.configuration";
}

/// `ErrorCause` 封装底层原因，保持 `Send + Sync` 以方便跨线程传递。
pub type ErrorCause = Box<dyn StdError + Send + Sync + 'static>;

/// 适配层统一错误域。
///
/// # 教案式说明
/// - **意图 (Why)**：把“参数缺失/取消/提供者故障”等异步查询路径上的失败收敛为一个枚举，
///   调用方可以用 `?` 直接传播，契约测试则依据 [`code`](Self::code) 断言；
/// - **契约 (What)**：
///   - 所有变体均为 `Send + Sync + 'static`，可跨任务传播；
///   - `ArgumentNull` 与 `Cancelled` 必须在产生任何结果之前返回，绝不伴随部分结果；
/// - **设计权衡 (Trade-offs)**：`Provider` 变体以 `code` + `detail` + 可选底层原因承载任意后端错误，
///   避免为每种后端定义专属变体。
#[derive(Debug, Error)]
pub enum QueryError {
    /// 必填参数缺失，`argument` 为参数名（如 `"source"`、`"key_selector"`）。
    #[error("argument `{argument}` must not be null")]
    ArgumentNull { argument: &'static str },

    /// 调用方提供的取消信号已被触发。
    #[error("the query was cancelled")]
    Cancelled,

    /// 适配器中没有为该元素类型注册数据源。
    #[error("no query source registered for element type `{element_type}`")]
    SourceNotRegistered { element_type: &'static str },

    /// 同一元素类型被注册了两次。
    #[error("a query source for element type `{element_type}` is already registered")]
    DuplicateSource { element_type: &'static str },

    /// 物化元素数超过配置上限。
    #[error("materialization exceeded the configured limit of {limit} elements")]
    BudgetExceeded { limit: usize },

    /// 底层提供者故障。
    ///
    /// - `transient` 为 `true` 表示提供者认为稍后重试可能成功（例如连接抖动）。
    #[error("provider `{provider}` failed: {detail}")]
    Provider {
        provider: Cow<'static, str>,
        detail: Cow<'static, str>,
        transient: bool,
        #[source]
        cause: Option<ErrorCause>,
    },

    /// 配置解析或校验失败。
    #[error("invalid adapter configuration: {detail}")]
    Configuration { detail: Cow<'static, str> },
}

/// 错误分类，驱动调用方的处置策略。
///
/// - `Precondition`：参数或配置违例，修正调用方代码后才能成功；
/// - `Cancelled`：调用方主动取消，不应记为故障；
/// - `ResourceExhausted`：物化预算耗尽；
/// - `Provider`：后端故障，是否重试参见 [`QueryError::is_retryable`]。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCategory {
    Precondition,
    Cancelled,
    ResourceExhausted,
    Provider,
}

impl QueryError {
    /// 构造参数缺失错误。
    pub fn argument_null(argument: &'static str) -> Self {
        QueryError::ArgumentNull { argument }
    }

    /// 构造提供者故障。
    ///
    /// # 契约说明（What）
    /// - **输入**：`provider` 为数据源名称，`detail` 为面向排障人员的描述；
    /// - **后置条件**：返回的错误默认不可重试、没有底层原因，可用 [`with_cause`](Self::with_cause)
    ///   与 [`transient`](Self::transient) 补充。
    pub fn provider(
        provider: impl Into<Cow<'static, str>>,
        detail: impl Into<Cow<'static, str>>,
    ) -> Self {
        QueryError::Provider {
            provider: provider.into(),
            detail: detail.into(),
            transient: false,
            cause: None,
        }
    }

    /// 构造配置错误。
    pub fn configuration(detail: impl Into<Cow<'static, str>>) -> Self {
        QueryError::Configuration {
            detail: detail.into(),
        }
    }

    /// 为提供者故障附加底层原因；其余变体原样返回。
    pub fn with_cause(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        if let QueryError::Provider { cause, .. } = &mut self {
            *cause = Some(Box::new(source));
        }
        self
    }

    /// 将提供者故障标记为瞬时故障；其余变体原样返回。
    pub fn transient(mut self) -> Self {
        if let QueryError::Provider { transient, .. } = &mut self {
            *transient = true;
        }
        self
    }

    /// 获取稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::ArgumentNull { .. } => codes::ARGUMENT_NULL,
            QueryError::Cancelled => codes::CANCELLED,
            QueryError::SourceNotRegistered { .. } => codes::SOURCE_NOT_REGISTERED,
            QueryError::DuplicateSource { .. } => codes::DUPLICATE_SOURCE,
            QueryError::BudgetExceeded { .. } => codes::BUDGET_EXCEEDED,
            QueryError::Provider { .. } => codes::PROVIDER,
            QueryError::Configuration { .. } => codes::CONFIGURATION,
        }
    }

    /// 获取错误分类。
    pub fn category(&self) -> ErrorCategory {
        match self {
            QueryError::ArgumentNull { .. }
            | QueryError::SourceNotRegistered { .. }
            | QueryError::DuplicateSource { .. }
            | QueryError::Configuration { .. } => ErrorCategory::Precondition,
            QueryError::Cancelled => ErrorCategory::Cancelled,
            QueryError::BudgetExceeded { .. } => ErrorCategory::ResourceExhausted,
            QueryError::Provider { .. } => ErrorCategory::Provider,
        }
    }

    /// 仅当提供者显式声明为瞬时故障时返回 `true`。
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            QueryError::Provider {
                transient: true,
                ..
            }
        )
    }

    /// 若为参数缺失错误，返回缺失的参数名。
    pub fn missing_argument(&self) -> Option<&'static str> {
        match self {
            QueryError::ArgumentNull { argument } => Some(argument),
            _ => None,
        }
    }

    /// 是否为取消错误。
    pub fn is_cancelled(&self) -> bool {
        matches!(self, QueryError::Cancelled)
    }
}

/// `Result` 为适配层统一的返回值别名，默认错误类型为 [`QueryError`]。
pub type Result<T, E = QueryError> = core::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn codes_follow_domain_reason_convention() {
        let samples = [
            QueryError::argument_null("source"),
            QueryError::Cancelled,
            QueryError::SourceNotRegistered { element_type: "i32" },
            QueryError::DuplicateSource { element_type: "i32" },
            QueryError::BudgetExceeded { limit: 8 },
            QueryError::provider("memory", "boom"),
            QueryError::configuration("bad"),
        ];
        for err in samples {
            let code = err.code();
            assert!(code.starts_with("query."), "错误码 {code} 必须位于 query 域");
            assert_eq!(code.matches('.').count(), 1, "错误码 {code} 应为 <域>.<语义> 两段式");
        }
    }

    #[test]
    fn argument_null_is_a_precondition_and_names_the_argument() {
        let err = QueryError::argument_null("key_selector");
        assert_eq!(err.code(), codes::ARGUMENT_NULL);
        assert_eq!(err.category(), ErrorCategory::Precondition);
        assert_eq!(err.missing_argument(), Some("key_selector"));
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "argument `key_selector` must not be null");
    }

    #[test]
    fn provider_error_keeps_cause_and_transient_flag() {
        let err = QueryError::provider("pg", "connection reset")
            .with_cause(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            .transient();
        assert!(err.is_retryable());
        assert_eq!(err.category(), ErrorCategory::Provider);
        let source = err.source().expect("底层原因必须可回溯");
        assert_eq!(source.to_string(), "reset");
    }

    #[test]
    fn cause_and_transient_are_ignored_for_non_provider_errors() {
        let err = QueryError::Cancelled
            .with_cause(io::Error::other("ignored"))
            .transient();
        assert!(err.is_cancelled());
        assert!(!err.is_retryable());
        assert!(err.source().is_none());
    }
}

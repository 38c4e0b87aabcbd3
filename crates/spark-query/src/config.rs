//! 适配器配置。
//!
//! # 教案式说明
//! - **意图 (Why)**：同一套适配逻辑需要在“内存集合”与“远端数据库”等差异很大的提供者上运行，
//!   取消检查频率、物化上限、是否允许下推等参数必须可以按部署调整；
//! - **逻辑 (How)**：[`AdapterOptions`] 同时支持 Builder 风格方法与 TOML 反序列化，
//!   两条路径最终都经过 [`AdapterOptions::validate`]；
//! - **契约 (What)**：校验失败返回 `query.configuration`，不会产生部分生效的配置。

use std::num::NonZeroUsize;

use serde::Deserialize;

use crate::error::{QueryError, Result};

const DEFAULT_CANCELLATION_CHECK_INTERVAL: usize = 64;

/// 适配器运行参数。
///
/// TOML 示例：
///
/// ```toml
/// cancellation_check_interval = 16
/// materialization_limit = 100000
/// allow_pushdown = false
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdapterOptions {
    /// 扫描期间每隔多少个元素检查一次取消信号。
    pub cancellation_check_interval: usize,
    /// 单次查询允许物化的最大元素数；`None` 表示不设上限。
    pub materialization_limit: Option<usize>,
    /// 是否允许把无显式比较器的 `Contains` 下推给提供者。
    pub allow_pushdown: bool,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            cancellation_check_interval: DEFAULT_CANCELLATION_CHECK_INTERVAL,
            materialization_limit: None,
            allow_pushdown: true,
        }
    }
}

impl AdapterOptions {
    /// 从 TOML 文本解析并校验配置；缺省字段取默认值。
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let options: AdapterOptions = toml::from_str(text)
            .map_err(|err| QueryError::configuration(err.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// 设置取消检查间隔。
    pub fn with_cancellation_check_interval(mut self, interval: NonZeroUsize) -> Self {
        self.cancellation_check_interval = interval.get();
        self
    }

    /// 设置物化上限。
    pub fn with_materialization_limit(mut self, limit: NonZeroUsize) -> Self {
        self.materialization_limit = Some(limit.get());
        self
    }

    /// 设置是否允许下推。
    pub fn with_pushdown(mut self, allow: bool) -> Self {
        self.allow_pushdown = allow;
        self
    }

    /// 校验字段取值。
    ///
    /// # 契约说明（What）
    /// - `cancellation_check_interval` 必须不小于 1；
    /// - `materialization_limit` 若存在必须不小于 1。
    pub fn validate(&self) -> Result<()> {
        if self.cancellation_check_interval == 0 {
            return Err(QueryError::configuration(
                "cancellation_check_interval must be at least 1",
            ));
        }
        if self.materialization_limit == Some(0) {
            return Err(QueryError::configuration(
                "materialization_limit must be at least 1 when present",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::codes;

    #[test]
    fn empty_document_yields_defaults() {
        let options = AdapterOptions::from_toml_str("").expect("空文档应使用默认值");
        assert_eq!(options, AdapterOptions::default());
        assert_eq!(options.cancellation_check_interval, 64);
        assert!(options.allow_pushdown);
    }

    #[test]
    fn toml_overrides_are_applied() {
        let options = AdapterOptions::from_toml_str(
            "cancellation_check_interval = 4\nmaterialization_limit = 10\nallow_pushdown = false\n",
        )
        .expect("合法配置应解析成功");
        assert_eq!(options.cancellation_check_interval, 4);
        assert_eq!(options.materialization_limit, Some(10));
        assert!(!options.allow_pushdown);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = AdapterOptions::from_toml_str("cancellation_check_interval = 0")
            .expect_err("0 间隔必须被拒绝");
        assert_eq!(err.code(), codes::CONFIGURATION);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = AdapterOptions::from_toml_str("retry = true").expect_err("未知字段必须被拒绝");
        assert_eq!(err.code(), codes::CONFIGURATION);
    }

    #[test]
    fn builder_methods_compose() {
        let options = AdapterOptions::default()
            .with_cancellation_check_interval(NonZeroUsize::MIN)
            .with_materialization_limit(NonZeroUsize::new(3).expect("非零"))
            .with_pushdown(false);
        assert!(options.validate().is_ok());
        assert_eq!(options.cancellation_check_interval, 1);
        assert_eq!(options.materialization_limit, Some(3));
    }
}

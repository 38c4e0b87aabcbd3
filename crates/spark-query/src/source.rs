//! 提供者接缝。
//!
//! # 教案式说明
//! - **意图 (Why)**：适配层需要面对“任意底层查询提供者”：内存集合、数据库驱动、远端服务……
//!   它们唯一的共同点是能按需异步产出同一类型的元素。以 [`QuerySource`] 抽象这一能力，
//!   算子的语义（稳定排序、默认比较器、取消检查）全部由适配层统一实现；
//! - **逻辑 (How)**：提供者只需实现 [`scan`](QuerySource::scan)；若后端具备原生的成员判定能力
//!   （例如索引查找），可覆写 [`contains_native`](QuerySource::contains_native) 下推 `Contains`；
//! - **契约 (What)**：
//!   - `scan` 产出的序列在一次查询期间必须稳定（同一查询多次扫描得到相同顺序与内容）；
//!   - 提供者应在流式产出期间观察取消信号并以 [`QueryError::Cancelled`](crate::QueryError::Cancelled) 结束；
//!   - `contains_native` 返回 `None` 表示不支持下推，适配层将回退到扫描路径。

use async_trait::async_trait;

use crate::cancellation::Cancellation;
use crate::error::Result;
use crate::future::BoxStream;
use crate::value::QueryValue;

/// 异步查询提供者。
#[async_trait]
pub trait QuerySource<T: QueryValue>: Send + Sync + 'static {
    /// 提供者名称，用于日志与错误上下文。
    fn name(&self) -> &str;

    /// 异步预热（建立连接、加载元数据等），由适配器工厂在 `build` 阶段调用一次。
    async fn prepare(&self) -> Result<()> {
        Ok(())
    }

    /// 按提供者的自然顺序产出全部元素。
    fn scan<'a>(&'a self, cancellation: &'a Cancellation) -> BoxStream<'a, Result<T>>;

    /// 以默认相等语义判定成员关系的下推入口。
    ///
    /// 返回 `None` 表示不支持下推；返回 `Some(result)` 时结果必须与扫描路径一致。
    async fn contains_native(
        &self,
        _value: &T,
        _cancellation: &Cancellation,
    ) -> Option<Result<bool>> {
        None
    }
}

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{QueryError, Result};

/// 取消原语，统一表达异步查询的可中断性契约。
///
/// # 设计背景（Why）
/// - 终端算子（`contains`、`to_list` 等）可能在底层提供者上执行长时间扫描，调用方必须能够从外部打断；
/// - 库本身保持运行时中立，因此不依赖任何执行器的任务取消机制，而以共享原子位表达取消状态。
///
/// # 逻辑解析（How）
/// - 内部使用 [`AtomicBool`] 表达取消状态，并通过 [`Arc`] 支持多方共享；
/// - `cancel` 在首次成功设置取消位时返回 `true`，重复调用返回 `false`；
/// - `child` 生成单向派生的子令牌：子令牌持有父状态的引用，父方取消对子方可见，子方取消只停在自身；
///   传给“可取消键选择器”等下游协作者时，协作者因此无法改写调用方令牌。
///
/// # 契约说明（What）
/// - 默认构造处于“未取消”状态；
/// - 一旦 `cancel` 成功，所有克隆与子令牌立即可见；
/// - 子令牌的 `cancel` 不影响父令牌及其克隆；
/// - 算子在触达提供者之前、按配置间隔的元素之间、以及每次异步键求值之后调用 [`check`](Self::check)。
///
/// # 设计取舍与风险（Trade-offs）
/// - 未提供回调注册接口，取消是协作式的：提供者需在流式产出时自行检查 `is_cancelled`。
#[derive(Clone, Debug)]
pub struct Cancellation {
    inner: Arc<CancellationState>,
}

#[derive(Debug, Default)]
struct CancellationState {
    flag: AtomicBool,
    parent: Option<Arc<CancellationState>>,
}

impl CancellationState {
    fn is_set(&self) -> bool {
        self.flag.load(Ordering::Acquire)
            || self.parent.as_ref().is_some_and(|parent| parent.is_set())
    }
}

impl Cancellation {
    /// 创建处于“未取消”状态的取消令牌。
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CancellationState::default()),
        }
    }

    /// 创建一个已经处于取消态的令牌，常用于契约测试中的“预先取消”场景。
    pub fn cancelled() -> Self {
        let token = Self::new();
        token.cancel();
        token
    }

    /// 查询当前是否已被标记取消。
    pub fn is_cancelled(&self) -> bool {
        self.inner.is_set()
    }

    /// 将当前令牌标记为取消。
    ///
    /// 返回值为 `true` 表示本次调用首次触发取消；返回 `false` 表示之前已被取消（含父令牌已取消）。
    pub fn cancel(&self) -> bool {
        if self.is_cancelled() {
            return false;
        }
        self.inner
            .flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// 派生子令牌：观察本令牌的取消，自身的取消不向上传播。
    pub fn child(&self) -> Self {
        Self {
            inner: Arc::new(CancellationState {
                flag: AtomicBool::new(false),
                parent: Some(Arc::clone(&self.inner)),
            }),
        }
    }

    /// 已取消时返回 [`QueryError::Cancelled`]，否则返回 `Ok(())`。
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(QueryError::Cancelled)
        } else {
            Ok(())
        }
    }
}

impl Default for Cancellation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_idempotent_and_visible_to_children() {
        let token = Cancellation::new();
        assert!(!token.is_cancelled(), "默认构造后应处于未取消态");
        assert!(token.check().is_ok());

        let child = token.child();
        assert!(token.cancel(), "首次取消应返回 true");
        assert!(!token.cancel(), "重复取消必须保持幂等（返回 false）");
        assert!(child.is_cancelled(), "子令牌应立即观察到父令牌的取消状态");
        assert!(matches!(child.check(), Err(QueryError::Cancelled)));
    }

    #[test]
    fn child_cancel_stays_below_the_parent() {
        let token = Cancellation::new();
        let clone = token.clone();
        let child = token.child();
        let grandchild = child.child();

        assert!(child.cancel());
        assert!(child.is_cancelled());
        assert!(grandchild.is_cancelled(), "孙令牌应观察到子令牌的取消");
        assert!(!token.is_cancelled(), "子令牌取消不得改写父令牌");
        assert!(!clone.is_cancelled());
        assert!(token.check().is_ok());
    }

    #[test]
    fn pre_cancelled_constructor_starts_tripped() {
        let token = Cancellation::cancelled();
        assert!(token.is_cancelled());
        assert!(!token.cancel());
    }
}

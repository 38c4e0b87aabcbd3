//! 键选择器与比较器。
//!
//! # 教案式说明
//! - **意图 (Why)**：排序算子存在三种“重载形态”：同步选择器、可等待选择器、接收取消信号的可等待选择器；
//!   每种形态又可选地附带显式比较器。以枚举统一三种形态，排序引擎只需面对一个求值入口；
//! - **逻辑 (How)**：选择器与比较器都以 `Arc<dyn Fn ..>` 保存，克隆成本为常数，可在多个
//!   [`OrderedAsyncQueryable`](crate::OrderedAsyncQueryable) 之间共享；
//! - **契约 (What)**：选择器必须是纯函数，同一元素多次求值得到相同的键；比较器必须是全序。

use std::cmp::Ordering;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::cancellation::Cancellation;
use crate::future::BoxFuture;
use crate::value::QueryValue;

type SyncFn<T, K> = Arc<dyn Fn(&T) -> K + Send + Sync>;
type AwaitFn<T, K> = Arc<dyn Fn(&T) -> BoxFuture<'static, K> + Send + Sync>;
type CancellableFn<T, K> = Arc<dyn Fn(&T, Cancellation) -> BoxFuture<'static, K> + Send + Sync>;

/// 键选择器的三种重载形态。
pub enum KeySelector<T, K> {
    /// 同步投影，例如 `|p| p + 3`。
    Sync(SyncFn<T, K>),
    /// 返回 Future 的投影。
    Await(AwaitFn<T, K>),
    /// 返回 Future 且接收取消信号的投影。
    AwaitWithCancellation(CancellableFn<T, K>),
}

impl<T, K> KeySelector<T, K>
where
    T: Send + Sync + 'static,
    K: Send + 'static,
{
    /// 包装同步投影。
    pub fn sync<F>(selector: F) -> Self
    where
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        KeySelector::Sync(Arc::new(selector))
    }

    /// 包装可等待投影。
    ///
    /// 投影在借用元素期间同步执行，返回的 Future 不得借用元素；需要元素内容时先在闭包内克隆。
    pub fn awaitable<F, Fut>(selector: F) -> Self
    where
        F: Fn(&T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = K> + Send + 'static,
    {
        KeySelector::Await(Arc::new(move |item: &T| {
            Box::pin(selector(item)) as BoxFuture<'static, K>
        }))
    }

    /// 包装接收取消信号的可等待投影。
    ///
    /// 传入的令牌是调用方令牌的子令牌；投影可以在长耗时求值中途观察到取消并提前返回任意键，
    /// 排序引擎在每次求值后都会重新检查取消状态，因此提前返回的键不会进入结果。
    /// 子令牌只读地观察调用方：投影对它调用 `cancel` 不会取消查询，也不会污染调用方后续复用的令牌。
    pub fn cancellable<F, Fut>(selector: F) -> Self
    where
        F: Fn(&T, Cancellation) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = K> + Send + 'static,
    {
        KeySelector::AwaitWithCancellation(Arc::new(move |item: &T, token: Cancellation| {
            Box::pin(selector(item, token)) as BoxFuture<'static, K>
        }))
    }

    /// 返回重载形态的稳定名称，用于日志字段。
    pub fn shape(&self) -> &'static str {
        match self {
            KeySelector::Sync(_) => "sync",
            KeySelector::Await(_) => "await",
            KeySelector::AwaitWithCancellation(_) => "await_with_cancellation",
        }
    }

    /// 对单个元素求键。
    pub async fn select(&self, item: &T, cancellation: &Cancellation) -> K {
        match self {
            KeySelector::Sync(selector) => selector(item),
            KeySelector::Await(selector) => selector(item).await,
            KeySelector::AwaitWithCancellation(selector) => {
                selector(item, cancellation.child()).await
            }
        }
    }
}

impl<T, K> Clone for KeySelector<T, K> {
    fn clone(&self) -> Self {
        match self {
            KeySelector::Sync(selector) => KeySelector::Sync(Arc::clone(selector)),
            KeySelector::Await(selector) => KeySelector::Await(Arc::clone(selector)),
            KeySelector::AwaitWithCancellation(selector) => {
                KeySelector::AwaitWithCancellation(Arc::clone(selector))
            }
        }
    }
}

impl<T, K> fmt::Debug for KeySelector<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = match self {
            KeySelector::Sync(_) => "Sync",
            KeySelector::Await(_) => "Await",
            KeySelector::AwaitWithCancellation(_) => "AwaitWithCancellation",
        };
        f.debug_tuple("KeySelector").field(&shape).finish()
    }
}

/// 排序比较器。
///
/// # 契约说明（What）
/// - [`KeyComparer::default`] 使用 [`QueryValue::value_cmp`]；
/// - 显式比较器必须是全序，否则稳定排序的结果不可预测。
pub struct KeyComparer<K> {
    compare: Arc<dyn Fn(&K, &K) -> Ordering + Send + Sync>,
}

impl<K: 'static> KeyComparer<K> {
    /// 以自定义函数构造比较器。
    pub fn new<F>(compare: F) -> Self
    where
        F: Fn(&K, &K) -> Ordering + Send + Sync + 'static,
    {
        Self {
            compare: Arc::new(compare),
        }
    }

    /// 比较两个键。
    pub fn compare(&self, left: &K, right: &K) -> Ordering {
        (self.compare)(left, right)
    }

    /// 返回反向比较器。
    pub fn reversed(&self) -> Self {
        let inner = Arc::clone(&self.compare);
        Self::new(move |left, right| inner(right, left))
    }
}

impl<K: QueryValue> Default for KeyComparer<K> {
    fn default() -> Self {
        Self::new(K::value_cmp)
    }
}

impl<K> Clone for KeyComparer<K> {
    fn clone(&self) -> Self {
        Self {
            compare: Arc::clone(&self.compare),
        }
    }
}

impl<K> fmt::Debug for KeyComparer<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyComparer")
    }
}

/// 相等比较器，供 `Contains` 使用。
///
/// 比较时以 `(元素, 目标值)` 的顺序调用。
pub struct ValueEquality<T> {
    equals: Arc<dyn Fn(&T, &T) -> bool + Send + Sync>,
}

impl<T: 'static> ValueEquality<T> {
    /// 以自定义函数构造相等比较器。
    pub fn new<F>(equals: F) -> Self
    where
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        Self {
            equals: Arc::new(equals),
        }
    }

    /// 判断元素是否与目标值相等。
    pub fn equals(&self, element: &T, value: &T) -> bool {
        (self.equals)(element, value)
    }
}

impl<T: QueryValue> Default for ValueEquality<T> {
    fn default() -> Self {
        Self::new(T::value_eq)
    }
}

impl<T> Clone for ValueEquality<T> {
    fn clone(&self) -> Self {
        Self {
            equals: Arc::clone(&self.equals),
        }
    }
}

impl<T> fmt::Debug for ValueEquality<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValueEquality")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn every_shape_yields_the_same_key() {
        let token = Cancellation::new();
        let shapes: [KeySelector<i32, i32>; 3] = [
            KeySelector::sync(|p| p + 3),
            KeySelector::awaitable(|p: &i32| {
                let p = *p;
                async move { p + 3 }
            }),
            KeySelector::cancellable(|p: &i32, _token| {
                let p = *p;
                async move { p + 3 }
            }),
        ];
        for selector in &shapes {
            assert_eq!(block_on(selector.select(&4, &token)), 7, "形态 {}", selector.shape());
        }
    }

    #[test]
    fn cancellable_selector_observes_but_cannot_cancel_the_caller() {
        let token = Cancellation::new();
        let selector = KeySelector::cancellable(|_: &i32, child: Cancellation| async move {
            let seen = child.is_cancelled();
            child.cancel();
            i32::from(seen)
        });
        assert_eq!(block_on(selector.select(&1, &token)), 0);
        assert!(!token.is_cancelled(), "投影取消子令牌不得改写调用方令牌");

        token.cancel();
        assert_eq!(block_on(selector.select(&1, &token)), 1, "调用方取消应对子令牌可见");
    }

    #[test]
    fn reversed_comparer_flips_ordering() {
        let comparer = KeyComparer::<Option<i32>>::default();
        assert_eq!(comparer.compare(&None, &Some(1)), Ordering::Less);
        assert_eq!(comparer.reversed().compare(&None, &Some(1)), Ordering::Greater);
    }

    #[test]
    fn default_equality_matches_value_semantics() {
        let equality = ValueEquality::<f32>::default();
        assert!(equality.equals(&f32::NAN, &f32::NAN));
        let custom = ValueEquality::new(|a: &i64, b: &i64| a.abs() == b.abs());
        assert!(custom.equals(&-5, &5));
    }
}

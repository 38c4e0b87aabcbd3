use std::any::Any;
use std::borrow::Cow;
use std::panic;

/// 失败信息前缀，形如 `[spark-query-tck::order_by::sync_selector::<f64>]`。
fn context_prefix(suite: &str, case: &str) -> String {
    format!("[spark-query-tck::{suite}::{case}]")
}

/// 尽力把 panic 载荷还原为文本。
fn describe_payload(payload: &(dyn Any + Send)) -> Cow<'_, str> {
    if let Some(text) = payload.downcast_ref::<&str>() {
        Cow::Borrowed(text)
    } else if let Some(text) = payload.downcast_ref::<String>() {
        Cow::Borrowed(text.as_str())
    } else {
        Cow::Borrowed("<未知 panic 类型>")
    }
}

/// 附加“套件/用例”上下文后继续展开 panic。
///
/// # 教案式说明
/// - **意图 (Why)**：用例名已编码元素类型与重载形态，带上前缀后调试者可以直接定位到失败的矩阵单元；
/// - **逻辑 (How)**：格式化载荷文本，通过 [`panic::resume_unwind`] 继续展开，不再触发 panic hook；
/// - **契约 (What)**：只在 `catch_unwind` 的错误分支中调用；函数不会正常返回。
pub fn panic_with_context(suite: &str, case: &str, payload: Box<dyn Any + Send>) -> ! {
    let message = format!(
        "{} 测试失败：{}",
        context_prefix(suite, case),
        describe_payload(payload.as_ref())
    );
    panic::resume_unwind(Box::new(message));
}

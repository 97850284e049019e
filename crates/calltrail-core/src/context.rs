//! Record context and the caller-context merge

use crate::capture::CallerContext;
use serde_json::Value;
use std::collections::BTreeMap;

/// Structured fields supplied with a log call
pub type Context = BTreeMap<String, Value>;

/// Add captured frames to `context` without touching keys it already has
///
/// Caller-supplied fields always win over `_backtrace_level_*` entries of the
/// same name.
pub fn merge_caller_context(mut context: Context, caller: &CallerContext) -> Context {
    for (key, location) in caller.iter() {
        context
            .entry(key)
            .or_insert_with(|| Value::String(location.to_string()));
    }
    context
}

/// Build a [`Context`] from `key => value` pairs
///
/// Values go through `serde_json::json!`, so anything serializable works.
///
/// ```
/// use calltrail_core::context;
///
/// let ctx = context! { "user_id" => 42, "retry" => true };
/// assert_eq!(ctx.len(), 2);
/// ```
#[macro_export]
macro_rules! context {
    () => {
        $crate::Context::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut ctx = $crate::Context::new();
        $(
            ctx.insert(::std::string::ToString::to_string(&$key), $crate::serde_json::json!($value));
        )+
        ctx
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CallerContextCapture, CaptureWindow};
    use crate::frame::{CallStack, StackFrame};

    fn caller_context() -> CallerContext {
        let stack = CallStack::from_frames(vec![
            StackFrame::new("src/api.rs", 12),
            StackFrame::new("src/main.rs", 3),
        ]);
        CallerContextCapture::new(CaptureWindow::full()).capture(&stack)
    }

    #[test]
    fn test_merge_adds_backtrace_keys() {
        let merged = merge_caller_context(context! { "user" => "ana" }, &caller_context());

        assert_eq!(merged.len(), 3);
        assert_eq!(merged["user"], Value::from("ana"));
        assert_eq!(merged["_backtrace_level_0"], Value::from("src/api.rs:12"));
        assert_eq!(merged["_backtrace_level_1"], Value::from("src/main.rs:3"));
    }

    #[test]
    fn test_merge_never_overwrites_caller_keys() {
        let supplied = context! { "_backtrace_level_0" => "mine" };
        let merged = merge_caller_context(supplied, &caller_context());

        assert_eq!(merged["_backtrace_level_0"], Value::from("mine"));
        assert_eq!(merged["_backtrace_level_1"], Value::from("src/main.rs:3"));
    }

    #[test]
    fn test_merge_with_empty_caller_context() {
        let merged = merge_caller_context(context! { "a" => 1 }, &CallerContext::default());
        assert_eq!(merged, context! { "a" => 1 });
    }

    #[test]
    fn test_context_macro_accepts_nested_values() {
        let ctx = context! { "ids" => [1, 2, 3], "meta" => serde_json::json!({ "ok": true }) };
        assert_eq!(ctx["ids"], serde_json::json!([1, 2, 3]));
        assert_eq!(ctx["meta"]["ok"], Value::Bool(true));
        assert!(context!().is_empty());
    }
}

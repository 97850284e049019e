//! calltrail core - caller context capture for log records
//!
//! This crate holds everything that is independent of the output channels:
//! - The eight canonical severities (`Level`)
//! - Explicit call-site frames (`StackFrame`, `CallStack`, `enter_frame!`)
//! - The bounded capture window and `CallerContextCapture`
//! - Context merging and the `LogRecord` handed to the backend
//!
//! Frames are collected with `#[track_caller]` and an opt-in thread-local
//! frame chain. Nothing here walks the native stack.

pub mod capture;
pub mod context;
pub mod frame;
pub mod level;
pub mod record;

pub use capture::{CallerContext, CallerContextCapture, CaptureWindow, WindowLength};
pub use context::{merge_caller_context, Context};
pub use frame::{CallStack, FrameGuard, StackFrame};
pub use level::Level;
pub use record::LogRecord;

// Used by the `context!` macro
#[doc(hidden)]
pub use serde_json;

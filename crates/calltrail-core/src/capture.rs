//! Caller context capture
//!
//! Turns a [`CallStack`] into the bounded `_backtrace_level_<i>` mapping
//! attached to every record. The window selects indices
//! `[offset, offset + length)`; indices past the end of the stack are
//! skipped without error.

use crate::context::Context;
use crate::frame::CallStack;
use calltrail_core_types::schema::backtrace_key;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// How many frames a window covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowLength {
    /// Everything from the offset to the end of the stack, decided per call
    #[default]
    Full,
    /// Exactly this many indices starting at the offset
    Fixed(usize),
    /// Fixed to the depth of the first stack captured, then reused for the
    /// lifetime of the capture instance
    MemoizeFirst,
}

/// Range of stack frames eligible for a record's context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaptureWindow {
    pub length: WindowLength,
    pub offset: usize,
}

impl CaptureWindow {
    pub fn new(length: WindowLength, offset: usize) -> Self {
        Self { length, offset }
    }

    /// `length` frames starting at the innermost one
    pub fn fixed(length: usize) -> Self {
        Self::new(WindowLength::Fixed(length), 0)
    }

    /// The whole stack from the innermost frame
    pub fn full() -> Self {
        Self::default()
    }

    /// Legacy rule: length fixed by the first capture
    pub fn memoize_first() -> Self {
        Self::new(WindowLength::MemoizeFirst, 0)
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

/// Captured frames keyed by stack index, innermost first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerContext {
    entries: BTreeMap<usize, String>,
}

impl CallerContext {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The `file:line` captured for stack index `index`
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(&index).map(String::as_str)
    }

    /// Stack indices present, ascending
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.keys().copied()
    }

    /// `(_backtrace_level_<i>, file:line)` pairs in frame order
    pub fn iter(&self) -> impl Iterator<Item = (String, &str)> + '_ {
        self.entries
            .iter()
            .map(|(index, location)| (backtrace_key(*index), location.as_str()))
    }

    /// Render as record context fields
    pub fn to_context(&self) -> Context {
        self.iter()
            .map(|(key, location)| (key, Value::String(location.to_string())))
            .collect()
    }
}

/// Applies a [`CaptureWindow`] to call stacks
///
/// Owned by a logger. The only state that changes after construction is the
/// memoized length of a [`WindowLength::MemoizeFirst`] window, which is set
/// at most once.
#[derive(Debug, Clone, Default)]
pub struct CallerContextCapture {
    window: CaptureWindow,
    memoized: OnceLock<usize>,
}

impl CallerContextCapture {
    pub fn new(window: CaptureWindow) -> Self {
        Self {
            window,
            memoized: OnceLock::new(),
        }
    }

    pub fn window(&self) -> CaptureWindow {
        self.window
    }

    /// Replace the window; any memoized length is discarded
    pub fn set_window(&mut self, length: WindowLength, offset: usize) {
        self.window = CaptureWindow::new(length, offset);
        self.memoized = OnceLock::new();
    }

    /// Length fixed by the first capture, if a memoizing window has captured
    pub fn memoized_length(&self) -> Option<usize> {
        self.memoized.get().copied()
    }

    pub fn capture(&self, stack: &CallStack) -> CallerContext {
        let offset = self.window.offset;
        let length = self.resolve_length(stack.depth());
        let end = offset.saturating_add(length).min(stack.depth());

        let entries = (offset..end)
            .filter_map(|index| stack.get(index).map(|frame| (index, frame.to_string())))
            .collect();

        CallerContext { entries }
    }

    fn resolve_length(&self, depth: usize) -> usize {
        match self.window.length {
            WindowLength::Full => depth.saturating_sub(self.window.offset),
            WindowLength::Fixed(length) => length,
            // The stack never holds the capture's own frame, so the first
            // depth is the whole caller chain.
            WindowLength::MemoizeFirst => *self.memoized.get_or_init(|| depth),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::StackFrame;

    fn stack_of_depth(depth: usize) -> CallStack {
        (0..depth)
            .map(|i| StackFrame::new(format!("src/f{}.rs", i), 10 + i as u32))
            .collect()
    }

    #[test]
    fn test_fixed_window_from_zero() {
        let capture = CallerContextCapture::new(CaptureWindow::fixed(2));
        let ctx = capture.capture(&stack_of_depth(5));

        let keys: Vec<String> = ctx.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["_backtrace_level_0", "_backtrace_level_1"]);
        assert_eq!(ctx.get(0), Some("src/f0.rs:10"));
        assert_eq!(ctx.get(1), Some("src/f1.rs:11"));
    }

    #[test]
    fn test_window_past_end_is_truncated() {
        let capture = CallerContextCapture::new(CaptureWindow::fixed(3).with_offset(2));
        let ctx = capture.capture(&stack_of_depth(4));

        assert_eq!(ctx.indices().collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(ctx.len(), 2);
    }

    #[test]
    fn test_offset_beyond_depth_is_empty() {
        let capture = CallerContextCapture::new(CaptureWindow::fixed(3).with_offset(4));
        assert!(capture.capture(&stack_of_depth(4)).is_empty());

        let full = CallerContextCapture::new(CaptureWindow::full().with_offset(9));
        assert!(full.capture(&stack_of_depth(4)).is_empty());
    }

    #[test]
    fn test_full_window_recomputes_per_call() {
        let capture = CallerContextCapture::default();
        assert_eq!(capture.capture(&stack_of_depth(3)).len(), 3);
        assert_eq!(capture.capture(&stack_of_depth(6)).len(), 6);
        assert_eq!(capture.memoized_length(), None);
    }

    #[test]
    fn test_memoized_length_survives_deeper_stack() {
        let capture = CallerContextCapture::new(CaptureWindow::memoize_first());

        let first = capture.capture(&stack_of_depth(3));
        assert_eq!(first.len(), 3);
        assert_eq!(capture.memoized_length(), Some(3));

        let deeper = capture.capture(&stack_of_depth(7));
        assert_eq!(deeper.indices().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_set_window_resets_memoized_length() {
        let mut capture = CallerContextCapture::new(CaptureWindow::memoize_first());
        capture.capture(&stack_of_depth(2));
        assert_eq!(capture.memoized_length(), Some(2));

        capture.set_window(WindowLength::MemoizeFirst, 1);
        assert_eq!(capture.memoized_length(), None);
        assert_eq!(capture.window().offset, 1);

        let ctx = capture.capture(&stack_of_depth(5));
        assert_eq!(capture.memoized_length(), Some(5));
        assert_eq!(ctx.indices().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_huge_length_does_not_overflow() {
        let capture =
            CallerContextCapture::new(CaptureWindow::fixed(usize::MAX).with_offset(usize::MAX));
        assert!(capture.capture(&stack_of_depth(3)).is_empty());
    }

    #[test]
    fn test_to_context_uses_reserved_keys() {
        let capture = CallerContextCapture::new(CaptureWindow::fixed(1));
        let ctx = capture.capture(&stack_of_depth(2)).to_context();
        assert_eq!(
            ctx.get("_backtrace_level_0"),
            Some(&Value::String("src/f0.rs:10".to_string()))
        );
        assert_eq!(ctx.len(), 1);
    }
}

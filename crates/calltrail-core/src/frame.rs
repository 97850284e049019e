//! Explicit call-site frames
//!
//! A [`CallStack`] is built from two sources:
//!
//! 1. the immediate call site of the logging method, read through
//!    `#[track_caller]`, which is always frame 0;
//! 2. the frames the current thread registered with [`enter_frame!`],
//!    innermost first.
//!
//! Each [`FrameGuard`] pops its frame when dropped, so the chain follows
//! lexical scope.
//!
//! # Example
//!
//! ```
//! use calltrail_core::{enter_frame, CallStack};
//!
//! fn handle_request() -> CallStack {
//!     let _frame = enter_frame!();
//!     CallStack::capture_here()
//! }
//!
//! let stack = handle_request();
//! assert_eq!(stack.depth(), 2);
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::marker::PhantomData;
use std::panic::Location;

thread_local! {
    // Registered frames, outermost first, each tagged with its guard's id
    static CALL_CHAIN: RefCell<Vec<(u64, StackFrame)>> = const { RefCell::new(Vec::new()) };
    static NEXT_GUARD_ID: Cell<u64> = const { Cell::new(0) };
}

/// One caller location
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StackFrame {
    file: String,
    line: u32,
}

impl StackFrame {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// The location of whoever called this (through any chain of
    /// `#[track_caller]` functions)
    #[track_caller]
    pub fn caller() -> Self {
        Self::from_location(Location::caller())
    }

    pub fn from_location(location: &Location<'_>) -> Self {
        Self::new(location.file(), location.line())
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Ordered frames, innermost first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallStack {
    frames: Vec<StackFrame>,
}

impl CallStack {
    /// Build a stack from explicitly supplied frames (innermost first)
    pub fn from_frames(frames: Vec<StackFrame>) -> Self {
        Self { frames }
    }

    /// The caller's location followed by the frames registered on this
    /// thread
    #[track_caller]
    pub fn capture_here() -> Self {
        let mut frames = vec![StackFrame::caller()];
        // try_with: the chain may already be gone during thread teardown
        let _ = CALL_CHAIN.try_with(|chain| {
            frames.extend(chain.borrow().iter().rev().map(|(_, frame)| frame.clone()))
        });
        Self { frames }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&StackFrame> {
        self.frames.get(index)
    }

    pub fn frames(&self) -> &[StackFrame] {
        &self.frames
    }
}

impl FromIterator<StackFrame> for CallStack {
    fn from_iter<I: IntoIterator<Item = StackFrame>>(iter: I) -> Self {
        Self::from_frames(iter.into_iter().collect())
    }
}

/// Keeps a frame registered on the current thread's chain until dropped
///
/// Guards are `!Send`: a frame belongs to the thread that entered it.
#[derive(Debug)]
#[must_use = "the frame is popped as soon as the guard is dropped"]
pub struct FrameGuard {
    id: u64,
    _thread_bound: PhantomData<*const ()>,
}

impl FrameGuard {
    /// Register the caller's location
    #[track_caller]
    pub fn enter() -> Self {
        Self::push(StackFrame::caller())
    }

    /// Register an explicit frame
    pub fn push(frame: StackFrame) -> Self {
        let id = NEXT_GUARD_ID.with(|next| {
            let id = next.get();
            next.set(id.wrapping_add(1));
            id
        });
        CALL_CHAIN.with(|chain| chain.borrow_mut().push((id, frame)));
        Self {
            id,
            _thread_bound: PhantomData,
        }
    }

    /// Number of frames registered on this thread
    pub fn chain_depth() -> usize {
        CALL_CHAIN.try_with(|chain| chain.borrow().len()).unwrap_or(0)
    }
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        // A guard dropped out of order also removes the frames entered after
        // it. A guard whose frame is already gone leaves the chain alone.
        let _ = CALL_CHAIN.try_with(|chain| {
            let mut chain = chain.borrow_mut();
            if let Some(position) = chain.iter().rposition(|(id, _)| *id == self.id) {
                chain.truncate(position);
            }
        });
    }
}

/// Register the current source location on this thread's frame chain
///
/// Bind the result to a named variable (`let _frame = ...`); binding to `_`
/// drops the guard immediately.
#[macro_export]
macro_rules! enter_frame {
    () => {
        $crate::frame::FrameGuard::enter()
    };
    ($file:expr, $line:expr) => {
        $crate::frame::FrameGuard::push($crate::frame::StackFrame::new($file, $line))
    };
}

//! Streamed response assembly.
//!
//! A streaming transport delivers a response as an ordered sequence of partial JSON
//! deltas. [`DeltaMerger`] folds each delta into a [`DeltaState`] whose shape (the
//! *skeleton*) is established before the first merge.
//!
//! ## Merge rules
//!
//! | Skeleton node | Delta value | Effect |
//! |---------------|-------------|--------|
//! | `Leaf` | string | appended |
//! | `Object` | object | fields merged recursively |
//! | `Sequence` | array of fragments | each fragment's `index` removed, rest merged into that slot |
//! | any | `null`, number, boolean | skipped |
//! | absent key in an open placeholder | string / object | field created |
//! | absent key elsewhere, absent slot | any | [`MergeError`] |
//!
//! Top-level `role` fields are dropped before merging: the protocol resends the role
//! token on every chunk.
//!
//! ## Example
//!
//! ```rust
//! use ai_lib_tools::pipeline::{DeltaMerger, DeltaState};
//! use serde_json::json;
//!
//! let mut acc = DeltaState::from_skeleton(&json!({"content": "", "tool_calls": [{}]}))?;
//! let merger = DeltaMerger::default();
//!
//! merger.merge(&mut acc, &json!({"role": "assistant", "content": "He"}))?;
//! merger.merge(&mut acc, &json!({"role": "assistant", "content": "llo"}))?;
//! merger.merge(&mut acc, &json!({"tool_calls": [{"index": 0, "id": "abc"}]}))?;
//!
//! assert_eq!(
//!     acc.to_value(),
//!     json!({"content": "Hello", "tool_calls": [{"id": "abc"}]})
//! );
//! # Ok::<(), ai_lib_tools::pipeline::MergeError>(())
//! ```

pub mod accumulate;
pub mod state;


pub use accumulate::{merge_chunk, DeltaMerger};
pub use state::{tool_call_slot, DeltaObject, DeltaState};

/// Errors raised while folding a delta. Each one terminates the current stream only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    #[error("Delta must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },

    #[error("Delta references absent path: {path}")]
    MissingPath { path: String },

    #[error("Delta references slot {index} of {path}, but only {len} are allocated\n💡 Hint: allocate slots with DeltaState::ensure_slots before merging")]
    MissingSlot {
        path: String,
        index: usize,
        len: usize,
    },

    #[error("Fragment at {path} carries no non-negative integer 'index'")]
    MissingIndex { path: String },

    #[error("Type mismatch at {path}: skeleton holds {expected}, delta carries {found}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Unsupported skeleton value at {path}: {found}")]
    UnsupportedSkeleton { path: String, found: &'static str },
}

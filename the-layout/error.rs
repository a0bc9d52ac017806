use thiserror::Error;

use crate::{
  editor::EditorId,
  file::FileRef,
  split::SplitId,
};

/// Errors surfaced by layout operations.
#[derive(Debug, Error)]
pub enum LayoutError {
  /// The caller asked for something that is not in the tree. Nothing was
  /// changed.
  #[error("precondition violated: {0}")]
  PreconditionViolation(#[from] Precondition),
  #[error("invalid layout state: {0}")]
  State(#[from] serde_json::Error),
}

/// Lookup misses reported through [`LayoutError::PreconditionViolation`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Precondition {
  #[error("editor {0} is not part of the layout")]
  UnknownEditor(EditorId),
  #[error("editor {0} is already part of the layout")]
  EditorExists(EditorId),
  #[error("split {0} is not part of the layout")]
  UnknownSplit(SplitId),
  #[error("{file} is not open in editor {editor}")]
  TabNotOpen { editor: EditorId, file: FileRef },
  #[error("index {index} is out of bounds (len: {len})")]
  IndexOutOfBounds { index: usize, len: usize },
}

/// Structural problems detected by the `validate` checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantError {
  DuplicateTab,
  DanglingSelection,
  DanglingTemporaryTab,
  HistoryOffsetOutOfBounds,
  ParentMismatch,
  EmptySplit,
  DuplicateEditor,
  UnreachableActiveEditor,
}

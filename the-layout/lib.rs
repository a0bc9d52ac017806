//! Split and tab layout engine for editor groups.
//!
//! The crate models an arbitrarily nested split view whose leaves are
//! editor groups ([`Editor`]) holding ordered tabs with back/forward
//! history. [`EditorManager`] owns the whole tree and tracks which group is
//! active. File contents, rendering, and storage of snapshots stay with
//! collaborators; the engine only talks to them through
//! [`DocumentStore`] and the [`events`] queue.

pub mod config;
pub mod documents;
pub mod editor;
pub mod error;
pub mod events;
pub mod file;
pub mod layout;
pub mod manager;
pub mod split;
pub mod state;
pub mod tab;

pub use config::LayoutConfig;
pub use documents::{
  DocumentError,
  DocumentStore,
  MemoryStore,
};
pub use editor::{
  Editor,
  EditorId,
};
pub use error::{
  InvariantError,
  LayoutError,
  Precondition,
};
pub use file::FileRef;
pub use layout::EditorLayout;
pub use manager::EditorManager;
pub use split::{
  SplitAxis,
  SplitEdge,
  SplitId,
  SplitViewData,
};
pub use tab::{
  CursorPosition,
  EditorTab,
};

/// Result type for layout operations.
pub type Result<T> = std::result::Result<T, LayoutError>;

//! Change notifications for UI collaborators.
//!
//! Nothing here pushes rendering commands. Views remember the last sequence
//! number they saw and ask for everything newer.

use std::collections::VecDeque;

use serde::{
  Deserialize,
  Serialize,
};

use crate::{
  editor::EditorId,
  file::FileRef,
};

pub const DEFAULT_EVENT_LIMIT: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutEventKind {
  ActiveEditorChanged {
    editor: EditorId,
  },
  /// The selected tab of the active editor changed, either inside that
  /// editor or because another editor became active.
  ActiveTabChanged {
    editor: EditorId,
    tab:    Option<FileRef>,
  },
  /// Split, close, or flatten changed the shape of the tree.
  LayoutChanged,
  TabsChanged {
    editor: EditorId,
  },
  SelectionChanged {
    editor: EditorId,
    tab:    Option<FileRef>,
  },
  FocusModeChanged {
    focusing: bool,
  },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEvent {
  pub seq:  u64,
  #[serde(flatten)]
  pub kind: LayoutEventKind,
}

/// Bounded queue of [`LayoutEvent`]s; the oldest events fall off first.
#[derive(Debug, Clone)]
pub struct EventLog {
  events:   VecDeque<LayoutEvent>,
  next_seq: u64,
  limit:    usize,
}

impl Default for EventLog {
  fn default() -> Self {
    Self::with_limit(DEFAULT_EVENT_LIMIT)
  }
}

impl EventLog {
  pub fn with_limit(limit: usize) -> Self {
    Self {
      events:   VecDeque::new(),
      next_seq: 1,
      limit:    limit.max(1),
    }
  }

  pub fn push(&mut self, kind: LayoutEventKind) -> u64 {
    let seq = self.next_seq;
    self.next_seq = self.next_seq.saturating_add(1);
    self.events.push_back(LayoutEvent { seq, kind });
    while self.events.len() > self.limit {
      self.events.pop_front();
    }
    seq
  }

  pub fn latest_seq(&self) -> u64 {
    self.next_seq.saturating_sub(1)
  }

  /// Sequence number of the oldest event still buffered. A reader whose
  /// last seen sequence is below this has missed events and should
  /// re-read the whole layout.
  pub fn oldest_seq(&self) -> u64 {
    self
      .events
      .front()
      .map(|event| event.seq)
      .unwrap_or(self.next_seq)
  }

  pub fn events_since(&self, seq: u64) -> Vec<LayoutEvent> {
    self
      .events
      .iter()
      .filter(|event| event.seq > seq)
      .cloned()
      .collect()
  }

  pub fn len(&self) -> usize {
    self.events.len()
  }

  pub fn is_empty(&self) -> bool {
    self.events.is_empty()
  }
}

//! Snapshot types for restoring a layout between sessions.
//!
//! The encoding is private and versionless: a tree of nodes tagged by
//! `type`, holding file references and ids only. No document contents are
//! stored.

use std::collections::BTreeSet;

use serde::{
  Deserialize,
  Serialize,
};

use crate::{
  documents::DocumentStore,
  editor::{
    Editor,
    EditorId,
  },
  file::FileRef,
  layout::EditorLayout,
  split::{
    SplitAxis,
    SplitId,
    SplitViewData,
  },
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorState {
  pub id:            EditorId,
  pub tabs:          Vec<FileRef>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub selected_tab:  Option<FileRef>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub temporary_tab: Option<FileRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitState {
  pub id:       SplitId,
  pub axis:     SplitAxis,
  pub children: Vec<LayoutState>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayoutState {
  One(EditorState),
  Vertical(SplitState),
  Horizontal(SplitState),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerState {
  pub layout:                    LayoutState,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub active_editor:             Option<EditorId>,
  #[serde(default)]
  pub is_focusing_active_editor: bool,
}

impl ManagerState {
  pub fn to_json(&self) -> crate::Result<String> {
    Ok(serde_json::to_string(self)?)
  }

  pub fn from_json(json: &str) -> crate::Result<Self> {
    Ok(serde_json::from_str(json)?)
  }
}

impl From<&Editor> for EditorState {
  fn from(editor: &Editor) -> Self {
    Self {
      id:            editor.id(),
      tabs:          editor.files().cloned().collect(),
      selected_tab:  editor.selected_file().cloned(),
      temporary_tab: editor.temporary_tab().map(|tab| tab.file().clone()),
    }
  }
}

impl From<&EditorLayout> for LayoutState {
  fn from(layout: &EditorLayout) -> Self {
    match layout {
      EditorLayout::Single(editor) => Self::One(editor.into()),
      EditorLayout::Vertical(data) => Self::Vertical(data.into()),
      EditorLayout::Horizontal(data) => Self::Horizontal(data.into()),
    }
  }
}

impl From<&SplitViewData> for SplitState {
  fn from(data: &SplitViewData) -> Self {
    Self {
      id:       data.id(),
      axis:     data.axis(),
      children: data.editor_layouts().iter().map(Into::into).collect(),
    }
  }
}

/// Rebuilds live layout nodes from a snapshot.
pub(crate) struct Restorer<'a> {
  documents:     &'a mut dyn DocumentStore,
  history_limit: usize,
  seen_editors:  BTreeSet<EditorId>,
}

impl<'a> Restorer<'a> {
  pub fn new(documents: &'a mut dyn DocumentStore, history_limit: usize) -> Self {
    Self {
      documents,
      history_limit,
      seen_editors: BTreeSet::new(),
    }
  }

  /// Returns `None` for splits that end up without children.
  pub fn layout(&mut self, state: &LayoutState) -> Option<EditorLayout> {
    match state {
      LayoutState::One(editor) => Some(EditorLayout::Single(self.editor(editor))),
      LayoutState::Vertical(split) | LayoutState::Horizontal(split) => {
        let children: Vec<_> = split
          .children
          .iter()
          .filter_map(|child| self.layout(child))
          .collect();
        if children.is_empty() {
          return None;
        }
        // The variant tag wins over a disagreeing `axis` field.
        let axis = match state {
          LayoutState::Vertical(_) => SplitAxis::Vertical,
          _ => SplitAxis::Horizontal,
        };
        if axis != split.axis {
          log::warn!("split {} stored with mismatched axis", split.id);
        }
        Some(EditorLayout::from_data(SplitViewData::with_id(
          split.id, axis, children,
        )))
      },
    }
  }

  fn editor(&mut self, state: &EditorState) -> Editor {
    let id = if self.seen_editors.insert(state.id) {
      state.id
    } else {
      let fresh = EditorId::new();
      log::warn!("duplicate editor id {} in snapshot, restoring as {fresh}", state.id);
      self.seen_editors.insert(fresh);
      fresh
    };

    let mut editor = Editor::with_id(id).with_history_limit(self.history_limit);
    editor.populate(
      state.tabs.iter().cloned(),
      state.selected_tab.clone(),
      &mut *self.documents,
    );
    if let Some(temporary) = &state.temporary_tab {
      editor.restore_temporary(temporary);
    }
    editor
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::documents::MemoryStore;

  #[test]
  fn layout_state_is_tagged_by_type() {
    let editor = EditorId::new();
    let split = SplitId::new();
    let state = LayoutState::Horizontal(SplitState {
      id:       split,
      axis:     SplitAxis::Horizontal,
      children: vec![LayoutState::One(EditorState {
        id:            editor,
        tabs:          vec![FileRef::from("a.txt")],
        selected_tab:  Some(FileRef::from("a.txt")),
        temporary_tab: None,
      })],
    });

    let json = serde_json::to_value(&state).unwrap();
    assert_eq!(json["type"], "horizontal");
    assert_eq!(json["axis"], "horizontal");
    assert_eq!(json["children"][0]["type"], "one");
    assert_eq!(json["children"][0]["tabs"][0], "a.txt");
    assert_eq!(json["children"][0]["selected_tab"], "a.txt");
    assert!(json["children"][0].get("temporary_tab").is_none());

    let back: LayoutState = serde_json::from_value(json).unwrap();
    assert_eq!(back, state);
  }

  #[test]
  fn restorer_drops_empty_splits_and_renames_duplicates() {
    let mut docs = MemoryStore::new();
    let id = EditorId::new();
    let one = |tabs: Vec<FileRef>| {
      LayoutState::One(EditorState {
        id,
        tabs,
        selected_tab: None,
        temporary_tab: None,
      })
    };
    let state = LayoutState::Vertical(SplitState {
      id:       SplitId::new(),
      axis:     SplitAxis::Vertical,
      children: vec![
        one(vec![FileRef::from("a.txt")]),
        LayoutState::Horizontal(SplitState {
          id:       SplitId::new(),
          axis:     SplitAxis::Horizontal,
          children: Vec::new(),
        }),
        one(vec![FileRef::from("b.txt"), FileRef::from("b.txt")]),
      ],
    });

    let mut restorer = Restorer::new(&mut docs, 8);
    let layout = restorer.layout(&state).expect("editors survive");
    let editors = layout.editors();

    assert_eq!(editors.len(), 2);
    assert_eq!(editors[0].id(), id);
    assert_ne!(editors[1].id(), id);
    assert_eq!(editors[1].len(), 1);
    assert_eq!(editors[1].selected_file(), Some(&FileRef::from("b.txt")));
    assert!(docs.is_open(&FileRef::from("a.txt")));
  }
}

//! The recursive layout tree.

use std::collections::BTreeSet;

use crate::{
  Result,
  editor::{
    Editor,
    EditorId,
  },
  error::{
    InvariantError,
    Precondition,
  },
  file::FileRef,
  split::{
    SplitAxis,
    SplitEdge,
    SplitId,
    SplitViewData,
  },
};

#[derive(Debug)]
pub enum EditorLayout {
  Single(Editor),
  Vertical(SplitViewData),
  Horizontal(SplitViewData),
}

impl EditorLayout {
  /// Builds the split variant matching `axis`.
  pub fn split(axis: SplitAxis, editor_layouts: Vec<EditorLayout>) -> Self {
    Self::from_data(SplitViewData::new(axis, editor_layouts))
  }

  pub(crate) fn from_data(data: SplitViewData) -> Self {
    match data.axis() {
      SplitAxis::Horizontal => Self::Horizontal(data),
      SplitAxis::Vertical => Self::Vertical(data),
    }
  }

  pub fn axis(&self) -> Option<SplitAxis> {
    self.split_data().map(SplitViewData::axis)
  }

  pub fn split_data(&self) -> Option<&SplitViewData> {
    match self {
      Self::Single(_) => None,
      Self::Vertical(data) | Self::Horizontal(data) => Some(data),
    }
  }

  pub fn as_editor(&self) -> Option<&Editor> {
    match self {
      Self::Single(editor) => Some(editor),
      _ => None,
    }
  }

  /// A `Single` always counts as occupied, even without tabs. A split is
  /// empty only when every child is, so in practice only a split without
  /// children reports `true`.
  pub fn is_empty(&self) -> bool {
    match self {
      Self::Single(_) => false,
      Self::Vertical(data) | Self::Horizontal(data) => {
        data.editor_layouts().iter().all(EditorLayout::is_empty)
      },
    }
  }

  /// Removes `file` from every editor without the save guard. Returns how
  /// many tabs were dropped.
  pub fn close_all_tabs(&mut self, file: &FileRef) -> usize {
    match self {
      Self::Single(editor) => usize::from(editor.remove_tab(file).is_some()),
      Self::Vertical(data) | Self::Horizontal(data) => data.close_all_tabs(file),
    }
  }

  /// First editor in depth-first order that is not `except`.
  pub fn find_some_editor(&self, except: Option<EditorId>) -> Option<&Editor> {
    match self {
      Self::Single(editor) => (Some(editor.id()) != except).then_some(editor),
      Self::Vertical(data) | Self::Horizontal(data) => {
        data
          .editor_layouts()
          .iter()
          .find_map(|layout| layout.find_some_editor(except))
      },
    }
  }

  pub fn gather_open_files(&self) -> BTreeSet<FileRef> {
    match self {
      Self::Single(editor) => editor.files().cloned().collect(),
      Self::Vertical(data) | Self::Horizontal(data) => data.gather_open_files(),
    }
  }

  /// Collapses degenerate splits below and including this node.
  ///
  /// A split left with one child is replaced by that child; an editor
  /// lifted this way is re-parented to `parent`, the split that holds this
  /// node (`None` at the root).
  pub fn flatten(&mut self, parent: Option<SplitId>) {
    let sole = match self {
      Self::Single(_) => None,
      Self::Vertical(data) | Self::Horizontal(data) => {
        data.flatten();
        data.take_sole_child()
      },
    };
    let Some(mut child) = sole else {
      return;
    };
    if let Self::Single(editor) = &mut child {
      editor.set_parent(parent);
    }
    *self = child;
  }

  /// Every editor in depth-first order.
  pub fn editors(&self) -> Vec<&Editor> {
    let mut editors = Vec::new();
    self.collect_editors(&mut editors);
    editors
  }

  pub(crate) fn collect_editors<'a>(&'a self, editors: &mut Vec<&'a Editor>) {
    match self {
      Self::Single(editor) => editors.push(editor),
      Self::Vertical(data) | Self::Horizontal(data) => {
        for layout in data.editor_layouts() {
          layout.collect_editors(editors);
        }
      },
    }
  }

  pub(crate) fn for_each_editor_mut(&mut self, f: &mut impl FnMut(&mut Editor)) {
    match self {
      Self::Single(editor) => f(editor),
      Self::Vertical(data) | Self::Horizontal(data) => {
        for layout in data.editor_layouts_mut() {
          layout.for_each_editor_mut(f);
        }
      },
    }
  }

  pub fn contains_editor(&self, id: EditorId) -> bool {
    self.editor(id).is_some()
  }

  pub fn editor(&self, id: EditorId) -> Option<&Editor> {
    match self {
      Self::Single(editor) => (editor.id() == id).then_some(editor),
      Self::Vertical(data) | Self::Horizontal(data) => {
        data
          .editor_layouts()
          .iter()
          .find_map(|layout| layout.editor(id))
      },
    }
  }

  pub fn editor_mut(&mut self, id: EditorId) -> Option<&mut Editor> {
    match self {
      Self::Single(editor) => (editor.id() == id).then_some(editor),
      Self::Vertical(data) | Self::Horizontal(data) => {
        data
          .editor_layouts_mut()
          .iter_mut()
          .find_map(|layout| layout.editor_mut(id))
      },
    }
  }

  pub fn find_split(&self, id: SplitId) -> Option<&SplitViewData> {
    let data = self.split_data()?;
    if data.id() == id {
      return Some(data);
    }
    data
      .editor_layouts()
      .iter()
      .find_map(|layout| layout.find_split(id))
  }

  pub fn find_split_mut(&mut self, id: SplitId) -> Option<&mut SplitViewData> {
    match self {
      Self::Single(_) => None,
      Self::Vertical(data) | Self::Horizontal(data) => {
        if data.id() == id {
          return Some(data);
        }
        data
          .editor_layouts_mut()
          .iter_mut()
          .find_map(|layout| layout.find_split_mut(id))
      },
    }
  }

  /// The `Single` node wrapping editor `id`, found through the editor's
  /// parent. `None` when the editor is the whole layout or not present.
  pub fn enclosing_layout(&self, id: EditorId) -> Option<&EditorLayout> {
    let parent = self.editor(id)?.parent()?;
    self
      .find_split(parent)?
      .editor_layouts()
      .iter()
      .find(|layout| layout.as_editor().is_some_and(|editor| editor.id() == id))
  }

  /// Detaches editor `id` from the split that holds it.
  ///
  /// An editor that is the whole layout has no parent to detach from and
  /// stays in place; `Ok(None)` is returned for it.
  pub fn close_editor(&mut self, id: EditorId) -> Result<Option<Editor>> {
    let editor = self.editor(id).ok_or(Precondition::UnknownEditor(id))?;
    let Some(parent) = editor.parent() else {
      return Ok(None);
    };
    let data = self
      .find_split_mut(parent)
      .ok_or(Precondition::UnknownSplit(parent))?;
    Ok(data.close_editor(id))
  }

  /// Splits editor `target`, placing `editor` on `edge` of it.
  pub fn split_editor(&mut self, target: EditorId, edge: SplitEdge, editor: Editor) -> Result<()> {
    let current = self
      .editor(target)
      .ok_or(Precondition::UnknownEditor(target))?;

    let Some(parent) = current.parent() else {
      // The editor is the root: wrap it.
      let placeholder = Self::split(edge.axis(), Vec::new());
      let existing = std::mem::replace(self, placeholder);
      let children = if edge.is_leading() {
        vec![Self::Single(editor), existing]
      } else {
        vec![existing, Self::Single(editor)]
      };
      *self = Self::split(edge.axis(), children);
      return Ok(());
    };

    let data = self
      .find_split_mut(parent)
      .ok_or(Precondition::UnknownSplit(parent))?;
    let index = data
      .editor_layouts()
      .iter()
      .position(|layout| layout.as_editor().is_some_and(|editor| editor.id() == target))
      .ok_or(Precondition::UnknownEditor(target))?;
    data.split(edge, index, editor)
  }

  /// Checks parent links, split occupancy, editor id uniqueness, and every
  /// editor's own invariants.
  pub fn validate(&self) -> std::result::Result<(), InvariantError> {
    let mut seen = BTreeSet::new();
    self.validate_node(None, &mut seen)
  }

  fn validate_node(
    &self,
    parent: Option<SplitId>,
    seen: &mut BTreeSet<EditorId>,
  ) -> std::result::Result<(), InvariantError> {
    match self {
      Self::Single(editor) => {
        if editor.parent() != parent {
          return Err(InvariantError::ParentMismatch);
        }
        if !seen.insert(editor.id()) {
          return Err(InvariantError::DuplicateEditor);
        }
        editor.validate()
      },
      Self::Vertical(data) | Self::Horizontal(data) => {
        if data.is_empty() {
          return Err(InvariantError::EmptySplit);
        }
        data
          .editor_layouts()
          .iter()
          .try_for_each(|layout| layout.validate_node(Some(data.id()), seen))
      },
    }
  }
}

impl PartialEq for EditorLayout {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Self::Single(a), Self::Single(b)) => a == b,
      (Self::Vertical(a), Self::Vertical(b)) | (Self::Horizontal(a), Self::Horizontal(b)) => a == b,
      _ => false,
    }
  }
}

//! Split nodes of the layout tree.
//!
//! A [`SplitViewData`] owns its children. Editors that sit directly inside
//! a split carry the split's [`SplitId`] as their `parent`; every method
//! that adds a child keeps that back-reference in sync.

use std::{
  collections::BTreeSet,
  fmt,
};

use serde::{
  Deserialize,
  Serialize,
};
use uuid::Uuid;

use crate::{
  Result,
  editor::{
    Editor,
    EditorId,
  },
  error::Precondition,
  file::FileRef,
  layout::EditorLayout,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SplitId(Uuid);

impl SplitId {
  pub fn new() -> Self {
    Self(Uuid::new_v4())
  }
}

impl Default for SplitId {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Display for SplitId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(f)
  }
}

/// Direction children are laid out in. Horizontal places them side by
/// side, vertical stacks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitAxis {
  Horizontal,
  Vertical,
}

/// Side of an editor a new editor is split off to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitEdge {
  Top,
  Bottom,
  Leading,
  Trailing,
}

impl SplitEdge {
  pub const fn axis(self) -> SplitAxis {
    match self {
      Self::Top | Self::Bottom => SplitAxis::Vertical,
      Self::Leading | Self::Trailing => SplitAxis::Horizontal,
    }
  }

  /// Whether the new editor goes before the existing one.
  pub const fn is_leading(self) -> bool {
    matches!(self, Self::Top | Self::Leading)
  }
}

#[derive(Debug)]
pub struct SplitViewData {
  id:             SplitId,
  axis:           SplitAxis,
  editor_layouts: Vec<EditorLayout>,
}

impl SplitViewData {
  pub fn new(axis: SplitAxis, editor_layouts: Vec<EditorLayout>) -> Self {
    Self::with_id(SplitId::new(), axis, editor_layouts)
  }

  pub fn with_id(id: SplitId, axis: SplitAxis, mut editor_layouts: Vec<EditorLayout>) -> Self {
    for layout in &mut editor_layouts {
      adopt(id, layout);
    }
    Self {
      id,
      axis,
      editor_layouts,
    }
  }

  pub fn id(&self) -> SplitId {
    self.id
  }

  pub fn axis(&self) -> SplitAxis {
    self.axis
  }

  pub fn editor_layouts(&self) -> &[EditorLayout] {
    &self.editor_layouts
  }

  pub fn len(&self) -> usize {
    self.editor_layouts.len()
  }

  pub fn is_empty(&self) -> bool {
    self.editor_layouts.is_empty()
  }

  pub fn push(&mut self, mut layout: EditorLayout) {
    adopt(self.id, &mut layout);
    self.editor_layouts.push(layout);
  }

  pub fn insert(&mut self, index: usize, mut layout: EditorLayout) -> Result<()> {
    if index > self.editor_layouts.len() {
      return Err(
        Precondition::IndexOutOfBounds {
          index,
          len: self.editor_layouts.len(),
        }
        .into(),
      );
    }
    adopt(self.id, &mut layout);
    self.editor_layouts.insert(index, layout);
    Ok(())
  }

  pub fn remove(&mut self, index: usize) -> Result<EditorLayout> {
    if index >= self.editor_layouts.len() {
      return Err(
        Precondition::IndexOutOfBounds {
          index,
          len: self.editor_layouts.len(),
        }
        .into(),
      );
    }
    let mut layout = self.editor_layouts.remove(index);
    if let EditorLayout::Single(editor) = &mut layout {
      editor.set_parent(None);
    }
    Ok(layout)
  }

  /// Splits the child at `index`, placing `editor` on `edge` of it.
  ///
  /// When `edge` runs along this split's axis the editor becomes a new
  /// sibling. Otherwise the child is wrapped in a perpendicular split
  /// holding both.
  pub fn split(&mut self, edge: SplitEdge, index: usize, editor: Editor) -> Result<()> {
    let len = self.editor_layouts.len();
    if index >= len {
      return Err(Precondition::IndexOutOfBounds { index, len }.into());
    }

    if edge.axis() == self.axis {
      let at = if edge.is_leading() { index } else { index + 1 };
      return self.insert(at, EditorLayout::Single(editor));
    }

    let placeholder = EditorLayout::split(edge.axis(), Vec::new());
    let existing = std::mem::replace(&mut self.editor_layouts[index], placeholder);
    let children = if edge.is_leading() {
      vec![EditorLayout::Single(editor), existing]
    } else {
      vec![existing, EditorLayout::Single(editor)]
    };
    self.editor_layouts[index] = EditorLayout::split(edge.axis(), children);
    Ok(())
  }

  /// Detaches the direct child editor `id`.
  pub fn close_editor(&mut self, id: EditorId) -> Option<Editor> {
    let index = self
      .editor_layouts
      .iter()
      .position(|layout| matches!(layout, EditorLayout::Single(editor) if editor.id() == id))?;
    match self.remove(index) {
      Ok(EditorLayout::Single(editor)) => Some(editor),
      _ => None,
    }
  }

  /// Collapses degenerate descendants.
  ///
  /// Empty child splits are dropped and a child split left with a single
  /// child is replaced by that child. Whether this node itself collapses is
  /// decided by the [`EditorLayout`] holding it.
  pub fn flatten(&mut self) {
    let id = self.id;
    for layout in &mut self.editor_layouts {
      layout.flatten(Some(id));
    }
    self.editor_layouts.retain(|layout| {
      !matches!(
        layout,
        EditorLayout::Horizontal(data) | EditorLayout::Vertical(data) if data.is_empty()
      )
    });
  }

  pub(crate) fn take_sole_child(&mut self) -> Option<EditorLayout> {
    if self.editor_layouts.len() == 1 {
      self.editor_layouts.pop()
    } else {
      None
    }
  }

  /// Every editor below this split, in depth-first order.
  pub fn get_flattened(&self) -> Vec<&Editor> {
    let mut editors = Vec::new();
    for layout in &self.editor_layouts {
      layout.collect_editors(&mut editors);
    }
    editors
  }

  /// Removes `file` from every editor below this split. Returns how many
  /// tabs were dropped.
  pub fn close_all_tabs(&mut self, file: &FileRef) -> usize {
    self
      .editor_layouts
      .iter_mut()
      .map(|layout| layout.close_all_tabs(file))
      .sum()
  }

  pub fn gather_open_files(&self) -> BTreeSet<FileRef> {
    self
      .editor_layouts
      .iter()
      .flat_map(EditorLayout::gather_open_files)
      .collect()
  }

  pub(crate) fn editor_layouts_mut(&mut self) -> &mut [EditorLayout] {
    &mut self.editor_layouts
  }
}

impl PartialEq for SplitViewData {
  fn eq(&self, other: &Self) -> bool {
    self.editor_layouts == other.editor_layouts
  }
}

fn adopt(parent: SplitId, layout: &mut EditorLayout) {
  if let EditorLayout::Single(editor) = layout {
    editor.set_parent(Some(parent));
  }
}

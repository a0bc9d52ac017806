use std::hash::{
  Hash,
  Hasher,
};

use serde::{
  Deserialize,
  Serialize,
};
use smallvec::SmallVec;

use crate::file::FileRef;

/// A caret location inside a document, zero based.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CursorPosition {
  pub line:   usize,
  pub column: usize,
}

impl CursorPosition {
  pub const fn new(line: usize, column: usize) -> Self {
    Self { line, column }
  }
}

/// One open file inside an editor group.
///
/// Equality and hashing only look at [`EditorTab::file`]; cursor state is
/// transient view state carried along with the tab.
#[derive(Debug, Clone)]
pub struct EditorTab {
  file:             FileRef,
  cursor_positions: SmallVec<[CursorPosition; 1]>,
}

impl EditorTab {
  pub fn new(file: FileRef) -> Self {
    Self {
      file,
      cursor_positions: SmallVec::new(),
    }
  }

  pub fn file(&self) -> &FileRef {
    &self.file
  }

  pub fn cursor_positions(&self) -> &[CursorPosition] {
    &self.cursor_positions
  }

  pub fn set_cursor_positions(&mut self, positions: impl IntoIterator<Item = CursorPosition>) {
    self.cursor_positions = positions.into_iter().collect();
  }
}

impl From<FileRef> for EditorTab {
  fn from(file: FileRef) -> Self {
    Self::new(file)
  }
}

impl PartialEq for EditorTab {
  fn eq(&self, other: &Self) -> bool {
    self.file == other.file
  }
}

impl Eq for EditorTab {}

impl Hash for EditorTab {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.file.hash(state);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cursor_state_does_not_affect_equality() {
    let mut a = EditorTab::new(FileRef::from("a.txt"));
    let b = EditorTab::new(FileRef::from("a.txt"));
    a.set_cursor_positions([CursorPosition::new(3, 4)]);

    assert_eq!(a, b);
    assert_eq!(a.cursor_positions(), &[CursorPosition::new(3, 4)]);
    assert!(b.cursor_positions().is_empty());
  }
}

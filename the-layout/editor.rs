//! Editor groups: an ordered tab bar plus back/forward history.
//!
//! An [`Editor`] keeps its tabs unique by file, tracks one selected tab and
//! at most one temporary ("preview") tab, and records a most-recent-first
//! history. `history_offset` points into that history; zero is the
//! present, larger offsets are further back.
//!
//! Every operation that inserts or drops a tab goes through the
//! [`DocumentStore`] so documents are loaded and released in step with the
//! tab bar.

use std::{
  collections::{
    BTreeSet,
    VecDeque,
  },
  fmt,
  mem,
};

use serde::{
  Deserialize,
  Serialize,
};
use uuid::Uuid;

use crate::{
  Result,
  documents::{
    self,
    DocumentStore,
  },
  error::{
    InvariantError,
    Precondition,
  },
  file::FileRef,
  split::SplitId,
  tab::{
    CursorPosition,
    EditorTab,
  },
};

pub const DEFAULT_TAB_HISTORY_LIMIT: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditorId(Uuid);

impl EditorId {
  pub fn new() -> Self {
    Self(Uuid::new_v4())
  }
}

impl Default for EditorId {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Display for EditorId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(f)
  }
}

/// Pending notification buffered by an editor until the manager flushes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorChange {
  Tabs,
  Selection,
}

#[derive(Debug)]
pub struct Editor {
  id:             EditorId,
  tabs:           Vec<EditorTab>,
  selected:       Option<FileRef>,
  temporary:      Option<FileRef>,
  history:        VecDeque<EditorTab>,
  history_offset: usize,
  history_limit:  usize,
  // Split that directly contains this editor; `None` when the editor is the
  // whole layout.
  parent:         Option<SplitId>,
  changes:        Vec<EditorChange>,
}

impl Default for Editor {
  fn default() -> Self {
    Self::new()
  }
}

impl PartialEq for Editor {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id
  }
}

impl Eq for Editor {}

impl std::hash::Hash for Editor {
  fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
    self.id.hash(state);
  }
}

impl Editor {
  pub fn new() -> Self {
    Self::with_id(EditorId::new())
  }

  pub fn with_id(id: EditorId) -> Self {
    Self {
      id,
      tabs: Vec::new(),
      selected: None,
      temporary: None,
      history: VecDeque::new(),
      history_offset: 0,
      history_limit: DEFAULT_TAB_HISTORY_LIMIT,
      parent: None,
      changes: Vec::new(),
    }
  }

  /// Creates an editor that already shows `files`.
  ///
  /// `selected` falls back to the first file when it is not among `files`.
  /// Duplicate files are skipped.
  pub fn with_files(
    files: impl IntoIterator<Item = FileRef>,
    selected: Option<FileRef>,
    documents: &mut dyn DocumentStore,
  ) -> Self {
    let mut editor = Self::new();
    editor.populate(files, selected, documents);
    editor
  }

  pub fn with_history_limit(mut self, limit: usize) -> Self {
    self.history_limit = limit.max(1);
    self.truncate_history();
    self
  }

  pub(crate) fn populate(
    &mut self,
    files: impl IntoIterator<Item = FileRef>,
    selected: Option<FileRef>,
    documents: &mut dyn DocumentStore,
  ) {
    for file in files {
      if self.contains(&file) {
        continue;
      }
      documents::open_logged(documents, &file);
      self.tabs.push(EditorTab::new(file));
    }

    let selected = selected
      .filter(|file| self.contains(file))
      .or_else(|| self.tabs.first().map(|tab| tab.file().clone()));
    if let Some(tab) = selected.as_ref().and_then(|file| self.tab(file)).cloned() {
      self.add_to_history(&tab);
    }
    self.selected = selected;
    self.note(EditorChange::Tabs);
    self.note(EditorChange::Selection);
  }

  pub(crate) fn restore_temporary(&mut self, file: &FileRef) {
    if self.contains(file) {
      self.temporary = Some(file.clone());
    }
  }

  pub fn id(&self) -> EditorId {
    self.id
  }

  pub fn parent(&self) -> Option<SplitId> {
    self.parent
  }

  pub(crate) fn set_parent(&mut self, parent: Option<SplitId>) {
    self.parent = parent;
  }

  pub fn tabs(&self) -> &[EditorTab] {
    &self.tabs
  }

  pub fn len(&self) -> usize {
    self.tabs.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tabs.is_empty()
  }

  pub fn contains(&self, file: &FileRef) -> bool {
    self.position(file).is_some()
  }

  pub fn tab(&self, file: &FileRef) -> Option<&EditorTab> {
    self.tabs.iter().find(|tab| tab.file() == file)
  }

  pub fn files(&self) -> impl Iterator<Item = &FileRef> {
    self.tabs.iter().map(EditorTab::file)
  }

  pub fn selected_tab(&self) -> Option<&EditorTab> {
    self.selected.as_ref().and_then(|file| self.tab(file))
  }

  pub fn selected_file(&self) -> Option<&FileRef> {
    self.selected.as_ref()
  }

  pub fn temporary_tab(&self) -> Option<&EditorTab> {
    self.temporary.as_ref().and_then(|file| self.tab(file))
  }

  /// Most recent entry first.
  pub fn history(&self) -> &VecDeque<EditorTab> {
    &self.history
  }

  pub fn history_offset(&self) -> usize {
    self.history_offset
  }

  pub fn history_limit(&self) -> usize {
    self.history_limit
  }

  /// Opens `file`, optionally as the temporary tab.
  ///
  /// A new temporary tab replaces the current one in place instead of
  /// adding to the tab bar. Opening a temporary tab's file permanently
  /// clears the temporary mark and keeps the tab where it is.
  pub fn open_tab(&mut self, file: FileRef, as_temporary: bool, documents: &mut dyn DocumentStore) {
    if let Some(tab) = self.tab(&file).cloned() {
      if !as_temporary && self.temporary.as_ref() == Some(&file) {
        self.temporary = None;
        self.note(EditorChange::Tabs);
      }
      self.set_selected(Some(file));
      self.clear_future();
      self.add_to_history(&tab);
      return;
    }

    match (self.temporary.clone(), as_temporary) {
      (Some(temporary), true) => self.replace_temporary_tab(temporary, file, documents),
      (None, true) => {
        self.insert_tab(EditorTab::new(file.clone()), None, false, documents);
        self.temporary = Some(file);
      },
      (_, false) => self.insert_tab(EditorTab::new(file), None, false, documents),
    }
  }

  /// Opens `file` as a permanent tab at `index`, or right after the
  /// selected tab when `index` is `None`.
  pub fn open_tab_at(
    &mut self,
    file: FileRef,
    index: Option<usize>,
    documents: &mut dyn DocumentStore,
  ) {
    self.insert_tab(EditorTab::new(file), index, false, documents);
  }

  fn insert_tab(
    &mut self,
    tab: EditorTab,
    index: Option<usize>,
    from_history: bool,
    documents: &mut dyn DocumentStore,
  ) {
    let file = tab.file().clone();
    if !self.contains(&file) {
      let index = match index {
        Some(index) => index.min(self.tabs.len()),
        None => {
          self
            .selected_index()
            .map_or(self.tabs.len(), |selected| selected + 1)
        },
      };
      self.tabs.insert(index, tab);
      self.note(EditorChange::Tabs);
      documents::open_logged(documents, &file);
    }

    self.set_selected(Some(file.clone()));
    if !from_history {
      self.clear_future();
      if let Some(tab) = self.tab(&file).cloned() {
        self.add_to_history(&tab);
      }
    }
  }

  fn replace_temporary_tab(
    &mut self,
    temporary: FileRef,
    file: FileRef,
    documents: &mut dyn DocumentStore,
  ) {
    // An edited preview is kept as a normal tab.
    let index = self
      .position(&temporary)
      .filter(|_| !documents.is_dirty(&temporary));
    let Some(index) = index else {
      self.insert_tab(EditorTab::new(file.clone()), None, false, documents);
      self.temporary = Some(file);
      return;
    };

    self.clear_future();
    if self
      .history
      .front()
      .is_some_and(|entry| entry.file() == &temporary)
    {
      self.history.pop_front();
    }

    let tab = EditorTab::new(file.clone());
    self.tabs[index] = tab.clone();
    self.temporary = Some(file.clone());
    self.note(EditorChange::Tabs);
    documents.close_file(&temporary);
    documents::open_logged(documents, &file);

    self.set_selected(Some(file));
    self.add_to_history(&tab);
  }

  /// Closes the tab for `file` after the unsaved-changes guard.
  ///
  /// Returns `false` when the file is not open or the user cancelled the
  /// save prompt; nothing changes in either case.
  pub fn close_tab(&mut self, file: &FileRef, documents: &mut dyn DocumentStore) -> bool {
    self.close_tab_inner(file, false, documents)
  }

  fn close_tab_inner(
    &mut self,
    file: &FileRef,
    from_history: bool,
    documents: &mut dyn DocumentStore,
  ) -> bool {
    let Some(index) = self.position(file) else {
      return false;
    };
    if !documents::can_close(documents, file) {
      log::debug!("close of {file} cancelled");
      return false;
    }

    if self.temporary.as_ref() == Some(file) {
      self.temporary = None;
    }
    if !from_history {
      self.history_offset = 0;
      if self.selected.as_ref() != Some(file) {
        let tab = self.tabs[index].clone();
        self.add_to_history(&tab);
      }
    }

    self.remove_at(index);

    if !from_history && let Some(tab) = self.selected_tab().cloned() {
      self.add_to_history(&tab);
    }
    documents.close_file(file);
    true
  }

  pub fn close_selected_tab(&mut self, documents: &mut dyn DocumentStore) -> bool {
    match self.selected.clone() {
      Some(file) => self.close_tab(&file, documents),
      None => false,
    }
  }

  /// Closes every tab to the right of `file`. Returns how many closed.
  pub fn close_tabs_after(
    &mut self,
    file: &FileRef,
    documents: &mut dyn DocumentStore,
  ) -> Result<usize> {
    let index = self.require(file)?;
    let files: Vec<_> = self.tabs[index + 1..]
      .iter()
      .map(|tab| tab.file().clone())
      .collect();
    Ok(
      files
        .iter()
        .filter(|file| self.close_tab(file, documents))
        .count(),
    )
  }

  /// Closes every tab except `file`. Returns how many closed.
  pub fn close_other_tabs(
    &mut self,
    file: &FileRef,
    documents: &mut dyn DocumentStore,
  ) -> Result<usize> {
    self.require(file)?;
    let files: Vec<_> = self
      .files()
      .filter(|other| *other != file)
      .cloned()
      .collect();
    Ok(
      files
        .iter()
        .filter(|file| self.close_tab(file, documents))
        .count(),
    )
  }

  /// Drops the tab for `file` without the save guard or history
  /// bookkeeping. The caller owns releasing the document.
  pub fn remove_tab(&mut self, file: &FileRef) -> Option<EditorTab> {
    let index = self.position(file)?;
    Some(self.remove_at(index))
  }

  fn remove_at(&mut self, index: usize) -> EditorTab {
    let tab = self.tabs.remove(index);
    self.note(EditorChange::Tabs);
    if self.temporary.as_ref() == Some(tab.file()) {
      self.temporary = None;
    }
    if self.selected.as_ref() == Some(tab.file()) {
      let next = self
        .tabs
        .get(index.saturating_sub(1))
        .map(|tab| tab.file().clone());
      self.set_selected(next);
    }
    tab
  }

  /// Selects an open tab the way a tab-bar click does: forward history is
  /// discarded and the tab becomes the most recent entry.
  pub fn select_tab(&mut self, file: &FileRef) -> Result<()> {
    let index = self.require(file)?;
    let tab = self.tabs[index].clone();
    self.set_selected(Some(file.clone()));
    self.clear_future();
    self.add_to_history(&tab);
    Ok(())
  }

  pub fn select_next_tab(&mut self) {
    self.select_adjacent(true);
  }

  pub fn select_previous_tab(&mut self) {
    self.select_adjacent(false);
  }

  fn select_adjacent(&mut self, forward: bool) {
    let Some(current) = self.selected_index() else {
      return;
    };
    let len = self.tabs.len();
    let next = if forward {
      (current + 1) % len
    } else {
      (current + len - 1) % len
    };
    let file = self.tabs[next].file().clone();
    self.set_selected(Some(file));
  }

  /// Moves the tab for `file` to position `to` in the tab bar.
  pub fn move_tab(&mut self, file: &FileRef, to: usize) -> Result<()> {
    let from = self.require(file)?;
    if to >= self.tabs.len() {
      return Err(
        Precondition::IndexOutOfBounds {
          index: to,
          len:   self.tabs.len(),
        }
        .into(),
      );
    }
    if from != to {
      let tab = self.tabs.remove(from);
      self.tabs.insert(to, tab);
      self.note(EditorChange::Tabs);
    }
    Ok(())
  }

  /// Stores cursor state for `file`. History entries of the same file pick
  /// it up too, so a tab reopened from history lands where it was.
  pub fn set_cursor_positions(
    &mut self,
    file: &FileRef,
    positions: impl IntoIterator<Item = CursorPosition>,
  ) -> Result<()> {
    let index = self.require(file)?;
    self.tabs[index].set_cursor_positions(positions);
    let positions = self.tabs[index].cursor_positions().to_vec();
    for entry in self.history.iter_mut().filter(|entry| entry.file() == file) {
      entry.set_cursor_positions(positions.iter().copied());
    }
    Ok(())
  }

  pub fn can_go_back_in_history(&self) -> bool {
    !self.history.is_empty() && self.history_offset != self.history.len() - 1
  }

  pub fn can_go_forward_in_history(&self) -> bool {
    self.history_offset != 0
  }

  pub fn go_back_in_history(&mut self, documents: &mut dyn DocumentStore) {
    if self.can_go_back_in_history() {
      self.set_history_offset(self.history_offset + 1, documents);
    }
  }

  pub fn go_forward_in_history(&mut self, documents: &mut dyn DocumentStore) {
    if self.can_go_forward_in_history() {
      self.set_history_offset(self.history_offset - 1, documents);
    }
  }

  // Selects the entry at `offset`. A file that is no longer open comes
  // back as the temporary tab, replacing the previous temporary one. None
  // of this writes to the history itself.
  fn set_history_offset(&mut self, offset: usize, documents: &mut dyn DocumentStore) {
    self.history_offset = offset;
    let Some(entry) = self.history.get(offset).cloned() else {
      return;
    };
    let file = entry.file().clone();

    if !self.contains(&file) {
      if let Some(temporary) = self.temporary.clone() {
        self.close_tab_inner(&temporary, true, documents);
      }
      self.insert_tab(entry, None, true, documents);
      self.temporary = Some(file.clone());
    }
    self.set_selected(Some(file));
  }

  /// Records `tab` as the most recent history entry unless it already is.
  pub fn add_to_history(&mut self, tab: &EditorTab) {
    if self
      .history
      .front()
      .is_some_and(|entry| entry.file() == tab.file())
    {
      return;
    }
    self.history.push_front(tab.clone());
    self.truncate_history();
  }

  /// Drops the entries in front of the current offset.
  pub fn clear_future(&mut self) {
    if self.history_offset == 0 {
      return;
    }
    let end = self.history_offset.min(self.history.len());
    self.history.drain(..end);
    self.history_offset = 0;
  }

  fn truncate_history(&mut self) {
    self.history.truncate(self.history_limit);
    if self.history_offset >= self.history.len() {
      self.history_offset = self.history.len().saturating_sub(1);
    }
  }

  /// Takes the notifications buffered since the last call.
  pub fn take_changes(&mut self) -> Vec<EditorChange> {
    mem::take(&mut self.changes)
  }

  pub fn validate(&self) -> std::result::Result<(), InvariantError> {
    let mut seen = BTreeSet::new();
    if !self.tabs.iter().all(|tab| seen.insert(tab.file())) {
      return Err(InvariantError::DuplicateTab);
    }
    if self.selected.as_ref().is_some_and(|file| !self.contains(file)) {
      return Err(InvariantError::DanglingSelection);
    }
    if self
      .temporary
      .as_ref()
      .is_some_and(|file| !self.contains(file))
    {
      return Err(InvariantError::DanglingTemporaryTab);
    }
    let offset_ok = if self.history.is_empty() {
      self.history_offset == 0
    } else {
      self.history_offset < self.history.len()
    };
    if !offset_ok {
      return Err(InvariantError::HistoryOffsetOutOfBounds);
    }
    Ok(())
  }

  fn position(&self, file: &FileRef) -> Option<usize> {
    self.tabs.iter().position(|tab| tab.file() == file)
  }

  fn selected_index(&self) -> Option<usize> {
    self.selected.as_ref().and_then(|file| self.position(file))
  }

  fn require(&self, file: &FileRef) -> Result<usize> {
    self.position(file).ok_or_else(|| {
      Precondition::TabNotOpen {
        editor: self.id,
        file:   file.clone(),
      }
      .into()
    })
  }

  fn set_selected(&mut self, file: Option<FileRef>) {
    if self.selected != file {
      self.selected = file;
      self.note(EditorChange::Selection);
    }
  }

  fn note(&mut self, change: EditorChange) {
    if !self.changes.contains(&change) {
      self.changes.push(change);
    }
  }
}

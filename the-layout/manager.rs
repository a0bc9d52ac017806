//! Owner of the layout tree and of the active editor.

use std::{
  collections::{
    BTreeSet,
    VecDeque,
  },
  mem,
};

use crate::{
  Result,
  config::LayoutConfig,
  documents::DocumentStore,
  editor::{
    Editor,
    EditorChange,
    EditorId,
  },
  error::{
    InvariantError,
    Precondition,
  },
  events::{
    EventLog,
    LayoutEvent,
    LayoutEventKind,
  },
  file::FileRef,
  layout::EditorLayout,
  split::{
    SplitAxis,
    SplitEdge,
  },
  state::{
    ManagerState,
    Restorer,
  },
};

/// Holds the root [`EditorLayout`] and keeps exactly one editor in it
/// active.
///
/// Whenever the tree would be left without editors the manager resets to a
/// single empty editor, so [`EditorManager::active_editor`] always resolves.
#[derive(Debug)]
pub struct EditorManager {
  editor_layout:                   EditorLayout,
  active_editor:                   EditorId,
  /// Previously active editors, most recent first.
  active_editor_history:           VecDeque<EditorId>,
  is_focusing_active_editor:       bool,
  flattened_editors:               Vec<EditorId>,
  update_cached_flattened_editors: bool,
  config:                          LayoutConfig,
  events:                          EventLog,
}

impl Default for EditorManager {
  fn default() -> Self {
    Self::new(LayoutConfig::default())
  }
}

impl EditorManager {
  pub fn new(config: LayoutConfig) -> Self {
    let editor = Editor::new().with_history_limit(config.tab_history_limit);
    let active_editor = editor.id();
    let mut manager = Self {
      editor_layout: EditorLayout::split(SplitAxis::Horizontal, vec![
        EditorLayout::Single(editor),
      ]),
      active_editor,
      active_editor_history: VecDeque::from([active_editor]),
      is_focusing_active_editor: false,
      flattened_editors: Vec::new(),
      update_cached_flattened_editors: true,
      events: EventLog::with_limit(config.event_limit),
      config,
    };
    manager.events.push(LayoutEventKind::LayoutChanged);
    manager.switch_to_active_editor();
    manager
  }

  /// Replaces the whole tree with one empty editor inside a horizontal
  /// split and makes it active. Tabs of the discarded tree are not released
  /// through the document store.
  pub fn init_clean_state(&mut self) {
    let editor = Editor::new().with_history_limit(self.config.tab_history_limit);
    let id = editor.id();
    self.editor_layout = EditorLayout::split(SplitAxis::Horizontal, vec![EditorLayout::Single(
      editor,
    )]);
    self.active_editor = id;
    self.active_editor_history.clear();
    self.active_editor_history.push_front(id);
    self.update_cached_flattened_editors = true;
    if mem::take(&mut self.is_focusing_active_editor) {
      self
        .events
        .push(LayoutEventKind::FocusModeChanged { focusing: false });
    }
    log::debug!("layout reset to a single editor {id}");
    self.events.push(LayoutEventKind::LayoutChanged);
    self.switch_to_active_editor();
  }

  pub fn editor_layout(&self) -> &EditorLayout {
    &self.editor_layout
  }

  pub fn config(&self) -> &LayoutConfig {
    &self.config
  }

  pub fn active_editor_id(&self) -> EditorId {
    self.active_editor
  }

  pub fn active_editor(&self) -> &Editor {
    self
      .editor_layout
      .editor(self.active_editor)
      .expect("active editor is always part of the layout")
  }

  pub fn active_editor_mut(&mut self) -> &mut Editor {
    self
      .editor_layout
      .editor_mut(self.active_editor)
      .expect("active editor is always part of the layout")
  }

  pub fn active_editor_history(&self) -> impl Iterator<Item = EditorId> + '_ {
    self.active_editor_history.iter().copied()
  }

  pub fn is_focusing_active_editor(&self) -> bool {
    self.is_focusing_active_editor
  }

  pub fn editor(&self, id: EditorId) -> Option<&Editor> {
    self.editor_layout.editor(id)
  }

  pub fn editor_mut(&mut self, id: EditorId) -> Option<&mut Editor> {
    self.editor_layout.editor_mut(id)
  }

  /// Runs `f` on editor `id`, or on the active editor when `id` is `None`.
  pub fn with_editor<T>(
    &mut self,
    id: Option<EditorId>,
    f: impl FnOnce(&mut Editor) -> T,
  ) -> Result<T> {
    let id = id.unwrap_or(self.active_editor);
    let editor = self
      .editor_layout
      .editor_mut(id)
      .ok_or(Precondition::UnknownEditor(id))?;
    Ok(f(editor))
  }

  pub fn set_active_editor(&mut self, id: EditorId) -> Result<()> {
    if !self.editor_layout.contains_editor(id) {
      return Err(Precondition::UnknownEditor(id).into());
    }
    self.assign_active_editor(id);
    Ok(())
  }

  /// Picks a replacement for the active editor that is not `excluding`.
  ///
  /// The most recent reachable entry of the active-editor history wins,
  /// then any other editor in the tree. With neither, the layout is reset
  /// and `true` is returned.
  pub fn set_new_active_editor(&mut self, excluding: EditorId) -> bool {
    let layout = &self.editor_layout;
    self
      .active_editor_history
      .retain(|id| *id != excluding && layout.contains_editor(*id));

    let next = self.active_editor_history.pop_front().or_else(|| {
      self
        .editor_layout
        .find_some_editor(Some(excluding))
        .map(Editor::id)
    });

    match next {
      Some(id) => {
        self.assign_active_editor(id);
        false
      },
      None => {
        log::warn!("no editor left to activate after {excluding}, resetting layout");
        self.init_clean_state();
        true
      },
    }
  }

  /// Switches focus mode; entering it first activates `from`.
  pub fn toggle_focusing_editor(&mut self, from: EditorId) -> Result<()> {
    if !self.is_focusing_active_editor {
      self.set_active_editor(from)?;
    }
    self.is_focusing_active_editor = !self.is_focusing_active_editor;
    self.events.push(LayoutEventKind::FocusModeChanged {
      focusing: self.is_focusing_active_editor,
    });
    Ok(())
  }

  /// Opens `file` in editor `editor`, or in the active editor.
  pub fn open_tab(
    &mut self,
    file: FileRef,
    editor: Option<EditorId>,
    as_temporary: bool,
    documents: &mut dyn DocumentStore,
  ) -> Result<()> {
    self.with_editor(editor, |editor| editor.open_tab(file, as_temporary, documents))
  }

  /// Closes `file` in editor `editor`, or in the active editor, through the
  /// save guard. `Ok(false)` means the close was declined.
  pub fn close_tab(
    &mut self,
    file: &FileRef,
    editor: Option<EditorId>,
    documents: &mut dyn DocumentStore,
  ) -> Result<bool> {
    self.with_editor(editor, |editor| editor.close_tab(file, documents))
  }

  pub fn close_tabs_after(
    &mut self,
    editor: EditorId,
    file: &FileRef,
    documents: &mut dyn DocumentStore,
  ) -> Result<usize> {
    self.with_editor(Some(editor), |editor| editor.close_tabs_after(file, documents))?
  }

  /// Drops `file` from every editor, e.g. after it was deleted on disk.
  /// Returns how many tabs were closed.
  pub fn close_all_tabs(&mut self, file: &FileRef, documents: &mut dyn DocumentStore) -> usize {
    let closed = self.editor_layout.close_all_tabs(file);
    for _ in 0..closed {
      documents.close_file(file);
    }
    if closed > 0 {
      log::debug!("closed {closed} tabs of {file}");
    }
    closed
  }

  pub fn go_back_in_history(&mut self, documents: &mut dyn DocumentStore) {
    self.active_editor_mut().go_back_in_history(documents);
  }

  pub fn go_forward_in_history(&mut self, documents: &mut dyn DocumentStore) {
    self.active_editor_mut().go_forward_in_history(documents);
  }

  /// Places `editor` on `edge` of editor `target` and makes it active.
  pub fn split_editor(
    &mut self,
    target: EditorId,
    edge: SplitEdge,
    editor: Editor,
  ) -> Result<EditorId> {
    let id = editor.id();
    if self.editor_layout.contains_editor(id) {
      return Err(Precondition::EditorExists(id).into());
    }
    self.editor_layout.split_editor(target, edge, editor)?;
    log::debug!("split editor {target} at {edge:?}, new editor {id}");
    self.update_cached_flattened_editors = true;
    self.events.push(LayoutEventKind::LayoutChanged);
    self.assign_active_editor(id);
    Ok(id)
  }

  /// Splits the active editor. The new editor shows the active editor's
  /// selected tab when `split-copies-selected-tab` is set.
  pub fn split_active_editor(
    &mut self,
    edge: SplitEdge,
    documents: &mut dyn DocumentStore,
  ) -> Result<EditorId> {
    let mut editor = Editor::new().with_history_limit(self.config.tab_history_limit);
    if self.config.split_copies_selected_tab
      && let Some(file) = self.active_editor().selected_file().cloned()
    {
      editor.open_tab(file, false, documents);
    }
    self.split_editor(self.active_editor, edge, editor)
  }

  /// Removes editor `id` from the layout and releases its documents.
  ///
  /// The save guard is not consulted; close the tabs first to give dirty
  /// documents a chance. A new active editor is chosen when needed, the
  /// tree is flattened, and an editor that was the whole layout resets it.
  pub fn close_editor(&mut self, id: EditorId, documents: &mut dyn DocumentStore) -> Result<()> {
    let files: Vec<FileRef> = self
      .editor_layout
      .editor(id)
      .ok_or(Precondition::UnknownEditor(id))?
      .files()
      .cloned()
      .collect();

    let detached = self.editor_layout.close_editor(id)?;
    let reset =
      (detached.is_none() || id == self.active_editor) && self.set_new_active_editor(id);
    // A reset already left the clean layout; flattening would collapse it.
    if !reset {
      self.flatten();
      if self.editor_layout.is_empty() {
        log::warn!("layout left without editors, resetting");
        self.init_clean_state();
      }
    }

    for file in &files {
      documents.close_file(file);
    }
    log::debug!("closed editor {id} with {} tabs", files.len());
    self.events.push(LayoutEventKind::LayoutChanged);
    Ok(())
  }

  /// Collapses single-child splits across the tree.
  pub fn flatten(&mut self) {
    log::debug!("flattening layout");
    self.editor_layout.flatten(None);
    self.update_cached_flattened_editors = true;
  }

  /// Editors in depth-first order, cached until the tree changes shape.
  pub fn flattened_editors(&mut self) -> &[EditorId] {
    if mem::take(&mut self.update_cached_flattened_editors) {
      self.flattened_editors = self
        .editor_layout
        .editors()
        .into_iter()
        .map(Editor::id)
        .collect();
    }
    &self.flattened_editors
  }

  pub fn gather_open_files(&self) -> BTreeSet<FileRef> {
    self.editor_layout.gather_open_files()
  }

  /// Every event after `seq`, including changes editors recorded since the
  /// last call.
  pub fn events_since(&mut self, seq: u64) -> Vec<LayoutEvent> {
    self.flush_editor_changes();
    self.events.events_since(seq)
  }

  pub fn latest_seq(&mut self) -> u64 {
    self.flush_editor_changes();
    self.events.latest_seq()
  }

  pub fn state(&self) -> ManagerState {
    ManagerState {
      layout:                    (&self.editor_layout).into(),
      active_editor:             Some(self.active_editor),
      is_focusing_active_editor: self.is_focusing_active_editor,
    }
  }

  /// Rebuilds a manager from a snapshot, reopening every tab through
  /// `documents`. A snapshot without any editor yields a clean manager.
  pub fn restore(
    state: &ManagerState,
    config: LayoutConfig,
    documents: &mut dyn DocumentStore,
  ) -> Self {
    let mut manager = Self::new(config);
    let mut restorer = Restorer::new(documents, manager.config.tab_history_limit);
    let Some(layout) = restorer.layout(&state.layout) else {
      log::warn!("layout snapshot holds no editors, starting clean");
      return manager;
    };

    let active = state
      .active_editor
      .filter(|id| layout.contains_editor(*id))
      .or_else(|| layout.find_some_editor(None).map(Editor::id));
    let Some(active) = active else {
      return manager;
    };
    if state.active_editor != Some(active) {
      log::warn!("active editor missing from snapshot, activating {active}");
    }

    manager.editor_layout = layout;
    manager.active_editor = active;
    manager.active_editor_history = VecDeque::from([active]);
    manager.is_focusing_active_editor = state.is_focusing_active_editor;
    manager.update_cached_flattened_editors = true;
    manager.events.push(LayoutEventKind::LayoutChanged);
    manager.switch_to_active_editor();
    manager
  }

  pub fn validate(&self) -> std::result::Result<(), InvariantError> {
    self.editor_layout.validate()?;
    if !self.editor_layout.contains_editor(self.active_editor) {
      return Err(InvariantError::UnreachableActiveEditor);
    }
    Ok(())
  }

  fn assign_active_editor(&mut self, id: EditorId) {
    if id == self.active_editor {
      return;
    }
    let previous = mem::replace(&mut self.active_editor, id);
    if self.editor_layout.contains_editor(previous) {
      self.active_editor_history.retain(|entry| *entry != previous);
      self.active_editor_history.push_front(previous);
      self
        .active_editor_history
        .truncate(self.config.active_editor_history_limit);
    }
    self.switch_to_active_editor();
  }

  fn switch_to_active_editor(&mut self) {
    self.flush_editor_changes();
    let editor = self.active_editor;
    let tab = self.active_editor().selected_file().cloned();
    self
      .events
      .push(LayoutEventKind::ActiveEditorChanged { editor });
    self
      .events
      .push(LayoutEventKind::ActiveTabChanged { editor, tab });
  }

  fn flush_editor_changes(&mut self) {
    let active = self.active_editor;
    let events = &mut self.events;
    self.editor_layout.for_each_editor_mut(&mut |editor| {
      for change in editor.take_changes() {
        let id = editor.id();
        match change {
          EditorChange::Tabs => {
            events.push(LayoutEventKind::TabsChanged { editor: id });
          },
          EditorChange::Selection => {
            let tab = editor.selected_file().cloned();
            events.push(LayoutEventKind::SelectionChanged {
              editor: id,
              tab:    tab.clone(),
            });
            if id == active {
              events.push(LayoutEventKind::ActiveTabChanged { editor: id, tab });
            }
          },
        }
      }
    });
  }
}

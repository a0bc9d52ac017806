use std::collections::BTreeSet;

use the_layout::{
  Editor,
  EditorLayout,
  EditorManager,
  FileRef,
  LayoutConfig,
  MemoryStore,
  SplitAxis,
  SplitEdge,
  events::LayoutEventKind,
  state::ManagerState,
};

fn file(name: &str) -> FileRef {
  FileRef::from(name)
}

fn history(editor: &Editor) -> Vec<FileRef> {
  editor
    .history()
    .iter()
    .map(|tab| tab.file().clone())
    .collect()
}

#[test]
fn temporary_tabs_and_history() {
  let mut docs = MemoryStore::new();
  let mut editor = Editor::new();

  editor.open_tab(file("a.txt"), true, &mut docs);
  assert_eq!(editor.files().cloned().collect::<Vec<_>>(), [file("a.txt")]);
  assert_eq!(editor.selected_file(), Some(&file("a.txt")));
  assert_eq!(editor.temporary_tab().map(|tab| tab.file()), Some(&file("a.txt")));
  assert_eq!(history(&editor), [file("a.txt")]);
  assert_eq!(editor.history_offset(), 0);

  editor.open_tab(file("b.txt"), true, &mut docs);
  assert_eq!(editor.files().cloned().collect::<Vec<_>>(), [file("b.txt")]);
  assert_eq!(editor.temporary_tab().map(|tab| tab.file()), Some(&file("b.txt")));
  assert_eq!(history(&editor), [file("b.txt")]);
  assert!(!docs.is_open(&file("a.txt")));

  editor.open_tab(file("c.txt"), false, &mut docs);
  assert_eq!(
    editor.files().cloned().collect::<Vec<_>>(),
    [file("b.txt"), file("c.txt")]
  );
  assert_eq!(editor.selected_file(), Some(&file("c.txt")));
  assert_eq!(editor.temporary_tab().map(|tab| tab.file()), Some(&file("b.txt")));
  assert_eq!(history(&editor), [file("c.txt"), file("b.txt")]);
  assert_eq!(editor.history_offset(), 0);

  editor.go_back_in_history(&mut docs);
  assert_eq!(editor.history_offset(), 1);
  assert_eq!(editor.selected_file(), Some(&file("b.txt")));

  editor.go_forward_in_history(&mut docs);
  assert_eq!(editor.history_offset(), 0);
  assert_eq!(editor.selected_file(), Some(&file("c.txt")));
  assert_eq!(editor.validate(), Ok(()));
}

#[test]
fn closing_a_split_restores_the_single_editor() {
  let mut docs = MemoryStore::new();
  let mut manager = EditorManager::default();
  let e = manager.active_editor_id();
  manager.flatten();
  assert!(matches!(manager.editor_layout(), EditorLayout::Single(_)));

  let f = manager
    .split_editor(e, SplitEdge::Trailing, Editor::new())
    .unwrap();
  let data = manager
    .editor_layout()
    .split_data()
    .expect("split after splitting");
  assert_eq!(data.axis(), SplitAxis::Horizontal);
  assert_eq!(data.len(), 2);
  assert_eq!(manager.active_editor_id(), f);

  manager.close_editor(f, &mut docs).unwrap();

  let EditorLayout::Single(editor) = manager.editor_layout() else {
    panic!("expected a single editor, got {:?}", manager.editor_layout());
  };
  assert_eq!(editor.id(), e);
  assert_eq!(editor.parent(), None);
  assert_eq!(manager.active_editor_id(), e);
  assert_eq!(manager.validate(), Ok(()));
}

#[test]
fn gather_open_files_spans_every_editor() {
  let mut docs = MemoryStore::new();
  let left = Editor::with_files([file("a.txt")], None, &mut docs);
  let right = Editor::with_files([file("b.txt"), file("c.txt")], None, &mut docs);
  let layout = EditorLayout::split(SplitAxis::Vertical, vec![
    EditorLayout::Single(left),
    EditorLayout::Single(right),
  ]);

  assert_eq!(
    layout.gather_open_files(),
    BTreeSet::from([file("a.txt"), file("b.txt"), file("c.txt")])
  );
}

#[test]
fn dirty_tabs_ask_before_closing() {
  let mut docs = MemoryStore::new();
  let mut manager = EditorManager::default();
  manager
    .open_tab(file("notes.md"), None, false, &mut docs)
    .unwrap();
  docs.set_dirty(&file("notes.md"), true);

  docs.set_confirm_answer(false);
  assert!(!manager.close_tab(&file("notes.md"), None, &mut docs).unwrap());
  assert!(manager.active_editor().contains(&file("notes.md")));

  docs.set_confirm_answer(true);
  assert!(manager.close_tab(&file("notes.md"), None, &mut docs).unwrap());
  assert!(manager.active_editor().is_empty());
  assert_eq!(docs.confirmations(), 2);
  assert!(!docs.is_open(&file("notes.md")));
}

#[test]
fn session_survives_a_restart() {
  let mut docs = MemoryStore::new();
  let mut manager = EditorManager::default();
  let first = manager.active_editor_id();
  manager
    .open_tab(file("main.rs"), None, false, &mut docs)
    .unwrap();
  manager
    .open_tab(file("lib.rs"), None, true, &mut docs)
    .unwrap();
  let second = manager
    .split_active_editor(SplitEdge::Leading, &mut docs)
    .unwrap();
  manager
    .open_tab(file("Cargo.toml"), Some(second), false, &mut docs)
    .unwrap();
  manager.toggle_focusing_editor(first).unwrap();

  let json = manager.state().to_json().unwrap();
  let state = ManagerState::from_json(&json).unwrap();
  let mut fresh_docs = MemoryStore::new();
  let restored = EditorManager::restore(&state, LayoutConfig::default(), &mut fresh_docs);

  assert_eq!(restored.editor_layout(), manager.editor_layout());
  assert_eq!(restored.active_editor_id(), first);
  assert!(restored.is_focusing_active_editor());
  assert_eq!(
    restored
      .active_editor()
      .temporary_tab()
      .map(|tab| tab.file().clone()),
    Some(file("lib.rs"))
  );
  assert_eq!(
    fresh_docs.open_files().cloned().collect::<BTreeSet<_>>(),
    manager.gather_open_files()
  );
  assert_eq!(restored.validate(), Ok(()));
}

#[test]
fn views_catch_up_through_events() {
  let mut docs = MemoryStore::new();
  let mut manager = EditorManager::default();
  let seen = manager.latest_seq();

  let first = manager.active_editor_id();
  let second = manager
    .split_editor(first, SplitEdge::Bottom, Editor::new())
    .unwrap();
  manager
    .open_tab(file("a.txt"), None, false, &mut docs)
    .unwrap();

  let kinds: Vec<_> = manager
    .events_since(seen)
    .into_iter()
    .map(|event| event.kind)
    .collect();

  assert_eq!(kinds[0], LayoutEventKind::LayoutChanged);
  assert!(kinds.contains(&LayoutEventKind::ActiveEditorChanged { editor: second }));
  assert!(kinds.contains(&LayoutEventKind::ActiveTabChanged {
    editor: second,
    tab:    Some(file("a.txt")),
  }));
}

//! Boundary to the collaborator that loads, tracks, and saves documents.
//!
//! Editors call [`DocumentStore::open_file`] once for every tab they insert
//! and [`DocumentStore::close_file`] once for every tab they drop, so a
//! store can reference-count documents that are open in several editor
//! groups at once.

use std::{
  collections::{
    BTreeMap,
    BTreeSet,
  },
  io,
};

use thiserror::Error;

use crate::file::FileRef;

#[derive(Debug, Error)]
pub enum DocumentError {
  #[error("failed to read {file}: {source}")]
  Io {
    file:   FileRef,
    #[source]
    source: io::Error,
  },
  #[error("{0} cannot be opened as a document")]
  Unsupported(FileRef),
}

pub trait DocumentStore {
  /// Load (or retain) the document backing `file`.
  fn open_file(&mut self, file: &FileRef) -> Result<(), DocumentError>;

  /// Release one reference to the document backing `file`.
  fn close_file(&mut self, file: &FileRef);

  /// Whether the document has unsaved changes.
  fn is_dirty(&self, file: &FileRef) -> bool;

  /// Ask the user whether a dirty document may be closed, saving it first
  /// if they choose to. Blocks until answered; `false` cancels the close.
  fn confirm_close(&mut self, file: &FileRef) -> bool;
}

/// Runs the unsaved-changes guard for `file`.
///
/// Clean documents always pass. A dirty document triggers exactly one
/// confirmation.
pub(crate) fn can_close(documents: &mut dyn DocumentStore, file: &FileRef) -> bool {
  if !documents.is_dirty(file) {
    return true;
  }
  documents.confirm_close(file)
}

/// Opens `file` in the store, logging instead of failing.
pub(crate) fn open_logged(documents: &mut dyn DocumentStore, file: &FileRef) {
  if let Err(err) = documents.open_file(file) {
    log::warn!("failed to open {file}: {err}");
  }
}

/// In-memory [`DocumentStore`] with reference counting.
///
/// It keeps no file contents. Dirty flags, load failures, and the answer to
/// the save prompt are set by the host.
#[derive(Debug, Clone)]
pub struct MemoryStore {
  open:           BTreeMap<FileRef, usize>,
  dirty:          BTreeSet<FileRef>,
  failing:        BTreeSet<FileRef>,
  confirm_answer: bool,
  confirmations:  usize,
}

impl Default for MemoryStore {
  fn default() -> Self {
    Self::new()
  }
}

impl MemoryStore {
  pub fn new() -> Self {
    Self {
      open:           BTreeMap::new(),
      dirty:          BTreeSet::new(),
      failing:        BTreeSet::new(),
      confirm_answer: true,
      confirmations:  0,
    }
  }

  pub fn set_dirty(&mut self, file: &FileRef, dirty: bool) {
    if dirty {
      self.dirty.insert(file.clone());
    } else {
      self.dirty.remove(file);
    }
  }

  /// Make every future `open_file` for `file` fail.
  pub fn fail_on_open(&mut self, file: &FileRef) {
    self.failing.insert(file.clone());
  }

  /// Answer returned by the next save prompts.
  pub fn set_confirm_answer(&mut self, answer: bool) {
    self.confirm_answer = answer;
  }

  /// Number of save prompts shown so far.
  pub fn confirmations(&self) -> usize {
    self.confirmations
  }

  pub fn is_open(&self, file: &FileRef) -> bool {
    self.open.contains_key(file)
  }

  /// How many tabs currently retain the document.
  pub fn ref_count(&self, file: &FileRef) -> usize {
    self.open.get(file).copied().unwrap_or(0)
  }

  pub fn open_files(&self) -> impl Iterator<Item = &FileRef> {
    self.open.keys()
  }
}

impl DocumentStore for MemoryStore {
  fn open_file(&mut self, file: &FileRef) -> Result<(), DocumentError> {
    if self.failing.contains(file) {
      return Err(DocumentError::Io {
        file:   file.clone(),
        source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
      });
    }
    *self.open.entry(file.clone()).or_insert(0) += 1;
    Ok(())
  }

  fn close_file(&mut self, file: &FileRef) {
    let Some(count) = self.open.get_mut(file) else {
      return;
    };
    *count = count.saturating_sub(1);
    if *count == 0 {
      self.open.remove(file);
      self.dirty.remove(file);
    }
  }

  fn is_dirty(&self, file: &FileRef) -> bool {
    self.dirty.contains(file)
  }

  fn confirm_close(&mut self, file: &FileRef) -> bool {
    self.confirmations += 1;
    // An approved prompt saves the document.
    if self.confirm_answer {
      self.dirty.remove(file);
    }
    self.confirm_answer
  }
}

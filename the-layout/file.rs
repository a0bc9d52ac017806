use std::{
  fmt,
  path::{
    Path,
    PathBuf,
  },
};

use serde::{
  Deserialize,
  Serialize,
};

/// Identity of an openable document.
///
/// Two references are equal when their paths are equal. The layout engine
/// never touches the file system through a `FileRef`; it is only a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileRef(PathBuf);

impl FileRef {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self(path.into())
  }

  pub fn path(&self) -> &Path {
    &self.0
  }

  /// Last path component, used for tab titles.
  pub fn file_name(&self) -> Option<&str> {
    self.0.file_name().and_then(|name| name.to_str())
  }
}

impl fmt::Display for FileRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0.display())
  }
}

impl From<PathBuf> for FileRef {
  fn from(value: PathBuf) -> Self {
    Self(value)
  }
}

impl From<&Path> for FileRef {
  fn from(value: &Path) -> Self {
    Self(value.to_path_buf())
  }
}

impl From<&str> for FileRef {
  fn from(value: &str) -> Self {
    Self(PathBuf::from(value))
  }
}

impl AsRef<Path> for FileRef {
  fn as_ref(&self) -> &Path {
    &self.0
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use super::*;

  #[test]
  fn equality_is_by_path() {
    let a = FileRef::from("src/main.rs");
    let b = FileRef::new(PathBuf::from("src/main.rs"));
    assert_eq!(a, b);

    let set: HashSet<_> = [a, b].into_iter().collect();
    assert_eq!(set.len(), 1);
  }

  #[test]
  fn file_name_is_last_component() {
    assert_eq!(FileRef::from("a/b/c.txt").file_name(), Some("c.txt"));
    assert_eq!(FileRef::from("/").file_name(), None);
  }
}

use std::{
  fs,
  io::Error as IOError,
  path::Path,
};

use serde::{
  Deserialize,
  Serialize,
};
use thiserror::Error;
use toml::{
  Value,
  de::Error as TomlError,
};

use crate::{
  editor::DEFAULT_TAB_HISTORY_LIMIT,
  events::DEFAULT_EVENT_LIMIT,
};

pub const DEFAULT_ACTIVE_EDITOR_HISTORY_LIMIT: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct LayoutConfig {
  /// Entries kept in each editor's back/forward history.
  pub tab_history_limit:           usize,
  /// Previously active editors remembered for picking a replacement when
  /// the active one closes.
  pub active_editor_history_limit: usize,
  /// Notifications buffered for views that have not caught up.
  pub event_limit:                 usize,
  /// A split made from the active editor opens its selected tab.
  pub split_copies_selected_tab:   bool,
}

impl Default for LayoutConfig {
  fn default() -> Self {
    Self {
      tab_history_limit:           DEFAULT_TAB_HISTORY_LIMIT,
      active_editor_history_limit: DEFAULT_ACTIVE_EDITOR_HISTORY_LIMIT,
      event_limit:                 DEFAULT_EVENT_LIMIT,
      split_copies_selected_tab:   true,
    }
  }
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
  #[error("failed to parse layout config: {0}")]
  BadConfig(#[from] TomlError),
  #[error("failed to read layout config: {0}")]
  Error(#[from] IOError),
}

impl LayoutConfig {
  /// Merges the workspace-local config over the global one.
  ///
  /// A config that fails to parse is an error wherever it comes from; a
  /// config that cannot be read is skipped as long as the other one loads.
  pub fn load(
    global: Result<String, ConfigLoadError>,
    local: Result<String, ConfigLoadError>,
  ) -> Result<Self, ConfigLoadError> {
    let global: Result<Value, ConfigLoadError> =
      global.and_then(|file| toml::from_str(&file).map_err(ConfigLoadError::BadConfig));
    let local: Result<Value, ConfigLoadError> =
      local.and_then(|file| toml::from_str(&file).map_err(ConfigLoadError::BadConfig));

    let merged = match (global, local) {
      (Ok(global), Ok(local)) => merge_toml_values(global, local, 3),
      (_, Err(ConfigLoadError::BadConfig(err))) | (Err(ConfigLoadError::BadConfig(err)), _) => {
        return Err(ConfigLoadError::BadConfig(err));
      },
      (Ok(config), Err(_)) | (Err(_), Ok(config)) => config,
      (Err(err), Err(_)) => return Err(err),
    };

    let config: LayoutConfig = merged.try_into()?;
    Ok(config.normalized())
  }

  pub fn load_files(global: &Path, local: &Path) -> Result<Self, ConfigLoadError> {
    let global = fs::read_to_string(global).map_err(ConfigLoadError::Error);
    let local = fs::read_to_string(local).map_err(ConfigLoadError::Error);
    Self::load(global, local)
  }

  fn normalized(mut self) -> Self {
    self.tab_history_limit = self.tab_history_limit.max(1);
    self.active_editor_history_limit = self.active_editor_history_limit.max(1);
    self.event_limit = self.event_limit.max(1);
    self
  }
}

/// Merges `right` into `left`, recursing into tables up to `merge_depth`.
pub fn merge_toml_values(left: Value, right: Value, merge_depth: usize) -> Value {
  match (left, right) {
    (Value::Table(mut left_map), Value::Table(right_map)) if merge_depth > 0 => {
      for (name, rvalue) in right_map {
        let merged = match left_map.remove(&name) {
          Some(lvalue) => merge_toml_values(lvalue, rvalue, merge_depth - 1),
          None => rvalue,
        };
        left_map.insert(name, merged);
      }
      Value::Table(left_map)
    },
    (_, value) => value,
  }
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use super::*;

  fn missing() -> Result<String, ConfigLoadError> {
    Err(ConfigLoadError::Error(IOError::new(
      std::io::ErrorKind::NotFound,
      "missing",
    )))
  }

  #[test]
  fn local_overrides_global() {
    let config = LayoutConfig::load(
      Ok("tab-history-limit = 10\nevent-limit = 20\n".into()),
      Ok("tab-history-limit = 5\n".into()),
    )
    .unwrap();

    assert_eq!(config.tab_history_limit, 5);
    assert_eq!(config.event_limit, 20);
    assert_eq!(
      config.active_editor_history_limit,
      DEFAULT_ACTIVE_EDITOR_HISTORY_LIMIT
    );
    assert!(config.split_copies_selected_tab);
  }

  #[test]
  fn missing_side_falls_back_to_the_other() {
    let config =
      LayoutConfig::load(missing(), Ok("split-copies-selected-tab = false\n".into())).unwrap();
    assert!(!config.split_copies_selected_tab);

    let err = LayoutConfig::load(missing(), missing()).expect_err("nothing to load");
    assert!(matches!(err, ConfigLoadError::Error(_)));
  }

  #[test]
  fn bad_config_wins_over_missing() {
    let err = LayoutConfig::load(Ok("no-such-key = 1\n".into()), missing())
      .expect_err("unknown keys are rejected");
    assert!(matches!(err, ConfigLoadError::BadConfig(_)));
  }

  #[test]
  fn limits_are_at_least_one() {
    let config = LayoutConfig::load(Ok("tab-history-limit = 0\n".into()), missing()).unwrap();
    assert_eq!(config.tab_history_limit, 1);
  }

  #[test]
  fn loads_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let global = dir.path().join("global.toml");
    let mut file = fs::File::create(&global).unwrap();
    writeln!(file, "active-editor-history-limit = 4").unwrap();

    let config = LayoutConfig::load_files(&global, &dir.path().join("absent.toml")).unwrap();
    assert_eq!(config.active_editor_history_limit, 4);
    assert_eq!(config.tab_history_limit, DEFAULT_TAB_HISTORY_LIMIT);
  }
}

//! Persisted view preferences (page, search text, category filter).
//!
//! Storage is a flat string→string map. A missing key is a normal state that
//! resolves to the default; it is never an error.

use crate::constants::{PREF_CURRENT_PAGE, PREF_SEARCH_TEXT, PREF_SELECTED_CATEGORY};
use crate::error::AppError;
use crate::view::ViewState;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Key-value storage that outlives a single session.
pub trait PreferenceStore {
    fn get_string(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, durably, before returning.
    fn set_string(&mut self, key: &str, value: &str) -> Result<(), AppError>;

    /// Drop `key` entirely.
    fn remove(&mut self, key: &str) -> Result<(), AppError>;
}

/// Process-local store for tests and throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    values: BTreeMap<String, String>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get_string(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set_string(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), AppError> {
        self.values.remove(key);
        Ok(())
    }
}

/// JSON-file store, written through on every change.
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FilePreferences {
    /// Open (or lazily create) the preference file at `path`.
    ///
    /// A missing file starts empty. A file that is not a JSON string map is
    /// ignored with a warning and overwritten on the next change.
    ///
    /// # Errors
    /// Returns [`AppError::Io`] when the file exists but cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<BTreeMap<String, String>>(&raw) {
                Ok(values) => values,
                Err(err) => {
                    warn!(
                        "ignoring unreadable preference file {}: {}",
                        path.display(),
                        err
                    );
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == IoErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let encoded = serde_json::to_string_pretty(&self.values)?;
        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);
        fs::write(&tmp_path, encoded)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl PreferenceStore for FilePreferences {
    fn get_string(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set_string(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        if self.values.get(key).map(String::as_str) == Some(value) {
            return Ok(());
        }
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), AppError> {
        if self.values.remove(key).is_none() {
            return Ok(());
        }
        self.flush()
    }
}

fn parse_page(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok().filter(|page| *page >= 1)
}

/// Synchronous bridge between [`ViewState`] changes and a [`PreferenceStore`].
#[derive(Debug)]
pub struct ViewPreferences<S> {
    store: S,
}

impl<S: PreferenceStore> ViewPreferences<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Read the persisted view state, applying defaults for missing keys.
    pub fn load(&self) -> ViewState {
        let current_page = match self.store.get_string(PREF_CURRENT_PAGE) {
            Some(raw) => parse_page(&raw).unwrap_or_else(|| {
                warn!("stored page '{}' is not a positive integer; using 1", raw);
                1
            }),
            None => 1,
        };
        ViewState {
            search_text: self.store.get_string(PREF_SEARCH_TEXT).unwrap_or_default(),
            selected_category_id: self
                .store
                .get_string(PREF_SELECTED_CATEGORY)
                .filter(|id| !id.is_empty()),
            current_page,
        }
    }

    pub fn persist_page(&mut self, page: usize) -> Result<(), AppError> {
        self.store
            .set_string(PREF_CURRENT_PAGE, &page.max(1).to_string())
    }

    pub fn persist_search_text(&mut self, text: &str) -> Result<(), AppError> {
        self.store.set_string(PREF_SEARCH_TEXT, text)
    }

    /// Store the selected category, or remove the key when the filter is cleared.
    pub fn persist_selected_category(&mut self, category_id: Option<&str>) -> Result<(), AppError> {
        match category_id.filter(|id| !id.is_empty()) {
            Some(id) => self.store.set_string(PREF_SELECTED_CATEGORY, id),
            None => self.store.remove(PREF_SELECTED_CATEGORY),
        }
    }

    /// Persist every field of `state`.
    pub fn persist_all(&mut self, state: &ViewState) -> Result<(), AppError> {
        self.persist_page(state.current_page)?;
        self.persist_search_text(&state.search_text)?;
        self.persist_selected_category(state.selected_category_id.as_deref())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}

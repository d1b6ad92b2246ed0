use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// File-backed string key/value store. Every mutation is written through.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    file_path: PathBuf,
    items: BTreeMap<String, String>,
}

impl LocalStorage {
    pub fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        let items = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => serde_json::from_str(&contents).map_err(|err| {
                AppError::Storage(format!("invalid storage file {}: {err}", path.display()))
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(AppError::Io(err)),
        };

        Ok(Self {
            file_path: path,
            items,
        })
    }

    pub fn get_item(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }

    pub fn set_item(&mut self, key: &str, value: impl Into<String>) -> AppResult<()> {
        self.items.insert(key.to_string(), value.into());
        self.save()
    }

    pub fn remove_item(&mut self, key: &str) -> AppResult<()> {
        if self.items.remove(key).is_some() {
            self.save()?;
        }
        Ok(())
    }

    fn save(&self) -> AppResult<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(&self.items)
            .map_err(|err| AppError::Storage(format!("failed to encode storage: {err}")))?;
        fs::write(&self.file_path, data)?;
        Ok(())
    }
}

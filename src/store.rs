use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::TokenError;

/// Blob storage for the cached token.
///
/// The store knows nothing about the token format; the provider parses what
/// `load` returns.
pub trait TokenStore: Send + Sync {
    /// `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> Result<Option<String>, TokenError>;
    /// Replace whatever is stored with `data`.
    fn save(&self, data: &str) -> Result<(), TokenError>;
    fn clear(&self) -> Result<(), TokenError>;
    /// Human readable location, used in log lines and errors.
    fn location(&self) -> String;
}

/// Token cache kept in a single file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_error(&self, err: impl ToString) -> TokenError {
        TokenError::CacheRead {
            location: self.location(),
            reason: err.to_string(),
        }
    }

    fn write_error(&self, err: impl ToString) -> TokenError {
        TokenError::StoreWrite {
            location: self.location(),
            reason: err.to_string(),
        }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, TokenError> {
        match fs::read_to_string(&self.path) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(self.read_error(err)),
        }
    }

    fn save(&self, data: &str) -> Result<(), TokenError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
            }
        }
        fs::write(&self.path, data).map_err(|e| self.write_error(e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))
                .map_err(|e| self.write_error(e))?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(self.write_error(err)),
        }
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

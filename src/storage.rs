//! File access for the vault blob.

use crate::crypto::random::secure_random;
use crate::error::Result;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Reads and replaces the single file a vault lives in.
///
/// `Storage` knows nothing about the blob layout; it moves whole byte
/// buffers in and out of the file.
#[derive(Clone, Debug)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Returns the path to the vault file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` if the vault file exists.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Makes sure the vault file exists, creating its parent directories and
    /// an empty file when needed. An existing file is left untouched.
    pub fn create_empty(&self) -> Result<()> {
        if self.exists() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)?;
        debug!(path = %self.path.display(), "created empty vault file");
        Ok(())
    }

    /// Loads the entire vault file into memory.
    ///
    /// # Errors
    ///
    /// Fails if the file is missing or unreadable.
    pub fn load(&self) -> Result<Vec<u8>> {
        let meta = fs::metadata(&self.path)?;
        if !meta.is_file() {
            return Err(io::Error::other(format!("{} is not a file", self.path.display())).into());
        }

        let data = fs::read(&self.path)?;
        debug!(bytes = data.len(), "loaded vault file");
        Ok(data)
    }

    /// Replaces the vault file with `data`.
    ///
    /// The bytes go to a fresh temporary file in the same directory, which is
    /// synced and then renamed over the target, so readers see either the old
    /// or the new blob. The directory is synced afterwards to persist the
    /// rename; once the rename succeeded the new blob is in place, so a
    /// failing directory sync is only logged.
    pub fn save(&self, data: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.random_tmp_path()?;

        let mut tmp_file = new_private_file(&tmp_path)?;
        if let Err(e) = tmp_file.write_all(data).and_then(|_| tmp_file.sync_all()) {
            drop(tmp_file);
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        drop(tmp_file);

        if let Err(e) = self.atomic_replace(&tmp_path) {
            warn!(error = %e, "atomic replace failed, removing temporary file");
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        #[cfg(not(target_os = "windows"))]
        if let Some(parent) = self.path.parent() {
            if let Err(e) = File::open(parent).and_then(|dir| dir.sync_all()) {
                warn!(error = %e, "vault written but directory sync failed");
            }
        }

        debug!(bytes = data.len(), "saved vault file");
        Ok(())
    }

    /// `<file>.tmp.<16 hex chars>` next to the vault file.
    fn random_tmp_path(&self) -> Result<PathBuf> {
        let mut buf = [0u8; 8];
        secure_random(&mut buf)?;

        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "vault".to_string());

        Ok(self
            .path
            .with_file_name(format!("{file_name}.tmp.{}", hex::encode(buf))))
    }

    #[cfg(target_os = "windows")]
    fn atomic_replace(&self, tmp_path: &Path) -> io::Result<()> {
        use std::ffi::OsStr;
        use std::os::windows::ffi::OsStrExt;
        use windows_sys::Win32::Storage::FileSystem::{REPLACEFILE_WRITE_THROUGH, ReplaceFileW};

        fn to_wide(s: &OsStr) -> Vec<u16> {
            s.encode_wide().chain(std::iter::once(0)).collect()
        }

        // ReplaceFileW needs an existing target
        if !self.path.exists() {
            return fs::rename(tmp_path, &self.path);
        }

        let target_w = to_wide(self.path.as_os_str());
        let tmp_w = to_wide(tmp_path.as_os_str());

        // SAFETY: both buffers are NUL-terminated UTF-16 and outlive the call.
        let ok = unsafe {
            ReplaceFileW(
                target_w.as_ptr(),
                tmp_w.as_ptr(),
                std::ptr::null(),
                REPLACEFILE_WRITE_THROUGH,
                std::ptr::null(),
                std::ptr::null(),
            )
        };

        if ok == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    /// `rename()` is atomic within one filesystem.
    #[cfg(not(target_os = "windows"))]
    fn atomic_replace(&self, tmp_path: &Path) -> io::Result<()> {
        fs::rename(tmp_path, &self.path)
    }
}

#[cfg(unix)]
fn new_private_file(path: &Path) -> io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;

    OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn new_private_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VaultError;
    use tempfile::tempdir;

    #[test]
    fn create_empty_makes_parents_and_zero_length_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a").join("b").join(".passwdstore");

        let storage = Storage::new(path.clone());
        storage.create_empty().unwrap();

        assert!(path.is_file());
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn create_empty_keeps_existing_contents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store");
        fs::write(&path, b"existing").unwrap();

        Storage::new(path.clone()).create_empty().unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"existing");
    }

    #[test]
    fn create_empty_on_directory_fails() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());
        assert!(matches!(storage.create_empty(), Err(VaultError::Io(_))));
    }

    #[test]
    fn load_returns_written_data() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("store"));

        storage.save(b"hello world").unwrap();
        assert_eq!(storage.load().unwrap(), b"hello world");
    }

    #[test]
    fn load_fails_if_file_does_not_exist() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("missing"));
        assert!(matches!(storage.load(), Err(VaultError::Io(_))));
    }

    #[test]
    fn save_replaces_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store");
        let storage = Storage::new(path.clone());

        storage.save(b"first").unwrap();
        storage.save(b"second").unwrap();

        assert_eq!(fs::read(path).unwrap(), b"second");
    }

    #[cfg(unix)]
    #[test]
    fn save_succeeds_when_directory_sync_is_impossible() {
        // a bare file name has an empty parent, which cannot be opened for sync
        let name = format!("passvault-sync-{}", std::process::id());
        let storage = Storage::new(PathBuf::from(&name));

        let result = storage.save(b"data");
        let written = fs::read(&name);
        let _ = fs::remove_file(&name);

        result.unwrap();
        assert_eq!(written.unwrap(), b"data");
    }

    #[test]
    fn tmp_file_is_removed_after_success() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("store"));
        storage.save(b"data").unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0], "store");
    }

    #[test]
    fn tmp_paths_are_unique_siblings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store");
        let storage = Storage::new(path.clone());

        let a = storage.random_tmp_path().unwrap();
        let b = storage.random_tmp_path().unwrap();

        assert_eq!(a.parent(), path.parent());
        assert_ne!(a, path);
        assert_ne!(a, b);
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("store");
        Storage::new(path.clone()).save(b"data").unwrap();

        let mode = fs::metadata(path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

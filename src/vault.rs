use crate::crypto;
use crate::error::{Result, VaultError};
use crate::format::Blob;
use crate::state::VaultState;
use crate::storage::Storage;
use std::path::{Path, PathBuf};
use tracing::debug;
use zeroize::Zeroizing;

/// Handle to one vault file.
///
/// The handle only remembers where the file is. Every operation takes the
/// passphrase explicitly, reads and decrypts the file, and (for mutations)
/// encrypts and replaces it again before returning. Nothing decrypted is
/// kept between calls.
#[derive(Clone, Debug)]
pub struct Vault {
    storage: Storage,
}

impl Vault {
    /// Prepares a vault at `path`, creating parent directories and an empty
    /// file if nothing is there yet.
    pub fn init(path: impl Into<PathBuf>) -> Result<Self> {
        let vault = Self::open(path)?;
        vault.storage.create_empty()?;
        Ok(vault)
    }

    /// Builds a handle for `path` without touching the filesystem.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_absolute() {
            return Err(VaultError::PathNotAbsolute(path));
        }
        Ok(Self {
            storage: Storage::new(path),
        })
    }

    pub fn path(&self) -> &Path {
        self.storage.path()
    }

    /// Value stored under `key`, or an empty string when there is none.
    pub fn get(&self, key: &str, passphrase: &[u8]) -> Result<String> {
        let state = self.load(passphrase)?;
        Ok(state.get(key).unwrap_or_default().to_string())
    }

    /// Inserts or overwrites `key`.
    pub fn put(&self, key: &str, value: &str, passphrase: &[u8]) -> Result<()> {
        let mut state = self.load(passphrase)?;
        state.insert(key, value);
        self.save(state, passphrase)
    }

    /// Removes `key`; a missing key is not an error.
    pub fn delete(&self, key: &str, passphrase: &[u8]) -> Result<()> {
        let mut state = self.load(passphrase)?;
        if state.remove(key).is_none() {
            debug!("delete of absent key, rewriting unchanged entries");
        }
        self.save(state, passphrase)
    }

    pub fn list_keys(&self, passphrase: &[u8]) -> Result<Vec<String>> {
        let state = self.load(passphrase)?;
        Ok(state.keys().cloned().collect())
    }

    pub fn list_entries(&self, passphrase: &[u8]) -> Result<Vec<(String, String)>> {
        let state = self.load(passphrase)?;
        Ok(state
            .entries()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    /// Drops every entry but keeps the passphrase.
    pub fn clear(&self, passphrase: &[u8]) -> Result<()> {
        let mut state = self.load(passphrase)?;
        state.clear();
        self.save(state, passphrase)
    }

    /// Re-encrypts the whole vault under `new`.
    ///
    /// This is also how a fresh vault gets its first passphrase: the empty
    /// file loads under any `old`, and the state is then saved under `new`.
    /// The file is only replaced once the new blob is complete.
    pub fn change_passphrase(&self, new: &[u8], old: &[u8]) -> Result<()> {
        let mut state = self.load(old)?;
        state.set_passphrase(new);
        self.save(state, new)?;
        debug!("vault passphrase changed");
        Ok(())
    }

    /// Read, verify and decrypt the current file contents.
    fn load(&self, passphrase: &[u8]) -> Result<VaultState> {
        let data = self.storage.load()?;
        if data.is_empty() {
            debug!("vault file is empty, starting from a fresh state");
            return Ok(VaultState::new());
        }

        let blob = Blob::parse(&data)?;
        blob.check_integrity()?;

        let plaintext = crypto::decrypt(blob.ciphertext(), passphrase)?;
        serde_json::from_slice(&plaintext)
            .map_err(|e| VaultError::FileManuallyEdited(format!("payload does not parse: {e}")))
    }

    /// Encrypt `state` under `passphrase` and replace the file with it.
    fn save(&self, mut state: VaultState, passphrase: &[u8]) -> Result<()> {
        if !state.has_passphrase() {
            return Err(VaultError::PassphraseNotSet);
        }
        state.set_passphrase(passphrase);

        let plaintext = Zeroizing::new(
            serde_json::to_vec(&state)
                .map_err(|e| VaultError::Crypto(format!("failed to serialize vault: {e}")))?,
        );
        let ciphertext = crypto::encrypt(&plaintext, passphrase)?;

        self.storage.save(&Blob::seal(ciphertext).to_bytes())?;
        debug!(entries = state.len(), "vault persisted");
        Ok(())
    }
}

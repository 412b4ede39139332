//! Single-file encrypted secret vault.
//!
//! A vault is one file holding a string-to-string map, encrypted under a
//! master passphrase and guarded by a digest over the ciphertext. Use
//! [`Vault::init`] to get a handle, then pass the passphrase to every call.

pub mod crypto;
mod error;
mod format;
mod state;
mod storage;
mod vault;

pub use crate::error::{Result, VaultError};
pub use crate::format::SEP;
pub use crate::vault::Vault;

use directories::BaseDirs;
use std::path::PathBuf;

/// Directory under the home directory that holds the vault.
pub const DEFAULT_DIR: &str = ".vault";
/// File name of the vault inside [`DEFAULT_DIR`].
pub const DEFAULT_FILE: &str = ".passwdstore";

/// `$HOME/.vault/.passwdstore` for the current user.
pub fn default_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join(DEFAULT_DIR).join(DEFAULT_FILE))
}

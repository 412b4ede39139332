use std::path::PathBuf;
use thiserror::Error;

/// Every way a vault operation can fail.
///
/// The variants are kept distinct all the way up to the caller: a
/// `WrongPassphrase` is the only one a user can fix by typing again, the
/// rest mean the store itself is unusable as-is.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("vault path is not absolute: {}", .0.display())]
    PathNotAbsolute(PathBuf),

    #[error("vault I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("vault file manually edited: {0}")]
    FileManuallyEdited(String),

    #[error("vault file integrity check failed, contents were modified")]
    IntegrityFail,

    #[error("wrong passphrase")]
    WrongPassphrase,

    #[error("vault passphrase not set, use `change` to set it first")]
    PassphraseNotSet,

    #[error("crypto error: {0}")]
    Crypto(String),
}

pub type Result<T> = std::result::Result<T, VaultError>;

//! On-disk blob format.
//!
//! ```text
//! HEX(NONCE || SEALED(STATE)) . HEX(SHA256(HEX(NONCE || SEALED(STATE))))
//! ```
//!
//! Both components are lowercase hex, so the separator can never occur inside
//! either of them. An empty file is not a blob: it marks a freshly
//! initialized vault and is handled before parsing.

use crate::crypto;
use crate::error::{Result, VaultError};

/// Separator between the ciphertext and the integrity digest.
pub const SEP: u8 = b'.';
/// Number of separator-delimited components in a well-formed blob.
pub const COMPONENTS: usize = 2;

/// A persisted vault: hex ciphertext plus the hex SHA-256 over it.
#[derive(Debug)]
pub(crate) struct Blob {
    ciphertext: Vec<u8>,
    digest: Vec<u8>,
}

impl Blob {
    /// Seals an already hex-encoded ciphertext by digesting it.
    pub fn seal(ciphertext: String) -> Self {
        let ciphertext = ciphertext.into_bytes();
        let digest = crypto::hash(&ciphertext);
        Self { ciphertext, digest }
    }

    /// Splits raw file contents into their two components.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let parts: Vec<&[u8]> = data.split(|b| *b == SEP).collect();
        if parts.len() != COMPONENTS {
            return Err(VaultError::FileManuallyEdited(format!(
                "expected {COMPONENTS} components, found {}",
                parts.len()
            )));
        }

        Ok(Self {
            ciphertext: parts[0].to_vec(),
            digest: parts[1].to_vec(),
        })
    }

    /// Recomputes the digest over the ciphertext and compares it in
    /// constant time with the stored one.
    pub fn check_integrity(&self) -> Result<()> {
        let expected = crypto::hash(&self.ciphertext);
        if crypto::verify(&expected, &self.digest) {
            Ok(())
        } else {
            Err(VaultError::IntegrityFail)
        }
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.ciphertext.len() + 1 + self.digest.len());
        buf.extend_from_slice(&self.ciphertext);
        buf.push(SEP);
        buf.extend_from_slice(&self.digest);
        buf
    }
}

use crate::error::{Result, VaultError};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use getrandom::fill;

/// Fill buffer with cryptographically secure random bytes
pub(crate) fn secure_random(buf: &mut [u8]) -> Result<()> {
    fill(buf).map_err(|e| VaultError::Crypto(format!("OS random generator unavailable: {e}")))
}

/// Generate a printable random secret of exactly `len` characters.
///
/// `len` random bytes are base64 encoded and the encoding is cut back to
/// `len`, so the output only uses the standard base64 alphabet.
/// Meant for human-facing passwords, not key material.
pub fn generate(len: usize) -> Result<String> {
    let mut bytes = vec![0u8; len];
    secure_random(&mut bytes)?;

    let mut out = STANDARD.encode(&bytes);
    out.truncate(len);
    Ok(out)
}

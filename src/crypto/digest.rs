use crate::error::{Result, VaultError};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Hex digest of `data`, appended to `append_to`.
///
/// With `key == None` this is plain SHA-256, the flavor the file format uses
/// for tamper detection. With a key it is HMAC-SHA256.
pub fn digest(data: &[u8], key: Option<&[u8]>, mut append_to: Vec<u8>) -> Result<Vec<u8>> {
    let raw = match key {
        None => Sha256::digest(data).to_vec(),
        Some(key) => {
            let mut mac = HmacSha256::new_from_slice(key)
                .map_err(|e| VaultError::Crypto(format!("hmac key rejected: {e}")))?;
            mac.update(data);
            mac.finalize().into_bytes().to_vec()
        }
    };

    append_to.extend_from_slice(hex::encode(raw).as_bytes());
    Ok(append_to)
}

/// Unkeyed SHA-256 of `data` as lowercase hex.
pub fn hash(data: &[u8]) -> Vec<u8> {
    hex::encode(Sha256::digest(data)).into_bytes()
}

/// HMAC-SHA256 of `data` under `key` as lowercase hex.
pub fn hmac_hash(data: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    digest(data, Some(key), Vec::new())
}

/// Constant-time equality; slices of different length are never equal.
pub fn verify(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

use super::{NONCE_LEN, key::pad_passphrase, random::secure_random};
use crate::error::{Result, VaultError};
use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use zeroize::Zeroizing;

fn cipher_for(passphrase: &[u8]) -> Result<Aes256Gcm> {
    let key = pad_passphrase(passphrase);
    Aes256Gcm::new_from_slice(&key).map_err(|_| {
        VaultError::Crypto(format!(
            "passphrase pads to a {}-byte key, cipher needs {}",
            key.len(),
            super::KEY_LEN
        ))
    })
}

/// Encrypt plaintext under the padded passphrase.
///
/// Returns `hex(nonce || ciphertext || tag)`, a fresh random nonce per call.
pub fn encrypt(plaintext: &[u8], passphrase: &[u8]) -> Result<String> {
    let cipher = cipher_for(passphrase)?;

    let mut nonce = [0u8; NONCE_LEN];
    secure_random(&mut nonce)?;

    let sealed = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|_| VaultError::Crypto("encryption failed".into()))?;

    let mut blob = Vec::with_capacity(NONCE_LEN + sealed.len());
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&sealed);

    Ok(hex::encode(blob))
}

/// Decrypt a blob produced by [`encrypt`].
///
/// A failed tag check is reported as [`VaultError::WrongPassphrase`]; input
/// that is not hex or too short to hold a nonce is a format problem.
pub fn decrypt(blob: &[u8], passphrase: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let raw = hex::decode(blob)
        .map_err(|e| VaultError::FileManuallyEdited(format!("ciphertext is not hex: {e}")))?;

    if raw.len() < NONCE_LEN {
        return Err(VaultError::FileManuallyEdited(
            "ciphertext shorter than nonce".into(),
        ));
    }

    let cipher = cipher_for(passphrase)?;
    let (nonce, sealed) = raw.split_at(NONCE_LEN);

    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), sealed)
        .map_err(|_| VaultError::WrongPassphrase)?;
    Ok(Zeroizing::new(plaintext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let pw = b"correct horse";
        let msgs: [&[u8]; 4] = [b"", b"a", b"{\"passwd\":\"\",\"store\":{}}", &[0xffu8; 1000]];
        for msg in msgs {
            let blob = encrypt(msg, pw).unwrap();
            assert_eq!(&decrypt(blob.as_bytes(), pw).unwrap()[..], msg);
        }
    }

    #[test]
    fn decrypts_fixed_aes_gcm_blob() {
        // nonce 01..0c, key "master" padded with '0'
        let blob = "0102030405060708090a0b0c801e20ea4eefef51f5f3d3e91f64650dc612d1212594c2dbf68893a1129765e48beb5203dc42e7754ec0ab6a40536299dde47c4c95febf8226553bcf15980ee99934181eaa23f1c6f264";
        let plaintext = decrypt(blob.as_bytes(), b"master").unwrap();
        assert_eq!(
            &plaintext[..],
            br#"{"passwd":"bWFzdGVy","store":{"github":"hunter2","k":"v"}}"#
        );
    }

    #[test]
    fn output_is_lowercase_hex() {
        let blob = encrypt(b"data", b"pw").unwrap();
        assert!(blob.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)));
    }

    #[test]
    fn nonce_is_fresh_per_call() {
        let a = encrypt(b"same", b"pw").unwrap();
        let b = encrypt(b"same", b"pw").unwrap();
        assert_ne!(a, b);
        assert_ne!(&a[..NONCE_LEN * 2], &b[..NONCE_LEN * 2]);
    }

    #[test]
    fn wrong_passphrase_is_distinguished() {
        let blob = encrypt(b"data", b"right").unwrap();
        assert!(matches!(
            decrypt(blob.as_bytes(), b"wrong"),
            Err(VaultError::WrongPassphrase)
        ));
    }

    #[test]
    fn corrupted_ciphertext_fails_tag_check() {
        let mut blob = encrypt(b"data", b"pw").unwrap().into_bytes();
        let last = blob.len() - 1;
        blob[last] = if blob[last] == b'0' { b'1' } else { b'0' };
        assert!(matches!(
            decrypt(&blob, b"pw"),
            Err(VaultError::WrongPassphrase)
        ));
    }

    #[test]
    fn non_hex_input_is_format_error() {
        assert!(matches!(
            decrypt(b"not hex at all", b"pw"),
            Err(VaultError::FileManuallyEdited(_))
        ));
    }

    #[test]
    fn short_input_is_format_error() {
        assert!(matches!(
            decrypt(b"abcd", b"pw"),
            Err(VaultError::FileManuallyEdited(_))
        ));
    }

    #[test]
    fn oversized_or_empty_passphrase_is_crypto_error() {
        assert!(matches!(
            encrypt(b"data", &[b'x'; 40]),
            Err(VaultError::Crypto(_))
        ));
        assert!(matches!(encrypt(b"data", b""), Err(VaultError::Crypto(_))));
    }

    #[test]
    fn full_key_len_passphrase_works() {
        let pw = [b'k'; super::super::KEY_LEN];
        let blob = encrypt(b"data", &pw).unwrap();
        assert_eq!(&decrypt(blob.as_bytes(), &pw).unwrap()[..], b"data");
    }
}

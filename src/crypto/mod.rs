//! Cryptographic primitives for the vault.
//!
//! Every function here is stateless: encryption keyed directly by the padded
//! passphrase, SHA-256 / HMAC-SHA256 digests, constant-time comparison and
//! random secret generation.

pub mod aead;
pub mod digest;
pub mod key;
pub mod random;

pub use aead::{decrypt, encrypt};
pub use digest::{digest, hash, hmac_hash, verify};
pub use key::pad_passphrase;
pub use random::generate;

/// Length of the nonce (12 bytes for AES-256-GCM).
pub const NONCE_LEN: usize = 12;
/// Length of the encryption key (32 bytes / 256 bits).
pub const KEY_LEN: usize = 32;
/// Byte appended to a passphrase until it fills a whole key.
pub const PAD_BYTE: u8 = b'0';

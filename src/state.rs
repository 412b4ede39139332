use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use zeroize::Zeroize;

/// Decrypted contents of one vault file.
///
/// `passphrase` echoes the passphrase the state was last saved under. It is
/// empty only for a vault that has never had a passphrase set, and such a
/// state is never written to disk.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct VaultState {
    #[serde(rename = "passwd", with = "base64_bytes")]
    passphrase: Vec<u8>,
    #[serde(rename = "store", default)]
    entries: HashMap<String, String>,
}

impl Drop for VaultState {
    fn drop(&mut self) {
        self.passphrase.zeroize();
    }
}

impl VaultState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_passphrase(&self) -> bool {
        !self.passphrase.is_empty()
    }

    pub(crate) fn set_passphrase(&mut self, passphrase: &[u8]) {
        self.passphrase.zeroize();
        self.passphrase = passphrase.to_vec();
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &String)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Passphrase bytes travel as a base64 string inside the JSON payload.
mod base64_bytes {
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(D::Error::custom)
    }
}

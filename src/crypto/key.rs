use super::{KEY_LEN, PAD_BYTE};
use zeroize::Zeroizing;

/// Turns a passphrase into raw key bytes.
///
/// The passphrase is right-padded with [`PAD_BYTE`] until its length is a
/// multiple of [`KEY_LEN`]. There is no stretching: the padded bytes are the
/// key. A passphrase longer than one key therefore pads to 64, 96, ... bytes,
/// which the cipher later rejects.
pub fn pad_passphrase(passphrase: &[u8]) -> Zeroizing<Vec<u8>> {
    let rem = passphrase.len() % KEY_LEN;
    let fill = if rem == 0 { 0 } else { KEY_LEN - rem };

    let mut key = Zeroizing::new(Vec::with_capacity(passphrase.len() + fill));
    key.extend_from_slice(passphrase);
    key.resize(passphrase.len() + fill, PAD_BYTE);
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_passphrase_is_padded_to_key_len() {
        let key = pad_passphrase(b"secret");
        assert_eq!(key.len(), KEY_LEN);
        assert_eq!(&key[..6], b"secret");
        assert!(key[6..].iter().all(|b| *b == PAD_BYTE));
    }

    #[test]
    fn exact_key_len_is_untouched() {
        let pw = [7u8; KEY_LEN];
        assert_eq!(&pad_passphrase(&pw)[..], &pw[..]);
    }

    #[test]
    fn long_passphrase_pads_to_next_multiple() {
        let key = pad_passphrase(&[1u8; KEY_LEN + 1]);
        assert_eq!(key.len(), 2 * KEY_LEN);
    }

    #[test]
    fn empty_passphrase_stays_empty() {
        assert!(pad_passphrase(b"").is_empty());
    }
}

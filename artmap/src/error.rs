use thiserror::Error;

/// Failures reported by [`ArtMap`](crate::ArtMap).
///
/// The only failure is an exact-key operation naming a key that is not stored. The map is never
/// left in a partially updated state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArtError {
    #[error("key not found: {:?}", String::from_utf8_lossy(.key))]
    KeyNotFound { key: Vec<u8> },
}

impl ArtError {
    pub(crate) fn key_not_found(key: &[u8]) -> Self {
        ArtError::KeyNotFound { key: key.to_vec() }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ArtError;

    #[test]
    fn message_shows_key() {
        let err = ArtError::key_not_found(b"apple");
        assert_eq!(err.to_string(), "key not found: \"apple\"");
        let err = ArtError::key_not_found(&[0x61, 0xff]);
        assert_eq!(err.to_string(), "key not found: \"a\u{fffd}\"");
    }
}

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use ring::rand::SecureRandom;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum UtilError {
    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Invalid format: {0}")]
    Format(String),
}

pub(crate) fn base64url_decode(input: &str) -> Result<Vec<u8>, UtilError> {
    URL_SAFE_NO_PAD
        .decode(input)
        .map_err(|_| UtilError::Format("Failed to decode base64url".to_string()))
}

pub(crate) fn base64url_encode(input: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

/// Generate `len` random bytes from the system CSPRNG, base64url encoded.
pub fn gen_random_string(len: usize) -> Result<String, UtilError> {
    let rng = ring::rand::SystemRandom::new();
    let mut bytes = vec![0u8; len];
    rng.fill(&mut bytes)
        .map_err(|_| UtilError::Crypto("Failed to generate random string".to_string()))?;
    Ok(base64url_encode(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gen_random_string_length() {
        // Given a requested byte length
        let len = 32;

        // When generating a random string
        let result = gen_random_string(len).unwrap();

        // Then the base64url encoding of 32 bytes is 43 characters, unpadded
        assert_eq!(result.len(), 43);
        assert!(!result.contains('='));
    }

    #[test]
    fn test_gen_random_string_is_unique() {
        let first = gen_random_string(32).unwrap();
        let second = gen_random_string(32).unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_base64url_round_trip() {
        let input = b"arbitrary bytes \x00\xff";

        let encoded = base64url_encode(input);
        let decoded = base64url_decode(&encoded).unwrap();

        assert_eq!(decoded, input);
    }

    #[test]
    fn test_base64url_decode_rejects_invalid_input() {
        let result = base64url_decode("not!valid!base64url");

        assert!(matches!(result, Err(UtilError::Format(_))));
    }
}

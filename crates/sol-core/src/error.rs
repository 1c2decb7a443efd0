use thiserror::Error;

/// Errors from the transaction-building primitives.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid key length: expected 32 or 64 bytes, got {0}")]
    InvalidKeyLength(usize),

    #[error("signing error: {0}")]
    SigningError(String),

    #[error("invalid base58 character {character:?} at index {index}")]
    InvalidCharacter { character: char, index: usize },

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("no viable program address for the given seeds")]
    NoViableAddress,

    #[error("message build error: {0}")]
    MessageBuild(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_key_length() {
        let err = CoreError::InvalidKeyLength(17);
        assert_eq!(
            err.to_string(),
            "invalid key length: expected 32 or 64 bytes, got 17"
        );
    }

    #[test]
    fn display_invalid_character() {
        let err = CoreError::InvalidCharacter {
            character: 'O',
            index: 3,
        };
        assert_eq!(err.to_string(), "invalid base58 character 'O' at index 3");
    }

    #[test]
    fn display_no_viable_address() {
        assert_eq!(
            CoreError::NoViableAddress.to_string(),
            "no viable program address for the given seeds"
        );
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> = Box::new(CoreError::MessageBuild("oops".into()));
        assert!(err.to_string().contains("oops"));
    }
}

use thiserror::Error;

/// Failure taxonomy for one logical generation call.
///
/// Per-credential failures are routine under multi-key rotation; the client
/// logs them and only surfaces `CredentialExhausted` once the whole rotation
/// has been tried. Credential values never appear in these messages beyond
/// the masked form produced by [`mask_credential`].
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("no API credentials configured")]
    EmptyCredentialSet,

    /// The remote call itself failed (transport error, non-2xx status,
    /// blocked or empty model output).
    #[error("model call failed: {0}")]
    Backend(String),

    /// The remote call succeeded but the returned text does not parse or
    /// does not match the expected response shape.
    #[error("model returned a malformed response: {0}")]
    MalformedResponse(String),

    #[error("the AI service is currently unavailable or all keys have reached their quota. Please try again in a few moments.")]
    CredentialExhausted {
        attempts: usize,
        #[source]
        last: Option<Box<GenerationError>>,
    },
}

/// Masked rendering of a credential for logs: the last four characters only.
pub fn mask_credential(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        "****".to_string()
    } else {
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("****{}", tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_hides_all_but_last_four() {
        assert_eq!(mask_credential("AIzaSyExample1234"), "****1234");
        assert_eq!(mask_credential("abcd"), "****");
        assert_eq!(mask_credential(""), "****");
    }

    #[test]
    fn exhausted_message_is_user_facing_and_key_free() {
        let err = GenerationError::CredentialExhausted {
            attempts: 3,
            last: Some(Box::new(GenerationError::Backend(
                "HTTP 429 from upstream".into(),
            ))),
        };
        let msg = err.to_string();
        assert!(msg.contains("unavailable"));
        assert!(!msg.contains("429"));
    }

    #[test]
    fn exhausted_preserves_underlying_error_as_source() {
        use std::error::Error;
        let err = GenerationError::CredentialExhausted {
            attempts: 2,
            last: Some(Box::new(GenerationError::MalformedResponse(
                "expected value at line 1".into(),
            ))),
        };
        let source = err.source().expect("source should be set");
        assert!(source.to_string().contains("malformed"));
    }
}

// crates/guestbook-core/src/identity.rs

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// An authenticated caller, as vouched for by an `Authenticator`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    /// Stable subject identifier (e.g. a user handle).
    pub subject: String,
}

impl CallerIdentity {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
        }
    }
}

/// Per-request authentication outcome.
///
/// Attached to every request before dispatch. Public procedures ignore it;
/// protected procedures require `Authenticated`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CallerContext {
    #[default]
    Anonymous,
    Authenticated(CallerIdentity),
}

impl CallerContext {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, CallerContext::Authenticated(_))
    }

    pub fn identity(&self) -> Option<&CallerIdentity> {
        match self {
            CallerContext::Authenticated(identity) => Some(identity),
            CallerContext::Anonymous => None,
        }
    }
}

/// Hex-encoded SHA-256 digest of a bearer token.
///
/// Configuration stores digests only; presented tokens are hashed and compared.
pub fn token_digest(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_digest_known_vector() {
        // SHA-256("abc")
        assert_eq!(
            token_digest("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_caller_context_accessors() {
        let anon = CallerContext::default();
        assert!(!anon.is_authenticated());
        assert!(anon.identity().is_none());

        let ada = CallerContext::Authenticated(CallerIdentity::new("ada"));
        assert!(ada.is_authenticated());
        assert_eq!(ada.identity().map(|i| i.subject.as_str()), Some("ada"));
    }
}

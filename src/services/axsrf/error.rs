use thiserror::Error;

/// Failures while minting a credential.
///
/// Verification never produces one of these: a bad credential is an
/// anonymous caller, not an error.
#[derive(Debug, Error)]
pub enum AxsrfError {
    #[error("claims payload must serialize to a JSON object")]
    PayloadNotObject,

    #[error("claims payload must not carry 'exp'; pass the expiry separately")]
    PayloadHasExp,

    #[error("claims payload is not serializable: {0}")]
    Payload(#[source] serde_json::Error),

    #[error("expiry is out of range")]
    ExpiryOutOfRange,

    #[error("os random source failed: {0}")]
    Entropy(getrandom::Error),

    #[error("invalid hmac key")]
    Key,

    #[error("failed to sign credential: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),
}

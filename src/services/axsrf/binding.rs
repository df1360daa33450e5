//! Cookie ↔ credential binding.
//!
//! The credential carries `axsrf = base64(HMAC(alg, secret, cookie_value))`.
//! A request authenticates only when the HMAC recomputed from its current
//! `axsrf` cookie equals that claim.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use sha2::{Sha224, Sha256, Sha384, Sha512};

/// HMAC hash function used for the binding digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha224 => "sha224",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unsupported hashing algorithm: {0}")]
pub struct UnsupportedAlgorithm(pub String);

impl FromStr for HashAlgorithm {
    type Err = UnsupportedAlgorithm;

    /// Accepts `sha256`, `SHA-256`, `sha_256` and so on.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_'], "");

        match normalized.as_str() {
            "sha224" => Ok(Self::Sha224),
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            _ => Err(UnsupportedAlgorithm(s.to_string())),
        }
    }
}

// Each arm has its own concrete `Hmac<D>` type, so the body is expanded per arm.
macro_rules! with_mac {
    ($alg:expr, $secret:expr, $value:expr, |$mac:ident| $body:expr) => {
        match $alg {
            HashAlgorithm::Sha224 => {
                let mut $mac = Hmac::<Sha224>::new_from_slice($secret)?;
                $mac.update($value);
                $body
            }
            HashAlgorithm::Sha256 => {
                let mut $mac = Hmac::<Sha256>::new_from_slice($secret)?;
                $mac.update($value);
                $body
            }
            HashAlgorithm::Sha384 => {
                let mut $mac = Hmac::<Sha384>::new_from_slice($secret)?;
                $mac.update($value);
                $body
            }
            HashAlgorithm::Sha512 => {
                let mut $mac = Hmac::<Sha512>::new_from_slice($secret)?;
                $mac.update($value);
                $body
            }
        }
    };
}

/// Keyed binder shared by the validator and the issuer.
///
/// Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct Binder {
    algorithm: HashAlgorithm,
    secret: Vec<u8>,
}

impl fmt::Debug for Binder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binder")
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

impl Binder {
    pub fn new(algorithm: HashAlgorithm, secret: &[u8]) -> Self {
        Self {
            algorithm,
            secret: secret.to_vec(),
        }
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Binding digest for a cookie value, standard base64 with padding.
    pub fn digest(&self, cookie_value: &str) -> Result<String, InvalidLength> {
        let raw = with_mac!(
            self.algorithm,
            &self.secret,
            cookie_value.as_bytes(),
            |mac| mac.finalize().into_bytes().to_vec()
        );

        Ok(STANDARD.encode(raw))
    }

    /// Constant-time check that `claimed` is the binding digest of `cookie_value`.
    pub fn matches(&self, cookie_value: &str, claimed: &str) -> bool {
        let Ok(claimed) = STANDARD.decode(claimed) else {
            return false;
        };

        self.verify_raw(cookie_value.as_bytes(), &claimed)
            .unwrap_or(false)
    }

    fn verify_raw(&self, value: &[u8], claimed: &[u8]) -> Result<bool, InvalidLength> {
        let verified = with_mac!(self.algorithm, &self.secret, value, |mac| {
            mac.verify_slice(claimed).is_ok()
        });

        Ok(verified)
    }
}

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Claims object carried by a credential: `axsrf`, `iat`, `exp` plus caller fields.
pub type Claims = Map<String, Value>;

/// HMAC-signed compact JWS codec keyed by the shared secret.
///
/// - Signs with HS256.
/// - Verifies HS256/HS384/HS512 signatures and the token format only.
///   `exp` is checked by the validator (strict, zero leeway), so the
///   library's own expiry handling is disabled here.
#[derive(Clone)]
pub struct CredentialCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for CredentialCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("CredentialCodec")
            .field("algorithms", &self.validation.algorithms)
            .finish()
    }
}

impl CredentialCodec {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, claims, &self.encoding_key)
    }

    /// Signature + format check. Returns every claim, unmodified.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

/// Verified claims of an authenticated caller.
///
/// The shape is caller-defined; nothing here rewrites it.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity(Claims);

impl Identity {
    pub fn new(claims: Claims) -> Self {
        Self(claims)
    }

    pub fn claims(&self) -> &Claims {
        &self.0
    }

    pub fn into_claims(self) -> Claims {
        self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn axsrf(&self) -> Option<&str> {
        self.0.get("axsrf").and_then(Value::as_str)
    }

    pub fn iat(&self) -> Option<i64> {
        self.0.get("iat").and_then(Value::as_i64)
    }

    pub fn exp(&self) -> Option<i64> {
        self.0.get("exp").and_then(Value::as_i64)
    }

    /// Deserialize the claims into an application type.
    pub fn claims_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.0.clone()))
    }
}

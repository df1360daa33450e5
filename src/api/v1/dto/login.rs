use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Request body for `POST /login`.
///
/// `sub` is required; every other field is carried into the credential as-is.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub sub: String,

    #[serde(flatten)]
    pub claims: Map<String, Value>,
}

impl LoginRequest {
    /// Claims payload handed to the issuer.
    pub fn into_payload(self) -> Map<String, Value> {
        let mut payload = self.claims;
        payload.insert("sub".to_string(), Value::String(self.sub));
        payload
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    /// Always "Bearer"
    pub token_type: &'static str,
    /// Seconds until expiry.
    pub expires_in: u64,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn extra_fields_become_claims() {
        let req: LoginRequest =
            serde_json::from_value(json!({"sub": "user-1", "role": "admin"})).unwrap();
        let payload = req.into_payload();

        assert_eq!(payload["sub"], "user-1");
        assert_eq!(payload["role"], "admin");
        assert_eq!(payload.len(), 2);
    }

    #[test]
    fn sub_is_required() {
        assert!(serde_json::from_value::<LoginRequest>(json!({"role": "x"})).is_err());
    }
}

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;

use crate::application::interface::crypto::{TokenError, TokenVerifier};

#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(rename = "userId")]
    user_id: String,
}

/// Verifies HS256 tokens issued by the identity service. `exp` is optional
/// but enforced when present.
pub struct JwtTokenVerifier {
    key: Option<DecodingKey>,
    validation: Validation,
}

impl JwtTokenVerifier {
    pub fn new(secret_key: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = true;
        validation.validate_aud = false;

        Self {
            key: secret_key
                .filter(|s| !s.is_empty())
                .map(|s| DecodingKey::from_secret(s.as_bytes())),
            validation,
        }
    }
}

impl TokenVerifier for JwtTokenVerifier {
    fn verify(&self, token: Option<&str>) -> Result<String, TokenError> {
        let token = token.filter(|t| !t.is_empty()).ok_or(TokenError::Missing)?;
        let key = self.key.as_ref().ok_or(TokenError::Misconfigured)?;

        let data = decode::<Claims>(token, key, &self.validation).map_err(|e| TokenError::Invalid(e.to_string()))?;

        if data.claims.user_id.trim().is_empty() {
            return Err(TokenError::Invalid("empty userId claim".to_string()));
        }
        Ok(data.claims.user_id)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use jsonwebtoken::{EncodingKey, Header, encode};
    use rstest::{fixture, rstest};
    use serde_json::json;

    use super::JwtTokenVerifier;
    use crate::application::interface::crypto::{TokenError, TokenVerifier};

    const SECRET: &str = "test-secret";

    fn sign(claims: serde_json::Value, secret: &str) -> String {
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[fixture]
    fn verifier() -> JwtTokenVerifier {
        JwtTokenVerifier::new(Some(SECRET))
    }

    #[rstest]
    fn test_valid_token_without_exp(verifier: JwtTokenVerifier) {
        let token = sign(json!({"userId": "u1"}), SECRET);
        assert_eq!(verifier.verify(Some(&token)).unwrap(), "u1");
    }

    #[rstest]
    fn test_valid_token_with_future_exp(verifier: JwtTokenVerifier) {
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let token = sign(json!({"userId": "u1", "exp": exp}), SECRET);
        assert_eq!(verifier.verify(Some(&token)).unwrap(), "u1");
    }

    #[rstest]
    #[case(json!("monkey-mess"))]
    #[case(json!(["profiles", "billing"]))]
    fn test_any_audience_is_accepted(verifier: JwtTokenVerifier, #[case] aud: serde_json::Value) {
        let token = sign(json!({"userId": "u1", "aud": aud}), SECRET);
        assert_eq!(verifier.verify(Some(&token)).unwrap(), "u1");
    }

    #[rstest]
    fn test_expired_token(verifier: JwtTokenVerifier) {
        let exp = (Utc::now() - Duration::hours(1)).timestamp();
        let token = sign(json!({"userId": "u1", "exp": exp}), SECRET);
        assert!(matches!(verifier.verify(Some(&token)), Err(TokenError::Invalid(_))));
    }

    #[rstest]
    fn test_wrong_signature(verifier: JwtTokenVerifier) {
        let token = sign(json!({"userId": "u1"}), "another-secret");
        assert!(matches!(verifier.verify(Some(&token)), Err(TokenError::Invalid(_))));
    }

    #[rstest]
    #[case(json!({"sub": "u1"}))]
    #[case(json!({"userId": ""}))]
    #[case(json!({"userId": 42}))]
    fn test_bad_identity_claim(verifier: JwtTokenVerifier, #[case] claims: serde_json::Value) {
        let token = sign(claims, SECRET);
        assert!(matches!(verifier.verify(Some(&token)), Err(TokenError::Invalid(_))));
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    fn test_missing_token(verifier: JwtTokenVerifier, #[case] token: Option<&str>) {
        assert_eq!(verifier.verify(token), Err(TokenError::Missing));
    }

    #[rstest]
    fn test_garbage_token(verifier: JwtTokenVerifier) {
        assert!(matches!(verifier.verify(Some("not-a-jwt")), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_missing_secret_is_misconfigured() {
        let verifier = JwtTokenVerifier::new(None);
        let token = sign(json!({"userId": "u1"}), SECRET);

        assert_eq!(verifier.verify(Some(&token)), Err(TokenError::Misconfigured));
        assert_eq!(verifier.verify(None), Err(TokenError::Missing));
    }
}

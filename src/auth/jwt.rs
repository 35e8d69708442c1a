use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

/// Claims minted by the external identity provider. This service only
/// verifies; it never issues tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Stable applicant identifier.
    pub sub: String,
    /// Display name.
    pub name: String,
    /// Role id, see [`crate::model::role::Role`].
    pub role: u8,
    pub exp: usize,
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn mint(secret: &str, exp: usize) -> String {
        let claims = Claims {
            sub: "jdoe".into(),
            name: "John Doe".into(),
            role: 3,
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn far_future() -> usize {
        4102444800 // 2100-01-01
    }

    #[test]
    fn valid_token_round_trips_the_claims() {
        let token = mint("s3cret", far_future());
        let claims = verify_token(&token, "s3cret").unwrap();
        assert_eq!(claims.sub, "jdoe");
        assert_eq!(claims.name, "John Doe");
        assert_eq!(claims.role, 3);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = mint("s3cret", far_future());
        assert!(verify_token(&token, "other").is_err());
    }
}

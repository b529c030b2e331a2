use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::types::{AuthContext, AuthError, Claims, Role};

/// Encodes and verifies the bearer tokens minted by the account service.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// Creates a service keyed by the `JWT_SECRET` environment variable.
    pub fn new() -> Self {
        let secret = std::env::var("JWT_SECRET")
            .unwrap_or_else(|_| "your-secret-key-change-this-in-production".to_string());

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
        }
    }

    /// Generates an access token for the given identity. The account
    /// service mints tokens with the same claims; this is used by tests
    /// and operational tooling.
    pub fn generate_access_token(&self, ctx: &AuthContext) -> Result<String, AuthError> {
        let expiration = Utc::now()
            .checked_add_signed(Duration::hours(1))
            .expect("valid timestamp")
            .timestamp() as usize;

        let claims = Claims {
            sub: ctx.user_id.to_string(),
            email: ctx.email.clone(),
            role: ctx.role.as_str().to_string(),
            first_name: ctx.first_name.clone(),
            last_name: ctx.last_name.clone(),
            exp: expiration,
            iat: Utc::now().timestamp() as usize,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Verifies a token's signature and expiry and returns its claims.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS256),
        )?;

        Ok(token_data.claims)
    }

    /// Verifies a token and resolves it into a request identity.
    pub fn auth_context_from_token(&self, token: &str) -> Result<AuthContext, AuthError> {
        let claims = self.verify_token(token)?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;
        let role = Role::parse(&claims.role).ok_or(AuthError::InvalidToken)?;

        Ok(AuthContext {
            user_id,
            email: claims.email,
            role,
            first_name: claims.first_name,
            last_name: claims.last_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_context(role: Role) -> AuthContext {
        AuthContext {
            user_id: Uuid::new_v4(),
            email: "pat@example.com".to_string(),
            role,
            first_name: "Pat".to_string(),
            last_name: "Reyes".to_string(),
        }
    }

    #[test]
    fn token_round_trips_to_the_same_identity() {
        let service = JwtService::new();
        let ctx = sample_context(Role::Customer);

        let token = service.generate_access_token(&ctx).unwrap();
        let decoded = service.auth_context_from_token(&token).unwrap();

        assert_eq!(decoded.user_id, ctx.user_id);
        assert_eq!(decoded.email, ctx.email);
        assert_eq!(decoded.role, Role::Customer);
        assert_eq!(decoded.first_name, "Pat");
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        let service = JwtService::new();
        assert!(service.auth_context_from_token("not-a-token").is_err());
    }
}

use std::time::{SystemTime, UNIX_EPOCH};

use crate::model::role::Role;
use crate::models::{Claims, TokenType};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

/// Mint an access token the way the external identity service does. Token
/// issuance itself lives outside this service; this helper exists for test
/// fixtures and local tooling that share the secret.
pub fn generate_access_token(
    actor_id: &str,
    name: &str,
    roles: &[Role],
    secret: &str,
    ttl: usize,
) -> String {
    let claims = Claims {
        sub: actor_id.to_string(),
        name: name.to_string(),
        roles: roles.iter().map(|r| r.to_string()).collect(),
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
        token_type: TokenType::Access,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
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

    #[test]
    fn minted_tokens_verify_and_carry_roles() {
        let token =
            generate_access_token("emp-1", "Jane Roe", &[Role::Supervisor], "test-secret", 300);
        let claims = verify_token(&token, "test-secret").unwrap();
        assert_eq!(claims.sub, "emp-1");
        assert_eq!(claims.roles, vec!["supervisor".to_string()]);
        assert_eq!(claims.token_type, TokenType::Access);

        assert!(verify_token(&token, "other-secret").is_err());
    }
}

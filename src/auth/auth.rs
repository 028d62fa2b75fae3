use std::str::FromStr;

use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::model::role::{Actor, Role};
use crate::models::TokenType;
use actix_web::{FromRequest, HttpRequest, dev::Payload, error::ErrorUnauthorized, web::Data};
use futures::future::{Ready, ready};

/// Authenticated caller, extracted from the bearer token. Raw role strings
/// from the identity provider are mapped into the closed `Role` set here;
/// strings we do not recognize are dropped rather than trusted.
pub struct AuthUser {
    pub id: String,
    pub name: String,
    pub roles: Vec<Role>,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => return ready(Err(ErrorUnauthorized("Missing token"))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(actix_web::error::ErrorInternalServerError(
                    "Config missing",
                )));
            }
        };

        let claims = match verify_token(token, &config.jwt_secret) {
            Ok(c) => c,
            Err(_) => return ready(Err(ErrorUnauthorized("Invalid token"))),
        };

        if claims.token_type != TokenType::Access {
            return ready(Err(ErrorUnauthorized("Not an access token")));
        }

        let roles = claims
            .roles
            .iter()
            .filter_map(|raw| match Role::from_str(raw) {
                Ok(role) => Some(role),
                Err(_) => {
                    tracing::debug!(role = %raw, "Dropping unrecognized role string");
                    None
                }
            })
            .collect();

        ready(Ok(AuthUser {
            id: claims.sub,
            name: claims.name,
            roles,
        }))
    }
}

impl AuthUser {
    /// Explicit identity context handed to the workflow on every call.
    pub fn actor(&self) -> Actor {
        Actor::new(self.id.clone(), self.roles.clone())
    }
}

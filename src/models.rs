use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Actor id, as issued by the external identity service
    pub sub: String,
    pub name: String,
    /// Raw role strings; mapped into the closed `Role` set at the boundary
    pub roles: Vec<String>,
    pub exp: usize,
    pub jti: String,
    pub token_type: TokenType,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}

use serde::{Deserialize, Serialize};

/// JWT payload issued at login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,         // user ID
    pub username: String,
    pub email: String,
    pub iat: usize,       // issued at (unix timestamp)
    pub exp: usize,       // expires at (unix timestamp)
    pub iss: String,      // issuer
    pub aud: String,      // audience
}

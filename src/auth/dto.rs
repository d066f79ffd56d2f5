use serde::{Deserialize, Serialize};

use crate::users::dto::UserView;

/// Request body for login.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub user: UserView,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_body_rejects_unknown_fields() {
        let ok = serde_json::from_str::<LoginRequest>(r#"{"username":"DeanVini","password":"dean@12345"}"#);
        assert!(ok.is_ok());
        let res = serde_json::from_str::<LoginRequest>(
            r#"{"username":"DeanVini","password":"dean@12345","remember":true}"#,
        );
        assert!(res.is_err());
    }
}

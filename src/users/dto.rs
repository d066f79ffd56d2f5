use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::repo_types::{User, UserChanges};
use crate::error::AppError;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateUserRequest {
    pub name: String,
    pub surname: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for profile edits.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
}

/// Public view of a user. Carries no password field at all.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: i64,
    pub name: String,
    pub surname: String,
    pub username: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for UserView {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            surname: u.surname,
            username: u.username,
            email: u.email,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl CreateUserRequest {
    pub fn validate(mut self) -> Result<Self, AppError> {
        self.email = normalize_email(&self.email);
        if !is_valid_email(&self.email) {
            return Err(AppError::Validation("Invalid email".into()));
        }
        if self.username.trim().is_empty() {
            return Err(AppError::Validation("Username is required".into()));
        }
        if self.password.len() < MIN_PASSWORD_LEN {
            return Err(AppError::Validation("Password too short".into()));
        }
        Ok(self)
    }
}

impl UpdateUserRequest {
    pub fn into_changes(self) -> Result<UserChanges, AppError> {
        let email = self.email.map(|e| normalize_email(&e));
        if let Some(email) = &email {
            if !is_valid_email(email) {
                return Err(AppError::Validation("Invalid email".into()));
            }
        }
        if self.username.as_deref().is_some_and(|u| u.trim().is_empty()) {
            return Err(AppError::Validation("Username is required".into()));
        }
        Ok(UserChanges {
            name: self.name,
            surname: self.surname,
            username: self.username,
            email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: &str, password: &str) -> CreateUserRequest {
        CreateUserRequest {
            name: "Dean".into(),
            surname: "de Meneses".into(),
            username: "DeanVini".into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn create_request_normalizes_email() {
        let req = request("  Dean@Example.COM ", "dean@12345").validate().unwrap();
        assert_eq!(req.email, "dean@example.com");
    }

    #[test]
    fn create_request_rejects_bad_email_and_short_password() {
        assert!(matches!(
            request("not-an-email", "dean@12345").validate(),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            request("dean@example.com", "12345").validate(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn create_request_rejects_unknown_fields() {
        let body = r#"{"name":"a","surname":"b","username":"c","email":"c@d.io","password":"secret1","role":"admin"}"#;
        assert!(serde_json::from_str::<CreateUserRequest>(body).is_err());
    }

    #[test]
    fn update_request_keeps_omitted_fields_unset() {
        let changes = UpdateUserRequest {
            name: Some("Dean Updated".into()),
            ..Default::default()
        }
        .into_changes()
        .unwrap();
        assert_eq!(changes.name.as_deref(), Some("Dean Updated"));
        assert!(changes.username.is_none());
        assert!(changes.email.is_none());
    }

    #[test]
    fn user_view_uses_camel_case_and_iso_timestamps() {
        let ts = time::macros::datetime!(2025-08-11 21:00 UTC);
        let view = UserView::from(User {
            id: 1,
            name: "Dean".into(),
            surname: "de Meneses".into(),
            username: "DeanVini".into(),
            email: "dean@example.com".into(),
            created_at: ts,
            updated_at: ts,
        });
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["createdAt"], "2025-08-11T21:00:00Z");
        assert_eq!(json["username"], "DeanVini");
        assert!(json.get("password").is_none());
        assert!(json.get("password_hash").is_none());
    }
}

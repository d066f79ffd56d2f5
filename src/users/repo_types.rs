use sqlx::FromRow;
use time::OffsetDateTime;

/// User row as stored, including the password digest.
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub name: String,
    pub surname: String,
    pub username: String,
    pub email: String,
    pub password_hash: String, // Argon2 PHC string, never leaves the store layer
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// User with the password digest stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub surname: String,
    pub username: String,
    pub email: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<UserRecord> for User {
    fn from(r: UserRecord) -> Self {
        Self {
            id: r.id,
            name: r.name,
            surname: r.surname,
            username: r.username,
            email: r.email,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Insert payload; `password_hash` is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub surname: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Profile edit. `None` leaves the column unchanged; the password is not editable here.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
}

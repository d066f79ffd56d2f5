use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Argon2 work factor.
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "pomovue".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "pomovue-users".into()),
            ttl_minutes: env_parse("JWT_TTL_MINUTES").unwrap_or(60),
        };
        let defaults = PasswordConfig::default();
        let password = PasswordConfig {
            memory_kib: env_parse("ARGON2_MEMORY_KIB").unwrap_or(defaults.memory_kib),
            iterations: env_parse("ARGON2_ITERATIONS").unwrap_or(defaults.iterations),
            parallelism: env_parse("ARGON2_PARALLELISM").unwrap_or(defaults.parallelism),
        };
        Ok(Self {
            database_url,
            jwt,
            password,
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

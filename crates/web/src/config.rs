use anyhow::{Context, Result};

const DEFAULT_JWT_TTL_HOURS: i64 = 168;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub api_keys: String,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_ttl_hours = match lookup("JWT_TTL_HOURS") {
            Some(raw) => raw.parse().context("JWT_TTL_HOURS must be a number")?,
            None => DEFAULT_JWT_TTL_HOURS,
        };

        Ok(Self {
            host: lookup("HOST").context("Cannot load HOST env variable")?,
            port: lookup("PORT")
                .context("Cannot load PORT env variable")?
                .parse()
                .context("PORT must be a number")?,
            database_url: lookup("DATABASE_URL").context("Cannot load DATABASE_URL env variable")?,
            api_keys: lookup("API_KEYS").unwrap_or_default(),
            jwt_secret: lookup("JWT_SECRET")
                .filter(|secret| !secret.is_empty())
                .context("Cannot load JWT_SECRET env variable")?,
            jwt_ttl_hours,
        })
    }
}

use std::env;
use std::io;
use std::str::FromStr;

/// Upper bound for `JWT_TTL_SECONDS`: one year.
pub const MAX_JWT_TTL_SECONDS: u64 = 365 * 24 * 60 * 60;

pub struct Config {
    /// Postgres connection string. When absent the server keeps its data in memory.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    pub jwt_ttl_seconds: u64,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> io::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> io::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| invalid("JWT_SECRET must be set"))?;

        let bcrypt_cost = parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(invalid("BCRYPT_COST must be between 4 and 31"));
        }

        let jwt_ttl_seconds = parse_or(&lookup, "JWT_TTL_SECONDS", 3600)?;
        if !(1..=MAX_JWT_TTL_SECONDS).contains(&jwt_ttl_seconds) {
            return Err(invalid(&format!(
                "JWT_TTL_SECONDS must be between 1 and {}",
                MAX_JWT_TTL_SECONDS
            )));
        }

        Ok(Self {
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            server_port: parse_or(&lookup, "SERVER_PORT", 8080)?,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            jwt_secret,
            jwt_ttl_seconds,
            bcrypt_cost,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> io::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| invalid(&format!("{} must be a number", key))),
        None => Ok(default),
    }
}

fn invalid(msg: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, msg.to_string())
}

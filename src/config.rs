use anyhow::{Context, Result};

// 300 is Telegram's default cache time for inline answers
const DEFAULT_CACHE_TIME: u32 = 300;

#[derive(Clone, Debug)]
pub struct Config {
    pub debug: bool,
    pub token: String,
    pub database_location: String,
    pub query_cache_time: u32,
}

impl Config {
    pub fn from_env() -> Result<Config> {
        let debug = std::env::var("DEBUG")
            .map(|raw| parse_flag(&raw))
            .unwrap_or(false);

        let token_var = if debug { "DEBUG_TOKEN" } else { "PRODUCTION_TOKEN" };
        let token =
            std::env::var(token_var).with_context(|| format!("{} must be set", token_var))?;

        let database_location =
            std::env::var("DATABASE_LOCATION").context("DATABASE_LOCATION must be set")?;

        let query_cache_time = match std::env::var("QUERY_CACHE_TIME") {
            Ok(raw) => raw
                .parse()
                .context("QUERY_CACHE_TIME must be a number of seconds")?,
            Err(_) => {
                if debug {
                    1
                } else {
                    DEFAULT_CACHE_TIME
                }
            }
        };

        Ok(Config {
            debug,
            token,
            database_location,
            query_cache_time,
        })
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

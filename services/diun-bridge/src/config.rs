use bridge_common::{env_or, LogConfig};
use std::{env, path::PathBuf};

pub const SERVICE_NAME: &str = "diun-bridge";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_path: PathBuf,
    pub logging: LogConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let database_path = env::var("DATABASE_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| "diun2homer.db".to_string());

        Self {
            port: env_or("PORT", 8000u16),
            database_path: PathBuf::from(database_path),
            logging: LogConfig::from_env(SERVICE_NAME),
        }
    }
}

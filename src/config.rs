use std::env;
use std::fmt::{Debug, Display};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::str::FromStr;

use dotenv::dotenv;
use tracing::{info, warn, Level};

#[derive(Debug, Clone)]
pub struct Config {
    pub address: IpAddr,
    pub port: u16,
    pub database_file: PathBuf,
    /// Set through `IS_TEST_MODE`; snapshots are neither loaded nor saved.
    pub test_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 4000,
            database_file: PathBuf::from("database.json"),
            test_mode: false,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        dotenv().ok();
        let defaults = Config::default();
        Config {
            address: try_load("ADDRESS", defaults.address),
            port: try_load("PORT", defaults.port),
            database_file: try_load("DATABASE_FILE", defaults.database_file),
            test_mode: env::var_os("IS_TEST_MODE").is_some(),
        }
    }

    pub fn snapshot_path(&self) -> Option<PathBuf> {
        if self.test_mode {
            None
        } else {
            Some(self.database_file.clone())
        }
    }
}

/// Read before the subscriber exists, so it stays silent about bad values.
pub fn log_level() -> Level {
    dotenv().ok();
    env::var("LOG_LEVEL")
        .ok()
        .and_then(|level| level.parse().ok())
        .unwrap_or(Level::INFO)
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Debug,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("Invalid {} value {:?}: {}, using default: {:?}", key, raw, e, default);
            default
        }),
        Err(_) => {
            info!("{} not set, using default: {:?}", key, default);
            default
        }
    }
}

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::env;

#[derive(Parser, Debug)]
#[command(name = "aviary")]
#[command(about = "Runs the aviary service", long_about = None)]
pub struct Cli {
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,
}

const DEFAULT_PORT: u16 = 5000;

#[derive(Debug)]
pub struct Config {
    database_uri: String,
    port: u16,
}

impl Config {
    pub fn new(database_uri: impl Into<String>, port: u16) -> Self {
        Config {
            database_uri: database_uri.into(),
            port,
        }
    }

    /// Reads configuration from the environment. `DATABASE_URI` must be set;
    /// `PORT` falls back to the default.
    pub fn from_env() -> Result<Self> {
        let database_uri =
            env::var("DATABASE_URI").map_err(|_| anyhow!("DATABASE_URI environment variable not set"))?;

        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().context("PORT is not a valid port number")?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Config { database_uri, port })
    }

    pub fn get_database_uri(&self) -> &str {
        return &self.database_uri;
    }

    pub fn get_port(&self) -> u16 {
        return self.port;
    }
}

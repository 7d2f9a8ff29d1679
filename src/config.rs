//! Configuration
//! =============
//! Resolves the run configuration once at startup. Values come from command line flags, a
//! TOML config file and the environment, in that order of precedence. The resolved
//! [`Config`] is passed down explicitly, nothing reads it from global state.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use clap::Args;
use serde::Deserialize;
use thiserror::Error;

use crate::env;

pub const DEFAULT_PAGE_SIZE: u32 = 10_000;

const CONFIG_SEARCH_PATHS: [&str; 2] = ["config/local.toml", "../../config/local.toml"];

#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Config file to read, defaults to the first of config/local.toml and
    /// ../../config/local.toml that exists.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Enable debug logging.
    #[arg(short, long)]
    pub debug: bool,
    /// Database url, falls back to the config file and then DATABASE_URL.
    #[arg(long)]
    pub database: Option<String>,
    /// Width of the block number window counted per query.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub page_size: Option<u32>,
    /// Number of windows evaluated concurrently.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub concurrency: Option<u32>,
    /// Abort any single query running longer than this many seconds.
    #[arg(long)]
    pub query_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub debug: Option<bool>,
    pub database: Option<String>,
    pub page_size: Option<u32>,
    pub concurrency: Option<u32>,
    pub query_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub debug: bool,
    pub database_url: String,
    pub page_size: u32,
    pub concurrency: u32,
    pub query_timeout: Option<Duration>,
    /// The config file the values were read from, if any.
    pub source: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("no database url, pass --database, set `database` in the config file or set DATABASE_URL")]
    MissingDatabaseUrl,
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

fn find_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => CONFIG_SEARCH_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.is_file()),
    }
}

pub fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn non_zero(name: &'static str, value: u32) -> Result<u32, ConfigError> {
    if value == 0 {
        Err(ConfigError::Zero(name))
    } else {
        Ok(value)
    }
}

/// Merges flags over the file config over the environment.
pub fn resolve(
    args: &ConfigArgs,
    file_config: FileConfig,
    env_database_url: Option<String>,
    source: Option<PathBuf>,
) -> Result<Config, ConfigError> {
    let database_url = args
        .database
        .clone()
        .or(file_config.database)
        .or(env_database_url)
        .filter(|url| !url.is_empty())
        .ok_or(ConfigError::MissingDatabaseUrl)?;

    let page_size = non_zero(
        "page_size",
        args.page_size
            .or(file_config.page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE),
    )?;

    let concurrency = non_zero(
        "concurrency",
        args.concurrency.or(file_config.concurrency).unwrap_or(1),
    )?;

    let query_timeout = args
        .query_timeout_secs
        .or(file_config.query_timeout_secs)
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs);

    Ok(Config {
        debug: args.debug || file_config.debug.unwrap_or(false),
        database_url,
        page_size,
        concurrency,
        query_timeout,
        source,
    })
}

pub fn load(args: &ConfigArgs) -> Result<Config, ConfigError> {
    let source = find_config_file(args.config.as_deref());
    let file_config = match &source {
        Some(path) => read_file_config(path)?,
        None => FileConfig::default(),
    };

    resolve(args, file_config, env::get_env_var("DATABASE_URL"), source)
}

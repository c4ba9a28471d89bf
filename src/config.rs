use crate::dataset::{LoadOptions, DEFAULT_MIN_COMMENT_LEN};
use crate::frequency::DEFAULT_TOP_N;
use crate::search::DEFAULT_TOP_K;
use crate::tokenizer::DEFAULT_MIN_TOKEN_LEN;
use anyhow::{Context, Result};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_DATASET_PATH: &str = "data/olist_order_reviews_dataset.csv";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 7860;

const ENV_PREFIX: &str = "RSREVIEWS_";

/// Runtime settings: built-in defaults, then `RSREVIEWS_*` environment
/// variables, then command-line flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub dataset_path: PathBuf,
    pub min_comment_len: usize,
    pub min_token_len: usize,
    pub top_n: usize,
    pub top_k: usize,
    pub host: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            min_comment_len: DEFAULT_MIN_COMMENT_LEN,
            min_token_len: DEFAULT_MIN_TOKEN_LEN,
            top_n: DEFAULT_TOP_N,
            top_k: DEFAULT_TOP_K,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    /// Defaults overridden by the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(&format!("{ENV_PREFIX}{name}")).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(path) = get("DATASET") {
            config.dataset_path = PathBuf::from(path);
        }
        if let Some(host) = get("HOST") {
            config.host = host;
        }
        parse_into(&get, "MIN_COMMENT_LEN", &mut config.min_comment_len)?;
        parse_into(&get, "MIN_TOKEN_LEN", &mut config.min_token_len)?;
        parse_into(&get, "TOP_N", &mut config.top_n)?;
        parse_into(&get, "TOP_K", &mut config.top_k)?;
        parse_into(&get, "PORT", &mut config.port)?;

        Ok(config)
    }

    /// Address the API server binds; `host` must be an IPv4 or IPv6 literal
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .trim()
            .parse()
            .with_context(|| format!("invalid listen host '{}'", self.host))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            min_comment_len: self.min_comment_len,
        }
    }
}

fn parse_into<T, G>(get: &G, name: &str, slot: &mut T) -> Result<()>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    if let Some(raw) = get(name) {
        *slot = raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value '{raw}' for {ENV_PREFIX}{name}"))?;
    }
    Ok(())
}

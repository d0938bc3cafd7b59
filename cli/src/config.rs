//! `watch` configuration: JSON file, overridden by command-line flags.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use seqswitch_core::ActiveProviderConfig;

use crate::logging::LogConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub rollup_urls: Vec<String>,
    pub eth_urls: Vec<String>,
    #[serde(flatten)]
    pub provider: ActiveProviderConfig,
    pub poll_interval_ms: u64,
    pub log: LogConfig,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            rollup_urls: Vec::new(),
            eth_urls: Vec::new(),
            provider: ActiveProviderConfig::default(),
            poll_interval_ms: 2_000,
            log: LogConfig::default(),
        }
    }
}

impl WatchConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Build from `watch` flags, starting from `--config` if given.
    pub fn from_args(args: &[String]) -> anyhow::Result<Self> {
        let mut config = match parse_flag(args, "--config") {
            Some(path) => Self::load(Path::new(&path))?,
            None => Self::default(),
        };

        if let Some(urls) = parse_flag(args, "--rollup-urls") {
            config.rollup_urls = split_list(&urls);
        }
        if let Some(urls) = parse_flag(args, "--eth-urls") {
            config.eth_urls = split_list(&urls);
        }
        if let Some(ms) = parse_ms(args, "--check-interval-ms")? {
            config.provider.check_interval = ms;
        }
        if let Some(ms) = parse_ms(args, "--timeout-ms")? {
            config.provider.network_timeout = ms;
        }
        if let Some(ms) = parse_ms(args, "--poll-ms")? {
            config.poll_interval_ms = ms.as_millis() as u64;
        }
        if let Some(level) = parse_flag(args, "--log-level") {
            config.log.level = level;
        }
        if has_flag(args, "--log-json") {
            config.log.json = true;
        }

        if config.rollup_urls.is_empty() {
            bail!("--rollup-urls is required");
        }
        if config.eth_urls.is_empty() {
            bail!("--eth-urls is required");
        }
        if config.poll_interval_ms == 0 {
            bail!("--poll-ms must be greater than zero");
        }
        Ok(config)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

pub fn parse_flag(args: &[String], flag: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == flag)?;
    args.get(pos + 1).cloned()
}

pub fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn parse_ms(args: &[String], flag: &str) -> anyhow::Result<Option<Duration>> {
    parse_flag(args, flag)
        .map(|v| {
            v.parse::<u64>()
                .map(Duration::from_millis)
                .with_context(|| format!("{flag} expects milliseconds, got {v:?}"))
        })
        .transpose()
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

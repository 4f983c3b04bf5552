use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub chain: ChainConfig,
    pub airdrop: AirdropConfig,
    pub pacing: PacingConfig,
    pub transport: TransportConfig,
    pub io: IoConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ChainConfig {
    pub address_prefix: String,
    pub address_length: usize,
    /// Base units per display unit
    pub amount_scale: u64,
    pub token_symbol: String,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            address_prefix: "0x".to_string(),
            address_length: 42,
            amount_scale: 1_000_000,
            token_symbol: "INIT".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct AirdropConfig {
    pub endpoint_base: String,
    pub headers: HeaderConfig,
    /// Payload fields copied verbatim into every result row
    pub passthrough_fields: Vec<String>,
}

impl Default for AirdropConfig {
    fn default() -> Self {
        Self {
            endpoint_base: "https://airdrop-api.initia.xyz/info/initia".to_string(),
            headers: HeaderConfig::default(),
            passthrough_fields: vec![
                "xp_rank".to_string(),
                "total_xp".to_string(),
                "jennie_level".to_string(),
                "frame_level".to_string(),
                "filet_mignon".to_string(),
            ],
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct HeaderConfig {
    pub accept: String,
    pub accept_language: String,
    pub if_none_match: String,
    pub origin: String,
    pub referer: String,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            accept: "application/json, text/plain, */*".to_string(),
            accept_language: "zh-CN,zh;q=0.9,is;q=0.8,ko;q=0.7,de;q=0.6,la;q=0.5,ru;q=0.4"
                .to_string(),
            if_none_match: "W/\"12b-WSFqxRZqR0JRJhxd69SVtX6mTCU\"".to_string(),
            origin: "https://airdrop.initia.xyz".to_string(),
            referer: "https://airdrop.initia.xyz/".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct PacingConfig {
    pub max_delay_ms: u64,
    pub pace_first: bool,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            max_delay_ms: 1500,
            pace_first: false,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct TransportConfig {
    pub timeout_secs: u64,
    pub accept_invalid_certs: bool,
    pub user_agent: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            accept_invalid_certs: true,
            user_agent: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct IoConfig {
    pub input_path: String,
    pub output_path: String,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            input_path: "wallet.csv".to_string(),
            output_path: "initia_result.csv".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "airdrop_checker=info,airdrop_check=info,warn".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Load configuration from an optional TOML file, then `AIRDROP__*` env vars
    pub fn load(path: &str) -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::from(Path::new(path)).required(false))
            .add_source(
                config::Environment::with_prefix("AIRDROP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.airdrop.endpoint_base.trim().is_empty() {
            anyhow::bail!("airdrop.endpoint_base must not be empty");
        }
        if self.chain.amount_scale == 0 {
            anyhow::bail!("chain.amount_scale must be greater than zero");
        }
        if self.chain.address_prefix.is_empty() {
            anyhow::bail!("chain.address_prefix must not be empty");
        }
        Ok(())
    }
}

use std::time::Duration;

use clap::Parser;
use nutriscan_core::domain::common::{
    DEFAULT_LLM_BASE_URL, DEFAULT_LLM_MODEL, LLMConfig, NutriscanConfig,
};

#[derive(Debug, Clone, Parser)]
#[command(name = "nutriscan-api", version, about = "NutriScan chat relay")]
pub struct Args {
    #[command(flatten)]
    pub server: ServerArgs,

    #[command(flatten)]
    pub llm: LlmArgs,

    #[command(flatten)]
    pub log: LogArgs,
}

#[derive(Debug, Clone, clap::Args)]
pub struct ServerArgs {
    #[arg(long = "server-host", env = "SERVER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long = "server-port", env = "SERVER_PORT", default_value_t = 3333)]
    pub port: u16,

    /// Prefix for every route, e.g. `/api`.
    #[arg(long = "server-root-path", env = "SERVER_ROOT_PATH", default_value = "")]
    pub root_path: String,

    #[arg(
        long = "allowed-origins",
        env = "ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:5173"
    )]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, clap::Args)]
pub struct LlmArgs {
    #[arg(long = "llm-api-key", env = "LLM_API_KEY")]
    pub api_key: Option<String>,

    #[arg(long = "llm-base-url", env = "LLM_BASE_URL", default_value = DEFAULT_LLM_BASE_URL)]
    pub base_url: String,

    #[arg(long = "llm-model", env = "LLM_MODEL", default_value = DEFAULT_LLM_MODEL)]
    pub model: String,

    #[arg(long = "llm-timeout-secs", env = "LLM_TIMEOUT_SECS", default_value_t = 60)]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, clap::Args)]
pub struct LogArgs {
    #[arg(long = "log-filter", env = "LOG_FILTER", default_value = "info")]
    pub filter: String,

    #[arg(long = "log-json", env = "LOG_JSON", default_value_t = false)]
    pub json: bool,
}

impl From<Args> for NutriscanConfig {
    fn from(args: Args) -> Self {
        NutriscanConfig {
            llm: LLMConfig {
                api_key: args.llm.api_key,
                base_url: args.llm.base_url,
                model: args.llm.model,
                timeout: Duration::from_secs(args.llm.timeout_secs),
            },
        }
    }
}

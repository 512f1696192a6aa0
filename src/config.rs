use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provider {
    OpenAi {
        api_key: String,
        base_url: String,
        model: String,
    },
    Ollama {
        endpoint: String,
        model: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub port: u16,
    pub provider: Provider,
    pub max_tokens: u32,
    pub advice_relay_url: String,
    /// `None` keeps history in memory only.
    pub history_dir: Option<PathBuf>,
    pub activity_log: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let bind_addr = var("BIND_ADDR").unwrap_or_else(|| "127.0.0.1".to_string());
        let port: u16 = match var("PORT") {
            Some(port) => port.parse().map_err(|_| "PORT must be a port number")?,
            None => 3001,
        };

        let provider = match var("LLM_PROVIDER").as_deref().unwrap_or("openai") {
            "openai" => Provider::OpenAi {
                api_key: var("OPENAI_API_KEY").ok_or("OPENAI_API_KEY must be set")?,
                base_url: var("OPENAI_BASE_URL")
                    .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
                model: var("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o".to_string()),
            },
            "ollama" => Provider::Ollama {
                endpoint: var("OLLAMA_ENDPOINT")
                    .unwrap_or_else(|| "http://localhost:11434".to_string()),
                model: var("OLLAMA_MODEL").unwrap_or_else(|| "qwen2.5:1b".to_string()),
            },
            other => return Err(format!("unknown LLM_PROVIDER '{}'", other).into()),
        };

        let max_tokens = match var("MAX_TOKENS") {
            Some(n) => n.parse().map_err(|_| "MAX_TOKENS must be a number")?,
            None => 150,
        };

        let advice_relay_url = var("ADVICE_RELAY_URL")
            .unwrap_or_else(|| format!("http://{}:{}", bind_addr, port));

        let history_dir = match var("HISTORY_DIR").as_deref() {
            Some("off") | Some("") => None,
            Some(dir) => Some(PathBuf::from(dir)),
            None => Some(PathBuf::from("data")),
        };

        let activity_log = var("ACTIVITY_LOG")
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            bind_addr,
            port,
            provider,
            max_tokens,
            advice_relay_url,
            history_dir,
            activity_log,
        })
    }
}

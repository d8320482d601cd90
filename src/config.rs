use serde::Deserialize;

/// Base address used when `ECOCRED_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

/// Optional client capabilities. Both are on unless switched off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Capabilities {
    /// Document upload against `/predict_ocr`.
    pub ocr_uploads: bool,
    /// Inline `predict:` commands in the chat.
    pub chat_commands: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            ocr_uploads: true,
            chat_commands: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api_url: String,
    pub capabilities: Capabilities,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            api_url: validate_api_url(
                std::env::var("ECOCRED_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            )?,
            capabilities: Capabilities {
                ocr_uploads: env_flag("ECOCRED_OCR_UPLOADS", true)?,
                chat_commands: env_flag("ECOCRED_CHAT_COMMANDS", true)?,
            },
        };

        tracing::info!("Configuration loaded successfully");
        tracing::debug!("API URL: {}", config.api_url);
        tracing::debug!(
            "Capabilities: ocr_uploads={}, chat_commands={}",
            config.capabilities.ocr_uploads,
            config.capabilities.chat_commands
        );

        Ok(config)
    }

    /// Replaces the base address, applying the same checks as `from_env`.
    pub fn with_api_url(mut self, url: impl Into<String>) -> anyhow::Result<Self> {
        self.api_url = validate_api_url(url.into())?;
        Ok(self)
    }
}

fn validate_api_url(url: String) -> anyhow::Result<String> {
    let url = url.trim().trim_end_matches('/').to_string();
    if url.is_empty() {
        anyhow::bail!("ECOCRED_API_URL cannot be empty");
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("ECOCRED_API_URL must start with http:// or https://");
    }
    url::Url::parse(&url)
        .map_err(|e| anyhow::anyhow!("ECOCRED_API_URL is not a valid URL: {}", e))?;
    Ok(url)
}

fn env_flag(name: &str, default: bool) -> anyhow::Result<bool> {
    match std::env::var(name) {
        Ok(raw) => parse_flag(&raw)
            .ok_or_else(|| anyhow::anyhow!("{} must be a boolean (true/false), got '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

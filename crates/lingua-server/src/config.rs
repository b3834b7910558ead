use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use lingua_api::JwtSettings;
use lingua_llm::DEFAULT_BASE_URL;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub jwt: JwtSettings,
    pub ollama_base_url: String,
    pub addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| get(key).unwrap_or_else(|| default.into());

        let secret = get("LINGUA_JWT_SECRET").unwrap_or_default();
        if secret.is_empty() || PLACEHOLDER_SECRETS.contains(&secret.as_str()) {
            bail!("LINGUA_JWT_SECRET is unset or still a placeholder");
        }

        let host = var("LINGUA_HOST", "0.0.0.0");
        let port: u16 = var("LINGUA_PORT", "5000")
            .parse()
            .context("LINGUA_PORT must be a port number")?;
        let ip: IpAddr = host
            .parse()
            .with_context(|| format!("LINGUA_HOST must be an IP address, got {}", host))?;
        let addr = SocketAddr::new(ip, port);

        Ok(Self {
            db_path: var("LINGUA_DB_PATH", "lingua.db").into(),
            jwt: JwtSettings {
                secret,
                issuer: var("LINGUA_JWT_ISSUER", "lingua"),
                audience: var("LINGUA_JWT_AUDIENCE", "lingua-clients"),
            },
            ollama_base_url: var("OLLAMA_BASE_URL", DEFAULT_BASE_URL),
            addr,
        })
    }
}

//! TOML configuration.
//!
//! Every section is optional; [`Config::minimal`] yields the built-in
//! defaults used when no config file is given.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub loader: LoaderConfig,
    #[serde(default)]
    pub answer: AnswerConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
    #[serde(default)]
    pub overlap_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
            overlap_chars: 0,
        }
    }
}

fn default_max_chars() -> usize {
    500
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

fn default_top_k() -> usize {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub dims: Option<usize>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Base URL for the Ollama provider.
    #[serde(default)]
    pub url: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            dims: None,
            batch_size: default_batch_size(),
            timeout_secs: default_timeout_secs(),
            url: None,
        }
    }
}

fn default_provider() -> String {
    "local".to_string()
}
fn default_batch_size() -> usize {
    64
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoaderConfig {
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            exclude_globs: Vec::new(),
            follow_symlinks: false,
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec!["txt".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnswerConfig {
    #[serde(default = "default_product")]
    pub product: String,
    /// Days added to the nearest quote's delivery time when estimating.
    #[serde(default = "default_delivery_padding_days")]
    pub delivery_padding_days: u64,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            product: default_product(),
            delivery_padding_days: default_delivery_padding_days(),
        }
    }
}

fn default_product() -> String {
    "Product Y".to_string()
}
fn default_delivery_padding_days() -> u64 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7860".to_string()
}

impl Config {
    /// Built-in defaults, used when no config file is supplied.
    pub fn minimal() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunking.max_chars == 0 {
            bail!("chunking.max_chars must be > 0");
        }
        if self.chunking.overlap_chars >= self.chunking.max_chars {
            bail!("chunking.overlap_chars must be smaller than chunking.max_chars");
        }

        if self.retrieval.top_k == 0 {
            bail!("retrieval.top_k must be >= 1");
        }

        if self.embedding.batch_size == 0 {
            bail!("embedding.batch_size must be >= 1");
        }
        if self.embedding.dims == Some(0) {
            bail!("embedding.dims must be > 0");
        }
        match self.embedding.provider.as_str() {
            "hash" | "local" | "disabled" => {}
            "openai" | "ollama" => {
                if self.embedding.dims.is_none() {
                    bail!(
                        "embedding.dims must be specified when provider is '{}'",
                        self.embedding.provider
                    );
                }
                if self.embedding.model.is_none() {
                    bail!(
                        "embedding.model must be specified when provider is '{}'",
                        self.embedding.provider
                    );
                }
            }
            other => bail!(
                "Unknown embedding provider: '{}'. Must be hash, local, openai, ollama, or disabled.",
                other
            ),
        }

        if self.loader.extensions.is_empty() {
            bail!("loader.extensions must list at least one extension");
        }

        if self.answer.product.trim().is_empty() {
            bail!("answer.product must not be empty");
        }

        Ok(())
    }
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg.chunking.max_chars, 500);
        assert_eq!(cfg.chunking.overlap_chars, 0);
        assert_eq!(cfg.retrieval.top_k, 5);
        assert_eq!(cfg.embedding.provider, "local");
        assert_eq!(cfg.loader.extensions, vec!["txt"]);
        assert_eq!(cfg.answer.product, "Product Y");
        assert_eq!(cfg.answer.delivery_padding_days, 5);
    }

    #[test]
    fn test_partial_sections() {
        let cfg = parse_config(
            r#"
[chunking]
max_chars = 200

[embedding]
provider = "hash"
dims = 64
"#,
        )
        .unwrap();
        assert_eq!(cfg.chunking.max_chars, 200);
        assert_eq!(cfg.embedding.provider, "hash");
        assert_eq!(cfg.embedding.dims, Some(64));
        assert_eq!(cfg.embedding.batch_size, 64);
    }

    #[test]
    fn test_rejects_zero_chunk_size() {
        let err = parse_config("[chunking]\nmax_chars = 0\n").unwrap_err();
        assert!(err.to_string().contains("max_chars"));
    }

    #[test]
    fn test_rejects_overlap_not_below_size() {
        assert!(parse_config("[chunking]\nmax_chars = 10\noverlap_chars = 10\n").is_err());
    }

    #[test]
    fn test_rejects_unknown_provider() {
        let err = parse_config("[embedding]\nprovider = \"magic\"\n").unwrap_err();
        assert!(err.to_string().contains("Unknown embedding provider"));
    }

    #[test]
    fn test_remote_provider_needs_model_and_dims() {
        assert!(parse_config("[embedding]\nprovider = \"openai\"\n").is_err());
        assert!(parse_config(
            "[embedding]\nprovider = \"ollama\"\nmodel = \"nomic-embed-text\"\ndims = 768\n"
        )
        .is_ok());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}

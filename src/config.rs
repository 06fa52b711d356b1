use std::env;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the deskbot server.
///
/// All credentials are resolved exactly once at startup; the rest of the
/// codebase receives this struct by reference and never consults the
/// environment again.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the SQLite file backing the status ledger.
    pub database_path: String,
    /// Directory used to spool uploaded PDFs while they are processed.
    pub upload_dir: String,
    /// Base URL of the vector index service.
    pub index_url: String,
    /// Optional API key for the vector index service.
    pub index_api_key: Option<String>,
    /// Base URL of the embedding service.
    pub embedding_url: String,
    /// Embedding model identifier passed to the service.
    pub embedding_model: String,
    /// Dimensionality of the produced vectors.
    pub embedding_dimension: usize,
    /// Base URL of the language-model service.
    pub llm_url: String,
    /// API key sent as a bearer token to the language-model service.
    pub llm_api_key: String,
    /// Chat model identifier requested from the language-model service.
    pub llm_model: String,
    /// Character window used when chunking extracted text.
    pub chunk_window: usize,
    /// Number of nearest neighbors retrieved to ground a chat response.
    pub retrieval_top_k: usize,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

const DEFAULT_DATABASE_PATH: &str = "deskbot.db";
const DEFAULT_UPLOAD_DIR: &str = "user_uploads";
const DEFAULT_LLM_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_LLM_MODEL: &str = "qwen/qwen-2.5-72b-instruct";
const DEFAULT_EMBEDDING_DIMENSION: usize = 384;
const DEFAULT_CHUNK_WINDOW: usize = 500;
const DEFAULT_RETRIEVAL_TOP_K: usize = 3;

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Ok(Self {
            database_path: load_env_optional("DESKBOT_DATABASE_PATH")
                .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string()),
            upload_dir: load_env_optional("DESKBOT_UPLOAD_DIR")
                .unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string()),
            index_url: load_env("VECTOR_INDEX_URL")?,
            index_api_key: load_env_optional("VECTOR_INDEX_API_KEY"),
            embedding_url: load_env("EMBEDDING_URL")?,
            embedding_model: load_env("EMBEDDING_MODEL")?,
            embedding_dimension: parse_optional(
                "EMBEDDING_DIMENSION",
                DEFAULT_EMBEDDING_DIMENSION,
            )?,
            llm_url: load_env_optional("LLM_URL").unwrap_or_else(|| DEFAULT_LLM_URL.to_string()),
            llm_api_key: load_env("OPENROUTER_API_KEY")?,
            llm_model: load_env_optional("LLM_MODEL")
                .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            chunk_window: parse_optional("CHUNK_WINDOW", DEFAULT_CHUNK_WINDOW)?,
            retrieval_top_k: parse_optional("RETRIEVAL_TOP_K", DEFAULT_RETRIEVAL_TOP_K)?,
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_optional(key: &str, default: usize) -> Result<usize, ConfigError> {
    match load_env_optional(key) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

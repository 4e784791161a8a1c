//! Runtime configuration loaded from an env file.

use services::EnvFile;

use crate::error::ConfigError;

pub const DEFAULT_LLM_SERVICE_URL: &str = "http://localhost:8080";
pub const DEFAULT_EMBEDDER_SERVICE_URL: &str = "http://localhost:8081";
pub const DEFAULT_VECTOR_DB_URL: &str = "http://localhost:6333";
pub const DEFAULT_COLLECTION_NAME: &str = "test_collection";
pub const DEFAULT_MAX_TOKENS: u32 = 512;
pub const DEFAULT_EMBEDDING_CONCURRENCY: usize = 1;

/// Number of hits retrieved per question. Not configurable.
pub const TOP_K: u64 = 5;

/// Config bag for the pipeline. Every field has a default.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextorConfig {
    /// Base URL of the completion backend.
    pub llm_service_url: String,
    /// Base URL of the embedding backend.
    pub embedder_service_url: String,
    /// Base URL of the Qdrant REST API.
    pub vector_db_url: String,
    pub collection: String,
    pub top_k: u64,
    /// `n_predict` sent with every completion; also drives the word budget.
    pub max_tokens: u32,
    /// In-flight embedding requests during ingestion; `1` is sequential.
    pub embedding_concurrency: usize,
}

impl Default for ContextorConfig {
    fn default() -> Self {
        Self {
            llm_service_url: DEFAULT_LLM_SERVICE_URL.to_string(),
            embedder_service_url: DEFAULT_EMBEDDER_SERVICE_URL.to_string(),
            vector_db_url: DEFAULT_VECTOR_DB_URL.to_string(),
            collection: DEFAULT_COLLECTION_NAME.to_string(),
            top_k: TOP_K,
            max_tokens: DEFAULT_MAX_TOKENS,
            embedding_concurrency: DEFAULT_EMBEDDING_CONCURRENCY,
        }
    }
}

impl ContextorConfig {
    /// Build from env-file values, falling back to defaults for absent keys.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when a present value is malformed: a URL
    /// without `http://`/`https://`, an empty collection name, or a number
    /// that does not parse or is zero.
    ///
    /// # Example
    /// ```
    /// use contextor::ContextorConfig;
    /// use services::EnvFile;
    ///
    /// let env = EnvFile::from_reader("COLLECTION_NAME=docs\n".as_bytes()).unwrap();
    /// let cfg = ContextorConfig::from_env_file(&env).unwrap();
    /// assert_eq!(cfg.collection, "docs");
    /// assert_eq!(cfg.top_k, 5);
    /// ```
    pub fn from_env_file(env: &EnvFile) -> Result<Self, ConfigError> {
        let llm_service_url = env.get("LLM_SERVICE_URL", DEFAULT_LLM_SERVICE_URL);
        validate_http_endpoint("LLM_SERVICE_URL", &llm_service_url)?;

        let embedder_service_url = env.get("EMBEDDER_SERVICE_URL", DEFAULT_EMBEDDER_SERVICE_URL);
        validate_http_endpoint("EMBEDDER_SERVICE_URL", &embedder_service_url)?;

        let vector_db_url = env.get("VECTOR_DB_URL", DEFAULT_VECTOR_DB_URL);
        validate_http_endpoint("VECTOR_DB_URL", &vector_db_url)?;

        let collection = env.get("COLLECTION_NAME", DEFAULT_COLLECTION_NAME);
        validate_collection_name(&collection)?;

        let max_tokens = parse_positive(env, "LLM_MAX_TOKENS", DEFAULT_MAX_TOKENS)?;
        let embedding_concurrency =
            parse_positive(env, "EMBEDDING_CONCURRENCY", DEFAULT_EMBEDDING_CONCURRENCY)?;

        Ok(Self {
            llm_service_url,
            embedder_service_url,
            vector_db_url,
            collection,
            top_k: TOP_K,
            max_tokens,
            embedding_concurrency,
        })
    }
}

fn validate_http_endpoint(var: &'static str, url: &str) -> Result<(), ConfigError> {
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
        .ok_or(ConfigError::InvalidFormat {
            var,
            reason: "must start with http:// or https://",
        })?;
    if rest.trim_matches('/').is_empty() {
        return Err(ConfigError::InvalidFormat {
            var,
            reason: "missing host",
        });
    }
    Ok(())
}

/// Collection names end up as a URL path segment and are not escaped.
fn validate_collection_name(name: &str) -> Result<(), ConfigError> {
    const VAR: &str = "COLLECTION_NAME";
    if name.is_empty() {
        return Err(ConfigError::InvalidFormat {
            var: VAR,
            reason: "must not be empty",
        });
    }
    if name == "." || name == ".." {
        return Err(ConfigError::InvalidFormat {
            var: VAR,
            reason: "must not be a relative path segment",
        });
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(ConfigError::InvalidFormat {
            var: VAR,
            reason: "only ASCII letters, digits, '_', '-' and '.' are allowed",
        });
    }
    Ok(())
}

fn parse_positive<T>(env: &EnvFile, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let Some(raw) = env.get_opt(var) else {
        return Ok(default);
    };
    let value: T = raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        var,
        reason: "expected a non-negative integer",
    })?;
    if value <= T::default() {
        return Err(ConfigError::OutOfRange {
            var,
            detail: "must be at least 1",
        });
    }
    Ok(value)
}

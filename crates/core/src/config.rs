use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_parse<T: std::str::FromStr>(profile: &str, key: &str, default: T) -> T {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

/// Application configuration. `Default` gives the built-in values without reading the environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub upload: UploadConfig,
    pub segment: SegmentConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `STUDYBOT_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("STUDYBOT_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            server: ServerConfig::from_env_profiled(p),
            llm: LlmConfig::from_env_profiled(p),
            upload: UploadConfig::from_env_profiled(p),
            segment: SegmentConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  server:   {}:{}", self.server.host, self.server.port);
        tracing::info!(
            "  llm:      default={}, mistral={}, claude={}",
            self.llm.default_provider,
            self.llm.mistral_url,
            if self.llm.anthropic_api_key.is_some() { "configured" } else { "(no key)" }
        );
        tracing::info!(
            "  upload:   max={} bytes, extensions={}",
            self.upload.max_upload_size,
            self.upload.allowed_extensions.join(",")
        );
        tracing::info!(
            "  segment:  chunk={}/{}, summary chunk={}/{}",
            self.segment.chunk_size,
            self.segment.overlap,
            self.segment.summary_chunk_size,
            self.segment.summary_overlap
        );
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl ServerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "HOST", "0.0.0.0"),
            port: profiled_env_parse(p, "PORT", 8000),
            cors_origin: profiled_env_or(p, "CORS_ORIGIN", "http://localhost:3000"),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origin: "http://localhost:3000".to_string(),
        }
    }
}

// ── LLM (Mistral via Ollama / Anthropic Claude) ───────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "mistral" or "claude"; validated by the gateway, not here.
    pub default_provider: String,
    pub mistral_url: String,
    pub mistral_model: String,
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub timeout_secs: u64,
}

impl LlmConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            default_provider: profiled_env_or(p, "LLM_MODEL", "mistral").to_lowercase(),
            mistral_url: profiled_env_or(p, "MISTRAL_API_URL", "http://localhost:11434/api"),
            mistral_model: profiled_env_or(p, "MISTRAL_MODEL", "mistral:7b"),
            anthropic_api_key: profiled_env_opt(p, "ANTHROPIC_API_KEY"),
            anthropic_model: profiled_env_or(p, "ANTHROPIC_MODEL", "claude-3-haiku-20240307"),
            temperature: profiled_env_parse(p, "LLM_TEMPERATURE", 0.7),
            max_tokens: profiled_env_parse(p, "LLM_MAX_TOKENS", 2048),
            top_p: profiled_env_parse(p, "LLM_TOP_P", 0.9),
            timeout_secs: profiled_env_parse(p, "LLM_TIMEOUT_SECS", 60),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            default_provider: "mistral".to_string(),
            mistral_url: "http://localhost:11434/api".to_string(),
            mistral_model: "mistral:7b".to_string(),
            anthropic_api_key: None,
            anthropic_model: "claude-3-haiku-20240307".to_string(),
            temperature: 0.7,
            max_tokens: 2048,
            top_p: 0.9,
            timeout_secs: 60,
        }
    }
}

// ── Uploads ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub max_upload_size: usize,
    pub allowed_extensions: Vec<String>,
}

impl UploadConfig {
    fn from_env_profiled(p: &str) -> Self {
        let allowed_extensions = profiled_env_or(p, "ALLOWED_EXTENSIONS", "pdf,docx,txt,md")
            .split(',')
            .map(|s| s.trim().trim_start_matches('.').to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        Self {
            max_upload_size: profiled_env_parse(p, "MAX_UPLOAD_SIZE", 10 * 1024 * 1024),
            allowed_extensions,
        }
    }

    /// Whether `filename`'s extension (case-insensitive) is accepted for upload.
    pub fn allows(&self, filename: &str) -> bool {
        let Some((_, ext)) = filename.rsplit_once('.') else {
            return false;
        };
        let ext = ext.to_lowercase();
        self.allowed_extensions.iter().any(|a| *a == ext)
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_upload_size: 10 * 1024 * 1024,
            allowed_extensions: ["pdf", "docx", "txt", "md"].iter().map(|s| s.to_string()).collect(),
        }
    }
}

// ── Segmentation ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentConfig {
    /// General-purpose chunk size in characters.
    pub chunk_size: usize,
    pub overlap: usize,
    /// Chunk size above which summaries take the map/reduce path.
    pub summary_chunk_size: usize,
    pub summary_overlap: usize,
}

impl SegmentConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            chunk_size: profiled_env_parse(p, "CHUNK_SIZE", 1000),
            overlap: profiled_env_parse(p, "CHUNK_OVERLAP", 200),
            summary_chunk_size: profiled_env_parse(p, "SUMMARY_CHUNK_SIZE", 8000),
            summary_overlap: profiled_env_parse(p, "SUMMARY_CHUNK_OVERLAP", 1000),
        }
    }
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 200,
            summary_chunk_size: 8000,
            summary_overlap: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_allows_known_extensions_case_insensitively() {
        let upload = UploadConfig::default();
        assert!(upload.allows("notes.PDF"));
        assert!(upload.allows("chapter.1.docx"));
        assert!(!upload.allows("slides.pptx"));
        assert!(!upload.allows("README"));
    }

    #[test]
    fn llm_defaults_match_local_mistral() {
        let llm = LlmConfig::default();
        assert_eq!(llm.default_provider, "mistral");
        assert_eq!(llm.max_tokens, 2048);
        assert!(llm.anthropic_api_key.is_none());
    }
}

use std::path::PathBuf;
use std::time::Duration;

use wheelway_core::types::DbId;
use wheelway_vision::VisionConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `3600`).
    ///
    /// Analysis runs synchronously inside the triggering request, so this
    /// must cover a full multi-image analyzer pass, not just CRUD latency.
    pub request_timeout_secs: u64,
    /// Directory scan images are stored under (default: `./data/uploads`).
    pub upload_dir: PathBuf,
    /// Per-file upload size cap in megabytes (default: `10`).
    pub max_upload_size_mb: u64,
    /// Maximum number of images a scan may hold (default: `20`).
    pub max_images_per_scan: usize,
    /// Vision analyzer connection settings.
    pub vision: VisionConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                     |
    /// |------------------------|-----------------------------|
    /// | `HOST`                 | `0.0.0.0`                   |
    /// | `PORT`                 | `8000`                      |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`     |
    /// | `REQUEST_TIMEOUT_SECS` | `3600`                      |
    /// | `UPLOAD_DIR`           | `./data/uploads`            |
    /// | `MAX_UPLOAD_SIZE_MB`   | `10`                        |
    /// | `MAX_IMAGES_PER_SCAN`  | `20`                        |
    /// | `VISION_API_URL`       | `https://api.openai.com/v1` |
    /// | `VISION_API_KEY`       | (empty)                     |
    /// | `VISION_MODEL`         | `gpt-4o`                    |
    /// | `VISION_MAX_TOKENS`    | `4096`                      |
    /// | `VISION_TIMEOUT_SECS`  | `120`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "3600".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let upload_dir = PathBuf::from(
            std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "./data/uploads".into()),
        );

        let max_upload_size_mb: u64 = std::env::var("MAX_UPLOAD_SIZE_MB")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("MAX_UPLOAD_SIZE_MB must be a valid u64");

        let max_images_per_scan: usize = std::env::var("MAX_IMAGES_PER_SCAN")
            .unwrap_or_else(|_| "20".into())
            .parse()
            .expect("MAX_IMAGES_PER_SCAN must be a valid usize");

        let defaults = VisionConfig::default();
        let vision = VisionConfig {
            api_url: std::env::var("VISION_API_URL").unwrap_or(defaults.api_url),
            api_key: std::env::var("VISION_API_KEY").unwrap_or_default(),
            model: std::env::var("VISION_MODEL").unwrap_or(defaults.model),
            max_tokens: std::env::var("VISION_MAX_TOKENS")
                .unwrap_or_else(|_| defaults.max_tokens.to_string())
                .parse()
                .expect("VISION_MAX_TOKENS must be a valid u32"),
            timeout: Duration::from_secs(
                std::env::var("VISION_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "120".into())
                    .parse()
                    .expect("VISION_TIMEOUT_SECS must be a valid u64"),
            ),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            upload_dir,
            max_upload_size_mb,
            max_images_per_scan,
            vision,
        }
    }

    /// Per-file upload size cap in bytes.
    pub fn max_upload_size_bytes(&self) -> u64 {
        self.max_upload_size_mb * 1024 * 1024
    }

    /// Directory a given scan's image files are stored in.
    pub fn scan_upload_dir(&self, scan_id: DbId) -> PathBuf {
        self.upload_dir.join(scan_id.to_string())
    }
}

// src/config/api.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_API_CONFIG_PATH: &str = "BLOG_API_CONFIG_PATH";
pub const ENV_API_BASE_URL: &str = "BLOG_API_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "https://blog.tourismofkashmir.com";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_max_pages() -> u32 {
    10
}
fn default_debounce_ms() -> u64 {
    500
}

macro_rules! endpoint_defaults {
    ($($fn_name:ident => $path:literal),* $(,)?) => {
        $(fn $fn_name() -> String { $path.to_string() })*
    };
}

endpoint_defaults! {
    default_posts => "apis.php",
    default_site_info => "site_info_api.php",
    default_search => "apisearch",
    default_categories => "apis",
    default_likes => "api_likes",
    default_bookmark => "api_bookmark.php",
    default_comments => "api_comments.php",
    default_comment_count => "api_comment_count.php",
    default_related => "related_api.php",
    default_notifications => "apinotification.php",
    default_login => "apilogin.php",
    default_register => "api/register",
}

/// Where the remote blog API lives and how this front-end talks to it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_posts")]
    pub posts_endpoint: String,
    #[serde(default = "default_site_info")]
    pub site_info_endpoint: String,
    #[serde(default = "default_search")]
    pub search_endpoint: String,
    #[serde(default = "default_categories")]
    pub categories_endpoint: String,
    #[serde(default = "default_likes")]
    pub likes_endpoint: String,
    #[serde(default = "default_bookmark")]
    pub bookmark_endpoint: String,
    #[serde(default = "default_comments")]
    pub comments_endpoint: String,
    #[serde(default = "default_comment_count")]
    pub comment_count_endpoint: String,
    #[serde(default = "default_related")]
    pub related_endpoint: String,
    #[serde(default = "default_notifications")]
    pub notifications_endpoint: String,
    #[serde(default = "default_login")]
    pub login_endpoint: String,
    #[serde(default = "default_register")]
    pub register_endpoint: String,
    /// No timeout unless set; a hung feed request then blocks that feed.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Upper bound for `?pages=` on the feed routes.
    #[serde(default = "default_max_pages")]
    pub max_pages_per_request: u32,
    #[serde(default = "default_debounce_ms")]
    pub search_debounce_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            posts_endpoint: default_posts(),
            site_info_endpoint: default_site_info(),
            search_endpoint: default_search(),
            categories_endpoint: default_categories(),
            likes_endpoint: default_likes(),
            bookmark_endpoint: default_bookmark(),
            comments_endpoint: default_comments(),
            comment_count_endpoint: default_comment_count(),
            related_endpoint: default_related(),
            notifications_endpoint: default_notifications(),
            login_endpoint: default_login(),
            register_endpoint: default_register(),
            request_timeout_secs: None,
            max_pages_per_request: default_max_pages(),
            search_debounce_ms: default_debounce_ms(),
        }
    }
}

impl ApiConfig {
    /// Absolute URL of an endpoint under `base_url`.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Shared HTTP client honoring `request_timeout_secs`.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = self.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder.build().context("building http client")
    }

    /// Load from an explicit path. Supports TOML or JSON.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading api config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let mut cfg = parse_config(&content, &ext)?;
        cfg.sanitize();
        Ok(cfg)
    }

    /// Load using env var + fallbacks, then apply env overrides:
    /// 1) $BLOG_API_CONFIG_PATH
    /// 2) config/blog_api.toml
    /// 3) config/blog_api.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        let mut cfg = Self::load_file_default()?;
        if let Ok(base) = std::env::var(ENV_API_BASE_URL) {
            if !base.trim().is_empty() {
                cfg.base_url = base.trim().to_string();
            }
        }
        Ok(cfg)
    }

    fn load_file_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_API_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("{ENV_API_CONFIG_PATH} points to non-existent path"));
        }
        for candidate in ["config/blog_api.toml", "config/blog_api.json"] {
            let pb = PathBuf::from(candidate);
            if pb.exists() {
                return Self::load_from(&pb);
            }
        }
        Ok(Self::default())
    }

    fn sanitize(&mut self) {
        if self.max_pages_per_request == 0 {
            self.max_pages_per_request = default_max_pages();
        }
        if self.base_url.trim().is_empty() {
            self.base_url = default_base_url();
        }
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<ApiConfig> {
    match hint_ext {
        "json" => serde_json::from_str(s).context("parsing api config json"),
        "toml" => toml::from_str(s).context("parsing api config toml"),
        _ => serde_json::from_str(s)
            .or_else(|_| toml::from_str(s))
            .map_err(|_| anyhow!("unsupported api config format")),
    }
}

use crate::error::{Result, StudioError};
use crate::gemini::image_client::DEFAULT_IMAGEN_SAFETY;
use crate::models::{ImageSize, ModelId};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GALLERY_KEY: &str = "pika-gallery";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub text_model: String,
    pub timeout_secs: Option<u64>,
    /// `safetySetting` sent with Imagen predict calls.
    pub imagen_safety: String,
}

#[derive(Debug, Clone)]
pub struct GalleryConfig {
    pub dir: PathBuf,
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct StudioConfig {
    pub clear_prompt_on_success: bool,
    pub countdown_tick_ms: u64,
    pub default_size: ImageSize,
    pub default_model: ModelId,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub gemini: GeminiConfig,
    pub gallery: GalleryConfig,
    pub studio: StudioConfig,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            timeout_secs: Some(120),
            imagen_safety: DEFAULT_IMAGEN_SAFETY.to_string(),
        }
    }
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let api_key = env::var("API_KEY")
            .or_else(|_| env::var("GEMINI_API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty());
        let base_url = env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let text_model =
            env::var("GEMINI_TEXT_MODEL").unwrap_or_else(|_| DEFAULT_TEXT_MODEL.to_string());
        let timeout_secs = env::var("GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .or(Some(120));
        let imagen_safety =
            env::var("GEMINI_IMAGEN_SAFETY").unwrap_or_else(|_| DEFAULT_IMAGEN_SAFETY.to_string());

        GeminiConfig {
            api_key,
            base_url,
            text_model,
            timeout_secs,
            imagen_safety,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    pub fn with_imagen_safety(mut self, setting: impl Into<String>) -> Self {
        self.imagen_safety = setting.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// The credential, or a fatal configuration error when it is missing.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| StudioError::ConfigError("API_KEY environment variable not set".into()))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for GalleryConfig {
    fn default() -> Self {
        let dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".pikagen");

        GalleryConfig {
            dir,
            key: DEFAULT_GALLERY_KEY.to_string(),
        }
    }
}

impl GalleryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let dir = env::var("PIKAGEN_HOME")
            .map(PathBuf::from)
            .unwrap_or(defaults.dir);
        let key = env::var("PIKAGEN_GALLERY_KEY").unwrap_or(defaults.key);

        GalleryConfig { dir, key }
    }

    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }
}

impl Default for StudioConfig {
    fn default() -> Self {
        StudioConfig {
            clear_prompt_on_success: true,
            countdown_tick_ms: 1000,
            default_size: ImageSize::default(),
            default_model: ModelId::default(),
        }
    }
}

impl StudioConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let clear_prompt_on_success = env::var("PIKAGEN_CLEAR_PROMPT")
            .ok()
            .map_or(defaults.clear_prompt_on_success, |val| val != "false");
        let countdown_tick_ms = env::var("PIKAGEN_COUNTDOWN_TICK_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.countdown_tick_ms);

        StudioConfig {
            clear_prompt_on_success,
            countdown_tick_ms,
            ..defaults
        }
    }

    pub fn with_clear_prompt_on_success(mut self, enabled: bool) -> Self {
        self.clear_prompt_on_success = enabled;
        self
    }

    pub fn with_countdown_tick(mut self, tick: Duration) -> Self {
        self.countdown_tick_ms = tick.as_millis() as u64;
        self
    }

    pub fn with_defaults(mut self, size: ImageSize, model: ModelId) -> Self {
        self.default_size = size;
        self.default_model = model;
        self
    }

    pub fn countdown_tick(&self) -> Duration {
        Duration::from_millis(self.countdown_tick_ms.max(1))
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        Config {
            gemini: GeminiConfig::from_env(),
            gallery: GalleryConfig::from_env(),
            studio: StudioConfig::from_env(),
        }
    }

    pub fn with_gemini(mut self, config: GeminiConfig) -> Self {
        self.gemini = config;
        self
    }

    pub fn with_gallery(mut self, config: GalleryConfig) -> Self {
        self.gallery = config;
        self
    }

    pub fn with_studio(mut self, config: StudioConfig) -> Self {
        self.studio = config;
        self
    }
}

pub mod config;
pub mod error;
pub mod gemini;
pub mod logger;
pub mod models;
pub mod storage;
pub mod studio;

pub use config::{Config, GalleryConfig, GeminiConfig, StudioConfig};
pub use error::{Result, StudioError};
pub use gemini::{Backend, GeminiClient, ImageBackend, ImageGenerator, TextClient, Transport};
pub use models::*;
pub use storage::{FileStore, GalleryStore, KeyValueStore, MemoryStore};
pub use studio::{Studio, StudioState, SubmitOutcome};

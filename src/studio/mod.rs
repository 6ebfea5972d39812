pub mod countdown;
pub mod suggestions;

use crate::{
    config::{Config, StudioConfig},
    error::{Result, StudioError},
    gemini::{GeminiClient, ImageGenerator},
    models::{GalleryRecord, GenerationRequest, ImageData, ImageSize, ModelId},
    storage::GalleryStore,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{watch, Mutex as AsyncMutex, MutexGuard as AsyncMutexGuard};

pub use countdown::{CountdownDisplay, CountdownHandle};

/// Everything a front end renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudioState {
    pub prompt: String,
    pub size: ImageSize,
    pub model: ModelId,
    /// Source image staged for the next edit.
    pub uploaded: Option<ImageData>,
    /// Image currently on screen: a result, or the staged upload.
    pub displayed: Option<ImageData>,
    pub error: Option<String>,
    pub loading: bool,
    pub refining: bool,
    pub refine_error: Option<String>,
    pub refined_suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Preconditions not met or a request is already in flight; nothing was sent.
    Ignored,
    Generated(GalleryRecord),
    Failed(String),
}

/// Single-flight generation session over one adapter and one gallery.
pub struct Studio {
    generator: Arc<dyn ImageGenerator>,
    gallery: AsyncMutex<GalleryStore>,
    state: Mutex<StudioState>,
    in_flight: AtomicBool,
    refining: AtomicBool,
    countdown: CountdownDisplay,
    config: StudioConfig,
}

/// Releases an atomic busy flag when the owning call ends, however it ends.
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
    studio: &'a Studio,
    loading: bool,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
        let mut state = self.studio.lock_state();
        if self.loading {
            state.loading = false;
        } else {
            state.refining = false;
        }
    }
}

impl Studio {
    pub fn new(generator: Arc<dyn ImageGenerator>, gallery: GalleryStore, config: StudioConfig) -> Self {
        let state = StudioState {
            size: config.default_size,
            model: config.default_model,
            ..Default::default()
        };

        Self {
            generator,
            gallery: AsyncMutex::new(gallery),
            state: Mutex::new(state),
            in_flight: AtomicBool::new(false),
            refining: AtomicBool::new(false),
            countdown: Arc::new(watch::channel(None).0),
            config,
        }
    }

    /// Wires the Gemini adapter and the on-disk gallery; fails without an API key.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let generator = Arc::new(GeminiClient::new(config.gemini.clone())?);
        let gallery = GalleryStore::from_config(&config.gallery).await;
        Ok(Self::new(generator, gallery, config.studio.clone()))
    }

    fn lock_state(&self) -> MutexGuard<'_, StudioState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn lock_gallery(&self) -> AsyncMutexGuard<'_, GalleryStore> {
        self.gallery.lock().await
    }

    pub fn state(&self) -> StudioState {
        self.lock_state().clone()
    }

    pub fn countdown(&self) -> Option<u32> {
        *self.countdown.borrow()
    }

    pub fn subscribe_countdown(&self) -> watch::Receiver<Option<u32>> {
        self.countdown.subscribe()
    }

    pub fn set_prompt(&self, prompt: impl Into<String>) {
        self.lock_state().prompt = prompt.into();
    }

    pub fn select_suggestion(&self, suggestion: &str) {
        self.set_prompt(suggestion);
    }

    pub fn set_size(&self, size: ImageSize) {
        self.lock_state().size = size;
    }

    /// Switching to a model without edit support drops any staged upload.
    pub fn select_model(&self, model: ModelId) {
        let mut state = self.lock_state();
        state.model = model;
        if !model.supports_edit() && state.uploaded.is_some() {
            log::info!("{} cannot edit images, clearing staged upload", model.display_name());
            state.uploaded = None;
            state.displayed = None;
        }
    }

    /// Stages a source image. Returns `false` when the selected model cannot edit.
    pub fn upload_image(&self, mime_type: &str, bytes: &[u8]) -> Result<bool> {
        let mut state = self.lock_state();
        let image = match ImageData::upload(mime_type, bytes) {
            Ok(image) => image,
            Err(e) => {
                state.error = Some(e.to_string());
                return Err(e);
            }
        };

        state.error = None;
        if !state.model.supports_edit() {
            log::warn!(
                "{} cannot edit images, upload ignored",
                state.model.display_name()
            );
            return Ok(false);
        }

        state.displayed = Some(image.clone());
        state.uploaded = Some(image);
        Ok(true)
    }

    pub fn clear_upload(&self) {
        let mut state = self.lock_state();
        state.uploaded = None;
        state.displayed = None;
    }

    pub fn clear_image(&self) {
        let mut state = self.lock_state();
        state.displayed = None;
        state.error = None;
    }

    /// Runs one generation if the prompt or an upload is present and nothing is in flight.
    pub async fn generate(&self) -> SubmitOutcome {
        let request = {
            let mut state = self.lock_state();
            if state.prompt.trim().is_empty() && state.uploaded.is_none() {
                log::debug!("Nothing to generate, submission ignored");
                return SubmitOutcome::Ignored;
            }
            if self.in_flight.swap(true, Ordering::SeqCst) {
                log::debug!("Generation already in flight, submission dropped");
                return SubmitOutcome::Ignored;
            }

            state.loading = true;
            state.error = None;
            state.displayed = None;

            GenerationRequest {
                prompt: state.prompt.clone(),
                size: state.size,
                image: state.uploaded.clone(),
                model: state.model,
            }
        };

        let _busy = BusyGuard {
            flag: &self.in_flight,
            studio: self,
            loading: true,
        };
        let countdown = CountdownHandle::start(
            request.model.descriptor().estimated_secs,
            self.config.countdown_tick(),
            self.countdown.clone(),
        );

        let outcome = match self.generator.generate(&request).await {
            Ok(image) => self.finish_success(&request, image).await,
            Err(e) => self.finish_failure(&request, e),
        };

        countdown.cancel();
        outcome
    }

    async fn finish_success(&self, request: &GenerationRequest, image: ImageData) -> SubmitOutcome {
        let record = GalleryRecord::new(image.clone(), &request.prompt, request.model, request.size);
        log::info!("✅ Generated image {} with {}", record.id, request.model.display_name());

        let saved = self.lock_gallery().await.prepend(record.clone()).await;

        let mut state = self.lock_state();
        if let Err(e) = saved {
            log::error!("Failed to save gallery: {}", e);
            state.error = Some(format!("Image generated but the gallery could not be saved. {}", e));
        }
        state.displayed = Some(image);
        state.uploaded = None;
        if self.config.clear_prompt_on_success {
            state.prompt.clear();
        }
        SubmitOutcome::Generated(record)
    }

    fn finish_failure(&self, request: &GenerationRequest, error: StudioError) -> SubmitOutcome {
        let message = format!("Failed to generate image. {}", error);
        log::error!("{}", message);

        let mut state = self.lock_state();
        state.error = Some(message.clone());
        if let Some(image) = &request.image {
            state.displayed = Some(image.clone());
        }
        SubmitOutcome::Failed(message)
    }

    /// Asks for alternative prompts. `None` when the prompt is blank or the studio is busy.
    pub async fn refine_prompt(&self) -> Result<Option<Vec<String>>> {
        let prompt = {
            let mut state = self.lock_state();
            if state.prompt.trim().is_empty() || state.loading {
                return Ok(None);
            }
            if self.refining.swap(true, Ordering::SeqCst) {
                return Ok(None);
            }
            state.refining = true;
            state.refine_error = None;
            state.refined_suggestions.clear();
            state.prompt.clone()
        };

        let _busy = BusyGuard {
            flag: &self.refining,
            studio: self,
            loading: false,
        };

        match self.generator.refine_prompt(&prompt).await {
            Ok(suggestions) => {
                self.lock_state().refined_suggestions = suggestions.clone();
                Ok(Some(suggestions))
            }
            Err(e) => {
                self.lock_state().refine_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Replaces the prompt with its English translation.
    pub async fn translate_prompt(&self) -> Result<String> {
        let prompt = self.lock_state().prompt.clone();
        let translated = self.generator.translate(&prompt).await?;
        self.lock_state().prompt = translated.clone();
        Ok(translated)
    }

    pub async fn gallery(&self) -> Vec<GalleryRecord> {
        self.lock_gallery().await.records().to_vec()
    }

    pub async fn delete_from_gallery(&self, id: &str) -> Result<bool> {
        self.lock_gallery().await.delete(id).await
    }

    pub async fn clear_gallery(&self) -> Result<()> {
        self.lock_gallery().await.clear().await
    }

    pub async fn export_from_gallery(&self, id: &str, dir: &std::path::Path) -> Result<std::path::PathBuf> {
        self.lock_gallery().await.export(id, dir).await
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StudioError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Cannot generate image without a prompt or an uploaded image")]
    EmptyRequest,

    #[error("{0} does not support image editing. Please clear the uploaded image.")]
    UnsupportedOperation(String),

    #[error("Unsupported model selected: {0}")]
    UnsupportedModel(String),

    #[error("Unsupported image size: {0}")]
    UnsupportedSize(String),

    #[error("No image data found in {0} response")]
    NoImageInResponse(String),

    #[error("Received invalid data structure from prompt refinement API")]
    InvalidRefinementResponse,

    #[error("Please select a valid image file (got {0})")]
    InvalidUpload(String),

    #[error("Request error: {0}")]
    RequestError(String),

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Response error: {0}")]
    ResponseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Stored data is corrupt: {0}")]
    CorruptData(String),

    #[error("Gallery record not found: {0}")]
    NotFound(String),

    #[error("API Error ({model}): {source}")]
    Generation {
        model: String,
        #[source]
        source: Box<StudioError>,
    },

    #[error("API Error (Refine): {0}")]
    Refinement(#[source] Box<StudioError>),

    #[error("API Error (Translate): {0}")]
    Translation(#[source] Box<StudioError>),
}

impl StudioError {
    pub fn generation(model: impl Into<String>, source: StudioError) -> Self {
        StudioError::Generation {
            model: model.into(),
            source: Box::new(source),
        }
    }

    /// The underlying failure with any per-call wrapper removed.
    pub fn root(&self) -> &StudioError {
        match self {
            StudioError::Generation { source, .. }
            | StudioError::Refinement(source)
            | StudioError::Translation(source) => source.root(),
            other => other,
        }
    }
}

impl From<serde_json::Error> for StudioError {
    fn from(e: serde_json::Error) -> Self {
        StudioError::SerializationError(e.to_string())
    }
}

impl From<std::io::Error> for StudioError {
    fn from(e: std::io::Error) -> Self {
        StudioError::StorageError(e.to_string())
    }
}

impl From<reqwest::Error> for StudioError {
    fn from(e: reqwest::Error) -> Self {
        StudioError::RequestError(e.to_string())
    }
}

impl From<base64::DecodeError> for StudioError {
    fn from(e: base64::DecodeError) -> Self {
        StudioError::ResponseError(format!("invalid base64 image payload: {}", e))
    }
}

pub type Result<T> = std::result::Result<T, StudioError>;

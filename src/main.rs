mod cli;

use clap::Parser;
use cli::{Cli, Commands, GalleryCommand};
use pikagen::logger::{self, LogLevel, LoggerConfig};
use pikagen::models::mime_from_extension;
use pikagen::studio::suggestions;
use pikagen::{
    Config, GalleryStore, GeminiClient, ImageGenerator, ImageSize, ModelId, Result, Studio,
    StudioError, SubmitOutcome,
};
use std::fs;
use std::path::{Path, PathBuf};

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();
    let cli = Cli::parse();

    let mut log_config = LoggerConfig::from_env();
    if cli.verbose {
        log_config = log_config.with_level(LogLevel::Debug);
    }
    logger::init_with_config(log_config)?;

    if dotenv_loaded {
        log::debug!("✅ .env file loaded");
    }
    logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let mut config = Config::from_env();
    if let Some(home) = cli.home {
        config.gallery.dir = home;
    }
    if cli.verbose {
        logger::log_config_info(&config);
    }

    match cli.command {
        Commands::Models => {
            for id in ModelId::ALL {
                let descriptor = id.descriptor();
                println!(
                    "{:<26} {:<14} edit: {}",
                    id,
                    descriptor.name,
                    if descriptor.supports_edit { "yes" } else { "no" }
                );
            }
        }
        Commands::Suggest { count } => {
            for prompt in suggestions::shuffle(count) {
                println!("{}", prompt);
            }
        }
        Commands::Gallery(command) => run_gallery(command, &config).await?,
        Commands::Refine { prompt } => {
            let client = connect(&config);
            for suggestion in client.refine_prompt(&prompt).await? {
                println!("{}", suggestion);
            }
        }
        Commands::Translate { text } => {
            let client = connect(&config);
            println!("{}", client.translate(&text).await?);
        }
        Commands::Generate {
            prompt,
            image,
            size,
            model,
            out,
            translate,
        } => {
            let studio = match Studio::from_config(&config).await {
                Ok(studio) => studio,
                Err(e) => fatal(e),
            };
            let request = GenerateArgs {
                prompt: prompt.unwrap_or_default(),
                image,
                size: size.parse()?,
                model: model.parse()?,
                out,
                translate,
            };
            run_generate(&studio, request).await?;
        }
    }

    Ok(())
}

/// A missing credential halts startup.
fn fatal(error: StudioError) -> ! {
    log::error!("❌ {}", error);
    std::process::exit(1);
}

fn connect(config: &Config) -> GeminiClient {
    GeminiClient::new(config.gemini.clone()).unwrap_or_else(|e| fatal(e))
}

struct GenerateArgs {
    prompt: String,
    image: Option<PathBuf>,
    size: ImageSize,
    model: ModelId,
    out: Option<PathBuf>,
    translate: bool,
}

async fn run_generate(studio: &Studio, args: GenerateArgs) -> Result<()> {
    studio.select_model(args.model);
    studio.set_size(args.size);
    studio.set_prompt(args.prompt);

    if let Some(path) = &args.image {
        let (mime_type, bytes) = read_image(path)?;
        if !studio.upload_image(mime_type, &bytes)? {
            return Err(upload_rejected(args.model));
        }
    }

    if args.translate {
        let translated = studio.translate_prompt().await?;
        log::info!("🌐 Translated prompt: {}", translated);
    }

    let mut countdown = studio.subscribe_countdown();
    let ticker = tokio::spawn(async move {
        while countdown.changed().await.is_ok() {
            let remaining = *countdown.borrow_and_update();
            if let Some(secs) = remaining {
                eprint!("\r⏳ about {:>2}s remaining ", secs);
            }
        }
    });

    let outcome = studio.generate().await;
    ticker.abort();
    eprintln!();

    match outcome {
        SubmitOutcome::Generated(record) => {
            let path = args
                .out
                .unwrap_or_else(|| PathBuf::from(record.download_name()));
            fs::write(&path, record.image.decode()?)?;
            println!("{}", path.display());
            log::info!("🖼️  Saved {} (gallery id {})", path.display(), record.id);
            Ok(())
        }
        SubmitOutcome::Failed(message) => {
            log::error!("❌ {}", message);
            std::process::exit(1);
        }
        SubmitOutcome::Ignored => Err(StudioError::EmptyRequest),
    }
}

/// Same shape as an adapter-side rejection.
fn upload_rejected(model: ModelId) -> StudioError {
    let name = model.display_name();
    StudioError::generation(name, StudioError::UnsupportedOperation(name.to_string()))
}

fn read_image(path: &Path) -> Result<(&'static str, Vec<u8>)> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    let mime_type = mime_from_extension(extension)
        .ok_or_else(|| StudioError::InvalidUpload(path.display().to_string()))?;
    Ok((mime_type, fs::read(path)?))
}

async fn run_gallery(command: GalleryCommand, config: &Config) -> Result<()> {
    let mut gallery = GalleryStore::from_config(&config.gallery).await;

    match command {
        GalleryCommand::List => {
            if gallery.is_empty() {
                println!("Gallery is empty");
            }
            for record in gallery.records() {
                println!(
                    "{}  {}  {:<14} {:<15} {}",
                    record.id,
                    record.created_at.format("%Y-%m-%d %H:%M"),
                    record.model.display_name(),
                    record.size,
                    record.prompt
                );
            }
        }
        GalleryCommand::Show { id } => {
            let record = gallery
                .get(&id)
                .ok_or_else(|| StudioError::NotFound(id.clone()))?;
            println!("id:      {}", record.id);
            println!("created: {}", record.created_at.to_rfc3339());
            println!("model:   {}", record.model);
            println!("size:    {}", record.size);
            println!("type:    {}", record.image.mime_type);
            println!("prompt:  {}", record.prompt);
        }
        GalleryCommand::Delete { id } => {
            if gallery.delete(&id).await? {
                println!("Deleted {}", id);
            } else {
                log::warn!("No gallery record with id {}", id);
            }
        }
        GalleryCommand::Clear => {
            let count = gallery.len();
            gallery.clear().await?;
            println!("Removed {} records", count);
        }
        GalleryCommand::Export { id, dir } => {
            let path = gallery.export(&id, &dir).await?;
            println!("{}", path.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_rejection_matches_adapter_error() {
        let err = upload_rejected(ModelId::Imagen4);
        assert!(err.to_string().starts_with("API Error (Imagen 4):"));
        assert!(matches!(err.root(), StudioError::UnsupportedOperation(name) if name == "Imagen 4"));
    }

    #[test]
    fn test_read_image_picks_mime_from_extension() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("cat.png");
        fs::write(&path, b"png").unwrap();
        let (mime_type, bytes) = read_image(&path).unwrap();
        assert_eq!(mime_type, "image/png");
        assert_eq!(bytes, b"png");

        let err = read_image(&temp.path().join("notes.txt")).unwrap_err();
        assert!(matches!(err, StudioError::InvalidUpload(_)));
    }
}

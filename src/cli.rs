use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pikagen")]
#[command(author, version, about = "Generate and edit images with Gemini and Imagen")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding the local gallery
    #[arg(long, global = true, env = "PIKAGEN_HOME")]
    pub home: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate an image from a prompt, or edit a source image
    Generate {
        /// What to draw (optional when editing an image)
        prompt: Option<String>,

        /// Source image to edit
        #[arg(short, long)]
        image: Option<PathBuf>,

        /// 256x256, 512x512, 1024x1024 or "YouTube (16:9)"
        #[arg(short, long, default_value = "1024x1024")]
        size: String,

        /// gemini-2.5-flash-image or imagen-4.0-generate-001
        #[arg(short, long, default_value = "gemini-2.5-flash-image")]
        model: String,

        /// Where to write the image (defaults to the gallery download name)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Translate the prompt to English first
        #[arg(long)]
        translate: bool,
    },

    /// Suggest three richer versions of a prompt
    Refine {
        prompt: String,
    },

    /// Translate a prompt to English
    Translate {
        text: String,
    },

    /// Print sample prompts
    Suggest {
        #[arg(short, long, default_value_t = 4)]
        count: usize,
    },

    /// List the supported models
    Models,

    /// Inspect and manage the local gallery
    #[command(subcommand)]
    Gallery(GalleryCommand),
}

#[derive(Subcommand)]
pub enum GalleryCommand {
    /// List saved images, newest first
    #[command(alias = "ls")]
    List,

    /// Show one record
    Show { id: String },

    /// Remove one record
    #[command(alias = "rm")]
    Delete { id: String },

    /// Remove every record
    Clear,

    /// Write a saved image to disk
    Export {
        id: String,

        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
}

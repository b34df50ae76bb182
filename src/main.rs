mod adapters;
mod app;
mod core;
mod global_constants;
mod presentation;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::app::{AppCommand, AppOptions, VisionApp};
use crate::core::models::VisionError;

#[derive(Debug, Parser)]
#[command(version, about = "Analyze images with a cloud vision service and draw the results")]
struct Cli {
    /// API key for the vision service.
    #[arg(long, env = "VISION_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Base URL of the vision service.
    #[arg(long, env = "VISION_ENDPOINT")]
    endpoint: Option<String>,

    /// Settings file to use instead of the per-user one.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// DPI the overlay is rendered at.
    #[arg(long)]
    target_dpi: Option<f64>,

    /// Where the overlay PNG is written.
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Open the overlay in the default image viewer.
    #[arg(long)]
    open: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Describe the image and outline detected faces.
    Analyze { image: PathBuf },
    /// Recognize printed text and outline each line.
    ExtractText { image: PathBuf },
}

impl From<Command> for AppCommand {
    fn from(command: Command) -> Self {
        match command {
            Command::Analyze { image } => AppCommand::Analyze { image },
            Command::ExtractText { image } => AppCommand::ExtractText { image },
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    log::info!("[MAIN] Starting {}", global_constants::APPLICATION_NAME);

    let options = AppOptions {
        api_key: cli.api_key,
        endpoint: cli.endpoint,
        settings_path: cli.settings,
        target_dpi: cli.target_dpi,
        output_path: cli.output,
        open_overlay: cli.open,
    };

    let result = match VisionApp::build(options) {
        Ok(app) => app.run(cli.command.into()).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report_failure(&e),
    }
}

fn report_failure(error: &anyhow::Error) -> ExitCode {
    match error.downcast_ref::<VisionError>() {
        Some(VisionError::Cancelled) => {
            println!("{}", global_constants::USER_MESSAGE_CANCELLED);
        }
        Some(vision_error) if vision_error.is_precondition_failure() => {
            log::warn!("[MAIN] {}", vision_error);
            eprintln!("{}", vision_error.user_message());
        }
        Some(vision_error) => {
            log::error!("[MAIN] {}", vision_error);
            eprintln!("{}", vision_error.user_message());
        }
        None => {
            log::error!("[MAIN] {:#}", error);
            eprintln!("Error: {:#}", error);
        }
    }

    ExitCode::FAILURE
}

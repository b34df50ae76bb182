use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::adapters::{
    FileDisplaySurface, FileImageSource, RestRoutes, RestVisionConnector, TokioSleeper,
};
use crate::core::interfaces::ports::DisplaySurface;
use crate::core::models::{ImageHandle, UserSettings};
use crate::core::orchestrators::{
    AnalysisOutcome, SessionConfig, TextExtractionOutcome, VisionSession,
};
use crate::global_constants;
use crate::presentation::ConsoleReportView;

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Analyze { image: PathBuf },
    ExtractText { image: PathBuf },
}

/// Values supplied on the command line or through the environment. Anything
/// left as `None` falls back to the settings file.
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub settings_path: Option<PathBuf>,
    pub target_dpi: Option<f64>,
    pub output_path: Option<PathBuf>,
    pub open_overlay: bool,
}

pub struct VisionApp {
    session: VisionSession,
    display: FileDisplaySurface,
    api_key: String,
    endpoint: String,
    target_dpi: f64,
}

impl VisionApp {
    pub fn build(options: AppOptions) -> anyhow::Result<Self> {
        log::info!("[APP] Initializing {}", global_constants::APPLICATION_NAME);

        let settings = UserSettings::load(options.settings_path.as_deref())?;

        let endpoint = options
            .endpoint
            .or_else(|| settings.endpoint.clone())
            .unwrap_or_default();
        let target_dpi = options.target_dpi.unwrap_or(settings.target_dpi);
        let output_path = options
            .output_path
            .unwrap_or_else(|| PathBuf::from(global_constants::DEFAULT_OVERLAY_FILE_NAME));

        let session = VisionSession::build(
            Arc::new(RestVisionConnector::new(RestRoutes::from_settings(&settings))),
            Arc::new(FileImageSource::new()),
            Arc::new(TokioSleeper),
            SessionConfig::from_settings(&settings),
        );

        Ok(Self {
            session,
            display: FileDisplaySurface::new(output_path, options.open_overlay),
            api_key: options.api_key.unwrap_or_default(),
            endpoint,
            target_dpi,
        })
    }

    pub async fn run(&self, command: AppCommand) -> anyhow::Result<()> {
        let cancel = CancellationToken::new();
        let ctrl_c_listener = tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

        let result = self.run_command(command, &cancel).await;

        ctrl_c_listener.abort();
        result
    }

    async fn run_command(
        &self,
        command: AppCommand,
        cancel: &CancellationToken,
    ) -> anyhow::Result<()> {
        self.session.connect(&self.api_key, &self.endpoint)?;
        log::debug!(
            "[APP] Session {} using {:?}",
            self.session.session_id(),
            self.session.endpoint()
        );

        match command {
            AppCommand::Analyze { image } => {
                self.session.select_image(&image).await?;
                let outcome = self.session.analyze_image(self.target_dpi, cancel).await?;
                self.show_analysis(outcome)?;
            }
            AppCommand::ExtractText { image } => {
                self.session.select_image(&image).await?;
                let outcome = self.session.extract_text(self.target_dpi, cancel).await?;
                self.show_text_extraction(outcome)?;
            }
        }

        if let Some(result) = self.session.last_result() {
            log::debug!(
                "[APP] Session {} kept result with {} faces",
                self.session.session_id(),
                result.face_regions().count()
            );
        }
        Ok(())
    }

    fn show_analysis(&self, outcome: AnalysisOutcome) -> anyhow::Result<()> {
        log::debug!("[APP] Outlining {} faces", outcome.face_rects.len());

        let view = ConsoleReportView::build_with_sections(outcome.report);
        println!("{}", view.render_text());
        self.present_overlay(&outcome.overlay)
    }

    fn show_text_extraction(&self, outcome: TextExtractionOutcome) -> anyhow::Result<()> {
        if !outcome.completed {
            log::warn!("[APP] Text recognition ended in {:?}", outcome.final_state);
            println!("{}", global_constants::USER_MESSAGE_TEXT_INCOMPLETE);
        }

        let view = ConsoleReportView::build_with_sections(vec![outcome.report])
            .with_text_lines(outcome.lines);
        println!("{}", view.render_text());
        self.present_overlay(&outcome.overlay)
    }

    fn present_overlay(&self, overlay: &ImageHandle) -> anyhow::Result<()> {
        self.display.present(overlay)?;
        println!(
            "{} {}",
            global_constants::USER_MESSAGE_OVERLAY_SAVED,
            self.display.output_path().display()
        );
        Ok(())
    }
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            log::info!("[APP] Ctrl+C received, cancelling");
            cancel.cancel();
        }
        Err(e) => {
            log::error!("[APP] Failed to listen for Ctrl+C: {}", e);
        }
    }
}

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::core::interfaces::adapters::{RemoteVisionClient, RemoteVisionConnector};
use crate::core::interfaces::ports::{ImageSource, Sleeper};
use crate::core::models::{
    to_display_rect, AnalysisResult, DisplayRect, FormattedTextLine, ImageHandle,
    OperationStatus, ReportSection, ScaleFactor, ServiceCredentials, TextRecognitionMode,
    UserSettings, VisionError, VisualFeature,
};
use crate::core::services::{
    format_analysis, format_text_lines, format_text_operation, render_overlay,
    LongPollController, OverlayStyle, PollPolicy, PollState,
};

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub poll_policy: PollPolicy,
    pub overlay_style: OverlayStyle,
    pub visual_features: Vec<VisualFeature>,
    pub text_recognition_mode: TextRecognitionMode,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_policy: PollPolicy::default(),
            overlay_style: OverlayStyle::default(),
            visual_features: VisualFeature::default_set(),
            text_recognition_mode: TextRecognitionMode::default(),
        }
    }
}

impl SessionConfig {
    pub fn from_settings(settings: &UserSettings) -> Self {
        Self {
            poll_policy: PollPolicy {
                max_attempts: settings.max_poll_attempts,
                interval: settings.poll_interval(),
                operation_id_length: settings.operation_id_length,
            },
            overlay_style: OverlayStyle {
                color: settings.overlay_color,
                stroke_width: settings.overlay_stroke_width,
            },
            visual_features: settings.visual_features.clone(),
            text_recognition_mode: settings.text_recognition_mode,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub report: Vec<ReportSection>,
    pub face_rects: Vec<DisplayRect>,
    pub overlay: ImageHandle,
}

#[derive(Debug, Clone)]
pub struct TextExtractionOutcome {
    pub report: ReportSection,
    pub lines: Vec<FormattedTextLine>,
    pub overlay: ImageHandle,
    pub completed: bool,
    pub final_state: PollState,
}

#[derive(Default)]
struct SessionState {
    credentials: Option<ServiceCredentials>,
    client: Option<Arc<dyn RemoteVisionClient>>,
    current_image: Option<ImageHandle>,
    last_result: Option<AnalysisResult>,
}

struct OperationGuard<'a> {
    in_flight: &'a AtomicBool,
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}

/// Holds everything one user session works with: the connected client, the
/// current image and the last result. Failed actions leave all of it as it
/// was so the user can retry.
pub struct VisionSession {
    session_id: Uuid,
    connector: Arc<dyn RemoteVisionConnector>,
    image_source: Arc<dyn ImageSource>,
    sleeper: Arc<dyn Sleeper>,
    config: SessionConfig,
    state: Mutex<SessionState>,
    operation_in_flight: AtomicBool,
}

impl VisionSession {
    pub fn build(
        connector: Arc<dyn RemoteVisionConnector>,
        image_source: Arc<dyn ImageSource>,
        sleeper: Arc<dyn Sleeper>,
        config: SessionConfig,
    ) -> Self {
        let session_id = Uuid::new_v4();
        log::info!("[SESSION] Created session {}", session_id);

        Self {
            session_id,
            connector,
            image_source,
            sleeper,
            config,
            state: Mutex::new(SessionState::default()),
            operation_in_flight: AtomicBool::new(false),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    #[cfg(test)]
    pub fn is_connected(&self) -> bool {
        self.lock_state().client.is_some()
    }

    pub fn endpoint(&self) -> Option<String> {
        self.lock_state()
            .credentials
            .as_ref()
            .map(|credentials| credentials.endpoint.clone())
    }

    #[cfg(test)]
    pub fn current_image(&self) -> Option<ImageHandle> {
        self.lock_state().current_image.clone()
    }

    pub fn last_result(&self) -> Option<AnalysisResult> {
        self.lock_state().last_result.clone()
    }

    #[cfg(test)]
    pub fn is_operation_in_flight(&self) -> bool {
        self.operation_in_flight.load(Ordering::Acquire)
    }

    pub fn connect(&self, api_key: &str, endpoint: &str) -> Result<(), VisionError> {
        let credentials = ServiceCredentials::validated(api_key, endpoint)?;

        let client = self.connector.connect(&credentials).map_err(|error| {
            log::error!("[SESSION] {} failed to connect: {:#}", self.session_id, error);
            VisionError::SubmissionError(format!("{:#}", error))
        })?;

        log::info!(
            "[SESSION] {} connected to {}",
            self.session_id,
            credentials.endpoint
        );

        let mut state = self.lock_state();
        state.credentials = Some(credentials);
        state.client = Some(client);
        Ok(())
    }

    pub async fn select_image(&self, path: &Path) -> Result<ImageHandle, VisionError> {
        if path.as_os_str().is_empty() {
            return Err(VisionError::NoImageSelected);
        }

        log::info!("[SESSION] {} loading image {:?}", self.session_id, path);

        let image = self.image_source.load_image(path).await.map_err(|error| {
            log::error!("[SESSION] failed to load {:?}: {:#}", path, error);
            VisionError::ImageUnreadable(path.display().to_string())
        })?;

        log::info!(
            "[SESSION] {} image ready: {}x{} at {} dpi",
            self.session_id,
            image.width,
            image.height,
            image.dpi
        );

        let mut state = self.lock_state();
        state.current_image = Some(image.clone());
        Ok(image)
    }

    pub async fn analyze_image(
        &self,
        target_dpi: f64,
        cancel: &CancellationToken,
    ) -> Result<AnalysisOutcome, VisionError> {
        let _guard = self.begin_operation()?;
        let (client, image) = self.require_client_and_image().await?;
        let scale = ScaleFactor::from_dpi(target_dpi, image.dpi)?;

        if cancel.is_cancelled() {
            return Err(VisionError::Cancelled);
        }

        log::info!(
            "[SESSION] {} analyzing image with {:?}",
            self.session_id,
            self.config.visual_features
        );

        let result = client
            .analyze(image.encoded_bytes(), &self.config.visual_features)
            .await
            .map_err(|error| {
                log::error!("[SESSION] analysis request failed: {:#}", error);
                VisionError::SubmissionError(format!("{:#}", error))
            })?;

        let report = format_analysis(&result);
        let face_rects = result
            .face_regions()
            .map(|region| to_display_rect(region, scale))
            .collect::<Result<Vec<_>, _>>()?;
        let overlay = render_overlay(&image, &face_rects, scale, &self.config.overlay_style)?;

        log::info!(
            "[SESSION] {} analysis complete: {} sections, {} faces",
            self.session_id,
            report.len(),
            face_rects.len()
        );

        self.lock_state().last_result = Some(result);

        Ok(AnalysisOutcome {
            report,
            face_rects,
            overlay,
        })
    }

    pub async fn extract_text(
        &self,
        target_dpi: f64,
        cancel: &CancellationToken,
    ) -> Result<TextExtractionOutcome, VisionError> {
        let _guard = self.begin_operation()?;
        let (client, image) = self.require_client_and_image().await?;
        let scale = ScaleFactor::from_dpi(target_dpi, image.dpi)?;

        if cancel.is_cancelled() {
            return Err(VisionError::Cancelled);
        }

        log::info!("[SESSION] {} extracting text", self.session_id);

        let mut controller =
            LongPollController::new(client, Arc::clone(&self.sleeper), self.config.poll_policy);
        let snapshot = controller
            .run(
                image.encoded_bytes(),
                self.config.text_recognition_mode,
                cancel,
            )
            .await?;

        let completed = snapshot.status == OperationStatus::Succeeded;
        let report = format_text_operation(&snapshot, controller.attempts());
        let lines = match snapshot
            .result
            .as_ref()
            .and_then(|result| result.text_lines.as_ref())
        {
            Some(text_lines) => format_text_lines(text_lines, scale)?,
            None => Vec::new(),
        };

        let rects: Vec<DisplayRect> = lines.iter().map(|line| line.bounds).collect();
        let overlay = render_overlay(&image, &rects, scale, &self.config.overlay_style)?;

        log::info!(
            "[SESSION] {} text extraction finished: completed={}, {} lines",
            self.session_id,
            completed,
            lines.len()
        );

        if let Some(result) = snapshot.result {
            self.lock_state().last_result = Some(result);
        }

        Ok(TextExtractionOutcome {
            report,
            lines,
            overlay,
            completed,
            final_state: controller.state().clone(),
        })
    }

    fn begin_operation(&self) -> Result<OperationGuard<'_>, VisionError> {
        self.operation_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| {
                log::warn!(
                    "[SESSION] {} rejected request: operation already in flight",
                    self.session_id
                );
                VisionError::OperationInProgress
            })?;

        Ok(OperationGuard {
            in_flight: &self.operation_in_flight,
        })
    }

    async fn require_client_and_image(
        &self,
    ) -> Result<(Arc<dyn RemoteVisionClient>, ImageHandle), VisionError> {
        let (client, image) = {
            let state = self.lock_state();
            (state.client.clone(), state.current_image.clone())
        };

        let client = client.ok_or(VisionError::MissingCredential)?;
        let image = image.ok_or(VisionError::NoImageSelected)?;

        if let Some(path) = image.source_path() {
            let still_readable = tokio::fs::try_exists(path).await.unwrap_or(false);
            if !still_readable {
                log::warn!("[SESSION] image {:?} is no longer readable", path);
                return Err(VisionError::ImageUnreadable(path.display().to_string()));
            }
        }

        Ok((client, image))
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::core::interfaces::adapters::RemoteVisionClient;
use crate::core::interfaces::ports::Sleeper;
use crate::core::models::{
    OperationHandle, OperationSnapshot, OperationStatus, TextRecognitionMode, VisionError,
};
use crate::global_constants;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
    pub operation_id_length: usize,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: global_constants::DEFAULT_MAX_POLL_ATTEMPTS,
            interval: Duration::from_millis(global_constants::DEFAULT_POLL_INTERVAL_MS),
            operation_id_length: global_constants::OPERATION_ID_LENGTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollState {
    Idle,
    Submitted(OperationHandle),
    Polling {
        handle: OperationHandle,
        attempts: u32,
    },
    Completed,
    Failed,
    TimedOut,
    Cancelled,
}

/// Drives one two-phase remote operation: submit, then query its status
/// until it finishes or the attempt budget runs out.
///
/// An exhausted budget is not an error. The last non-terminal snapshot is
/// handed back and the state becomes [`PollState::TimedOut`].
pub struct LongPollController {
    client: Arc<dyn RemoteVisionClient>,
    sleeper: Arc<dyn Sleeper>,
    policy: PollPolicy,
    state: PollState,
    attempts: u32,
}

impl LongPollController {
    pub fn new(
        client: Arc<dyn RemoteVisionClient>,
        sleeper: Arc<dyn Sleeper>,
        policy: PollPolicy,
    ) -> Self {
        Self {
            client,
            sleeper,
            policy,
            state: PollState::Idle,
            attempts: 0,
        }
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub async fn submit(
        &mut self,
        image_bytes: &[u8],
        mode: TextRecognitionMode,
    ) -> Result<OperationHandle, VisionError> {
        if self.state != PollState::Idle {
            return Err(VisionError::InvalidOperationState(format!(
                "submit called in state {:?}",
                self.state
            )));
        }

        log::info!(
            "[LONG_POLL] submitting text recognition ({} bytes, mode={})",
            image_bytes.len(),
            mode
        );

        let submission = match self.client.submit_text_recognition(image_bytes, mode).await {
            Ok(submission) => submission,
            Err(error) => {
                log::error!("[LONG_POLL] submission rejected: {:#}", error);
                self.state = PollState::Failed;
                return Err(VisionError::SubmissionError(format!("{:#}", error)));
            }
        };

        let location = submission.operation_location.unwrap_or_default();
        let handle = match OperationHandle::extract_from_location(
            &location,
            self.policy.operation_id_length,
        ) {
            Ok(handle) => handle,
            Err(error) => {
                self.state = PollState::Failed;
                return Err(error);
            }
        };

        log::info!("[LONG_POLL] operation submitted, handle={}", handle);
        self.state = PollState::Submitted(handle.clone());
        Ok(handle)
    }

    pub async fn poll_until_terminal(
        &mut self,
        handle: &OperationHandle,
        cancel: &CancellationToken,
    ) -> Result<OperationSnapshot, VisionError> {
        match &self.state {
            PollState::Submitted(submitted) if submitted == handle => {}
            other => {
                return Err(VisionError::InvalidOperationState(format!(
                    "poll for {} called in state {:?}",
                    handle, other
                )));
            }
        }

        let max_attempts = self.policy.max_attempts.max(1);

        loop {
            if cancel.is_cancelled() {
                log::warn!(
                    "[LONG_POLL] cancelled before status query {} for {}",
                    self.attempts + 1,
                    handle
                );
                self.state = PollState::Cancelled;
                return Err(VisionError::Cancelled);
            }

            let snapshot = match self.client.get_operation_status(handle).await {
                Ok(snapshot) => snapshot,
                Err(error) => {
                    log::error!("[LONG_POLL] status query failed for {}: {:#}", handle, error);
                    self.state = PollState::Failed;
                    return Err(VisionError::StatusQueryFailed(format!("{:#}", error)));
                }
            };

            self.attempts += 1;
            self.state = PollState::Polling {
                handle: handle.clone(),
                attempts: self.attempts,
            };

            log::debug!(
                "[LONG_POLL] attempt {}/{} for {}: {}",
                self.attempts,
                max_attempts,
                handle,
                snapshot.status
            );

            match snapshot.status {
                OperationStatus::Succeeded => {
                    log::info!(
                        "[LONG_POLL] operation {} succeeded after {} queries",
                        handle,
                        self.attempts
                    );
                    self.state = PollState::Completed;
                    return Ok(snapshot);
                }
                OperationStatus::Failed => {
                    log::error!(
                        "[LONG_POLL] operation {} failed: {:?}",
                        handle,
                        snapshot.failure_reason
                    );
                    self.state = PollState::Failed;
                    return Err(VisionError::RemoteOperationFailed(snapshot.failure_reason));
                }
                OperationStatus::NotStarted | OperationStatus::Running => {
                    if self.attempts >= max_attempts {
                        log::warn!(
                            "[LONG_POLL] operation {} still {} after {} queries, giving up",
                            handle,
                            snapshot.status,
                            self.attempts
                        );
                        self.state = PollState::TimedOut;
                        return Ok(snapshot);
                    }
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    log::warn!("[LONG_POLL] cancelled while waiting on {}", handle);
                    self.state = PollState::Cancelled;
                    return Err(VisionError::Cancelled);
                }
                _ = self.sleeper.sleep(self.policy.interval) => {}
            }
        }
    }

    /// Submits and polls in one call.
    pub async fn run(
        &mut self,
        image_bytes: &[u8],
        mode: TextRecognitionMode,
        cancel: &CancellationToken,
    ) -> Result<OperationSnapshot, VisionError> {
        let handle = self.submit(image_bytes, mode).await?;
        self.poll_until_terminal(&handle, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{AnalysisResult, DetectionRegion, TextLine, TextSubmission, VisualFeature};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    const LOCATION: &str =
        "https://vision.example.com/text/operations/abcdef0123456789abcdef0123456789abcd";

    struct MockRemoteVisionClient {
        location: Option<String>,
        statuses: Mutex<VecDeque<OperationSnapshot>>,
        fallback: OperationSnapshot,
        queried_handles: Arc<Mutex<Vec<String>>>,
        cancel_after_queries: Option<(usize, CancellationToken)>,
    }

    impl MockRemoteVisionClient {
        fn with_statuses(statuses: Vec<OperationSnapshot>) -> Self {
            Self {
                location: Some(LOCATION.to_string()),
                statuses: Mutex::new(statuses.into()),
                fallback: OperationSnapshot::with_status(OperationStatus::Running),
                queried_handles: Arc::new(Mutex::new(Vec::new())),
                cancel_after_queries: None,
            }
        }

        fn get_query_count(&self) -> usize {
            self.queried_handles.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl RemoteVisionClient for MockRemoteVisionClient {
        async fn analyze(
            &self,
            _image_bytes: &[u8],
            _features: &[VisualFeature],
        ) -> anyhow::Result<AnalysisResult> {
            anyhow::bail!("analyze is not used by the poll loop")
        }

        async fn submit_text_recognition(
            &self,
            _image_bytes: &[u8],
            _mode: TextRecognitionMode,
        ) -> anyhow::Result<TextSubmission> {
            Ok(TextSubmission {
                operation_location: self.location.clone(),
            })
        }

        async fn get_operation_status(
            &self,
            handle: &OperationHandle,
        ) -> anyhow::Result<OperationSnapshot> {
            let query_count = {
                let mut queried = self.queried_handles.lock().unwrap();
                queried.push(handle.as_str().to_string());
                queried.len()
            };
            if let Some((after, token)) = &self.cancel_after_queries {
                if query_count >= *after {
                    token.cancel();
                }
            }
            Ok(self
                .statuses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| self.fallback.clone()))
        }
    }

    struct RecordingSleeper {
        waits: Arc<Mutex<Vec<Duration>>>,
    }

    impl RecordingSleeper {
        fn new() -> Self {
            Self {
                waits: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.waits.lock().unwrap().push(duration);
        }
    }

    fn recognized_text() -> AnalysisResult {
        AnalysisResult {
            text_lines: Some(vec![TextLine {
                text: "HELLO".to_string(),
                bounding_box: DetectionRegion::Polygon {
                    points: vec![0.0, 0.0, 10.0, 0.0, 10.0, 5.0, 0.0, 5.0],
                },
            }]),
            ..Default::default()
        }
    }

    fn build_controller(
        client: Arc<MockRemoteVisionClient>,
        sleeper: Arc<RecordingSleeper>,
        max_attempts: u32,
    ) -> LongPollController {
        LongPollController::new(
            client,
            sleeper,
            PollPolicy {
                max_attempts,
                ..PollPolicy::default()
            },
        )
    }

    #[test]
    fn test_poll_policy_defaults() {
        let policy = PollPolicy::default();

        assert_eq!(policy.max_attempts, 10);
        assert_eq!(policy.interval, Duration::from_secs(1));
        assert_eq!(policy.operation_id_length, 36);
    }

    #[tokio::test]
    async fn test_submit_extracts_trailing_handle() {
        let client = Arc::new(MockRemoteVisionClient::with_statuses(vec![]));
        let mut controller = build_controller(client, Arc::new(RecordingSleeper::new()), 10);

        let handle = controller
            .submit(&[1, 2, 3], TextRecognitionMode::Printed)
            .await
            .unwrap();

        assert_eq!(handle.as_str(), "abcdef0123456789abcdef0123456789abcd");
        assert_eq!(controller.state(), &PollState::Submitted(handle));
    }

    #[tokio::test]
    async fn test_submit_without_location_is_submission_error() {
        let mut mock = MockRemoteVisionClient::with_statuses(vec![]);
        mock.location = None;
        let mut controller =
            build_controller(Arc::new(mock), Arc::new(RecordingSleeper::new()), 10);

        let result = controller.submit(&[1], TextRecognitionMode::Printed).await;

        assert!(matches!(result, Err(VisionError::SubmissionError(_))));
        assert_eq!(controller.state(), &PollState::Failed);
    }

    #[tokio::test]
    async fn test_controller_accepts_a_single_submission() {
        let client = Arc::new(MockRemoteVisionClient::with_statuses(vec![]));
        let mut controller = build_controller(client, Arc::new(RecordingSleeper::new()), 10);

        controller
            .submit(&[1], TextRecognitionMode::Printed)
            .await
            .unwrap();
        let second = controller.submit(&[1], TextRecognitionMode::Printed).await;

        assert!(matches!(second, Err(VisionError::InvalidOperationState(_))));
    }

    #[tokio::test]
    async fn test_running_running_succeeded_issues_three_queries() {
        let client = Arc::new(MockRemoteVisionClient::with_statuses(vec![
            OperationSnapshot::with_status(OperationStatus::Running),
            OperationSnapshot::with_status(OperationStatus::Running),
            OperationSnapshot::succeeded(recognized_text()),
        ]));
        let sleeper = Arc::new(RecordingSleeper::new());
        let mut controller = build_controller(Arc::clone(&client), Arc::clone(&sleeper), 10);

        let snapshot = controller
            .run(&[1, 2], TextRecognitionMode::Printed, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(client.get_query_count(), 3);
        assert_eq!(snapshot.status, OperationStatus::Succeeded);
        assert_eq!(snapshot.result, Some(recognized_text()));
        assert_eq!(controller.state(), &PollState::Completed);
        assert_eq!(sleeper.waits.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_always_running_stops_after_budget_without_error() {
        let client = Arc::new(MockRemoteVisionClient::with_statuses(vec![]));
        let sleeper = Arc::new(RecordingSleeper::new());
        let mut controller = build_controller(Arc::clone(&client), Arc::clone(&sleeper), 4);

        let snapshot = controller
            .run(&[1], TextRecognitionMode::Printed, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(client.get_query_count(), 4);
        assert_eq!(snapshot.status, OperationStatus::Running);
        assert_eq!(controller.state(), &PollState::TimedOut);
        assert_eq!(controller.attempts(), 4);
        assert_eq!(
            *sleeper.waits.lock().unwrap(),
            vec![Duration::from_secs(1); 3]
        );
    }

    #[tokio::test]
    async fn test_not_started_counts_as_non_terminal() {
        let client = Arc::new(MockRemoteVisionClient::with_statuses(vec![
            OperationSnapshot::with_status(OperationStatus::NotStarted),
            OperationSnapshot::succeeded(recognized_text()),
        ]));
        let mut controller =
            build_controller(Arc::clone(&client), Arc::new(RecordingSleeper::new()), 10);

        let snapshot = controller
            .run(&[1], TextRecognitionMode::Printed, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(client.get_query_count(), 2);
        assert_eq!(snapshot.status, OperationStatus::Succeeded);
    }

    #[tokio::test]
    async fn test_failed_status_carries_remote_reason() {
        let client = Arc::new(MockRemoteVisionClient::with_statuses(vec![
            OperationSnapshot::with_status(OperationStatus::Running),
            OperationSnapshot::failed(Some("image too small".to_string())),
        ]));
        let mut controller =
            build_controller(Arc::clone(&client), Arc::new(RecordingSleeper::new()), 10);

        let result = controller
            .run(&[1], TextRecognitionMode::Printed, &CancellationToken::new())
            .await;

        assert_eq!(
            result,
            Err(VisionError::RemoteOperationFailed(Some(
                "image too small".to_string()
            )))
        );
        assert_eq!(client.get_query_count(), 2);
        assert_eq!(controller.state(), &PollState::Failed);
    }

    #[tokio::test]
    async fn test_terminal_status_on_first_query_skips_waiting() {
        let client = Arc::new(MockRemoteVisionClient::with_statuses(vec![
            OperationSnapshot::succeeded(AnalysisResult::default()),
        ]));
        let sleeper = Arc::new(RecordingSleeper::new());
        let mut controller = build_controller(Arc::clone(&client), Arc::clone(&sleeper), 10);

        controller
            .run(&[1], TextRecognitionMode::Printed, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(client.get_query_count(), 1);
        assert!(sleeper.waits.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_before_first_query_issues_no_queries() {
        let client = Arc::new(MockRemoteVisionClient::with_statuses(vec![]));
        let mut controller =
            build_controller(Arc::clone(&client), Arc::new(RecordingSleeper::new()), 10);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = controller
            .run(&[1], TextRecognitionMode::Printed, &cancel)
            .await;

        assert_eq!(result, Err(VisionError::Cancelled));
        assert_eq!(client.get_query_count(), 0);
        assert_eq!(controller.state(), &PollState::Cancelled);
    }

    #[tokio::test]
    async fn test_cancel_during_loop_stops_before_next_query() {
        let cancel = CancellationToken::new();
        let mut mock = MockRemoteVisionClient::with_statuses(vec![]);
        mock.cancel_after_queries = Some((2, cancel.clone()));
        let client = Arc::new(mock);
        let mut controller =
            build_controller(Arc::clone(&client), Arc::new(RecordingSleeper::new()), 10);

        let result = controller
            .run(&[1], TextRecognitionMode::Printed, &cancel)
            .await;

        assert_eq!(result, Err(VisionError::Cancelled));
        assert_eq!(client.get_query_count(), 2);
    }

    #[tokio::test]
    async fn test_poll_requires_matching_submission() {
        let client = Arc::new(MockRemoteVisionClient::with_statuses(vec![]));
        let mut controller = build_controller(client, Arc::new(RecordingSleeper::new()), 10);
        let handle = OperationHandle::extract_from_location(LOCATION, 36).unwrap();

        let result = controller
            .poll_until_terminal(&handle, &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(VisionError::InvalidOperationState(_))));
        assert_eq!(controller.state(), &PollState::Idle);
    }
}

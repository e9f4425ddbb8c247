use crate::domain::notification::{PushMessage, SendOutcome};
use crate::domain::ports::PushGateway;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex;
use tracing::info;

/// Push gateway that only logs. Used when no real messaging backend is
/// configured; every message is reported delivered.
#[derive(Default, Clone)]
pub struct LogPushGateway;

#[async_trait]
impl PushGateway for LogPushGateway {
    async fn send_batch(&self, batch: &[PushMessage]) -> Result<Vec<SendOutcome>> {
        info!(messages = batch.len(), "push batch (log-only gateway)");
        Ok(vec![SendOutcome::Delivered; batch.len()])
    }
}

/// Test double that records every batch it is handed and lets tests script
/// invalid tokens and whole-chunk failures.
#[derive(Default, Clone)]
pub struct RecordingPushGateway {
    inner: Arc<Mutex<RecordingState>>,
}

#[derive(Default)]
struct RecordingState {
    batches: Vec<Vec<PushMessage>>,
    invalid_tokens: HashSet<String>,
    failing_batches: HashSet<usize>,
}

impl RecordingPushGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a token so subsequent sends report it invalid.
    pub fn mark_invalid(&self, token: &str) {
        let mut state = self.inner.lock().unwrap();
        state.invalid_tokens.insert(token.to_string());
    }

    /// Makes the Nth batch (0-based, counted across all sends) fail
    /// wholesale.
    pub fn fail_batch(&self, index: usize) {
        let mut state = self.inner.lock().unwrap();
        state.failing_batches.insert(index);
    }

    pub fn batches(&self) -> Vec<Vec<PushMessage>> {
        self.inner.lock().unwrap().batches.clone()
    }
}

#[async_trait]
impl PushGateway for RecordingPushGateway {
    async fn send_batch(&self, batch: &[PushMessage]) -> Result<Vec<SendOutcome>> {
        let mut state = self.inner.lock().unwrap();
        let index = state.batches.len();
        state.batches.push(batch.to_vec());

        if state.failing_batches.contains(&index) {
            return Err(crate::error::CommerceError::ExternalService(format!(
                "push batch {index} refused"
            )));
        }

        Ok(batch
            .iter()
            .map(|message| {
                if state.invalid_tokens.contains(&message.token) {
                    SendOutcome::InvalidToken
                } else {
                    SendOutcome::Delivered
                }
            })
            .collect())
    }
}

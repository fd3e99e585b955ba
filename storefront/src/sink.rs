//! Submission sink for finished movie entries.
//!
//! The form only knows that a submission either succeeds (optionally with a
//! server-assigned id) or fails with a human-readable reason. Transport and
//! status codes stay behind the [`SubmissionSink`] trait.

use crate::payload::MoviePayload;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;

/// Sink result
pub type SinkResult<T> = Result<T, SubmissionError>;

/// Acknowledgement of an accepted submission
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    /// Identifier assigned by the catalog, when it returns one
    pub movie_id: Option<String>,
}

/// Why a submission was not accepted
#[derive(Error, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionError {
    /// The catalog refused the movie
    #[error("{reason}")]
    Rejected {
        /// Reason reported by the catalog
        reason: String,
    },

    /// The catalog could not be reached
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

/// Destination for assembled movie payloads
pub trait SubmissionSink: Send + Sync {
    /// Submit a movie
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError`] if the movie was not accepted.
    fn submit(
        &self,
        payload: MoviePayload,
    ) -> Pin<Box<dyn Future<Output = SinkResult<SubmissionReceipt>> + Send>>;
}

#[derive(Debug, Default)]
struct Recorded {
    accepted: Vec<MoviePayload>,
    attempts: usize,
    fail_next: Option<SubmissionError>,
}

/// In-memory sink that records every accepted payload
///
/// Clones share the same record, so a test can keep one handle and give
/// another to the environment.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    latency: Duration,
    recorded: Arc<Mutex<Recorded>>,
}

impl RecordingSink {
    /// Creates a sink that answers immediately
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates network latency on every submission
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared(&self) -> Arc<dyn SubmissionSink> {
        Arc::new(self.clone())
    }

    /// Makes the next submission fail with `error`
    pub fn fail_next(&self, error: SubmissionError) {
        self.lock().fail_next = Some(error);
    }

    /// Payloads accepted so far, oldest first
    #[must_use]
    pub fn accepted(&self) -> Vec<MoviePayload> {
        self.lock().accepted.clone()
    }

    /// Number of `submit` calls, accepted or not
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.lock().attempts
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SubmissionSink for RecordingSink {
    fn submit(
        &self,
        payload: MoviePayload,
    ) -> Pin<Box<dyn Future<Output = SinkResult<SubmissionReceipt>> + Send>> {
        let sink = self.clone();
        Box::pin(async move {
            if !sink.latency.is_zero() {
                tokio::time::sleep(sink.latency).await;
            }

            let mut recorded = sink.lock();
            recorded.attempts += 1;

            if let Some(error) = recorded.fail_next.take() {
                tracing::info!(movie = %payload.name, %error, "Mock catalog rejected movie");
                return Err(error);
            }

            let movie_id = format!("mock_movie_{}", uuid::Uuid::new_v4());
            tracing::info!(
                movie = %payload.name,
                movie_id = %movie_id,
                shows = payload.show_count(),
                "Mock catalog accepted movie"
            );
            recorded.accepted.push(payload);

            Ok(SubmissionReceipt {
                movie_id: Some(movie_id),
            })
        })
    }
}

// veilmask-core/src/recognizer.rs
//! The external entity-recognizer boundary.
//!
//! Name and organization detection is delegated to an optional external NLP
//! capability behind the [`EntityRecognizer`] trait. The capability may be
//! absent, slow, or broken; every call carries a caller-supplied timeout and
//! every failure maps to a [`RecognizerError`] the engine downgrades to
//! rule-only masking. Nothing in this module can fail a mask operation.
//!
//! License: MIT OR APACHE 2.0

use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::category::Category;

/// A single span the recognizer tagged in the input text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizedSpan {
    /// The exact surface form, as it appears in the text.
    pub text: String,
    /// `Client` for people, `Company` for organizations. The engine ignores
    /// spans tagged with any other category.
    pub category: Category,
}

/// Errors a recognizer implementation may surface.
///
/// All of them are non-fatal to masking: the engine logs, sets its
/// degraded-mode flag, and proceeds with static rules only.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RecognizerError {
    #[error("entity recognizer is unavailable: {0}")]
    Unavailable(String),

    #[error("entity recognizer timed out after {0:?}")]
    Timeout(Duration),

    #[error("entity recognizer returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// An injected strategy object supplying named-entity spans.
pub trait EntityRecognizer: Send + Sync {
    /// Returns every person/organization span found in `text`, spending at
    /// most `timeout` doing so.
    fn find_entities(
        &self,
        text: &str,
        timeout: Duration,
    ) -> Result<Vec<RecognizedSpan>, RecognizerError>;
}

#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct WireEntity {
    span: String,
    label: String,
}

/// An [`EntityRecognizer`] backed by an HTTP NLP service.
///
/// Contract: `POST <endpoint>` with body `{"text": "..."}`; the service
/// answers a JSON array of `{"span": "...", "label": "person"|"organization"}`.
/// Spans with any other label are skipped.
#[derive(Debug)]
pub struct HttpRecognizer {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl HttpRecognizer {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, RecognizerError> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| RecognizerError::Unavailable(e.to_string()))?;
        Ok(Self { endpoint: endpoint.into(), client })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl EntityRecognizer for HttpRecognizer {
    fn find_entities(
        &self,
        text: &str,
        timeout: Duration,
    ) -> Result<Vec<RecognizedSpan>, RecognizerError> {
        let response = self
            .client
            .post(&self.endpoint)
            .timeout(timeout)
            .json(&WireRequest { text })
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    RecognizerError::Timeout(timeout)
                } else {
                    RecognizerError::Unavailable(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(RecognizerError::Unavailable(format!(
                "recognizer endpoint returned HTTP {}",
                response.status()
            )));
        }

        let entities: Vec<WireEntity> = response
            .json()
            .map_err(|e| RecognizerError::InvalidResponse(e.to_string()))?;

        let mut spans = Vec::with_capacity(entities.len());
        for entity in entities {
            match categorize_label(&entity.label) {
                Some(category) => spans.push(RecognizedSpan { text: entity.span, category }),
                None => {
                    debug!(
                        "Skipping recognizer span with unsupported label '{}'.",
                        entity.label
                    );
                }
            }
        }
        Ok(spans)
    }
}

/// Maps a wire label onto a placeholder category; anything beyond people
/// and organizations is outside this engine's vocabulary.
fn categorize_label(label: &str) -> Option<Category> {
    match label {
        "person" => Some(Category::Client),
        "organization" => Some(Category::Company),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_labels_map_onto_categories() {
        assert_eq!(categorize_label("person"), Some(Category::Client));
        assert_eq!(categorize_label("organization"), Some(Category::Company));
        assert_eq!(categorize_label("date"), None);
        assert_eq!(categorize_label("Person"), None);
    }
}

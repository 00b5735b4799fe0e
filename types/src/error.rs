//! Failure kinds for boxing, envelope decoding, and resolution.

use std::error::Error as StdError;

use thiserror::Error;

/// Errors produced by [`Boxed`](crate::Boxed).
///
/// `E` is the populate error of the candidate type, i.e. `<T as Boxable>::Error`.
#[derive(Debug, Error)]
pub enum BoxError<E = serde_json::Error>
where
    E: StdError + 'static,
{
    /// The value could not be serialized when the box was built.
    #[error("failed to serialize value into box")]
    ConstructionFailed(#[source] serde_json::Error),
    /// The inbound bytes are not a `{"Data": ...}` envelope.
    #[error("malformed box envelope")]
    DecodeEnvelopeFailed(#[source] serde_json::Error),
    /// Every candidate rejected the payload.
    ///
    /// Carries the error of the last candidate tried, or `None` when no
    /// candidates were supplied at all.
    #[error("no concrete types matched value inside box")]
    NoCandidateMatched(#[source] Option<E>),
}

impl<E> BoxError<E>
where
    E: StdError + 'static,
{
    /// The error reported by the final candidate of a failed resolution.
    #[must_use]
    pub fn last_cause(&self) -> Option<&E> {
        match self {
            BoxError::NoCandidateMatched(cause) => cause.as_ref(),
            BoxError::ConstructionFailed(_) | BoxError::DecodeEnvelopeFailed(_) => None,
        }
    }

    #[must_use]
    pub fn is_no_candidate_matched(&self) -> bool {
        matches!(self, BoxError::NoCandidateMatched(_))
    }
}

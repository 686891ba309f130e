//! Commerce API errors.

use serde::Deserialize;
use thiserror::Error;

/// Message a backend attaches to a failed request: a single string or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum BackendMessage {
    /// Single message
    One(String),

    /// Validation-style list of messages
    Many(Vec<String>),
}

impl BackendMessage {
    /// The message, or the first entry of a list.
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::One(message) => Some(message),
            Self::Many(messages) => messages.first().map(String::as_str),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub(crate) message: Option<BackendMessage>,
}

/// Errors returned by [`CommerceApi`](crate::api::CommerceApi) implementations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend responded with status {status}")]
    Backend {
        status: u16,
        message: Option<BackendMessage>,
    },

    /// The response body did not match the expected shape.
    #[error("invalid response payload: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Backend failure with a single message, as tests and fakes produce them.
    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        Self::Backend {
            status,
            message: Some(BackendMessage::One(message.into())),
        }
    }

    /// The structured message the backend sent, if any.
    pub fn backend_message(&self) -> Option<&BackendMessage> {
        match self {
            Self::Backend { message, .. } => message.as_ref(),
            Self::Http(_) | Self::Decode(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn message_accepts_string_or_list() -> TestResult {
        let one: ErrorBody = serde_json::from_str(r#"{"message":"Out of stock"}"#)?;
        let many: ErrorBody = serde_json::from_str(r#"{"message":["a","b"]}"#)?;
        let none: ErrorBody = serde_json::from_str(r#"{"statusCode":500}"#)?;

        assert_eq!(
            one.message,
            Some(BackendMessage::One("Out of stock".to_string()))
        );
        assert_eq!(
            many.message,
            Some(BackendMessage::Many(vec!["a".to_string(), "b".to_string()]))
        );
        assert_eq!(none.message, None);

        Ok(())
    }
}

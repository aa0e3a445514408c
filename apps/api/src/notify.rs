//! Toast-style notices returned alongside every section response.
//!
//! A notice is the terminal sink for both outcomes of a handler: success
//! messages are built by the handler, failure messages by `AppError`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// The three classes a failure is reported as, decided by upstream HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    NotFound,
    Unauthorized,
    Other,
}

pub const SUPPORT_MESSAGE: &str =
    "We couldn't find what you were looking for. Please contact support if this keeps happening.";
pub const LOGIN_MESSAGE: &str = "Your session has expired. Please log in again.";
pub const RETRY_MESSAGE: &str = "Something went wrong. Please try again.";
pub const LOGIN_REDIRECT: &str = "/login";

impl ErrorClass {
    pub fn from_status(status: u16) -> Self {
        match status {
            404 => ErrorClass::NotFound,
            401 => ErrorClass::Unauthorized,
            _ => ErrorClass::Other,
        }
    }

    pub fn user_message(self) -> &'static str {
        match self {
            ErrorClass::NotFound => SUPPORT_MESSAGE,
            ErrorClass::Unauthorized => LOGIN_MESSAGE,
            ErrorClass::Other => RETRY_MESSAGE,
        }
    }

    pub fn redirect(self) -> Option<&'static str> {
        match self {
            ErrorClass::Unauthorized => Some(LOGIN_REDIRECT),
            _ => None,
        }
    }
}

// src/error.rs

//! Unified error handling for the scraper service.

use std::fmt;

use thiserror::Error;

/// Result type alias for scraper operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed (network, timeout, or non-2xx)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Store query or connection failed
    #[error("Store error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Feed document rendering failed
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Page fetch failed with context
    #[error("Fetch error for {url}: {message}")]
    Fetch { url: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Store contract violation
    #[error("Store error: {0}")]
    Store(String),
}

impl AppError {
    /// Create a fetch error with the URL that failed.
    pub fn fetch(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a store error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }
}

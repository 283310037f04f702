//! # Error Types
//!
//! This module defines error types used throughout the factura library.

use thiserror::Error;

/// Main error type for factura operations
#[derive(Debug, Error)]
pub enum FacturaError {
    /// Structural template errors (unreadable file, unreadable header)
    #[error("Template error: {0}")]
    Template(String),

    /// An element failed validation
    #[error("Invalid element: {0}")]
    InvalidElement(String),

    /// Render-time element errors (missing image, empty barcode content)
    #[error("Render error: {0}")]
    Render(String),

    /// Drawing backend errors (initialization, output serialization)
    #[error("Backend error: {0}")]
    Backend(String),

    /// QR/barcode encoding errors
    #[error("Encode error: {0}")]
    Encode(String),

    /// JSON (de)serialization error wrapper
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

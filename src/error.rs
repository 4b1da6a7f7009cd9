//! Error types for the edgequake-idea2app library.
//!
//! Two distinct error types reflect two distinct failure layers:
//!
//! * [`GatewayError`]: a single remote generation call failed (network,
//!   authentication, provider-side error, timeout). Produced by every
//!   [`crate::gateway::ModelGateway`] implementation.
//!
//! * [`Idea2AppError`]: **Fatal** for the whole request: the document could
//!   not be read, or a chain step failed. Gateway failures are wrapped in
//!   [`Idea2AppError::StepFailed`] together with the step that triggered them.
//!
//! There is no partial-success mode: a request either yields every artifact
//! or one of these errors. [`Idea2AppError::kind`] gives the boundary a stable
//! tag to render a distinct message per failure kind.

use crate::chain::ChainStep;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-idea2app library.
#[derive(Debug, Error)]
pub enum Idea2AppError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The document's declared kind is neither PDF nor plain text.
    #[error("Unsupported file format '{declared}'. Please provide a PDF or text file.")]
    UnsupportedFormat { declared: String },

    /// Plain-text bytes are not valid UTF-8.
    #[error("Document is not valid UTF-8: {source}")]
    DecodeError {
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// Input file was not found or could not be read.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// pdfium could not open the document.
    #[error("PDF is corrupt or unreadable: {detail}")]
    CorruptPdf { detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
PDFium is normally downloaded automatically on first use.\n\
If the auto-download failed, you can:\n\
  • Check your internet connection and try again.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Chain errors ──────────────────────────────────────────────────────
    /// A generation step failed; the remaining chain was abandoned.
    #[error("Step {} ({}) failed: {source}", .step.number(), .step.label())]
    StepFailed {
        step: ChainStep,
        #[source]
        source: GatewayError,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write a download file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Idea2AppError {
    /// Stable, machine-readable tag for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Idea2AppError::UnsupportedFormat { .. } => "unsupported_format",
            Idea2AppError::DecodeError { .. } => "decode_error",
            Idea2AppError::FileNotFound { .. } => "file_not_found",
            Idea2AppError::CorruptPdf { .. } => "corrupt_pdf",
            Idea2AppError::PdfiumBindingFailed(_) => "pdfium_binding_failed",
            Idea2AppError::StepFailed { .. } => "gateway_error",
            Idea2AppError::OutputWriteFailed { .. } => "output_write_failed",
            Idea2AppError::InvalidConfig(_) => "invalid_config",
            Idea2AppError::Internal(_) => "internal",
        }
    }

    /// The chain step that failed, if this is a gateway failure.
    pub fn failed_step(&self) -> Option<ChainStep> {
        match self {
            Idea2AppError::StepFailed { step, .. } => Some(*step),
            _ => None,
        }
    }
}

/// A failed remote generation call.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum GatewayError {
    /// Credential missing or rejected by the provider (401/403).
    #[error("Authentication error from provider '{provider}': {detail}")]
    Auth { provider: String, detail: String },

    /// The request never reached the provider or the connection dropped.
    #[error("Network error talking to '{provider}': {detail}")]
    Network { provider: String, detail: String },

    /// The provider answered with an error.
    #[error("Provider '{provider}' returned an error: {message}")]
    Provider { provider: String, message: String },

    /// No response within the configured timeout.
    #[error("Call to '{provider}' timed out after {secs}s")]
    Timeout { provider: String, secs: u64 },

    /// The provider answered but the response carried no usable content.
    #[error("Provider '{provider}' returned an empty response")]
    EmptyResponse { provider: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_format_display() {
        let e = Idea2AppError::UnsupportedFormat {
            declared: "image/png".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("image/png"), "got: {msg}");
        assert!(msg.contains("PDF or text"), "got: {msg}");
        assert_eq!(e.kind(), "unsupported_format");
    }

    #[test]
    fn decode_error_kind() {
        let source = String::from_utf8(vec![0xff, 0xfe]).unwrap_err();
        let e = Idea2AppError::DecodeError { source };
        assert_eq!(e.kind(), "decode_error");
        assert!(e.to_string().contains("UTF-8"));
    }

    #[test]
    fn step_failed_names_step_and_cause() {
        let e = Idea2AppError::StepFailed {
            step: ChainStep::UiDesign,
            source: GatewayError::Timeout {
                provider: "anthropic".into(),
                secs: 30,
            },
        };
        let msg = e.to_string();
        assert!(msg.contains("Step 3"), "got: {msg}");
        assert!(msg.contains("UI design"), "got: {msg}");
        assert!(msg.contains("30s"), "got: {msg}");
        assert_eq!(e.kind(), "gateway_error");
        assert_eq!(e.failed_step(), Some(ChainStep::UiDesign));
    }

    #[test]
    fn auth_error_display() {
        let e = GatewayError::Auth {
            provider: "openai".into(),
            detail: "OPENAI_API_KEY is not set".into(),
        };
        assert!(e.to_string().contains("openai"));
        assert!(e.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn non_step_errors_have_no_step() {
        let e = Idea2AppError::InvalidConfig("bad".into());
        assert_eq!(e.failed_step(), None);
        assert_eq!(e.kind(), "invalid_config");
    }
}

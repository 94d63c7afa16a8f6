//! CLI error types with exit code handling
//!
//! Every failure of the status command exits with the same code; the variants
//! exist to give each one its own diagnostic code and help text.

use meshstat_kube::{KubeError, StatusError};
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Unexpected arguments
    #[error("{message}")]
    #[diagnostic(
        code(meshstat::cli::usage),
        help("run `meshstat status --help` for the accepted flags")
    )]
    Usage { message: String },

    /// Cluster access or storage driver could not be set up
    #[error("Configuration error: {message}")]
    #[diagnostic(code(meshstat::cli::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// The status check failed; the reporter has already shown why
    #[error("{0}")]
    #[diagnostic(code(meshstat::cli::check))]
    CheckFailed(StatusError),

    /// Internal error (runtime, unexpected failure)
    #[error("Internal error: {message}")]
    #[diagnostic(code(meshstat::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage { .. }
            | CliError::Config { .. }
            | CliError::CheckFailed(_)
            | CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    /// Whether the error was already printed as part of the status report
    pub fn already_reported(&self) -> bool {
        matches!(self, CliError::CheckFailed(_))
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a configuration error from a cluster access or driver failure
    pub fn config(err: KubeError) -> Self {
        let help = match &err {
            KubeError::UnsupportedDriver(_) => {
                Some("set HELM_DRIVER or --storage-driver to secret, configmap or memory".to_string())
            }
            KubeError::ClusterAccess(_) => {
                Some("check --kubeconfig and --context, or the KUBECONFIG environment variable".to_string())
            }
            _ => None,
        };
        Self::Config {
            message: err.to_string(),
            help,
        }
    }
}

impl From<StatusError> for CliError {
    fn from(err: StatusError) -> Self {
        CliError::CheckFailed(err)
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

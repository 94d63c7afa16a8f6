//! Core error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CoreError {
    #[error("invalid label selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("invalid label '{label}': {message}")]
    InvalidLabel { label: String, message: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;

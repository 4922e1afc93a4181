//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`InvalidTitle`] thrown when an expense title is empty.
//! - [`InvalidAmount`] thrown when an amount is negative or not a number.
//! - [`InvalidRate`] thrown when a conversion rate cannot be used.
//!
//!  [`InvalidTitle`]: EngineError::InvalidTitle
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidRate`]: EngineError::InvalidRate
use rust_xlsxwriter::XlsxError;
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid title: {0}")]
    InvalidTitle(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid rate: {0}")]
    InvalidRate(String),
    #[error("Report generation failed: {0}")]
    Report(#[from] XlsxError),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidTitle(a), Self::InvalidTitle(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidRate(a), Self::InvalidRate(b)) => a == b,
            (Self::Report(a), Self::Report(b)) => a.to_string() == b.to_string(),
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

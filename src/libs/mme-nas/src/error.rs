//! NAS procedure error types

use thiserror::Error;

use crate::config::ConfigError;
use crate::imsi::{Imsi, ImsiError};

/// Status returned by the EMM SAP when it refuses a primitive
///
/// The engine reports only success or failure; nothing else crosses the SAP.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SapError {
    #[error("EMM SAP rejected the primitive")]
    Rejected,
}

/// EMM SAP result type
pub type SapResult = Result<(), SapError>;

/// NAS procedure error type
#[derive(Error, Debug)]
pub enum NasProcError {
    /// Mandatory NAS message buffer absent from the indication
    #[error("Missing NAS message")]
    MissingNasMessage,

    /// IMSI failed boundary validation
    #[error("Invalid IMSI: {0}")]
    InvalidImsi(#[from] ImsiError),

    /// No UE context is known for the IMSI
    #[error("Unknown IMSI: {0}")]
    UnknownImsi(Imsi),

    /// The UE context has no attach procedure in progress
    #[error("No attach procedure for IMSI {0}")]
    NoAttachProcedure(Imsi),

    /// NAS configuration refused at initialization
    #[error("Invalid NAS configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// Authentication info answer carried an out-of-range vector count
    #[error("Invalid number of authentication vectors: {count} (expected 1..={max})")]
    InvalidVectorCount { count: usize, max: usize },

    /// The EMM SAP refused the primitive
    #[error("EMM SAP error: {0}")]
    Sap(#[from] SapError),
}

/// NAS procedure result type
pub type NasProcResult<T> = Result<T, NasProcError>;

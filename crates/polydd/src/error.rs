//! Failure taxonomy for conversions.
//!
//! - `ErrorKind`: closed, fieldless enumeration with stable diagnostic names
//!   (`name`/`from_name` are inverse to each other).
//! - `DdError`: the error actually returned by fallible operations. Each variant
//!   carries the context needed to explain the failure and maps onto one kind.

use std::fmt;

use thiserror::Error;

use crate::matrix::RepresentationKind;

/// Stable failure kinds. `NoError` is a sentinel and never produced by `DdError::kind`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NoError,
    EmptyRepresentation,
    EmptyHRepresentation,
    EmptyVRepresentation,
    DimensionMismatch,
    ImproperInputFormat,
    CannotHandleLinearity,
    NumericallyInconsistent,
    LpCycling,
    NoRealNumberSupport,
    NotAvailableForRepresentation,
    FileNotFound,
    FileNotOpen,
    LimitExceeded,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 14] = [
        ErrorKind::NoError,
        ErrorKind::EmptyRepresentation,
        ErrorKind::EmptyHRepresentation,
        ErrorKind::EmptyVRepresentation,
        ErrorKind::DimensionMismatch,
        ErrorKind::ImproperInputFormat,
        ErrorKind::CannotHandleLinearity,
        ErrorKind::NumericallyInconsistent,
        ErrorKind::LpCycling,
        ErrorKind::NoRealNumberSupport,
        ErrorKind::NotAvailableForRepresentation,
        ErrorKind::FileNotFound,
        ErrorKind::FileNotOpen,
        ErrorKind::LimitExceeded,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::NoError => "NoError",
            ErrorKind::EmptyRepresentation => "EmptyRepresentation",
            ErrorKind::EmptyHRepresentation => "EmptyHRepresentation",
            ErrorKind::EmptyVRepresentation => "EmptyVRepresentation",
            ErrorKind::DimensionMismatch => "DimensionMismatch",
            ErrorKind::ImproperInputFormat => "ImproperInputFormat",
            ErrorKind::CannotHandleLinearity => "CannotHandleLinearity",
            ErrorKind::NumericallyInconsistent => "NumericallyInconsistent",
            ErrorKind::LpCycling => "LPCycling",
            ErrorKind::NoRealNumberSupport => "NoRealNumberSupport",
            ErrorKind::NotAvailableForRepresentation => "NotAvailableForRepresentation",
            ErrorKind::FileNotFound => "FileNotFound",
            ErrorKind::FileNotOpen => "FileNotOpen",
            ErrorKind::LimitExceeded => "LimitExceeded",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum DdError {
    #[error("empty representation: {cols} column(s) leave no spatial coordinate")]
    EmptyRepresentation { cols: usize },

    #[error("empty H-representation: no inequality rows")]
    EmptyHRepresentation,

    #[error("empty V-representation: no generator rows")]
    EmptyVRepresentation,

    #[error("dimension mismatch ({context}): expected {expected}, found {found}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        found: usize,
    },

    #[error("improper input format at {location}: {reason}")]
    ImproperInputFormat { location: String, reason: String },

    #[error("cannot handle linearity row {row}: {reason}")]
    CannotHandleLinearity { row: usize, reason: &'static str },

    #[error("numerically inconsistent: {reason}")]
    NumericallyInconsistent { reason: String },

    #[error("LP did not terminate within {iterations} pivots")]
    LpCycling { iterations: usize },

    #[error("non-real value {value} at row {row}, column {col}")]
    NoRealNumberSupport { row: usize, col: usize, value: f64 },

    #[error("no {kind} available")]
    NotAvailableForRepresentation { kind: RepresentationKind },

    #[error("file not found: {path}")]
    FileNotFound { path: String },

    #[error("output not writable: {reason}")]
    FileNotOpen { reason: String },

    #[error("candidate limit {limit} exceeded while absorbing row {row}")]
    LimitExceeded { limit: usize, row: usize },
}

impl DdError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DdError::EmptyRepresentation { .. } => ErrorKind::EmptyRepresentation,
            DdError::EmptyHRepresentation => ErrorKind::EmptyHRepresentation,
            DdError::EmptyVRepresentation => ErrorKind::EmptyVRepresentation,
            DdError::DimensionMismatch { .. } => ErrorKind::DimensionMismatch,
            DdError::ImproperInputFormat { .. } => ErrorKind::ImproperInputFormat,
            DdError::CannotHandleLinearity { .. } => ErrorKind::CannotHandleLinearity,
            DdError::NumericallyInconsistent { .. } => ErrorKind::NumericallyInconsistent,
            DdError::LpCycling { .. } => ErrorKind::LpCycling,
            DdError::NoRealNumberSupport { .. } => ErrorKind::NoRealNumberSupport,
            DdError::NotAvailableForRepresentation { .. } => {
                ErrorKind::NotAvailableForRepresentation
            }
            DdError::FileNotFound { .. } => ErrorKind::FileNotFound,
            DdError::FileNotOpen { .. } => ErrorKind::FileNotOpen,
            DdError::LimitExceeded { .. } => ErrorKind::LimitExceeded,
        }
    }

    pub(crate) fn mismatch(context: impl Into<String>, expected: usize, found: usize) -> Self {
        DdError::DimensionMismatch {
            context: context.into(),
            expected,
            found,
        }
    }

    pub(crate) fn format(location: impl Into<String>, reason: impl Into<String>) -> Self {
        DdError::ImproperInputFormat {
            location: location.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn inconsistent(reason: impl Into<String>) -> Self {
        DdError::NumericallyInconsistent {
            reason: reason.into(),
        }
    }
}

pub type DdResult<T> = Result<T, DdError>;

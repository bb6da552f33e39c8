use csv::Error as CsvError;
use serde_json::Error as SerdeError;
use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::PathBuf;

#[allow(clippy::enum_variant_names)]
#[derive(Debug)]
pub enum Error {
    /// Fewer observations than the computation needs.
    InsufficientData {
        needed: usize,
        found: usize,
    },
    /// The predictors (intercept included) are linearly dependent.
    SingularDesignMatrix,
    /// A column name that is not part of the record schema.
    InvalidColumn(String),
    /// `predict` was handed a different number of values than the model has predictors.
    PredictorMismatch {
        expected: usize,
        found: usize,
    },
    /// Two records share the same `ID`.
    DuplicateId(u64),
    /// A record whose `Month` is outside `1..=12`.
    InvalidMonth {
        id: u64,
        month: u8,
    },
    /// Parameters the t or F distribution rejects.
    InvalidDistribution(String),
    AccessError {
        path: PathBuf,
        inner: io::Error,
    },
    SerdeError {
        path: PathBuf,
        inner: SerdeError,
    },
    CsvError(CsvError),
}
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InsufficientData { needed, found } => write!(
                f,
                "Not enough observations: need at least {}, found {}",
                needed, found
            ),
            Error::SingularDesignMatrix => write!(
                f,
                "Design matrix is singular; the predictors are perfectly collinear"
            ),
            Error::InvalidColumn(name) => write!(f, "Unknown column {:?}", name),
            Error::PredictorMismatch { expected, found } => write!(
                f,
                "Model takes {} predictor values but {} were given",
                expected, found
            ),
            Error::DuplicateId(id) => write!(f, "Duplicate record ID {}", id),
            Error::InvalidMonth { id, month } => {
                write!(f, "Record {} has month {}, expected 1 to 12", id, month)
            }
            Error::InvalidDistribution(reason) => {
                write!(f, "Invalid distribution parameters: {}", reason)
            }
            Error::AccessError { path, inner } => {
                write!(f, "Failed to access file {:?}: {}", path, inner)
            }
            Error::SerdeError { path, inner } => write!(
                f,
                "Failed to read or write file {:?} due to serialization error: {}",
                path, inner
            ),
            Error::CsvError(inner) => write!(f, "CSV error: {}", inner),
        }
    }
}
impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::InsufficientData { .. } => None,
            Error::SingularDesignMatrix => None,
            Error::InvalidColumn(_) => None,
            Error::PredictorMismatch { .. } => None,
            Error::DuplicateId(_) => None,
            Error::InvalidMonth { .. } => None,
            Error::InvalidDistribution(_) => None,
            Error::AccessError { inner, .. } => Some(inner),
            Error::SerdeError { inner, .. } => Some(inner),
            Error::CsvError(inner) => Some(inner),
        }
    }
}
impl From<CsvError> for Error {
    fn from(other: CsvError) -> Error {
        Error::CsvError(other)
    }
}

pub type Result<T> = ::std::result::Result<T, Error>;

pub(crate) fn log_error(e: &Error) {
    error!("error: {}", e);
}

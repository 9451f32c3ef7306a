use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("parse error: {0}")]
    Parse(String),
    #[error("input out of range: {0}")]
    Range(String),
    #[error("{0} is not prime")]
    PNotPrime(u64),
    #[error("{0} has no inverse modulo {1}")]
    NotInvertible(u64, u64),
    #[error("big integer subtraction underflowed")]
    Underflow,
    #[error("big integer conversion overflowed")]
    Overflow,
    #[error("big integer division by zero")]
    ZeroDivide,
    #[error("factorization failed: {0}")]
    Factor(String),
    #[error("internal error: {0}")]
    Internal(String),
}

/// Process exit codes handed back to the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success = 0,
    AskForHelp = 1,
    PNotPrime = 2,
    RangeError = 3,
    InternalError = 4,
}

impl From<&Error> for ExitStatus {
    fn from(err: &Error) -> Self {
        match err {
            Error::Parse(_) | Error::Range(_) => ExitStatus::RangeError,
            Error::PNotPrime(_) => ExitStatus::PNotPrime,
            Error::NotInvertible(..)
            | Error::Underflow
            | Error::Overflow
            | Error::ZeroDivide
            | Error::Factor(_)
            | Error::Internal(_) => ExitStatus::InternalError,
        }
    }
}

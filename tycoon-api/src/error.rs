use thiserror::Error;

/// Why a call to the authoritative service did not produce a usable answer.
///
/// Every variant sends the caller down the offline path.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("authoritative service unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("authoritative service returned HTTP {status}")]
    Status {
        status: u16,
        message: Option<String>,
    },
    #[error("authoritative service rejected the request: {message}")]
    Rejected { message: String },
    #[error("authoritative service response carried no data")]
    MissingData,
    #[error("invalid authoritative service url: {0}")]
    InvalidUrl(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

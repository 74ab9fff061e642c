use std::num::ParseIntError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SrtError {
    #[error("Invalid timestamp '{input}'\n{detail}")]
    InvalidTimestamp { input: String, detail: String },
    #[error("Timestamp out of range: '{0}'")]
    TimestampOverflow(String),
    #[error("Invalid sequence number '{input}'")]
    InvalidSequenceNumber {
        input: String,
        #[source]
        source: ParseIntError,
    },
}

pub type Result<T> = std::result::Result<T, SrtError>;

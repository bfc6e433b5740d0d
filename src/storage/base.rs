use crate::core::Record;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage operation failed: {0}")]
    OperationError(#[from] std::io::Error),

    #[error("serialization failed: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Where scraped records go. Records arrive in emission order.
pub trait RecordSink {
    fn write_record(&mut self, record: &Record) -> Result<(), StorageError>;
    fn flush(&mut self) -> Result<(), StorageError>;
}

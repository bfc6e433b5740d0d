pub mod base;
pub mod disk;
pub mod jsonl;

pub use base::{RecordSink, StorageError};
pub use disk::DiskStorage;
pub use jsonl::JsonLinesSink;

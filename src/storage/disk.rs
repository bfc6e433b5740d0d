use super::base::StorageError;
use super::jsonl::JsonLinesSink;
use chrono::Utc;
use log::debug;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Exports each crawl to its own JSON Lines file under a base directory.
#[derive(Clone)]
pub struct DiskStorage {
    base_path: PathBuf,
}

impl DiskStorage {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self, StorageError> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Creates `<spider>_<timestamp>_<uuid>.jsonl` and returns a sink writing to it.
    pub fn open_sink(&self, spider_name: &str) -> Result<(PathBuf, JsonLinesSink<File>), StorageError> {
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let filename = format!("{}_{}_{}.jsonl", spider_name, timestamp, Uuid::now_v7());
        let path = self.base_path.join(filename);

        let file = File::create(&path)?;
        debug!("Writing records to {}", path.display());
        Ok((path, JsonLinesSink::new(file)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Record;
    use crate::storage::RecordSink;

    #[test]
    fn test_open_sink_writes_file() {
        let dir = std::env::temp_dir().join(format!("shopscraper-test-{}", Uuid::now_v7()));
        let storage = DiskStorage::new(&dir).unwrap();

        let (path, mut sink) = storage.open_sink("toscrape-css").unwrap();
        sink.write_record(&Record::new(Some("Item A".to_string()), None, vec![]))
            .unwrap();
        sink.flush().unwrap();
        drop(sink);

        assert!(path.starts_with(storage.base_path()));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("toscrape-css_"));
        assert!(name.ends_with(".jsonl"));

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "{\"item\":\"Item A\",\"price\":null,\"description\":[]}\n"
        );

        fs::remove_dir_all(&dir).unwrap();
    }
}

//! In-memory log source

use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

/// Log source backed by a record snapshot held in memory
pub struct MemorySource {
    records: RwLock<Vec<RawRecord>>,
    /// Message returned by every search when set
    failure: Option<String>,
    fetches: AtomicUsize,
}

impl MemorySource {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self {
            records: RwLock::new(records),
            failure: None,
            fetches: AtomicUsize::new(0),
        }
    }

    /// A source whose searches and health checks all fail with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            failure: Some(message.into()),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Append records
    pub fn push(&self, records: impl IntoIterator<Item = RawRecord>) -> SourceResult<()> {
        let mut guard = self.records.write().map_err(|_| poisoned())?;
        guard.extend(records);
        Ok(())
    }

    /// Number of searches served so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }
}

fn poisoned() -> SourceError {
    SourceError::Remote("record store lock poisoned".to_string())
}

#[async_trait]
impl LogSource for MemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get_logs(&self, search: &LogSearch) -> SourceResult<LogBatch> {
        self.fetches.fetch_add(1, Ordering::Relaxed);

        if let Some(message) = &self.failure {
            return Err(SourceError::Remote(message.clone()));
        }

        let guard = self
            .records
            .read()
            .map_err(|_| poisoned())?;
        Ok(select_records(&guard, search))
    }

    async fn check_health(&self) -> SourceResult<()> {
        match &self.failure {
            Some(message) => Err(SourceError::Remote(message.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(msg: &str) -> RawRecord {
        [("msg".to_string(), msg.to_string())].into_iter().collect()
    }

    fn search_all() -> LogSearch {
        LogSearch {
            query: "*".to_string(),
            from: 0,
            to: i64::MAX,
            line: 100,
            offset: 0,
            reverse: false,
        }
    }

    #[tokio::test]
    async fn test_memory_source_returns_records() {
        let source = MemorySource::new(vec![record("a"), record("b")]);
        source.push(vec![record("c")]).unwrap();

        let batch = source.get_logs(&search_all()).await.unwrap();

        assert_eq!(batch.count, 3);
        assert_eq!(source.fetch_count(), 1);
        assert!(source.check_health().await.is_ok());
    }

    #[tokio::test]
    async fn test_push_after_poisoned_lock_fails() {
        let source = std::sync::Arc::new(MemorySource::new(vec![record("a")]));

        let writer = std::sync::Arc::clone(&source);
        let _ = std::thread::spawn(move || {
            let _guard = writer.records.write().unwrap();
            panic!("writer panicked while holding the lock");
        })
        .join();

        let err = source.push(vec![record("b")]).unwrap_err();
        assert_eq!(err.to_string(), "record store lock poisoned");
        assert!(source.get_logs(&search_all()).await.is_err());
    }

    #[tokio::test]
    async fn test_failing_source() {
        let source = MemorySource::failing("ProjectNotExist: project does not exist");

        let err = source.get_logs(&search_all()).await.unwrap_err();
        assert_eq!(err.to_string(), "ProjectNotExist: project does not exist");
        assert_eq!(source.fetch_count(), 1);

        assert!(source.check_health().await.is_err());
    }
}

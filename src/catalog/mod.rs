use std::fmt;

use ahash::AHashMap;
use derive_new::new;

pub type TableId = String;

/// Statistics of one index, as collected by the storage layer. The optimizer treats the pair as
/// an opaque value: it copies it onto plan nodes, it never computes or changes it.
#[derive(new, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexStats {
    page_count: u64,
    unique_key_count: u64,
}

impl IndexStats {
    pub fn page_count(&self) -> u64 {
        self.page_count
    }

    pub fn unique_key_count(&self) -> u64 {
        self.unique_key_count
    }
}

impl fmt::Display for IndexStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "pages={}, unique_keys={}",
            self.page_count, self.unique_key_count
        )
    }
}

/// Source of per-index statistics used by implementation rules.
pub trait StatisticsProvider {
    fn index_stats(&self, table: &str, index: &str) -> Option<IndexStats>;
}

/// Provider used when no statistics were collected.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStatistics;

impl StatisticsProvider for NoStatistics {
    fn index_stats(&self, _table: &str, _index: &str) -> Option<IndexStats> {
        None
    }
}

/// In-memory statistics keyed by (table, index).
#[derive(Debug, Clone, Default)]
pub struct MemoryStatistics {
    indexes: AHashMap<(TableId, String), IndexStats>,
}

impl MemoryStatistics {
    pub fn insert(&mut self, table: &str, index: &str, stats: IndexStats) {
        self.indexes
            .insert((table.to_string(), index.to_string()), stats);
    }

    pub fn with_index(mut self, table: &str, index: &str, stats: IndexStats) -> Self {
        self.insert(table, index, stats);
        self
    }
}

impl StatisticsProvider for MemoryStatistics {
    fn index_stats(&self, table: &str, index: &str) -> Option<IndexStats> {
        self.indexes
            .get(&(table.to_string(), index.to_string()))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_statistics_lookup() {
        let stats = MemoryStatistics::default().with_index("t1", "t1_pk", IndexStats::new(8, 100));
        let found = stats.index_stats("t1", "t1_pk").unwrap();
        assert_eq!(found.page_count(), 8);
        assert_eq!(found.unique_key_count(), 100);
        assert!(stats.index_stats("t1", "t1_c2").is_none());
        assert!(NoStatistics.index_stats("t1", "t1_pk").is_none());
    }
}

use std::sync::atomic::{AtomicU64, Ordering};

/// Source of alert and threshold identifiers.
///
/// Sessions use random v4 UUIDs; tests use the sequential form so ids are
/// predictable (`alert-1`, `alert-2`, ...).
#[derive(Debug)]
pub enum IdGenerator {
    Uuid,
    Sequential { prefix: String, next: AtomicU64 },
}

impl IdGenerator {
    pub fn uuid() -> Self {
        IdGenerator::Uuid
    }

    pub fn sequential(prefix: impl Into<String>) -> Self {
        IdGenerator::Sequential {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }

    /// Start a sequential generator past any `<prefix>-<n>` ids already in use
    pub fn sequential_after<'a>(
        prefix: impl Into<String>,
        existing: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let prefix = prefix.into();
        let marker = format!("{prefix}-");
        let highest = existing
            .into_iter()
            .filter_map(|id| id.strip_prefix(marker.as_str()))
            .filter_map(|n| n.parse::<u64>().ok())
            .max()
            .unwrap_or(0);

        IdGenerator::Sequential {
            prefix,
            next: AtomicU64::new(highest + 1),
        }
    }

    pub fn next_id(&self) -> String {
        match self {
            IdGenerator::Uuid => uuid::Uuid::new_v4().to_string(),
            IdGenerator::Sequential { prefix, next } => {
                let n = next.fetch_add(1, Ordering::Relaxed);
                format!("{prefix}-{n}")
            }
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        IdGenerator::uuid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids() {
        let ids = IdGenerator::sequential("alert");
        assert_eq!(ids.next_id(), "alert-1");
        assert_eq!(ids.next_id(), "alert-2");
    }

    #[test]
    fn test_sequential_after_existing() {
        let ids = IdGenerator::sequential_after("th", ["th-4", "th-12", "other-99", "th-x"]);
        assert_eq!(ids.next_id(), "th-13");
    }

    #[test]
    fn test_uuid_ids_are_distinct() {
        let ids = IdGenerator::uuid();
        assert_ne!(ids.next_id(), ids.next_id());
    }
}

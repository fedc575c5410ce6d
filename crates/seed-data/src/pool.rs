//! Cyclic content pools.
//!
//! A pool is fetched once and never modified; consumers walk it with a
//! cursor that wraps back to the start when it reaches the end.

/// Finite, non-empty sequence consumed round-robin.
#[derive(Debug, Clone)]
pub struct CyclicPool {
    items: Vec<String>,
    cursor: usize,
}

impl CyclicPool {
    /// Returns `None` for an empty item list.
    pub fn new(items: Vec<String>) -> Option<Self> {
        if items.is_empty() {
            return None;
        }
        Some(Self { items, cursor: 0 })
    }

    /// Returns the item under the cursor and advances it, wrapping at the end.
    pub fn next_item(&mut self) -> &str {
        let index = self.cursor;
        self.cursor = if index + 1 == self.items.len() {
            0
        } else {
            index + 1
        };
        &self.items[index]
    }

    /// Position of the next item to be returned. Always `< len()`.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, item: &str) -> bool {
        self.items.iter().any(|i| i == item)
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }
}

/// All content the generator draws from, each kind with its own cursor.
#[derive(Debug, Clone)]
pub struct ContentPool {
    pub urls: CyclicPool,
    pub words: CyclicPool,
    pub sentences: CyclicPool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(n: usize) -> CyclicPool {
        CyclicPool::new((0..n).map(|i| format!("u{i}")).collect()).unwrap()
    }

    #[test]
    fn test_empty_pool_rejected() {
        assert!(CyclicPool::new(Vec::new()).is_none());
    }

    #[test]
    fn test_wraps_in_order() {
        let mut urls = pool(3);
        let taken: Vec<String> = (0..7).map(|_| urls.next_item().to_string()).collect();
        assert_eq!(taken, vec!["u0", "u1", "u2", "u0", "u1", "u2", "u0"]);
    }

    #[test]
    fn test_cursor_is_count_mod_len() {
        for len in 1..6 {
            let mut p = pool(len);
            for taken in 1..=20 {
                p.next_item();
                assert_eq!(p.cursor(), taken % len);
                assert!(p.cursor() < p.len());
            }
        }
    }
}

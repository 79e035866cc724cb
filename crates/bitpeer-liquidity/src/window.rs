//! Bounded, time-ordered history of top-N identity sets for one market.

use crate::error::{LiquidityError, LiquidityResult};
use crate::identity::IdentitySnapshot;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct IdentityHistory {
    entries: VecDeque<IdentitySnapshot>,
    capacity: usize,
}

impl IdentityHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Append the newest entry, evicting the oldest beyond capacity.
    ///
    /// Entries must arrive in strictly increasing time order.
    pub fn push(&mut self, entry: IdentitySnapshot) -> LiquidityResult<()> {
        if let Some(last) = self.entries.back() {
            if entry.observed_at <= last.observed_at {
                return Err(LiquidityError::UnorderedHistory(format!(
                    "{} not after latest entry {}",
                    entry.observed_at, last.observed_at
                )));
            }
        }

        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        Ok(())
    }

    pub fn latest(&self) -> Option<&IdentitySnapshot> {
        self.entries.back()
    }

    /// Entries oldest first, as one slice.
    pub fn window(&mut self) -> &[IdentitySnapshot] {
        self.entries.make_contiguous()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitpeer_core::AdvertiserId;
    use chrono::{TimeZone, Utc};

    fn entry(ts: i64) -> IdentitySnapshot {
        IdentitySnapshot {
            observed_at: Utc.timestamp_opt(ts, 0).unwrap(),
            top: vec![AdvertiserId::new("a")],
        }
    }

    #[test]
    fn test_evicts_oldest() {
        let mut history = IdentityHistory::new(2);
        history.push(entry(1)).unwrap();
        history.push(entry(2)).unwrap();
        history.push(entry(3)).unwrap();

        assert_eq!(history.len(), 2);
        let window = history.window();
        assert_eq!(window[0].observed_at.timestamp(), 2);
        assert_eq!(window[1].observed_at.timestamp(), 3);
    }

    #[test]
    fn test_rejects_out_of_order() {
        let mut history = IdentityHistory::new(4);
        history.push(entry(10)).unwrap();

        let err = history.push(entry(5)).unwrap_err();
        assert!(matches!(err, LiquidityError::UnorderedHistory(_)));
        assert_eq!(history.latest().unwrap().observed_at.timestamp(), 10);
    }

    #[test]
    fn test_rejects_repeated_timestamp() {
        let mut history = IdentityHistory::new(4);
        history.push(entry(10)).unwrap();

        let err = history.push(entry(10)).unwrap_err();
        assert!(matches!(err, LiquidityError::UnorderedHistory(_)));
        assert_eq!(history.len(), 1);
    }
}

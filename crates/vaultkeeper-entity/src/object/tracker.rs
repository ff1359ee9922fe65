//! Change-set bookkeeping.

use std::collections::BTreeSet;

/// Remembers which declared fields were assigned since the last reset.
///
/// Tracks assignment, not difference: writing a field's current value back
/// still marks it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeTracker {
    changed: BTreeSet<&'static str>,
}

impl ChangeTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an assignment to `field`.
    pub fn mark(&mut self, field: &'static str) {
        self.changed.insert(field);
    }

    /// Whether `field` was assigned since the last reset.
    pub fn is_changed(&self, field: &str) -> bool {
        self.changed.contains(field)
    }

    /// Names of the assigned fields, sorted.
    pub fn changed(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.changed.iter().copied()
    }

    /// Whether nothing was assigned since the last reset.
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }

    /// Forget every assignment.
    pub fn reset(&mut self) {
        self.changed.clear();
    }

    /// Forget assignments to the listed fields only.
    pub fn reset_fields(&mut self, fields: &[&str]) {
        self.changed.retain(|name| !fields.contains(name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_and_reset() {
        let mut tracker = ChangeTracker::new();
        assert!(tracker.is_empty());

        tracker.mark("status");
        tracker.mark("size");
        tracker.mark("status");
        assert_eq!(tracker.changed().collect::<Vec<_>>(), vec!["size", "status"]);

        tracker.reset_fields(&["size"]);
        assert!(!tracker.is_changed("size"));
        assert!(tracker.is_changed("status"));

        tracker.reset();
        assert!(tracker.is_empty());
    }
}

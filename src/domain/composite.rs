//! Composite Field Records
//!
//! Sequences of small structured records stored inside an entity
//! (prep checklists, negotiation history, benefit lists).

use serde::{Deserialize, Serialize};

/// A record inside a composite field
pub trait CompositeRecord: Clone + PartialEq + std::fmt::Debug + Send + Sync {
    /// The text a record must carry to count as real
    fn primary_text(&self) -> &str;

    fn is_valid(&self) -> bool {
        !self.primary_text().trim().is_empty()
    }
}

/// Number of records with non-blank primary text
pub fn valid_count<R: CompositeRecord>(records: &[R]) -> usize {
    records.iter().filter(|r| r.is_valid()).count()
}

/// Interview preparation task
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub task: String,
    pub completed: bool,
}

impl ChecklistItem {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            completed: false,
        }
    }
}

impl CompositeRecord for ChecklistItem {
    fn primary_text(&self) -> &str {
        &self.task
    }
}

/// One round of offer negotiation
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NegotiationEntry {
    pub date: String,
    pub proposal: String,
}

impl CompositeRecord for NegotiationEntry {
    fn primary_text(&self) -> &str {
        &self.proposal
    }
}

/// Plain text records: benefits, skills, resume tags
impl CompositeRecord for String {
    fn primary_text(&self) -> &str {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_tasks_do_not_count() {
        let items = vec![
            ChecklistItem::new("Research company"),
            ChecklistItem::new("   "),
            ChecklistItem::new(""),
        ];
        assert_eq!(valid_count(&items), 1);
        // Invalid records stay in the sequence
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn test_negotiation_entry_needs_proposal() {
        let entry = NegotiationEntry {
            date: "2025-02-01".into(),
            proposal: String::new(),
        };
        assert!(!entry.is_valid());
    }
}

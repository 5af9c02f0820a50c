//! Domain Layer - Core Entity Trait
//!
//! Every tracked record (job, application, interview, offer, deadline,
//! resume) implements `Entity`. Drafts and patches describe the user's
//! intent before the server has seen it.

use chrono::{DateTime, Utc};
use std::fmt;

use crate::error::ValidationError;

/// Backend ids are positive; locally allocated temporary ids are negative
pub type EntityId = i64;

pub fn is_temporary_id(id: EntityId) -> bool {
    id < 0
}

/// The six resource kinds the tracker manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Job,
    Application,
    Interview,
    Offer,
    Deadline,
    Resume,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::Job,
        ResourceKind::Application,
        ResourceKind::Interview,
        ResourceKind::Offer,
        ResourceKind::Deadline,
        ResourceKind::Resume,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Job => "job",
            ResourceKind::Application => "application",
            ResourceKind::Interview => "interview",
            ResourceKind::Offer => "offer",
            ResourceKind::Deadline => "deadline",
            ResourceKind::Resume => "resume",
        }
    }

    /// URL segment of the endpoint family (`/api/<segment>`)
    pub fn collection(&self) -> &'static str {
        match self {
            ResourceKind::Job => "jobs",
            ResourceKind::Application => "applications",
            ResourceKind::Interview => "interviews",
            ResourceKind::Offer => "offers",
            ResourceKind::Deadline => "deadlines",
            ResourceKind::Resume => "resumes",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an optimistic entity lands in iteration order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Newest first (lists the backend returns in `created_at desc`)
    Front,
    Back,
}

/// Core trait for all domain entities
pub trait Entity: Sized + Send + Sync + Clone + PartialEq + fmt::Debug + 'static {
    /// Create-form input for this kind
    type Draft: Draft<Self>;
    /// Partial update for this kind
    type Patch: Patch<Self>;

    const KIND: ResourceKind;
    const PLACEMENT: Placement = Placement::Back;

    fn id(&self) -> EntityId;

    fn set_id(&mut self, id: EntityId);
}

/// User input for a create mutation
pub trait Draft<E>: Send + Sync {
    /// Pre-flight check; runs before anything touches the store
    fn validate(&self) -> Result<(), ValidationError>;

    /// Entity shown while the create request is in flight
    fn to_optimistic(&self, temp_id: EntityId, now: DateTime<Utc>) -> E;
}

/// User input for an update mutation
pub trait Patch<E>: Send + Sync {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }

    /// Apply the change locally, as the server is expected to
    fn apply(&self, entity: &mut E, now: DateTime<Utc>);
}

/// Blank-after-trim check shared by validators
pub(crate) fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |s| s.trim().is_empty())
}

/// Patch fields that may not be cleared to blank
pub(crate) fn reject_blank(field: &'static str, value: &Option<String>) -> Result<(), ValidationError> {
    match value {
        Some(s) if s.trim().is_empty() => Err(ValidationError::InvalidValue {
            field,
            reason: "cannot be blank".to_string(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temporary_ids_are_negative() {
        assert!(is_temporary_id(-1));
        assert!(!is_temporary_id(1));
        assert!(!is_temporary_id(0));
    }

    #[test]
    fn test_collection_segments() {
        assert_eq!(ResourceKind::Deadline.collection(), "deadlines");
        assert_eq!(ResourceKind::Application.to_string(), "application");
    }

    #[test]
    fn test_blank_helpers() {
        assert!(is_blank(&None));
        assert!(is_blank(&Some("  ".into())));
        assert!(reject_blank("title", &Some(" ".into())).is_err());
        assert!(reject_blank("title", &None).is_ok());
    }
}

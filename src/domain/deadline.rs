//! Deadline Entity
//!
//! A dated follow-up tied to an application.

use chrono::{DateTime, NaiveDateTime, Utc};

use super::entity::{is_blank, reject_blank, Draft, Entity, EntityId, Patch, ResourceKind};
use crate::error::ValidationError;

pub const DEFAULT_DEADLINE_TYPE: &str = "response";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" | "normal" => Some(Priority::Medium),
            "high" | "urgent" => Some(Priority::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Deadline {
    pub id: EntityId,
    pub application_id: EntityId,
    pub title: String,
    pub due_date: Option<NaiveDateTime>,
    pub deadline_type: String,
    pub priority: Priority,
    pub completed: bool,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entity for Deadline {
    type Draft = DeadlineDraft;
    type Patch = DeadlinePatch;

    const KIND: ResourceKind = ResourceKind::Deadline;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeadlineDraft {
    pub application_id: Option<EntityId>,
    pub title: Option<String>,
    pub due_date: Option<NaiveDateTime>,
    pub deadline_type: Option<String>,
    pub priority: Option<Priority>,
    pub notes: Option<String>,
}

impl Draft<Deadline> for DeadlineDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        if !matches!(self.application_id, Some(id) if id > 0) {
            return Err(ValidationError::MissingReference {
                kind: ResourceKind::Deadline,
                field: "application_id",
            });
        }
        if is_blank(&self.title) {
            return Err(ValidationError::MissingField { kind: ResourceKind::Deadline, field: "title" });
        }
        if self.due_date.is_none() {
            return Err(ValidationError::MissingField {
                kind: ResourceKind::Deadline,
                field: "due_date",
            });
        }
        Ok(())
    }

    fn to_optimistic(&self, temp_id: EntityId, now: DateTime<Utc>) -> Deadline {
        Deadline {
            id: temp_id,
            application_id: self.application_id.unwrap_or_default(),
            title: self.title.clone().unwrap_or_default(),
            due_date: self.due_date,
            deadline_type: self
                .deadline_type
                .clone()
                .unwrap_or_else(|| DEFAULT_DEADLINE_TYPE.to_string()),
            priority: self.priority.unwrap_or_default(),
            completed: false,
            notes: self.notes.clone(),
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeadlinePatch {
    pub title: Option<String>,
    pub due_date: Option<NaiveDateTime>,
    pub deadline_type: Option<String>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
    pub notes: Option<String>,
}

impl DeadlinePatch {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Default::default()
        }
    }
}

impl Patch<Deadline> for DeadlinePatch {
    fn validate(&self) -> Result<(), ValidationError> {
        reject_blank("title", &self.title)
    }

    fn apply(&self, deadline: &mut Deadline, now: DateTime<Utc>) {
        if let Some(v) = &self.title {
            deadline.title = v.clone();
        }
        if let Some(v) = self.due_date {
            deadline.due_date = Some(v);
        }
        if let Some(v) = &self.deadline_type {
            deadline.deadline_type = v.clone();
        }
        if let Some(v) = self.priority {
            deadline.priority = v;
        }
        if let Some(v) = self.completed {
            deadline.completed = v;
        }
        if let Some(v) = &self.notes {
            deadline.notes = Some(v.clone());
        }
        deadline.updated_at = Some(now);
    }
}

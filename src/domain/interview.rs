//! Interview Entity
//!
//! A scheduled interview for an application, with a preparation checklist.

use chrono::{DateTime, NaiveDate, Utc};

use super::composite::{valid_count, ChecklistItem};
use super::entity::{is_blank, reject_blank, Draft, Entity, EntityId, Patch, ResourceKind};
use crate::error::ValidationError;

pub const DEFAULT_INTERVIEW_TYPE: &str = "phone";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Interview {
    pub id: EntityId,
    pub application_id: EntityId,
    pub date: Option<NaiveDate>,
    /// Free-form time of day as entered ("10:00")
    pub time: String,
    pub interview_type: String,
    pub interviewer: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub prep_checklist: Vec<ChecklistItem>,
    pub reminders: bool,
    /// Denormalized from the application's job; read-only
    pub company_name: Option<String>,
    pub job_title: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Interview {
    /// (completed, valid) checklist tasks; blank tasks are ignored
    pub fn prep_progress(&self) -> (usize, usize) {
        let valid = valid_count(&self.prep_checklist);
        let done = self
            .prep_checklist
            .iter()
            .filter(|item| item.completed && !item.task.trim().is_empty())
            .count();
        (done, valid)
    }
}

impl Entity for Interview {
    type Draft = InterviewDraft;
    type Patch = InterviewPatch;

    const KIND: ResourceKind = ResourceKind::Interview;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

#[derive(Debug, Clone, Default)]
pub struct InterviewDraft {
    pub application_id: Option<EntityId>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub interview_type: Option<String>,
    pub interviewer: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub prep_checklist: Vec<ChecklistItem>,
    pub reminders: Option<bool>,
}

impl Draft<Interview> for InterviewDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        if !matches!(self.application_id, Some(id) if id > 0) {
            return Err(ValidationError::MissingReference {
                kind: ResourceKind::Interview,
                field: "application_id",
            });
        }
        if self.date.is_none() {
            return Err(ValidationError::MissingField { kind: ResourceKind::Interview, field: "date" });
        }
        if is_blank(&self.time) {
            return Err(ValidationError::MissingField { kind: ResourceKind::Interview, field: "time" });
        }
        Ok(())
    }

    fn to_optimistic(&self, temp_id: EntityId, now: DateTime<Utc>) -> Interview {
        Interview {
            id: temp_id,
            application_id: self.application_id.unwrap_or_default(),
            date: self.date,
            time: self.time.clone().unwrap_or_default(),
            interview_type: self
                .interview_type
                .clone()
                .unwrap_or_else(|| DEFAULT_INTERVIEW_TYPE.to_string()),
            interviewer: self.interviewer.clone(),
            location: self.location.clone(),
            notes: self.notes.clone(),
            prep_checklist: self.prep_checklist.clone(),
            reminders: self.reminders.unwrap_or(true),
            company_name: None,
            job_title: None,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InterviewPatch {
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub interview_type: Option<String>,
    pub interviewer: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub prep_checklist: Option<Vec<ChecklistItem>>,
    pub reminders: Option<bool>,
}

impl InterviewPatch {
    /// Patch that flips one checklist task, based on the current entity
    pub fn toggle_task(interview: &Interview, index: usize) -> Self {
        let mut checklist = interview.prep_checklist.clone();
        if let Some(item) = checklist.get_mut(index) {
            item.completed = !item.completed;
        }
        Self {
            prep_checklist: Some(checklist),
            ..Default::default()
        }
    }
}

impl Patch<Interview> for InterviewPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        reject_blank("time", &self.time)
    }

    fn apply(&self, interview: &mut Interview, now: DateTime<Utc>) {
        if let Some(v) = self.date {
            interview.date = Some(v);
        }
        if let Some(v) = &self.time {
            interview.time = v.clone();
        }
        if let Some(v) = &self.interview_type {
            interview.interview_type = v.clone();
        }
        if let Some(v) = &self.interviewer {
            interview.interviewer = Some(v.clone());
        }
        if let Some(v) = &self.location {
            interview.location = Some(v.clone());
        }
        if let Some(v) = &self.notes {
            interview.notes = Some(v.clone());
        }
        if let Some(v) = &self.prep_checklist {
            interview.prep_checklist = v.clone();
        }
        if let Some(v) = self.reminders {
            interview.reminders = v;
        }
        interview.updated_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> InterviewDraft {
        InterviewDraft {
            application_id: Some(7),
            date: NaiveDate::from_ymd_opt(2025, 3, 1),
            time: Some("10:00".into()),
            prep_checklist: vec![ChecklistItem::new("Research")],
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_application_is_a_reference_error() {
        let mut d = draft();
        d.application_id = None;
        assert_eq!(
            d.validate(),
            Err(ValidationError::MissingReference {
                kind: ResourceKind::Interview,
                field: "application_id"
            })
        );
    }

    #[test]
    fn test_optimistic_defaults() {
        let i = draft().to_optimistic(-4, Utc::now());
        assert_eq!(i.id, -4);
        assert_eq!(i.interview_type, "phone");
        assert!(i.reminders);
        assert_eq!(i.prep_checklist.len(), 1);
    }

    #[test]
    fn test_prep_progress_skips_blank_tasks() {
        let mut i = draft().to_optimistic(-1, Utc::now());
        i.prep_checklist.push(ChecklistItem { task: " ".into(), completed: true });
        i.prep_checklist[0].completed = true;
        assert_eq!(i.prep_progress(), (1, 1));
    }

    #[test]
    fn test_toggle_task_flips_only_that_task() {
        let i = draft().to_optimistic(-1, Utc::now());
        let patch = InterviewPatch::toggle_task(&i, 0);
        let list = patch.prep_checklist.unwrap();
        assert!(list[0].completed);
        assert_eq!(list[0].task, "Research");
    }
}

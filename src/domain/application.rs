//! Application Entity
//!
//! One submission to a job, moving through Saved → Applied → Interview →
//! Offer or Rejected.

use chrono::{DateTime, NaiveDateTime, Utc};

use super::entity::{Draft, Entity, EntityId, Patch, Placement, ResourceKind};
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ApplicationStatus {
    #[default]
    Saved,
    Applied,
    Interview,
    Offer,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Saved => "Saved",
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Interview => "Interview",
            ApplicationStatus::Offer => "Offer",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    /// Case-insensitive; unknown statuses yield `None`
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "saved" => Some(ApplicationStatus::Saved),
            "applied" => Some(ApplicationStatus::Applied),
            "interview" | "interviewing" => Some(ApplicationStatus::Interview),
            "offer" => Some(ApplicationStatus::Offer),
            "rejected" => Some(ApplicationStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Application {
    pub id: EntityId,
    pub job_id: EntityId,
    pub status: ApplicationStatus,
    pub resume_id: Option<EntityId>,
    pub notes: Option<String>,
    pub applied_date: Option<NaiveDateTime>,
    pub interview_date: Option<NaiveDateTime>,
    pub offer_date: Option<NaiveDateTime>,
    pub rejected_date: Option<NaiveDateTime>,
    pub rejection_reason: Option<String>,
    pub offer_details: Option<String>,
    /// Denormalized from the job; read-only
    pub company_name: Option<String>,
    pub job_title: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Application {
    /// Stamp the lifecycle date matching `status` if it is still unset
    fn stamp_status_date(&mut self, now: NaiveDateTime) {
        let slot = match self.status {
            ApplicationStatus::Applied => &mut self.applied_date,
            ApplicationStatus::Interview => &mut self.interview_date,
            ApplicationStatus::Offer => &mut self.offer_date,
            ApplicationStatus::Rejected => &mut self.rejected_date,
            ApplicationStatus::Saved => return,
        };
        if slot.is_none() {
            *slot = Some(now);
        }
    }
}

impl Entity for Application {
    type Draft = ApplicationDraft;
    type Patch = ApplicationPatch;

    const KIND: ResourceKind = ResourceKind::Application;
    const PLACEMENT: Placement = Placement::Front;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

#[derive(Debug, Clone, Default)]
pub struct ApplicationDraft {
    pub job_id: Option<EntityId>,
    pub status: ApplicationStatus,
    pub resume_id: Option<EntityId>,
    pub notes: Option<String>,
    /// Display hints for the optimistic row; never sent
    pub company_name: Option<String>,
    pub job_title: Option<String>,
}

impl ApplicationDraft {
    pub fn for_job(job_id: EntityId) -> Self {
        Self {
            job_id: Some(job_id),
            ..Default::default()
        }
    }
}

impl Draft<Application> for ApplicationDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        match self.job_id {
            Some(id) if id > 0 => Ok(()),
            _ => Err(ValidationError::MissingReference {
                kind: ResourceKind::Application,
                field: "job_id",
            }),
        }
    }

    fn to_optimistic(&self, temp_id: EntityId, now: DateTime<Utc>) -> Application {
        Application {
            id: temp_id,
            job_id: self.job_id.unwrap_or_default(),
            status: self.status,
            resume_id: self.resume_id,
            notes: self.notes.clone(),
            company_name: self.company_name.clone(),
            job_title: self.job_title.clone(),
            created_at: Some(now),
            updated_at: Some(now),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ApplicationPatch {
    pub status: Option<ApplicationStatus>,
    pub resume_id: Option<EntityId>,
    pub notes: Option<String>,
    pub applied_date: Option<NaiveDateTime>,
    pub interview_date: Option<NaiveDateTime>,
    pub offer_date: Option<NaiveDateTime>,
    pub rejected_date: Option<NaiveDateTime>,
    pub rejection_reason: Option<String>,
    pub offer_details: Option<String>,
}

impl ApplicationPatch {
    pub fn status(status: ApplicationStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

impl Patch<Application> for ApplicationPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        match self.resume_id {
            Some(id) if id <= 0 => Err(ValidationError::InvalidValue {
                field: "resume_id",
                reason: format!("{} is not a saved resume", id),
            }),
            _ => Ok(()),
        }
    }

    fn apply(&self, app: &mut Application, now: DateTime<Utc>) {
        if let Some(v) = &self.resume_id {
            app.resume_id = Some(*v);
        }
        if let Some(v) = &self.notes {
            app.notes = Some(v.clone());
        }
        if let Some(v) = self.applied_date {
            app.applied_date = Some(v);
        }
        if let Some(v) = self.interview_date {
            app.interview_date = Some(v);
        }
        if let Some(v) = self.offer_date {
            app.offer_date = Some(v);
        }
        if let Some(v) = self.rejected_date {
            app.rejected_date = Some(v);
        }
        if let Some(v) = &self.rejection_reason {
            app.rejection_reason = Some(v.clone());
        }
        if let Some(v) = &self.offer_details {
            app.offer_details = Some(v.clone());
        }
        if let Some(status) = self.status {
            app.status = status;
            app.stamp_status_date(now.naive_utc());
        }
        app.updated_at = Some(now);
    }
}

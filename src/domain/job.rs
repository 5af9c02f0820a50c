//! Job Entity
//!
//! A posting the user is tracking, before or after applying.

use chrono::{DateTime, Utc};

use super::entity::{is_blank, reject_blank, Draft, Entity, EntityId, Patch, Placement, ResourceKind};
use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Job {
    pub id: EntityId,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub salary_range: Option<String>,
    pub description: Option<String>,
    pub apply_url: Option<String>,
    /// Parsed from the posting; composite on the wire
    pub skills: Vec<String>,
    pub seniority_level: Option<String>,
    pub source: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entity for Job {
    type Draft = JobDraft;
    type Patch = JobPatch;

    const KIND: ResourceKind = ResourceKind::Job;
    const PLACEMENT: Placement = Placement::Front;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

#[derive(Debug, Clone, Default)]
pub struct JobDraft {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary_range: Option<String>,
    pub description: Option<String>,
    pub apply_url: Option<String>,
    pub skills: Vec<String>,
    pub seniority_level: Option<String>,
    pub source: Option<String>,
}

impl JobDraft {
    pub fn new(title: impl Into<String>, company: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            company: Some(company.into()),
            ..Default::default()
        }
    }
}

impl Draft<Job> for JobDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        if is_blank(&self.title) {
            return Err(ValidationError::MissingField { kind: ResourceKind::Job, field: "title" });
        }
        if is_blank(&self.company) {
            return Err(ValidationError::MissingField { kind: ResourceKind::Job, field: "company" });
        }
        Ok(())
    }

    fn to_optimistic(&self, temp_id: EntityId, now: DateTime<Utc>) -> Job {
        Job {
            id: temp_id,
            title: self.title.clone().unwrap_or_default(),
            company: self.company.clone().unwrap_or_default(),
            location: self.location.clone(),
            salary_range: self.salary_range.clone(),
            description: self.description.clone(),
            apply_url: self.apply_url.clone(),
            skills: self.skills.clone(),
            seniority_level: self.seniority_level.clone(),
            source: self.source.clone(),
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct JobPatch {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary_range: Option<String>,
    pub description: Option<String>,
    pub apply_url: Option<String>,
    pub skills: Option<Vec<String>>,
    pub seniority_level: Option<String>,
    pub source: Option<String>,
}

impl Patch<Job> for JobPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        reject_blank("title", &self.title)?;
        reject_blank("company", &self.company)
    }

    fn apply(&self, job: &mut Job, now: DateTime<Utc>) {
        if let Some(v) = &self.title {
            job.title = v.clone();
        }
        if let Some(v) = &self.company {
            job.company = v.clone();
        }
        if let Some(v) = &self.location {
            job.location = Some(v.clone());
        }
        if let Some(v) = &self.salary_range {
            job.salary_range = Some(v.clone());
        }
        if let Some(v) = &self.description {
            job.description = Some(v.clone());
        }
        if let Some(v) = &self.apply_url {
            job.apply_url = Some(v.clone());
        }
        if let Some(v) = &self.skills {
            job.skills = v.clone();
        }
        if let Some(v) = &self.seniority_level {
            job.seniority_level = Some(v.clone());
        }
        if let Some(v) = &self.source {
            job.source = Some(v.clone());
        }
        job.updated_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_requires_title_and_company() {
        assert!(JobDraft::new("Engineer", "Acme").validate().is_ok());
        assert_eq!(
            JobDraft::new(" ", "Acme").validate(),
            Err(ValidationError::MissingField { kind: ResourceKind::Job, field: "title" })
        );
        assert!(JobDraft { title: Some("x".into()), ..Default::default() }.validate().is_err());
    }

    #[test]
    fn test_patch_touches_only_set_fields() {
        let now = Utc::now();
        let mut job = JobDraft::new("Engineer", "Acme").to_optimistic(-1, now);
        let patch = JobPatch { location: Some("Nairobi".into()), ..Default::default() };
        patch.apply(&mut job, now);
        assert_eq!(job.title, "Engineer");
        assert_eq!(job.location.as_deref(), Some("Nairobi"));
    }
}

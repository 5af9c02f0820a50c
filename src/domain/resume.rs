//! Resume Entity
//!
//! An uploaded resume file. Only the metadata lives in the store; the file
//! bytes travel once, in the upload request.

use chrono::{DateTime, Utc};

use super::entity::{Draft, Entity, EntityId, Patch, ResourceKind};
use crate::error::ValidationError;

/// Extensions the backend accepts
pub const SUPPORTED_RESUME_TYPES: &[&str] = &["pdf", "docx"];

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Resume {
    pub id: EntityId,
    pub filename: String,
    pub file_type: String,
    pub file_size: Option<u64>,
    pub tags: Vec<String>,
    pub extracted_text: Option<String>,
    /// `uploaded_at` on the wire
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entity for Resume {
    type Draft = ResumeDraft;
    type Patch = ResumePatch;

    const KIND: ResourceKind = ResourceKind::Resume;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

/// Lower-cased extension after the last dot
pub fn file_extension(filename: &str) -> Option<String> {
    let (stem, ext) = filename.trim().rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[derive(Debug, Clone, Default)]
pub struct ResumeDraft {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    pub tags: Vec<String>,
}

impl ResumeDraft {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
            ..Default::default()
        }
    }
}

impl Draft<Resume> for ResumeDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.filename.trim().is_empty() {
            return Err(ValidationError::MissingField { kind: ResourceKind::Resume, field: "filename" });
        }
        match file_extension(&self.filename) {
            Some(ext) if SUPPORTED_RESUME_TYPES.contains(&ext.as_str()) => Ok(()),
            _ => Err(ValidationError::InvalidValue {
                field: "filename",
                reason: "only PDF and DOCX resumes are supported".to_string(),
            }),
        }
    }

    fn to_optimistic(&self, temp_id: EntityId, now: DateTime<Utc>) -> Resume {
        Resume {
            id: temp_id,
            filename: self.filename.trim().to_string(),
            file_type: file_extension(&self.filename).unwrap_or_default(),
            file_size: Some(self.bytes.len() as u64),
            tags: self.tags.clone(),
            extracted_text: None,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

/// The backend only lets tags change after upload
#[derive(Debug, Clone, Default)]
pub struct ResumePatch {
    pub tags: Option<Vec<String>>,
}

impl Patch<Resume> for ResumePatch {
    fn apply(&self, resume: &mut Resume, now: DateTime<Utc>) {
        if let Some(tags) = &self.tags {
            resume.tags = tags.clone();
        }
        resume.updated_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_parsing() {
        assert_eq!(file_extension("cv.PDF").as_deref(), Some("pdf"));
        assert_eq!(file_extension("my.resume.docx").as_deref(), Some("docx"));
        assert_eq!(file_extension("resume"), None);
        assert_eq!(file_extension(".pdf"), None);
    }

    #[test]
    fn test_rejects_unsupported_types() {
        let draft = ResumeDraft::new("resume.txt", b"hi".to_vec());
        assert!(matches!(draft.validate(), Err(ValidationError::InvalidValue { .. })));
        assert!(ResumeDraft::new("resume.pdf", vec![]).validate().is_ok());
    }

    #[test]
    fn test_optimistic_resume_records_size() {
        let resume = ResumeDraft::new("cv.docx", vec![0; 42]).to_optimistic(-9, Utc::now());
        assert_eq!(resume.file_type, "docx");
        assert_eq!(resume.file_size, Some(42));
    }
}

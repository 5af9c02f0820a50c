use serde_json::Value;

use super::wire::{format_datetime, format_timestamp, WireObject, WireWriter};
use super::{WireBody, WireCodec};
use crate::domain::{Application, ApplicationDraft, ApplicationPatch, ApplicationStatus};

fn read_status(obj: &WireObject<'_>) -> ApplicationStatus {
    match obj.string(&["status"]) {
        Some(raw) => ApplicationStatus::parse(&raw).unwrap_or_else(|| {
            log::warn!("unknown application status {:?}, using Saved", raw);
            ApplicationStatus::Saved
        }),
        None => ApplicationStatus::Saved,
    }
}

/// `offer_details` is free text, but older rows hold a JSON object
fn read_offer_details(obj: &WireObject<'_>) -> Option<String> {
    match obj.field(&["offer_details", "offerDetails"])? {
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl WireCodec for Application {
    fn to_wire(&self) -> Value {
        let mut w = WireWriter::new();
        w.put("id", self.id)
            .put("job_id", self.job_id)
            .put("status", self.status.as_str())
            .put_opt("resume_id", self.resume_id)
            .put_opt("notes", self.notes.clone())
            .put_opt("applied_date", self.applied_date.as_ref().map(format_datetime))
            .put_opt("interview_date", self.interview_date.as_ref().map(format_datetime))
            .put_opt("offer_date", self.offer_date.as_ref().map(format_datetime))
            .put_opt("rejected_date", self.rejected_date.as_ref().map(format_datetime))
            .put_opt("rejection_reason", self.rejection_reason.clone())
            .put_opt("offer_details", self.offer_details.clone())
            .put_opt("company_name", self.company_name.clone())
            .put_opt("job_title", self.job_title.clone())
            .put_opt("created_at", self.created_at.as_ref().map(format_timestamp))
            .put_opt("updated_at", self.updated_at.as_ref().map(format_timestamp));
        w.finish()
    }

    fn from_wire(payload: &Value) -> Self {
        let obj = WireObject::new(payload, "application");
        Application {
            id: obj.i64(&["id"]).unwrap_or_default(),
            job_id: obj.i64(&["job_id", "jobId", "job.id"]).unwrap_or_default(),
            status: read_status(&obj),
            resume_id: obj.i64(&["resume_id", "resumeId"]),
            notes: obj.string(&["notes"]),
            applied_date: obj.datetime(&["applied_date", "appliedDate"]),
            interview_date: obj.datetime(&["interview_date", "interviewDate"]),
            offer_date: obj.datetime(&["offer_date", "offerDate"]),
            rejected_date: obj.datetime(&["rejected_date", "rejectedDate"]),
            rejection_reason: obj.string(&["rejection_reason", "rejectionReason"]),
            offer_details: read_offer_details(&obj),
            company_name: obj.string(&["company_name", "companyName", "company", "job.company"]),
            job_title: obj.string(&["job_title", "jobTitle", "job.title"]),
            created_at: obj.timestamp(&["created_at", "createdAt"]),
            updated_at: obj.timestamp(&["updated_at", "updatedAt"]),
        }
    }
}

impl WireBody for ApplicationDraft {
    fn wire_body(&self) -> Value {
        let mut w = WireWriter::new();
        w.put_opt("job_id", self.job_id)
            .put("status", self.status.as_str())
            .put_opt("resume_id", self.resume_id)
            .put_opt("notes", self.notes.clone());
        w.finish()
    }
}

impl WireBody for ApplicationPatch {
    fn wire_body(&self) -> Value {
        let mut w = WireWriter::new();
        w.put_some("status", self.status.map(|s| s.as_str()))
            .put_some("resume_id", self.resume_id)
            .put_some("notes", self.notes.clone())
            .put_some("applied_date", self.applied_date.as_ref().map(format_datetime))
            .put_some("interview_date", self.interview_date.as_ref().map(format_datetime))
            .put_some("offer_date", self.offer_date.as_ref().map(format_datetime))
            .put_some("rejected_date", self.rejected_date.as_ref().map(format_datetime))
            .put_some("rejection_reason", self.rejection_reason.clone())
            .put_some("offer_details", self.offer_details.clone());
        w.finish()
    }
}

use serde_json::Value;

use super::composite::encode_records;
use super::wire::{format_date, format_timestamp, WireObject, WireWriter};
use super::{WireBody, WireCodec};
use crate::domain::{Interview, InterviewDraft, InterviewPatch};

const DEFAULT_TYPE: &str = "phone";

impl WireCodec for Interview {
    fn to_wire(&self) -> Value {
        let mut w = WireWriter::new();
        w.put("id", self.id)
            .put("application_id", self.application_id)
            .put_opt("date", self.date.as_ref().map(format_date))
            .put("time", self.time.clone())
            .put("type", self.interview_type.clone())
            .put_opt("interviewer", self.interviewer.clone())
            .put_opt("location", self.location.clone())
            .put_opt("notes", self.notes.clone())
            .put("prep_checklist", encode_records(&self.prep_checklist))
            .put("reminders", self.reminders)
            .put_opt("company_name", self.company_name.clone())
            .put_opt("job_title", self.job_title.clone())
            .put_opt("created_at", self.created_at.as_ref().map(format_timestamp))
            .put_opt("updated_at", self.updated_at.as_ref().map(format_timestamp));
        w.finish()
    }

    fn from_wire(payload: &Value) -> Self {
        let obj = WireObject::new(payload, "interview");
        Interview {
            id: obj.i64(&["id"]).unwrap_or_default(),
            application_id: obj
                .i64(&["application_id", "applicationId", "application.id"])
                .unwrap_or_default(),
            date: obj.date(&["date", "interview_date", "interviewDate"]),
            time: obj.text(&["time", "interview_time", "interviewTime"]),
            interview_type: obj
                .string(&["type", "interview_type", "interviewType"])
                .unwrap_or_else(|| DEFAULT_TYPE.to_string()),
            interviewer: obj.string(&["interviewer"]),
            location: obj.string(&["location"]),
            notes: obj.string(&["notes"]),
            prep_checklist: obj.records(&["prep_checklist", "prepChecklist"]),
            reminders: obj.bool(&["reminders"]).unwrap_or(true),
            company_name: obj.string(&[
                "company_name",
                "companyName",
                "company",
                "application.company_name",
                "application.job.company",
            ]),
            job_title: obj.string(&[
                "job_title",
                "jobTitle",
                "application.job_title",
                "application.job.title",
            ]),
            created_at: obj.timestamp(&["created_at", "createdAt"]),
            updated_at: obj.timestamp(&["updated_at", "updatedAt"]),
        }
    }
}

impl WireBody for InterviewDraft {
    fn wire_body(&self) -> Value {
        let mut w = WireWriter::new();
        w.put_opt("application_id", self.application_id)
            .put_opt("date", self.date.as_ref().map(format_date))
            .put_opt("time", self.time.clone())
            .put("type", self.interview_type.clone().unwrap_or_else(|| DEFAULT_TYPE.to_string()))
            .put_opt("interviewer", self.interviewer.clone())
            .put_opt("location", self.location.clone())
            .put_opt("notes", self.notes.clone())
            .put("prep_checklist", encode_records(&self.prep_checklist))
            .put("reminders", self.reminders.unwrap_or(true));
        w.finish()
    }
}

impl WireBody for InterviewPatch {
    fn wire_body(&self) -> Value {
        let mut w = WireWriter::new();
        w.put_some("date", self.date.as_ref().map(format_date))
            .put_some("time", self.time.clone())
            .put_some("type", self.interview_type.clone())
            .put_some("interviewer", self.interviewer.clone())
            .put_some("location", self.location.clone())
            .put_some("notes", self.notes.clone())
            .put_some("prep_checklist", self.prep_checklist.as_deref().map(encode_records))
            .put_some("reminders", self.reminders);
        w.finish()
    }
}

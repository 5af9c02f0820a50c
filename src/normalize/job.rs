use serde_json::Value;

use super::wire::{format_timestamp, WireObject, WireWriter};
use super::composite::encode_delimited;
use super::{WireBody, WireCodec};
use crate::domain::{Job, JobDraft, JobPatch};

impl WireCodec for Job {
    fn to_wire(&self) -> Value {
        let mut w = WireWriter::new();
        w.put("id", self.id)
            .put("title", self.title.clone())
            .put("company", self.company.clone())
            .put_opt("location", self.location.clone())
            .put_opt("salary_range", self.salary_range.clone())
            .put_opt("description", self.description.clone())
            .put_opt("apply_url", self.apply_url.clone())
            .put("parsed_skills", encode_delimited(&self.skills))
            .put_opt("seniority_level", self.seniority_level.clone())
            .put_opt("source", self.source.clone())
            .put_opt("created_at", self.created_at.as_ref().map(format_timestamp))
            .put_opt("updated_at", self.updated_at.as_ref().map(format_timestamp));
        w.finish()
    }

    fn from_wire(payload: &Value) -> Self {
        let obj = WireObject::new(payload, "job");
        Job {
            id: obj.i64(&["id"]).unwrap_or_default(),
            title: obj.text(&["title", "job_title", "jobTitle"]),
            company: obj.text(&["company", "company_name", "companyName"]),
            location: obj.string(&["location"]),
            salary_range: obj.string(&["salary_range", "salaryRange"]),
            description: obj.string(&["description"]),
            apply_url: obj.string(&["apply_url", "applyUrl", "url"]),
            skills: obj.delimited(&["parsed_skills", "parsedSkills", "skills"]),
            seniority_level: obj.string(&["seniority_level", "seniorityLevel"]),
            source: obj.string(&["source"]),
            created_at: obj.timestamp(&["created_at", "createdAt"]),
            updated_at: obj.timestamp(&["updated_at", "updatedAt"]),
        }
    }
}

impl WireBody for JobDraft {
    fn wire_body(&self) -> Value {
        let mut w = WireWriter::new();
        w.put_opt("title", self.title.clone())
            .put_opt("company", self.company.clone())
            .put_opt("location", self.location.clone())
            .put_opt("salary_range", self.salary_range.clone())
            .put_opt("description", self.description.clone())
            .put_opt("apply_url", self.apply_url.clone())
            .put("parsed_skills", encode_delimited(&self.skills))
            .put_opt("seniority_level", self.seniority_level.clone())
            .put_opt("source", self.source.clone());
        w.finish()
    }
}

impl WireBody for JobPatch {
    fn wire_body(&self) -> Value {
        let mut w = WireWriter::new();
        w.put_some("title", self.title.clone())
            .put_some("company", self.company.clone())
            .put_some("location", self.location.clone())
            .put_some("salary_range", self.salary_range.clone())
            .put_some("description", self.description.clone())
            .put_some("apply_url", self.apply_url.clone())
            .put_some("parsed_skills", self.skills.as_deref().map(encode_delimited))
            .put_some("seniority_level", self.seniority_level.clone())
            .put_some("source", self.source.clone());
        w.finish()
    }
}

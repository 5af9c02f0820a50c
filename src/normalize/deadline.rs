use serde_json::Value;

use super::wire::{format_datetime, format_timestamp, WireObject, WireWriter};
use super::{WireBody, WireCodec};
use crate::domain::{Deadline, DeadlineDraft, DeadlinePatch, Priority};

const DEFAULT_TYPE: &str = "response";

impl WireCodec for Deadline {
    fn to_wire(&self) -> Value {
        let mut w = WireWriter::new();
        w.put("id", self.id)
            .put("application_id", self.application_id)
            .put("title", self.title.clone())
            .put_opt("due_date", self.due_date.as_ref().map(format_datetime))
            .put("type", self.deadline_type.clone())
            .put("priority", self.priority.as_str())
            .put("completed", self.completed)
            .put_opt("notes", self.notes.clone())
            .put_opt("created_at", self.created_at.as_ref().map(format_timestamp))
            .put_opt("updated_at", self.updated_at.as_ref().map(format_timestamp));
        w.finish()
    }

    fn from_wire(payload: &Value) -> Self {
        let obj = WireObject::new(payload, "deadline");
        let priority = match obj.string(&["priority"]) {
            Some(raw) => Priority::parse(&raw).unwrap_or_else(|| {
                log::warn!("unknown deadline priority {:?}, using medium", raw);
                Priority::Medium
            }),
            None => Priority::Medium,
        };
        Deadline {
            id: obj.i64(&["id"]).unwrap_or_default(),
            application_id: obj
                .i64(&["application_id", "applicationId", "application.id"])
                .unwrap_or_default(),
            title: obj.text(&["title"]),
            due_date: obj.datetime(&["due_date", "dueDate"]),
            deadline_type: obj
                .string(&["type", "deadline_type", "deadlineType"])
                .unwrap_or_else(|| DEFAULT_TYPE.to_string()),
            priority,
            completed: obj
                .bool(&["completed", "is_completed", "isCompleted"])
                .unwrap_or(false),
            notes: obj.string(&["notes"]),
            created_at: obj.timestamp(&["created_at", "createdAt"]),
            updated_at: obj.timestamp(&["updated_at", "updatedAt"]),
        }
    }
}

impl WireBody for DeadlineDraft {
    fn wire_body(&self) -> Value {
        let mut w = WireWriter::new();
        w.put_opt("application_id", self.application_id)
            .put_opt("title", self.title.clone())
            .put_opt("due_date", self.due_date.as_ref().map(format_datetime))
            .put("type", self.deadline_type.clone().unwrap_or_else(|| DEFAULT_TYPE.to_string()))
            .put("priority", self.priority.unwrap_or_default().as_str())
            .put_opt("notes", self.notes.clone());
        w.finish()
    }
}

impl WireBody for DeadlinePatch {
    fn wire_body(&self) -> Value {
        let mut w = WireWriter::new();
        w.put_some("title", self.title.clone())
            .put_some("due_date", self.due_date.as_ref().map(format_datetime))
            .put_some("type", self.deadline_type.clone())
            .put_some("priority", self.priority.map(|p| p.as_str()))
            .put_some("completed", self.completed)
            .put_some("notes", self.notes.clone());
        w.finish()
    }
}

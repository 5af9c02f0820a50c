use serde_json::Value;

use super::composite::encode_delimited;
use super::wire::{format_timestamp, WireObject, WireWriter};
use super::{WireBody, WireCodec};
use crate::domain::{file_extension, Resume, ResumePatch};

impl WireCodec for Resume {
    fn to_wire(&self) -> Value {
        let mut w = WireWriter::new();
        w.put("id", self.id)
            .put("filename", self.filename.clone())
            .put("file_type", self.file_type.clone())
            .put_opt("file_size", self.file_size)
            .put("tags", encode_delimited(&self.tags))
            .put_opt("extracted_text", self.extracted_text.clone())
            .put_opt("uploaded_at", self.created_at.as_ref().map(format_timestamp))
            .put_opt("updated_at", self.updated_at.as_ref().map(format_timestamp));
        w.finish()
    }

    fn from_wire(payload: &Value) -> Self {
        let obj = WireObject::new(payload, "resume");
        let filename = obj.text(&["filename", "file_name", "fileName", "name"]);
        let file_type = obj
            .string(&["file_type", "fileType"])
            .map(|t| t.to_ascii_lowercase())
            .or_else(|| file_extension(&filename))
            .unwrap_or_default();
        Resume {
            id: obj.i64(&["id"]).unwrap_or_default(),
            file_type,
            filename,
            file_size: obj
                .i64(&["file_size", "fileSize"])
                .and_then(|n| u64::try_from(n).ok()),
            tags: obj.delimited(&["tags"]),
            extracted_text: obj.string(&["extracted_text", "extractedText"]),
            created_at: obj.timestamp(&["uploaded_at", "uploadedAt", "created_at", "createdAt"]),
            updated_at: obj.timestamp(&["updated_at", "updatedAt"]),
        }
    }
}

/// Only the tags text; uploads go out as multipart forms
impl WireBody for ResumePatch {
    fn wire_body(&self) -> Value {
        let mut w = WireWriter::new();
        w.put_some("tags", self.tags.as_deref().map(encode_delimited));
        w.finish()
    }
}

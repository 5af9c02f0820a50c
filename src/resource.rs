//! Resource Endpoints
//!
//! Binds each entity kind to its endpoint family under `/api/<collection>`.
//! Every kind shares list and delete; create and update bodies differ, and
//! only some kinds have a single-entity get route.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use crate::domain::{
    file_extension, Application, Deadline, Entity, EntityId, Interview, Job, Offer, Resume,
};
use crate::gateway::{Method, Request, UploadForm};
use crate::normalize::{WireBody, WireCodec};

/// An entity kind the controller can drive against the backend
pub trait Resource: Entity + WireCodec {
    /// The backend takes PATCH for some kinds and PUT for others
    const UPDATE_METHOD: Method = Method::Patch;

    /// Path segment of the get-by-id route, `None` where the backend has none
    const GET_SEGMENT: Option<&'static str> = Some("get");

    fn base_path() -> String {
        format!("/api/{}", Self::KIND.collection())
    }

    fn list_request() -> Request {
        Request::new(Method::Get, format!("{}/list", Self::base_path()))
    }

    fn get_request(id: EntityId) -> Option<Request> {
        let segment = Self::GET_SEGMENT?;
        Some(Request::new(Method::Get, format!("{}/{}/{}", Self::base_path(), segment, id)))
    }

    fn delete_request(id: EntityId) -> Request {
        Request::new(Method::Delete, format!("{}/delete/{}", Self::base_path(), id))
    }

    fn create_request(draft: &Self::Draft) -> Request;

    fn update_request(id: EntityId, patch: &Self::Patch) -> Request;
}

macro_rules! json_resource {
    ($entity:ty, $update:expr, $get:expr) => {
        impl Resource for $entity {
            const UPDATE_METHOD: Method = $update;
            const GET_SEGMENT: Option<&'static str> = $get;

            fn create_request(draft: &Self::Draft) -> Request {
                Request::new(Method::Post, format!("{}/create", Self::base_path()))
                    .json(draft.wire_body())
            }

            fn update_request(id: EntityId, patch: &Self::Patch) -> Request {
                Request::new(
                    Self::UPDATE_METHOD,
                    format!("{}/update/{}", Self::base_path(), id),
                )
                .json(patch.wire_body())
            }
        }
    };
}

json_resource!(Job, Method::Patch, Some("get"));
json_resource!(Application, Method::Patch, Some("get"));
json_resource!(Interview, Method::Put, Some("interviews"));
json_resource!(Offer, Method::Put, None);
json_resource!(Deadline, Method::Put, None);

fn content_type_for(filename: &str) -> Option<String> {
    let mime = match file_extension(filename)?.as_str() {
        "pdf" => "application/pdf",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => return None,
    };
    Some(mime.to_string())
}

fn tags_query(tags: &[String]) -> String {
    let joined = tags
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(",");
    format!("tags={}", utf8_percent_encode(&joined, NON_ALPHANUMERIC))
}

/// Uploads are multipart; tags always travel in the query string
impl Resource for Resume {
    const GET_SEGMENT: Option<&'static str> = None;

    fn create_request(draft: &Self::Draft) -> Request {
        let mut path = format!("{}/upload", Self::base_path());
        if !draft.tags.is_empty() {
            path.push('?');
            path.push_str(&tags_query(&draft.tags));
        }
        let filename = draft.filename.trim().to_string();
        Request::new(Method::Post, path).multipart(UploadForm {
            field: "file",
            content_type: draft.content_type.clone().or_else(|| content_type_for(&filename)),
            filename,
            bytes: draft.bytes.clone(),
        })
    }

    fn update_request(id: EntityId, patch: &Self::Patch) -> Request {
        let mut path = format!("{}/update/{}", Self::base_path(), id);
        if let Some(tags) = &patch.tags {
            path.push('?');
            path.push_str(&tags_query(tags));
        }
        Request::new(Self::UPDATE_METHOD, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DeadlinePatch, JobPatch, ResumeDraft, ResumePatch};
    use crate::gateway::Body;
    use serde_json::json;

    #[test]
    fn test_endpoint_family() {
        assert_eq!(Job::list_request().path, "/api/jobs/list");
        let delete = Application::delete_request(9);
        assert_eq!(delete.method, Method::Delete);
        assert_eq!(delete.path, "/api/applications/delete/9");
    }

    #[test]
    fn test_get_routes_per_kind() {
        let path = |req: Option<Request>| req.map(|r| r.path);
        assert_eq!(path(Job::get_request(3)).as_deref(), Some("/api/jobs/get/3"));
        assert_eq!(path(Application::get_request(3)).as_deref(), Some("/api/applications/get/3"));
        assert_eq!(path(Interview::get_request(3)).as_deref(), Some("/api/interviews/interviews/3"));
        assert!(Offer::get_request(3).is_none());
        assert!(Deadline::get_request(3).is_none());
        assert!(Resume::get_request(3).is_none());
    }

    #[test]
    fn test_update_verbs_per_kind() {
        let put = Deadline::update_request(5, &DeadlinePatch::completed(true));
        assert_eq!(put.method, Method::Put);
        assert_eq!(put.path, "/api/deadlines/update/5");
        assert_eq!(put.body, Body::Json(json!({"completed": true})));

        let patch = Job::update_request(1, &JobPatch::default());
        assert_eq!(patch.method, Method::Patch);
    }

    #[test]
    fn test_resume_upload_is_multipart() {
        let mut draft = ResumeDraft::new("cv.pdf", vec![1, 2, 3]);
        draft.tags = vec!["Senior".into(), "Back end".into()];
        let req = Resume::create_request(&draft);
        assert_eq!(req.path, "/api/resumes/upload?tags=Senior%2CBack%20end");
        match req.body {
            Body::Multipart(form) => {
                assert_eq!(form.field, "file");
                assert_eq!(form.content_type.as_deref(), Some("application/pdf"));
                assert_eq!(form.bytes, vec![1, 2, 3]);
            }
            other => panic!("expected multipart body, got {:?}", other),
        }
    }

    #[test]
    fn test_resume_tags_update_uses_query() {
        let req = Resume::update_request(4, &ResumePatch { tags: Some(vec!["Python".into()]) });
        assert_eq!(req.method, Method::Patch);
        assert_eq!(req.path, "/api/resumes/update/4?tags=Python");
        assert_eq!(req.body, Body::Empty);
    }
}

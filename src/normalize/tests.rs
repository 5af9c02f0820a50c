use chrono::NaiveDate;
use proptest::prelude::*;
use serde_json::{json, Value};

use super::*;
use crate::domain::{
    Application, ApplicationStatus, ChecklistItem, CompositeRecord, Deadline, DeadlinePatch, Interview,
    InterviewPatch, Job, NegotiationEntry, Offer, OfferStatus, Priority, Resume,
};

fn indexed(records: &[Value]) -> Value {
    let map: serde_json::Map<String, Value> = records
        .iter()
        .enumerate()
        .map(|(i, v)| (i.to_string(), v.clone()))
        .collect();
    Value::String(Value::Object(map).to_string())
}

#[test]
fn test_interview_reads_camel_case_and_nested_names() {
    let payload = json!({
        "id": 42,
        "applicationId": 7,
        "interviewDate": "2025-03-01T00:00:00",
        "time": "10:00",
        "interviewType": "video",
        "prepChecklist": "[{\"task\":\"Research\",\"completed\":false}]",
        "application": {"job": {"company": "Acme", "title": "SRE"}}
    });
    let interview = Interview::from_wire(&payload);
    assert_eq!(interview.id, 42);
    assert_eq!(interview.application_id, 7);
    assert_eq!(interview.date, NaiveDate::from_ymd_opt(2025, 3, 1));
    assert_eq!(interview.interview_type, "video");
    assert_eq!(interview.prep_checklist, vec![ChecklistItem::new("Research")]);
    assert_eq!(interview.company_name.as_deref(), Some("Acme"));
    assert_eq!(interview.job_title.as_deref(), Some("SRE"));
    assert!(interview.reminders);
}

#[test]
fn test_interview_writes_encoded_checklist() {
    let interview = Interview {
        id: 3,
        application_id: 7,
        time: "10:00".into(),
        interview_type: "phone".into(),
        prep_checklist: vec![ChecklistItem::new("Research"), ChecklistItem::new("")],
        ..Default::default()
    };
    let wire = interview.to_wire();
    let text = wire["prep_checklist"].as_str().unwrap();
    let decoded: Value = serde_json::from_str(text).unwrap();
    assert_eq!(decoded, json!([{"task": "Research", "completed": false}]));
    assert_eq!(wire["type"], json!("phone"));
}

#[test]
fn test_corrupted_checklist_matches_proper_array() {
    let items = vec![json!({"task": "A", "completed": true}), json!({"task": "B", "completed": false})];
    let proper = Interview::from_wire(&json!({"id": 1, "prep_checklist": items}));
    let corrupted = Interview::from_wire(&json!({"id": 1, "prep_checklist": indexed(&items)}));
    assert_eq!(proper, corrupted);
    assert_eq!(proper.prep_checklist.len(), 2);
}

#[test]
fn test_unparseable_composite_yields_empty_entity_field() {
    let offer = Offer::from_wire(&json!({"id": 5, "benefits": "{oops", "negotiation_history": 12}));
    assert_eq!(offer.id, 5);
    assert!(offer.benefits.is_empty());
    assert!(offer.negotiation_history.is_empty());
    assert_eq!(offer.currency, "KES");
    assert_eq!(offer.salary_frequency, "monthly");
}

#[test]
fn test_application_reads_nested_job() {
    let payload = json!({
        "id": 9,
        "job_id": 2,
        "status": "applied",
        "applied_date": "2025-02-01T09:30:00",
        "offer_details": {"base": 1},
        "job": {"company": "Acme", "title": "Engineer"}
    });
    let app = Application::from_wire(&payload);
    assert_eq!(app.status, ApplicationStatus::Applied);
    assert_eq!(app.company_name.as_deref(), Some("Acme"));
    assert_eq!(app.job_title.as_deref(), Some("Engineer"));
    assert!(app.applied_date.is_some());
    assert_eq!(app.offer_details.as_deref(), Some("{\"base\":1}"));
}

#[test]
fn test_unknown_status_falls_back() {
    let app = Application::from_wire(&json!({"id": 1, "status": "ghosted"}));
    assert_eq!(app.status, ApplicationStatus::Saved);
    let offer = Offer::from_wire(&json!({"id": 1, "status": "maybe"}));
    assert_eq!(offer.status, OfferStatus::Pending);
}

#[test]
fn test_deadline_due_date_aliases() {
    let a = Deadline::from_wire(&json!({"id": 1, "due_date": "2025-03-01T09:00:00", "priority": "high"}));
    let b = Deadline::from_wire(&json!({"id": 1, "dueDate": "2025-03-01T09:00:00Z", "priority": "HIGH"}));
    assert_eq!(a.due_date, b.due_date);
    assert_eq!(a.priority, Priority::High);
    assert_eq!(a.deadline_type, "response");
}

#[test]
fn test_patch_bodies_are_partial() {
    let body = DeadlinePatch::completed(true).wire_body();
    assert_eq!(body, json!({"completed": true}));

    let body = InterviewPatch { notes: Some("bring laptop".into()), ..Default::default() }.wire_body();
    assert_eq!(body, json!({"notes": "bring laptop"}));
}

#[test]
fn test_skills_and_tags_accept_comma_text() {
    let job = Job::from_wire(&json!({"id": 1, "title": "x", "company": "y", "parsed_skills": "Python, Golang, Kubernetes"}));
    assert_eq!(job.skills, vec!["Python", "Golang", "Kubernetes"]);
    assert_eq!(job.to_wire()["parsed_skills"], json!("Python,Golang,Kubernetes"));

    let resume = Resume::from_wire(&json!({"id": 4, "filename": "cv.PDF", "tags": "Senior,Backend"}));
    assert_eq!(resume.tags, vec!["Senior", "Backend"]);
    assert_eq!(resume.file_type, "pdf");
}

#[test]
fn test_decode_list_envelopes() {
    let bare = json!([{"id": 1}, {"id": 2}, "junk"]);
    let wrapped = json!({"items": [{"id": 1}, {"id": 2}]});
    assert_eq!(decode_list::<Deadline>(&bare).len(), 2);
    assert_eq!(decode_list::<Deadline>(&wrapped).len(), 2);
    assert!(decode_list::<Deadline>(&json!({"detail": "nope"})).is_empty());
    assert!(decode_list::<Deadline>(&Value::Null).is_empty());
}

#[test]
fn test_non_object_entity_decodes_to_default() {
    let offer = Offer::from_wire(&json!([1, 2]));
    assert_eq!(offer.id, 0);
    assert!(offer.company_name.is_empty());
}

fn arb_task() -> impl Strategy<Value = ChecklistItem> {
    ("[a-zA-Z ]{0,10}", any::<bool>()).prop_map(|(task, completed)| ChecklistItem { task, completed })
}

fn arb_entry() -> impl Strategy<Value = NegotiationEntry> {
    ("2025-0[1-9]-1[0-9]", "[a-z0-9 ]{0,8}").prop_map(|(date, proposal)| NegotiationEntry { date, proposal })
}

/// Native array, encoded string, or corrupted indexed object
fn arb_form(records: Vec<Value>) -> impl Strategy<Value = Value> {
    let native = Value::Array(records.clone());
    let encoded = Value::String(native.to_string());
    let corrupt = indexed(&records);
    prop_oneof![Just(native), Just(encoded), Just(corrupt)]
}

fn arb_interview_payload() -> impl Strategy<Value = Value> {
    prop::collection::vec(arb_task(), 0..6)
        .prop_flat_map(|tasks| {
            let records: Vec<Value> = tasks.iter().map(WireRecord::to_value).collect();
            (arb_form(records), 1i64..1000, "[0-9]{2}:[0-9]{2}", any::<bool>())
        })
        .prop_map(|(checklist, id, time, reminders)| {
            json!({
                "id": id,
                "application_id": 3,
                "date": "2025-03-01",
                "time": time,
                "type": "onsite",
                "prep_checklist": checklist,
                "reminders": reminders,
            })
        })
}

fn arb_offer_payload() -> impl Strategy<Value = Value> {
    (
        prop::collection::vec(arb_entry(), 0..5),
        prop::collection::vec("[A-Za-z]{0,6}", 0..5),
    )
        .prop_flat_map(|(history, benefits)| {
            let history: Vec<Value> = history.iter().map(WireRecord::to_value).collect();
            let benefits: Vec<Value> = benefits.into_iter().map(Value::String).collect();
            (arb_form(history), arb_form(benefits), 1u32..500_000)
        })
        .prop_map(|(history, benefits, salary)| {
            json!({
                "id": 8,
                "application_id": 2,
                "company_name": "Acme",
                "position": "Engineer",
                "salary": salary,
                "deadline": "2025-04-10T17:00:00",
                "benefits": benefits,
                "negotiation_history": history,
            })
        })
}

/// Skill or tag text, commas and padding included
fn arb_label() -> impl Strategy<Value = String> {
    "[A-Za-z+ ,]{0,8}"
}

/// Any of the list forms, or plain comma text
fn arb_delimited() -> impl Strategy<Value = Value> {
    prop::collection::vec(arb_label(), 0..5).prop_flat_map(|labels| {
        let text = Value::String(labels.join(","));
        let records: Vec<Value> = labels.into_iter().map(Value::String).collect();
        prop_oneof![arb_form(records), Just(text)]
    })
}

fn arb_job_payload() -> impl Strategy<Value = Value> {
    (arb_delimited(), 1i64..1000, "[A-Za-z]{1,8}").prop_map(|(skills, id, title)| {
        json!({
            "id": id,
            "title": title,
            "company": "Acme",
            "location": "Remote",
            "parsed_skills": skills,
            "seniority_level": "senior",
        })
    })
}

fn arb_resume_payload() -> impl Strategy<Value = Value> {
    (arb_delimited(), 1i64..1000, 1i64..5_000_000).prop_map(|(tags, id, size)| {
        json!({
            "id": id,
            "filename": "cv.pdf",
            "file_size": size,
            "tags": tags,
        })
    })
}

fn drop_blank<R: CompositeRecord>(records: &mut Vec<R>) {
    records.retain(|r| r.is_valid());
}

proptest! {
    #[test]
    fn interview_survives_write_then_read(payload in arb_interview_payload()) {
        let first = Interview::from_wire(&payload);
        let second = Interview::from_wire(&first.to_wire());
        let mut expected = first.clone();
        drop_blank(&mut expected.prep_checklist);
        prop_assert_eq!(second, expected);
    }

    #[test]
    fn offer_survives_write_then_read(payload in arb_offer_payload()) {
        let first = Offer::from_wire(&payload);
        let second = Offer::from_wire(&first.to_wire());
        let mut expected = first.clone();
        drop_blank(&mut expected.benefits);
        drop_blank(&mut expected.negotiation_history);
        prop_assert_eq!(second, expected);
    }

    #[test]
    fn job_survives_write_then_read(payload in arb_job_payload()) {
        let first = Job::from_wire(&payload);
        let second = Job::from_wire(&first.to_wire());
        let mut expected = first.clone();
        drop_blank(&mut expected.skills);
        prop_assert_eq!(second, expected);
    }

    #[test]
    fn resume_survives_write_then_read(payload in arb_resume_payload()) {
        let first = Resume::from_wire(&payload);
        let second = Resume::from_wire(&first.to_wire());
        let mut expected = first.clone();
        drop_blank(&mut expected.tags);
        prop_assert_eq!(second, expected);
    }
}

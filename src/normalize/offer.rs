use serde_json::Value;

use super::composite::encode_records;
use super::wire::{format_date, format_datetime, format_timestamp, WireObject, WireWriter};
use super::{WireBody, WireCodec};
use crate::domain::{Offer, OfferDraft, OfferPatch, OfferStatus};

const DEFAULT_CURRENCY: &str = "KES";
const DEFAULT_FREQUENCY: &str = "monthly";

impl WireCodec for Offer {
    fn to_wire(&self) -> Value {
        let mut w = WireWriter::new();
        w.put("id", self.id)
            .put("application_id", self.application_id)
            .put("company_name", self.company_name.clone())
            .put("position", self.position.clone())
            .put("salary", self.salary)
            .put("currency", self.currency.clone())
            .put("salary_frequency", self.salary_frequency.clone())
            .put_opt("position_type", self.position_type.clone())
            .put_opt("location", self.location.clone())
            .put_opt("start_date", self.start_date.as_ref().map(format_date))
            .put_opt("offer_date", self.offer_date.as_ref().map(format_date))
            .put_opt("deadline", self.deadline.as_ref().map(format_datetime))
            .put("benefits", encode_records(&self.benefits))
            .put("negotiation_history", encode_records(&self.negotiation_history))
            .put_opt("notes", self.notes.clone())
            .put("status", self.status.as_str())
            .put_opt("created_at", self.created_at.as_ref().map(format_timestamp))
            .put_opt("updated_at", self.updated_at.as_ref().map(format_timestamp));
        w.finish()
    }

    fn from_wire(payload: &Value) -> Self {
        let obj = WireObject::new(payload, "offer");
        let status = match obj.string(&["status"]) {
            Some(raw) => OfferStatus::parse(&raw).unwrap_or_else(|| {
                log::warn!("unknown offer status {:?}, using pending", raw);
                OfferStatus::Pending
            }),
            None => OfferStatus::Pending,
        };
        Offer {
            id: obj.i64(&["id"]).unwrap_or_default(),
            application_id: obj
                .i64(&["application_id", "applicationId", "application.id"])
                .unwrap_or_default(),
            company_name: obj.text(&["company_name", "companyName", "company", "application.job.company"]),
            position: obj.text(&["position", "job_title", "jobTitle", "title"]),
            salary: obj.f64(&["salary", "salary_amount", "salaryAmount"]).unwrap_or_default(),
            currency: obj
                .string(&["currency"])
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            salary_frequency: obj
                .string(&["salary_frequency", "salaryFrequency"])
                .unwrap_or_else(|| DEFAULT_FREQUENCY.to_string()),
            position_type: obj.string(&["position_type", "positionType"]),
            location: obj.string(&["location"]),
            start_date: obj.date(&["start_date", "startDate"]),
            offer_date: obj.date(&["offer_date", "offerDate"]),
            deadline: obj.datetime(&["deadline", "response_deadline", "responseDeadline"]),
            benefits: obj.records(&["benefits"]),
            negotiation_history: obj.records(&["negotiation_history", "negotiationHistory"]),
            notes: obj.string(&["notes"]),
            status,
            created_at: obj.timestamp(&["created_at", "createdAt"]),
            updated_at: obj.timestamp(&["updated_at", "updatedAt"]),
        }
    }
}

impl WireBody for OfferDraft {
    fn wire_body(&self) -> Value {
        let mut w = WireWriter::new();
        w.put_opt("application_id", self.application_id)
            .put_opt("company_name", self.company_name.clone())
            .put_opt("position", self.position.clone())
            .put_opt("salary", self.salary)
            .put("currency", self.currency.clone().unwrap_or_else(|| DEFAULT_CURRENCY.to_string()))
            .put(
                "salary_frequency",
                self.salary_frequency.clone().unwrap_or_else(|| DEFAULT_FREQUENCY.to_string()),
            )
            .put_opt("position_type", self.position_type.clone())
            .put_opt("location", self.location.clone())
            .put_opt("start_date", self.start_date.as_ref().map(format_date))
            .put_opt("offer_date", self.offer_date.as_ref().map(format_date))
            .put_opt("deadline", self.deadline.as_ref().map(format_datetime))
            .put("benefits", encode_records(&self.benefits))
            .put_opt("notes", self.notes.clone())
            .put("status", self.status.unwrap_or_default().as_str());
        w.finish()
    }
}

impl WireBody for OfferPatch {
    fn wire_body(&self) -> Value {
        let mut w = WireWriter::new();
        w.put_some("company_name", self.company_name.clone())
            .put_some("position", self.position.clone())
            .put_some("salary", self.salary)
            .put_some("currency", self.currency.clone())
            .put_some("salary_frequency", self.salary_frequency.clone())
            .put_some("position_type", self.position_type.clone())
            .put_some("location", self.location.clone())
            .put_some("start_date", self.start_date.as_ref().map(format_date))
            .put_some("offer_date", self.offer_date.as_ref().map(format_date))
            .put_some("deadline", self.deadline.as_ref().map(format_datetime))
            .put_some("benefits", self.benefits.as_deref().map(encode_records))
            .put_some(
                "negotiation_history",
                self.negotiation_history.as_deref().map(encode_records),
            )
            .put_some("notes", self.notes.clone())
            .put_some("status", self.status.map(|s| s.as_str()));
        w.finish()
    }
}

//! Offer Entity
//!
//! Compensation details of an offer plus its negotiation trail.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::composite::NegotiationEntry;
use super::entity::{is_blank, reject_blank, Draft, Entity, EntityId, Patch, Placement, ResourceKind};
use crate::error::ValidationError;

pub const DEFAULT_CURRENCY: &str = "KES";
pub const DEFAULT_SALARY_FREQUENCY: &str = "monthly";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OfferStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
    Negotiating,
}

impl OfferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferStatus::Pending => "pending",
            OfferStatus::Accepted => "accepted",
            OfferStatus::Rejected => "rejected",
            OfferStatus::Negotiating => "negotiating",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(OfferStatus::Pending),
            "accepted" => Some(OfferStatus::Accepted),
            "rejected" | "declined" => Some(OfferStatus::Rejected),
            "negotiating" => Some(OfferStatus::Negotiating),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Offer {
    pub id: EntityId,
    pub application_id: EntityId,
    pub company_name: String,
    pub position: String,
    pub salary: f64,
    pub currency: String,
    pub salary_frequency: String,
    pub position_type: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub offer_date: Option<NaiveDate>,
    /// When the user has to respond
    pub deadline: Option<NaiveDateTime>,
    pub benefits: Vec<String>,
    pub negotiation_history: Vec<NegotiationEntry>,
    pub notes: Option<String>,
    pub status: OfferStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entity for Offer {
    type Draft = OfferDraft;
    type Patch = OfferPatch;

    const KIND: ResourceKind = ResourceKind::Offer;
    const PLACEMENT: Placement = Placement::Front;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

fn check_salary(salary: f64) -> Result<(), ValidationError> {
    if !salary.is_finite() || salary <= 0.0 {
        return Err(ValidationError::InvalidValue {
            field: "salary",
            reason: format!("{} is not a positive amount", salary),
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct OfferDraft {
    pub application_id: Option<EntityId>,
    pub company_name: Option<String>,
    pub position: Option<String>,
    pub salary: Option<f64>,
    pub currency: Option<String>,
    pub salary_frequency: Option<String>,
    pub position_type: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub offer_date: Option<NaiveDate>,
    pub deadline: Option<NaiveDateTime>,
    pub benefits: Vec<String>,
    pub notes: Option<String>,
    pub status: Option<OfferStatus>,
}

impl Draft<Offer> for OfferDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        let missing = |field| ValidationError::MissingField { kind: ResourceKind::Offer, field };
        if !matches!(self.application_id, Some(id) if id > 0) {
            return Err(ValidationError::MissingReference {
                kind: ResourceKind::Offer,
                field: "application_id",
            });
        }
        if is_blank(&self.company_name) {
            return Err(missing("company_name"));
        }
        if is_blank(&self.position) {
            return Err(missing("position"));
        }
        check_salary(self.salary.ok_or_else(|| missing("salary"))?)?;
        if self.start_date.is_none() {
            return Err(missing("start_date"));
        }
        if self.offer_date.is_none() {
            return Err(missing("offer_date"));
        }
        if self.deadline.is_none() {
            return Err(missing("deadline"));
        }
        Ok(())
    }

    fn to_optimistic(&self, temp_id: EntityId, now: DateTime<Utc>) -> Offer {
        Offer {
            id: temp_id,
            application_id: self.application_id.unwrap_or_default(),
            company_name: self.company_name.clone().unwrap_or_default(),
            position: self.position.clone().unwrap_or_default(),
            salary: self.salary.unwrap_or_default(),
            currency: self
                .currency
                .clone()
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            salary_frequency: self
                .salary_frequency
                .clone()
                .unwrap_or_else(|| DEFAULT_SALARY_FREQUENCY.to_string()),
            position_type: self.position_type.clone(),
            location: self.location.clone(),
            start_date: self.start_date,
            offer_date: self.offer_date,
            deadline: self.deadline,
            benefits: self.benefits.clone(),
            negotiation_history: Vec::new(),
            notes: self.notes.clone(),
            status: self.status.unwrap_or_default(),
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OfferPatch {
    pub company_name: Option<String>,
    pub position: Option<String>,
    pub salary: Option<f64>,
    pub currency: Option<String>,
    pub salary_frequency: Option<String>,
    pub position_type: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub offer_date: Option<NaiveDate>,
    pub deadline: Option<NaiveDateTime>,
    pub benefits: Option<Vec<String>>,
    pub negotiation_history: Option<Vec<NegotiationEntry>>,
    pub notes: Option<String>,
    pub status: Option<OfferStatus>,
}

impl OfferPatch {
    /// Append a negotiation round and mark the offer as negotiating
    pub fn negotiate(offer: &Offer, entry: NegotiationEntry) -> Self {
        let mut history = offer.negotiation_history.clone();
        history.push(entry);
        Self {
            negotiation_history: Some(history),
            status: Some(OfferStatus::Negotiating),
            ..Default::default()
        }
    }
}

impl Patch<Offer> for OfferPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        reject_blank("company_name", &self.company_name)?;
        reject_blank("position", &self.position)?;
        if let Some(salary) = self.salary {
            check_salary(salary)?;
        }
        Ok(())
    }

    fn apply(&self, offer: &mut Offer, now: DateTime<Utc>) {
        if let Some(v) = &self.company_name {
            offer.company_name = v.clone();
        }
        if let Some(v) = &self.position {
            offer.position = v.clone();
        }
        if let Some(v) = self.salary {
            offer.salary = v;
        }
        if let Some(v) = &self.currency {
            offer.currency = v.clone();
        }
        if let Some(v) = &self.salary_frequency {
            offer.salary_frequency = v.clone();
        }
        if let Some(v) = &self.position_type {
            offer.position_type = Some(v.clone());
        }
        if let Some(v) = &self.location {
            offer.location = Some(v.clone());
        }
        if let Some(v) = self.start_date {
            offer.start_date = Some(v);
        }
        if let Some(v) = self.offer_date {
            offer.offer_date = Some(v);
        }
        if let Some(v) = self.deadline {
            offer.deadline = Some(v);
        }
        if let Some(v) = &self.benefits {
            offer.benefits = v.clone();
        }
        if let Some(v) = &self.negotiation_history {
            offer.negotiation_history = v.clone();
        }
        if let Some(v) = &self.notes {
            offer.notes = Some(v.clone());
        }
        if let Some(v) = self.status {
            offer.status = v;
        }
        offer.updated_at = Some(now);
    }
}

//! Domain Layer
//!
//! Entities, their create drafts and update patches, and the validation
//! rules that run before anything is applied optimistically.
//! This layer knows nothing about the wire format or transport.

mod application;
mod composite;
mod deadline;
mod entity;
mod interview;
mod job;
mod offer;
mod resume;

pub use application::{Application, ApplicationDraft, ApplicationPatch, ApplicationStatus};
pub use composite::{valid_count, ChecklistItem, CompositeRecord, NegotiationEntry};
pub use deadline::{Deadline, DeadlineDraft, DeadlinePatch, Priority};
pub use entity::{is_temporary_id, Draft, Entity, EntityId, Patch, Placement, ResourceKind};
pub use interview::{Interview, InterviewDraft, InterviewPatch};
pub use job::{Job, JobDraft, JobPatch};
pub use offer::{Offer, OfferDraft, OfferPatch, OfferStatus};
pub use resume::{file_extension, Resume, ResumeDraft, ResumePatch, SUPPORTED_RESUME_TYPES};

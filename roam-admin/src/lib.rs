pub mod engine;
pub mod models;
pub mod processor;
pub mod repository;

pub use engine::ApprovalEngine;
pub use models::{AdminApproval, ApprovalAction, ApprovalStatus};
pub use processor::{ApprovalProcessor, CatalogProcessor};
pub use repository::{ApprovalDraft, ApprovalRepository};

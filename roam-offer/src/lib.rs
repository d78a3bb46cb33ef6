pub mod models;
pub mod repository;
pub mod validator;

pub use models::{Applicability, Discount, Offer, OfferDraft, OfferPatch, OfferStatus};
pub use repository::OfferRepository;
pub use validator::{validate, OfferError, OfferValidation};

pub mod pricing;
pub mod repository;
pub mod tour;

pub use pricing::{PriceTable, TravelerType};
pub use repository::TourRepository;
pub use tour::{City, Destination, StateRegion, Tour, TourDraft, TourPatch};

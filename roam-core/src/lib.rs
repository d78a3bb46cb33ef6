pub mod identity;
pub mod notify;
pub mod payment;
pub mod repository;

/// Error taxonomy shared by every engine in the workspace. Each variant
/// maps to one caller-visible outcome at the API boundary; none of them
/// is silently swallowed by core logic.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Missing or malformed required input. Never retried.
    #[error("{0}")]
    Validation(String),
    /// A referenced entity (tour, booking, approval) is absent.
    #[error("{0}")]
    NotFound(String),
    /// The actor lacks the capability for this entity.
    #[error("{0}")]
    Forbidden(String),
    /// State-machine violation or duplicate unique key.
    #[error("{0}")]
    Conflict(String),
    /// A collaborator (store, gateway, coupon lookup) failed.
    #[error("{0}")]
    Dependency(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

use crate::models::{AdminApproval, ApprovalAction, ApprovalStatus};
use async_trait::async_trait;
use roam_core::CoreResult;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ApprovalDraft {
    pub action: ApprovalAction,
    pub requested_by: Uuid,
    pub requested_by_name: String,
}

#[async_trait]
pub trait ApprovalRepository: Send + Sync {
    async fn insert(&self, draft: ApprovalDraft) -> CoreResult<AdminApproval>;

    async fn get(&self, id: Uuid) -> CoreResult<Option<AdminApproval>>;

    async fn list_all(&self) -> CoreResult<Vec<AdminApproval>>;

    async fn list_by_requester(&self, requester: Uuid) -> CoreResult<Vec<AdminApproval>>;

    /// Writes the terminal decision. Rejections carry a reason;
    /// approvals do not.
    async fn set_decision(
        &self,
        id: Uuid,
        status: ApprovalStatus,
        decided_by: Uuid,
        rejection_reason: Option<String>,
    ) -> CoreResult<()>;

    /// Compensating write used when the processor fails after an
    /// approval was recorded: clears the decision so the request can be
    /// decided again.
    async fn revert_to_pending(&self, id: Uuid) -> CoreResult<()>;
}

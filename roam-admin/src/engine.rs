use crate::models::{AdminApproval, ApprovalAction, ApprovalStatus};
use crate::processor::ApprovalProcessor;
use crate::repository::{ApprovalDraft, ApprovalRepository};
use roam_core::identity::{AdminUser, Role};
use roam_core::{CoreError, CoreResult};
use std::sync::Arc;
use uuid::Uuid;

/// Maker-checker workflow over staff-initiated changes. Admins and
/// Managers file requests; only a Superadmin decides them; the store
/// mutation happens through the processor strictly after the decision
/// is recorded.
pub struct ApprovalEngine {
    approvals: Arc<dyn ApprovalRepository>,
    processor: Arc<dyn ApprovalProcessor>,
}

impl ApprovalEngine {
    pub fn new(approvals: Arc<dyn ApprovalRepository>, processor: Arc<dyn ApprovalProcessor>) -> Self {
        Self {
            approvals,
            processor,
        }
    }

    /// File a request. Superadmins do not queue behind themselves; they
    /// apply changes directly and are turned away here.
    pub async fn request_approval(
        &self,
        requester: &AdminUser,
        action: ApprovalAction,
    ) -> CoreResult<AdminApproval> {
        match requester.role {
            Role::Superadmin => {
                return Err(CoreError::Forbidden(
                    "superadmins apply changes directly".into(),
                ))
            }
            Role::Admin | Role::Manager => {}
            Role::Customer => {
                return Err(CoreError::Forbidden(
                    "only staff may request approvals".into(),
                ))
            }
        }

        let approval = self
            .approvals
            .insert(ApprovalDraft {
                action,
                requested_by: requester.id,
                requested_by_name: requester.name.clone(),
            })
            .await?;

        tracing::info!(
            approval = %approval.id,
            action = approval.action.kind(),
            requested_by = %requester.id,
            "Approval requested"
        );
        Ok(approval)
    }

    /// Approve and apply. The decision row is written first; if the
    /// processor then fails, the request is reverted to PENDING so the
    /// decision can be retried, and the processor error propagates.
    pub async fn approve(&self, decider: &AdminUser, id: Uuid) -> CoreResult<AdminApproval> {
        let approval = self.decidable(decider, id).await?;

        self.approvals
            .set_decision(id, ApprovalStatus::Approved, decider.id, None)
            .await?;

        if let Err(err) = self.processor.apply(&approval.action).await {
            tracing::warn!(
                approval = %id,
                action = approval.action.kind(),
                "Processor failed, reverting approval: {}",
                err
            );
            if let Err(revert_err) = self.approvals.revert_to_pending(id).await {
                tracing::error!(
                    approval = %id,
                    "Failed to revert approval to pending: {}",
                    revert_err
                );
            }
            return Err(err);
        }

        tracing::info!(
            approval = %id,
            action = approval.action.kind(),
            decided_by = %decider.id,
            "Approval applied"
        );
        self.approvals
            .get(id)
            .await?
            .ok_or_else(|| CoreError::NotFound("approval request not found".into()))
    }

    /// Reject with a mandatory reason. Nothing is applied.
    pub async fn reject(
        &self,
        decider: &AdminUser,
        id: Uuid,
        reason: String,
    ) -> CoreResult<AdminApproval> {
        if reason.trim().is_empty() {
            return Err(CoreError::Validation(
                "a rejection reason is required".into(),
            ));
        }
        self.decidable(decider, id).await?;

        self.approvals
            .set_decision(id, ApprovalStatus::Rejected, decider.id, Some(reason))
            .await?;
        self.approvals
            .get(id)
            .await?
            .ok_or_else(|| CoreError::NotFound("approval request not found".into()))
    }

    /// Visibility: a Superadmin sees the whole queue, everyone else
    /// only their own requests.
    pub async fn list_for(&self, viewer: &AdminUser) -> CoreResult<Vec<AdminApproval>> {
        if viewer.role == Role::Superadmin {
            self.approvals.list_all().await
        } else {
            self.approvals.list_by_requester(viewer.id).await
        }
    }

    pub async fn get(&self, viewer: &AdminUser, id: Uuid) -> CoreResult<AdminApproval> {
        let approval = self
            .approvals
            .get(id)
            .await?
            .ok_or_else(|| CoreError::NotFound("approval request not found".into()))?;
        if viewer.role != Role::Superadmin && approval.requested_by != viewer.id {
            return Err(CoreError::Forbidden(
                "approval request belongs to another admin".into(),
            ));
        }
        Ok(approval)
    }

    async fn decidable(&self, decider: &AdminUser, id: Uuid) -> CoreResult<AdminApproval> {
        if decider.role != Role::Superadmin {
            return Err(CoreError::Forbidden(
                "only a superadmin may decide approvals".into(),
            ));
        }
        let approval = self
            .approvals
            .get(id)
            .await?
            .ok_or_else(|| CoreError::NotFound("approval request not found".into()))?;
        if approval.status != ApprovalStatus::Pending {
            return Err(CoreError::Conflict("already processed".into()));
        }
        Ok(approval)
    }
}

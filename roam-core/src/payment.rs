use crate::CoreResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An upfront order created with the payment provider. The provider
/// later returns a payment reference plus a signature that the API
/// boundary verifies before the booking engine ever sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentOrder {
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a provider-side order for the given amount.
    async fn create_order(&self, amount: i64, currency: &str) -> CoreResult<PaymentOrder>;
}

pub struct MockPaymentGateway;

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_order(&self, amount: i64, currency: &str) -> CoreResult<PaymentOrder> {
        // A real implementation calls the provider's order API and
        // stores the returned id for signature verification later.
        let order_id = format!("order_{}", Uuid::new_v4().simple());
        tracing::info!("Created mock payment order {} for {}", order_id, amount);
        Ok(PaymentOrder {
            order_id,
            amount,
            currency: currency.to_string(),
        })
    }
}

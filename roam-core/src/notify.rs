use crate::CoreResult;
use async_trait::async_trait;

/// Outcome of a single channel dispatch: a provider message id on
/// success. Channels are best-effort collaborators; a failed send is
/// logged by the worker and never retried or surfaced to the caller
/// whose request triggered it.
#[derive(Debug, Clone)]
pub struct DispatchReceipt {
    pub identifier: String,
}

#[async_trait]
pub trait EmailChannel: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> CoreResult<DispatchReceipt>;
}

#[async_trait]
pub trait SmsChannel: Send + Sync {
    async fn send(&self, to: &str, message: &str) -> CoreResult<DispatchReceipt>;
}

#[async_trait]
pub trait WhatsAppChannel: Send + Sync {
    async fn send(&self, to: &str, message: &str) -> CoreResult<DispatchReceipt>;
}

/// PDF receipt rendering, keyed by booking number.
#[async_trait]
pub trait ReceiptRenderer: Send + Sync {
    async fn render(&self, booking_number: &str, payload: &serde_json::Value)
        -> CoreResult<DispatchReceipt>;
}

// Log-only implementations. Real providers live outside this core; the
// worker is wired with these until one is plugged in.

pub struct LogEmailChannel;

#[async_trait]
impl EmailChannel for LogEmailChannel {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> CoreResult<DispatchReceipt> {
        tracing::info!("Email to {}: {}", to, subject);
        Ok(DispatchReceipt {
            identifier: format!("email-{}", chrono::Utc::now().timestamp_millis()),
        })
    }
}

pub struct LogSmsChannel;

#[async_trait]
impl SmsChannel for LogSmsChannel {
    async fn send(&self, to: &str, message: &str) -> CoreResult<DispatchReceipt> {
        tracing::info!("SMS to {}: {} chars", to, message.len());
        Ok(DispatchReceipt {
            identifier: format!("sms-{}", chrono::Utc::now().timestamp_millis()),
        })
    }
}

pub struct LogWhatsAppChannel;

#[async_trait]
impl WhatsAppChannel for LogWhatsAppChannel {
    async fn send(&self, to: &str, message: &str) -> CoreResult<DispatchReceipt> {
        tracing::info!("WhatsApp to {}: {} chars", to, message.len());
        Ok(DispatchReceipt {
            identifier: format!("wa-{}", chrono::Utc::now().timestamp_millis()),
        })
    }
}

pub struct LogReceiptRenderer;

#[async_trait]
impl ReceiptRenderer for LogReceiptRenderer {
    async fn render(
        &self,
        booking_number: &str,
        _payload: &serde_json::Value,
    ) -> CoreResult<DispatchReceipt> {
        tracing::info!("Rendered receipt for {}", booking_number);
        Ok(DispatchReceipt {
            identifier: format!("receipt-{}", booking_number),
        })
    }
}

use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Message;
use roam_core::notify::{EmailChannel, ReceiptRenderer, SmsChannel, WhatsAppChannel};
use roam_shared::events::{BookingCancelledEvent, BookingConfirmedEvent};
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct NotificationChannels {
    pub email: Arc<dyn EmailChannel>,
    pub sms: Arc<dyn SmsChannel>,
    pub whatsapp: Arc<dyn WhatsAppChannel>,
    pub receipts: Arc<dyn ReceiptRenderer>,
}

/// Drains booking events and fans them out to the notification
/// channels. Every dispatch is best-effort: a channel failure is
/// logged and dropped, never retried, never surfaced to the customer
/// whose request produced the event.
pub async fn start_notification_worker(
    brokers: String,
    group_id: String,
    topic: String,
    channels: NotificationChannels,
) {
    let consumer: StreamConsumer = match ClientConfig::new()
        .set("bootstrap.servers", &brokers)
        .set("group.id", &group_id)
        .set("enable.auto.commit", "true")
        .set("auto.offset.reset", "earliest")
        .create()
    {
        Ok(c) => c,
        Err(e) => {
            error!("Notification worker: consumer creation failed: {}", e);
            return;
        }
    };

    if let Err(e) = consumer.subscribe(&[topic.as_str()]) {
        error!("Notification worker: subscribe failed: {}", e);
        return;
    }

    info!("Notification worker started, listening on {}", topic);

    loop {
        match consumer.recv().await {
            Err(e) => error!("Kafka error: {}", e),
            Ok(m) => {
                let Some(Ok(payload)) = m.payload_view::<str>() else {
                    warn!("Skipping message with unreadable payload");
                    continue;
                };
                handle_event(payload, &channels).await;
            }
        }
    }
}

async fn handle_event(payload: &str, channels: &NotificationChannels) {
    if let Ok(event) = serde_json::from_str::<BookingConfirmedEvent>(payload) {
        notify_confirmed(event, channels).await;
    } else if let Ok(event) = serde_json::from_str::<BookingCancelledEvent>(payload) {
        notify_cancelled(event, channels).await;
    } else {
        warn!("Skipping unrecognized booking event payload");
    }
}

async fn notify_confirmed(event: BookingConfirmedEvent, channels: &NotificationChannels) {
    info!("Processing confirmation for {}", event.booking_number);

    let receipt_payload = serde_json::json!({
        "booking_number": event.booking_number,
        "final_amount": event.final_amount,
    });
    if let Err(e) = channels
        .receipts
        .render(&event.booking_number, &receipt_payload)
        .await
    {
        warn!("Receipt render failed for {}: {}", event.booking_number, e);
    }

    let email = event.contact_email.into_inner();
    let subject = format!("Booking {} confirmed", event.booking_number);
    let body = format!(
        "Your booking {} is confirmed. Amount paid: {}.",
        event.booking_number, event.final_amount
    );
    if let Err(e) = channels.email.send(&email, &subject, &body).await {
        warn!("Confirmation email failed for {}: {}", event.booking_number, e);
    }

    let phone = event.contact_phone.into_inner();
    let message = format!("Booking {} confirmed.", event.booking_number);
    if let Err(e) = channels.sms.send(&phone, &message).await {
        warn!("Confirmation SMS failed for {}: {}", event.booking_number, e);
    }
    if let Err(e) = channels.whatsapp.send(&phone, &message).await {
        warn!("Confirmation WhatsApp failed for {}: {}", event.booking_number, e);
    }
}

async fn notify_cancelled(event: BookingCancelledEvent, channels: &NotificationChannels) {
    info!("Processing cancellation for {}", event.booking_number);

    let email = event.contact_email.into_inner();
    let subject = format!("Booking {} cancelled", event.booking_number);
    let body = if event.refund_amount > 0 {
        format!(
            "Your booking {} was cancelled. A refund of {} ({}%) is on its way.",
            event.booking_number, event.refund_amount, event.refund_percentage
        )
    } else {
        format!(
            "Your booking {} was cancelled. No refund applies under the cancellation policy.",
            event.booking_number
        )
    };
    if let Err(e) = channels.email.send(&email, &subject, &body).await {
        warn!("Cancellation email failed for {}: {}", event.booking_number, e);
    }
}

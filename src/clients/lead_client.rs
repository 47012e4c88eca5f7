use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::{info, instrument};

use crate::clients::{ApiClient, ApiError};
use crate::model::{ContactFormData, NewsletterSubscription, Receipt, CONTACT_SOURCE};

/// Public lead capture: newsletter sign-ups and the contact form.
#[derive(Clone)]
pub struct LeadClient {
    api: ApiClient,
}

/// Payload with the send time attached.
#[derive(Serialize)]
struct Stamped<'a, T: Serialize> {
    #[serde(flatten)]
    payload: &'a T,
    timestamp: String,
}

fn stamp<T: Serialize>(payload: &T) -> Stamped<'_, T> {
    Stamped {
        payload,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

impl LeadClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    #[instrument(skip(self, subscription), fields(email = %subscription.email))]
    pub async fn subscribe_newsletter(
        &self,
        subscription: &NewsletterSubscription,
    ) -> Result<Receipt, ApiError> {
        let request = self
            .api
            .post("newsletter/subscribe")
            .json(&stamp(subscription));
        let envelope = self
            .api
            .send::<serde_json::Value>(request, "Subscription failed")
            .await?;
        info!("Subscribed");
        Ok(Receipt {
            message: envelope
                .message
                .unwrap_or_else(|| "Successfully subscribed to newsletter!".to_string()),
            data: envelope.data,
        })
    }

    /// Sends the contact form. A missing `source` is filled with the
    /// contact page tag.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn submit_contact(&self, form: &ContactFormData) -> Result<Receipt, ApiError> {
        let mut form = form.clone();
        form.source.get_or_insert_with(|| CONTACT_SOURCE.to_string());

        let request = self.api.post("contact/submit").json(&stamp(&form));
        let envelope = self
            .api
            .send::<serde_json::Value>(request, "Form submission failed")
            .await?;
        info!("Contact form submitted");
        Ok(Receipt {
            message: envelope.message.unwrap_or_else(|| {
                "Thank you for your message! We'll get back to you soon.".to_string()
            }),
            data: envelope.data,
        })
    }
}

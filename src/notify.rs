use crate::config::WebhookUrl;
use crate::error::Result;
use crate::listing::Listing;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

/// Accent color of the embedded card
pub const EMBED_COLOR: u32 = 0x7289DA;

/// Top-level message text
pub const MESSAGE_CONTENT: &str = "Nouvelle annonce trouvée !";

/// Delivers new listings somewhere a human will see them
///
/// Delivery is best-effort: implementations log failures and return normally.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, listing: &Listing);
}

#[async_trait]
impl<T: Notifier + ?Sized> Notifier for Box<T> {
    async fn notify(&self, listing: &Listing) {
        (**self).notify(listing).await
    }
}

/// JSON body posted to the webhook
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookPayload {
    pub content: String,
    pub embeds: Vec<Embed>,
}

/// Card embedded in a webhook message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
}

impl WebhookPayload {
    pub fn for_listing(listing: &Listing) -> Self {
        let description = format!(
            "**Prix** : {}\n**Année** : {}\n**Kilométrage** : {}\n\n[Voir l'annonce]({})",
            listing.price, listing.year, listing.mileage, listing.url
        );
        Self {
            content: MESSAGE_CONTENT.to_string(),
            embeds: vec![Embed {
                title: listing.title.clone(),
                description,
                color: EMBED_COLOR,
            }],
        }
    }
}

/// Posts one message per listing to a chat webhook
pub struct WebhookNotifier {
    client: reqwest::Client,
    endpoint: WebhookUrl,
}

impl WebhookNotifier {
    pub fn new(endpoint: WebhookUrl) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self { client, endpoint })
    }

    /// Sends the payload; transport errors and non-2xx statuses are errors
    pub async fn deliver(&self, payload: &WebhookPayload) -> Result<()> {
        self.client
            .post(self.endpoint.expose())
            .json(payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, listing: &Listing) {
        let payload = WebhookPayload::for_listing(listing);
        match self.deliver(&payload).await {
            Ok(()) => ::log::info!("Sent listing to webhook: {}", listing.url),
            Err(e) => ::log::error!("Failed to send listing {} to webhook: {}", listing.url, e),
        }
    }
}

/// Stand-in used when no webhook is configured
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, listing: &Listing) {
        ::log::info!(
            "New listing: {} | {} | {} | {} | {}",
            listing.title,
            listing.price,
            listing.year,
            listing.mileage,
            listing.url
        );
    }
}

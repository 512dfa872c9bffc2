// Mobile app webhook channel (`/api/webhook/{webhook_id}`)

pub mod client;
pub mod models;
pub mod request;

pub use client::MobileApp;
pub use request::{EncryptedEnvelope, WebhookRequest};

//! Built-in gateways that write deliveries to the log.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use tidewatch_core::traits::{
    DeliveryFailure, EmailGateway, PushContent, PushGateway, SmsGateway,
};

/// The three delivery gateways handed to the dispatcher.
#[derive(Clone)]
pub struct Gateways {
    /// Mobile push.
    pub push: Arc<dyn PushGateway>,
    /// SMS.
    pub sms: Arc<dyn SmsGateway>,
    /// Email.
    pub email: Arc<dyn EmailGateway>,
}

impl Gateways {
    /// Log-only gateways for all channels.
    pub fn logging() -> Self {
        let gateway = Arc::new(LogGateway);
        Self {
            push: gateway.clone(),
            sms: gateway.clone(),
            email: gateway,
        }
    }
}

impl std::fmt::Debug for Gateways {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateways").finish_non_exhaustive()
    }
}

/// Gateway that records every delivery as a structured log line and
/// always succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogGateway;

#[async_trait]
impl PushGateway for LogGateway {
    async fn send_push(&self, target: &str, content: &PushContent) -> Result<(), DeliveryFailure> {
        info!(channel = "push", target, title = %content.title, "Delivered");
        Ok(())
    }
}

#[async_trait]
impl SmsGateway for LogGateway {
    async fn send_sms(&self, number: &str, text: &str) -> Result<(), DeliveryFailure> {
        info!(channel = "sms", target = number, chars = text.chars().count(), "Delivered");
        Ok(())
    }
}

#[async_trait]
impl EmailGateway for LogGateway {
    async fn send_email(
        &self,
        address: &str,
        subject: &str,
        _body: &str,
    ) -> Result<(), DeliveryFailure> {
        info!(channel = "email", target = address, subject, "Delivered");
        Ok(())
    }
}

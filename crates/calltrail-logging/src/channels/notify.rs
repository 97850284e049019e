//! Mail and chat channels
//!
//! Both channels share one layer: rebuild the record from the event fields,
//! wrap it in the channel's envelope and hand it to the transport.

use super::{threshold_filter, BoxedLayer, DeliveryFailures, Envelope, Notification};
use crate::config::{ChatConfig, MailConfig};
use crate::fields::FieldVisitor;
use crate::transport::Transport;
use calltrail_core::Level;
use std::sync::Arc;
use tracing::Subscriber;
use tracing_subscriber::layer::Context as LayerContext;
use tracing_subscriber::Layer;

/// Layer turning records into notifications
pub struct NotifyLayer {
    envelope: Envelope,
    transport: Arc<dyn Transport>,
    failures: DeliveryFailures,
}

impl NotifyLayer {
    pub(crate) fn new(
        envelope: Envelope,
        transport: Arc<dyn Transport>,
        failures: DeliveryFailures,
    ) -> Self {
        Self {
            envelope,
            transport,
            failures,
        }
    }

    pub(crate) fn boxed_with_threshold(self, threshold: Level) -> BoxedLayer {
        self.with_filter(threshold_filter(threshold)).boxed()
    }
}

impl<S> Layer<S> for NotifyLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: LayerContext<'_, S>) {
        let Some(level) = Level::from_target(event.metadata().target()) else {
            return;
        };

        let notification = Notification {
            envelope: self.envelope.clone(),
            record: FieldVisitor::collect(event).into_record(level),
        };

        if let Err(err) = self.transport.deliver(&notification) {
            self.failures.push(err.with_channel(self.envelope.channel()));
        }
    }
}

impl From<&MailConfig> for Envelope {
    fn from(mail: &MailConfig) -> Self {
        Envelope::Mail {
            from: mail.sender.clone(),
            to: mail.recipients.clone(),
            subject: mail.subject.clone(),
        }
    }
}

impl From<&ChatConfig> for Envelope {
    fn from(chat: &ChatConfig) -> Self {
        Envelope::Chat {
            room: chat.room.clone(),
            notify: chat.notify,
            token: chat.token.clone(),
        }
    }
}

//! Output channels of a logger
//!
//! Every channel is a `tracing_subscriber` layer behind a per-layer filter
//! that admits only facade records at or above the channel's threshold. The
//! exact severity comes from the event target (see `Level::target`), so
//! NOTICE and INFO stay distinguishable although both map to
//! `tracing::Level::INFO`.

pub mod notify;
pub mod stream;

use calltrail_core::{Level, LogRecord};
use calltrail_core_types::schema::{CHANNEL_CHAT, CHANNEL_MAIL};
use calltrail_core_types::Sensitive;
use calltrail_errors::LogError;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};
use tracing::Metadata;
use tracing_subscriber::filter::{filter_fn, FilterFn};
use tracing_subscriber::{Layer, Registry};

pub(crate) type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Per-layer filter admitting records at `threshold` or above
pub fn threshold_filter(threshold: Level) -> FilterFn<impl Fn(&Metadata<'_>) -> bool> {
    filter_fn(move |metadata| {
        Level::from_target(metadata.target()).is_some_and(|level| level >= threshold)
    })
}

/// Addressing information of a notification
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "channel", rename_all = "lowercase")]
pub enum Envelope {
    Mail {
        from: String,
        to: Vec<String>,
        subject: String,
    },
    Chat {
        room: String,
        notify: bool,
        token: Sensitive<String>,
    },
}

impl Envelope {
    /// Name of the channel this envelope belongs to
    pub fn channel(&self) -> &'static str {
        match self {
            Envelope::Mail { .. } => CHANNEL_MAIL,
            Envelope::Chat { .. } => CHANNEL_CHAT,
        }
    }
}

/// A record addressed to a mail or chat destination
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub envelope: Envelope,
    pub record: LogRecord,
}

/// Delivery errors collected while a record is dispatched
///
/// Layers run inside the logger's own dispatch, so they park failures here
/// and the logger reports them once the record has left the dispatch. Each
/// failure is tagged with the emitting thread and only drained there, so a
/// logger shared between threads reports it under the record that caused it.
#[derive(Debug, Clone, Default)]
pub(crate) struct DeliveryFailures {
    errors: Arc<Mutex<Vec<(ThreadId, LogError)>>>,
}

impl DeliveryFailures {
    pub(crate) fn push(&self, err: LogError) {
        let thread = thread::current().id();
        self.errors.lock().map(|mut e| e.push((thread, err))).ok();
    }

    /// Failures parked by the current thread
    pub(crate) fn drain(&self) -> Vec<LogError> {
        let thread = thread::current().id();
        self.errors
            .lock()
            .map(|mut errors| {
                let (mine, others): (Vec<_>, Vec<_>) =
                    errors.drain(..).partition(|(id, _)| *id == thread);
                *errors = others;
                mine.into_iter().map(|(_, err)| err).collect()
            })
            .unwrap_or_default()
    }
}

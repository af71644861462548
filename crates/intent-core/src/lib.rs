//! Intent pipeline for the hub/spoke intent relay SDK.
//!
//! [`IntentService`] ties the other crates together: it resolves the user's
//! hub wallet, encodes the call batch, submits the spoke transaction and
//! waits for the relay to execute it on the hub. Progress is published on an
//! [`EventBus`]; side submissions such as solver notifications run detached
//! and never fail the main operation.

use async_trait::async_trait;
use thiserror::Error;

pub mod builder;
pub mod event_bus;
pub mod service;

/// Re-export implementations
pub mod implementations {
	pub mod http;
}

pub use builder::{BuilderError, IntentServiceBuilder};
pub use event_bus::EventBus;
pub use service::{ExecutedIntent, IntentRequest, IntentService};

/// Errors reported by execution notifiers.
#[derive(Debug, Error)]
pub enum NotifierError {
	#[error("Network error: {0}")]
	Network(String),
	#[error("Execution rejected: {0}")]
	Rejected(String),
}

/// Receives the hub transaction hash of every delivered intent.
///
/// Used to hand executed intents to a solver. Notifications run on a detached
/// task after delivery.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ExecutionNotifier: Send + Sync {
	async fn notify_executed(&self, intent_tx_hash: &str) -> Result<(), NotifierError>;
}

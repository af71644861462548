//! Cooperative cancellation of relay waits.
//!
//! Cancelling only stops the local wait. The spoke transaction and the relay
//! are unaffected, and the hash can be polled again later.

use tokio::sync::watch;

/// Owner side: cancels every [`CancelSignal`] created from it.
#[derive(Debug)]
pub struct CancelHandle {
	tx: watch::Sender<bool>,
}

/// Observer side, passed to a wait through `WaitOptions`.
#[derive(Debug, Clone)]
pub struct CancelSignal {
	rx: watch::Receiver<bool>,
}

impl CancelHandle {
	pub fn new() -> Self {
		let (tx, _) = watch::channel(false);
		Self { tx }
	}

	pub fn signal(&self) -> CancelSignal {
		CancelSignal {
			rx: self.tx.subscribe(),
		}
	}

	pub fn cancel(&self) {
		self.tx.send_replace(true);
	}
}

impl Default for CancelHandle {
	fn default() -> Self {
		Self::new()
	}
}

impl CancelSignal {
	pub fn is_cancelled(&self) -> bool {
		*self.rx.borrow()
	}

	/// Resolves once cancellation is requested. Never resolves if the handle
	/// is dropped without cancelling.
	pub async fn cancelled(&mut self) {
		if self.rx.wait_for(|cancelled| *cancelled).await.is_err() {
			std::future::pending::<()>().await;
		}
	}
}

//! Single-flight refresh coordination.
//!
//! [`RefreshCoordinator::run`] guarantees that at most one refresh exchange is in flight. The
//! first caller to arrive while the coordinator is idle becomes the leader and drives the
//! exchange; every caller arriving while it runs is queued as a waiter and suspended. When the
//! exchange settles, the leader drains the queue in FIFO order and hands each waiter the same
//! outcome, success or failure. If the leader is dropped before the exchange settles, the queue
//! is drained anyway and every waiter resolves to [`RefreshFailure::Interrupted`], so no caller
//! is left pending and the next caller starts a fresh exchange.

mod metrics;

pub use metrics::RefreshMetrics;

// std
use std::mem;
// crates.io
use futures::channel::oneshot;
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::RefreshFailure,
	obs::{self, CallKind, CallOutcome, CallSpan},
};

/// Outcome broadcast to the leader and every waiter of one exchange.
pub type RefreshOutcome = Result<TokenSecret, RefreshFailure>;

type Waiter = oneshot::Sender<RefreshOutcome>;

/// Ensures at most one refresh exchange runs at a time and fans its outcome out to every caller
/// that needed it.
#[derive(Debug, Default)]
pub struct RefreshCoordinator {
	state: Mutex<RefreshState>,
	metrics: RefreshMetrics,
}
impl RefreshCoordinator {
	/// Creates an idle coordinator.
	pub fn new() -> Self {
		Self::default()
	}

	/// Counters describing past exchanges.
	pub fn metrics(&self) -> &RefreshMetrics {
		&self.metrics
	}

	/// `true` while an exchange is in flight.
	pub fn is_refreshing(&self) -> bool {
		self.state.lock().refreshing
	}

	/// Number of callers currently queued behind the in-flight exchange.
	pub fn pending_waiters(&self) -> usize {
		self.state.lock().waiters.len()
	}

	/// Runs `exchange` if no exchange is in flight, otherwise waits for the in-flight one.
	///
	/// `exchange` is only invoked by the leader; waiters drop it unused.
	pub async fn run<F, Fut>(&self, exchange: F) -> RefreshOutcome
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = RefreshOutcome>,
	{
		const KIND: CallKind = CallKind::Refresh;

		match self.enter() {
			Ticket::Waiter(receiver) => {
				self.metrics.record_coalesced();

				receiver.await.unwrap_or(Err(RefreshFailure::Interrupted))
			},
			Ticket::Leader => {
				let span = CallSpan::new(KIND, "exchange");
				let mut lead = Lead { coordinator: self, settled: false };

				obs::record_call_outcome(KIND, CallOutcome::Attempt);
				self.metrics.record_exchange();

				let outcome = span.instrument(exchange()).await;

				lead.settle(&outcome);

				match &outcome {
					Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
					Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
				}

				outcome
			},
		}
	}

	fn enter(&self) -> Ticket {
		let mut state = self.state.lock();

		if state.refreshing {
			let (sender, receiver) = oneshot::channel();

			state.waiters.push_back(sender);
			obs::record_refresh_coalesced(state.waiters.len());

			Ticket::Waiter(receiver)
		} else {
			state.refreshing = true;

			Ticket::Leader
		}
	}

	fn drain(&self) -> VecDeque<Waiter> {
		let mut state = self.state.lock();

		state.refreshing = false;

		mem::take(&mut state.waiters)
	}
}

#[derive(Debug, Default)]
struct RefreshState {
	refreshing: bool,
	waiters: VecDeque<Waiter>,
}

enum Ticket {
	Leader,
	Waiter(oneshot::Receiver<RefreshOutcome>),
}

/// Leader-side handle; returns the coordinator to idle even if the leader is dropped mid-flight.
struct Lead<'a> {
	coordinator: &'a RefreshCoordinator,
	settled: bool,
}
impl Lead<'_> {
	fn settle(&mut self, outcome: &RefreshOutcome) {
		self.settled = true;

		let waiters = self.coordinator.drain();

		match outcome {
			Ok(_) => self.coordinator.metrics.record_success(),
			Err(_) => self.coordinator.metrics.record_failure(),
		}

		for waiter in waiters {
			// A waiter whose caller went away has nothing left to notify.
			let _ = waiter.send(outcome.clone());
		}
	}
}
impl Drop for Lead<'_> {
	fn drop(&mut self) {
		if !self.settled {
			self.coordinator.metrics.record_failure();

			// Dropped senders resolve their receivers to `Interrupted`.
			drop(self.coordinator.drain());
		}
	}
}

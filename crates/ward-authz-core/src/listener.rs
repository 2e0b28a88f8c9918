// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policy-change fan-out.
//!
//! The engine announces "policies changed" with no payload. The bus
//! re-dispatches that to every registered domain listener and to async
//! subscribers of its broadcast channel. Receivers must treat it as a full
//! invalidation.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::debug;

use crate::engine::ContextChangeListener;

const BROADCAST_CAPACITY: usize = 64;

/// A domain-level policy-change callback.
///
/// May be invoked on any thread.
pub trait PolicyChangeListener: Send + Sync {
	fn policy_changed(&self);
}

impl<F> PolicyChangeListener for F
where
	F: Fn() + Send + Sync,
{
	fn policy_changed(&self) {
		self()
	}
}

/// Payload-free change notice delivered to broadcast subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyChanged;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type ListenerMap = RwLock<BTreeMap<SubscriptionId, Arc<dyn PolicyChangeListener>>>;

#[derive(Clone)]
pub struct PolicyChangeBus {
	inner: Arc<BusInner>,
}

struct BusInner {
	listeners: ListenerMap,
	next_id: AtomicU64,
	sender: broadcast::Sender<PolicyChanged>,
}

impl PolicyChangeBus {
	pub fn new() -> Self {
		let (sender, _) = broadcast::channel(BROADCAST_CAPACITY);
		Self {
			inner: Arc::new(BusInner {
				listeners: RwLock::new(BTreeMap::new()),
				next_id: AtomicU64::new(1),
				sender,
			}),
		}
	}

	/// Registers `listener`; it stays registered until the returned
	/// [`Subscription`] is dropped or unsubscribed.
	pub fn register(&self, listener: Arc<dyn PolicyChangeListener>) -> Subscription {
		let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
		self.inner.listeners.write().insert(id, listener);
		debug!(subscription = id.0, "policy change listener registered");

		Subscription {
			id,
			bus: Arc::downgrade(&self.inner),
		}
	}

	/// Receiver for async consumers.
	pub fn subscribe(&self) -> broadcast::Receiver<PolicyChanged> {
		self.inner.sender.subscribe()
	}

	pub fn listener_count(&self) -> usize {
		self.inner.listeners.read().len()
	}

	/// Live broadcast receivers.
	pub fn subscriber_count(&self) -> usize {
		self.inner.sender.receiver_count()
	}

	/// True when anything would observe a notification.
	pub fn has_audience(&self) -> bool {
		self.listener_count() > 0 || self.subscriber_count() > 0
	}

	/// Invokes every registered listener once, then broadcasts.
	///
	/// Listeners run outside the registry lock and may register or drop
	/// subscriptions.
	pub fn notify(&self) {
		let listeners: Vec<_> = self.inner.listeners.read().values().cloned().collect();
		debug!(listeners = listeners.len(), "dispatching policy change");

		for listener in listeners {
			listener.policy_changed();
		}

		// No subscribers is fine.
		let _ = self.inner.sender.send(PolicyChanged);
	}
}

impl Default for PolicyChangeBus {
	fn default() -> Self {
		Self::new()
	}
}

impl ContextChangeListener for PolicyChangeBus {
	fn context_changed(&self) {
		self.notify();
	}
}

impl std::fmt::Debug for PolicyChangeBus {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PolicyChangeBus")
			.field("listeners", &self.listener_count())
			.finish()
	}
}

/// Handle for a registered listener. Dropping it unregisters the listener.
#[derive(Debug)]
#[must_use = "dropping a subscription unregisters its listener"]
pub struct Subscription {
	id: SubscriptionId,
	bus: Weak<BusInner>,
}

impl Subscription {
	pub fn id(&self) -> SubscriptionId {
		self.id
	}

	pub fn unsubscribe(self) {}

	/// Keeps the listener registered for the lifetime of the bus.
	pub fn detach(mut self) {
		self.bus = Weak::new();
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		if let Some(inner) = self.bus.upgrade() {
			inner.listeners.write().remove(&self.id);
			debug!(subscription = self.id.0, "policy change listener unregistered");
		}
	}
}

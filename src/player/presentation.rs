//! Presentation mode (fullscreen) coordination
//!
//! Fullscreen is owned by the host environment, not the player. A request
//! only asks for a change; the outcome is announced to every subscriber as
//! a [`PresentationChange`], and the host may change the mode on its own
//! (a user pressing Escape, for example). Players therefore derive their
//! fullscreen flag from notifications only.

use crate::utils::error::{PlayerError, Result};
use log::{debug, info};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// Identifies the element a player renders into
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerId(pub String);

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Handle returned by [`PresentationHost::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Presentation mode changed; carries the element now fullscreen, if any
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationChange {
    pub fullscreen_element: Option<ContainerId>,
}

/// Host-side presentation capability
pub trait PresentationHost: Send {
    /// Ask the host to present `container` fullscreen
    fn request_fullscreen(&mut self, container: &ContainerId) -> Result<()>;

    /// Ask the host to leave fullscreen
    fn exit_fullscreen(&mut self) -> Result<()>;

    /// Register for mode-change notifications
    fn subscribe(&mut self, sink: UnboundedSender<PresentationChange>) -> SubscriptionId;

    /// Stop delivering notifications to a subscriber
    fn unsubscribe(&mut self, id: SubscriptionId);
}

/// Whether the signal grants fullscreen requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresentationPolicy {
    #[default]
    Allow,
    Deny,
}

#[derive(Debug, Default)]
struct SignalInner {
    fullscreen_element: Option<ContainerId>,
    subscribers: Vec<(SubscriptionId, UnboundedSender<PresentationChange>)>,
    next_id: u64,
    policy: PresentationPolicy,
}

impl SignalInner {
    fn broadcast(&mut self) {
        let change = PresentationChange {
            fullscreen_element: self.fullscreen_element.clone(),
        };
        self.subscribers
            .retain(|(_, sink)| sink.send(change.clone()).is_ok());
    }
}

/// Process-wide presentation-mode signal
///
/// Cloning yields another handle onto the same signal, so every player in
/// the process observes the same mode.
#[derive(Debug, Clone, Default)]
pub struct PresentationSignal {
    inner: Arc<RwLock<SignalInner>>,
}

impl PresentationSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: PresentationPolicy) -> Self {
        let signal = Self::default();
        signal.set_policy(policy);
        signal
    }

    pub fn set_policy(&self, policy: PresentationPolicy) {
        self.inner.write().policy = policy;
    }

    /// Element currently presented fullscreen
    pub fn fullscreen_element(&self) -> Option<ContainerId> {
        self.inner.read().fullscreen_element.clone()
    }

    /// Leave fullscreen on the host's initiative (e.g. Escape key)
    pub fn exit_externally(&self) {
        let mut inner = self.inner.write();
        if inner.fullscreen_element.take().is_some() {
            info!("Fullscreen exited by host");
            inner.broadcast();
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.read().subscribers.len()
    }
}

impl PresentationHost for PresentationSignal {
    fn request_fullscreen(&mut self, container: &ContainerId) -> Result<()> {
        let mut inner = self.inner.write();
        if inner.policy == PresentationPolicy::Deny {
            return Err(PlayerError::presentation(format!(
                "Fullscreen request for {} denied",
                container
            )));
        }

        debug!("Fullscreen granted to {}", container);
        inner.fullscreen_element = Some(container.clone());
        inner.broadcast();
        Ok(())
    }

    fn exit_fullscreen(&mut self) -> Result<()> {
        let mut inner = self.inner.write();
        if inner.fullscreen_element.take().is_none() {
            return Err(PlayerError::presentation("Document not in fullscreen"));
        }

        inner.broadcast();
        Ok(())
    }

    fn subscribe(&mut self, sink: UnboundedSender<PresentationChange>) -> SubscriptionId {
        let mut inner = self.inner.write();
        inner.next_id += 1;
        let id = SubscriptionId(inner.next_id);
        inner.subscribers.push((id, sink));
        debug!("Presentation subscriber {:?} added", id);
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        let mut inner = self.inner.write();
        inner.subscribers.retain(|(sub, _)| *sub != id);
        debug!("Presentation subscriber {:?} removed", id);
    }
}

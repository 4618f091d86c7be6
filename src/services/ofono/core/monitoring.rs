use std::sync::{Arc, OnceLock, Weak};

use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::services::{
    common::Property,
    ofono::{Bus, Diagnostic, Interface, OfonoError, Signal, SignalStream},
};

/// Where a mirror's change subscription stands.
///
/// A mirror only follows the remote object while this is `Live`. The state
/// is sticky, so a failure is still visible to readers that look late.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionState {
    /// The subscription is being established in the background.
    Pending,
    /// Change notifications are being applied.
    Live,
    /// The subscription could not be established. The snapshot is frozen.
    Failed(String),
    /// The remote end closed the signal stream.
    Ended,
}

impl SubscriptionState {
    /// Whether change notifications are being applied.
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live)
    }
}

/// A mirror that can be fed from a signal subscription.
pub(crate) trait Mirror: Send + Sync + 'static {
    fn path(&self) -> &str;

    fn interface(&self) -> Interface;

    fn subscription(&self) -> &Subscription;

    /// Apply one signal. Called in arrival order, never concurrently.
    fn handle_signal(&self, signal: Signal);

    /// Log a diagnostic and publish it to listeners.
    fn report(&self, diagnostic: Diagnostic);

    fn unknown_signal(&self, signal: &Signal) {
        self.report(Diagnostic::UnknownSignal {
            path: self.path().to_string(),
            interface: self.interface(),
            member: signal.member().to_string(),
        });
    }
}

/// Owner-scoped handle on a mirror's monitor task.
///
/// Dropping it aborts the task, which drops the signal stream and with it
/// the remote subscription.
#[derive(Debug)]
pub(crate) struct Subscription {
    task: OnceLock<JoinHandle<()>>,
    state: Property<SubscriptionState>,
}

impl Default for Subscription {
    fn default() -> Self {
        Self {
            task: OnceLock::new(),
            state: Property::new(SubscriptionState::Pending),
        }
    }
}

impl Subscription {
    pub(crate) fn state(&self) -> &Property<SubscriptionState> {
        &self.state
    }

    fn attach(&self, task: JoinHandle<()>) {
        if let Err(task) = self.task.set(task) {
            task.abort();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.get() {
            task.abort();
        }
    }
}

/// Feeds signals from the bus into a mirror.
pub(crate) struct MirrorMonitor;

impl MirrorMonitor {
    /// Subscribe now and fail if the subscription cannot be established.
    pub(crate) async fn start<M: Mirror>(mirror: &Arc<M>, bus: &Bus) -> Result<(), OfonoError> {
        let state = mirror.subscription().state().clone();
        let signals = match bus.subscribe(mirror.path(), mirror.interface()).await {
            Ok(signals) => signals,
            Err(err) => {
                state.set(SubscriptionState::Failed(err.to_string()));
                return Err(err);
            }
        };
        state.set(SubscriptionState::Live);
        let weak = Arc::downgrade(mirror);

        let task = tokio::spawn(async move {
            Self::monitor(weak, signals, state).await;
        });
        mirror.subscription().attach(task);

        Ok(())
    }

    /// Subscribe in the background. A failure is recorded in the mirror's
    /// [`SubscriptionState`] and reported as a diagnostic.
    ///
    /// Must be called from within a Tokio runtime.
    pub(crate) fn spawn<M: Mirror>(mirror: &Arc<M>, bus: &Bus) {
        let weak = Arc::downgrade(mirror);
        let bus = bus.clone();
        let path = mirror.path().to_string();
        let interface = mirror.interface();
        let state = mirror.subscription().state().clone();

        let task = tokio::spawn(async move {
            match bus.subscribe(&path, interface).await {
                Ok(signals) => {
                    state.set(SubscriptionState::Live);
                    Self::monitor(weak, signals, state).await;
                }
                Err(err) => {
                    state.set(SubscriptionState::Failed(err.to_string()));
                    if let Some(mirror) = weak.upgrade() {
                        mirror.report(Diagnostic::SubscriptionFailed {
                            path,
                            interface,
                            reason: err.to_string(),
                        });
                    }
                }
            }
        });
        mirror.subscription().attach(task);
    }

    async fn monitor<M: Mirror>(
        weak: Weak<M>,
        mut signals: SignalStream,
        state: Property<SubscriptionState>,
    ) {
        while let Some(signal) = signals.next().await {
            let Some(mirror) = weak.upgrade() else {
                debug!("Mirror dropped, stopping monitor");
                return;
            };

            mirror.handle_signal(signal);
            drop(mirror);
        }

        debug!("Signal stream ended");
        state.set(SubscriptionState::Ended);
    }
}

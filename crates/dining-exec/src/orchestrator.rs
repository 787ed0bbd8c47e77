use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use dining_core::TransitionRequest;

use crate::contracts::now_ms;
use crate::contracts::TransitionEvent;
use crate::error::TransportError;
use crate::transport::StateTransport;

/// Runs one transition round trip at a time on a background thread and
/// reports each outcome on a channel the UI loop drains.
pub struct TransitionOrchestrator {
    transport: Arc<dyn StateTransport>,
    submit_delay: Duration,
    in_flight: Arc<AtomicBool>,
    events: mpsc::Sender<TransitionEvent>,
}

impl TransitionOrchestrator {
    pub fn new(
        transport: Arc<dyn StateTransport>,
        submit_delay: Duration,
    ) -> (Self, mpsc::Receiver<TransitionEvent>) {
        let (events, rx) = mpsc::channel();
        let orchestrator = Self {
            transport,
            submit_delay,
            in_flight: Arc::new(AtomicBool::new(false)),
            events,
        };
        (orchestrator, rx)
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn transport_label(&self) -> &str {
        self.transport.label()
    }

    pub fn submit(&self, request: TransitionRequest) -> Result<(), TransportError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::warn!(action = %request.action, "transition dropped, request already in flight");
            return Err(TransportError::Busy);
        }

        let transport = Arc::clone(&self.transport);
        let in_flight = Arc::clone(&self.in_flight);
        let events = self.events.clone();
        let delay = self.submit_delay;

        tracing::info!(
            action = %request.action,
            round = request.ui_state.selected_action_idx,
            transport = transport.label(),
            "submitting transition"
        );
        thread::spawn(move || {
            if !delay.is_zero() {
                thread::sleep(delay);
            }
            let started = Instant::now();
            let event = match transport.next_state(&request) {
                Ok(update) => {
                    let elapsed_ms = started.elapsed().as_millis() as u64;
                    tracing::info!(
                        elapsed_ms,
                        snapshot = update.is_full_snapshot(),
                        "transition answered"
                    );
                    TransitionEvent::Completed { update, elapsed_ms }
                }
                Err(error) => {
                    tracing::error!(%error, action = %request.action, "transition failed");
                    TransitionEvent::Failed {
                        error,
                        at_ms: now_ms(),
                    }
                }
            };
            in_flight.store(false, Ordering::SeqCst);
            if events.send(event).is_err() {
                tracing::debug!("transition outcome dropped, receiver closed");
            }
        });
        Ok(())
    }
}

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::{self, JoinHandle};

use crate::error::CollaboratorError;
use crate::generation::request::{GenerationRequest, ImagePayload, PendingRequest, RequestKind, Ticket};

/// What a service call produced. `Ok(None)` means the call succeeded but
/// no inline image came back, which callers treat as a failure.
pub type CollaboratorOutcome = Result<Option<ImagePayload>, CollaboratorError>;

/// External image-generation service.
pub trait GenerationCollaborator: Send + Sync {
    fn name(&self) -> &str;

    /// Run one request to completion. May block for a long time.
    fn generate(&self, request: &GenerationRequest) -> CollaboratorOutcome;
}

struct InFlight {
    ticket: Ticket,
    kind: RequestKind,
    rx: Receiver<CollaboratorOutcome>,
    handle: Option<JoinHandle<()>>,
}

/// Runs at most one service call on a worker thread and hands the outcome
/// back through a one-shot channel polled from the UI loop.
#[derive(Default)]
pub struct Dispatcher {
    in_flight: Option<InFlight>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn current(&self) -> Option<(Ticket, RequestKind)> {
        self.in_flight.as_ref().map(|f| (f.ticket, f.kind))
    }

    /// Send a request on a worker thread. `on_done` runs on the worker once
    /// the outcome is ready (used to wake the UI).
    ///
    /// Returns the request back if a call is already running.
    pub fn dispatch<F>(
        &mut self,
        pending: PendingRequest,
        collaborator: Arc<dyn GenerationCollaborator>,
        on_done: F,
    ) -> Result<(), PendingRequest>
    where
        F: FnOnce() + Send + 'static,
    {
        if self.in_flight.is_some() {
            return Err(pending);
        }

        let PendingRequest {
            ticket,
            kind,
            request,
        } = pending;
        let (tx, rx) = mpsc::channel();
        log::info!(
            "dispatching {} request {ticket} to {} ({} image parts)",
            kind.label(),
            collaborator.name(),
            request.parts().len()
        );

        let spawned = thread::Builder::new()
            .name(format!("generation-{}", kind.label()))
            .spawn(move || {
                let outcome = collaborator.generate(&request);
                let _ = tx.send(outcome);
                on_done();
            });

        match spawned {
            Ok(handle) => {
                self.in_flight = Some(InFlight {
                    ticket,
                    kind,
                    rx,
                    handle: Some(handle),
                });
            }
            Err(err) => {
                // Report the spawn failure through the normal completion path.
                log::error!("failed to spawn generation worker: {err}");
                let (tx, rx) = mpsc::channel();
                let _ = tx.send(Err(CollaboratorError::Transport(format!(
                    "could not start worker thread: {err}"
                ))));
                self.in_flight = Some(InFlight {
                    ticket,
                    kind,
                    rx,
                    handle: None,
                });
            }
        }
        Ok(())
    }

    /// Non-blocking check for a finished call.
    pub fn poll(&mut self) -> Option<(Ticket, CollaboratorOutcome)> {
        let flight = self.in_flight.as_ref()?;
        let outcome = match flight.rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(CollaboratorError::Transport(
                "generation worker exited without a response".to_string(),
            )),
        };
        let flight = self.in_flight.take()?;
        if let Some(handle) = flight.handle {
            if handle.join().is_err() {
                log::warn!("generation worker {} panicked", flight.ticket);
            }
        }
        Some((flight.ticket, outcome))
    }

    /// Block until the running call finishes.
    pub fn wait(&mut self) -> Option<(Ticket, CollaboratorOutcome)> {
        let flight = self.in_flight.take()?;
        let outcome = flight.rx.recv().unwrap_or_else(|_| {
            Err(CollaboratorError::Transport(
                "generation worker exited without a response".to_string(),
            ))
        });
        if let Some(handle) = flight.handle {
            if handle.join().is_err() {
                log::warn!("generation worker {} panicked", flight.ticket);
            }
        }
        Some((flight.ticket, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Echo {
        calls: AtomicUsize,
    }

    impl GenerationCollaborator for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn generate(&self, request: &GenerationRequest) -> CollaboratorOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(request.parts().first().cloned())
        }
    }

    fn pending(id: u64) -> PendingRequest {
        PendingRequest {
            ticket: Ticket(id),
            kind: RequestKind::Generate,
            request: GenerationRequest::new(vec![ImagePayload::png(vec![1, 2, 3])], "go"),
        }
    }

    #[test]
    fn one_call_at_a_time() {
        let echo = Arc::new(Echo {
            calls: AtomicUsize::new(0),
        });
        let mut dispatcher = Dispatcher::new();
        assert!(dispatcher.dispatch(pending(1), echo.clone(), || {}).is_ok());
        assert!(dispatcher.is_busy());
        assert_eq!(dispatcher.current(), Some((Ticket(1), RequestKind::Generate)));
        let rejected = dispatcher.dispatch(pending(2), echo.clone(), || {});
        assert_eq!(rejected.unwrap_err().ticket, Ticket(2));

        let (ticket, outcome) = dispatcher.wait().unwrap();
        assert_eq!(ticket, Ticket(1));
        assert_eq!(outcome.unwrap().unwrap().data, vec![1, 2, 3]);
        assert!(!dispatcher.is_busy());
        assert_eq!(dispatcher.current(), None);
        assert_eq!(echo.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn poll_eventually_delivers() {
        let echo = Arc::new(Echo {
            calls: AtomicUsize::new(0),
        });
        let mut dispatcher = Dispatcher::new();
        let (done_tx, done_rx) = mpsc::channel();
        dispatcher
            .dispatch(pending(7), echo, move || {
                let _ = done_tx.send(());
            })
            .unwrap();
        done_rx.recv().unwrap();

        let (ticket, outcome) = dispatcher.poll().unwrap();
        assert_eq!(ticket, Ticket(7));
        assert!(outcome.is_ok());
        assert!(dispatcher.poll().is_none());
    }

    struct Crashing;

    impl GenerationCollaborator for Crashing {
        fn name(&self) -> &str {
            "crashing"
        }

        fn generate(&self, _request: &GenerationRequest) -> CollaboratorOutcome {
            panic!("worker blew up");
        }
    }

    #[test]
    fn panicking_worker_is_reported_as_transport_failure() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.dispatch(pending(3), Arc::new(Crashing), || {}).unwrap();
        let (ticket, outcome) = dispatcher.wait().unwrap();
        assert_eq!(ticket, Ticket(3));
        assert!(matches!(outcome, Err(CollaboratorError::Transport(_))));
        assert!(!dispatcher.is_busy());
    }
}

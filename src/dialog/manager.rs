//! DialogManager: runs the engine and carries out its collaborator calls.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::backend::LeadBackend;
use crate::config::DialogConfig;

use super::effect::{Call, Effect};
use super::engine::Engine;
use super::event::{CallId, Event};

/// Drives one conversation: feeds events to the [`Engine`], executes the
/// calls it asks for, and feeds the completions back.
pub struct DialogManager {
    engine: Engine,
    backend: Arc<dyn LeadBackend>,
}

impl DialogManager {
    pub fn new(config: DialogConfig, backend: Arc<dyn LeadBackend>) -> Self {
        Self {
            engine: Engine::new(config),
            backend,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Handle an event and any calls it triggers, inline.
    ///
    /// Returns every non-call effect in emission order, including those
    /// produced by the completion events.
    pub async fn dispatch(&mut self, event: Event) -> Vec<Effect> {
        let mut queue = VecDeque::from([event]);
        let mut out = Vec::new();
        while let Some(event) = queue.pop_front() {
            for effect in self.engine.handle(event) {
                match effect {
                    Effect::Call(id, call) => {
                        queue.push_back(execute(self.backend.as_ref(), id, call).await);
                    }
                    other => out.push(other),
                }
            }
        }
        out
    }

    /// Run until the event channel closes and no call is outstanding, or the
    /// effect receiver goes away.
    ///
    /// Calls run concurrently with further input, which the engine ignores
    /// until the call completes.
    pub async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<Event>,
        effects: mpsc::UnboundedSender<Effect>,
    ) {
        let mut calls: JoinSet<Event> = JoinSet::new();

        loop {
            let event = tokio::select! {
                Some(event) = events.recv() => event,
                Some(done) = calls.join_next(), if !calls.is_empty() => match done {
                    Ok(event) => event,
                    Err(e) => {
                        warn!("Collaborator call task failed: {}", e);
                        continue;
                    }
                },
                else => break,
            };

            for effect in self.engine.handle(event) {
                match effect {
                    Effect::Call(id, call) => {
                        debug!(%id, call = call.name(), "Spawning collaborator call");
                        let backend = Arc::clone(&self.backend);
                        calls.spawn(async move { execute(backend.as_ref(), id, call).await });
                    }
                    other => {
                        if effects.send(other).is_err() {
                            info!("Presentation closed, stopping dialog");
                            return;
                        }
                    }
                }
            }
        }
        debug!("Dialog event stream ended");
    }
}

/// Perform one call and wrap its outcome as the matching completion event.
async fn execute(backend: &dyn LeadBackend, id: CallId, call: Call) -> Event {
    let name = call.name();
    let event = match call {
        Call::Upload { file, snapshot } => {
            Event::UploadFinished(id, backend.upload(file, &snapshot).await)
        }
        Call::Summarize { snapshot } => Event::SummaryFinished(id, backend.summarize(&snapshot).await),
        Call::Save { snapshot } => Event::SaveFinished(id, backend.save(&snapshot).await),
    };
    match &event {
        Event::UploadFinished(_, Err(e))
        | Event::SummaryFinished(_, Err(e))
        | Event::SaveFinished(_, Err(e)) => {
            warn!(%id, call = name, "Collaborator call failed: {}", e);
        }
        _ => debug!(%id, call = name, "Collaborator call succeeded"),
    }
    event
}

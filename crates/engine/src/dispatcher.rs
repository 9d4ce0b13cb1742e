//! Event dispatch — the engine's public entry point.
//!
//! One dispatch per triggering event: run the matching handler, assemble
//! the deliverable emails, pass the in-app intents through, and hand both
//! to the external sinks. A handler error aborts the whole dispatch before
//! anything reaches a sink, so the surrounding queue can retry the event
//! as a whole; re-running a dispatch recomputes the same output from the
//! same payload.

use innoflow_common::error::AppError;
use innoflow_common::types::RequestContext;

use crate::assembler::assemble_emails;
use crate::emitter::emit_in_app;
use crate::event::NotifierEvent;
use crate::handlers::run_handler;
use crate::ports::{DomainInfo, EmailSink, InAppStore, PreferenceResolver, RecipientDirectory};

/// Counts of what one dispatch handed to the sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSummary {
    pub emails_sent: usize,
    pub in_app_stored: usize,
}

/// Drives the handler → assembler/emitter → sink pipeline.
///
/// Collaborators are injected at construction; a dispatcher holds no
/// per-event state and can serve any number of events.
pub struct Dispatcher<D, R, P, E, S> {
    domain: D,
    directory: R,
    preferences: P,
    email_sink: E,
    in_app_store: S,
}

impl<D, R, P, E, S> Dispatcher<D, R, P, E, S>
where
    D: DomainInfo,
    R: RecipientDirectory,
    P: PreferenceResolver,
    E: EmailSink,
    S: InAppStore,
{
    pub fn new(domain: D, directory: R, preferences: P, email_sink: E, in_app_store: S) -> Self {
        Self {
            domain,
            directory,
            preferences,
            email_sink,
            in_app_store,
        }
    }

    pub fn email_sink(&self) -> &E {
        &self.email_sink
    }

    pub fn in_app_store(&self) -> &S {
        &self.in_app_store
    }

    /// Process one domain event end to end.
    pub async fn dispatch(
        &self,
        ctx: &RequestContext,
        event: &NotifierEvent,
    ) -> Result<DispatchSummary, AppError> {
        tracing::debug!(event = %event.kind(), "Dispatching notification event");

        let output = run_handler(ctx, event, &self.domain, &self.directory).await?;

        let emails = assemble_emails(output.emails, &self.directory, &self.preferences).await?;
        let in_app = emit_in_app(output.in_app);

        if !emails.is_empty() {
            self.email_sink.deliver(&emails).await?;
        }
        if !in_app.is_empty() {
            self.in_app_store.store(&in_app).await?;
        }

        tracing::info!(
            event = %event.kind(),
            emails = emails.len(),
            in_app = in_app.len(),
            "Notification event dispatched"
        );

        Ok(DispatchSummary {
            emails_sent: emails.len(),
            in_app_stored: in_app.len(),
        })
    }
}

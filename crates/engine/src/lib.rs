//! Notification composition and delivery fan-out engine.
//!
//! A domain event enters through [`dispatcher::Dispatcher::dispatch`] and:
//! 1. The matching event handler resolves recipients and enqueues email and
//!    in-app intents (`handlers`)
//! 2. The email assembler resolves addresses, applies preference filtering
//!    and locked-account rules, and injects display names (`assembler`)
//! 3. The in-app emitter passes in-app intents through unchanged (`emitter`)
//! 4. The results are handed to the delivery sink and notification store
//!
//! All collaborators (recipient directory, preference resolver, domain
//! info, sinks) are injected through the traits in [`ports`].

pub mod assembler;
pub mod dispatcher;
pub mod emitter;
pub mod event;
pub mod handlers;
pub mod ports;

#[cfg(test)]
pub(crate) mod testing;

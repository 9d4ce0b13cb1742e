//! In-app emission.
//!
//! In-app notifications pass through unchanged: visibility inside the
//! product is not opt-out, so no preference filtering applies and there
//! are no failure modes. The function exists so the dispatcher reads as
//! the same two-stage pipeline on both channels.

use innoflow_common::types::InAppIntent;

pub fn emit_in_app(intents: Vec<InAppIntent>) -> Vec<InAppIntent> {
    intents
}

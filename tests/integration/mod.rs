//! Library-level integration tests: whole edit transactions through a
//! [`blockedit::Session`], plus property tests over the bundled language.

mod common;
mod drag_and_drop;
mod edit_flows;
mod focus;
mod history;
mod properties;

//! End-to-end scenarios for the conveyor queue engine.
//!
//! This crate has no library code; the tests under `tests/` exercise the
//! public `conveyor-core` API the way an embedding application would.

//! Scenario tests for dispatching actions and sequences.
//!
//! ## Test Organization
//!
//! - `common`: Shared setup, flags, task builders and trait implementations
//! - `vanilla`: Lone actions and lone tasks
//! - `tasks`: Task results, async values and ordering
//! - `two_tasks`: The user/tenant bootstrap sequence
//! - `recovery`: Trailing recovery handlers
//!
//! ## Store
//!
//! Every test dispatches through a `Middleware<RecordingStore>`, then checks
//! `store().actions()` to see exactly what reached the store.

mod common;

mod vanilla;

//! Behavioural tests for the editing contract, run against every adapter
//! that supports the behaviour.

mod python_edits;
mod javascript_edits;
mod roundtrip;

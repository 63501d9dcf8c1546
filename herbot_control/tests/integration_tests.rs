//! Integration tests for the Herbot control crate.
//!
//! These tests run the coordinator and the scan orchestrator on the
//! simulation driver with a manual clock, so every scan finishes instantly
//! and every delay is exact.

mod integration;

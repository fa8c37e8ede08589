//! Core domain types
//!
//! This module contains the domain structures shared between the HTTP client
//! crate (which talks to the remote actor) and the server (which caches and
//! serves the results).

pub mod failure;
pub mod profile;
pub mod run;

//! Lookout Core
//!
//! Core types shared by the Lookout profile service.
//!
//! This crate contains:
//! - Domain types: profiles, remote run status, failure classification
//! - Username validation (the accepted lookup key grammar)
//! - DTOs: wire shapes of the remote scraping actor API

pub mod domain;
pub mod dto;
pub mod username;

pub use username::{InvalidUsername, Username};

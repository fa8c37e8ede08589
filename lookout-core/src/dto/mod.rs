//! Data Transfer Objects for the remote APIs
//!
//! Wire shapes exchanged with the scraping actor and the alert channel.
//! They are deliberately lenient (optional fields) so that a missing field
//! surfaces as a classified error rather than a parse failure.

pub mod alert;
pub mod run;

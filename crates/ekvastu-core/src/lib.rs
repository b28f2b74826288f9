//! EkVastu Core Types
//!
//! This crate provides the wire models shared by the EkVastu client crates:
//! - Tenant ping payload and the resolved tenant context
//! - Authentication requests, responses and token pairs
//! - Property, room, photo and profile records
//! - Room evaluation (questions, answers, score) and remedies

pub mod auth;
pub mod envelope;
pub mod evaluation;
pub mod profile;
pub mod property;
pub mod remedy;
pub mod tenant;

pub use auth::{AuthPayload, TokenPair};
pub use envelope::{ApiEnvelope, DeleteResponse};
pub use tenant::{SignInTenant, TenantContext, TenantPing};

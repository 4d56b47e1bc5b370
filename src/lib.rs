//! # leadgate — Contact-Form Intake Service
//!
//! Accepts contact-form submissions from a marketing website, validates and
//! deduplicates them, persists them to PostgreSQL, and dispatches
//! notification emails. Exposes an admin query/update surface over stored
//! submissions plus health and metrics endpoints.
//!
//! ## Pipeline
//!
//! Inbound request → field validation → spam-gate check → duplicate-window
//! probe → insert → fire-and-forget notifications → response. See
//! [`pipeline::IntakePipeline`] for the gate ordering contract.

pub mod config;
pub mod db;
pub mod notify;
pub mod pipeline;
pub mod prom_metrics;
pub mod rate_limit;
pub mod server;
pub mod spam;
pub mod submission;

//! Headless lead-capture wizard for franchise enquiry funnels.
//!
//! The core is a step flow controller walking a declarative plan: answers
//! accumulate into a [`record::LeadRecord`], every forward transition is
//! gated by a sync to the remote save endpoint, and partial progress
//! persists across runs through a [`store::SessionStore`]. The `wizard`
//! module is the thin terminal front end; everything else is presentation
//! agnostic.

pub mod cli;
pub mod config;
pub mod controller;
pub mod flow;
pub mod record;
pub mod status;
pub mod store;
pub mod sync;
pub mod validate;
pub mod wizard;
pub mod workflow;

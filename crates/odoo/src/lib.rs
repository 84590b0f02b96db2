//! XML-RPC client for the Odoo external API.
//!
//! Odoo exposes its RPC surface at two fixed endpoints relative to the host:
//! `/xmlrpc/2/common` for authentication and `/xmlrpc/2/object` for model
//! operations. This crate implements the two calls the lead intake service
//! needs (`authenticate` and `execute_kw(..., "crm.lead", "create", ...)`)
//! on top of a minimal XML-RPC codec.
//!
//! Business-logic errors come back as structured XML-RPC faults and are
//! surfaced as [`OdooError::Fault`], distinct from transport and decoding
//! failures.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod error;
pub mod xmlrpc;

pub use client::OdooClient;
pub use error::OdooError;

//! Lead intake: a stateless serverless handler that turns website
//! contact-form submissions into Odoo CRM opportunities.
//!
//! Each invocation walks the same linear pipeline: method gate → shared
//! secret gate → JSON parse → Odoo authenticate → `crm.lead` create →
//! best-effort email notification → response. Configuration is read once at
//! cold start and injected; the handler itself holds no mutable state.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod crm;
pub mod event;
pub mod handler;
pub mod notification;

pub use config::{Config, MailChannelKind};
pub use crm::CrmLeads;
pub use event::{ApiResponse, FunctionUrlEvent};
pub use handler::LeadIntake;

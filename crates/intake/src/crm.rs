//! Seam between the handler and the CRM client.

use async_trait::async_trait;
use serde_json::{Map, Value};

use odoo::{OdooClient, OdooError};

/// The two CRM operations the handler performs, in invocation order.
///
/// Mocked in handler tests; implemented by [`OdooClient`] in production.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CrmLeads: Send + Sync {
    /// Obtain a per-invocation session uid.
    async fn authenticate(&self) -> Result<u32, OdooError>;

    /// Create one `crm.lead` record, returning its id.
    async fn create_lead(&self, uid: u32, fields: &Map<String, Value>)
        -> Result<i64, OdooError>;
}

#[async_trait]
impl CrmLeads for OdooClient {
    async fn authenticate(&self) -> Result<u32, OdooError> {
        OdooClient::authenticate(self).await
    }

    async fn create_lead(
        &self,
        uid: u32,
        fields: &Map<String, Value>,
    ) -> Result<i64, OdooError> {
        OdooClient::create_lead(self, uid, fields).await
    }
}

//! HTTP client for the Odoo external API.

use serde_json::{Map, Value as Json};
use tracing::{debug, instrument};

use crate::error::OdooError;
use crate::xmlrpc::{self, Response, Value};

/// Path of the authentication endpoint, relative to the Odoo host.
const COMMON_ENDPOINT: &str = "/xmlrpc/2/common";
/// Path of the object (model operations) endpoint.
const OBJECT_ENDPOINT: &str = "/xmlrpc/2/object";

/// Model used for website opportunities.
const LEAD_MODEL: &str = "crm.lead";

/// XML-RPC client for one Odoo database.
///
/// Sessions are not cached: `authenticate` is called once per invocation and
/// the returned uid is handed back to `create_lead`.
#[derive(Debug, Clone)]
pub struct OdooClient {
    http: reqwest::Client,
    common_url: String,
    object_url: String,
    db: String,
    username: String,
    password: String,
}

impl OdooClient {
    /// Create a client for `https://<host>`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(host: &str, db: &str, username: &str, password: &str) -> Result<Self, OdooError> {
        Self::with_base_url(&format!("https://{host}"), db, username, password)
    }

    /// Create a client against an explicit base URL (used by tests to point
    /// at a local mock server).
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_base_url(
        base_url: &str,
        db: &str,
        username: &str,
        password: &str,
    ) -> Result<Self, OdooError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            common_url: format!("{base_url}{COMMON_ENDPOINT}"),
            object_url: format!("{base_url}{OBJECT_ENDPOINT}"),
            db: db.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    /// Authenticate against the configured database.
    ///
    /// Odoo answers with the numeric uid on success and boolean `false` on
    /// bad credentials; the latter maps to [`OdooError::AuthenticationFailed`].
    #[instrument(skip(self), fields(db = %self.db))]
    pub async fn authenticate(&self) -> Result<u32, OdooError> {
        let params = [
            Value::Str(self.db.clone()),
            Value::Str(self.username.clone()),
            Value::Str(self.password.clone()),
            Value::Struct(Vec::new()),
        ];
        let value = self.call(&self.common_url, "authenticate", &params).await?;

        if value.is_falsy() {
            return Err(OdooError::AuthenticationFailed);
        }
        match value.as_i64().and_then(|i| u32::try_from(i).ok()) {
            Some(uid) => {
                debug!(uid, "authenticated with Odoo");
                Ok(uid)
            }
            None => Err(OdooError::Unexpected(format!(
                "authenticate returned {value:?}"
            ))),
        }
    }

    /// Create a `crm.lead` record and return its id.
    #[instrument(skip(self, fields), fields(db = %self.db, uid))]
    pub async fn create_lead(
        &self,
        uid: u32,
        fields: &Map<String, Json>,
    ) -> Result<i64, OdooError> {
        let value = self
            .execute_kw(uid, LEAD_MODEL, "create", vec![Value::from(fields)])
            .await?;
        value.as_i64().ok_or_else(|| {
            OdooError::Unexpected(format!("create returned {value:?} instead of an id"))
        })
    }

    /// Generic `execute_kw` call against the object endpoint.
    pub async fn execute_kw(
        &self,
        uid: u32,
        model: &str,
        method: &str,
        args: Vec<Value>,
    ) -> Result<Value, OdooError> {
        let params = [
            Value::Str(self.db.clone()),
            Value::Int(i64::from(uid)),
            Value::Str(self.password.clone()),
            Value::Str(model.to_string()),
            Value::Str(method.to_string()),
            Value::Array(args),
        ];
        self.call(&self.object_url, "execute_kw", &params).await
    }

    async fn call(&self, url: &str, method: &str, params: &[Value]) -> Result<Value, OdooError> {
        let body = xmlrpc::encode_request(method, params);
        debug!(url, method, "sending XML-RPC request");

        let response = self
            .http
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "text/xml")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(OdooError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        match xmlrpc::parse_response(&text).map_err(|e| OdooError::Parse(e.to_string()))? {
            Response::Success(value) => Ok(value),
            Response::Fault { code, message } => Err(OdooError::Fault { code, message }),
        }
    }
}

//! The linear request handler.
//!
//! One invocation walks a fixed sequence of gates; each either passes the
//! request through or terminates with a specific response. There are no
//! loops and no retries — a failed remote call is final for the invocation.

use serde_json::Value;
use tracing::{error, info, warn};

use notify::{parse_recipients, Notifier};
use odoo::OdooError;

use crate::config::Config;
use crate::crm::CrmLeads;
use crate::event::{ApiResponse, FunctionUrlEvent};
use crate::notification::build_notification;

const INVALID_BODY: &str = "Invalid request body. Expecting JSON.";

/// Stateless handler for one lead submission.
///
/// Holds only read-only configuration and clients; safe to share across
/// concurrent invocations.
pub struct LeadIntake<C> {
    config: Config,
    crm: C,
    notifier: Notifier,
}

impl<C: CrmLeads> LeadIntake<C> {
    /// Assemble a handler from its collaborators.
    pub const fn new(config: Config, crm: C, notifier: Notifier) -> Self {
        Self {
            config,
            crm,
            notifier,
        }
    }

    /// Process one inbound event into a response. Never returns an error;
    /// every failure maps to an HTTP-style response.
    pub async fn handle(&self, event: &FunctionUrlEvent) -> ApiResponse {
        // Gate 1: method.
        match event.method() {
            "OPTIONS" => return ApiResponse::no_content(),
            "POST" => {}
            other => {
                warn!(method = %other, "rejected non-POST request");
                return ApiResponse::error(405, "Method Not Allowed");
            }
        }

        // Gate 2: shared-secret auth, only when both secrets are configured.
        if let (Some(id), Some(secret)) = (&self.config.client_id, &self.config.client_secret) {
            let id_ok = event.header("x-client-id").is_some_and(|v| v == id);
            let secret_ok = event.header("x-client-secret").is_some_and(|v| v == secret);
            if !(id_ok && secret_ok) {
                warn!("authentication failed: invalid client id or secret");
                return ApiResponse::error(401, "Unauthorized");
            }
        }

        // Gate 3: body parse. Absent body means an empty record.
        let Ok(body) = event.decoded_body() else {
            return ApiResponse::error(400, INVALID_BODY);
        };
        let raw = body.unwrap_or_else(|| "{}".to_string());
        let mut fields = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => map,
            // A non-object can never be a CRM record.
            Ok(_) | Err(_) => return ApiResponse::error(400, INVALID_BODY),
        };

        // Gate 4: the record type is always an opportunity, whatever the
        // caller claimed.
        fields.insert(
            "type".to_string(),
            Value::String("opportunity".to_string()),
        );

        // Gate 5: CRM session.
        let uid = match self.crm.authenticate().await {
            Ok(uid) => uid,
            Err(e) => {
                error!(error = %e, "Odoo authentication failed");
                return ApiResponse::error(
                    500,
                    &format!("Could not authenticate with Odoo: {e}"),
                );
            }
        };

        // Gate 6: record creation. Business faults are surfaced with their
        // message; anything else gets a generic body and a logged detail.
        let lead_id = match self.crm.create_lead(uid, &fields).await {
            Ok(id) => id,
            Err(OdooError::Fault { code, message }) => {
                error!(code, fault = %message, "Odoo rejected the lead");
                return ApiResponse::error(500, &format!("Odoo API error: {message}"));
            }
            Err(e) => {
                error!(error = %e, "unexpected failure creating lead");
                return ApiResponse::error(500, "An unexpected server error occurred.");
            }
        };
        info!(lead_id, "created opportunity");

        // Gate 7: best-effort notification; never alters the response.
        self.send_notification(&fields, lead_id).await;

        ApiResponse::created(lead_id)
    }

    async fn send_notification(
        &self,
        fields: &serde_json::Map<String, Value>,
        lead_id: i64,
    ) {
        if !self.notifier.enabled() {
            return;
        }
        let Some(raw) = &self.config.notification_emails else {
            return;
        };
        let recipients = parse_recipients(raw);
        if recipients.is_empty() {
            warn!("NOTIFICATION_EMAIL is set but contains no valid email addresses");
            return;
        }
        let message = build_notification(fields, lead_id, recipients);
        self.notifier.notify(&message).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::json;

    use notify::{ChannelError, LeadNotification, MailChannel};

    use crate::config::MailChannelKind;
    use crate::crm::MockCrmLeads;
    use crate::event::{HttpContext, RequestContext};

    /// Records sends; optionally fails every one of them.
    struct TestChannel {
        sent: Arc<Mutex<Vec<LeadNotification>>>,
        fail: bool,
    }

    #[async_trait]
    impl MailChannel for TestChannel {
        fn name(&self) -> &'static str {
            "test"
        }
        fn enabled(&self) -> bool {
            true
        }
        async fn send(&self, message: &LeadNotification) -> Result<(), ChannelError> {
            self.sent.lock().unwrap().push(message.clone());
            if self.fail {
                return Err(ChannelError::Ses("simulated outage".into()));
            }
            Ok(())
        }
    }

    struct Harness {
        intake: LeadIntake<MockCrmLeads>,
        sent: Arc<Mutex<Vec<LeadNotification>>>,
    }

    fn harness(config: Config, crm: MockCrmLeads, fail_mail: bool) -> Harness {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let notifier = Notifier::new(Arc::new(TestChannel {
            sent: sent.clone(),
            fail: fail_mail,
        }));
        Harness {
            intake: LeadIntake::new(config, crm, notifier),
            sent,
        }
    }

    fn test_config() -> Config {
        Config {
            odoo_host: "odoo.example.com".into(),
            odoo_db: "prod".into(),
            odoo_username: "bot".into(),
            odoo_password: "pw".into(),
            sender_email: Some("noreply@example.com".into()),
            notification_emails: Some("ops@example.com".into()),
            aws_region: "us-east-1".into(),
            client_id: None,
            client_secret: None,
            mail_channel: MailChannelKind::Ses,
            smtp_host: None,
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
        }
    }

    fn event(method: &str, body: Option<&str>) -> FunctionUrlEvent {
        FunctionUrlEvent {
            request_context: RequestContext {
                http: HttpContext {
                    method: method.to_string(),
                },
            },
            headers: HashMap::new(),
            body: body.map(String::from),
            is_base64_encoded: false,
        }
    }

    fn happy_crm(uid: u32, lead_id: i64) -> MockCrmLeads {
        let mut crm = MockCrmLeads::new();
        crm.expect_authenticate().returning(move || Ok(uid));
        crm.expect_create_lead().returning(move |_, _| Ok(lead_id));
        crm
    }

    #[tokio::test]
    async fn options_is_a_preflight_no_op() {
        let h = harness(test_config(), MockCrmLeads::new(), false);
        let response = h.intake.handle(&event("OPTIONS", None)).await;
        assert_eq!(response.status_code, 204);
        assert!(response.body.is_none());
    }

    #[tokio::test]
    async fn non_post_is_rejected() {
        let h = harness(test_config(), MockCrmLeads::new(), false);
        for method in ["GET", "PUT", "DELETE", "PATCH", ""] {
            let response = h.intake.handle(&event(method, None)).await;
            assert_eq!(response.status_code, 405, "method {method}");
            assert_eq!(response.body_json().unwrap()["error"], "Method Not Allowed");
        }
    }

    #[tokio::test]
    async fn missing_or_wrong_secrets_are_unauthorized() {
        let mut config = test_config();
        config.client_id = Some("web-client".into());
        config.client_secret = Some("s3cret".into());
        let h = harness(config, MockCrmLeads::new(), false);

        // No headers at all, body validity irrelevant.
        let response = h.intake.handle(&event("POST", Some("not json"))).await;
        assert_eq!(response.status_code, 401);
        assert_eq!(response.body_json().unwrap()["error"], "Unauthorized");

        // Right id, wrong secret.
        let mut with_headers = event("POST", Some("{}"));
        with_headers
            .headers
            .insert("x-client-id".into(), "web-client".into());
        with_headers
            .headers
            .insert("x-client-secret".into(), "wrong".into());
        let response = h.intake.handle(&with_headers).await;
        assert_eq!(response.status_code, 401);
    }

    #[tokio::test]
    async fn auth_headers_match_case_insensitively() {
        let mut config = test_config();
        config.client_id = Some("web-client".into());
        config.client_secret = Some("s3cret".into());
        let h = harness(config, happy_crm(7, 42), false);

        let mut request = event("POST", Some("{}"));
        request
            .headers
            .insert("X-Client-Id".into(), "web-client".into());
        request
            .headers
            .insert("X-Client-Secret".into(), "s3cret".into());
        let response = h.intake.handle(&request).await;
        assert_eq!(response.status_code, 200);
    }

    #[tokio::test]
    async fn auth_gate_skipped_when_either_secret_unset() {
        let mut config = test_config();
        config.client_id = Some("web-client".into());
        config.client_secret = None;
        let h = harness(config, happy_crm(7, 42), false);

        let response = h.intake.handle(&event("POST", Some("{}"))).await;
        assert_eq!(response.status_code, 200);
    }

    #[tokio::test]
    async fn malformed_json_is_a_client_error() {
        let h = harness(test_config(), MockCrmLeads::new(), false);
        for body in ["not json", "{\"unterminated\":", "[1, 2, 3]", "\"text\""] {
            let response = h.intake.handle(&event("POST", Some(body))).await;
            assert_eq!(response.status_code, 400, "body {body}");
            assert_eq!(
                response.body_json().unwrap()["error"],
                "Invalid request body. Expecting JSON."
            );
        }
    }

    #[tokio::test]
    async fn absent_body_is_an_empty_record() {
        let mut crm = MockCrmLeads::new();
        crm.expect_authenticate().returning(|| Ok(7));
        crm.expect_create_lead()
            .withf(|_, fields| {
                fields.len() == 1
                    && fields.get("type").and_then(Value::as_str) == Some("opportunity")
            })
            .times(1)
            .returning(|_, _| Ok(55));
        let h = harness(test_config(), crm, false);

        let response = h.intake.handle(&event("POST", None)).await;
        assert_eq!(response.status_code, 200);
    }

    #[tokio::test]
    async fn caller_supplied_type_is_overwritten() {
        let mut crm = MockCrmLeads::new();
        crm.expect_authenticate().returning(|| Ok(7));
        crm.expect_create_lead()
            .withf(|_, fields| {
                fields.get("type").and_then(Value::as_str) == Some("opportunity")
                    && fields.get("name").and_then(Value::as_str) == Some("Test Lead")
            })
            .times(1)
            .returning(|_, _| Ok(55));
        let h = harness(test_config(), crm, false);

        let body = json!({"name": "Test Lead", "type": "quotation"}).to_string();
        let response = h.intake.handle(&event("POST", Some(&body))).await;
        assert_eq!(response.status_code, 200);
    }

    #[tokio::test]
    async fn failed_crm_authentication_discloses_the_reason() {
        let mut crm = MockCrmLeads::new();
        crm.expect_authenticate()
            .returning(|| Err(OdooError::AuthenticationFailed));
        crm.expect_create_lead().never();
        let h = harness(test_config(), crm, false);

        let response = h.intake.handle(&event("POST", Some("{}"))).await;
        assert_eq!(response.status_code, 500);
        let error = response.body_json().unwrap()["error"]
            .as_str()
            .unwrap()
            .to_string();
        assert!(error.contains("Could not authenticate with Odoo"));
        assert!(error.contains("Authentication failed. Please check credentials."));
        assert!(h.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn crm_fault_message_is_surfaced() {
        let mut crm = MockCrmLeads::new();
        crm.expect_authenticate().returning(|| Ok(7));
        crm.expect_create_lead().returning(|_, _| {
            Err(OdooError::Fault {
                code: 2,
                message: "Invalid field 'bogus' on model 'crm.lead'".into(),
            })
        });
        let h = harness(test_config(), crm, false);

        let response = h.intake.handle(&event("POST", Some("{}"))).await;
        assert_eq!(response.status_code, 500);
        let error = response.body_json().unwrap()["error"]
            .as_str()
            .unwrap()
            .to_string();
        assert!(error.contains("Odoo API error"));
        assert!(error.contains("Invalid field 'bogus'"));
    }

    #[tokio::test]
    async fn unexpected_crm_failure_does_not_leak_detail() {
        let mut crm = MockCrmLeads::new();
        crm.expect_authenticate().returning(|| Ok(7));
        crm.expect_create_lead()
            .returning(|_, _| Err(OdooError::Unexpected("internal connection string".into())));
        let h = harness(test_config(), crm, false);

        let response = h.intake.handle(&event("POST", Some("{}"))).await;
        assert_eq!(response.status_code, 500);
        let body = response.body.clone().unwrap();
        assert!(!body.contains("internal connection string"));
        assert_eq!(
            response.body_json().unwrap()["error"],
            "An unexpected server error occurred."
        );
        assert!(h.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn notification_failure_never_downgrades_the_response() {
        let h = harness(test_config(), happy_crm(7, 42), true);

        let response = h.intake.handle(&event("POST", Some("{}"))).await;
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body_json().unwrap()["leadId"], 42);
        // The send was attempted, and it failed, silently.
        assert_eq!(h.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn blank_recipient_list_skips_the_send() {
        let mut config = test_config();
        config.notification_emails = Some(" , ,".into());
        let h = harness(config, happy_crm(7, 42), false);

        let response = h.intake.handle(&event("POST", Some("{}"))).await;
        assert_eq!(response.status_code, 200);
        assert!(h.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unconfigured_recipients_skip_the_send() {
        let mut config = test_config();
        config.notification_emails = None;
        let h = harness(config, happy_crm(7, 42), false);

        let response = h.intake.handle(&event("POST", Some("{}"))).await;
        assert_eq!(response.status_code, 200);
        assert!(h.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn end_to_end_success() {
        let mut config = test_config();
        config.client_id = Some("web-client".into());
        config.client_secret = Some("s3cret".into());
        config.notification_emails = Some("ops@example.com, sales@example.com".into());

        let mut crm = MockCrmLeads::new();
        crm.expect_authenticate().times(1).returning(|| Ok(7));
        crm.expect_create_lead()
            .withf(|uid, fields| {
                *uid == 7
                    && fields.get("type").and_then(Value::as_str) == Some("opportunity")
                    && fields.get("email_from").and_then(Value::as_str) == Some("a@b.com")
            })
            .times(1)
            .returning(|_, _| Ok(101));
        let h = harness(config, crm, false);

        let mut request = event(
            "POST",
            Some(&json!({"name": "Test Lead", "email_from": "a@b.com"}).to_string()),
        );
        request
            .headers
            .insert("x-client-id".into(), "web-client".into());
        request
            .headers
            .insert("x-client-secret".into(), "s3cret".into());

        let response = h.intake.handle(&request).await;
        assert_eq!(response.status_code, 200);
        let body = response.body_json().unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Opportunity created successfully!");
        assert_eq!(body["leadId"], 101);

        let sent = h.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].subject.contains("Test Lead"));
        assert!(sent[0].html_body.contains("101"));
        assert_eq!(sent[0].recipients, vec!["ops@example.com", "sales@example.com"]);
    }
}

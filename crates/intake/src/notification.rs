//! Builds the notification email for a created opportunity.

use serde_json::{Map, Value};

use notify::LeadNotification;

/// Placeholder for fields the submitter left out.
const MISSING: &str = "N/A";

/// Render a payload field for the email. Strings pass through, anything
/// else is JSON-rendered, absent or null fields become `N/A`.
fn field(fields: &Map<String, Value>, key: &str) -> String {
    match fields.get(key) {
        None | Some(Value::Null) => MISSING.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Build the subject and HTML body for a created lead.
#[must_use]
pub fn build_notification(
    fields: &Map<String, Value>,
    lead_id: i64,
    recipients: Vec<String>,
) -> LeadNotification {
    let name = field(fields, "name");
    let subject = format!("New Website Opportunity: {name}");

    let html_body = format!(
        r#"<html>
<head>
  <style>
    body {{ font-family: Arial, sans-serif; color: #333; }}
    .container {{ max-width: 600px; margin: 20px auto; padding: 20px; border: 1px solid #ddd; border-radius: 8px; background-color: #fdfdfd; }}
    h2 {{ color: #005a2b; border-bottom: 2px solid #eee; padding-bottom: 10px; }}
    table {{ width: 100%; border-collapse: collapse; margin-top: 20px; }}
    th, td {{ text-align: left; padding: 12px; border-bottom: 1px solid #eee; }}
    th {{ background-color: #f9f9f9; width: 30%; font-weight: bold; }}
  </style>
</head>
<body>
  <div class="container">
    <h2>New Website Opportunity Received</h2>
    <p>A new opportunity has been created from the website contact form. Here are the details:</p>
    <table>
      <tr><th>Opportunity Title</th><td>{title}</td></tr>
      <tr><th>Contact Name</th><td>{contact}</td></tr>
      <tr><th>Email</th><td>{email}</td></tr>
      <tr><th>Phone</th><td>{phone}</td></tr>
      <tr><th>Message</th><td><pre style="font-family: Arial, sans-serif; margin: 0; white-space: pre-wrap;">{description}</pre></td></tr>
      <tr><th>Odoo ID</th><td>{lead_id}</td></tr>
    </table>
    <p style="margin-top: 20px; font-size: 12px; color: #888;">This is an automated notification from the website contact form.</p>
  </div>
</body>
</html>"#,
        title = escape_html(&name),
        contact = escape_html(&field(fields, "contact_name")),
        email = escape_html(&field(fields, "email_from")),
        phone = escape_html(&field(fields, "phone")),
        description = escape_html(&field(fields, "description")),
    );

    LeadNotification {
        subject,
        html_body,
        recipients,
    }
}

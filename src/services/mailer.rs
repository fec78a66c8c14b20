use crate::config::MailConfig;
use crate::models::ContactMessage;
use anyhow::Result;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

/// Thin SMTP wrapper around the configured relay. Callers treat sends as
/// best-effort: a failure is logged at the call site and never aborts the
/// request that triggered it.
pub struct Mailer {
    config: MailConfig,
}

impl Mailer {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    pub fn is_configured(&self) -> bool {
        !self.config.smtp_host.is_empty() && !self.config.notify_to.is_empty()
    }

    /// Notify the office address about a new contact-form message.
    pub fn send_contact_notification(&self, message: &ContactMessage) -> Result<()> {
        if !self.is_configured() {
            tracing::warn!("Mail is not configured; skipping contact notification");
            return Ok(());
        }

        let subject = format!(
            "New contact form message: {}",
            message.subject.as_deref().unwrap_or("(no subject)")
        );
        let body = contact_notification_body(message);
        let to = self.config.notify_to.clone();

        self.send(&to, &subject, &body)
    }

    pub fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<()> {
        let from = format!("{} <{}>", self.config.sender_name, self.config.sender_email);

        let email = Message::builder()
            .from(from.parse()?)
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())?;

        let mut transport = SmtpTransport::starttls_relay(&self.config.smtp_host)?
            .port(self.config.smtp_port);
        if !self.config.username.is_empty() {
            transport = transport.credentials(Credentials::new(
                self.config.username.clone(),
                self.config.password.clone(),
            ));
        }

        transport.build().send(&email)?;
        tracing::info!("Email sent to {}", to);
        Ok(())
    }
}

fn contact_notification_body(message: &ContactMessage) -> String {
    format!(
        r#"<h2>New contact form message</h2>
<p><strong>Name:</strong> {}</p>
<p><strong>Email:</strong> {}</p>
<p><strong>Phone:</strong> {}</p>
<p><strong>Subject:</strong> {}</p>
<p><strong>Message:</strong></p>
<p>{}</p>
<p><small>Received: {}</small></p>"#,
        escape_html(&message.full_name),
        escape_html(&message.email),
        escape_html(message.phone.as_deref().unwrap_or("not given")),
        escape_html(message.subject.as_deref().unwrap_or("not given")),
        escape_html(&message.message),
        message.created_at,
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

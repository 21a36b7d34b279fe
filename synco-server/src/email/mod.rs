//! Email dispatch over SMTP

pub mod templates;

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A named recipient
#[derive(Debug, Clone)]
pub struct Recipient {
    pub name: String,
    pub email: String,
}

/// SMTP mailer
///
/// Sends are blocking lettre calls moved onto the blocking pool. Callers
/// sending to several recipients loop and log per-recipient failures; a
/// failed send never fails the booking operation that triggered it.
#[derive(Clone)]
pub struct Mailer {
    smtp_host: String,
    smtp_port: u16,
    credentials: Credentials,
    from_email: String,
    from_name: String,
}

impl Mailer {
    pub fn new(
        smtp_host: &str,
        smtp_port: u16,
        smtp_username: &str,
        smtp_password: &str,
        from_email: &str,
        from_name: &str,
    ) -> Result<Self, BoxError> {
        Ok(Self {
            smtp_host: smtp_host.to_string(),
            smtp_port,
            credentials: Credentials::new(smtp_username.to_string(), smtp_password.to_string()),
            from_email: from_email.to_string(),
            from_name: from_name.to_string(),
        })
    }

    fn build_transport(&self) -> Result<SmtpTransport, BoxError> {
        Ok(SmtpTransport::relay(&self.smtp_host)?
            .port(self.smtp_port)
            .credentials(self.credentials.clone())
            .build())
    }

    fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }

    /// Send one HTML email to one recipient
    pub async fn send_html(
        &self,
        to: &Recipient,
        subject: &str,
        html_body: String,
    ) -> Result<(), BoxError> {
        let email = Message::builder()
            .from(self.from_header().parse()?)
            .to(format!("{} <{}>", to.name, to.email).parse()?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body)?;

        let mailer = self.build_transport()?;

        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await?
            .map_err(|e| -> BoxError { e.into() })?;

        Ok(())
    }

    /// Send the same email to every recipient, continuing past per-recipient
    /// failures. Failures are logged, not returned.
    pub async fn send_to_all(&self, recipients: &[Recipient], subject: &str, html_body: &str) {
        for r in recipients {
            if let Err(e) = self.send_html(r, subject, html_body.to_string()).await {
                tracing::warn!(email = %r.email, error = %e, "Failed to send email, continuing");
            } else {
                tracing::info!(email = %r.email, subject = subject, "Email sent");
            }
        }
    }
}

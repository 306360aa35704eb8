//! Outgoing account emails.
//!
//! The auth service hands a [`Recipient`] to a [`Notifier`] after the
//! database change is committed. Delivery errors are logged by the caller and
//! never roll back the account change.

use std::sync::Mutex;

use bienes_config::MailConfig;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub nombre: String,
    pub email: String,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl OutgoingEmail {
    pub fn confirmation(mail: &MailConfig, recipient: &Recipient) -> Self {
        let link = format!(
            "{}/auth/confirmar/{}",
            mail.base_url.trim_end_matches('/'),
            recipient.token
        );
        Self {
            from: mail.from.clone(),
            to: recipient.email.clone(),
            subject: "Confirma tu cuenta en BienesRaices.com".to_string(),
            text: format!(
                "Hola {}, confirma tu cuenta en BienesRaices.com: {link}",
                recipient.nombre
            ),
            html: format!(
                "<p>Hola {}, comprueba tu cuenta en BienesRaices.com</p>\
                 <p>Tu cuenta ya esta lista, solo debes confirmarla en el siguiente enlace: \
                 <a href=\"{link}\">Confirmar Cuenta</a></p>\
                 <p>Si tu no creaste esta cuenta, puedes ignorar el mensaje</p>",
                recipient.nombre
            ),
        }
    }

    pub fn password_reset(mail: &MailConfig, recipient: &Recipient) -> Self {
        let link = format!(
            "{}/auth/olvide-password/{}",
            mail.base_url.trim_end_matches('/'),
            recipient.token
        );
        Self {
            from: mail.from.clone(),
            to: recipient.email.clone(),
            subject: "Reestablece tu password en BienesRaices.com".to_string(),
            text: format!(
                "Hola {}, reestablece tu password en BienesRaices.com: {link}",
                recipient.nombre
            ),
            html: format!(
                "<p>Hola {}, has solicitado reestablecer tu password en BienesRaices.com</p>\
                 <p>Sigue el siguiente enlace para generar un password nuevo: \
                 <a href=\"{link}\">Reestablecer Password</a></p>\
                 <p>Si tu no solicitaste el cambio de password, puedes ignorar el mensaje</p>",
                recipient.nombre
            ),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn send_confirmation(&self, recipient: &Recipient) -> anyhow::Result<()>;
    fn send_password_reset(&self, recipient: &Recipient) -> anyhow::Result<()>;
}

/// Writes each email to the log instead of an SMTP relay.
pub struct LogNotifier {
    mail: MailConfig,
}

impl LogNotifier {
    pub fn new(mail: MailConfig) -> Self {
        Self { mail }
    }

    fn emit(&self, email: OutgoingEmail) {
        info!(
            from = %email.from,
            to = %email.to,
            subject = %email.subject,
            body = %email.text,
            "outgoing email"
        );
    }
}

impl Notifier for LogNotifier {
    fn send_confirmation(&self, recipient: &Recipient) -> anyhow::Result<()> {
        self.emit(OutgoingEmail::confirmation(&self.mail, recipient));
        Ok(())
    }

    fn send_password_reset(&self, recipient: &Recipient) -> anyhow::Result<()> {
        self.emit(OutgoingEmail::password_reset(&self.mail, recipient));
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailKind {
    Confirmation,
    PasswordReset,
}

/// Keeps every notification in memory. Used by tests to read tokens back.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(EmailKind, Recipient)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<(EmailKind, Recipient)> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }

    pub fn last_token(&self, kind: EmailKind) -> Option<String> {
        self.sent()
            .into_iter()
            .rev()
            .find(|(sent_kind, _)| *sent_kind == kind)
            .map(|(_, recipient)| recipient.token)
    }

    fn record(&self, kind: EmailKind, recipient: &Recipient) -> anyhow::Result<()> {
        self.sent
            .lock()
            .map_err(|_| anyhow::anyhow!("notifier lock poisoned"))?
            .push((kind, recipient.clone()));
        Ok(())
    }
}

impl Notifier for RecordingNotifier {
    fn send_confirmation(&self, recipient: &Recipient) -> anyhow::Result<()> {
        self.record(EmailKind::Confirmation, recipient)
    }

    fn send_password_reset(&self, recipient: &Recipient) -> anyhow::Result<()> {
        self.record(EmailKind::PasswordReset, recipient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipient() -> Recipient {
        Recipient {
            nombre: "Jurgen".into(),
            email: "jurgen@admin.com".into(),
            token: "abc123".into(),
        }
    }

    #[test]
    fn confirmation_email_links_to_confirm_route() {
        let mail = MailConfig {
            from: "bienesraices@bnrz.com".into(),
            base_url: "http://localhost:3001/".into(),
        };
        let email = OutgoingEmail::confirmation(&mail, &recipient());
        assert_eq!(email.to, "jurgen@admin.com");
        assert!(email.html.contains("http://localhost:3001/auth/confirmar/abc123"));
    }

    #[test]
    fn reset_email_links_to_reset_route() {
        let email = OutgoingEmail::password_reset(&MailConfig::default(), &recipient());
        assert!(email.text.contains("/auth/olvide-password/abc123"));
        assert_eq!(email.from, "bienesraices@bnrz.com");
    }
}

mod smtp;
mod templates;

pub use smtp::{
    LettreTransport, MailTransport, SmtpSettings, TransportSecurity, DEFAULT_SMTP_HOST,
    DEFAULT_SMTP_PORT,
};
pub use templates::Notification;

pub mod smtp;

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub use smtp::SmtpMailer;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMail {
    pub to: String,
    pub cc: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
    pub from_name: String,
}

pub trait Mailer {
    fn send(&self, mail: &OutgoingMail) -> Result<()>;
}

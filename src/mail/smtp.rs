use super::{Mailer, OutgoingMail};
use crate::{config::Mail, util::split_addresses};
use anyhow::{anyhow, bail, Context, Result};
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, Message, SmtpTransport, Transport};
use tracing::info;

pub struct SmtpMailer {
    transport: SmtpTransport,
    from_address: Address,
}

impl SmtpMailer {
    pub fn from_config(cfg: &Mail) -> Result<Self> {
        if cfg.smtp_host.is_empty() {
            bail!("mail.smtp_host is required when preview=false");
        }
        let from_address: Address = cfg
            .from_address
            .parse()
            .with_context(|| format!("invalid mail.from_address: {:?}", cfg.from_address))?;

        let builder = match cfg.smtp_security.as_str() {
            "tls" => SmtpTransport::relay(&cfg.smtp_host)
                .map_err(|e| anyhow!("SMTP relay error: {e}"))?,
            "starttls" => SmtpTransport::starttls_relay(&cfg.smtp_host)
                .map_err(|e| anyhow!("SMTP relay error: {e}"))?,
            "none" => SmtpTransport::builder_dangerous(&cfg.smtp_host),
            other => bail!("unknown mail.smtp_security: {other}"),
        };

        let mut builder = builder.port(cfg.smtp_port);
        if !cfg.username.is_empty() {
            let password = std::env::var(&cfg.password_env)
                .with_context(|| format!("reading SMTP password from ${}", cfg.password_env))?;
            builder = builder.credentials(Credentials::new(cfg.username.clone(), password));
        }

        Ok(Self {
            transport: builder.build(),
            from_address,
        })
    }

    fn build_message(&self, mail: &OutgoingMail) -> Result<Message> {
        let from_name = (!mail.from_name.is_empty()).then(|| mail.from_name.clone());
        let mut builder = Message::builder()
            .from(Mailbox::new(from_name, self.from_address.clone()))
            .subject(mail.subject.as_str());

        let to = split_addresses(&mail.to);
        if to.is_empty() {
            bail!("no recipient addresses in {:?}", mail.to);
        }
        for addr in &to {
            let mbox: Mailbox = addr
                .parse()
                .map_err(|e| anyhow!("invalid to address {addr:?}: {e}"))?;
            builder = builder.to(mbox);
        }
        for addr in split_addresses(&mail.cc) {
            let mbox: Mailbox = addr
                .parse()
                .map_err(|e| anyhow!("invalid cc address {addr:?}: {e}"))?;
            builder = builder.cc(mbox);
        }

        builder
            .multipart(MultiPart::alternative_plain_html(
                mail.text_body.clone(),
                mail.html_body.clone(),
            ))
            .map_err(|e| anyhow!("failed to build email: {e}"))
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, mail: &OutgoingMail) -> Result<()> {
        let message = self.build_message(mail)?;
        self.transport
            .send(&message)
            .map_err(|e| anyhow!("SMTP send failed: {e}"))?;
        info!("email sent to={} cc={} subject={:?}", mail.to, mail.cc, mail.subject);
        Ok(())
    }
}

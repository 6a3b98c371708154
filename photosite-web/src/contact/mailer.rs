//! Outgoing mail
//!
//! The transport itself is external: `SendmailMailer` hands a complete
//! RFC 5322 message to a sendmail-compatible binary (`sendmail -t -i`), which
//! reads recipients from the headers.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Failed to start mail transport {0}: {1}")]
    Spawn(String, String),

    #[error("Mail transport I/O error: {0}")]
    Io(String),

    #[error("Mail transport exited with {0}: {1}")]
    Exit(String, String),
}

/// Plain-text email ready for dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub from_name: String,
    pub from_address: String,
    pub reply_to: String,
    pub subject: String,
    pub body: String,
}

/// Quote a display name for a `From:` header
fn quote_display_name(name: &str) -> String {
    let escaped: String = name
        .chars()
        .filter(|c| !c.is_control())
        .flat_map(|c| match c {
            '"' | '\\' => vec!['\\', c],
            _ => vec![c],
        })
        .collect();
    format!("\"{}\"", escaped)
}

fn header_value(value: &str) -> String {
    value.chars().filter(|c| !c.is_control()).collect()
}

impl OutgoingEmail {
    /// Render headers and body with CRLF line endings
    pub fn to_message(&self) -> String {
        let mut message = String::new();
        message.push_str(&format!("To: {}\r\n", header_value(&self.to)));
        message.push_str(&format!(
            "From: {} <{}>\r\n",
            quote_display_name(&self.from_name),
            header_value(&self.from_address)
        ));
        message.push_str(&format!("Reply-To: {}\r\n", header_value(&self.reply_to)));
        message.push_str(&format!("Subject: {}\r\n", header_value(&self.subject)));
        message.push_str("MIME-Version: 1.0\r\n");
        message.push_str("Content-Type: text/plain; charset=UTF-8\r\n");
        message.push_str("Content-Transfer-Encoding: 8bit\r\n");
        message.push_str("\r\n");
        for line in self.body.lines() {
            message.push_str(line);
            message.push_str("\r\n");
        }
        message
    }
}

/// Mail transport
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}

/// Pipes messages into a sendmail-compatible binary
pub struct SendmailMailer {
    program: PathBuf,
}

impl SendmailMailer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl Mailer for SendmailMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let program = self.program.display().to_string();

        let mut child = Command::new(&self.program)
            .arg("-t")
            .arg("-i")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| MailError::Spawn(program.clone(), e.to_string()))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(email.to_message().as_bytes())
                .await
                .map_err(|e| MailError::Io(e.to_string()))?;
            // Dropping stdin closes the pipe so sendmail sees EOF
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| MailError::Io(e.to_string()))?;

        if !output.status.success() {
            return Err(MailError::Exit(
                output.status.to_string(),
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        Ok(())
    }
}

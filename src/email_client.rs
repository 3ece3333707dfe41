/// Outbound email delivery.
///
/// Thin JSON client for the transactional mail service. The activation
/// flow is the only caller in this crate; delivery failures surface as
/// `AppError::Email` and abort the request before any state is written.

use serde::Serialize;

use crate::error::AppError;

#[derive(Clone)]
pub struct EmailClient {
    http_client: reqwest::Client,
    base_url: String,
    sender: String,
}

#[derive(Serialize)]
struct SendEmailRequest {
    from: String,
    to: String,
    subject: String,
    html: String,
}

impl EmailClient {
    pub fn new(base_url: String, sender: String, http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            base_url,
            sender,
        }
    }

    pub async fn send_email(
        &self,
        recipient: &str,
        subject: &str,
        html_content: &str,
    ) -> Result<(), AppError> {
        let url = format!("{}/email", self.base_url);
        let request = SendEmailRequest {
            from: self.sender.clone(),
            to: recipient.to_string(),
            subject: subject.to_string(),
            html: html_content.to_string(),
        };

        self.http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Email(e.to_string()))?
            .error_for_status()
            .map_err(|e| AppError::Email(e.to_string()))?;

        Ok(())
    }

    /// Sends the account-activation mail carrying the 4-digit code.
    pub async fn send_activation_email(
        &self,
        recipient: &str,
        name: &str,
        code: &str,
    ) -> Result<(), AppError> {
        let html = activation_email_body(name, code);
        self.send_email(recipient, "Activate your account", &html)
            .await
    }
}

fn activation_email_body(name: &str, code: &str) -> String {
    format!(
        "<h1>Hello {},</h1>\
         <p>Thank you for registering. Your activation code is:</p>\
         <h2>{}</h2>\
         <p>The code expires in 5 minutes. If you did not register, you can ignore this mail.</p>",
        name, code
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activation_body_contains_name_and_code() {
        let body = activation_email_body("John Doe", "1234");
        assert!(body.contains("John Doe"));
        assert!(body.contains("1234"));
    }
}

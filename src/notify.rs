// src/notify.rs
//
// Best-effort delivery of report text to the CallMeBot WhatsApp gateway.
// Failures are logged and swallowed; the business operation that triggered
// the notification has already committed by the time this runs.
use tracing::{info, warn};

const DEFAULT_GATEWAY_URL: &str = "https://api.callmebot.com/whatsapp.php";

#[derive(Debug, Clone)]
pub struct NotifySettings {
    pub gateway_url: String,
    pub admin_phone: Option<String>,
    pub api_key: Option<String>,
    /// Shared across sends for connection reuse.
    client: reqwest::Client,
}

impl NotifySettings {
    pub fn from_env() -> Self {
        Self {
            gateway_url: std::env::var("CALLMEBOT_URL")
                .unwrap_or_else(|_| DEFAULT_GATEWAY_URL.to_string()),
            admin_phone: std::env::var("ADMIN_PHONE").ok(),
            api_key: std::env::var("CALLMEBOT_API_KEY").ok(),
            client: reqwest::Client::new(),
        }
    }

    /// Settings that never send anything.
    #[cfg(test)]
    pub fn disabled() -> Self {
        Self {
            gateway_url: DEFAULT_GATEWAY_URL.to_string(),
            admin_phone: None,
            api_key: None,
            client: reqwest::Client::new(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.admin_phone.is_some() && self.api_key.is_some()
    }
}

/// Send one message through the gateway. Returns whether delivery succeeded;
/// callers never treat a failure as an error.
pub async fn send_whatsapp(settings: &NotifySettings, message: &str) -> bool {
    let (Some(phone), Some(api_key)) = (&settings.admin_phone, &settings.api_key) else {
        warn!("WhatsApp gateway not configured, skipping notification");
        return false;
    };

    let result = settings
        .client
        .get(&settings.gateway_url)
        .query(&[("phone", phone.as_str()), ("text", message), ("apikey", api_key.as_str())])
        .send()
        .await;

    match result {
        Ok(resp) if resp.status().is_success() => {
            info!("WhatsApp notification delivered");
            true
        }
        Ok(resp) => {
            warn!(status = %resp.status(), "WhatsApp gateway rejected message");
            false
        }
        Err(e) => {
            warn!(error = %e, "Failed to reach WhatsApp gateway");
            false
        }
    }
}

/// Fire-and-forget variant for use after a transaction has committed.
pub fn send_whatsapp_detached(settings: NotifySettings, message: String) {
    tokio::spawn(async move {
        send_whatsapp(&settings, &message).await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Minimal one-shot HTTP server standing in for the gateway.
    async fn spawn_gateway(status_line: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 2048];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {status_line}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"
                );
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });
        format!("http://{addr}/whatsapp.php")
    }

    fn configured(gateway_url: String) -> NotifySettings {
        NotifySettings {
            gateway_url,
            admin_phone: Some("+5355555555".to_string()),
            api_key: Some("test-key".to_string()),
            client: reqwest::Client::new(),
        }
    }

    #[tokio::test]
    async fn unconfigured_settings_skip_sending() {
        // no listener anywhere; an attempted send would error, not skip
        assert!(!NotifySettings::disabled().is_configured());
        assert!(!send_whatsapp(&NotifySettings::disabled(), "hello").await);
    }

    #[tokio::test]
    async fn successful_gateway_response_reports_delivery() {
        let url = spawn_gateway("200 OK").await;
        assert!(send_whatsapp(&configured(url), "daily report").await);
    }

    #[tokio::test]
    async fn rejected_gateway_response_is_swallowed() {
        let url = spawn_gateway("500 Internal Server Error").await;
        assert!(!send_whatsapp(&configured(url), "daily report").await);
    }

    #[tokio::test]
    async fn unreachable_gateway_is_swallowed() {
        // bind then drop so the port is closed
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/whatsapp.php", listener.local_addr().unwrap());
        drop(listener);

        assert!(!send_whatsapp(&configured(url), "daily report").await);
    }
}

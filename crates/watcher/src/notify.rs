//! 알림 어댑터
//!
//! [`Notifier`]는 마크다운 메시지 한 건을 전송하는 추상화이며,
//! [`WebexNotifier`]는 Webex 메시지 API 구현체입니다. 토큰이나 룸 ID가
//! 설정되지 않으면 미설정 상태로 생성되고, 전송 요청은 성공으로 간주되는
//! no-op이 됩니다.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use cvewatch_core::pipeline::BoxFuture;

use crate::config::WatcherConfig;
use crate::error::WatcherError;

/// Webex 메시지 전송 엔드포인트
const WEBEX_MESSAGES_URL: &str = "https://webexapis.com/v1/messages";

/// 알림 전송 추상화
pub trait Notifier: Send + Sync {
    /// 마크다운 메시지 한 건을 전송합니다.
    fn send<'a>(&'a self, message: &'a str) -> BoxFuture<'a, Result<(), WatcherError>>;
}

#[derive(Debug, Serialize)]
struct WebexMessage<'a> {
    #[serde(rename = "roomId")]
    room_id: &'a str,
    markdown: &'a str,
}

struct WebexClient {
    client: reqwest::Client,
    token: String,
    room_id: String,
    url: String,
}

/// Webex 메시지 API 알림자
///
/// 미설정 상태(`inner == None`)에서는 `send`가 항상 `Ok(())`를 반환하며
/// 네트워크 요청을 보내지 않습니다.
pub struct WebexNotifier {
    inner: Option<WebexClient>,
}

impl WebexNotifier {
    /// 설정에서 알림자를 생성합니다.
    ///
    /// 토큰과 룸 ID가 모두 있으면 설정된 상태로, 아니면 미설정 상태로
    /// 생성됩니다. 미설정은 에러가 아닙니다.
    pub fn from_config(config: &WatcherConfig) -> Result<Self, WatcherError> {
        let inner = match (&config.webex_token, &config.webex_room_id) {
            (Some(token), Some(room_id)) if !token.is_empty() && !room_id.is_empty() => {
                let client = reqwest::Client::builder()
                    .timeout(Duration::from_secs(config.notify_timeout_secs))
                    .build()
                    .map_err(|e| WatcherError::Notify(format!("http client build failed: {e}")))?;
                Some(WebexClient {
                    client,
                    token: token.clone(),
                    room_id: room_id.clone(),
                    url: WEBEX_MESSAGES_URL.to_owned(),
                })
            }
            _ => {
                info!("webex credentials not set, notifications disabled");
                None
            }
        };
        Ok(Self { inner })
    }

    /// 미설정 no-op 알림자를 생성합니다.
    pub fn unconfigured() -> Self {
        Self { inner: None }
    }

    /// 실제 전송이 가능한 상태인지 반환합니다.
    pub fn is_configured(&self) -> bool {
        self.inner.is_some()
    }
}

impl Notifier for WebexNotifier {
    fn send<'a>(&'a self, message: &'a str) -> BoxFuture<'a, Result<(), WatcherError>> {
        Box::pin(async move {
            let Some(webex) = &self.inner else {
                debug!("notifier unconfigured, dropping message");
                return Ok(());
            };

            let payload = WebexMessage {
                room_id: &webex.room_id,
                markdown: message,
            };
            let response = webex
                .client
                .post(&webex.url)
                .bearer_auth(&webex.token)
                .json(&payload)
                .send()
                .await
                .map_err(|e| WatcherError::Notify(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(WatcherError::Notify(format!(
                    "webex returned HTTP {}",
                    status.as_u16()
                )));
            }
            debug!(chars = message.chars().count(), "notification sent");
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_send_is_noop_success() {
        let notifier = WebexNotifier::unconfigured();
        assert!(!notifier.is_configured());
        notifier.send("🚨 New CVEs for **openssl**:").await.unwrap();
    }

    #[test]
    fn from_config_without_credentials_is_unconfigured() {
        let config = WatcherConfig::default();
        let notifier = WebexNotifier::from_config(&config).unwrap();
        assert!(!notifier.is_configured());
    }

    #[test]
    fn from_config_with_credentials_is_configured() {
        let config = WatcherConfig {
            webex_token: Some("token".to_owned()),
            webex_room_id: Some("room".to_owned()),
            ..Default::default()
        };
        let notifier = WebexNotifier::from_config(&config).unwrap();
        assert!(notifier.is_configured());
    }

    #[test]
    fn from_config_with_empty_credentials_is_unconfigured() {
        let config = WatcherConfig {
            webex_token: Some(String::new()),
            webex_room_id: Some(String::new()),
            ..Default::default()
        };
        let notifier = WebexNotifier::from_config(&config).unwrap();
        assert!(!notifier.is_configured());
    }

    #[test]
    fn webex_message_serializes_room_id_camel_case() {
        let payload = WebexMessage {
            room_id: "ROOM",
            markdown: "hello",
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("\"roomId\":\"ROOM\""));
        assert!(json.contains("\"markdown\":\"hello\""));
    }
}

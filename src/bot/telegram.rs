use std::sync::{Arc, OnceLock};

use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use serde_derive::{Deserialize, Serialize};

use crate::{config::SETTINGS, util::http};

static TELEGRAM: Lazy<Arc<OnceLock<Telegram>>> = Lazy::new(|| Arc::new(OnceLock::new()));

/// 長輪詢每次等待的秒數，需小於 http client 的整體逾時
const LONG_POLL_TIMEOUT_SECS: u64 = 10;

struct Telegram {
    send_message_url: String,
    get_updates_url: String,
}

impl Telegram {
    pub fn new() -> Self {
        Self {
            send_message_url: format!(
                "https://api.telegram.org/bot{}/sendMessage",
                SETTINGS.bot.telegram.token
            ),
            get_updates_url: format!(
                "https://api.telegram.org/bot{}/getUpdates",
                SETTINGS.bot.telegram.token
            ),
        }
    }

    async fn send_message(&self, payload: SendMessageRequest<'_>) -> Result<()> {
        http::post_use_json::<SendMessageRequest, SendMessageResponse>(
            &self.send_message_url,
            None,
            Some(&payload),
        )
        .await
        .map_err(|err| anyhow!("Failed to send_message because: {:?}", err))?;

        Ok(())
    }

    async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        let payload = GetUpdatesRequest {
            offset,
            timeout: LONG_POLL_TIMEOUT_SECS,
            allowed_updates: &["message"],
        };
        let res = http::post_use_json::<GetUpdatesRequest, GetUpdatesResponse>(
            &self.get_updates_url,
            None,
            Some(&payload),
        )
        .await
        .map_err(|err| anyhow!("Failed to get_updates because: {:?}", err))?;

        if !res.ok {
            return Err(anyhow!("Telegram getUpdates responded ok=false"));
        }

        Ok(res.result)
    }
}

impl Default for Telegram {
    fn default() -> Self {
        Self::new()
    }
}

fn get_client() -> Result<&'static Telegram> {
    Ok(TELEGRAM.get_or_init(Telegram::new))
}

#[derive(Serialize)]
struct GetUpdatesRequest<'a> {
    offset: i64,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[derive(Serialize, Deserialize)]
struct GetUpdatesResponse {
    ok: bool,
    result: Vec<Update>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last_name) => format!("{} {}", self.first_name, last_name),
            None => self.first_name.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Chat {
    pub id: i64,
    /// "private"、"group"、"supergroup" 或 "channel"
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Serialize, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    result: Option<SentMessage>,
}

#[derive(Serialize, Deserialize)]
struct SentMessage {
    message_id: i64,
}

#[derive(Serialize)]
pub struct SendMessageRequest<'a> {
    pub chat_id: i64,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<&'a str>,
}

impl<'a> SendMessageRequest<'a> {
    pub fn new(chat_id: i64, text: &'a str) -> SendMessageRequest<'a> {
        SendMessageRequest {
            chat_id,
            text,
            parse_mode: None,
        }
    }

    pub fn html(chat_id: i64, text: &'a str) -> SendMessageRequest<'a> {
        SendMessageRequest {
            chat_id,
            text,
            parse_mode: Some("HTML"),
        }
    }
}

pub async fn send_to(chat_id: i64, text: &str) -> Result<()> {
    get_client()?
        .send_message(SendMessageRequest::new(chat_id, text))
        .await
}

pub async fn send_html(chat_id: i64, text: &str) -> Result<()> {
    get_client()?
        .send_message(SendMessageRequest::html(chat_id, text))
        .await
}

/// 通知管理者
pub async fn notify_owner(text: &str) -> Result<()> {
    send_to(SETTINGS.bot.telegram.owner_chat_id, text).await
}

pub async fn updates(offset: i64) -> Result<Vec<Update>> {
    get_client()?.get_updates(offset).await
}

#[cfg(test)]
mod tests {
    use std::env;

    use crate::logging;

    use super::*;

    #[test]
    fn test_full_name() {
        let user = User {
            id: 99,
            first_name: "Syntoo".to_string(),
            last_name: Some("Sharma".to_string()),
            username: Some("syntoo".to_string()),
        };
        assert_eq!(user.full_name(), "Syntoo Sharma");

        let without_last = User {
            last_name: None,
            ..user
        };
        assert_eq!(without_last.full_name(), "Syntoo");
    }

    #[tokio::test]
    #[ignore]
    async fn test_send_message() {
        dotenv::dotenv().ok();
        logging::debug_file_async("開始 test_send_message".to_string());

        let msg = format!(
            "test_send_message \r\nRust OS/Arch: {}/{}\r\n",
            env::consts::OS,
            env::consts::ARCH
        );

        match notify_owner(&msg).await {
            Ok(_) => {}
            Err(why) => {
                logging::debug_file_async(format!("Failed to send_message because {:?}", why));
            }
        }

        logging::debug_file_async("結束 test_send_message".to_string());
    }
}

use std::time::Duration;

use anyhow::Result;
use futures::future::join_all;
use rust_decimal::Decimal;

use crate::{
    bot::{
        telegram,
        telegram::Message,
        user_store::{UserProfile, UserStore},
    },
    config::SETTINGS,
    crawler::{self, table},
    declare::MergedRecord,
    logging,
};

const PRIVATE_CHAT: &str = "private";
const GROUP_CHAT: &str = "group";
const SUPER_GROUP_CHAT: &str = "supergroup";

/// 衍生欄位無法計算時的顯示值
const UNAVAILABLE: &str = "N/A";

const WELCOME_MESSAGE: &str = "Welcome 🙏 to Syntoo's NEPSE BOT💗\n\
    के को डाटा चाहियो? Symbol दिनुस।\n\
    उदाहरण: SHINE, SCB, SWBBL, SHPC";
const OWNER_ONLY_MESSAGE: &str = "⛔ यो आदेश तपाईँलाई उपलब्ध छैन।";
const DATA_UNAVAILABLE_MESSAGE: &str =
    "डाटा अहिले उपलब्ध भएन। केही समयपछि फेरि प्रयास गर्नुहोस्।";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 登錄並回覆歡迎訊息
    Start,
    /// 全部使用者（限管理者）
    AllUsers,
    /// 活躍使用者（限管理者）
    ActiveUsers,
    /// 查詢 Symbol 報價
    Quote(String),
}

impl Command {
    /// 解析訊息文字。
    ///
    /// 私訊的任何文字都視為 Symbol 查詢；
    /// 群組內只處理 `/SYMBOL` 形式，其他訊息不回應。
    pub fn parse(chat_kind: &str, text: &str) -> Option<Command> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        match text {
            "/start" => return Some(Command::Start),
            "/users" => return Some(Command::AllUsers),
            "/get_users" => return Some(Command::ActiveUsers),
            _ => {}
        }

        match chat_kind {
            PRIVATE_CHAT => Some(Command::Quote(text.trim_start_matches('/').to_string())),
            GROUP_CHAT | SUPER_GROUP_CHAT => text
                .strip_prefix('/')
                .map(|symbol| Command::Quote(symbol.to_string())),
            _ => None,
        }
    }
}

/// 長輪詢迴圈，收到的訊息逐批處理，失敗時稍候再試
pub async fn polling_loop(store: &UserStore) {
    let mut offset = 0_i64;

    loop {
        match telegram::updates(offset).await {
            Ok(updates) => {
                if let Some(last) = updates.last() {
                    offset = last.update_id + 1;
                }

                let tasks: Vec<_> = updates
                    .into_iter()
                    .filter_map(|update| update.message)
                    .map(|message| handle_message(store, message))
                    .collect();
                join_all(tasks).await;
            }
            Err(why) => {
                logging::error_file_async(format!("Failed to poll updates because {:?}", why));
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
        }
    }
}

pub async fn handle_message(store: &UserStore, message: Message) {
    let Some(text) = message.text.as_deref() else {
        return;
    };
    let Some(command) = Command::parse(&message.chat.kind, text) else {
        return;
    };

    let result = match command {
        Command::Start => handle_start(store, &message).await,
        Command::AllUsers => handle_all_users(store, &message).await,
        Command::ActiveUsers => handle_active_users(store, &message).await,
        Command::Quote(symbol) => handle_quote(store, &message, &symbol).await,
    };

    if let Err(why) = result {
        logging::error_file_async(format!("Failed to handle_message because {:?}", why));
    }
}

async fn handle_start(store: &UserStore, message: &Message) -> Result<()> {
    if let Some(user) = &message.from {
        let profile = UserProfile {
            user_id: user.id,
            full_name: user.full_name(),
            username: user.username.clone(),
        };

        // 第一次見到的使用者另行通知管理者
        if store.register(message.chat.id, profile.clone()) {
            let alert = format!(
                "🎉 New User Alert!\n\nFull Name: {}\nUsername: @{}\nUser ID: {}",
                profile.full_name,
                profile.username.as_deref().unwrap_or("-"),
                profile.user_id
            );

            if let Err(why) = telegram::notify_owner(&alert).await {
                logging::error_file_async(format!("Failed to notify_owner because {:?}", why));
            }

            logging::info_file_async(format!(
                "new user {} registered, total users {}",
                profile.user_id,
                store.len()
            ));
        }
    }

    telegram::send_to(message.chat.id, WELCOME_MESSAGE).await
}

async fn handle_all_users(store: &UserStore, message: &Message) -> Result<()> {
    if message.chat.id != SETTINGS.bot.telegram.owner_chat_id {
        return telegram::send_to(message.chat.id, OWNER_ONLY_MESSAGE).await;
    }

    telegram::send_to(
        message.chat.id,
        &format_users("Total Users", &store.all()),
    )
    .await
}

async fn handle_active_users(store: &UserStore, message: &Message) -> Result<()> {
    if message.chat.id != SETTINGS.bot.telegram.owner_chat_id {
        return telegram::send_to(message.chat.id, OWNER_ONLY_MESSAGE).await;
    }

    telegram::send_to(
        message.chat.id,
        &format_users("Active Users", &store.active()),
    )
    .await
}

async fn handle_quote(store: &UserStore, message: &Message, symbol: &str) -> Result<()> {
    let reply = match crawler::lookup(symbol).await {
        Ok(Some(record)) => {
            store.mark_active(message.chat.id);
            logging::debug_file_async(format!(
                "{} LTP {}",
                record.symbol,
                record.get(table::LTP).unwrap_or(UNAVAILABLE)
            ));
            return telegram::send_html(message.chat.id, &format_quote(&record)).await;
        }
        Ok(None) => format_not_found(symbol),
        Err(why) => {
            logging::error_file_async(format!("Failed to lookup {} because {:?}", symbol, why));
            DATA_UNAVAILABLE_MESSAGE.to_string()
        }
    };

    telegram::send_to(message.chat.id, &reply).await
}

fn format_users(title: &str, users: &[(i64, UserProfile)]) -> String {
    let mut message = format!("{}: {}\n\n", title, users.len());

    for (_, user) in users {
        message.push_str(&format!(
            "Full Name: {}\nUsername: @{}\nUser ID: {}\n\n",
            user.full_name,
            user.username.as_deref().unwrap_or("-"),
            user.user_id
        ));
    }

    message
}

fn format_not_found(symbol: &str) -> String {
    format!(
        "Symbol '{}' फेला परेन। कृपया सही Symbol दिनुहोस्।",
        symbol.trim().to_uppercase()
    )
}

/// 查詢結果的 HTML 回覆，欄位依表格順序輸出
fn format_quote(record: &MergedRecord) -> String {
    let mut reply = format!("Stock Data for <b>{}</b>:\n\n", record.symbol);

    for (name, value) in &record.fields {
        if *name == table::SYMBOL {
            continue;
        }
        reply.push_str(&format!("{}: {}\n", name, value));
    }

    reply.push_str(&format!(
        "Down From High: {}\n",
        format_percent(record.down_from_high)
    ));
    reply.push_str(&format!(
        "Up From Low: {}\n",
        format_percent(record.up_from_low)
    ));
    reply.push_str("\nThank you for using my bot. Please share it with your friends and groups.");
    reply
}

fn format_percent(value: Option<Decimal>) -> String {
    value.map_or_else(|| UNAVAILABLE.to_string(), |pct| format!("{:.2}%", pct))
}

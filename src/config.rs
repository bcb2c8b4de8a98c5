use std::{env, path::PathBuf, str::FromStr};

use anyhow::Result;
use config::{Config as config_config, File as config_file};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

const CONFIG_PATH: &str = "app.json";

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct App {
    pub bot: Bot,
    pub market: Market,
    pub system: System,
}

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct Bot {
    pub telegram: Telegram,
}

const TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
const TELEGRAM_OWNER_CHAT_ID: &str = "TELEGRAM_OWNER_CHAT_ID";

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct Telegram {
    #[serde(default)]
    pub token: String,
    /// 管理者的 chat id，/users 與 /get_users 只回應這個 id
    #[serde(default)]
    pub owner_chat_id: i64,
}

const MARKET_SOURCE: &str = "MARKET_SOURCE";

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct Market {
    /// 報價資料來源，"live-summary" 或 "indices"
    #[serde(default)]
    pub source: String,
}

const SYSTEM_HTTP_PORT: &str = "SYSTEM_HTTP_PORT";

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct System {
    #[serde(default)]
    pub http_port: i32,
}

pub static SETTINGS: Lazy<App> = Lazy::new(|| App::get().expect("Config error"));

impl App {
    fn get() -> Result<Self> {
        let config_path = config_path();
        if config_path.exists() {
            let config: App = config_config::builder()
                .add_source(config_file::from(config_path))
                .build()?
                .try_deserialize()?;
            return Ok(config.override_with_env());
        }

        Ok(App::from_env())
    }

    /// 從 env 中讀取設定值
    fn from_env() -> Self {
        App {
            bot: Bot {
                telegram: Telegram {
                    token: env::var(TELEGRAM_TOKEN).expect(TELEGRAM_TOKEN),
                    owner_chat_id: i64::from_str(
                        &env::var(TELEGRAM_OWNER_CHAT_ID).unwrap_or_else(|_| "0".to_string()),
                    )
                    .unwrap_or(0),
                },
            },
            market: Market {
                source: env::var(MARKET_SOURCE).unwrap_or_else(|_| "live-summary".to_string()),
            },
            system: System {
                http_port: env::var(SYSTEM_HTTP_PORT)
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse::<i32>()
                    .unwrap_or(8080),
            },
        }
    }

    /// 將來至於 env 的設定值覆蓋掉 json 上的設定值
    fn override_with_env(mut self) -> Self {
        if let Ok(token) = env::var(TELEGRAM_TOKEN) {
            self.bot.telegram.token = token;
        }

        if let Ok(owner) = env::var(TELEGRAM_OWNER_CHAT_ID) {
            self.bot.telegram.owner_chat_id = i64::from_str(&owner).unwrap_or(0);
        }

        if let Ok(source) = env::var(MARKET_SOURCE) {
            self.market.source = source;
        }

        if let Ok(port) = env::var(SYSTEM_HTTP_PORT) {
            self.system.http_port = port.parse::<i32>().unwrap_or(8080);
        }

        self
    }
}

/// 回傳設定檔的路徑
fn config_path() -> PathBuf {
    PathBuf::from(CONFIG_PATH)
}

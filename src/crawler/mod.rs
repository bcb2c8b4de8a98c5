use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use thiserror::Error;

use crate::{
    config::SETTINGS,
    crawler::{sharehubnepal::indices::Indices, sharesansar::quote::LiveSummary},
    declare::{MergedRecord, QuoteSource},
    logging, util,
};

/// ShareHubNepal
pub mod sharehubnepal;
/// ShareSansar
pub mod sharesansar;
pub mod table;

/// 擷取與合併過程的錯誤。查無 Symbol 不是錯誤，以 `Ok(None)` 表示。
#[derive(Debug, Error)]
pub enum MarketError {
    /// 來源頁回應非 200
    #[error("unexpected HTTP status {status_code} from {site}")]
    Status {
        site: &'static str,
        status_code: u16,
    },
    /// 連線層錯誤
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    /// 頁面上找不到表格，版面已與預期不符
    #[error("no table found in {site} page")]
    NoTable { site: &'static str },
    /// CSS selector 無法解析
    #[error("invalid selector: {0}")]
    Selector(String),
    /// HTTP client 建立失敗
    #[error("http client error: {0}")]
    Client(String),
}

/// 擷取下來尚未解析的頁面內容
#[derive(Debug, Clone)]
pub struct RawPage {
    pub source: &'static str,
    pub fetched_at: DateTime<Local>,
    pub body: String,
}

/// 對固定網址做單次 GET，非 200 或連線失敗回傳錯誤，不重試。
pub async fn fetch_page(url: &str, source: &'static str) -> Result<RawPage, MarketError> {
    let client = util::http::client().map_err(|why| MarketError::Client(format!("{:?}", why)))?;
    let start = Instant::now();
    let response = client.get(url).send().await?;
    let status_code = response.status().as_u16();

    if status_code != 200 {
        logging::warn_file_async(format!("GET:{} returned {}", url, status_code));
        return Err(MarketError::Status {
            site: source,
            status_code,
        });
    }

    let page = RawPage {
        source,
        fetched_at: Local::now(),
        body: response.text().await?,
    };

    logging::debug_file_async(format!(
        "GET:{} {} ms at {}",
        url,
        start.elapsed().as_millis(),
        page.fetched_at.format("%F %X%.3f")
    ));

    Ok(page)
}

/// 報價資料來源。
///
/// 每次查詢都重新抓取來源頁並重建記錄，呼叫之間沒有共享狀態，
/// 同一份頁面內容對同一個 Symbol 的查詢結果固定不變。
#[async_trait]
pub trait DataSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// `symbol` 已正規化為去空白的大寫字串
    async fn quote(&self, symbol: &str) -> Result<Option<MergedRecord>, MarketError>;
}

/// 依設定值選擇資料來源
pub fn from_settings() -> &'static dyn DataSource {
    match QuoteSource::from_name(&SETTINGS.market.source) {
        QuoteSource::LiveSummary => &LiveSummary,
        QuoteSource::Indices => &Indices,
    }
}

/// 取得指定 Symbol 的合併報價，查無資料時回傳 `Ok(None)`
pub async fn lookup(symbol: &str) -> Result<Option<MergedRecord>, MarketError> {
    let symbol = normalize_symbol(symbol);
    let source = from_settings();

    logging::debug_file_async(format!("lookup {} via {}", symbol, source.name()));

    source.quote(&symbol).await
}

/// Symbol 比對前先去除前後空白並轉為大寫
pub(crate) fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

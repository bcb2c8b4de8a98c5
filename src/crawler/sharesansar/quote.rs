use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::{
    crawler::{
        fetch_page,
        sharesansar::{HOST, LIVE_COLUMNS, SUMMARY_COLUMNS},
        table::{self, extract, RowRecord},
        DataSource, MarketError,
    },
    declare::MergedRecord,
    util::map::{vec_to_hashmap, Keyable},
};

const LIVE_SOURCE: &str = "live-trading";
const SUMMARY_SOURCE: &str = "today-summary";

fn live_url() -> String {
    format!("https://{}/live-trading", HOST)
}

fn summary_url() -> String {
    format!("https://{}/today-share-price", HOST)
}

/// 即時盤與當日行情合併後的報價來源
pub struct LiveSummary;

#[async_trait]
impl DataSource for LiveSummary {
    fn name(&self) -> &'static str {
        "live-summary"
    }

    async fn quote(&self, symbol: &str) -> Result<Option<MergedRecord>, MarketError> {
        let live = visit_live().await?;
        let summary = visit_summary().await?;

        Ok(merge(live, summary)
            .into_iter()
            .find(|record| record.key() == symbol))
    }
}

async fn visit_live() -> Result<Vec<RowRecord>, MarketError> {
    let page = fetch_page(&live_url(), LIVE_SOURCE).await?;
    extract(&page, &LIVE_COLUMNS)
}

async fn visit_summary() -> Result<Vec<RowRecord>, MarketError> {
    let page = fetch_page(&summary_url(), SUMMARY_SOURCE).await?;
    extract(&page, &SUMMARY_COLUMNS)
}

/// 以 Symbol 合併即時盤與當日行情。
///
/// 當日行情先轉成以 Symbol 為鍵的查表，重複的 Symbol 後者覆蓋前者；
/// 只出現在即時盤的 Symbol 不會產生記錄。
pub(crate) fn merge(live: Vec<RowRecord>, summary: Vec<RowRecord>) -> Vec<MergedRecord> {
    let summary_by_symbol = vec_to_hashmap(summary);

    live.into_iter()
        .filter_map(|row| {
            summary_by_symbol
                .get(&row.key())
                .map(|summary_row| merge_one(&row, summary_row))
        })
        .collect()
}

fn merge_one(live: &RowRecord, summary: &RowRecord) -> MergedRecord {
    let (down_from_high, up_from_low) = derived_percentages(live, summary);
    let mut fields = live.fields.clone();

    for (name, value) in &summary.fields {
        if live.get(name).is_none() {
            fields.push((*name, value.clone()));
        }
    }

    MergedRecord {
        symbol: live.symbol().to_string(),
        fields,
        down_from_high,
        up_from_low,
    }
}

/// DownFromHigh% 與 UpFromLow%。
///
/// 任一運算元無法解析、或分母（52 週高 / 52 週低）為零時，
/// 兩個欄位一併視為無法計算，不得以 0 代替。
fn derived_percentages(live: &RowRecord, summary: &RowRecord) -> (Option<Decimal>, Option<Decimal>) {
    let ltp = live.decimal(table::LTP);
    let high = summary.decimal(table::WEEK_52_HIGH);
    let low = summary.decimal(table::WEEK_52_LOW);

    match (ltp, high, low) {
        (Some(ltp), Some(high), Some(low)) if !high.is_zero() && !low.is_zero() => {
            let down = ((high - ltp) / high * dec!(100)).round_dp(2);
            let up = ((ltp - low) / low * dec!(100)).round_dp(2);
            (Some(down), Some(up))
        }
        _ => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Local;

    use crate::{crawler::RawPage, logging};

    use super::*;

    fn live_row(symbol: &str, ltp: &str) -> RowRecord {
        RowRecord {
            source: LIVE_SOURCE,
            fields: vec![
                (table::SYMBOL, symbol.to_string()),
                (table::LTP, ltp.to_string()),
                (table::CHANGE_PERCENT, "+2%".to_string()),
            ],
        }
    }

    fn summary_row(symbol: &str, week_high: &str, week_low: &str) -> RowRecord {
        RowRecord {
            source: SUMMARY_SOURCE,
            fields: vec![
                (table::SYMBOL, symbol.to_string()),
                (table::CLOSE, "440".to_string()),
                (table::WEEK_52_HIGH, week_high.to_string()),
                (table::WEEK_52_LOW, week_low.to_string()),
            ],
        }
    }

    #[test]
    fn test_merge_derived_fields() {
        let merged = merge(
            vec![live_row("SHINE", "450")],
            vec![summary_row("SHINE", "500", "300")],
        );

        assert_eq!(merged.len(), 1);
        let record = &merged[0];
        assert_eq!(record.symbol, "SHINE");
        assert_eq!(record.get(table::LTP), Some("450"));
        assert_eq!(record.get(table::WEEK_52_HIGH), Some("500"));
        // (500 - 450) / 500 * 100 = 10.00
        assert_eq!(record.down_from_high, Some(dec!(10.00)));
        // (450 - 300) / 300 * 100 = 50.00
        assert_eq!(record.up_from_low, Some(dec!(50.00)));
    }

    #[test]
    fn test_merge_drops_live_only_symbols() {
        let merged = merge(
            vec![live_row("SHINE", "450"), live_row("SCB", "520")],
            vec![summary_row("SHINE", "500", "300")],
        );

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].symbol, "SHINE");
    }

    #[test]
    fn test_merge_duplicate_summary_last_wins() {
        let merged = merge(
            vec![live_row("SHINE", "450")],
            vec![
                summary_row("SHINE", "900", "100"),
                summary_row("SHINE", "500", "300"),
            ],
        );

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].down_from_high, Some(dec!(10.00)));
        assert_eq!(merged[0].up_from_low, Some(dec!(50.00)));
    }

    #[test]
    fn test_derived_fields_unavailable_on_zero_low() {
        let merged = merge(
            vec![live_row("SHINE", "450")],
            vec![summary_row("SHINE", "500", "0")],
        );

        // 分母為零時兩個衍生欄位都不提供
        assert_eq!(merged[0].down_from_high, None);
        assert_eq!(merged[0].up_from_low, None);
    }

    #[test]
    fn test_derived_fields_unavailable_on_unparsable_operand() {
        let merged = merge(
            vec![live_row("SHINE", "450")],
            vec![summary_row("SHINE", "n/a", "300")],
        );

        assert_eq!(merged[0].down_from_high, None);
        assert_eq!(merged[0].up_from_low, None);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let live = vec![live_row("SHINE", "450")];
        let summary = vec![summary_row("SHINE", "500", "300")];

        let first = merge(live.clone(), summary.clone());
        let second = merge(live, summary);

        assert_eq!(first, second);
    }

    const LIVE_HTML: &str = r#"
    <table>
      <tr><th>S.No</th><th>Symbol</th><th>LTP</th><th>% Change</th><th>Open</th>
          <th>High</th><th>Low</th><th>Qty</th><th>Prev. Close</th></tr>
      <tr><td>1</td><td>SHINE</td><td>450</td><td>+2%</td><td>445</td>
          <td>455</td><td>441</td><td>12,000</td><td>441</td></tr>
      <tr><td>2</td><td>SCB</td><td>520</td><td>-1%</td><td>525</td>
          <td>528</td><td>515</td><td>8,500</td><td>526</td></tr>
    </table>"#;

    const SUMMARY_HTML: &str = r#"
    <table>
      <tr><th>S.No</th><th>Symbol</th><th>Close</th><th>Open</th><th>High</th><th>Low</th>
          <th>Qty</th><th>Turnover</th><th>52 Week High</th><th>52 Week Low</th></tr>
      <tr><td>1</td><td>SHINE</td><td>450</td><td>445</td><td>455</td><td>441</td>
          <td>12,000</td><td>5,400,000</td><td>500</td><td>300</td></tr>
    </table>"#;

    /// 以固定頁面內容驗證 抓取→解析→合併→查找 全流程
    #[test]
    fn test_lookup_from_fixture_pages() {
        let live_page = RawPage {
            source: LIVE_SOURCE,
            fetched_at: Local::now(),
            body: LIVE_HTML.to_string(),
        };
        let summary_page = RawPage {
            source: SUMMARY_SOURCE,
            fetched_at: Local::now(),
            body: SUMMARY_HTML.to_string(),
        };

        let live = extract(&live_page, &LIVE_COLUMNS).unwrap();
        let summary = extract(&summary_page, &SUMMARY_COLUMNS).unwrap();
        let merged = merge(live, summary);

        // 大小寫不同的查詢結果相同
        let by_lower = merged
            .iter()
            .find(|r| r.key() == crate::crawler::normalize_symbol("shine"));
        let by_upper = merged
            .iter()
            .find(|r| r.key() == crate::crawler::normalize_symbol("SHINE"));
        assert_eq!(by_lower, by_upper);

        let record = by_upper.expect("SHINE should be present in both feeds");
        assert_eq!(record.get(table::LTP), Some("450"));
        assert_eq!(record.get(table::QTY), Some("12000"));
        assert_eq!(record.get(table::TURNOVER), Some("5400000"));
        assert_eq!(record.down_from_high, Some(dec!(10.00)));
        assert_eq!(record.up_from_low, Some(dec!(50.00)));

        // 只在即時盤出現的 Symbol 查不到
        assert!(merged
            .iter()
            .all(|r| r.key() != crate::crawler::normalize_symbol("scb")));
    }

    #[tokio::test]
    #[ignore]
    async fn test_visit_live() {
        dotenv::dotenv().ok();
        logging::debug_file_async("開始 visit_live".to_string());

        match visit_live().await {
            Ok(rows) => {
                logging::debug_file_async(format!("len:{}\r\n {:#?}", rows.len(), rows));
            }
            Err(why) => {
                logging::debug_file_async(format!("Failed to visit_live because {:?}", why));
            }
        }

        logging::debug_file_async("結束 visit_live".to_string());
    }

    #[tokio::test]
    #[ignore]
    async fn test_quote() {
        dotenv::dotenv().ok();
        logging::debug_file_async("開始 quote".to_string());

        match LiveSummary.quote("SHINE").await {
            Ok(record) => {
                dbg!(&record);
                logging::debug_file_async(format!("quote : {:#?}", record));
            }
            Err(why) => {
                logging::debug_file_async(format!("Failed to quote because {:?}", why));
            }
        }

        logging::debug_file_async("結束 quote".to_string());
    }
}

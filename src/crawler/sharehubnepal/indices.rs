use async_trait::async_trait;

use crate::{
    crawler::{
        fetch_page,
        sharehubnepal::{HOST, INDICES_COLUMNS},
        table::{extract, RowRecord},
        DataSource, MarketError,
    },
    declare::MergedRecord,
    util::map::Keyable,
};

const SOURCE: &str = "nepse-indices";

fn indices_url() -> String {
    format!("https://{}/nepse/indices", HOST)
}

/// NEPSE 指數單表來源，沒有 52 週高低，不產生衍生欄位
pub struct Indices;

#[async_trait]
impl DataSource for Indices {
    fn name(&self) -> &'static str {
        "indices"
    }

    async fn quote(&self, symbol: &str) -> Result<Option<MergedRecord>, MarketError> {
        let rows = visit().await?;

        // 同名指數取文件順序的第一筆
        Ok(rows
            .into_iter()
            .find(|row| row.key() == symbol)
            .map(single_table_record))
    }
}

async fn visit() -> Result<Vec<RowRecord>, MarketError> {
    let page = fetch_page(&indices_url(), SOURCE).await?;
    extract(&page, &INDICES_COLUMNS)
}

fn single_table_record(row: RowRecord) -> MergedRecord {
    let symbol = row.symbol().to_string();

    MergedRecord {
        symbol,
        fields: row.fields,
        down_from_high: None,
        up_from_low: None,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Local;

    use crate::{
        crawler::{table, RawPage},
        logging,
    };

    use super::*;

    const INDICES_HTML: &str = r#"
    <table>
      <tr><th>#</th><th>Indices</th><th>Value</th><th>Change</th><th>% Change</th></tr>
      <tr><td>1</td><td>NEPSE</td><td>2,145.60</td><td>12.45</td><td>0.58</td></tr>
      <tr><td>2</td><td>Banking SubIndex</td><td>1,250.33</td><td>-4.10</td><td>-0.33</td></tr>
    </table>"#;

    #[test]
    fn test_single_table_record() {
        let page = RawPage {
            source: SOURCE,
            fetched_at: Local::now(),
            body: INDICES_HTML.to_string(),
        };

        let rows = extract(&page, &INDICES_COLUMNS).unwrap();
        assert_eq!(rows.len(), 2);

        let record = rows
            .into_iter()
            .find(|row| row.key() == "NEPSE")
            .map(single_table_record)
            .expect("NEPSE should be present");

        assert_eq!(record.symbol, "NEPSE");
        assert_eq!(record.get(table::VALUE), Some("2145.60"));
        assert_eq!(record.get(table::CHANGE), Some("12.45"));
        // 單表來源沒有 52 週高低
        assert_eq!(record.down_from_high, None);
        assert_eq!(record.up_from_low, None);
    }

    #[tokio::test]
    #[ignore]
    async fn test_visit() {
        dotenv::dotenv().ok();
        logging::debug_file_async("開始 visit".to_string());

        match visit().await {
            Ok(rows) => {
                logging::debug_file_async(format!("len:{}\r\n {:#?}", rows.len(), rows));
            }
            Err(why) => {
                logging::debug_file_async(format!("Failed to visit because {:?}", why));
            }
        }

        logging::debug_file_async("結束 visit".to_string());
    }
}

use concat_string::concat_string;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};

use crate::{
    crawler::{MarketError, RawPage},
    util::{http::element, map::Keyable, text},
};

// 欄位名稱，回覆訊息依此順序輸出
pub const SYMBOL: &str = "Symbol";
pub const LTP: &str = "LTP";
pub const CHANGE_PERCENT: &str = "Change%";
pub const OPEN: &str = "Open";
pub const HIGH: &str = "High";
pub const LOW: &str = "Low";
pub const QTY: &str = "Qty";
pub const PREVIOUS_CLOSE: &str = "Prev. Close";
pub const CLOSE: &str = "Close";
pub const WEEK_52_HIGH: &str = "52 Week High";
pub const WEEK_52_LOW: &str = "52 Week Low";
pub const TURNOVER: &str = "Turnover";
pub const VALUE: &str = "Value";
pub const CHANGE: &str = "Change";

/// 欄位名稱對應表格欄位位置。
///
/// 兩個來源頁的表格欄位順序由站方固定，各頁面自行提供對應表。
#[derive(Debug, Clone, Copy)]
pub struct ColumnMap {
    pub columns: &'static [(&'static str, usize)],
}

impl ColumnMap {
    pub const fn new(columns: &'static [(&'static str, usize)]) -> Self {
        Self { columns }
    }
}

/// 表格裡的一列，欄位順序與 `ColumnMap` 相同，必含 Symbol 欄
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowRecord {
    pub source: &'static str,
    pub fields: Vec<(&'static str, String)>,
}

impl RowRecord {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn symbol(&self) -> &str {
        self.get(SYMBOL).unwrap_or_default()
    }

    /// 欄位值轉為 Decimal，無此欄位或無法解析時回傳 None
    pub fn decimal(&self, name: &str) -> Option<Decimal> {
        self.get(name)
            .and_then(|value| text::parse_decimal(value, None).ok())
    }
}

impl Keyable for RowRecord {
    fn key(&self) -> String {
        self.symbol().to_uppercase()
    }

    fn key_with_prefix(&self) -> String {
        concat_string!(self.source, ":", self.key())
    }
}

/// 解析頁面中的第一個表格。
///
/// 跳過表頭列後，依 `column_map` 把每一列轉成 [`RowRecord`]，
/// 輸出維持文件內的順序。欄位數不足的列直接略過，
/// 頁面上沒有表格時回傳 [`MarketError::NoTable`]。
pub fn extract(page: &RawPage, column_map: &ColumnMap) -> Result<Vec<RowRecord>, MarketError> {
    let document = Html::parse_document(&page.body);
    let table_selector =
        Selector::parse("table").map_err(|why| MarketError::Selector(format!("{:?}", why)))?;
    let row_selector =
        Selector::parse("tr").map_err(|why| MarketError::Selector(format!("{:?}", why)))?;

    let table = document
        .select(&table_selector)
        .next()
        .ok_or(MarketError::NoTable {
            site: page.source,
        })?;

    let mut rows = Vec::with_capacity(256);
    for node in table.select(&row_selector).skip(1) {
        if let Some(row) = parse_row(&node, column_map, page.source) {
            rows.push(row);
        }
    }

    Ok(rows)
}

/// 取出一列中對應表指到的每個儲存格，缺任何一格時整列略過
fn parse_row(node: &ElementRef, column_map: &ColumnMap, source: &'static str) -> Option<RowRecord> {
    let mut fields = Vec::with_capacity(column_map.columns.len());

    for (name, index) in column_map.columns {
        let cell = element::parse_value(node, &format!("td:nth-child({})", index + 1))?;
        fields.push((*name, text::normalize_cell(&cell)));
    }

    Some(RowRecord { source, fields })
}

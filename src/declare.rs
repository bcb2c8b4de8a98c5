use concat_string::concat_string;
use rust_decimal::Decimal;

use crate::util::map::Keyable;

/// 報價資料來源
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum QuoteSource {
    /// ShareSansar 即時盤與當日行情兩張表合併 "live-summary"
    LiveSummary,
    /// ShareHubNepal 指數單表 "indices"
    Indices,
}

impl QuoteSource {
    pub fn from_name(name: &str) -> QuoteSource {
        match name.trim() {
            "indices" => QuoteSource::Indices,
            _ => QuoteSource::LiveSummary,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            QuoteSource::LiveSummary => "live-summary",
            QuoteSource::Indices => "indices",
        }
    }

    pub fn iterator() -> impl Iterator<Item = Self> {
        [Self::LiveSummary, Self::Indices].iter().copied()
    }
}

/// 單一 Symbol 的合併報價。
///
/// `fields` 依表格欄位順序保存即時盤欄位與當日行情補上的欄位，
/// 衍生欄位無法計算時為 `None`，由呈現層顯示為 N/A，
/// 不會以 0 混充。
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRecord {
    pub symbol: String,
    pub fields: Vec<(&'static str, String)>,
    /// (52週高 − 現價) / 52週高 × 100，四捨五入至小數兩位
    pub down_from_high: Option<Decimal>,
    /// (現價 − 52週低) / 52週低 × 100，四捨五入至小數兩位
    pub up_from_low: Option<Decimal>,
}

impl MergedRecord {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value.as_str())
    }
}

impl Keyable for MergedRecord {
    fn key(&self) -> String {
        self.symbol.to_uppercase()
    }

    fn key_with_prefix(&self) -> String {
        concat_string!("quote:", self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_source_from_name() {
        assert_eq!(QuoteSource::from_name("indices"), QuoteSource::Indices);
        assert_eq!(
            QuoteSource::from_name("live-summary"),
            QuoteSource::LiveSummary
        );
        // 未設定時使用合併來源
        assert_eq!(QuoteSource::from_name(""), QuoteSource::LiveSummary);

        for source in QuoteSource::iterator() {
            assert_eq!(QuoteSource::from_name(source.name()), source);
        }
    }

    #[test]
    fn test_merged_record_key() {
        let record = MergedRecord {
            symbol: "Shine".to_string(),
            fields: vec![("Symbol", "Shine".to_string()), ("LTP", "450".to_string())],
            down_from_high: None,
            up_from_low: None,
        };

        assert_eq!(record.key(), "SHINE");
        assert_eq!(record.key_with_prefix(), "quote:SHINE");
        assert_eq!(record.get("LTP"), Some("450"));
        assert_eq!(record.get("Qty"), None);
    }
}

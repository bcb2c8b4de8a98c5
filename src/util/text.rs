use std::{collections::HashSet, str::FromStr};

use anyhow::*;
use rust_decimal::Decimal;

const NUMBER_ESCAPE_CHAR: &[char] = &['%', ',', ' ', '"', '\n'];

/// Parses a decimal value from a given string.
///
/// This function accepts a string representation of a decimal number,
/// potentially containing commas as thousands separators and other escape characters,
/// and attempts to convert it into a `Decimal`. If the conversion fails, an error is returned.
///
/// # Arguments
///
/// * `s`: A string slice containing the representation of a decimal number
///         that may include commas as thousands separators and other escape characters.
/// * `escape_chars`: Optional characters to be escaped from the input string.
///
/// # Returns
///
/// * `Result<Decimal>`: The parsed `Decimal` value if successful, or an error
///                      if the conversion fails.
pub fn parse_decimal(s: &str, escape_chars: Option<Vec<char>>) -> Result<Decimal> {
    let cleaned = clean_escape_chars(s, escape_chars);
    Decimal::from_str(&cleaned)
        .map_err(|why| anyhow!("Failed to parse '{}' as Decimal because {:?}", cleaned, why))
}

/// 儲存格文字正規化：看起來像數字的值移除千分位逗號後保留為字串，
/// 其餘文字僅去除前後空白。數值解析留給使用端。
pub fn normalize_cell(s: &str) -> String {
    let trimmed = s.trim();
    if looks_numeric(trimmed) {
        trimmed.replace(',', "")
    } else {
        trimmed.to_string()
    }
}

fn looks_numeric(s: &str) -> bool {
    !s.is_empty()
        && s.chars().any(|c| c.is_ascii_digit())
        && s.chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-' | '+' | '%'))
}

/// Removes a set of escape characters from a given string.
///
/// # Arguments
///
/// * `s`: The original string from which escape characters will be removed.
///
/// * `escape_chars`: Optional characters that will be removed from the
///                   string if found.
///
/// # Returns
///
/// * `String`: The cleaned string without any of the specified escape
///             characters.
pub(crate) fn clean_escape_chars(s: &str, escape_chars: Option<Vec<char>>) -> String {
    let mut combined: Vec<char> = NUMBER_ESCAPE_CHAR.to_vec();
    if let Some(ec) = escape_chars {
        combined.extend(ec);
    }

    let filters = combined.iter().collect::<HashSet<_>>();
    s.chars().filter(|c| !filters.contains(c)).collect()
}

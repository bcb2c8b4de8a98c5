use crate::crawler::table::{ColumnMap, CHANGE, CHANGE_PERCENT, SYMBOL, VALUE};

pub mod indices;

pub const HOST: &str = "sharehubnepal.com";

/// nepse/indices 頁的欄位位置，第 1 欄是指數名稱
pub(super) const INDICES_COLUMNS: ColumnMap = ColumnMap::new(&[
    (SYMBOL, 1),
    (VALUE, 2),
    (CHANGE, 3),
    (CHANGE_PERCENT, 4),
]);

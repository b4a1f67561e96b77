// ==========================================
// 加算判定引擎 - 行数据编解码工具
// ==========================================
// 职责: TEXT 列 ↔ 枚举 / JSON 列 ↔ 结构体
// ==========================================

use rusqlite::types::Type;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::str::FromStr;

/// TEXT 列 → FromStr 枚举
pub(crate) fn parse_text<T>(idx: usize, raw: &str) -> rusqlite::Result<T>
where
    T: FromStr<Err = String>,
{
    raw.parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

/// JSON 列 → 结构体
pub(crate) fn parse_json<T>(idx: usize, raw: &str) -> rusqlite::Result<T>
where
    T: DeserializeOwned,
{
    serde_json::from_str(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// 结构体 → JSON 列
pub(crate) fn to_json<T>(value: &T) -> Result<String, serde_json::Error>
where
    T: Serialize + ?Sized,
{
    serde_json::to_string(value)
}

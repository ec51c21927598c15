//! 共有値オブジェクト
//!
//! 複数の集約で使用される共通の値オブジェクトを定義

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// エンティティの基本トレイト
pub trait Entity {
    /// エンティティのID型
    type Id;

    /// エンティティのIDを取得
    fn id(&self) -> &Self::Id;
}

/// バックエンドが返す日時
///
/// SQLite の `CURRENT_TIMESTAMP` 形式 (`YYYY-MM-DD HH:MM:SS`) と
/// RFC 3339 / ISO 8601 形式の両方を受け付ける。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    const STORAGE_FORMAT: &'static str = "%Y-%m-%d %H:%M:%S";

    pub fn new(value: NaiveDateTime) -> Self {
        Self(value)
    }

    /// 現在時刻 (UTC)
    pub fn now() -> Self {
        Self(chrono::Utc::now().naive_utc())
    }

    /// 一覧表示用の日付ラベル
    pub fn date_label(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::STORAGE_FORMAT))
    }
}

impl FromStr for Timestamp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(value) = NaiveDateTime::parse_from_str(s, Self::STORAGE_FORMAT) {
            return Ok(Self(value));
        }
        if let Ok(value) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
            return Ok(Self(value));
        }
        DateTime::parse_from_rfc3339(s)
            .map(|value| Self(value.naive_utc()))
            .map_err(|_| format!("Invalid timestamp: {s}"))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

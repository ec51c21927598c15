//! バックエンド API のワイヤーフォーマット

use crate::domain::command::CommandId;
use crate::domain::mapping::{ButtonColor, ButtonMapping, ButtonSlot, MappingSnapshot};
use crate::domain::port::{PortId, UsbPort};
use crate::domain::shared::{RepositoryError, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// すべての JSON レスポンスの共通形式 `{success, data?, error?, message?}`
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// 成功したレスポンスの中身
#[derive(Debug)]
pub struct Accepted<T> {
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// `success` で分岐する。HTTP ステータスは見ない
    pub fn into_accepted(self) -> Result<Accepted<T>, RepositoryError> {
        if !self.success {
            let reason = self
                .error
                .or(self.message)
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(RepositoryError::rejected(reason));
        }
        Ok(Accepted {
            data: self.data,
            message: self.message,
        })
    }
}

impl<T> Accepted<T> {
    pub fn require_data(self) -> Result<T, RepositoryError> {
        self.data
            .ok_or_else(|| RepositoryError::malformed("response has no data"))
    }
}

/// `GET /button-mappings` の1スロット分
///
/// 古いバックエンドはコマンドIDだけを返し、新しいものは色も返す。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MappingRecord {
    Bare(Option<i64>),
    Detailed {
        #[serde(default)]
        command_id: Option<i64>,
        #[serde(default)]
        color: Option<String>,
        #[serde(default, alias = "is_preset_color")]
        is_preset: Option<bool>,
    },
}

impl MappingRecord {
    fn into_mapping(self, slot: ButtonSlot) -> ButtonMapping {
        let mut mapping = ButtonMapping::unmapped(slot);
        match self {
            MappingRecord::Bare(command_id) => {
                mapping.command_id = command_id.map(CommandId::new);
            }
            MappingRecord::Detailed {
                command_id,
                color,
                is_preset,
            } => {
                mapping.command_id = command_id.map(CommandId::new);
                mapping.color = color
                    .filter(|c| !c.is_empty())
                    .map(|c| ButtonColor::from_stored(c, is_preset.unwrap_or(true)));
            }
        }
        mapping
    }
}

/// スロット番号をキーにしたマップをスナップショットに変換する
///
/// 1〜6 以外のキーは無視する。
pub fn snapshot_from_records(records: BTreeMap<String, MappingRecord>) -> MappingSnapshot {
    let mappings = records
        .into_iter()
        .filter_map(|(key, record)| match key.parse::<ButtonSlot>() {
            Ok(slot) => Some(record.into_mapping(slot)),
            Err(e) => {
                warn!(key = %key, error = %e, "Ignoring mapping with invalid slot key");
                None
            }
        })
        .collect();
    MappingSnapshot::new(mappings)
}

/// `POST /button-mappings/color` の本体
#[derive(Debug, Serialize)]
pub struct ColorUpdate<'a> {
    pub button_number: u8,
    pub color: &'a str,
    pub is_preset: bool,
}

/// ポート疎通確認の本体 `{portId}`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortTestRequest<'a> {
    pub port_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct PortRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
}

impl TryFrom<PortRecord> for UsbPort {
    type Error = RepositoryError;

    fn try_from(record: PortRecord) -> Result<Self, Self::Error> {
        let id = PortId::new(record.id)
            .map_err(|e| RepositoryError::malformed(e.to_string()))?;
        let name = record
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| id.to_string());
        Ok(UsbPort::new(id, name).with_details(
            record.description,
            record.manufacturer,
            record.product,
        ))
    }
}

#[derive(Debug, Deserialize)]
pub struct ConnectionTestData {
    pub is_connected: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeviceResponseData {
    #[serde(default)]
    pub device_response: Option<String>,
}

/// `GET /health` は封筒形式ではない
#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
}

use super::PortError;
use crate::domain::shared::Notice;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// シリアル/USB エンドポイント (`COM3`, `/dev/ttyACM0` など)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PortId(String);

impl PortId {
    pub fn new(id: impl Into<String>) -> Result<Self, PortError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(PortError::EmptyId);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PortId {
    type Error = PortError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PortId> for String {
    fn from(id: PortId) -> Self {
        id.0
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PortId {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// クライアントから見たポートの疎通状態
///
/// `Unknown → {Unreachable | ReachableNoSerial → {SerialOk | SerialFailed}}`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProbeState {
    #[default]
    Unknown,
    Unreachable,
    ReachableNoSerial,
    SerialOk { device_response: Option<String> },
    SerialFailed { reason: String },
}

impl ProbeState {
    /// 第1段階の結果を反映する。`Unknown` 以外からは遷移しない
    pub fn after_basic_probe(self, is_connected: bool) -> Self {
        match self {
            ProbeState::Unknown if is_connected => ProbeState::ReachableNoSerial,
            ProbeState::Unknown => ProbeState::Unreachable,
            other => other,
        }
    }

    /// 第2段階の結果を反映する。`ReachableNoSerial` 以外からは遷移しない
    pub fn after_serial_probe(self, result: Result<Option<String>, String>) -> Self {
        match self {
            ProbeState::ReachableNoSerial => match result {
                Ok(device_response) => ProbeState::SerialOk { device_response },
                Err(reason) => ProbeState::SerialFailed { reason },
            },
            other => other,
        }
    }

    pub fn needs_serial_probe(&self) -> bool {
        matches!(self, ProbeState::ReachableNoSerial)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ProbeState::SerialOk { .. })
    }

    /// 利用者向けの結果メッセージ
    pub fn notice(&self, port: &PortId) -> Notice {
        match self {
            ProbeState::Unknown => Notice::info(format!("Port {port} has not been tested")),
            ProbeState::Unreachable => {
                Notice::warning(format!("Port {port} is unavailable or busy"))
            }
            ProbeState::ReachableNoSerial => Notice::info(format!(
                "Port {port} is reachable, serial communication not tested"
            )),
            ProbeState::SerialOk {
                device_response: Some(response),
            } => Notice::success(format!(
                "Port {port} is available and ready ✓ Device responded: {response}"
            )),
            ProbeState::SerialOk {
                device_response: None,
            } => Notice::success(format!(
                "Port {port} is available and ready ✓ Serial communication works"
            )),
            ProbeState::SerialFailed { reason } => Notice::warning(format!(
                "Port {port} is available but serial communication failed: {reason}"
            )),
        }
    }
}

use super::ConfigurationError;
use crate::domain::command::{Command, find_command};
use crate::domain::mapping::{ButtonMappingTable, DEFAULT_BUTTON_HEX};
use crate::domain::port::PortId;
use crate::domain::shared::{Notice, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// デバイス送信リクエスト
///
/// マッピング自体はサーバー側に保存済みなので、送るのはポートだけ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushRequest {
    #[serde(rename = "usbPort")]
    pub usb_port: PortId,
}

/// 送信前の条件: ポートが選択済みで、かつ1つ以上のスロットにコマンドがある
pub fn check_push_preconditions(
    selected_port: Option<&PortId>,
    mappings: &ButtonMappingTable,
) -> Result<PushRequest, ConfigurationError> {
    let port = selected_port.ok_or(ConfigurationError::NoPortSelected)?;
    if !mappings.has_any_command() {
        return Err(ConfigurationError::NoMappings);
    }
    Ok(PushRequest {
        usb_port: port.clone(),
    })
}

/// デバイス送信の結果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushOutcome {
    pub message: Option<String>,
    pub device_response: Option<String>,
}

impl PushOutcome {
    pub fn notice(&self) -> Notice {
        let mut message = self
            .message
            .clone()
            .unwrap_or_else(|| "Configuration sent to the device successfully!".to_string());
        if let Some(response) = self.device_response.as_deref().filter(|r| !r.is_empty()) {
            message.push_str(&format!(" Device response: {response}"));
        }
        Notice::success(message)
    }
}

/// デバイスとの接続状態 (最後の送信結果から判断)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionStatus {
    #[default]
    Unknown,
    Connected,
    Disconnected,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Unknown => write!(f, "Unknown"),
            ConnectionStatus::Connected => write!(f, "Connected"),
            ConnectionStatus::Disconnected => write!(f, "Not connected"),
        }
    }
}

/// バックエンドの死活情報
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendHealth {
    pub status: String,
    pub timestamp: Option<Timestamp>,
}

impl BackendHealth {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

/// デバイスの1ボタン分の設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchConfig {
    pub id: u8,
    pub name: String,
    pub channel: u8,
    pub cc: u16,
    pub value: u16,
    pub enabled: bool,
    pub color: String,
}

/// バックエンドがシリアルで送る `set_config` メッセージ
///
/// 6ボタンすべてを含み、未割り当てのボタンは `enabled: false`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    #[serde(rename = "type")]
    pub message_type: String,
    pub switches: Vec<SwitchConfig>,
}

impl DeviceConfig {
    pub const MIDI_CHANNEL: u8 = 1;

    pub fn build(mappings: &ButtonMappingTable, commands: &[Command]) -> Self {
        let switches = mappings
            .iter()
            .map(|mapping| {
                let command = mapping
                    .command_id
                    .and_then(|id| find_command(commands, id));
                let value = command.map(|c| c.value.get()).unwrap_or(0);
                SwitchConfig {
                    id: mapping.slot.number() - 1,
                    name: command
                        .map(|c| c.name.to_string())
                        .unwrap_or_else(|| format!("Inactive_{}", mapping.slot)),
                    channel: Self::MIDI_CHANNEL,
                    cc: value,
                    value,
                    enabled: command.is_some(),
                    color: mapping
                        .color
                        .as_ref()
                        .map(|c| c.resolve_hex())
                        .unwrap_or_else(|| DEFAULT_BUTTON_HEX.to_string()),
                }
            })
            .collect();

        Self {
            message_type: "set_config".to_string(),
            switches,
        }
    }

    pub fn enabled_count(&self) -> usize {
        self.switches.iter().filter(|s| s.enabled).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::command::{CommandDraft, CommandId};
    use crate::domain::mapping::{ButtonColor, ButtonSlot, PresetColor};

    fn slot(n: i64) -> ButtonSlot {
        ButtonSlot::new(n).unwrap()
    }

    #[test]
    fn test_push_blocked_without_port() {
        let mut table = ButtonMappingTable::new();
        table.set_command(slot(1), Some(CommandId::new(1)));
        assert_eq!(
            check_push_preconditions(None, &table),
            Err(ConfigurationError::NoPortSelected)
        );
    }

    #[test]
    fn test_push_blocked_without_mappings() {
        let port = PortId::new("COM3").unwrap();
        let table = ButtonMappingTable::new();
        let result = check_push_preconditions(Some(&port), &table);
        assert_eq!(result, Err(ConfigurationError::NoMappings));
        assert!(result.unwrap_err().is_precondition());
    }

    #[test]
    fn test_push_allowed_with_port_and_mapping() {
        let port = PortId::new("COM3").unwrap();
        let mut table = ButtonMappingTable::new();
        table.set_command(slot(1), Some(CommandId::new(1)));
        let request = check_push_preconditions(Some(&port), &table).unwrap();
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"usbPort": "COM3"})
        );
    }

    #[test]
    fn test_push_outcome_notice() {
        let outcome = PushOutcome {
            message: None,
            device_response: Some("config_ack".into()),
        };
        let notice = outcome.notice();
        assert!(notice.message.starts_with("Configuration sent"));
        assert!(notice.message.ends_with("Device response: config_ack"));
    }

    #[test]
    fn test_device_config_covers_all_switches() {
        let commands = vec![Command::from_draft(
            CommandId::new(7),
            CommandDraft::new("Looper", 64).unwrap(),
        )];
        let mut table = ButtonMappingTable::new();
        table.set_command(slot(2), Some(CommandId::new(7)));
        table.set_color(slot(2), ButtonColor::preset(PresetColor::Green));
        table.set_command(slot(3), Some(CommandId::new(404)));
        table.set_color(slot(4), ButtonColor::custom("#112233").unwrap());

        let config = DeviceConfig::build(&table, &commands);
        assert_eq!(config.message_type, "set_config");
        assert_eq!(config.switches.len(), 6);
        assert_eq!(config.enabled_count(), 1);

        let looper = &config.switches[1];
        assert_eq!(looper.id, 1);
        assert_eq!(looper.name, "Looper");
        assert_eq!((looper.cc, looper.value), (64, 64));
        assert_eq!(looper.color, "#28a745");

        // 参照先が存在しないコマンドは無効扱い
        assert!(!config.switches[2].enabled);
        assert_eq!(config.switches[2].name, "Inactive_3");
        assert_eq!(config.switches[3].color, "#112233");
        assert_eq!(config.switches[5].color, DEFAULT_BUTTON_HEX);
    }
}

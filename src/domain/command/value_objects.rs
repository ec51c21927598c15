use super::CommandError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// コマンド値の上限 (16bit)
pub const MAX_COMMAND_VALUE: i64 = 65_535;

/// バックエンドが採番するコマンドID
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandId(i64);

impl CommandId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 前後の空白を除去した、空でないコマンド名
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommandName(String);

impl CommandName {
    pub fn parse(raw: &str) -> Result<Self, CommandError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CommandError::EmptyName);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CommandName {
    type Error = CommandError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CommandName> for String {
    fn from(name: CommandName) -> Self {
        name.0
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 0〜65535 のコマンド値
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u16")]
pub struct CommandValue(u16);

impl CommandValue {
    pub fn new(value: i64) -> Result<Self, CommandError> {
        u16::try_from(value)
            .map(Self)
            .map_err(|_| CommandError::ValueOutOfRange(value))
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

impl TryFrom<i64> for CommandValue {
    type Error = CommandError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CommandValue> for u16 {
    fn from(value: CommandValue) -> Self {
        value.0
    }
}

impl fmt::Display for CommandValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 作成・更新リクエストの本体 `{name, value}`
///
/// 生成できた時点で名前と値の検証は済んでいる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDraft {
    pub name: CommandName,
    pub value: CommandValue,
}

impl CommandDraft {
    pub fn new(name: &str, value: i64) -> Result<Self, CommandError> {
        Ok(Self {
            name: CommandName::parse(name)?,
            value: CommandValue::new(value)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_name_is_trimmed() {
        let name = CommandName::parse("  Start Recording \n").unwrap();
        assert_eq!(name.as_str(), "Start Recording");
        assert_eq!(CommandName::parse("   "), Err(CommandError::EmptyName));
        assert_eq!(CommandName::parse(""), Err(CommandError::EmptyName));
    }

    #[test]
    fn test_command_value_bounds() {
        assert_eq!(CommandValue::new(0).unwrap().get(), 0);
        assert_eq!(CommandValue::new(MAX_COMMAND_VALUE).unwrap().get(), 65_535);
        assert_eq!(
            CommandValue::new(-1),
            Err(CommandError::ValueOutOfRange(-1))
        );
        assert_eq!(
            CommandValue::new(65_536),
            Err(CommandError::ValueOutOfRange(65_536))
        );
    }

    #[test]
    fn test_draft_serializes_as_request_body() {
        let draft = CommandDraft::new(" Play/Pause ", 102).unwrap();
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json, serde_json::json!({"name": "Play/Pause", "value": 102}));
    }

    #[test]
    fn test_out_of_range_value_is_rejected_on_deserialize() {
        let result: Result<CommandValue, _> = serde_json::from_str("70000");
        assert!(result.is_err());
    }
}

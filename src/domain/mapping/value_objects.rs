use super::MappingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 物理ボタンの数
pub const SLOT_COUNT: usize = 6;

/// 色が未設定、または解釈できないときにデバイスへ送る色
pub const DEFAULT_BUTTON_HEX: &str = "#667eea";

/// ボタンスロット (1〜6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct ButtonSlot(u8);

impl ButtonSlot {
    pub const ALL: [ButtonSlot; SLOT_COUNT] = [
        ButtonSlot(1),
        ButtonSlot(2),
        ButtonSlot(3),
        ButtonSlot(4),
        ButtonSlot(5),
        ButtonSlot(6),
    ];

    pub fn new(number: i64) -> Result<Self, MappingError> {
        match u8::try_from(number) {
            Ok(n) if (1..=SLOT_COUNT as u8).contains(&n) => Ok(Self(n)),
            _ => Err(MappingError::InvalidSlot(number)),
        }
    }

    /// 1始まりのボタン番号
    pub fn number(self) -> u8 {
        self.0
    }

    /// 0始まりの配列インデックス
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }
}

impl TryFrom<i64> for ButtonSlot {
    type Error = MappingError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ButtonSlot> for u8 {
    fn from(slot: ButtonSlot) -> Self {
        slot.0
    }
}

impl fmt::Display for ButtonSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ButtonSlot {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number = s
            .trim()
            .parse::<i64>()
            .map_err(|_| MappingError::UnparsableSlot(s.to_string()))?;
        Self::new(number)
    }
}

/// 既定のカラーパレット
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetColor {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
    Teal,
    Pink,
    Indigo,
    Cyan,
}

impl PresetColor {
    pub const ALL: [PresetColor; 10] = [
        PresetColor::Red,
        PresetColor::Blue,
        PresetColor::Green,
        PresetColor::Yellow,
        PresetColor::Purple,
        PresetColor::Orange,
        PresetColor::Teal,
        PresetColor::Pink,
        PresetColor::Indigo,
        PresetColor::Cyan,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PresetColor::Red => "red",
            PresetColor::Blue => "blue",
            PresetColor::Green => "green",
            PresetColor::Yellow => "yellow",
            PresetColor::Purple => "purple",
            PresetColor::Orange => "orange",
            PresetColor::Teal => "teal",
            PresetColor::Pink => "pink",
            PresetColor::Indigo => "indigo",
            PresetColor::Cyan => "cyan",
        }
    }

    pub fn hex(&self) -> &'static str {
        match self {
            PresetColor::Red => "#dc3545",
            PresetColor::Blue => "#007bff",
            PresetColor::Green => "#28a745",
            PresetColor::Yellow => "#ffc107",
            PresetColor::Purple => "#6f42c1",
            PresetColor::Orange => "#fd7e14",
            PresetColor::Teal => "#20c997",
            PresetColor::Pink => "#e83e8c",
            PresetColor::Indigo => "#6610f2",
            PresetColor::Cyan => "#17a2b8",
        }
    }
}

impl fmt::Display for PresetColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PresetColor {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        PresetColor::ALL
            .into_iter()
            .find(|color| color.name() == wanted)
            .ok_or_else(|| MappingError::InvalidColor(s.to_string()))
    }
}

/// `#rrggbb` 形式か
pub fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// ボタンの表示色
///
/// バックエンドとは `{color, is_preset}` の組でやり取りする。
/// `is_preset` が真なら `value` はパレット名、偽なら任意の色値。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ButtonColor {
    pub value: String,
    pub is_preset: bool,
}

impl ButtonColor {
    pub fn preset(color: PresetColor) -> Self {
        Self {
            value: color.name().to_string(),
            is_preset: true,
        }
    }

    pub fn custom(hex: &str) -> Result<Self, MappingError> {
        let hex = hex.trim();
        if !is_hex_color(hex) {
            return Err(MappingError::InvalidColor(hex.to_string()));
        }
        Ok(Self {
            value: hex.to_ascii_lowercase(),
            is_preset: false,
        })
    }

    /// バックエンドが保存している値をそのまま受け取る
    pub fn from_stored(value: impl Into<String>, is_preset: bool) -> Self {
        Self {
            value: value.into(),
            is_preset,
        }
    }

    /// パレット名なら既定色、`#rrggbb` ならカスタム色として解釈する
    pub fn parse(input: &str) -> Result<Self, MappingError> {
        match input.parse::<PresetColor>() {
            Ok(preset) => Ok(Self::preset(preset)),
            Err(_) => Self::custom(input),
        }
    }

    /// デバイスへ送る16進カラー
    pub fn resolve_hex(&self) -> String {
        if self.is_preset
            && let Ok(preset) = self.value.parse::<PresetColor>()
        {
            return preset.hex().to_string();
        }
        if is_hex_color(&self.value) {
            return self.value.clone();
        }
        DEFAULT_BUTTON_HEX.to_string()
    }
}

impl fmt::Display for ButtonColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_preset {
            f.write_str(&self.value)
        } else {
            write!(f, "custom {}", self.value)
        }
    }
}

/// スロットの表示ラベル
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotLabel {
    Unmapped,
    Command(String),
    /// 参照先のコマンドがレジストリに存在しない
    UnknownCommand,
}

impl fmt::Display for SlotLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotLabel::Unmapped => write!(f, "Not mapped"),
            SlotLabel::Command(name) => f.write_str(name),
            SlotLabel::UnknownCommand => write!(f, "Unknown command"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_bounds() {
        assert!(ButtonSlot::new(0).is_err());
        assert!(ButtonSlot::new(7).is_err());
        let slot = ButtonSlot::new(6).unwrap();
        assert_eq!(slot.number(), 6);
        assert_eq!(slot.index(), 5);
        assert_eq!("3".parse::<ButtonSlot>().unwrap().number(), 3);
        assert!("three".parse::<ButtonSlot>().is_err());
    }

    #[test]
    fn test_color_parsing() {
        let red = ButtonColor::parse("Red").unwrap();
        assert_eq!(red, ButtonColor::preset(PresetColor::Red));
        assert_eq!(red.resolve_hex(), "#dc3545");

        let custom = ButtonColor::parse("#A1B2C3").unwrap();
        assert!(!custom.is_preset);
        assert_eq!(custom.resolve_hex(), "#a1b2c3");

        assert!(ButtonColor::parse("mauve").is_err());
        assert!(ButtonColor::parse("#12345").is_err());
    }

    #[test]
    fn test_unresolvable_color_falls_back_to_default() {
        let unknown_preset = ButtonColor::from_stored("mauve", true);
        assert_eq!(unknown_preset.resolve_hex(), DEFAULT_BUTTON_HEX);

        let broken_custom = ButtonColor::from_stored("rgb(1,2,3)", false);
        assert_eq!(broken_custom.resolve_hex(), DEFAULT_BUTTON_HEX);
    }

    #[test]
    fn test_slot_labels() {
        assert_eq!(SlotLabel::Unmapped.to_string(), "Not mapped");
        assert_eq!(SlotLabel::UnknownCommand.to_string(), "Unknown command");
        assert_eq!(SlotLabel::Command("Stop".into()).to_string(), "Stop");
    }
}

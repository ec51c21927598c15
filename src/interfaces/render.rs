//! 一覧の端末表示
//!
//! ビューを組み立てて文字列で返す。出力は呼び出し側で行う。

use crate::application::SessionState;
use crate::domain::command::Command;
use crate::domain::configuration::DeviceConfig;
use crate::domain::mapping::{ButtonSlot, DEFAULT_BUTTON_HEX, PresetColor};
use crate::domain::port::{PortId, UsbPort};
use crate::domain::preset::Preset;
use std::fmt::Write;

pub fn commands(commands: &[Command], from_fallback: bool) -> String {
    if commands.is_empty() {
        return "No commands yet. Add the first one with `commands add <NAME> <VALUE>`.".to_string();
    }

    let width = commands
        .iter()
        .map(|c| c.name.as_str().chars().count())
        .max()
        .unwrap_or(4)
        .max(4);
    let mut out = String::new();
    if from_fallback {
        out.push_str("(offline sample data)\n");
    }
    let _ = writeln!(out, "{:>4}  {:<width$}  {:>5}  CREATED", "ID", "NAME", "VALUE");
    for command in commands {
        let created = command
            .created_at
            .map(|t| t.date_label())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:>4}  {:<width$}  {:>5}  {}",
            command.id,
            command.name.as_str(),
            command.value,
            created
        );
    }
    out
}

pub fn mappings(session: &SessionState) -> String {
    let mut out = String::new();
    for slot in ButtonSlot::ALL {
        let mapping = session.mappings().slot(slot);
        let color = mapping
            .color
            .as_ref()
            .map(|c| format!("{c} ({})", c.resolve_hex()))
            .unwrap_or_else(|| format!("default ({DEFAULT_BUTTON_HEX})"));
        let _ = writeln!(
            out,
            "Button {slot}  {:<24}  {color}",
            session.slot_label(slot).to_string()
        );
    }
    out
}

pub fn palette() -> String {
    PresetColor::ALL
        .iter()
        .map(|c| format!("{:<7} {}", c.name(), c.hex()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn presets(presets: &[Preset]) -> String {
    if presets.is_empty() {
        return "No saved presets".to_string();
    }
    let mut out = String::new();
    for preset in presets {
        let created = preset
            .created_at
            .map(|t| t.date_label())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:>4}  {}  [{}]  {}",
            preset.id,
            preset.name,
            created,
            preset.description_or_placeholder()
        );
    }
    out
}

pub fn ports(ports: &[UsbPort], selected: Option<&PortId>) -> String {
    if ports.is_empty() {
        return "No ports available".to_string();
    }
    let mut out = String::new();
    for port in ports {
        let marker = if Some(&port.id) == selected { "*" } else { " " };
        let _ = write!(out, "{marker} {:<14} {}", port.id.as_str(), port.name);
        let details: Vec<&str> = [&port.manufacturer, &port.product, &port.description]
            .into_iter()
            .filter_map(|d| d.as_deref())
            .collect();
        if !details.is_empty() {
            let _ = write!(out, "  ({})", details.join(", "));
        }
        out.push('\n');
    }
    out
}

pub fn device_config(config: &DeviceConfig) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(config)
}

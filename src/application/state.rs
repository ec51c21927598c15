//! クライアント側のセッション状態
//!
//! バックエンドが唯一の正であり、ここに置くのは表示用の写しだけ。
//! 変更は型付きのメソッド経由でのみ行う。

use crate::domain::command::{Command, CommandId};
use crate::domain::configuration::ConnectionStatus;
use crate::domain::mapping::{
    ButtonColor, ButtonMappingTable, ButtonSlot, MappingSnapshot, SLOT_COUNT, SlotLabel,
};
use crate::domain::port::{PortError, PortId, UsbPort};
use crate::domain::preset::Preset;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

/// ユースケース間で共有するセッション
///
/// ロックを保持したままバックエンド呼び出しを待たないこと。
pub type SharedSession = Arc<RwLock<SessionState>>;

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    commands: Vec<Command>,
    commands_from_fallback: bool,
    mappings: ButtonMappingTable,
    presets: Vec<Preset>,
    ports: Vec<UsbPort>,
    selected_port: Option<PortId>,
    connection: ConnectionStatus,
}

/// ポート一覧更新の結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortRefresh {
    pub port_count: usize,
    /// 選択中だったが一覧から消えたポート
    pub lost_selection: Option<PortId>,
    /// バックエンドに届かず、オフライン用の一覧で埋めた
    pub from_fallback: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(self) -> SharedSession {
        Arc::new(RwLock::new(self))
    }

    // --- commands ---

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn commands_from_fallback(&self) -> bool {
        self.commands_from_fallback
    }

    pub fn replace_commands(&mut self, commands: Vec<Command>, from_fallback: bool) {
        self.commands = commands;
        self.commands_from_fallback = from_fallback;
    }

    pub fn command_name(&self, id: CommandId) -> Option<String> {
        self.commands
            .iter()
            .find(|command| command.id == id)
            .map(|command| command.name.to_string())
    }

    // --- mappings ---

    pub fn mappings(&self) -> &ButtonMappingTable {
        &self.mappings
    }

    pub fn set_slot_command(&mut self, slot: ButtonSlot, command_id: Option<CommandId>) {
        self.mappings.set_command(slot, command_id);
    }

    pub fn set_slot_color(&mut self, slot: ButtonSlot, color: ButtonColor) {
        self.mappings.set_color(slot, color);
    }

    /// 削除されたコマンドを参照しているスロットを未割り当てにする
    pub fn scrub_command(&mut self, command_id: CommandId) -> Vec<ButtonSlot> {
        self.mappings.clear_command(command_id)
    }

    pub fn replace_mappings(&mut self, snapshot: MappingSnapshot) {
        self.mappings.replace_with(snapshot);
    }

    pub fn slot_label(&self, slot: ButtonSlot) -> SlotLabel {
        self.mappings.label(slot, &self.commands)
    }

    // --- presets ---

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn replace_presets(&mut self, presets: Vec<Preset>) {
        self.presets = presets;
    }

    // --- ports ---

    pub fn ports(&self) -> &[UsbPort] {
        &self.ports
    }

    pub fn selected_port(&self) -> Option<&PortId> {
        self.selected_port.as_ref()
    }

    /// 一覧を差し替え、選択中のポートが消えていれば選択を解除する
    pub fn replace_ports(&mut self, ports: Vec<UsbPort>) -> PortRefresh {
        self.ports = ports;
        let vanished = self
            .selected_port
            .as_ref()
            .is_some_and(|selected| !self.ports.iter().any(|port| &port.id == selected));
        let lost_selection = if vanished {
            self.selected_port.take()
        } else {
            None
        };
        PortRefresh {
            port_count: self.ports.len(),
            lost_selection,
            from_fallback: false,
        }
    }

    /// 一覧にあるポートだけを選択できる
    pub fn select_port(&mut self, port: PortId) -> Result<(), PortError> {
        if !self.ports.iter().any(|known| known.id == port) {
            return Err(PortError::NotAvailable(port));
        }
        self.selected_port = Some(port);
        Ok(())
    }

    // --- device ---

    pub fn connection(&self) -> ConnectionStatus {
        self.connection
    }

    pub fn set_connection(&mut self, connection: ConnectionStatus) {
        self.connection = connection;
    }

    /// 送信ボタンが有効か (ポート選択済み かつ 割り当て1件以上)
    pub fn can_push(&self) -> bool {
        self.selected_port.is_some() && self.mappings.has_any_command()
    }

    pub fn summary(&self) -> StatusSummary {
        StatusSummary {
            command_count: self.commands.len(),
            mapped_count: self.mappings.mapped_count(),
            slot_count: SLOT_COUNT,
            selected_port: self.selected_port.clone(),
            connection: self.connection,
            can_push: self.can_push(),
        }
    }
}

/// ステータスバー相当の要約
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub command_count: usize,
    pub mapped_count: usize,
    pub slot_count: usize,
    pub selected_port: Option<PortId>,
    pub connection: ConnectionStatus,
    pub can_push: bool,
}

impl fmt::Display for StatusSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let port = self
            .selected_port
            .as_ref()
            .map(PortId::to_string)
            .unwrap_or_else(|| "none".to_string());
        write!(
            f,
            "Commands: {} | Mapped: {}/{} | Port: {} | {}",
            self.command_count, self.mapped_count, self.slot_count, port, self.connection
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(id: &str) -> UsbPort {
        UsbPort::new(PortId::new(id).unwrap(), format!("{id} - test"))
    }

    #[test]
    fn test_select_requires_known_port() {
        let mut state = SessionState::new();
        state.replace_ports(vec![port("COM3")]);
        assert!(state.select_port(PortId::new("COM9").unwrap()).is_err());
        assert!(state.select_port(PortId::new("COM3").unwrap()).is_ok());
        assert_eq!(state.selected_port().map(PortId::as_str), Some("COM3"));
    }

    #[test]
    fn test_lost_port_resets_selection_and_disables_push() {
        let mut state = SessionState::new();
        state.replace_ports(vec![port("COM3"), port("COM4")]);
        state.select_port(PortId::new("COM3").unwrap()).unwrap();
        state.set_slot_command(ButtonSlot::new(1).unwrap(), Some(CommandId::new(1)));
        assert!(state.can_push());

        let refresh = state.replace_ports(vec![port("COM4")]);
        assert_eq!(refresh.lost_selection, Some(PortId::new("COM3").unwrap()));
        assert!(state.selected_port().is_none());
        assert!(!state.can_push());

        // 既に解除済みなので2回目は何も報告しない
        let again = state.replace_ports(vec![port("COM4")]);
        assert_eq!(again.lost_selection, None);
    }

    #[test]
    fn test_summary_display() {
        let mut state = SessionState::new();
        state.set_slot_command(ButtonSlot::new(2).unwrap(), Some(CommandId::new(5)));
        let summary = state.summary();
        assert_eq!(summary.mapped_count, 1);
        assert_eq!(
            summary.to_string(),
            "Commands: 0 | Mapped: 1/6 | Port: none | Unknown"
        );
    }
}

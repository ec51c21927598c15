//! オフライン時の代替データ
//!
//! バックエンドに到達できないとき、初回のコマンド/ポート読み込みを
//! 空のままにせず代替データで埋める。無効化も差し替えもできる。

use crate::domain::command::{Command, CommandDraft, CommandId};
use crate::domain::port::{PortId, UsbPort};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfflineFallback {
    enabled: bool,
    commands: Vec<Command>,
    ports: Vec<UsbPort>,
}

impl Default for OfflineFallback {
    fn default() -> Self {
        Self::sample()
    }
}

impl OfflineFallback {
    /// 組み込みのサンプルデータを使う
    pub fn sample() -> Self {
        let commands = [
            ("Start Recording", 100),
            ("Stop Recording", 101),
            ("Play/Pause", 102),
        ]
        .into_iter()
        .zip(1..)
        .filter_map(|((name, value), id)| {
            CommandDraft::new(name, value)
                .ok()
                .map(|draft| Command::from_draft(CommandId::new(id), draft))
        })
        .collect();

        let ports = [("COM1", "COM1 - Test Port 1"), ("COM2", "COM2 - Test Port 2")]
            .into_iter()
            .filter_map(|(id, name)| PortId::new(id).ok().map(|id| UsbPort::new(id, name)))
            .collect();

        Self {
            enabled: true,
            commands,
            ports,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            commands: Vec::new(),
            ports: Vec::new(),
        }
    }

    pub fn with_commands(mut self, commands: Vec<Command>) -> Self {
        self.commands = commands;
        self
    }

    pub fn with_ports(mut self, ports: Vec<UsbPort>) -> Self {
        self.ports = ports;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn ports(&self) -> &[UsbPort] {
        &self.ports
    }
}

use super::value_objects::*;
use crate::domain::command::{Command, CommandId, find_command};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 1スロット分のマッピング
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonMapping {
    pub slot: ButtonSlot,
    pub command_id: Option<CommandId>,
    pub color: Option<ButtonColor>,
}

impl ButtonMapping {
    pub fn unmapped(slot: ButtonSlot) -> Self {
        Self {
            slot,
            command_id: None,
            color: None,
        }
    }

    pub fn with_command(mut self, command_id: CommandId) -> Self {
        self.command_id = Some(command_id);
        self
    }

    pub fn with_color(mut self, color: ButtonColor) -> Self {
        self.color = Some(color);
        self
    }

    pub fn is_mapped(&self) -> bool {
        self.command_id.is_some()
    }

    /// 現在のレジストリに照らしたラベル
    pub fn label(&self, commands: &[Command]) -> SlotLabel {
        match self.command_id {
            None => SlotLabel::Unmapped,
            Some(id) => match find_command(commands, id) {
                Some(command) => SlotLabel::Command(command.name.to_string()),
                None => SlotLabel::UnknownCommand,
            },
        }
    }
}

/// バックエンドから取得したマッピング一覧
///
/// 含まれないスロットは未割り当てとして扱う。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingSnapshot {
    pub mappings: Vec<ButtonMapping>,
}

impl MappingSnapshot {
    pub fn new(mappings: Vec<ButtonMapping>) -> Self {
        Self { mappings }
    }
}

/// 一括保存リクエスト `{"<slot>": <command_id>, ...}`
///
/// 未割り当てのスロットは null として送らず、キーごと省く。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BulkMappingPayload(BTreeMap<String, i64>);

impl BulkMappingPayload {
    pub fn entries(&self) -> &BTreeMap<String, i64> {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains_slot(&self, slot: ButtonSlot) -> bool {
        self.0.contains_key(&slot.to_string())
    }
}

/// 6スロット固定のマッピング表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonMappingTable {
    slots: [ButtonMapping; SLOT_COUNT],
}

impl Default for ButtonMappingTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ButtonMappingTable {
    pub fn new() -> Self {
        Self {
            slots: ButtonSlot::ALL.map(ButtonMapping::unmapped),
        }
    }

    pub fn from_snapshot(snapshot: MappingSnapshot) -> Self {
        let mut table = Self::new();
        table.replace_with(snapshot);
        table
    }

    pub fn slot(&self, slot: ButtonSlot) -> &ButtonMapping {
        &self.slots[slot.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &ButtonMapping> {
        self.slots.iter()
    }

    pub fn set_command(&mut self, slot: ButtonSlot, command_id: Option<CommandId>) {
        self.slots[slot.index()].command_id = command_id;
    }

    pub fn set_color(&mut self, slot: ButtonSlot, color: ButtonColor) {
        self.slots[slot.index()].color = Some(color);
    }

    /// 削除されたコマンドへの参照を外し、影響を受けたスロットを返す
    pub fn clear_command(&mut self, command_id: CommandId) -> Vec<ButtonSlot> {
        let mut cleared = Vec::new();
        for mapping in self.slots.iter_mut() {
            if mapping.command_id == Some(command_id) {
                mapping.command_id = None;
                cleared.push(mapping.slot);
            }
        }
        cleared
    }

    /// 表全体をスナップショットで置き換える (マージはしない)
    pub fn replace_with(&mut self, snapshot: MappingSnapshot) {
        self.slots = ButtonSlot::ALL.map(ButtonMapping::unmapped);
        for mapping in snapshot.mappings {
            let index = mapping.slot.index();
            self.slots[index] = mapping;
        }
    }

    pub fn has_any_command(&self) -> bool {
        self.slots.iter().any(ButtonMapping::is_mapped)
    }

    pub fn mapped_count(&self) -> usize {
        self.slots.iter().filter(|m| m.is_mapped()).count()
    }

    pub fn bulk_payload(&self) -> BulkMappingPayload {
        BulkMappingPayload(
            self.slots
                .iter()
                .filter_map(|m| m.command_id.map(|id| (m.slot.to_string(), id.get())))
                .collect(),
        )
    }

    pub fn label(&self, slot: ButtonSlot, commands: &[Command]) -> SlotLabel {
        self.slot(slot).label(commands)
    }
}

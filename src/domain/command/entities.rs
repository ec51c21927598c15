use super::value_objects::*;
use crate::domain::shared::{Entity, Timestamp};
use serde::{Deserialize, Serialize};

/// 名前付き MIDI コマンド
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub id: CommandId,
    pub name: CommandName,
    pub value: CommandValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl Command {
    pub fn new(id: CommandId, name: CommandName, value: CommandValue) -> Self {
        Self {
            id,
            name,
            value,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn from_draft(id: CommandId, draft: CommandDraft) -> Self {
        Self::new(id, draft.name, draft.value)
    }

    pub fn with_timestamps(mut self, created_at: Timestamp, updated_at: Timestamp) -> Self {
        self.created_at = Some(created_at);
        self.updated_at = Some(updated_at);
        self
    }

    /// 選択肢表示用 `Name (value)`
    pub fn display_label(&self) -> String {
        format!("{} ({})", self.name, self.value)
    }
}

impl Entity for Command {
    type Id = CommandId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// ID でコマンドを探す
pub fn find_command(commands: &[Command], id: CommandId) -> Option<&Command> {
    commands.iter().find(|command| command.id == id)
}

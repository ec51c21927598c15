use crate::application::OfflineFallback;
use crate::domain::command::{Command, CommandDraft, CommandId, CommandRepository};
use crate::domain::configuration::{
    BackendHealth, ConfigurationRepository, PushOutcome, PushRequest,
};
use crate::domain::mapping::{
    BulkMappingPayload, ButtonColor, ButtonMappingTable, ButtonSlot,
    MappingRepository, MappingSnapshot,
};
use crate::domain::port::{PortId, PortListing, PortRepository, UsbPort};
use crate::domain::preset::{Preset, PresetDraft, PresetId, PresetRepository};
use crate::domain::shared::{RepositoryError, Timestamp};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// バックエンドが受け取ったリクエストの記録
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    ListCommands,
    CreateCommand(CommandDraft),
    UpdateCommand(CommandId, CommandDraft),
    DeleteCommand(CommandId),
    LoadMappings,
    SaveMappings(BulkMappingPayload),
    SaveColor(ButtonSlot, ButtonColor),
    ListPresets,
    SavePreset(PresetDraft),
    LoadPreset(PresetId),
    DeletePreset(PresetId),
    ListPorts,
    TestConnection(PortId),
    TestSerial(PortId),
    PushConfiguration(PushRequest),
    CheckHealth,
}

impl BackendCall {
    /// 状態を変更するリクエストか
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            BackendCall::CreateCommand(_)
                | BackendCall::UpdateCommand(..)
                | BackendCall::DeleteCommand(_)
                | BackendCall::SaveMappings(_)
                | BackendCall::SaveColor(..)
                | BackendCall::SavePreset(_)
                | BackendCall::LoadPreset(_)
                | BackendCall::DeletePreset(_)
                | BackendCall::PushConfiguration(_)
        )
    }
}

/// ポートごとの疎通確認の応答
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortProbe {
    pub connected: bool,
    /// `Err` はシリアル通信の失敗理由
    pub serial: Result<Option<String>, String>,
}

impl PortProbe {
    pub fn ready(device_response: Option<&str>) -> Self {
        Self {
            connected: true,
            serial: Ok(device_response.map(str::to_string)),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            connected: false,
            serial: Err("Port is not open".to_string()),
        }
    }

    pub fn serial_broken(reason: &str) -> Self {
        Self {
            connected: true,
            serial: Err(reason.to_string()),
        }
    }
}

#[derive(Debug, Default)]
struct BackendData {
    commands: Vec<Command>,
    next_command_id: i64,
    mappings: ButtonMappingTable,
    presets: Vec<(Preset, MappingSnapshot)>,
    next_preset_id: i64,
    ports: Vec<UsbPort>,
    probes: HashMap<PortId, PortProbe>,
    device_response: Option<String>,
    failure: Option<RepositoryError>,
    mapping_save_failure: Option<RepositoryError>,
    calls: Vec<BackendCall>,
}

impl BackendData {
    /// 呼び出しを記録し、失敗が注入されていればそれを返す
    fn record(&mut self, call: BackendCall) -> Result<(), RepositoryError> {
        debug!(?call, "In-memory backend request");
        self.calls.push(call);
        match &self.failure {
            Some(failure) => Err(failure.clone()),
            None => Ok(()),
        }
    }

    fn probe(&self, port: &PortId) -> PortProbe {
        if let Some(probe) = self.probes.get(port) {
            return probe.clone();
        }
        if self.ports.iter().any(|p| &p.id == port) {
            PortProbe::ready(None)
        } else {
            PortProbe::unreachable()
        }
    }
}

/// プロセス内で完結するバックエンド
///
/// `--demo` モードとテストで使う。HTTP バックエンドと同じ規則で
/// コマンド・マッピング・プリセットを保持し、受け取ったリクエストを記録する。
/// クローンは同じ状態を共有する。
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    data: Arc<RwLock<BackendData>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// オフライン用のサンプルデータを初期値として使う
    pub fn seeded(fallback: &OfflineFallback) -> Self {
        let commands = fallback.commands().to_vec();
        let next_command_id = commands.iter().map(|c| c.id.get()).max().unwrap_or(0);
        let data = BackendData {
            commands,
            next_command_id,
            ports: fallback.ports().to_vec(),
            device_response: Some("MIDI Device active".to_string()),
            ..Default::default()
        };
        Self {
            data: Arc::new(RwLock::new(data)),
        }
    }

    pub async fn insert_command(&self, name: &str, value: i64) -> Result<Command, RepositoryError> {
        let draft = CommandDraft::new(name, value)
            .map_err(|e| RepositoryError::rejected(e.to_string()))?;
        let mut data = self.data.write().await;
        data.next_command_id += 1;
        let command = Command::from_draft(CommandId::new(data.next_command_id), draft)
            .with_timestamps(Timestamp::now(), Timestamp::now());
        data.commands.push(command.clone());
        Ok(command)
    }

    pub async fn set_ports(&self, ports: Vec<UsbPort>) {
        self.data.write().await.ports = ports;
    }

    pub async fn set_probe(&self, port: PortId, probe: PortProbe) {
        self.data.write().await.probes.insert(port, probe);
    }

    pub async fn set_device_response(&self, response: Option<&str>) {
        self.data.write().await.device_response = response.map(str::to_string);
    }

    /// 以降のすべてのリクエストを指定のエラーで失敗させる (`None` で解除)
    pub async fn fail_with(&self, failure: Option<RepositoryError>) {
        self.data.write().await.failure = failure;
    }

    /// マッピングの一括保存だけを失敗させる (`None` で解除)
    pub async fn fail_mapping_saves(&self, failure: Option<RepositoryError>) {
        self.data.write().await.mapping_save_failure = failure;
    }

    pub async fn calls(&self) -> Vec<BackendCall> {
        self.data.read().await.calls.clone()
    }

    pub async fn clear_calls(&self) {
        self.data.write().await.calls.clear();
    }

    pub async fn stored_mappings(&self) -> ButtonMappingTable {
        self.data.read().await.mappings.clone()
    }

    pub async fn stored_commands(&self) -> Vec<Command> {
        self.data.read().await.commands.clone()
    }
}

#[async_trait]
impl CommandRepository for InMemoryBackend {
    async fn list_commands(&self) -> Result<Vec<Command>, RepositoryError> {
        let mut data = self.data.write().await;
        data.record(BackendCall::ListCommands)?;
        let mut commands = data.commands.clone();
        commands.sort_by(|a, b| a.name.as_str().cmp(b.name.as_str()));
        Ok(commands)
    }

    async fn create_command(&self, draft: &CommandDraft) -> Result<Option<Command>, RepositoryError> {
        let mut data = self.data.write().await;
        data.record(BackendCall::CreateCommand(draft.clone()))?;
        if data.commands.iter().any(|c| c.name == draft.name) {
            return Err(RepositoryError::rejected(
                "Command with that name already exists",
            ));
        }
        data.next_command_id += 1;
        let now = Timestamp::now();
        let command = Command::from_draft(CommandId::new(data.next_command_id), draft.clone())
            .with_timestamps(now, now);
        data.commands.push(command.clone());
        Ok(Some(command))
    }

    async fn update_command(&self, id: CommandId, draft: &CommandDraft) -> Result<(), RepositoryError> {
        let mut data = self.data.write().await;
        data.record(BackendCall::UpdateCommand(id, draft.clone()))?;
        if data
            .commands
            .iter()
            .any(|c| c.id != id && c.name == draft.name)
        {
            return Err(RepositoryError::rejected(
                "Command with that name already exists",
            ));
        }
        let command = data
            .commands
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| RepositoryError::rejected("Command not found"))?;
        command.name = draft.name.clone();
        command.value = draft.value;
        command.updated_at = Some(Timestamp::now());
        Ok(())
    }

    async fn delete_command(&self, id: CommandId) -> Result<(), RepositoryError> {
        let mut data = self.data.write().await;
        data.record(BackendCall::DeleteCommand(id))?;
        let before = data.commands.len();
        data.commands.retain(|c| c.id != id);
        if data.commands.len() == before {
            return Err(RepositoryError::rejected("Command not found"));
        }
        Ok(())
    }
}

#[async_trait]
impl MappingRepository for InMemoryBackend {
    async fn load_mappings(&self) -> Result<MappingSnapshot, RepositoryError> {
        let mut data = self.data.write().await;
        data.record(BackendCall::LoadMappings)?;
        let mappings = data
            .mappings
            .iter()
            .filter(|m| m.command_id.is_some() || m.color.is_some())
            .cloned()
            .collect();
        Ok(MappingSnapshot::new(mappings))
    }

    async fn save_mappings(&self, payload: &BulkMappingPayload) -> Result<(), RepositoryError> {
        let mut data = self.data.write().await;
        data.record(BackendCall::SaveMappings(payload.clone()))?;
        if let Some(failure) = &data.mapping_save_failure {
            return Err(failure.clone());
        }
        // 全スロットを解除してから、送られたスロットだけ設定する。色は保持
        for slot in ButtonSlot::ALL {
            data.mappings.set_command(slot, None);
        }
        for (key, command_id) in payload.entries() {
            match key.parse::<ButtonSlot>() {
                Ok(slot) => data.mappings.set_command(slot, Some(CommandId::new(*command_id))),
                Err(e) => debug!(key = %key, error = %e, "Ignoring invalid slot key"),
            }
        }
        Ok(())
    }

    async fn save_color(&self, slot: ButtonSlot, color: &ButtonColor) -> Result<(), RepositoryError> {
        let mut data = self.data.write().await;
        data.record(BackendCall::SaveColor(slot, color.clone()))?;
        data.mappings.set_color(slot, color.clone());
        Ok(())
    }
}

#[async_trait]
impl PresetRepository for InMemoryBackend {
    async fn list_presets(&self) -> Result<Vec<Preset>, RepositoryError> {
        let mut data = self.data.write().await;
        data.record(BackendCall::ListPresets)?;
        // 新しい順
        Ok(data
            .presets
            .iter()
            .rev()
            .map(|(preset, _)| preset.clone())
            .collect())
    }

    async fn save_preset(&self, draft: &PresetDraft) -> Result<Option<String>, RepositoryError> {
        let mut data = self.data.write().await;
        data.record(BackendCall::SavePreset(draft.clone()))?;
        if draft.name.trim().is_empty() {
            return Err(RepositoryError::rejected("Preset name is required"));
        }
        data.next_preset_id += 1;
        let preset = Preset::new(PresetId::new(data.next_preset_id), draft.name.clone())
            .with_description(draft.description.clone())
            .with_created_at(Timestamp::now());
        // 割り当て済みのスロットだけをスナップショットする
        let snapshot = MappingSnapshot::new(
            data.mappings
                .iter()
                .filter(|m| m.is_mapped())
                .cloned()
                .collect(),
        );
        data.presets.push((preset, snapshot));
        Ok(Some(format!("Preset \"{}\" saved successfully", draft.name)))
    }

    async fn load_preset(&self, id: PresetId) -> Result<Option<String>, RepositoryError> {
        let mut data = self.data.write().await;
        data.record(BackendCall::LoadPreset(id))?;
        let (preset, snapshot) = data
            .presets
            .iter()
            .find(|(preset, _)| preset.id == id)
            .cloned()
            .ok_or_else(|| RepositoryError::rejected("Preset not found"))?;
        data.mappings = ButtonMappingTable::from_snapshot(snapshot);
        Ok(Some(format!("Preset \"{}\" loaded successfully", preset.name)))
    }

    async fn delete_preset(&self, id: PresetId) -> Result<Option<String>, RepositoryError> {
        let mut data = self.data.write().await;
        data.record(BackendCall::DeletePreset(id))?;
        let index = data
            .presets
            .iter()
            .position(|(preset, _)| preset.id == id)
            .ok_or_else(|| RepositoryError::rejected("Preset not found"))?;
        let (preset, _) = data.presets.remove(index);
        Ok(Some(format!("Preset \"{}\" deleted", preset.name)))
    }
}

#[async_trait]
impl PortRepository for InMemoryBackend {
    async fn list_ports(&self) -> Result<PortListing, RepositoryError> {
        let mut data = self.data.write().await;
        data.record(BackendCall::ListPorts)?;
        let listing = PortListing::new(data.ports.clone());
        if data.ports.is_empty() {
            return Ok(listing.with_message(
                "No USB/Serial ports available. Check that the device is connected.",
            ));
        }
        Ok(listing)
    }

    async fn test_connection(&self, port: &PortId) -> Result<bool, RepositoryError> {
        let mut data = self.data.write().await;
        data.record(BackendCall::TestConnection(port.clone()))?;
        Ok(data.probe(port).connected)
    }

    async fn test_serial(&self, port: &PortId) -> Result<Option<String>, RepositoryError> {
        let mut data = self.data.write().await;
        data.record(BackendCall::TestSerial(port.clone()))?;
        data.probe(port).serial.map_err(RepositoryError::rejected)
    }
}

#[async_trait]
impl ConfigurationRepository for InMemoryBackend {
    async fn push_configuration(&self, request: &PushRequest) -> Result<PushOutcome, RepositoryError> {
        let mut data = self.data.write().await;
        data.record(BackendCall::PushConfiguration(request.clone()))?;
        if !data.probe(&request.usb_port).connected {
            return Err(RepositoryError::rejected(format!(
                "Could not connect to port {}",
                request.usb_port
            )));
        }
        if !data.mappings.has_any_command() {
            return Err(RepositoryError::rejected("No button mappings to send"));
        }
        Ok(PushOutcome {
            message: None,
            device_response: data.device_response.clone(),
        })
    }

    async fn check_health(&self) -> Result<BackendHealth, RepositoryError> {
        let mut data = self.data.write().await;
        data.record(BackendCall::CheckHealth)?;
        Ok(BackendHealth {
            status: "healthy".to_string(),
            timestamp: Some(Timestamp::now()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_bulk_save_replaces_commands_but_keeps_colors() {
        let backend = InMemoryBackend::new();
        let slot1 = ButtonSlot::new(1).unwrap();
        assert_ok!(backend.save_color(slot1, &ButtonColor::parse("red").unwrap()).await);

        let mut table = ButtonMappingTable::new();
        table.set_command(ButtonSlot::new(2).unwrap(), Some(CommandId::new(4)));
        assert_ok!(backend.save_mappings(&table.bulk_payload()).await);

        let stored = backend.stored_mappings().await;
        assert_eq!(stored.slot(slot1).command_id, None);
        assert!(stored.slot(slot1).color.is_some());
        assert_eq!(
            stored.slot(ButtonSlot::new(2).unwrap()).command_id,
            Some(CommandId::new(4))
        );
    }

    #[tokio::test]
    async fn test_duplicate_command_name_rejected() {
        let backend = InMemoryBackend::seeded(&OfflineFallback::sample());
        let draft = CommandDraft::new("Play/Pause", 5).unwrap();
        let err = assert_err!(backend.create_command(&draft).await);
        assert!(err.is_rejection());
    }

    #[tokio::test]
    async fn test_update_keeps_names_unique() {
        let backend = InMemoryBackend::new();
        let looper = assert_ok!(backend.insert_command("Looper", 64).await);
        assert_ok!(backend.insert_command("Tap Tempo", 65).await);

        let clash = CommandDraft::new("Tap Tempo", 1).unwrap();
        let err = assert_err!(backend.update_command(looper.id, &clash).await);
        assert_eq!(err, RepositoryError::rejected("Command with that name already exists"));

        let rename = CommandDraft::new("Looper 2", 66).unwrap();
        assert_ok!(backend.update_command(looper.id, &rename).await);
        let stored = backend.stored_commands().await;
        assert_eq!(stored[0].name.as_str(), "Looper 2");
        assert!(backend.calls().await.iter().all(BackendCall::is_mutation));
    }

    #[tokio::test]
    async fn test_injected_failure_is_recorded() {
        let backend = InMemoryBackend::new();
        backend
            .fail_with(Some(RepositoryError::transport("connection refused")))
            .await;
        assert_err!(backend.list_commands().await);
        assert_eq!(backend.calls().await, vec![BackendCall::ListCommands]);
        assert!(!BackendCall::ListCommands.is_mutation());
    }
}

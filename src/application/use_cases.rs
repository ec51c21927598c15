pub mod check_backend;
pub mod discover_ports;
pub mod manage_commands;
pub mod manage_mappings;
pub mod manage_presets;
pub mod port_poller;
pub mod push_configuration;
pub mod test_port;

pub use check_backend::CheckBackendUseCase;
pub use discover_ports::DiscoverPortsUseCase;
pub use manage_commands::ManageCommandsUseCase;
pub use manage_mappings::ManageMappingsUseCase;
pub use manage_presets::ManagePresetsUseCase;
pub use port_poller::{DEFAULT_POLL_INTERVAL, PortPoller};
pub use push_configuration::PushConfigurationUseCase;
pub use test_port::TestPortUseCase;

use crate::application::{
    Confirmer, Notifier, OfflineFallback, PortRefresh, SessionState, SharedSession,
};
use crate::domain::command::CommandRepository;
use crate::domain::configuration::ConfigurationRepository;
use crate::domain::mapping::MappingRepository;
use crate::domain::port::PortRepository;
use crate::domain::preset::PresetRepository;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::warn;

/// ユースケースが使うリポジトリ一式
#[derive(Clone)]
pub struct Repositories {
    pub commands: Arc<dyn CommandRepository>,
    pub mappings: Arc<dyn MappingRepository>,
    pub presets: Arc<dyn PresetRepository>,
    pub ports: Arc<dyn PortRepository>,
    pub configuration: Arc<dyn ConfigurationRepository>,
}

impl Repositories {
    /// すべてのリポジトリをひとつのバックエンドで賄う
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: CommandRepository
            + MappingRepository
            + PresetRepository
            + PortRepository
            + ConfigurationRepository
            + 'static,
    {
        Self {
            commands: backend.clone(),
            mappings: backend.clone(),
            presets: backend.clone(),
            ports: backend.clone(),
            configuration: backend,
        }
    }
}

/// 1セッション分のユースケース
///
/// すべて同じ [`SharedSession`] を共有する。
pub struct ConfiguratorServices {
    pub session: SharedSession,
    pub commands: Arc<ManageCommandsUseCase>,
    pub mappings: Arc<ManageMappingsUseCase>,
    pub presets: Arc<ManagePresetsUseCase>,
    pub ports: Arc<DiscoverPortsUseCase>,
    pub test_port: Arc<TestPortUseCase>,
    pub push: Arc<PushConfigurationUseCase>,
    pub backend: Arc<CheckBackendUseCase>,
    poller: OnceLock<Arc<PortPoller>>,
}

impl ConfiguratorServices {
    pub fn new(
        repos: Repositories,
        notifier: Arc<dyn Notifier>,
        confirmer: Arc<dyn Confirmer>,
        fallback: OfflineFallback,
    ) -> Self {
        let session = SessionState::new().shared();

        let mappings = Arc::new(ManageMappingsUseCase::new(
            repos.mappings,
            session.clone(),
            notifier.clone(),
        ));
        let commands = Arc::new(ManageCommandsUseCase::new(
            repos.commands,
            mappings.clone(),
            session.clone(),
            notifier.clone(),
            confirmer.clone(),
            fallback.clone(),
        ));
        let presets = Arc::new(ManagePresetsUseCase::new(
            repos.presets,
            mappings.clone(),
            session.clone(),
            notifier.clone(),
            confirmer,
        ));
        let ports = Arc::new(DiscoverPortsUseCase::new(
            repos.ports.clone(),
            session.clone(),
            notifier.clone(),
            fallback,
        ));
        let test_port = Arc::new(TestPortUseCase::new(repos.ports, notifier.clone()));
        let push = Arc::new(PushConfigurationUseCase::new(
            repos.configuration.clone(),
            session.clone(),
            notifier,
        ));
        let backend = Arc::new(CheckBackendUseCase::new(
            repos.configuration,
            session.clone(),
        ));

        Self {
            session,
            commands,
            mappings,
            presets,
            ports,
            test_port,
            push,
            backend,
            poller: OnceLock::new(),
        }
    }

    /// 画面を開いたときと同じ順で初期データを読み込む
    ///
    /// 失敗はそれぞれのユースケースが通知済み。
    pub async fn bootstrap(&self) {
        let _ = self.commands.load().await;
        let _ = self.mappings.load().await;
        let _ = self.ports.initial_load().await;
    }

    /// セッションで唯一のポーラー。間隔は最初の呼び出しで決まる
    pub fn poller(&self, interval: Duration) -> Arc<PortPoller> {
        self.poller
            .get_or_init(|| Arc::new(PortPoller::new(self.ports.clone(), interval)))
            .clone()
    }

    /// 初回の一覧取得がバックエンドから成功していれば定期更新を始める
    ///
    /// オフライン用の一覧で埋めた場合は始めない。
    pub fn start_polling(&self, interval: Duration, initial: &PortRefresh) -> bool {
        if initial.from_fallback {
            warn!("Port list came from offline sample data, polling not started");
            return false;
        }
        self.poller(interval).start()
    }
}

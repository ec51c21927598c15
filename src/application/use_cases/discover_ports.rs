use crate::application::ports::{Notifier, failure_notice};
use crate::application::{OfflineFallback, PortRefresh, SharedSession};
use crate::domain::port::{PortError, PortId, PortListing, PortRepository};
use crate::domain::shared::Notice;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// USB/シリアルポートの列挙と選択
pub struct DiscoverPortsUseCase {
    repo: Arc<dyn PortRepository>,
    session: SharedSession,
    notifier: Arc<dyn Notifier>,
    fallback: OfflineFallback,
}

impl DiscoverPortsUseCase {
    pub fn new(
        repo: Arc<dyn PortRepository>,
        session: SharedSession,
        notifier: Arc<dyn Notifier>,
        fallback: OfflineFallback,
    ) -> Self {
        Self {
            repo,
            session,
            notifier,
            fallback,
        }
    }

    /// 初回の一覧取得
    ///
    /// バックエンドからの案内メッセージは警告として通知する。
    pub async fn initial_load(&self) -> Result<PortRefresh, PortError> {
        match self.repo.list_ports().await {
            Ok(listing) => {
                if let Some(message) = &listing.message {
                    self.notifier.notify(Notice::warning(message.clone()));
                }
                Ok(self.apply(listing).await)
            }
            Err(e) if e.is_transient() && self.fallback.is_enabled() => {
                warn!(error = %e, "Backend unreachable, using offline sample ports");
                self.notifier
                    .notify(failure_notice("Failed to load USB ports", &e));
                self.notifier.notify(Notice::warning("Showing offline test ports"));
                let listing = PortListing::new(self.fallback.ports().to_vec());
                let mut refresh = self.apply(listing).await;
                refresh.from_fallback = true;
                Ok(refresh)
            }
            Err(e) => {
                self.notifier
                    .notify(failure_notice("Failed to load USB ports", &e));
                Err(e.into())
            }
        }
    }

    /// 定期更新。失敗は通知せずログにだけ残す
    pub async fn refresh(&self) -> Result<PortRefresh, PortError> {
        match self.repo.list_ports().await {
            Ok(listing) => Ok(self.apply(listing).await),
            Err(e) => {
                debug!(error = %e, "USB port refresh failed");
                Err(e.into())
            }
        }
    }

    /// 一覧にあるポートを選択する
    pub async fn select(&self, port: PortId) -> Result<(), PortError> {
        let result = self.session.write().await.select_port(port.clone());
        match &result {
            Ok(()) => info!(port = %port, "USB port selected"),
            Err(e) => self.notifier.notify(Notice::warning(e.to_string())),
        }
        result
    }

    async fn apply(&self, listing: PortListing) -> PortRefresh {
        let refresh = self.session.write().await.replace_ports(listing.ports);
        debug!(count = refresh.port_count, "USB port list updated");
        if let Some(lost) = &refresh.lost_selection {
            warn!(port = %lost, "Selected USB port disappeared");
            self.notifier.notify(Notice::warning(format!(
                "USB port {lost} is no longer available"
            )));
        }
        refresh
    }
}

//! ポート一覧の定期更新
//!
//! セッションにつき1本だけ動くバックグラウンドタスク。
//! [`CancellationToken`] で停止でき、破棄時にも止まる。

use super::DiscoverPortsUseCase;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// 既定の更新間隔
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

pub struct PortPoller {
    discover: Arc<DiscoverPortsUseCase>,
    interval: Duration,
    cancel: CancellationToken,
    started: AtomicBool,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl PortPoller {
    pub fn new(discover: Arc<DiscoverPortsUseCase>, interval: Duration) -> Self {
        Self {
            discover,
            interval,
            cancel: CancellationToken::new(),
            started: AtomicBool::new(false),
            handle: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// 更新を開始する。2回目以降の呼び出しは何もせず `false` を返す
    ///
    /// 初回の一覧取得は呼び出し側で済ませておくこと。最初の更新は1周期後。
    pub fn start(&self) -> bool {
        if self.started.swap(true, Ordering::SeqCst) {
            debug!("Port poller already started");
            return false;
        }

        let discover = self.discover.clone();
        let cancel = self.cancel.clone();
        let period = self.interval;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(interval_ms = period.as_millis() as u64, "Port poller started");

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("Port poller stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        // 失敗は DiscoverPortsUseCase::refresh がログに残す
                        let _ = discover.refresh().await;
                    }
                }
            }
        });

        if let Ok(mut slot) = self.handle.lock() {
            *slot = Some(handle);
        }
        true
    }

    pub fn is_running(&self) -> bool {
        self.started.load(Ordering::SeqCst) && !self.cancel.is_cancelled()
    }

    /// 停止してタスクの終了を待つ。再開はできない
    pub async fn stop(&self) {
        self.cancel.cancel();
        let handle = self.handle.lock().ok().and_then(|mut slot| slot.take());
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

impl Drop for PortPoller {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

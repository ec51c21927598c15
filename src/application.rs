//! アプリケーション層
//!
//! セッション状態と、利用者の操作ひとつひとつに対応するユースケース

pub mod fallback;
pub mod ports;
pub mod state;
pub mod use_cases;

pub use fallback::OfflineFallback;
pub use ports::{Confirmer, DeleteOutcome, Notifier};
pub use state::{PortRefresh, SessionState, SharedSession, StatusSummary};

//! インターフェース層
//!
//! 端末向けの通知・確認アダプタと一覧表示

pub mod console;
pub mod render;

pub use console::{AutoConfirmer, ConsoleNotifier, PromptConfirmer, RecordingNotifier};

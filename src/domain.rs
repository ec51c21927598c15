//! ドメイン層
//!
//! コマンド・ボタンマッピング・プリセット・ポート・設定送信のドメインモデル

pub mod command;
pub mod configuration;
pub mod mapping;
pub mod port;
pub mod preset;
pub mod shared;

//! # MIDI Configurator
//!
//! 6ボタンの MIDI フットコントローラーを設定バックエンド経由で構成するクライアント
//!
//! このクレートは Domain-Driven Design (DDD) 原則に基づいて設計されており、
//! 以下の層に分かれています：
//!
//! - **Domain Layer**: コマンド・マッピング・プリセット・ポートのドメインモデル
//! - **Application Layer**: ユースケースとセッション状態
//! - **Infrastructure Layer**: バックエンド HTTP API クライアントとインメモリ実装
//! - **Interface Layer**: 端末向けの通知・確認・一覧表示

pub mod domain;
pub mod debug;
pub mod application;
pub mod infrastructure;
pub mod interfaces;

use crate::application::use_cases::DEFAULT_POLL_INTERVAL;
use crate::debug::DebugConfig;
use crate::infrastructure::backend::DEFAULT_API_BASE_URL;
use std::time::Duration;

/// アプリケーション全体の設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// バックエンド API のベースURL
    pub api_base_url: String,
    /// バックエンドに届かないときにサンプルデータで埋めるか
    pub offline_fallback: bool,
    /// ポート一覧の再取得間隔
    pub poll_interval: Duration,
    /// ログ設定の選択 (`development` / `production` / `test`)
    pub environment: String,
    pub verbose: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            offline_fallback: true,
            poll_interval: DEFAULT_POLL_INTERVAL,
            environment: "console".to_string(),
            verbose: false,
        }
    }
}

impl AppConfig {
    /// ログ設定。未知の環境名はコンソール出力のみの既定値になる
    pub fn debug_config(&self) -> DebugConfig {
        let config = DebugConfig::for_environment(&self.environment);
        if self.verbose {
            config.with_level(tracing::Level::DEBUG)
        } else {
            config
        }
    }

    pub fn fallback(&self) -> application::OfflineFallback {
        if self.offline_fallback {
            application::OfflineFallback::sample()
        } else {
            application::OfflineFallback::disabled()
        }
    }
}

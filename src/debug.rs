//! デバッグとログ機能
//!
//! クレート全体のログ初期化とバックエンド呼び出しの時間計測を提供

use std::fs;
use tracing::{Level, Subscriber, debug, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;

/// デバッグ設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugConfig {
    /// ログレベル
    pub log_level: Level,
    /// ファイルログを有効にするか
    pub enable_file_logging: bool,
    /// ログファイルのディレクトリ
    pub log_directory: String,
    /// JSONフォーマットを使用するか
    pub use_json_format: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: Level::WARN,
            enable_file_logging: false,
            log_directory: "logs".to_string(),
            use_json_format: false,
        }
    }
}

impl DebugConfig {
    /// 開発環境用の設定
    pub fn development() -> Self {
        Self {
            log_level: Level::DEBUG,
            enable_file_logging: true,
            log_directory: "logs".to_string(),
            use_json_format: false,
        }
    }

    /// 本番環境用の設定
    ///
    /// 通知はコンソールに出すので、ログはファイルにだけ書く。
    pub fn production() -> Self {
        Self {
            log_level: Level::INFO,
            enable_file_logging: true,
            log_directory: "logs".to_string(),
            use_json_format: true,
        }
    }

    /// テスト環境用の設定
    pub fn test() -> Self {
        Self::default()
    }

    /// 環境名から設定を選ぶ。未知の名前は既定値
    pub fn for_environment(environment: &str) -> Self {
        match environment {
            "development" => Self::development(),
            "production" => Self::production(),
            "test" => Self::test(),
            _ => Self::default(),
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.log_level = level;
        self
    }

    /// `RUST_LOG` が無いときに使うフィルター
    pub fn default_filter(&self) -> String {
        format!("midi_configurator={}", self.log_level)
    }
}

/// ログシステムを初期化
pub fn init_logging(config: &DebugConfig) -> Result<(), Box<dyn std::error::Error>> {
    // ログディレクトリを作成
    if config.enable_file_logging {
        fs::create_dir_all(&config.log_directory)?;
    }

    // 環境変数からのフィルター設定
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.default_filter()))?;

    if config.enable_file_logging {
        let file_appender = RollingFileAppender::new(
            Rotation::DAILY,
            &config.log_directory,
            "midi-configurator.log",
        );

        if config.use_json_format {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(file_appender)
                .json()
                .try_init()
                .map_err(|e| e as Box<dyn std::error::Error>)?;
        } else {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(file_appender)
                .with_ansi(false)
                .try_init()
                .map_err(|e| e as Box<dyn std::error::Error>)?;
        }
    } else {
        console_subscriber(env_filter, std::io::stderr, true).try_init()?;
    }

    info!("ログシステムが初期化されました");
    debug!("デバッグ設定: {:?}", config);

    Ok(())
}

/// 端末向けの読みやすい出力
fn console_subscriber<W>(env_filter: EnvFilter, writer: W, ansi: bool) -> impl Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .pretty()
        .with_target(true)
        .finish()
}

/// パフォーマンス測定用のマクロ
///
/// ブロック内で `.await` してもよい (呼び出し側の async 文脈で展開される)。
#[macro_export]
macro_rules! measure_time {
    ($name:expr, $block:block) => {{
        let start = std::time::Instant::now();
        let result = $block;
        let duration = start.elapsed();
        tracing::debug!(
            operation = $name,
            duration_ms = duration.as_millis() as u64,
            "操作完了"
        );
        result
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_test::traced_test;

    #[derive(Clone, Default)]
    struct CapturedOutput(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedOutput {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedOutput {
        type Writer = CapturedOutput;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_console_output_is_pretty() {
        let output = CapturedOutput::default();
        let filter = EnvFilter::new(DebugConfig::default().default_filter());
        let subscriber = console_subscriber(filter, output.clone(), false);
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(port = "COM3", "Selected USB port disappeared");
            tracing::info!("filtered out at the default level");
        });

        let text = String::from_utf8(output.0.lock().unwrap().clone()).unwrap();
        assert!(text.contains("Selected USB port disappeared"));
        assert!(text.contains("midi_configurator::debug::tests"));
        // 複数行形式では発生位置が別の行に出る
        assert!(text.contains("at src/debug.rs"));
        assert!(!text.contains("filtered out"));
    }

    #[test]
    fn test_environment_presets() {
        assert_eq!(DebugConfig::for_environment("development").log_level, Level::DEBUG);
        assert!(DebugConfig::for_environment("production").use_json_format);
        assert_eq!(DebugConfig::for_environment("staging"), DebugConfig::default());
        assert_eq!(
            DebugConfig::test().with_level(Level::TRACE).default_filter(),
            "midi_configurator=TRACE"
        );
    }

    #[traced_test]
    #[test]
    fn test_measure_time_returns_block_value() {
        let result = measure_time!("test_operation", {
            std::thread::sleep(std::time::Duration::from_millis(5));
            42
        });
        assert_eq!(result, 42);
        assert!(logs_contain("test_operation"));
    }
}

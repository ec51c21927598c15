//! コンソール用の通知と確認
//!
//! トースト表示と `confirm()` ダイアログの代わりに端末へ出力する。

use crate::application::{Confirmer, Notifier};
use crate::domain::shared::{Notice, NoticeLevel};
use std::io::{self, BufRead, Write};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// 通知を端末に表示する
///
/// ログには `debug` で残すだけなので、既定のコンソール設定で二重に表示されない。
#[derive(Debug, Default)]
pub struct ConsoleNotifier {
    error_shown: AtomicBool,
}

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// エラー通知を1件以上表示したか
    pub fn error_shown(&self) -> bool {
        self.error_shown.load(Ordering::SeqCst)
    }

    fn marker(level: NoticeLevel) -> &'static str {
        match level {
            NoticeLevel::Info => "ℹ️ ",
            NoticeLevel::Success => "✅",
            NoticeLevel::Warning => "⚠️ ",
            NoticeLevel::Error => "❌",
        }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        debug!(level = %notice.level, "{}", notice.message);
        let line = format!("{} {}", Self::marker(notice.level), notice.message);
        if notice.level == NoticeLevel::Error {
            self.error_shown.store(true, Ordering::SeqCst);
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }
}

/// 標準入力で y/N を尋ねる。既定は「いいえ」
#[derive(Debug, Default)]
pub struct PromptConfirmer;

impl PromptConfirmer {
    pub fn new() -> Self {
        Self
    }
}

/// 入力行を回答として解釈する
pub fn parse_answer(line: &str) -> bool {
    matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

impl Confirmer for PromptConfirmer {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{prompt} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(_) => parse_answer(&line),
            Err(e) => {
                warn!(error = %e, "Could not read confirmation answer");
                false
            }
        }
    }
}

/// 常に同じ回答を返す (`--yes` とテスト用)。尋ねられた内容は記録する
#[derive(Debug)]
pub struct AutoConfirmer {
    answer: bool,
    prompts: Mutex<Vec<String>>,
}

impl AutoConfirmer {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }
}

impl Confirmer for AutoConfirmer {
    fn confirm(&self, prompt: &str) -> bool {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        info!(prompt, answer = self.answer, "Confirmation answered automatically");
        self.answer
    }
}

/// 通知を記録するだけの通知先
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|notices| notices.clone())
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.clear();
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn test_answer_parsing_defaults_to_no() {
        assert!(parse_answer("y\n"));
        assert!(parse_answer(" YES "));
        assert!(!parse_answer("\n"));
        assert!(!parse_answer("nope"));
    }

    #[test]
    fn test_recording_notifier_keeps_order() {
        let notifier = RecordingNotifier::new();
        notifier.notify(Notice::info("first"));
        notifier.notify(Notice::error("second"));
        let notices = notifier.notices();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[1].to_string(), "[error] second");
        notifier.clear();
        assert!(notifier.notices().is_empty());
    }

    #[traced_test]
    #[test]
    fn test_console_notifier_tracks_errors_and_logs_at_debug() {
        let notifier = ConsoleNotifier::new();
        notifier.notify(Notice::warning("Showing offline test ports"));
        assert!(!notifier.error_shown());
        notifier.notify(Notice::error("Error communicating with server"));
        assert!(notifier.error_shown());
        assert!(logs_contain("DEBUG"));
        assert!(!logs_contain("WARN"));
        assert!(!logs_contain("ERROR"));
    }

    #[test]
    fn test_auto_confirmer_records_prompts() {
        let confirmer = AutoConfirmer::new(false);
        assert!(!confirmer.confirm("Delete?"));
        assert_eq!(confirmer.prompts(), vec!["Delete?".to_string()]);
    }
}

use nuzul_shared::locale::{Language, Msg};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// A transient, dismissable message for the guest. The engine raises the
/// message key; the host renders `message.text(language)` in whatever toast
/// surface it owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: Msg,
}

impl Notice {
    pub fn success(message: Msg) -> Self {
        Notice {
            level: NoticeLevel::Success,
            message,
        }
    }

    pub fn info(message: Msg) -> Self {
        Notice {
            level: NoticeLevel::Info,
            message,
        }
    }

    pub fn error(message: Msg) -> Self {
        Notice {
            level: NoticeLevel::Error,
            message,
        }
    }
}

/// Host surface for transient notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Log-only notifier for headless runs. Renders the notice text in the
/// language it was constructed with.
pub struct TracingNotifier {
    language: Language,
}

impl TracingNotifier {
    pub fn new(language: Language) -> Self {
        Self { language }
    }
}

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        let text = notice.message.text(self.language);
        match notice.level {
            NoticeLevel::Success => tracing::info!(notice = text, "notice"),
            NoticeLevel::Info => tracing::info!(notice = text, "notice"),
            NoticeLevel::Error => tracing::warn!(notice = text, "notice"),
        }
    }
}

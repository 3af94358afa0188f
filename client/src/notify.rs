use gloo_timers::callback::Timeout;
use leptos::prelude::*;

use weblurk_shared::ApiError;
use weblurk_shared::config::NOTIFICATION_VISIBLE_MS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
struct Toast {
    seq: u64,
    message: String,
    kind: ToastKind,
}

/// The page's single notification slot. A newer toast replaces the shown one.
#[derive(Clone, Copy)]
pub struct Notifier {
    current: RwSignal<Option<Toast>>,
    seq: RwSignal<u64>,
}

impl Notifier {
    pub fn new() -> Self {
        Self {
            current: RwSignal::new(None),
            seq: RwSignal::new(0),
        }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.show(ToastKind::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.show(ToastKind::Error, message.into());
    }

    pub fn api_error(&self, err: &ApiError, fallback: &str) {
        self.error(err.user_message(fallback));
    }

    /// Toast the server message on success, the error otherwise.
    pub fn report(&self, result: Result<String, ApiError>, fallback: &str) -> bool {
        match result {
            Ok(message) => {
                self.success(message);
                true
            }
            Err(err) => {
                self.api_error(&err, fallback);
                false
            }
        }
    }

    fn show(&self, kind: ToastKind, message: String) {
        let seq = self.seq.get_untracked() + 1;
        self.seq.set(seq);
        self.current.set(Some(Toast { seq, message, kind }));

        let current = self.current;
        Timeout::new(NOTIFICATION_VISIBLE_MS, move || {
            if current.get_untracked().is_some_and(|t| t.seq == seq) {
                current.set(None);
            }
        })
        .forget();
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

#[component]
pub fn ToastView() -> impl IntoView {
    let notifier: Notifier = expect_context();
    let current = notifier.current;

    let style = move || {
        let (bg, border, visible) = match current.get() {
            Some(Toast {
                kind: ToastKind::Success,
                ..
            }) => ("#12301f", "#2f9e5b", true),
            Some(Toast {
                kind: ToastKind::Error,
                ..
            }) => ("#3a1518", "#d64550", true),
            None => ("#1a1d2a", "#282c3e", false),
        };
        format!(
            "position: fixed; top: 20px; right: 20px; z-index: 1000; max-width: 360px; padding: 12px 16px; border-radius: 6px; background: {bg}; border: 1px solid {border}; color: #e2e0d8; font-family: 'Inter', system-ui, sans-serif; font-size: 0.85rem; transition: opacity 0.3s ease, transform 0.3s ease; opacity: {}; transform: translateX({}); pointer-events: none;",
            if visible { "1" } else { "0" },
            if visible { "0" } else { "24px" },
        )
    };

    view! {
        <div role="status" style=style>
            {move || current.get().map(|t| t.message).unwrap_or_default()}
        </div>
    }
}

/// Count of requests the admin console is waiting on.
#[derive(Clone, Copy)]
pub struct Busy(pub RwSignal<u32>);

impl Busy {
    pub fn begin(&self) {
        self.0.update(|n| *n += 1);
    }

    pub fn end(&self) {
        self.0.update(|n| *n = n.saturating_sub(1));
    }

    pub fn is_busy(&self) -> bool {
        self.0.get() > 0
    }
}

#[component]
pub fn BusyIndicator() -> impl IntoView {
    let busy: Busy = expect_context();
    view! {
        <Show when=move || busy.is_busy()>
            <div style="position: fixed; inset: 0; z-index: 900; display: flex; align-items: center; justify-content: center; background: rgba(12,14,23,0.45); pointer-events: none;">
                <div style="padding: 10px 18px; border-radius: 6px; background: #13161f; border: 1px solid #282c3e; color: #9a9590; font-family: 'JetBrains Mono', monospace; font-size: 0.75rem; letter-spacing: 0.08em;">
                    "Carregando..."
                </div>
            </div>
        </Show>
    }
}

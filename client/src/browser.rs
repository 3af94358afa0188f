use weblurk_shared::config::{POPUP_WINDOW_FEATURES, POPUP_WINDOW_NAME, TAB_WINDOW_TARGET};
use weblurk_shared::session::{CompanionWindow, WindowHost};
use weblurk_shared::{NavigationError, WindowMode};

fn js_detail(err: wasm_bindgen::JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

/// A window opened with `window.open`.
pub struct BrowserWindow(web_sys::Window);

impl CompanionWindow for BrowserWindow {
    fn is_closed(&self) -> bool {
        // A handle we can no longer query is as good as closed.
        self.0.closed().unwrap_or(true)
    }

    fn close(&self) {
        let _ = self.0.close();
    }

    fn current_url(&self) -> Result<String, NavigationError> {
        if self.is_closed() {
            return Err(NavigationError::Closed);
        }
        self.0
            .location()
            .href()
            .map_err(|e| NavigationError::Inaccessible(js_detail(e)))
    }

    fn navigate(&self, url: &str) -> Result<(), NavigationError> {
        if self.is_closed() {
            return Err(NavigationError::Closed);
        }
        self.0
            .location()
            .set_href(url)
            .map_err(|e| NavigationError::Inaccessible(js_detail(e)))
    }
}

#[derive(Default)]
pub struct BrowserWindowHost;

impl WindowHost for BrowserWindowHost {
    type Window = BrowserWindow;

    fn open(&mut self, url: &str, mode: WindowMode) -> Option<BrowserWindow> {
        let window = web_sys::window()?;
        let opened = match mode {
            WindowMode::Popup => window.open_with_url_and_target_and_features(
                url,
                POPUP_WINDOW_NAME,
                POPUP_WINDOW_FEATURES,
            ),
            WindowMode::Tab => window.open_with_url_and_target(url, TAB_WINDOW_TARGET),
        };
        match opened {
            Ok(handle) => handle.map(BrowserWindow),
            Err(e) => {
                tracing::warn!(error = %js_detail(e), "window.open failed");
                None
            }
        }
    }
}

pub fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

/// `None` when the prompt was cancelled.
pub fn prompt(message: &str, default: &str) -> Option<String> {
    web_sys::window()?
        .prompt_with_message_and_default(message, default)
        .ok()
        .flatten()
}

pub fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

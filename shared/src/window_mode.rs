use serde::{Deserialize, Serialize};

/// How the companion window is presented.
///
/// The server has stored both `popup`/`tab` and `Pop-Up`/`Tab` over time, so
/// decoding is lenient and anything unrecognised falls back to `Popup`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WindowMode {
    #[default]
    Popup,
    Tab,
}

impl WindowMode {
    pub const ALL: [WindowMode; 2] = [WindowMode::Popup, WindowMode::Tab];

    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("tab") {
            Self::Tab
        } else {
            Self::Popup
        }
    }

    /// Value sent to the server and used in `<select>` options.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Popup => "popup",
            Self::Tab => "tab",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Popup => "Pop-Up",
            Self::Tab => "Tab",
        }
    }
}

impl From<String> for WindowMode {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<WindowMode> for String {
    fn from(mode: WindowMode) -> Self {
        mode.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::WindowMode;

    #[test]
    fn decodes_every_stored_spelling() {
        for (raw, expected) in [
            ("\"popup\"", WindowMode::Popup),
            ("\"Pop-Up\"", WindowMode::Popup),
            ("\"tab\"", WindowMode::Tab),
            ("\"Tab\"", WindowMode::Tab),
            ("\"TAB \"", WindowMode::Tab),
            ("\"window\"", WindowMode::Popup),
        ] {
            let mode: WindowMode = serde_json::from_str(raw).unwrap();
            assert_eq!(mode, expected, "{raw}");
        }
    }

    #[test]
    fn encodes_lowercase() {
        assert_eq!(serde_json::to_string(&WindowMode::Tab).unwrap(), "\"tab\"");
        assert_eq!(serde_json::to_string(&WindowMode::Popup).unwrap(), "\"popup\"");
    }
}

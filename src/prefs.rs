//! Theme and language preferences.
//!
//! Preferences are a plain value owned by whoever needs them. Components that
//! react to changes hold a [`watch::Receiver`] from [`PreferencesHandle`]
//! instead of reading process-wide state.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::{Error, Result};
use crate::lock::write_atomic;

pub const PREFS_FILE: &str = "prefs.toml";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Blue,
    Green,
    Purple,
    Orange,
    Pink,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Language {
    #[default]
    English,
    ChineseSimplified,
    ChineseTraditional,
    Japanese,
    Indonesian,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::English,
        Language::ChineseSimplified,
        Language::ChineseTraditional,
        Language::Japanese,
        Language::Indonesian,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::ChineseSimplified => "zh-CN",
            Language::ChineseTraditional => "zh-TW",
            Language::Japanese => "ja",
            Language::Indonesian => "in",
        }
    }

    pub fn native_name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::ChineseSimplified => "简体中文",
            Language::ChineseTraditional => "繁體中文",
            Language::Japanese => "日本語",
            Language::Indonesian => "Bahasa Indonesia",
        }
    }

    /// Unknown codes fall back to English.
    pub fn from_code(code: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|language| language.code().eq_ignore_ascii_case(code.trim()))
            .unwrap_or_default()
    }
}

impl From<String> for Language {
    fn from(code: String) -> Self {
        Language::from_code(&code)
    }
}

impl From<Language> for String {
    fn from(language: Language) -> Self {
        language.code().to_string()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "blue" => Ok(Theme::Blue),
            "green" => Ok(Theme::Green),
            "purple" => Ok(Theme::Purple),
            "orange" => Ok(Theme::Orange),
            "pink" => Ok(Theme::Pink),
            _ => Err(Error::InvalidArgument(format!(
                "invalid theme '{raw}' (expected blue|green|purple|orange|pink)"
            ))),
        }
    }
}

impl FromStr for ThemeMode {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            "system" => Ok(ThemeMode::System),
            _ => Err(Error::InvalidArgument(format!(
                "invalid theme mode '{raw}' (expected light|dark|system)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub mode: ThemeMode,
    #[serde(default)]
    pub language: Language,
}

impl Preferences {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Saved preferences, or defaults when missing or unreadable.
    pub fn load_from_dir(dir: &Path) -> Self {
        let path = dir.join(PREFS_FILE);
        if !path.exists() {
            return Self::default();
        }
        Self::load(&path).unwrap_or_else(|err| {
            tracing::warn!(path = %path.display(), error = %err, "ignoring unreadable preferences");
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        write_atomic(path, content.as_bytes())?;
        Ok(())
    }
}

/// Owner of the current preferences with change notification.
#[derive(Debug, Clone)]
pub struct PreferencesHandle {
    sender: Arc<watch::Sender<Preferences>>,
}

impl PreferencesHandle {
    pub fn new(initial: Preferences) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn current(&self) -> Preferences {
        *self.sender.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Preferences> {
        self.sender.subscribe()
    }

    /// Returns whether anything changed; unchanged values do not notify.
    pub fn set_theme(&self, theme: Theme) -> bool {
        self.modify(|prefs| prefs.theme = theme)
    }

    pub fn set_mode(&self, mode: ThemeMode) -> bool {
        self.modify(|prefs| prefs.mode = mode)
    }

    pub fn set_language(&self, language: Language) -> bool {
        self.modify(|prefs| prefs.language = language)
    }

    fn modify(&self, change: impl FnOnce(&mut Preferences)) -> bool {
        self.sender.send_if_modified(|prefs| {
            let before = *prefs;
            change(prefs);
            *prefs != before
        })
    }
}

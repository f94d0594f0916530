//! daybook prefs command implementation
//!
//! Shows and changes theme and language preferences.

use std::path::PathBuf;

use crate::cli::{Context, PrefsCommands};
use crate::error::{Error, Result};
use crate::events::EventKind;
use crate::output::{emit_success, HumanOutput};
use crate::prefs::{Language, Preferences, PreferencesHandle, PREFS_FILE};

#[derive(serde::Serialize)]
struct PrefsReport {
    preferences: Preferences,
    path: PathBuf,
    changed: bool,
}

pub(crate) fn run(ctx: &mut Context, command: PrefsCommands) -> Result<()> {
    match command {
        PrefsCommands::Show => run_show(ctx),
        PrefsCommands::Set {
            theme,
            mode,
            language,
        } => run_set(ctx, theme, mode, language),
    }
}

fn run_show(ctx: &mut Context) -> Result<()> {
    let path = ctx.data_dir().join(PREFS_FILE);
    let preferences = Preferences::load_from_dir(ctx.data_dir());

    let mut human = HumanOutput::new("Preferences");
    push_prefs_summary(&mut human, &preferences);
    if !path.exists() {
        human.push_next_step("daybook prefs set --theme <name>");
    }

    let report = PrefsReport {
        preferences,
        path,
        changed: false,
    };
    emit_success(ctx.output(), "prefs show", &report, Some(&human))
}

fn run_set(
    ctx: &mut Context,
    theme: Option<String>,
    mode: Option<String>,
    language: Option<String>,
) -> Result<()> {
    if theme.is_none() && mode.is_none() && language.is_none() {
        return Err(Error::InvalidArgument(
            "nothing to change; pass --theme, --mode or --language".to_string(),
        ));
    }

    let handle = PreferencesHandle::new(Preferences::load_from_dir(ctx.data_dir()));
    let mut changed = false;
    if let Some(theme) = theme.as_deref() {
        changed |= handle.set_theme(theme.parse()?);
    }
    if let Some(mode) = mode.as_deref() {
        changed |= handle.set_mode(mode.parse()?);
    }
    let mut human = HumanOutput::new("Preferences updated");
    if let Some(code) = language.as_deref() {
        let language = Language::from_code(code);
        if !language.code().eq_ignore_ascii_case(code.trim()) {
            human.push_warning(format!("unknown language '{code}', using {}", language.code()));
        }
        changed |= handle.set_language(language);
    }

    let preferences = handle.current();
    let path = ctx.data_dir().join(PREFS_FILE);
    if changed {
        preferences.save(&path)?;
        tracing::info!(path = %path.display(), "preferences saved");
        if let Some(warning) = ctx.emit(EventKind::PreferencesChanged, preferences) {
            human.push_warning(warning);
        }
    } else {
        human.push_detail("already up to date");
    }
    push_prefs_summary(&mut human, &preferences);

    let report = PrefsReport {
        preferences,
        path,
        changed,
    };
    emit_success(ctx.output(), "prefs set", &report, Some(&human))
}

fn push_prefs_summary(human: &mut HumanOutput, preferences: &Preferences) {
    human.push_summary("Theme", format!("{:?}", preferences.theme).to_lowercase());
    human.push_summary("Mode", format!("{:?}", preferences.mode).to_lowercase());
    human.push_summary(
        "Language",
        format!(
            "{} ({})",
            preferences.language.native_name(),
            preferences.language
        ),
    );
}

use eframe::egui;
use serde::{Deserialize, Serialize};

use crate::storage::Storage;

/// Storage key for the persisted theme preference.
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Light,
    #[default]
    Dark,
}

impl ThemePreference {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(ThemePreference::Light),
            "dark" => Some(ThemePreference::Dark),
            _ => None,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            ThemePreference::Light => ThemePreference::Dark,
            ThemePreference::Dark => ThemePreference::Light,
        }
    }

    /// Toggle-button glyph: the sun invites leaving dark mode, the moon
    /// invites entering it.
    pub fn icon(self) -> &'static str {
        match self {
            ThemePreference::Dark => "☀️",
            ThemePreference::Light => "🌙",
        }
    }

    pub fn visuals(self) -> egui::Visuals {
        match self {
            ThemePreference::Light => egui::Visuals::light(),
            ThemePreference::Dark => egui::Visuals::dark(),
        }
    }
}

/// Apply the persisted preference (default dark when absent or unreadable)
/// to the egui context. Called once at startup.
pub fn init(ctx: &egui::Context, storage: &Storage) {
    let preference = storage
        .get(THEME_KEY)
        .and_then(ThemePreference::parse)
        .unwrap_or_default();
    ctx.set_visuals(preference.visuals());
}

/// The theme currently applied to the context. This is the authority the
/// toggle flips, independent of what storage says.
pub fn applied(ctx: &egui::Context) -> ThemePreference {
    if ctx.style().visuals.dark_mode {
        ThemePreference::Dark
    } else {
        ThemePreference::Light
    }
}

/// Glyph for the toggle button in the current applied state.
pub fn toggle_icon(ctx: &egui::Context) -> &'static str {
    applied(ctx).icon()
}

/// Flip the applied theme and persist the new preference.
pub fn toggle(ctx: &egui::Context, storage: &mut Storage) {
    let next = applied(ctx).flipped();
    ctx.set_visuals(next.visuals());
    storage.set(THEME_KEY, next.as_str());
    tracing::debug!("theme switched to {}", next.as_str());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_storage_defaults_to_dark() {
        let ctx = egui::Context::default();
        let storage = Storage::in_memory();
        init(&ctx, &storage);
        assert_eq!(applied(&ctx), ThemePreference::Dark);
        assert_eq!(toggle_icon(&ctx), "☀️");
    }

    #[test]
    fn persisted_light_preference_is_applied() {
        let ctx = egui::Context::default();
        let mut storage = Storage::in_memory();
        storage.set(THEME_KEY, "light");
        init(&ctx, &storage);
        assert_eq!(applied(&ctx), ThemePreference::Light);
        assert_eq!(toggle_icon(&ctx), "🌙");
    }

    #[test]
    fn garbage_preference_falls_back_to_default() {
        let ctx = egui::Context::default();
        let mut storage = Storage::in_memory();
        storage.set(THEME_KEY, "sepia");
        init(&ctx, &storage);
        assert_eq!(applied(&ctx), ThemePreference::Dark);
    }

    #[test]
    fn toggle_is_an_involution() {
        let ctx = egui::Context::default();
        let mut storage = Storage::in_memory();
        init(&ctx, &storage);

        let start_applied = applied(&ctx);
        let start_icon = toggle_icon(&ctx);

        toggle(&ctx, &mut storage);
        assert_eq!(applied(&ctx), start_applied.flipped());
        assert_eq!(storage.get(THEME_KEY), Some("light"));

        toggle(&ctx, &mut storage);
        assert_eq!(applied(&ctx), start_applied);
        assert_eq!(toggle_icon(&ctx), start_icon);
        assert_eq!(storage.get(THEME_KEY), Some("dark"));
    }

    #[test]
    fn toggle_follows_applied_state_not_storage() {
        let ctx = egui::Context::default();
        let mut storage = Storage::in_memory();
        // Storage claims light but the context is dark; the toggle flips the
        // applied state and rewrites the preference.
        storage.set(THEME_KEY, "light");
        ctx.set_visuals(egui::Visuals::dark());

        toggle(&ctx, &mut storage);
        assert_eq!(applied(&ctx), ThemePreference::Light);
        assert_eq!(storage.get(THEME_KEY), Some("light"));
    }
}

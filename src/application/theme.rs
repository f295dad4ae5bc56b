//! Theme registry and resolution.
//!
//! Lookup is total: an unknown, empty or missing name yields the default
//! `modern` theme. Matching ignores case and surrounding whitespace.

use once_cell::sync::Lazy;
use tracing::debug;

use crate::domain::error::DomainError;
use crate::domain::theme::{
    ColorPalette, ComponentStyles, FontPair, LayoutKind, Spacing, ThemeDescriptor, ThemeOverrides,
};

pub const DEFAULT_THEME: &str = "modern";

static BUILTIN: Lazy<ThemeRegistry> = Lazy::new(ThemeRegistry::builtin);

/// Registry holding the themes that ship with the crate.
pub fn builtin_registry() -> &'static ThemeRegistry {
    &BUILTIN
}

/// Resolve against the built-in registry.
pub fn resolve_theme(name: Option<&str>) -> &'static ThemeDescriptor {
    BUILTIN.resolve(name)
}

#[derive(Debug, Clone)]
pub struct ThemeRegistry {
    themes: Vec<ThemeDescriptor>,
    default_index: usize,
}

impl ThemeRegistry {
    /// Registry seeded with `modern`, `classic`, `minimal`, `dark` and `newspaper`.
    pub fn builtin() -> Self {
        Self {
            themes: vec![modern(), classic(), minimal(), dark(), newspaper()],
            default_index: 0,
        }
    }

    pub fn resolve(&self, name: Option<&str>) -> &ThemeDescriptor {
        let found = name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .and_then(|name| self.find(name));

        match found {
            Some(theme) => theme,
            None => {
                if let Some(requested) = name {
                    debug!(requested, "Unknown theme, using default");
                }
                &self.themes[self.default_index]
            }
        }
    }

    pub fn default_theme(&self) -> &ThemeDescriptor {
        &self.themes[self.default_index]
    }

    pub fn names(&self) -> Vec<&str> {
        self.themes.iter().map(|theme| theme.name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name.trim()).is_some()
    }

    /// Add a theme or replace the one registered under the same name.
    pub fn register(&mut self, theme: ThemeDescriptor) -> Result<(), DomainError> {
        let name = theme.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("theme name must not be empty"));
        }
        if name.len() != theme.name.len() {
            return Err(DomainError::validation(format!(
                "theme name `{}` must not have surrounding whitespace",
                theme.name
            )));
        }

        match self
            .themes
            .iter()
            .position(|existing| existing.name.eq_ignore_ascii_case(name))
        {
            Some(index) => self.themes[index] = theme,
            None => self.themes.push(theme),
        }
        Ok(())
    }

    fn find(&self, name: &str) -> Option<&ThemeDescriptor> {
        self.themes
            .iter()
            .find(|theme| theme.name.eq_ignore_ascii_case(name))
    }
}

impl Default for ThemeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Shallow merge: each category present in `overrides` replaces the base one.
pub fn merge_overrides(base: &ThemeDescriptor, overrides: &ThemeOverrides) -> ThemeDescriptor {
    ThemeDescriptor {
        name: base.name.clone(),
        layout: base.layout,
        colors: overrides.colors.clone().unwrap_or_else(|| base.colors.clone()),
        fonts: overrides.fonts.clone().unwrap_or_else(|| base.fonts.clone()),
        spacing: overrides
            .spacing
            .clone()
            .unwrap_or_else(|| base.spacing.clone()),
        components: overrides
            .components
            .clone()
            .unwrap_or_else(|| base.components.clone()),
    }
}

fn palette(
    primary: &str,
    secondary: &str,
    accent: &str,
    background: &str,
    surface: &str,
    text: &str,
    muted: &str,
) -> ColorPalette {
    ColorPalette {
        primary: Some(primary.to_string()),
        secondary: Some(secondary.to_string()),
        accent: Some(accent.to_string()),
        background: Some(background.to_string()),
        surface: Some(surface.to_string()),
        text: Some(text.to_string()),
        muted: Some(muted.to_string()),
    }
}

fn fonts(heading: &str, body: &str) -> FontPair {
    FontPair {
        heading: Some(heading.to_string()),
        body: Some(body.to_string()),
    }
}

fn spacing(unit_px: u16, radius_px: u16, content_max_width_px: u32) -> Spacing {
    Spacing {
        unit_px: Some(unit_px),
        radius_px: Some(radius_px),
        content_max_width_px: Some(content_max_width_px),
    }
}

fn components(pairs: &[(&str, &str)]) -> ComponentStyles {
    pairs
        .iter()
        .map(|(component, class)| (component.to_string(), class.to_string()))
        .collect()
}

fn modern() -> ThemeDescriptor {
    ThemeDescriptor {
        name: "modern".to_string(),
        layout: LayoutKind::Grid,
        colors: palette(
            "#2563eb", "#0f172a", "#f59e0b", "#f8fafc", "#ffffff", "#1e293b", "#64748b",
        ),
        fonts: fonts("Inter", "Inter"),
        spacing: spacing(8, 12, 1200),
        components: components(&[
            ("card", "rounded-xl shadow-sm hover:shadow-md"),
            ("header", "sticky top-0 backdrop-blur"),
        ]),
    }
}

fn classic() -> ThemeDescriptor {
    ThemeDescriptor {
        name: "classic".to_string(),
        layout: LayoutKind::List,
        colors: palette(
            "#7c2d12", "#292524", "#b45309", "#fffbeb", "#fefce8", "#1c1917", "#78716c",
        ),
        fonts: fonts("Georgia", "Georgia"),
        spacing: spacing(8, 2, 960),
        components: components(&[("card", "border-b border-stone-300")]),
    }
}

fn minimal() -> ThemeDescriptor {
    ThemeDescriptor {
        name: "minimal".to_string(),
        layout: LayoutKind::List,
        colors: palette(
            "#111827", "#374151", "#111827", "#ffffff", "#ffffff", "#111827", "#9ca3af",
        ),
        fonts: fonts("system-ui", "system-ui"),
        spacing: spacing(6, 0, 720),
        components: ComponentStyles::new(),
    }
}

fn dark() -> ThemeDescriptor {
    ThemeDescriptor {
        name: "dark".to_string(),
        layout: LayoutKind::Grid,
        colors: palette(
            "#60a5fa", "#e2e8f0", "#fbbf24", "#0b1120", "#111827", "#e5e7eb", "#94a3b8",
        ),
        fonts: fonts("Inter", "Inter"),
        spacing: spacing(8, 10, 1200),
        components: components(&[
            ("card", "bg-gray-900 ring-1 ring-white/10"),
            ("header", "bg-gray-950/80"),
        ]),
    }
}

fn newspaper() -> ThemeDescriptor {
    ThemeDescriptor {
        name: "newspaper".to_string(),
        layout: LayoutKind::Magazine,
        colors: palette(
            "#000000", "#1f2937", "#b91c1c", "#f5f5f0", "#ffffff", "#111111", "#6b7280",
        ),
        fonts: fonts("Playfair Display", "Source Serif Pro"),
        spacing: spacing(4, 0, 1280),
        components: components(&[
            ("headline", "uppercase tracking-tight"),
            ("column", "border-l border-gray-300 pl-4"),
        ]),
    }
}

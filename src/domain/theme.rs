//! Theme descriptors: the styling and layout bundle a presentation layer applies.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    /// Card grid on the home page, sidebar on article pages.
    Grid,
    /// Single column list of articles.
    List,
    /// Lead story followed by a multi-column front page.
    Magazine,
}

/// Colour roles of a theme. Any role may be left unset; a presentation layer
/// falls back to its own default for unset roles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorPalette {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surface: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub muted: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontPair {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Spacing {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_px: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius_px: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_max_width_px: Option<u32>,
}

/// Per-component class overrides keyed by component name (`card`, `header`, ...).
pub type ComponentStyles = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeDescriptor {
    pub name: String,
    pub layout: LayoutKind,
    pub colors: ColorPalette,
    pub fonts: FontPair,
    pub spacing: Spacing,
    #[serde(default)]
    pub components: ComponentStyles,
}

/// Category-level replacements for a descriptor. A present category replaces the
/// base category as a whole, so a partial palette leaves the other roles unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeOverrides {
    pub colors: Option<ColorPalette>,
    pub fonts: Option<FontPair>,
    pub spacing: Option<Spacing>,
    pub components: Option<ComponentStyles>,
}

impl ThemeOverrides {
    pub fn is_empty(&self) -> bool {
        self.colors.is_none()
            && self.fonts.is_none()
            && self.spacing.is_none()
            && self.components.is_none()
    }
}

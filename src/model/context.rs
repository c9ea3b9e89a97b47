//! Layout context tokens.
//!
//! A row's measured geometry is a function of the tuple (width, font
//! context, theme). The tuple doubles as the size-cache key, so all three
//! tokens are small `Copy` types with by-value equality.

use std::str::FromStr;
use thiserror::Error;

/// Font context a row was measured against.
///
/// Scales the effective wrap width: larger glyphs fit fewer columns, so
/// the same content wraps onto more lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontContext {
    /// Condensed type, slightly wider effective wrap width.
    Compact,
    /// Standard type.
    #[default]
    Regular,
    /// Accessibility-sized type, substantially narrower wrap width.
    Large,
}

impl FontContext {
    /// Percentage applied to the usable width when wrapping.
    ///
    /// 100 means one column per cell; values above 100 shrink the
    /// effective width (bigger glyphs), values below widen it.
    pub fn wrap_scale_percent(self) -> u16 {
        match self {
            FontContext::Compact => 90,
            FontContext::Regular => 100,
            FontContext::Large => 140,
        }
    }
}

/// Error returned when parsing an unknown font context name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown font context '{0}' (expected compact, regular, or large)")]
pub struct UnknownFontContext(pub String);

impl FromStr for FontContext {
    type Err = UnknownFontContext;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compact" => Ok(FontContext::Compact),
            "regular" => Ok(FontContext::Regular),
            "large" => Ok(FontContext::Large),
            other => Err(UnknownFontContext(other.to_string())),
        }
    }
}

impl std::fmt::Display for FontContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FontContext::Compact => "compact",
            FontContext::Regular => "regular",
            FontContext::Large => "large",
        };
        write!(f, "{name}")
    }
}

/// Theme a row was last styled against.
///
/// Geometry-neutral: a theme change re-stamps rows (and re-measures those
/// whose token differs, per the attribute-equality contract) but measured
/// heights do not depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ThemeToken {
    /// Default paper-white theme.
    #[default]
    Light,
    /// Dark theme.
    Dark,
    /// Sepia reading theme.
    Sepia,
    /// Pure-black theme for OLED displays.
    Black,
}

/// Error returned when parsing an unknown theme name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown theme '{0}' (expected light, dark, sepia, or black)")]
pub struct UnknownTheme(pub String);

impl FromStr for ThemeToken {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(ThemeToken::Light),
            "dark" => Ok(ThemeToken::Dark),
            "sepia" => Ok(ThemeToken::Sepia),
            "black" => Ok(ThemeToken::Black),
            other => Err(UnknownTheme(other.to_string())),
        }
    }
}

impl std::fmt::Display for ThemeToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ThemeToken::Light => "light",
            ThemeToken::Dark => "dark",
            ThemeToken::Sepia => "sepia",
            ThemeToken::Black => "black",
        };
        write!(f, "{name}")
    }
}

/// The full tuple of parameters a row's geometry depends on.
///
/// Two contexts that compare equal produce identical measurements, which
/// is what makes this the size-cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LayoutContext {
    /// Viewport width in columns.
    pub width: u16,
    /// Font context.
    pub font: FontContext,
    /// Theme token.
    pub theme: ThemeToken,
}

impl LayoutContext {
    /// Create a new layout context.
    pub fn new(width: u16, font: FontContext, theme: ThemeToken) -> Self {
        Self { width, font, theme }
    }

    /// The same context at a different width.
    pub fn with_width(self, width: u16) -> Self {
        Self { width, ..self }
    }

    /// The same context with different style tokens.
    pub fn with_style(self, font: FontContext, theme: ThemeToken) -> Self {
        Self { font, theme, ..self }
    }
}

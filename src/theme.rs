/// Named bundle of background and text color defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub background: String,
    pub text_color: String,
}

impl Theme {
    pub fn light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            text_color: "#222222".to_string(),
        }
    }

    pub fn dark() -> Self {
        Self {
            background: "#1f1f1f".to_string(),
            text_color: "#ffffff".to_string(),
        }
    }

    /// Flat stand-in for a gradient background.
    pub fn gradient() -> Self {
        Self {
            background: "#d53369".to_string(),
            text_color: "#ffffff".to_string(),
        }
    }

    /// Unknown names resolve to the light theme.
    pub fn from_name(name: &str) -> Self {
        match name {
            "dark" => Self::dark(),
            "gradient" => Self::gradient(),
            _ => Self::light(),
        }
    }
}

pub const DEFAULT_FONT_SIZE: u32 = 22;

pub fn font_size_for(size: &str) -> u32 {
    match size {
        "sm" => 16,
        "md" => 22,
        "lg" => 28,
        "xl" => 36,
        _ => DEFAULT_FONT_SIZE,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontChoice {
    Sans,
    Serif,
    Mono,
}

impl FontChoice {
    pub fn from_name(name: &str) -> Self {
        match name {
            "serif" => FontChoice::Serif,
            "mono" => FontChoice::Mono,
            _ => FontChoice::Sans,
        }
    }

    pub fn family(self) -> &'static str {
        match self {
            FontChoice::Sans => SANS_FAMILY,
            FontChoice::Serif => "Georgia, serif",
            FontChoice::Mono => "Courier, monospace",
        }
    }
}

pub const SANS_FAMILY: &str = "Arial, sans-serif";

/// Concrete colors and font used to draw one card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    pub background_color: String,
    pub text_color: String,
    pub font_size: u32,
    pub font_family: String,
}

/// Resolves the requested names against the fixed tables. Explicit colors win
/// over the theme and are used verbatim; empty overrides are ignored. Never fails.
pub fn resolve_presentation(
    theme: &str,
    size: &str,
    font: &str,
    color: Option<&str>,
    bg: Option<&str>,
) -> Presentation {
    let base = Theme::from_name(theme);
    Presentation {
        background_color: non_empty(bg).unwrap_or(base.background),
        text_color: non_empty(color).unwrap_or(base.text_color),
        font_size: font_size_for(size),
        font_family: FontChoice::from_name(font).family().to_string(),
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|value| !value.is_empty()).map(str::to_string)
}

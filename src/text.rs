use crate::text_metrics;

/// Width of a string set in a given font. Implemented by the system font
/// measurer, the estimate, and any `Fn(&str, f32, &str) -> f32`.
pub trait TextMeasure {
    fn measure(&self, text: &str, font_size: f32, font_family: &str) -> f32;
}

impl<F> TextMeasure for F
where
    F: Fn(&str, f32, &str) -> f32,
{
    fn measure(&self, text: &str, font_size: f32, font_family: &str) -> f32 {
        self(text, font_size, font_family)
    }
}

/// Measures against installed fonts, falling back to the estimate when the
/// family cannot be loaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemFontMetrics;

impl TextMeasure for SystemFontMetrics {
    fn measure(&self, text: &str, font_size: f32, font_family: &str) -> f32 {
        text_metrics::measure_text_width(text, font_size, font_family)
            .unwrap_or_else(|| text_metrics::estimated_text_width(text, font_size))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatedMetrics;

impl TextMeasure for EstimatedMetrics {
    fn measure(&self, text: &str, font_size: f32, _font_family: &str) -> f32 {
        text_metrics::estimated_text_width(text, font_size)
    }
}

/// Greedy line fill. Tokens come from splitting on single spaces, so runs of
/// spaces yield empty tokens. A token is measured with its trailing space; the
/// very first token never breaks, so an over-wide word stays whole on its own
/// line. Lines are trimmed before they are returned.
pub fn wrap_text<F>(text: &str, max_width: f32, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f32,
{
    let mut lines = Vec::new();
    let mut line = String::new();
    for (idx, word) in text.split(' ').enumerate() {
        let candidate = format!("{line}{word} ");
        if measure(&candidate) > max_width && idx > 0 {
            lines.push(std::mem::take(&mut line));
            line = format!("{word} ");
        } else {
            line = candidate;
        }
    }
    lines.push(line);

    lines.iter().map(|line| line.trim().to_string()).collect()
}

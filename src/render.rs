use crate::config::CardConfig;
use crate::error::RenderError;
use crate::quote::Quote;
use crate::text::{SystemFontMetrics, TextMeasure, wrap_text};
use crate::theme::Presentation;
use anyhow::Result;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Svg,
}

impl OutputFormat {
    /// Anything other than `svg` selects the raster path.
    pub fn from_name(name: &str) -> Self {
        if name == "svg" {
            OutputFormat::Svg
        } else {
            OutputFormat::Png
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedImage {
    Png(Vec<u8>),
    Svg(String),
}

impl RenderedImage {
    pub fn content_type(&self) -> &'static str {
        match self {
            RenderedImage::Png(_) => "image/png",
            RenderedImage::Svg(_) => "image/svg+xml",
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            RenderedImage::Png(bytes) => bytes,
            RenderedImage::Svg(svg) => svg.into_bytes(),
        }
    }
}

pub fn render_quote(
    quote: &Quote,
    presentation: &Presentation,
    format: OutputFormat,
    card: &CardConfig,
) -> Result<RenderedImage, RenderError> {
    render_quote_with_metrics(quote, presentation, format, card, &SystemFontMetrics)
}

pub fn render_quote_with_metrics(
    quote: &Quote,
    presentation: &Presentation,
    format: OutputFormat,
    card: &CardConfig,
    metrics: &dyn TextMeasure,
) -> Result<RenderedImage, RenderError> {
    match format {
        OutputFormat::Svg => Ok(RenderedImage::Svg(render_svg(quote, presentation, card))),
        OutputFormat::Png => {
            let scene = render_card_scene(quote, presentation, card, metrics);
            rasterize(&scene, card).map(RenderedImage::Png)
        }
    }
}

/// Minimal vector card: background plus the raw quote content on one centered
/// line. The text is neither wrapped nor quoted and the attribution is left out.
pub fn render_svg(quote: &Quote, presentation: &Presentation, card: &CardConfig) -> String {
    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">",
        card.width, card.height
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\" />",
        escape_xml(&presentation.background_color)
    ));
    svg.push_str(&format!(
        "<text x=\"50%\" y=\"50%\" dominant-baseline=\"middle\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
        escape_xml(&card.svg_font_family),
        card.svg_font_size,
        escape_xml(&presentation.text_color),
        escape_xml(&quote.content)
    ));
    svg.push_str("</svg>");
    svg
}

/// Full card as SVG markup: wrapped, quoted text from `height / 3` downwards and
/// a bold attribution near the bottom. This is the scene the raster path draws.
pub fn render_card_scene(
    quote: &Quote,
    presentation: &Presentation,
    card: &CardConfig,
    metrics: &dyn TextMeasure,
) -> String {
    let width = card.width;
    let height = card.height;
    let center_x = width / 2.0;
    let font_size = presentation.font_size as f32;
    let family = presentation.font_family.as_str();

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        escape_xml(&presentation.background_color)
    ));

    let quoted = format!("\"{}\"", strip_non_xml(&quote.content));
    let lines = wrap_text(&quoted, card.wrap_width, |line| {
        metrics.measure(line, font_size, family)
    });
    let line_height = font_size + card.line_gap;
    let start_y = height / 3.0;
    for (idx, line) in lines.iter().enumerate() {
        let y = start_y + idx as f32 * line_height;
        svg.push_str(&text_svg(
            center_x,
            y,
            line,
            family,
            font_size,
            false,
            &presentation.text_color,
        ));
    }

    let attribution = format!("\u{2014} {}", strip_non_xml(&quote.author));
    svg.push_str(&text_svg(
        center_x,
        height - card.attribution_offset,
        &attribution,
        &card.attribution_font_family,
        (font_size - card.attribution_shrink).max(1.0),
        true,
        &presentation.text_color,
    ));

    svg.push_str("</svg>");
    svg
}

fn text_svg(
    x: f32,
    y: f32,
    text: &str,
    font_family: &str,
    font_size: f32,
    bold: bool,
    fill: &str,
) -> String {
    let weight = if bold { " font-weight=\"bold\"" } else { "" };
    format!(
        "<text x=\"{x:.2}\" y=\"{y:.2}\" text-anchor=\"middle\" dominant-baseline=\"middle\" xml:space=\"preserve\" font-family=\"{}\" font-size=\"{}\"{weight} fill=\"{}\">{}</text>",
        escape_xml(font_family),
        font_size,
        escape_xml(fill),
        escape_xml(text)
    )
}

#[cfg(feature = "png")]
fn rasterize(svg: &str, card: &CardConfig) -> Result<Vec<u8>, RenderError> {
    use once_cell::sync::Lazy;
    use std::sync::Arc;

    static RENDER_FONTS: Lazy<Arc<usvg::fontdb::Database>> = Lazy::new(|| {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        Arc::new(db)
    });

    let mut opt = usvg::Options::default();
    opt.font_family = "Arial".to_string();
    opt.fontdb = RENDER_FONTS.clone();
    if let Some(size) = usvg::Size::from_wh(card.width, card.height) {
        opt.default_size = size;
    }

    let tree = usvg::Tree::from_str(svg, &opt).map_err(|err| RenderError::Svg(err.to_string()))?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height()).ok_or(
        RenderError::Pixmap {
            width: size.width(),
            height: size.height(),
        },
    )?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap
        .encode_png()
        .map_err(|err| RenderError::Encode(err.to_string()))
}

#[cfg(not(feature = "png"))]
fn rasterize(_svg: &str, _card: &CardConfig) -> Result<Vec<u8>, RenderError> {
    Err(RenderError::Unsupported("png"))
}

/// Writes SVG to `output`, or to stdout when no path is given. PNG needs a path.
pub fn write_output(image: &RenderedImage, output: Option<&Path>) -> Result<()> {
    match (image, output) {
        (RenderedImage::Svg(svg), None) => {
            print!("{}", svg);
        }
        (RenderedImage::Svg(svg), Some(path)) => {
            std::fs::write(path, svg)?;
        }
        (RenderedImage::Png(bytes), Some(path)) => {
            std::fs::write(path, bytes)?;
        }
        (RenderedImage::Png(_), None) => {
            return Err(anyhow::anyhow!("Output path required for png output"));
        }
    }
    Ok(())
}

/// Drops characters an XML 1.0 document cannot contain.
fn strip_non_xml(input: &str) -> String {
    input
        .chars()
        .filter(|ch| match ch {
            '\t' | '\n' | '\r' => true,
            '\u{0}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}' => false,
            _ => true,
        })
        .collect()
}

fn escape_xml(input: &str) -> String {
    strip_non_xml(input)
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::EstimatedMetrics;
    use crate::theme::resolve_presentation;

    fn quote(content: &str, author: &str) -> Quote {
        Quote {
            content: content.to_string(),
            author: author.to_string(),
        }
    }

    fn ten_px_per_char(text: &str, _size: f32, _family: &str) -> f32 {
        text.chars().count() as f32 * 10.0
    }

    #[test]
    fn format_names() {
        assert_eq!(OutputFormat::from_name("svg"), OutputFormat::Svg);
        assert_eq!(OutputFormat::from_name("png"), OutputFormat::Png);
        assert_eq!(OutputFormat::from_name("jpeg"), OutputFormat::Png);
        assert_eq!(OutputFormat::from_name("SVG"), OutputFormat::Png);
    }

    #[test]
    fn vector_card_has_background_and_raw_text_only() {
        let presentation = resolve_presentation("dark", "md", "sans", None, None);
        let svg = render_svg(&quote("Hello World", "Tester"), &presentation, &CardConfig::default());
        assert!(svg.starts_with("<svg width=\"800\" height=\"300\""));
        assert!(svg.contains("<rect width=\"100%\" height=\"100%\" fill=\"#1f1f1f\" />"));
        assert!(svg.contains(">Hello World</text>"));
        assert!(svg.contains("font-size=\"20\""));
        assert!(svg.contains("fill=\"#ffffff\""));
        assert!(!svg.contains("Tester"));
        assert!(!svg.contains('\u{2014}'));
    }

    #[test]
    fn vector_card_escapes_markup() {
        let presentation = resolve_presentation("light", "md", "sans", Some("\"red"), None);
        let svg = render_svg(&quote("a < b & c", ""), &presentation, &CardConfig::default());
        assert!(svg.contains(">a &lt; b &amp; c</text>"));
        assert!(svg.contains("fill=\"&quot;red\""));
    }

    #[test]
    fn scene_places_wrapped_lines_and_attribution() {
        let presentation = resolve_presentation("light", "md", "sans", None, None);
        let card = CardConfig {
            wrap_width: 100.0,
            ..CardConfig::default()
        };
        let scene = render_card_scene(
            &quote("aaaa bbbb cccc", "Someone"),
            &presentation,
            &card,
            &ten_px_per_char,
        );
        // "\"aaaa bbbb " is 11 chars, so every word lands on its own line.
        assert!(scene.contains("y=\"100.00\""));
        assert!(scene.contains(">&quot;aaaa</text>"));
        assert!(scene.contains("y=\"130.00\""));
        assert!(scene.contains(">bbbb</text>"));
        assert!(scene.contains("y=\"160.00\""));
        assert!(scene.contains(">cccc&quot;</text>"));
        assert!(scene.contains("y=\"250.00\""));
        assert!(scene.contains("font-weight=\"bold\""));
        assert!(scene.contains("font-size=\"18\""));
        assert!(scene.contains(">\u{2014} Someone</text>"));
    }

    #[test]
    fn scene_uses_resolved_font_and_colors() {
        let presentation = resolve_presentation("gradient", "xl", "serif", None, None);
        let scene = render_card_scene(
            &quote("Short", "A"),
            &presentation,
            &CardConfig::default(),
            &EstimatedMetrics,
        );
        assert!(scene.contains("fill=\"#d53369\""));
        assert!(scene.contains("font-family=\"Georgia, serif\" font-size=\"36\""));
        assert!(scene.contains(">&quot;Short&quot;</text>"));
        assert!(scene.contains("font-size=\"32\" font-weight=\"bold\""));
    }

    #[test]
    fn empty_author_still_draws_dash() {
        let presentation = resolve_presentation("light", "md", "sans", None, None);
        let scene = render_card_scene(
            &quote("Hi", ""),
            &presentation,
            &CardConfig::default(),
            &EstimatedMetrics,
        );
        assert!(scene.contains(">\u{2014} </text>"));
    }

    #[test]
    fn rendered_image_content_types() {
        assert_eq!(RenderedImage::Png(vec![]).content_type(), "image/png");
        assert_eq!(RenderedImage::Svg(String::new()).content_type(), "image/svg+xml");
    }

    #[cfg(feature = "png")]
    #[test]
    fn raster_path_produces_png() {
        let presentation = resolve_presentation("dark", "md", "mono", None, None);
        let image = render_quote_with_metrics(
            &quote("Simplicity is prerequisite for reliability.", "Edsger W. Dijkstra"),
            &presentation,
            OutputFormat::Png,
            &CardConfig::default(),
            &EstimatedMetrics,
        )
        .expect("render");
        let RenderedImage::Png(bytes) = image else {
            panic!("expected png output");
        };
        assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]));
    }

    #[test]
    fn scene_drops_control_characters() {
        let presentation = resolve_presentation("light", "md", "sans", None, None);
        let scene = render_card_scene(
            &quote("bell\u{7}here", "Null\u{0}Author"),
            &presentation,
            &CardConfig::default(),
            &EstimatedMetrics,
        );
        assert!(!scene.contains('\u{7}'));
        assert!(!scene.contains('\u{0}'));
        assert!(scene.contains(">&quot;bellhere&quot;</text>"));
        assert!(scene.contains(">\u{2014} NullAuthor</text>"));
    }

    #[test]
    fn vector_card_drops_control_characters() {
        let presentation = resolve_presentation("light", "md", "sans", None, None);
        let svg = render_svg(&quote("tab\there\u{1b}", ""), &presentation, &CardConfig::default());
        assert!(svg.contains(">tab\there</text>"));
    }

    #[cfg(feature = "png")]
    #[test]
    fn raster_path_accepts_control_characters() {
        let presentation = resolve_presentation("light", "md", "sans", None, None);
        let image = render_quote_with_metrics(
            &quote("bell\u{7}here", "Someone\u{b}"),
            &presentation,
            OutputFormat::Png,
            &CardConfig::default(),
            &EstimatedMetrics,
        );
        assert!(matches!(image, Ok(RenderedImage::Png(_))), "got {image:?}");
    }

    #[test]
    fn png_without_path_is_rejected() {
        assert!(write_output(&RenderedImage::Png(vec![1, 2, 3]), None).is_err());
    }
}

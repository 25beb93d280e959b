use std::{borrow::Cow, fmt::Write as _};

use kurbo::Shape as _;

use crate::{
    assets::tone::TextPalette,
    config::Theme,
    foundation::core::Rgba8,
    layout::geometry::LayoutGeometry,
    text::runs::{LineMetrics, TextRun, layout_runs_with},
};

// Average advance as a fraction of font size; used only to clip overlong lines.
const REGULAR_ADVANCE_EM: f32 = 0.52;
const BOLD_ADVANCE_EM: f32 = 0.58;
const ELLIPSIS: char = '\u{2026}';

/// Full-canvas SVG document holding panel, title, body runs and brand label.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkupLayer {
    pub svg: String,
    /// Body runs that made it into the document, in draw order.
    pub runs: Vec<TextRun>,
}

/// Text fields drawn by the markup layer.
#[derive(Clone, Copy, Debug)]
pub struct CardText<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub brand: Option<&'a str>,
}

/// Build the markup layer for `geometry` using `palette` for every fill.
pub fn build_markup(
    geometry: &LayoutGeometry,
    theme: &Theme,
    palette: &TextPalette,
    text: CardText<'_>,
) -> MarkupLayer {
    let (w, h) = (geometry.canvas.width, geometry.canvas.height);
    let x = geometry.text_origin_x as f32;
    let avail = geometry.text_max_x.saturating_sub(geometry.text_origin_x) as f32;
    let family = escape_xml(&theme.font_family);

    let mut svg = String::with_capacity(2048);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    );

    if let Some(panel) = geometry.panel {
        let d = panel.shape().to_path(0.1).to_svg();
        let _ = write!(svg, r#"<path d="{d}"{}/>"#, fill_attrs(palette.panel));
    }

    let title = fit_to_width(text.title.trim(), avail, theme.title_size_px, true);
    let _ = write!(
        svg,
        r#"<text x="{x}" y="{}" font-family="{family}" font-size="{}" font-weight="bold"{}>{}</text>"#,
        geometry.title_y,
        theme.title_size_px,
        fill_attrs(palette.title),
        escape_xml(&title),
    );

    let metrics = LineMetrics {
        origin_x: x,
        top: geometry.body_top as f32,
        line_height: theme.line_height_px,
    };
    let mut runs = Vec::new();
    for run in layout_runs_with(text.content, metrics) {
        if run.y > geometry.body_bottom as f32 {
            tracing::debug!(line_index = run.line_index, "body text overflows card, truncating");
            break;
        }
        let shown = fit_to_width(&run.display_text(), avail, theme.body_size_px, run.style.bold)
            .into_owned();
        let weight = if run.style.bold {
            r#" font-weight="bold""#
        } else {
            ""
        };
        let _ = write!(
            svg,
            r#"<text x="{}" y="{}" font-family="{family}" font-size="{}"{weight}{}>{}</text>"#,
            run.x,
            run.y,
            theme.body_size_px,
            fill_attrs(palette.body),
            escape_xml(&shown),
        );
        runs.push(run);
    }

    if let Some(brand) = text.brand.map(str::trim).filter(|b| !b.is_empty()) {
        let brand = fit_to_width(brand, avail, theme.brand_size_px, true);
        let _ = write!(
            svg,
            r#"<text x="{x}" y="{}" font-family="{family}" font-size="{}" font-weight="bold"{}>{}</text>"#,
            geometry.brand_y,
            theme.brand_size_px,
            fill_attrs(palette.accent),
            escape_xml(&brand),
        );
    }

    svg.push_str("</svg>");
    MarkupLayer { svg, runs }
}

fn fill_attrs(c: Rgba8) -> String {
    if c.a == 255 {
        format!(r#" fill="{}""#, c.hex_rgb())
    } else {
        format!(
            r#" fill="{}" fill-opacity="{:.3}""#,
            c.hex_rgb(),
            c.opacity()
        )
    }
}

/// Clip `text` with an ellipsis when its estimated advance exceeds `avail_px`.
pub fn fit_to_width(text: &str, avail_px: f32, size_px: f32, bold: bool) -> Cow<'_, str> {
    let em = if bold { BOLD_ADVANCE_EM } else { REGULAR_ADVANCE_EM };
    let max_chars = (avail_px / (size_px * em)).floor().max(1.0) as usize;
    if text.chars().count() <= max_chars {
        return Cow::Borrowed(text);
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.truncate(out.trim_end().len());
    out.push(ELLIPSIS);
    Cow::Owned(out)
}

/// Escape markup characters and drop characters XML 1.0 does not allow in a document.
pub fn escape_xml(s: &str) -> Cow<'_, str> {
    if !s
        .chars()
        .any(|c| matches!(c, '&' | '<' | '>' | '"' | '\'') || !is_xml_char(c))
    {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 16);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if !is_xml_char(c) => {}
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

// XML 1.0 `Char` production; surrogates cannot occur in a `char`.
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

#[cfg(test)]
#[path = "../../tests/unit/text/markup.rs"]
mod tests;

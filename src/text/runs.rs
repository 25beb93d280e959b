//! Line-level markup for card body text.
//!
//! Each input line becomes at most one [`TextRun`]:
//!
//! - `- item` is a bullet run (marker stripped, drawn with [`BULLET_GLYPH`])
//! - `**text**` is a bold run (markers stripped)
//! - anything else is a plain run
//!
//! Lines are trimmed and blank lines are skipped without consuming a line index.

pub const BULLET_MARKER: &str = "- ";
pub const BOLD_MARKER: &str = "**";
pub const BULLET_GLYPH: char = '\u{2022}';

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct RunStyle {
    pub bold: bool,
    pub bullet: bool,
}

/// One positioned, styled line of body text. `y` is the baseline.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TextRun {
    pub text: String,
    pub style: RunStyle,
    pub line_index: usize,
    pub x: f32,
    pub y: f32,
}

impl TextRun {
    /// Text as drawn, including the bullet prefix.
    pub fn display_text(&self) -> String {
        if self.style.bullet {
            format!("{BULLET_GLYPH} {}", self.text)
        } else {
            self.text.clone()
        }
    }
}

/// Vertical stacking parameters for body runs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineMetrics {
    pub origin_x: f32,
    /// Baseline of line 0.
    pub top: f32,
    pub line_height: f32,
}

impl LineMetrics {
    pub const DEFAULT_TOP: f32 = 200.0;
    pub const DEFAULT_LINE_HEIGHT: f32 = 44.0;

    pub fn at(origin_x: f32) -> Self {
        Self {
            origin_x,
            top: Self::DEFAULT_TOP,
            line_height: Self::DEFAULT_LINE_HEIGHT,
        }
    }
}

/// Lazy run iterator. Cloning restarts from the clone point.
#[derive(Clone, Debug)]
pub struct Runs<'a> {
    lines: std::str::Lines<'a>,
    metrics: LineMetrics,
    next_index: usize,
}

impl Iterator for Runs<'_> {
    type Item = TextRun;

    fn next(&mut self) -> Option<TextRun> {
        loop {
            let raw = self.lines.next()?;
            let Some((text, style)) = parse_line(raw) else {
                continue;
            };

            let line_index = self.next_index;
            self.next_index += 1;
            return Some(TextRun {
                text: text.to_string(),
                style,
                line_index,
                x: self.metrics.origin_x,
                y: self.metrics.top + (line_index as f32) * self.metrics.line_height,
            });
        }
    }
}

/// Runs for `content` at `origin_x` with default line metrics.
pub fn layout_runs(content: &str, origin_x: f32) -> Runs<'_> {
    layout_runs_with(content, LineMetrics::at(origin_x))
}

pub fn layout_runs_with(content: &str, metrics: LineMetrics) -> Runs<'_> {
    Runs {
        lines: content.lines(),
        metrics,
        next_index: 0,
    }
}

/// Classify one raw line. `None` for blank lines.
pub fn parse_line(raw: &str) -> Option<(&str, RunStyle)> {
    let line = raw.trim();
    if line.is_empty() {
        return None;
    }

    if let Some(rest) = line.strip_prefix(BULLET_MARKER) {
        let style = RunStyle {
            bullet: true,
            ..RunStyle::default()
        };
        return Some((rest.trim(), style));
    }

    if let Some(inner) = line
        .strip_prefix(BOLD_MARKER)
        .and_then(|s| s.strip_suffix(BOLD_MARKER))
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        let style = RunStyle {
            bold: true,
            ..RunStyle::default()
        };
        return Some((inner, style));
    }

    Some((line, RunStyle::default()))
}

#[cfg(test)]
#[path = "../../tests/unit/text/runs.rs"]
mod tests;

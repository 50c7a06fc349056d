//! View rendering: report blocks to a page bitmap.
//!
//! [`ViewRenderer`] is the boundary between the pipeline and whatever draws
//! the page. [`BitmapRenderer`] is the built-in implementation: flat panels
//! and the 5x7 bitmap font on an A4-at-96-dpi surface.

use image::imageops::FilterType;
use image::{Rgb, RgbImage, RgbaImage};
use thiserror::Error;

use crate::font::{self, ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH, LINE_HEIGHT};
use crate::markup::{Block, Row};

/// Page size in CSS pixels.
pub const PAGE_WIDTH: u32 = 794;
pub const PAGE_HEIGHT: u32 = 1123;
pub const MAX_SCALE: u32 = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("scale {0} is outside 1..=4")]
    Scale(u32),
}

/// Parsed blocks plus the assets they reference.
#[derive(Clone, Debug, Default)]
pub struct ReportView {
    pub blocks: Vec<Block>,
    /// `None` when the logo could not be loaded; its block is then skipped.
    pub logo: Option<RgbaImage>,
}

pub trait ViewRenderer: Send + Sync {
    /// Draw `view` onto a fresh `PAGE_WIDTH * scale` by `PAGE_HEIGHT * scale`
    /// surface.
    fn render(&self, view: &ReportView, scale: u32) -> Result<RgbImage, RenderError>;
}

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const INK: Rgb<u8> = Rgb([17, 24, 39]);
const MUTED: Rgb<u8> = Rgb([75, 85, 99]);
const FAINT: Rgb<u8> = Rgb([107, 114, 128]);
const RULE: Rgb<u8> = Rgb([229, 231, 235]);
const PANEL_FILLS: [Rgb<u8>; 2] = [Rgb([243, 244, 246]), Rgb([255, 247, 237])];
const CALLOUT_FILL: Rgb<u8> = Rgb([240, 253, 244]);
const CALLOUT_BORDER: Rgb<u8> = Rgb([187, 247, 208]);
const CALLOUT_INK: Rgb<u8> = Rgb([22, 101, 52]);
const POSITIVE: Rgb<u8> = Rgb([34, 197, 94]);
const NEGATIVE: Rgb<u8> = Rgb([220, 38, 38]);

const MARGIN: u32 = 64;
const LOGO_HEIGHT: u32 = 48;

#[derive(Clone, Copy, Debug, Default)]
pub struct BitmapRenderer;

/// Font size: device pixels per font pixel, derived from half-CSS-pixel units.
#[derive(Clone, Copy)]
struct TextStyle {
    px: u32,
    color: Rgb<u8>,
    bold: bool,
}

impl TextStyle {
    fn new(half_units: u32, scale: u32, color: Rgb<u8>) -> Self {
        Self {
            px: (half_units * scale / 2).max(1),
            color,
            bold: false,
        }
    }

    fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    fn advance(&self) -> u32 {
        ADVANCE * self.px
    }

    fn line_height(&self) -> u32 {
        LINE_HEIGHT * self.px
    }

    fn width(&self, text: &str) -> u32 {
        font::text_width(text) * self.px
    }

    fn max_chars(&self, width: u32) -> usize {
        ((width + self.px) / self.advance()).max(1) as usize
    }
}

/// Greedy word wrap to at most `max_chars` per line; overlong words are split.
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let needed = if line.is_empty() {
            word.len()
        } else {
            line.chars().count() + 1 + word.len()
        };
        if needed > max_chars && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.extend(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

struct Canvas {
    img: RgbImage,
    scale: u32,
}

impl Canvas {
    fn fill(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
        let x1 = x.saturating_add(w).min(self.img.width());
        let y1 = y.saturating_add(h).min(self.img.height());
        for py in y.min(y1)..y1 {
            for px in x.min(x1)..x1 {
                self.img.put_pixel(px, py, color);
            }
        }
    }

    fn outline(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
        let t = self.scale;
        self.fill(x, y, w, t, color);
        self.fill(x, (y + h).saturating_sub(t), w, t, color);
        self.fill(x, y, t, h, color);
        self.fill((x + w).saturating_sub(t), y, t, h, color);
    }

    fn text(&mut self, x: u32, y: u32, text: &str, style: TextStyle) {
        let passes = if style.bold { 2 } else { 1 };
        let bold_dx = (style.px / 3).max(1);
        let mut cx = x;
        for c in text.chars() {
            for row in 0..GLYPH_HEIGHT {
                for col in 0..GLYPH_WIDTH {
                    if font::pixel(c, col, row) {
                        for pass in 0..passes {
                            self.fill(
                                cx + col * style.px + pass * bold_dx,
                                y + row * style.px,
                                style.px,
                                style.px,
                                style.color,
                            );
                        }
                    }
                }
            }
            cx += style.advance();
        }
    }

    /// Wrapped paragraph; returns the y below its last line.
    fn paragraph(&mut self, x: u32, y: u32, width: u32, text: &str, style: TextStyle) -> u32 {
        let mut y = y;
        for line in wrap(text, style.max_chars(width)) {
            self.text(x, y, &line, style);
            y += style.line_height();
        }
        y
    }

    fn centered(&mut self, x: u32, y: u32, width: u32, text: &str, style: TextStyle) -> u32 {
        let mut y = y;
        for line in wrap(text, style.max_chars(width)) {
            let offset = width.saturating_sub(style.width(&line)) / 2;
            self.text(x + offset, y, &line, style);
            y += style.line_height();
        }
        y
    }

    fn logo(&mut self, x: u32, y: u32, max_width: u32, logo: &RgbaImage) {
        let target_h = LOGO_HEIGHT * self.scale;
        if logo.height() == 0 || logo.width() == 0 {
            return;
        }
        let w = (u64::from(logo.width()) * u64::from(target_h) / u64::from(logo.height()))
            .clamp(1, u64::from(max_width)) as u32;
        let scaled = image::imageops::resize(logo, w, target_h, FilterType::Triangle);
        for (sx, sy, p) in scaled.enumerate_pixels() {
            let (dx, dy) = (x + sx, y + sy);
            if dx >= self.img.width() || dy >= self.img.height() {
                continue;
            }
            let a = u32::from(p[3]);
            let dst = self.img.get_pixel(dx, dy);
            let blend = |s: u8, d: u8| ((u32::from(s) * a + u32::from(d) * (255 - a)) / 255) as u8;
            let out = Rgb([blend(p[0], dst[0]), blend(p[1], dst[1]), blend(p[2], dst[2])]);
            self.img.put_pixel(dx, dy, out);
        }
    }
}

struct Layout {
    scale: u32,
    left: u32,
    width: u32,
}

impl Layout {
    fn s(&self, v: u32) -> u32 {
        v * self.scale
    }

    fn body(&self) -> TextStyle {
        TextStyle::new(4, self.scale, INK)
    }

    fn small(&self, color: Rgb<u8>) -> TextStyle {
        TextStyle::new(3, self.scale, color)
    }

    fn panel_height(&self, width: u32, heading: &str, subtitle: Option<&str>, rows: &[Row]) -> u32 {
        let inner = width.saturating_sub(self.s(48));
        let head = self.body().bold();
        let small = self.small(FAINT);
        let mut h = self.s(24) + wrap(heading, head.max_chars(inner)).len() as u32 * head.line_height();
        if let Some(sub) = subtitle {
            h += self.s(4) + wrap(sub, small.max_chars(inner)).len() as u32 * small.line_height();
        }
        h += self.s(12);
        for row in rows {
            h += self.row_lines(inner, row).len() as u32 * small.line_height() + self.s(8);
        }
        h + self.s(16)
    }

    fn row_lines(&self, inner: u32, row: &Row) -> Vec<String> {
        let style = self.small(MUTED);
        let label_w = inner.saturating_sub(style.width(&row.value) + self.s(12));
        wrap(&row.label, style.max_chars(label_w))
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_panel(
        &self,
        canvas: &mut Canvas,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        fill: Rgb<u8>,
        heading: &str,
        subtitle: Option<&str>,
        rows: &[Row],
    ) {
        canvas.fill(x, y, width, height, fill);
        let pad = self.s(24);
        let inner = width.saturating_sub(2 * pad);
        let mut cy = canvas.paragraph(x + pad, y + pad, inner, heading, self.body().bold());
        if let Some(sub) = subtitle {
            cy = canvas.paragraph(x + pad, cy + self.s(4), inner, sub, self.small(FAINT));
        }
        cy += self.s(12);
        for row in rows {
            let label = self.small(MUTED);
            let color = if row.value.starts_with('-') { NEGATIVE } else { INK };
            let value = TextStyle { color, ..label }.bold();
            canvas.text(x + pad + inner.saturating_sub(value.width(&row.value)), cy, &row.value, value);
            for line in self.row_lines(inner, row) {
                canvas.text(x + pad, cy, &line, label);
                cy += label.line_height();
            }
            cy += self.s(8);
        }
    }
}

impl ViewRenderer for BitmapRenderer {
    fn render(&self, view: &ReportView, scale: u32) -> Result<RgbImage, RenderError> {
        if !(1..=MAX_SCALE).contains(&scale) {
            return Err(RenderError::Scale(scale));
        }
        let mut canvas = Canvas {
            img: RgbImage::from_pixel(PAGE_WIDTH * scale, PAGE_HEIGHT * scale, WHITE),
            scale,
        };
        let layout = Layout {
            scale,
            left: MARGIN * scale,
            width: (PAGE_WIDTH - 2 * MARGIN) * scale,
        };
        let (left, width) = (layout.left, layout.width);
        let mut y = layout.s(MARGIN);
        let mut footers = Vec::new();

        let mut i = 0;
        while i < view.blocks.len() {
            match &view.blocks[i] {
                Block::Logo => {
                    if let Some(logo) = &view.logo {
                        canvas.logo(left, y, width, logo);
                        y += layout.s(LOGO_HEIGHT + 32);
                    }
                }
                Block::Title(t) => {
                    let style = TextStyle::new(6, scale, INK).bold();
                    y = canvas.paragraph(left, y, width, t, style) + layout.s(12);
                }
                Block::Lead(t) => {
                    y = canvas.paragraph(left, y, width, t, TextStyle::new(4, scale, MUTED)) + layout.s(28);
                }
                Block::Callout(t) => {
                    let pad = layout.s(16);
                    let style = TextStyle::new(3, scale, CALLOUT_INK);
                    let lines = wrap(t, style.max_chars(width - 2 * pad)).len() as u32;
                    let h = lines * style.line_height() + 2 * pad;
                    canvas.fill(left, y, width, h, CALLOUT_FILL);
                    canvas.outline(left, y, width, h, CALLOUT_BORDER);
                    canvas.paragraph(left + pad, y + pad, width - 2 * pad, t, style);
                    y += h + layout.s(32);
                }
                Block::Panel { .. } => {
                    let group: Vec<&Block> = view.blocks[i..]
                        .iter()
                        .take(2)
                        .take_while(|b| matches!(b, Block::Panel { .. }))
                        .collect();
                    let n = group.len() as u32;
                    let gap = layout.s(32);
                    let col_w = (width - gap * (n - 1)) / n;
                    let height = group
                        .iter()
                        .filter_map(|b| match b {
                            Block::Panel { heading, subtitle, rows } => {
                                Some(layout.panel_height(col_w, heading, subtitle.as_deref(), rows))
                            }
                            _ => None,
                        })
                        .max()
                        .unwrap_or(0);
                    for (k, b) in group.iter().enumerate() {
                        if let Block::Panel { heading, subtitle, rows } = b {
                            let x = left + k as u32 * (col_w + gap);
                            let fill = PANEL_FILLS[k % PANEL_FILLS.len()];
                            layout.draw_panel(
                                &mut canvas,
                                x,
                                y,
                                col_w,
                                height,
                                fill,
                                heading,
                                subtitle.as_deref(),
                                rows,
                            );
                        }
                    }
                    y += height + layout.s(32);
                    i += group.len();
                    continue;
                }
                Block::Highlight { label, value } => {
                    if !label.is_empty() {
                        y = canvas.centered(left, y, width, label, TextStyle::new(5, scale, FAINT)) + layout.s(12);
                    }
                    let color = if value.starts_with('-') { NEGATIVE } else { POSITIVE };
                    let style = TextStyle::new(10, scale, color).bold();
                    y = canvas.centered(left, y, width, value, style) + layout.s(40);
                }
                Block::Rule => {
                    canvas.fill(left, y + layout.s(8), width, scale, RULE);
                    y += layout.s(24);
                }
                Block::Text(t) => {
                    y = canvas.paragraph(left, y, width, t, layout.body()) + layout.s(12);
                }
                Block::Footer(t) => footers.push(t.as_str()),
            }
            i += 1;
        }

        if !footers.is_empty() {
            let style = TextStyle::new(3, scale, MUTED);
            let lines: u32 = footers
                .iter()
                .map(|f| wrap(f, style.max_chars(width)).len() as u32)
                .sum();
            let mut fy = (PAGE_HEIGHT * scale).saturating_sub(layout.s(32) + lines * style.line_height());
            for f in footers {
                fy = canvas.centered(left, fy, width, f, style);
            }
        }

        Ok(canvas.img)
    }
}

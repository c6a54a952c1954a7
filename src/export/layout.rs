//! Page model and the greedy, top-down layout engine.
//!
//! All coordinates are millimetres from the top-left corner of the page. The
//! engine never backtracks: content that does not fit below the cursor starts
//! a new page, and a page once left is never drawn on again.

use serde::{Deserialize, Serialize};

use super::metrics::{TextMeasurer, wrap};

pub const MARGIN: f64 = 20.0;
/// Space kept free at the bottom of every page for the footer.
pub const BOTTOM_RESERVE: f64 = 25.0;
/// Where content resumes on every page after the first.
pub const CONTINUATION_TOP: f64 = 25.0;
const HEADER_TEXT_Y: f64 = 12.0;
const HEADER_RULE_Y: f64 = 15.0;
const DEFAULT_LINE_WIDTH: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    #[default]
    A4,
    Letter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
}

impl PageGeometry {
    pub fn new(format: PageFormat, orientation: Orientation) -> Self {
        let (short, long) = match format {
            PageFormat::A4 => (210.0, 297.0),
            PageFormat::Letter => (215.9, 279.4),
        };
        match orientation {
            Orientation::Portrait => Self {
                width: short,
                height: long,
            },
            Orientation::Landscape => Self {
                width: long,
                height: short,
            },
        }
    }

    pub fn content_width(&self) -> f64 {
        self.width - 2.0 * MARGIN
    }

    /// Lowest y a content line may reach.
    pub fn max_y(&self) -> f64 {
        self.height - BOTTOM_RESERVE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

pub mod palette {
    use super::Color;

    pub const PRIMARY: Color = Color(139, 92, 246);
    pub const SECONDARY: Color = Color(6, 182, 212);
    pub const SUCCESS: Color = Color(16, 185, 129);
    pub const WARNING: Color = Color(245, 158, 11);
    pub const DANGER: Color = Color(239, 68, 68);
    pub const TEXT: Color = Color(31, 41, 55);
    pub const MUTED: Color = Color(107, 114, 128);
    pub const LIGHT: Color = Color(243, 244, 246);
    pub const WHITE: Color = Color(255, 255, 255);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontWeight {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f64,
    pub weight: FontWeight,
    pub color: Color,
}

impl TextStyle {
    pub fn regular(size: f64, color: Color) -> Self {
        Self {
            size,
            weight: FontWeight::Regular,
            color,
        }
    }

    pub fn bold(size: f64, color: Color) -> Self {
        Self {
            size,
            weight: FontWeight::Bold,
            color,
        }
    }
}

/// One drawing instruction. `y` of text is its baseline.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f64,
        y: f64,
        style: TextStyle,
        text: String,
    },
    FillRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        width: f64,
        color: Color,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    /// All text drawn on this page, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Position of the next piece of content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    /// Zero-based page index
    pub page: usize,
    pub y: f64,
}

impl Cursor {
    pub fn advanced(self, dy: f64) -> Self {
        Self {
            page: self.page,
            y: self.y + dy,
        }
    }
}

pub struct LayoutEngine<'m> {
    geometry: PageGeometry,
    measurer: &'m dyn TextMeasurer,
    running_title: String,
    pages: Vec<Page>,
    cursor: Cursor,
}

impl<'m> LayoutEngine<'m> {
    /// `running_title` appears in the header of every page after the first.
    pub fn new(
        geometry: PageGeometry,
        measurer: &'m dyn TextMeasurer,
        running_title: impl Into<String>,
    ) -> Self {
        Self {
            geometry,
            measurer,
            running_title: running_title.into(),
            pages: vec![Page::default()],
            cursor: Cursor { page: 0, y: MARGIN },
        }
    }

    pub fn geometry(&self) -> PageGeometry {
        self.geometry
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn set_y(&mut self, y: f64) {
        self.cursor.y = y;
    }

    pub fn advance(&mut self, dy: f64) {
        self.cursor = self.cursor.advanced(dy);
    }

    /// Guarantee `height` mm below the cursor, opening a new page if needed.
    pub fn ensure(&mut self, height: f64) -> Cursor {
        if self.cursor.y + height > self.geometry.max_y() {
            self.pages.push(Page::default());
            self.cursor = Cursor {
                page: self.pages.len() - 1,
                y: CONTINUATION_TOP,
            };
            self.running_header();
        }
        self.cursor
    }

    fn running_header(&mut self) {
        let number = self.cursor.page + 1;
        let style = TextStyle::regular(8.0, palette::MUTED);
        let title = format!("{} - Analysis Report", self.running_title);
        let right = self.geometry.width - MARGIN - 15.0;
        let rule_end = self.geometry.width - MARGIN;
        self.text_at(MARGIN, HEADER_TEXT_Y, title, style);
        self.text_at(right, HEADER_TEXT_Y, format!("Page {}", number), style);
        self.line(
            MARGIN,
            HEADER_RULE_Y,
            rule_end,
            HEADER_RULE_Y,
            DEFAULT_LINE_WIDTH,
            palette::LIGHT,
        );
    }

    fn current_page(&mut self) -> &mut Page {
        let idx = self.cursor.page;
        &mut self.pages[idx]
    }

    pub fn text_at(&mut self, x: f64, y: f64, text: impl Into<String>, style: TextStyle) {
        let text = text.into();
        self.current_page().ops.push(DrawOp::Text { x, y, style, text });
    }

    pub fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color) {
        self.current_page().ops.push(DrawOp::FillRect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, width: f64, color: Color) {
        self.current_page().ops.push(DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            width,
            color,
        });
    }

    pub fn wrap(&self, text: &str, style: TextStyle, max_width: f64) -> Vec<String> {
        wrap(self.measurer, text, style.size, style.weight, max_width)
    }

    /// Full-width coloured band with a white 14 pt title.
    pub fn section(&mut self, title: &str, color: Color) {
        let y = self.ensure(20.0).y;
        let width = self.geometry.content_width() + 10.0;
        self.fill_rect(MARGIN - 5.0, y - 5.0, width, 12.0, color);
        self.text_at(MARGIN, y + 2.0, title, TextStyle::bold(14.0, palette::WHITE));
        self.advance(15.0);
    }

    pub fn subsection(&mut self, title: &str, color: Color) {
        let y = self.ensure(12.0).y;
        self.text_at(MARGIN + 2.0, y, title, TextStyle::bold(11.0, color));
        self.advance(8.0);
    }

    /// Wrapped body text; each line may start a new page on its own.
    pub fn paragraph(&mut self, text: &str, size: f64, indent: f64) {
        let style = TextStyle::regular(size, palette::TEXT);
        let line_height = size * 0.4;
        let width = self.geometry.content_width() - indent;
        for line in self.wrap(text, style, width) {
            let y = self.ensure(line_height).y;
            self.text_at(MARGIN + indent, y, line, style);
            self.advance(line_height);
        }
    }

    /// Coloured bullet glyph followed by wrapped 10 pt text.
    pub fn bullet(&mut self, text: &str, color: Color, indent: f64) {
        let style = TextStyle::regular(10.0, palette::TEXT);
        let y = self.ensure(6.0).y;
        self.text_at(MARGIN + indent, y, "\u{2022}", TextStyle::regular(10.0, color));

        let width = self.geometry.content_width() - indent - 8.0;
        let lines = self.wrap(text, style, width);
        let last = lines.len().saturating_sub(1);
        for (i, line) in lines.into_iter().enumerate() {
            if i > 0 {
                self.ensure(4.0);
            }
            let y = self.cursor.y;
            self.text_at(MARGIN + indent + 6.0, y, line, style);
            if i < last {
                self.advance(4.0);
            }
        }
        self.advance(6.0);
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn into_pages(self) -> Vec<Page> {
        self.pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::metrics::tests::FixedWidth;

    fn engine(measurer: &FixedWidth) -> LayoutEngine<'_> {
        LayoutEngine::new(
            PageGeometry::new(PageFormat::A4, Orientation::Portrait),
            measurer,
            "Idea",
        )
    }

    #[test]
    fn geometry_per_format_and_orientation() {
        let a4 = PageGeometry::new(PageFormat::A4, Orientation::Portrait);
        assert_eq!((a4.width, a4.height), (210.0, 297.0));
        assert_eq!(a4.content_width(), 170.0);
        assert_eq!(a4.max_y(), 272.0);
        let letter = PageGeometry::new(PageFormat::Letter, Orientation::Landscape);
        assert_eq!((letter.width, letter.height), (279.4, 215.9));
    }

    #[test]
    fn ensure_keeps_page_when_content_fits() {
        let m = FixedWidth;
        let mut layout = engine(&m);
        layout.set_y(250.0);
        let cursor = layout.ensure(22.0);
        assert_eq!(cursor, Cursor { page: 0, y: 250.0 });
    }

    #[test]
    fn ensure_breaks_page_and_draws_running_header() {
        let m = FixedWidth;
        let mut layout = engine(&m);
        layout.set_y(260.0);
        let cursor = layout.ensure(20.0);
        assert_eq!(cursor, Cursor { page: 1, y: 25.0 });

        let pages = layout.into_pages();
        assert_eq!(pages.len(), 2);
        assert!(pages[0].ops.is_empty());
        let texts: Vec<&str> = pages[1].texts().collect();
        assert_eq!(texts, vec!["Idea - Analysis Report", "Page 2"]);
        assert!(matches!(
            pages[1].ops[2],
            DrawOp::Line { y1, y2, .. } if y1 == 15.0 && y2 == 15.0
        ));
    }

    #[test]
    fn section_band_geometry() {
        let m = FixedWidth;
        let mut layout = engine(&m);
        layout.set_y(100.0);
        layout.section("Summary", palette::PRIMARY);
        assert_eq!(layout.cursor().y, 115.0);
        let pages = layout.into_pages();
        assert_eq!(
            pages[0].ops[0],
            DrawOp::FillRect {
                x: 15.0,
                y: 95.0,
                width: 180.0,
                height: 12.0,
                color: palette::PRIMARY,
            }
        );
    }

    #[test]
    fn paragraph_lines_can_split_across_pages() {
        let m = FixedWidth;
        let mut layout = engine(&m);
        layout.set_y(268.0);
        // 170 mm per line with one-mm glyphs: 300 chars wrap to two lines.
        let text = vec!["abcdefghi"; 30].join(" ");
        layout.paragraph(&text, 10.0, 0.0);
        assert_eq!(layout.page_count(), 2);
        assert_eq!(layout.cursor(), Cursor { page: 1, y: 29.0 });
    }

    #[test]
    fn bullet_continuation_lines_advance_four() {
        let m = FixedWidth;
        let mut layout = engine(&m);
        layout.set_y(50.0);
        // 157 mm available per bullet line at indent 5.
        let text = "x".repeat(200);
        layout.bullet(&text, palette::SUCCESS, 5.0);
        assert_eq!(layout.cursor().y, 60.0);
        let pages = layout.into_pages();
        let texts: Vec<&str> = pages[0].texts().collect();
        assert_eq!(texts.len(), 3);
        assert_eq!(texts[0], "\u{2022}");
    }
}

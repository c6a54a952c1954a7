//! Text measurement and greedy word wrapping for the PDF layout.

use super::layout::FontWeight;

const PT_TO_MM: f64 = 25.4 / 72.0;

/// Measures rendered text width in millimetres.
pub trait TextMeasurer: Send + Sync {
    fn width_mm(&self, text: &str, size_pt: f64, weight: FontWeight) -> f64;
}

/// Widths from the standard Helvetica and Helvetica-Bold font metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct HelveticaMetrics;

impl TextMeasurer for HelveticaMetrics {
    fn width_mm(&self, text: &str, size_pt: f64, weight: FontWeight) -> f64 {
        let units: u32 = text.chars().map(|c| glyph_width(c, weight)).sum();
        units as f64 / 1000.0 * size_pt * PT_TO_MM
    }
}

// Advance widths per 1000 em for 0x20..=0x7E.
const REGULAR: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

const BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // '0'..'?'
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 'P'..'_'
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // '`'..'o'
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 'p'..'~'
];

fn glyph_width(c: char, weight: FontWeight) -> u32 {
    let table = match weight {
        FontWeight::Regular => &REGULAR,
        FontWeight::Bold => &BOLD,
    };
    let code = c as u32;
    if (0x20..=0x7E).contains(&code) {
        return table[(code - 0x20) as usize] as u32;
    }
    match (c, weight) {
        ('\u{2022}', _) => 350,
        ('\u{2014}', _) => 1000,
        ('\u{2013}', _) => 556,
        ('\u{2018}' | '\u{2019}', FontWeight::Regular) => 222,
        ('\u{2018}' | '\u{2019}', FontWeight::Bold) => 278,
        ('\u{201C}' | '\u{201D}', FontWeight::Regular) => 333,
        ('\u{201C}' | '\u{201D}', FontWeight::Bold) => 500,
        _ => 556,
    }
}

/// Greedy word wrap to `max_width` millimetres.
///
/// Explicit newlines start a new line. A single word wider than the line is
/// broken between characters.
pub fn wrap(
    measurer: &dyn TextMeasurer,
    text: &str,
    size_pt: f64,
    weight: FontWeight,
    max_width: f64,
) -> Vec<String> {
    let fits = |s: &str| measurer.width_mm(s, size_pt, weight) <= max_width;
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };
            if fits(&candidate) {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if fits(word) {
                current = word.to_string();
            } else {
                for ch in word.chars() {
                    current.push(ch);
                    if !fits(&current) && current.chars().count() > 1 {
                        current.pop();
                        lines.push(std::mem::take(&mut current));
                        current.push(ch);
                    }
                }
            }
        }
        lines.push(current);
    }

    // A trailing empty paragraph adds nothing visible.
    while lines.len() > 1 && lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Every character is 1 mm wide regardless of size or weight.
    pub(crate) struct FixedWidth;

    impl TextMeasurer for FixedWidth {
        fn width_mm(&self, text: &str, _size_pt: f64, _weight: FontWeight) -> f64 {
            text.chars().count() as f64
        }
    }

    #[test]
    fn helvetica_widths_scale_with_size() {
        let m = HelveticaMetrics;
        // "0" is 556 units: 0.556 * 10pt = 5.56pt
        let w = m.width_mm("0", 10.0, FontWeight::Regular);
        assert!((w - 5.56 * PT_TO_MM).abs() < 1e-9);
        assert!(m.width_mm("Hello", 10.0, FontWeight::Bold) > m.width_mm("Hello", 10.0, FontWeight::Regular));
    }

    #[test]
    fn wraps_on_word_boundaries() {
        let lines = wrap(&FixedWidth, "aaa bbb ccc dddd", 10.0, FontWeight::Regular, 7.0);
        assert_eq!(lines, vec!["aaa bbb", "ccc", "dddd"]);
    }

    #[test]
    fn breaks_overlong_words() {
        let lines = wrap(&FixedWidth, "abcdefghij", 10.0, FontWeight::Regular, 4.0);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn keeps_explicit_newlines() {
        let lines = wrap(&FixedWidth, "one\ntwo three\n", 10.0, FontWeight::Regular, 20.0);
        assert_eq!(lines, vec!["one", "two three"]);
    }

    #[test]
    fn empty_text_is_one_empty_line() {
        assert_eq!(wrap(&FixedWidth, "", 10.0, FontWeight::Regular, 20.0), vec![""]);
    }
}

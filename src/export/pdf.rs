//! Minimal PDF 1.4 writer for laid-out pages.
//!
//! Uses the base-14 Helvetica faces with WinAnsiEncoding, so no font data is
//! embedded. Object numbering and stream contents depend only on the pages
//! and the creation timestamp.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use super::layout::{Color, DrawOp, FontWeight, Page, PageGeometry};

const MM_TO_PT: f64 = 72.0 / 25.4;

const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;
const REGULAR_FONT_ID: usize = 3;
const BOLD_FONT_ID: usize = 4;
const INFO_ID: usize = 5;
const FIRST_PAGE_ID: usize = 6;

pub fn write_pdf(
    pages: &[Page],
    geometry: PageGeometry,
    title: &str,
    created_at: DateTime<Utc>,
) -> Vec<u8> {
    let width_pt = geometry.width * MM_TO_PT;
    let height_pt = geometry.height * MM_TO_PT;

    let mut objects: Vec<Vec<u8>> = Vec::with_capacity(FIRST_PAGE_ID - 1 + pages.len() * 2);

    let kids: Vec<String> = (0..pages.len())
        .map(|i| format!("{} 0 R", page_id(i)))
        .collect();
    objects.push(format!("<< /Type /Catalog /Pages {} 0 R >>", PAGES_ID).into_bytes());
    objects.push(
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            pages.len()
        )
        .into_bytes(),
    );
    objects.push(font_dict("Helvetica"));
    objects.push(font_dict("Helvetica-Bold"));

    let mut info = b"<< /Title ".to_vec();
    info.extend(pdf_string(title));
    info.extend(b" /Producer (IdeaLyzer) /CreationDate ");
    info.extend(pdf_string(&created_at.format("D:%Y%m%d%H%M%SZ").to_string()));
    info.extend(b" >>");
    objects.push(info);

    for (i, page) in pages.iter().enumerate() {
        let content = content_stream(page, height_pt);
        objects.push(
            format!(
                "<< /Type /Page /Parent {} 0 R /MediaBox [0 0 {} {}] \
                 /Resources << /Font << /F1 {} 0 R /F2 {} 0 R >> >> /Contents {} 0 R >>",
                PAGES_ID,
                num(width_pt),
                num(height_pt),
                REGULAR_FONT_ID,
                BOLD_FONT_ID,
                page_id(i) + 1
            )
            .into_bytes(),
        );
        let mut stream = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
        stream.extend(&content);
        stream.extend(b"\nendstream");
        objects.push(stream);
    }

    let mut out = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend(format!("{} 0 obj\n", i + 1).into_bytes());
        out.extend(body);
        out.extend(b"\nendobj\n");
    }

    let xref_at = out.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        let _ = writeln!(xref, "{:010} 00000 n ", offset);
    }
    let _ = write!(
        xref,
        "trailer\n<< /Size {} /Root {} 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        CATALOG_ID,
        INFO_ID,
        xref_at
    );
    out.extend(xref.into_bytes());
    out
}

fn page_id(index: usize) -> usize {
    FIRST_PAGE_ID + index * 2
}

fn font_dict(base: &str) -> Vec<u8> {
    format!(
        "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
        base
    )
    .into_bytes()
}

fn content_stream(page: &Page, height_pt: f64) -> Vec<u8> {
    let mut out = Vec::new();
    for op in &page.ops {
        match op {
            DrawOp::Text { x, y, style, text } => {
                let font = match style.weight {
                    FontWeight::Regular => "F1",
                    FontWeight::Bold => "F2",
                };
                out.extend(
                    format!(
                        "BT {} rg /{} {} Tf {} {} Td ",
                        rgb(style.color),
                        font,
                        num(style.size),
                        num(x * MM_TO_PT),
                        num(height_pt - y * MM_TO_PT)
                    )
                    .into_bytes(),
                );
                out.extend(pdf_string(text));
                out.extend(b" Tj ET\n");
            }
            DrawOp::FillRect {
                x,
                y,
                width,
                height,
                color,
            } => {
                out.extend(
                    format!(
                        "{} rg {} {} {} {} re f\n",
                        rgb(*color),
                        num(x * MM_TO_PT),
                        num(height_pt - (y + height) * MM_TO_PT),
                        num(width * MM_TO_PT),
                        num(height * MM_TO_PT)
                    )
                    .into_bytes(),
                );
            }
            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                width,
                color,
            } => {
                out.extend(
                    format!(
                        "{} RG {} w {} {} m {} {} l S\n",
                        rgb(*color),
                        num(width * MM_TO_PT),
                        num(x1 * MM_TO_PT),
                        num(height_pt - y1 * MM_TO_PT),
                        num(x2 * MM_TO_PT),
                        num(height_pt - y2 * MM_TO_PT)
                    )
                    .into_bytes(),
                );
            }
        }
    }
    out
}

fn rgb(color: Color) -> String {
    let c = |v: u8| num(v as f64 / 255.0);
    format!("{} {} {}", c(color.0), c(color.1), c(color.2))
}

/// Fixed-precision number without trailing zeros.
fn num(value: f64) -> String {
    let s = format!("{:.3}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

/// Literal string in WinAnsiEncoding with `\`, `(` and `)` escaped.
fn pdf_string(text: &str) -> Vec<u8> {
    let mut out = vec![b'('];
    for ch in text.chars() {
        let byte = win_ansi(ch);
        match byte {
            b'\\' | b'(' | b')' => {
                out.push(b'\\');
                out.push(byte);
            }
            0x20..=0x7E => out.push(byte),
            _ => out.extend(format!("\\{:03o}", byte).into_bytes()),
        }
    }
    out.push(b')');
    out
}

fn win_ansi(ch: char) -> u8 {
    match ch {
        '\u{2022}' => 0x95,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{20AC}' => 0x80,
        '\t' => b' ',
        c if (c as u32) < 0x20 => b'?',
        c if (c as u32) <= 0x7E => c as u8,
        c if (0xA0..=0xFF).contains(&(c as u32)) => c as u8,
        _ => b'?',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::layout::{Orientation, PageFormat, TextStyle, palette};
    use chrono::TimeZone;

    fn page_with(text: &str) -> Page {
        Page {
            ops: vec![DrawOp::Text {
                x: 20.0,
                y: 100.0,
                style: TextStyle::bold(10.0, palette::TEXT),
                text: text.to_string(),
            }],
        }
    }

    fn a4() -> PageGeometry {
        PageGeometry::new(PageFormat::A4, Orientation::Portrait)
    }

    #[test]
    fn escapes_delimiters_and_maps_win_ansi() {
        assert_eq!(pdf_string("a(b)\\"), b"(a\\(b\\)\\\\)".to_vec());
        assert_eq!(pdf_string("\u{2022} caf\u{e9}"), b"(\\225 caf\\351)".to_vec());
        assert_eq!(pdf_string("\u{4e2d}"), b"(?)".to_vec());
    }

    #[test]
    fn numbers_are_compact() {
        assert_eq!(num(56.6929), "56.693");
        assert_eq!(num(10.0), "10");
        assert_eq!(num(-0.0001), "0");
    }

    #[test]
    fn document_structure_is_well_formed() {
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let bytes = write_pdf(&[page_with("Hi"), page_with("There")], a4(), "T", at);
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.starts_with("%PDF-1.4\n"));
        assert!(text.ends_with("%%EOF\n"));
        assert!(text.contains("/Count 2"));
        assert!(text.contains("/Kids [6 0 R 8 0 R]"));
        assert!(text.contains("/CreationDate (D:20260102030405Z)"));
        assert!(text.contains("/MediaBox [0 0 595.276 841.89]"));
        assert!(text.contains("/F2 10 Tf 56.693 558.425 Td (Hi) Tj"));
        assert!(text.contains("/Size 10"));
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let bytes = write_pdf(&[page_with("Hi")], a4(), "T", at);
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let xref = text.find("xref\n").unwrap();
        let entries: Vec<usize> = text[xref..]
            .lines()
            .skip(3)
            .take(7)
            .map(|l| l[..10].parse().unwrap())
            .collect();
        for (i, offset) in entries.iter().enumerate() {
            let marker = format!("{} 0 obj", i + 1);
            assert!(bytes[*offset..].starts_with(marker.as_bytes()));
        }
    }
}

//! Page layout
//!
//! A minimal top-down text writer over `lopdf`. Callers position text in millimetres from the
//! top-left corner of an A4 page; the writer converts to PDF points and keeps one content
//! stream per page.

use lopdf::{
    Dictionary, Document, Object, ObjectId, Stream, StringFormat,
    content::{Content, Operation},
    dictionary,
};

use super::DocumentError;

const PAGE_WIDTH_PT: f32 = 595.0;
const PAGE_HEIGHT_PT: f32 = 842.0;
const PT_PER_MM: f32 = 72.0 / 25.4;
const FONT_NAME: &str = "F1";

/// Vertical position the cursor returns to on a fresh page, in millimetres.
pub(super) const PAGE_TOP_MM: f32 = 20.0;

/// Line advance for wrapped blocks, in millimetres.
const WRAPPED_LEADING_MM: f32 = 4.5;

#[derive(Debug, Default)]
pub(super) struct PageWriter {
    pages: Vec<Vec<Operation>>,
    current: Vec<Operation>,
}

impl PageWriter {
    pub(super) fn new() -> Self {
        Self::default()
    }

    /// Starts a new page. Everything written afterwards lands on it.
    pub(super) fn add_page(&mut self) {
        let finished = std::mem::take(&mut self.current);
        self.pages.push(finished);
    }

    /// Writes `text` with its baseline `y` millimetres from the top and its left edge at `x`.
    pub(super) fn text(&mut self, x: f32, y: f32, size: f32, text: &str) {
        self.current.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![FONT_NAME.into(), Object::Real(size)]),
            Operation::new(
                "Td",
                vec![
                    Object::Real(x * PT_PER_MM),
                    Object::Real(PAGE_HEIGHT_PT - y * PT_PER_MM),
                ],
            ),
            Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
    }

    /// Writes `text` so that it ends at `right` millimetres.
    pub(super) fn text_right(&mut self, right: f32, y: f32, size: f32, text: &str) {
        let x = right - text_width_mm(text, size);

        self.text(x, y, size, text);
    }

    /// Writes each line below the previous one, [`WRAPPED_LEADING_MM`] apart.
    pub(super) fn lines(&mut self, x: f32, y: f32, size: f32, lines: &[String]) {
        let mut baseline = y;

        for line in lines {
            self.text(x, baseline, size, line);
            baseline += WRAPPED_LEADING_MM;
        }
    }

    /// Assembles every page into a PDF file.
    pub(super) fn finish(mut self) -> Result<Vec<u8>, DocumentError> {
        self.add_page();

        let mut document = Document::with_version("1.5");

        let pages_id = document.new_object_id();

        let font_id = document.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });

        let resources_id = document.add_object(dictionary! {
            "Font" => dictionary! {
                FONT_NAME => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(self.pages.len());

        for operations in self.pages {
            let content = Content { operations }.encode()?;
            let content_id = document.add_object(Stream::new(Dictionary::new(), content));

            let page_id = document.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });

            kids.push(page_id.into());
        }

        let count = i64::try_from(kids.len()).unwrap_or(i64::MAX);

        document.objects.insert(
            pages_id,
            Object::Dictionary(pages_dictionary(kids, count, resources_id)),
        );

        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });

        document.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        document.save_to(&mut bytes)?;

        Ok(bytes)
    }
}

fn pages_dictionary(kids: Vec<Object>, count: i64, resources_id: ObjectId) -> Dictionary {
    dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(PAGE_WIDTH_PT),
            Object::Real(PAGE_HEIGHT_PT),
        ],
    }
}

/// Greedily breaks `text` into lines no wider than `width` millimetres at `size` points.
///
/// Words wider than the limit are kept whole on their own line.
pub(super) fn wrap(text: &str, width: f32, size: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
            continue;
        }

        let candidate = format!("{line} {word}");

        if text_width_mm(&candidate, size) > width {
            lines.push(std::mem::replace(&mut line, word.to_string()));
        } else {
            line = candidate;
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }

    lines
}

/// Vertical space taken by a wrapped block written with [`PageWriter::lines`].
pub(super) fn block_height(lines: &[String]) -> f32 {
    lines.iter().map(|_| WRAPPED_LEADING_MM).sum()
}

fn text_width_mm(text: &str, size: f32) -> f32 {
    let units: f32 = text.chars().map(|c| f32::from(glyph_width(c))).sum();

    units / 1000.0 * size / PT_PER_MM
}

/// Helvetica advance widths in thousandths of the font size.
///
/// Digits and most lowercase letters share the 556 default.
fn glyph_width(c: char) -> u16 {
    match c {
        ' ' | '!' | ',' | '.' | '/' | ':' | ';' | 'I' | '[' | '\\' | ']' | 'f' | 't' => 278,
        '"' => 355,
        '%' => 889,
        '&' | 'A' | 'B' | 'E' | 'K' | 'P' | 'S' | 'V' | 'X' | 'Y' => 667,
        '\'' => 191,
        '(' | ')' | '-' | '`' | 'r' => 333,
        '*' => 389,
        '+' | '<' | '=' | '>' | '~' => 584,
        '@' => 1015,
        'C' | 'D' | 'H' | 'N' | 'R' | 'U' | 'w' => 722,
        'F' | 'T' | 'Z' => 611,
        'G' | 'O' | 'Q' => 778,
        'M' | 'm' => 833,
        'W' => 944,
        '^' => 469,
        'J' | 'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' => 500,
        'i' | 'j' | 'l' => 222,
        '{' | '}' => 334,
        '|' => 260,
        '•' => 350,
        _ => 556,
    }
}

/// Encodes text for a simple font using WinAnsiEncoding. Unmappable characters become `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '€' => 0x80,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            _ => match u8::try_from(u32::from(c)) {
                Ok(byte) if byte >= 0xA0 || (byte.is_ascii() && !byte.is_ascii_control()) => byte,
                _ => b'?',
            },
        })
        .collect()
}

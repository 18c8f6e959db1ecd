//! Single-page service-order PDF.
//!
//! Layout follows a fixed A4 form: centered title, date, client block,
//! service block and the equipment line. Text uses the base-14 Helvetica
//! font with WinAnsi encoding, so no font file is embedded.

use crate::client::Client;
use crate::error::{OficinaError, Result};
use crate::service::{format_currency, Service};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 28.0;
const BOTTOM_MARGIN: f32 = 57.0;
const LINE_HEIGHT: f32 = 28.0;
const FONT_SIZE: i64 = 12;

/// Everything printed on one order.
#[derive(Debug, Clone)]
pub struct OrderDocument<'a> {
    pub title: &'a str,
    pub shop_name: Option<&'a str>,
    pub date: &'a str,
    pub client: &'a Client,
    pub service: &'a Service,
    pub equipment: &'a str,
    pub currency_symbol: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, PartialEq)]
enum Block {
    Line(String, Align),
    /// Wrapped to the page width; explicit newlines start a new line.
    Paragraph(String),
    Gap(f32),
}

impl OrderDocument<'_> {
    fn blocks(&self) -> Vec<Block> {
        use Block::*;

        let mut blocks = vec![Line(self.title.to_string(), Align::Center)];
        if let Some(shop) = self.shop_name {
            blocks.push(Line(shop.to_string(), Align::Center));
        }
        blocks.extend([
            Gap(LINE_HEIGHT),
            Line(format!("Data: {}", self.date), Align::Left),
            Gap(LINE_HEIGHT / 2.0),
            Line("Cliente:".to_string(), Align::Left),
            Line(format!("Nome: {}", self.client.name), Align::Left),
            Line(format!("Telefone: {}", self.client.phone), Align::Left),
            Paragraph(format!("Endereço: {}", self.client.address)),
            Gap(LINE_HEIGHT / 2.0),
            Line("Serviço:".to_string(), Align::Left),
            Line(
                format!("Descrição: {}", self.service.description),
                Align::Left,
            ),
            Line(
                format!(
                    "Valor: {}",
                    format_currency(self.currency_symbol, self.service.price)
                ),
                Align::Left,
            ),
            Gap(LINE_HEIGHT / 2.0),
            Line(format!("Aparelho: {}", self.equipment), Align::Left),
        ]);
        blocks
    }

    /// Lay out text lines as `(x, baseline_from_top, text)`.
    fn layout(&self) -> Vec<(f32, f32, String)> {
        let usable = PAGE_WIDTH - 2.0 * MARGIN;
        let mut placed = Vec::new();
        let mut y = MARGIN;

        let mut lines: Vec<(String, Align)> = Vec::new();
        for block in self.blocks() {
            match block {
                Block::Gap(h) => {
                    flush(&mut lines, &mut y, &mut placed);
                    y += h;
                }
                Block::Line(text, align) => lines.push((text, align)),
                Block::Paragraph(text) => {
                    for line in wrap(&text, usable) {
                        lines.push((line, Align::Left));
                    }
                }
            }
        }
        flush(&mut lines, &mut y, &mut placed);
        placed
    }

    pub fn render(&self) -> Result<Vec<u8>> {
        let mut operations = Vec::new();
        for (x, baseline, text) in self.layout() {
            operations.extend([
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
                Operation::new(
                    "Td",
                    vec![
                        (x.round() as i64).into(),
                        ((PAGE_HEIGHT - baseline).round() as i64).into(),
                    ],
                ),
                Operation::new("Tj", vec![Object::string_literal(win_ansi(&text))]),
                Operation::new("ET", vec![]),
            ]);
        }

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });
        let content = Content { operations }
            .encode()
            .map_err(|e| OficinaError::Document(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                (PAGE_WIDTH as i64).into(),
                (PAGE_HEIGHT as i64).into(),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(win_ansi(self.title)),
            "Producer" => Object::string_literal("oficina"),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf)
            .map_err(|e| OficinaError::Document(e.to_string()))?;
        Ok(buf)
    }
}

/// Place pending lines from the cursor down, dropping whatever would cross
/// the bottom margin so the order stays on one page.
fn flush(lines: &mut Vec<(String, Align)>, y: &mut f32, placed: &mut Vec<(f32, f32, String)>) {
    for (text, align) in lines.drain(..) {
        if *y + LINE_HEIGHT > PAGE_HEIGHT - BOTTOM_MARGIN {
            continue;
        }
        let x = match align {
            Align::Left => MARGIN,
            Align::Center => ((PAGE_WIDTH - text_width(&text)) / 2.0).max(MARGIN),
        };
        let baseline = *y + LINE_HEIGHT / 2.0 + FONT_SIZE as f32 * 0.3;
        placed.push((x, baseline, text));
        *y += LINE_HEIGHT;
    }
}

/// Greedy word wrap against Helvetica metrics. Words wider than the line
/// are split by character.
fn wrap(text: &str, max_width: f32) -> Vec<String> {
    let mut out = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if text_width(&candidate) <= max_width {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            for ch in word.chars() {
                current.push(ch);
                if text_width(&current) > max_width {
                    current.pop();
                    out.push(std::mem::take(&mut current));
                    current.push(ch);
                }
            }
        }
        out.push(current);
    }
    if out.is_empty() {
        out.push(String::new());
    }
    out
}

// ---------------------------------------------------------------------------
// Helvetica / WinAnsi
// ---------------------------------------------------------------------------

/// Advance widths (1/1000 em) for codes 32..=126.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

fn text_width(text: &str) -> f32 {
    let units: u32 = win_ansi(text)
        .into_iter()
        .map(|b| match b {
            32..=126 => u32::from(HELVETICA_WIDTHS[usize::from(b - 32)]),
            _ => 556,
        })
        .sum();
    units as f32 * FONT_SIZE as f32 / 1000.0
}

/// Encode for a WinAnsi font. Latin-1 maps directly; characters with no
/// WinAnsi code become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7e}' | '\u{a0}'..='\u{ff}' => c as u8,
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            _ => b'?',
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

// Copyright 2023 Remi Bernotavicius

//! Renders a shopping list as an A4 PDF document.
//!
//! The document is first laid out into pages of positioned text lines and table rows, then each
//! page is drawn with the standard Helvetica fonts. Rows that don't fit on a page continue on the
//! next one.

use crate::shopping::ShoppingListItem;
use pdf_writer::{Content, Finish as _, Name, Pdf, Rect, Ref, Str};
use std::mem;

pub const TITLE: &str = "Liste de Courses";
pub const HEADER: [&str; 2] = super::csv::HEADER;

const PAGE_WIDTH: f32 = 595.276;
const PAGE_HEIGHT: f32 = 841.89;
const MARGIN: f32 = 72.0;

const TITLE_SIZE: f32 = 24.0;
const TITLE_SPACE_AFTER: f32 = 20.0;
const SUBTITLE_SIZE: f32 = 10.0;
const SPACE_BEFORE_TABLE: f32 = 20.0;

const COLUMN_WIDTHS: [f32; 2] = [300.0, 150.0];
const CELL_PADDING: f32 = 6.0;
const LEADING: f32 = 1.2;
/// Rough width of a Helvetica glyph relative to the font size, used to wrap cell text.
const AVERAGE_GLYPH_WIDTH: f32 = 0.55;
const GRID_WIDTH: f32 = 1.0;

#[derive(Debug, Copy, Clone, PartialEq)]
struct Rgb(f32, f32, f32);

const GREEN: Rgb = Rgb(0.310, 0.467, 0.176);
const WHITE_SMOKE: Rgb = Rgb(0.961, 0.961, 0.961);
const WHITE: Rgb = Rgb(1.0, 1.0, 1.0);
const GREY: Rgb = Rgb(0.502, 0.502, 0.502);
const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource_name(&self) -> Name<'static> {
        match self {
            Self::Regular => Name(b"F1"),
            Self::Bold => Name(b"F2"),
        }
    }

    fn base_font(&self) -> Name<'static> {
        match self {
            Self::Regular => Name(b"Helvetica"),
            Self::Bold => Name(b"Helvetica-Bold"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub font: Font,
    size: f32,
    color: Rgb,
    x: f32,
    baseline: f32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RowKind {
    Header,
    Body { striped: bool },
}

struct RowStyle {
    font: Font,
    size: f32,
    padding_top: f32,
    padding_bottom: f32,
    background: Rgb,
    text_color: Rgb,
}

impl RowKind {
    fn style(&self) -> RowStyle {
        match self {
            Self::Header => RowStyle {
                font: Font::Bold,
                size: 14.0,
                padding_top: 3.0,
                padding_bottom: 12.0,
                background: GREEN,
                text_color: WHITE_SMOKE,
            },
            Self::Body { striped } => RowStyle {
                font: Font::Regular,
                size: 10.0,
                padding_top: 3.0,
                padding_bottom: 3.0,
                background: if *striped { WHITE } else { WHITE_SMOKE },
                text_color: BLACK,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub kind: RowKind,
    lines: [Vec<String>; 2],
    top: f32,
    height: f32,
}

impl TableRow {
    fn new(kind: RowKind, cells: [String; 2]) -> Self {
        let size = kind.style().size;
        let lines = [0, 1].map(|column| {
            let usable = COLUMN_WIDTHS[column] - 2.0 * CELL_PADDING;
            let max_chars = (usable / (size * AVERAGE_GLYPH_WIDTH)) as usize;
            wrap(&cells[column], max_chars)
        });
        Self::from_lines(kind, lines)
    }

    fn from_lines(kind: RowKind, lines: [Vec<String>; 2]) -> Self {
        let style = kind.style();
        let line_count = lines.iter().map(Vec::len).max().unwrap_or(0).max(1);
        let height =
            style.padding_top + line_count as f32 * style.size * LEADING + style.padding_bottom;
        Self {
            kind,
            lines,
            top: 0.0,
            height,
        }
    }

    fn bottom(&self) -> f32 {
        self.top - self.height
    }

    /// How many lines of text fit in a row no taller than `space`.
    fn lines_fitting(&self, space: f32) -> usize {
        let style = self.kind.style();
        let text_space = space - style.padding_top - style.padding_bottom;
        (text_space / (style.size * LEADING)).floor().max(0.0) as usize
    }

    /// Keeps the first `line_count` lines of each cell and returns the rest as a continuation row.
    fn split_off(&mut self, line_count: usize) -> Self {
        let rest = [0, 1].map(|column| {
            let lines = &mut self.lines[column];
            lines.split_off(line_count.min(lines.len()))
        });
        *self = Self::from_lines(self.kind, mem::take(&mut self.lines));
        Self::from_lines(self.kind, rest)
    }

    #[cfg(test)]
    fn cell_text(&self, column: usize) -> String {
        self.lines[column].join(" ")
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub lines: Vec<TextLine>,
    pub rows: Vec<TableRow>,
}

impl Page {
    fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.rows.is_empty()
    }
}

/// Greedy word wrap on whitespace. Words longer than a line are split.
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = vec![];
    let mut line = String::new();
    let mut line_len = 0;
    for word in text.split_whitespace() {
        let chars: Vec<char> = word.chars().collect();
        for piece in chars.chunks(max_chars) {
            if line_len > 0 && line_len + 1 + piece.len() > max_chars {
                lines.push(mem::take(&mut line));
                line_len = 0;
            }
            if line_len > 0 {
                line.push(' ');
                line_len += 1;
            }
            line.extend(piece);
            line_len += piece.len();
        }
    }
    if line_len > 0 || lines.is_empty() {
        lines.push(line);
    }
    lines
}

/// Positions the title, the subtitle naming the week and the table on as many pages as needed.
/// A row too tall for any page continues over as many pages as it takes.
pub fn layout(items: &[ShoppingListItem], start_label: &str, end_label: &str) -> Vec<Page> {
    let top = PAGE_HEIGHT - MARGIN;
    let mut pages = vec![];
    let mut page = Page::default();
    let mut cursor = top;

    cursor -= TITLE_SIZE;
    page.lines.push(TextLine {
        text: TITLE.into(),
        font: Font::Bold,
        size: TITLE_SIZE,
        color: GREEN,
        x: MARGIN,
        baseline: cursor,
    });
    cursor -= TITLE_SPACE_AFTER + SUBTITLE_SIZE;
    page.lines.push(TextLine {
        text: format!("Semaine du {start_label} au {end_label}"),
        font: Font::Regular,
        size: SUBTITLE_SIZE,
        color: BLACK,
        x: MARGIN,
        baseline: cursor,
    });
    cursor -= SUBTITLE_SIZE * (LEADING - 1.0) + SPACE_BEFORE_TABLE;

    let header = TableRow::new(RowKind::Header, HEADER.map(String::from));
    let body = items.iter().enumerate().map(|(i, item)| {
        TableRow::new(
            RowKind::Body {
                striped: i % 2 == 1,
            },
            [item.name.clone(), item.quantities.clone()],
        )
    });
    for mut row in std::iter::once(header).chain(body) {
        loop {
            let space = cursor - MARGIN;
            if row.height <= space {
                row.top = cursor;
                cursor -= row.height;
                page.rows.push(row);
                break;
            }

            // A row taller than a whole page is split, filling the rest of this page first.
            if row.height > top - MARGIN {
                let fitting = row.lines_fitting(space);
                if fitting > 0 {
                    let rest = row.split_off(fitting);
                    row.top = cursor;
                    page.rows.push(row);
                    row = rest;
                }
            }
            pages.push(mem::take(&mut page));
            cursor = top;
        }
    }
    pages.push(page);
    pages
}

/// Encodes text for the standard fonts' WinAnsi encoding. Anything it can't represent becomes
/// `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' | '\u{a0}'..='\u{ff}' => c as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            'Œ' => 0x8c,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            'œ' => 0x9c,
            'Ÿ' => 0x9f,
            _ => b'?',
        })
        .collect()
}

fn draw_text(content: &mut Content, line: &TextLine) {
    let Rgb(r, g, b) = line.color;
    content.set_fill_rgb(r, g, b);
    content.begin_text();
    content.set_font(line.font.resource_name(), line.size);
    content.next_line(line.x, line.baseline);
    content.show(Str(&win_ansi(&line.text)));
    content.end_text();
}

fn draw_row(content: &mut Content, row: &TableRow) {
    let style = row.kind.style();
    let table_width: f32 = COLUMN_WIDTHS.iter().sum();

    let Rgb(r, g, b) = style.background;
    content.set_fill_rgb(r, g, b);
    content.rect(MARGIN, row.bottom(), table_width, row.height);
    content.fill_nonzero();

    let Rgb(r, g, b) = GREY;
    content.set_stroke_rgb(r, g, b);
    content.set_line_width(GRID_WIDTH);
    let mut x = MARGIN;
    for (width, lines) in COLUMN_WIDTHS.iter().zip(&row.lines) {
        content.rect(x, row.bottom(), *width, row.height);
        content.stroke();

        let mut baseline = row.top - style.padding_top - style.size;
        for text in lines {
            let line = TextLine {
                text: text.clone(),
                font: style.font,
                size: style.size,
                color: style.text_color,
                x: x + CELL_PADDING,
                baseline,
            };
            draw_text(content, &line);
            baseline -= style.size * LEADING;
        }
        x += width;
    }
}

fn draw_page(page: &Page) -> Content {
    let mut content = Content::new();
    for row in &page.rows {
        draw_row(&mut content, row);
    }
    for line in &page.lines {
        draw_text(&mut content, line);
    }
    content
}

pub fn render(pages: &[Page]) -> Vec<u8> {
    let mut next_ref = Ref::new(1);
    let catalog_id = next_ref.bump();
    let page_tree_id = next_ref.bump();
    let font_ids = [
        (Font::Regular, next_ref.bump()),
        (Font::Bold, next_ref.bump()),
    ];
    let page_ids: Vec<(Ref, Ref)> = pages
        .iter()
        .map(|_| (next_ref.bump(), next_ref.bump()))
        .collect();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id)
        .kids(page_ids.iter().map(|(page_id, _)| *page_id))
        .count(page_ids.len() as i32);
    for (font, font_id) in font_ids {
        pdf.type1_font(font_id)
            .base_font(font.base_font())
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    for (page, (page_id, content_id)) in pages.iter().zip(&page_ids) {
        let mut writer = pdf.page(*page_id);
        writer.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT));
        writer.parent(page_tree_id);
        writer.contents(*content_id);
        {
            let mut resources = writer.resources();
            let mut fonts = resources.fonts();
            for (font, font_id) in font_ids {
                fonts.pair(font.resource_name(), font_id);
            }
        }
        writer.finish();

        pdf.stream(*content_id, &draw_page(page).finish());
    }
    pdf.finish()
}

pub fn to_pdf(items: &[ShoppingListItem], start_label: &str, end_label: &str) -> Vec<u8> {
    let pages = layout(items, start_label, end_label);
    log::debug!("laid out {} item(s) on {} page(s)", items.len(), pages.len());
    render(&pages)
}

#[cfg(test)]
fn items(count: usize) -> Vec<ShoppingListItem> {
    (0..count)
        .map(|i| ShoppingListItem {
            name: format!("Ingrédient {i:03}"),
            quantities: format!("{i}g"),
        })
        .collect()
}

#[cfg(test)]
fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[test]
fn layout_three_items() {
    let pages = layout(&items(3), "04/03/2024", "10/03/2024");
    assert_eq!(pages.len(), 1);

    let page = &pages[0];
    assert_eq!(page.lines[0].text, TITLE);
    assert!(page.lines[1].text.contains("04/03/2024"));
    assert!(page.lines[1].text.contains("10/03/2024"));

    assert_eq!(page.rows.len(), 4);
    assert_eq!(page.rows[0].kind, RowKind::Header);
    assert_eq!(page.rows[0].cell_text(0), HEADER[0]);
    assert_eq!(page.rows[0].cell_text(1), HEADER[1]);
    for (row, item) in page.rows[1..].iter().zip(items(3)) {
        assert!(matches!(row.kind, RowKind::Body { .. }));
        assert_eq!(row.cell_text(0), item.name);
        assert_eq!(row.cell_text(1), item.quantities);
    }
}

#[test]
fn layout_empty_list_still_has_header() {
    let pages = layout(&[], "04/03/2024", "10/03/2024");
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].rows.len(), 1);
    assert_eq!(pages[0].rows[0].kind, RowKind::Header);
}

#[test]
fn layout_paginates() {
    let pages = layout(&items(100), "04/03/2024", "10/03/2024");
    assert!(pages.len() > 1);

    let rows: Vec<_> = pages.iter().flat_map(|p| &p.rows).collect();
    assert_eq!(rows.len(), 101);
    assert_eq!(rows[0].kind, RowKind::Header);
    for (row, item) in rows[1..].iter().zip(items(100)) {
        assert_eq!(row.cell_text(0), item.name);
    }

    for page in &pages {
        assert!(!page.rows.is_empty());
        for row in &page.rows {
            assert!(row.bottom() >= MARGIN);
            assert!(row.top <= PAGE_HEIGHT - MARGIN);
        }
        for pair in page.rows.windows(2) {
            assert_eq!(pair[0].bottom(), pair[1].top);
        }
    }
    assert!(pages[1..].iter().all(|p| p.lines.is_empty()));
}

#[test]
fn long_cells_wrap() {
    let item = ShoppingListItem {
        name: "Tomates".into(),
        quantities: "1 boîte, 500g, 3 grosses, un peu pour la sauce du dimanche".into(),
    };
    let pages = layout(std::slice::from_ref(&item), "a", "b");
    let row = &pages[0].rows[1];
    assert!(row.lines[1].len() > 1);
    assert_eq!(row.cell_text(1), item.quantities);
    assert!(row.height > pages[0].rows[0].height);
}

#[test]
fn rows_taller_than_a_page_continue_on_next_pages() {
    let quantities: Vec<_> = (0..400).map(|i| format!("{i}g")).collect();
    let item = ShoppingListItem {
        name: "Sel".into(),
        quantities: quantities.join(", "),
    };
    let pages = layout(std::slice::from_ref(&item), "04/03/2024", "10/03/2024");
    assert!(pages.len() > 1);

    for page in &pages {
        assert!(!page.rows.is_empty());
        for row in &page.rows {
            assert!(row.bottom() >= MARGIN, "row bottom {} is below the margin", row.bottom());
            assert!(row.top <= PAGE_HEIGHT - MARGIN);
        }
    }

    let rows: Vec<_> = pages.iter().flat_map(|p| &p.rows).collect();
    assert_eq!(rows[0].kind, RowKind::Header);
    assert!(rows[1..]
        .iter()
        .all(|r| r.kind == RowKind::Body { striped: false }));
    assert_eq!(rows[1].cell_text(0), item.name);
    assert!(rows[2..].iter().all(|r| r.cell_text(0).is_empty()));

    let continued: Vec<_> = rows[1..].iter().map(|r| r.cell_text(1)).collect();
    assert_eq!(continued.join(" "), item.quantities);
}

#[test]
fn split_row_keeps_remaining_lines() {
    let mut row = TableRow::from_lines(
        RowKind::Body { striped: true },
        [
            vec!["Farine".into()],
            vec!["1".into(), "2".into(), "3".into()],
        ],
    );
    let full_height = row.height;
    assert_eq!(row.lines_fitting(full_height + 1.0), 3);

    let rest = row.split_off(2);
    assert_eq!(row.cell_text(0), "Farine");
    assert_eq!(row.cell_text(1), "1 2");
    assert_eq!(rest.cell_text(0), "");
    assert_eq!(rest.cell_text(1), "3");
    assert_eq!(rest.kind, RowKind::Body { striped: true });
    assert!(row.height < full_height);
    assert!(rest.height < row.height);
}

#[test]
fn wrap_splits_long_words() {
    assert_eq!(wrap("", 5), [""]);
    assert_eq!(wrap("ab cd ef", 5), ["ab cd", "ef"]);
    assert_eq!(wrap("abcdefgh", 3), ["abc", "def", "gh"]);
}

#[test]
fn win_ansi_encoding() {
    assert_eq!(win_ansi("Quantité"), b"Quantit\xe9");
    assert_eq!(win_ansi("bœuf"), b"b\x9cuf");
    assert_eq!(win_ansi("寿司"), b"??");
}

#[test]
fn pdf_document() {
    let document = to_pdf(&items(3), "04/03/2024", "10/03/2024");
    assert!(document.starts_with(b"%PDF-"));
    assert!(contains(&document, b"04/03/2024"));
    assert!(contains(&document, b"10/03/2024"));
    assert!(contains(&document, b"Liste de Courses"));
    assert!(contains(&document, b"Semaine du 04/03/2024 au 10/03/2024"));
    assert!(contains(&document, b"/Helvetica-Bold"));
    assert!(contains(&document, b"/WinAnsiEncoding"));
}

#[test]
fn pdf_document_pages() {
    let document = to_pdf(&items(100), "04/03/2024", "10/03/2024");
    let pages = layout(&items(100), "04/03/2024", "10/03/2024").len();
    assert!(contains(&document, format!("/Count {pages}").as_bytes()));
}

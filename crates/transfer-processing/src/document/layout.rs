//! Page layout in millimetres from the top-left corner, converted to PDF user space
//! when drawn. Tracks the vertical cursor and breaks pages automatically.

use pdf_writer::{Content, Name, Str};
use transfer_core::UploadedFile;

use super::logo::LogoImage;
use super::metrics::{units_to_mm, wrap, Font, MM};
use super::text;

pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;
pub const LOGO_RESOURCE: &[u8] = b"Im1";

const MARGIN_LEFT: f32 = 12.0;
const MARGIN_RIGHT: f32 = 12.0;
const BREAK_MARGIN: f32 = 20.0;
const CELL_MARGIN: f32 = 1.0;

const HEADER_HEIGHT: f32 = 35.0;
const LOGO_WIDTH: f32 = 42.0;
const LOGO_TOP: f32 = 5.0;
const TITLE_TOP: f32 = 23.0;
const TITLE_HEIGHT: f32 = 10.0;
const TITLE: &str = "Rodent Transfer Request to CCM";

const SECTION_HEIGHT: f32 = 8.0;
const LABEL_WIDTH: f32 = 48.0;
const LINE_HEIGHT: f32 = 5.0;
const ROW_GAP: f32 = 0.5;
const TABLE_ROW_HEIGHT: f32 = 7.0;
const NAME_COLUMN: f32 = 135.0;
const TYPE_COLUMN: f32 = 40.0;

const PRIMARY: [u8; 3] = [29, 41, 61];
const SECTION_BG: [u8; 3] = [245, 245, 245];
const BORDER: [u8; 3] = [220, 220, 220];
const WHITE: [u8; 3] = [255, 255, 255];
const BLACK: [u8; 3] = [0, 0, 0];

pub const ATTACHMENTS_TITLE: &str = "Attachments";
pub const NO_ATTACHMENTS: &str = "No attachments uploaded.";

fn content_width() -> f32 {
    PAGE_WIDTH - MARGIN_LEFT - MARGIN_RIGHT
}

/// PDF user-space y (points from the bottom) for a distance from the top in mm.
fn pt_y(top: f32) -> f32 {
    (PAGE_HEIGHT - top) * MM
}

/// Baseline for text vertically centred in a cell.
fn baseline(cell_top: f32, cell_height: f32, size: f32) -> f32 {
    cell_top + cell_height / 2.0 + 0.3 * size / MM
}

fn rgb(color: [u8; 3]) -> (f32, f32, f32) {
    (
        f32::from(color[0]) / 255.0,
        f32::from(color[1]) / 255.0,
        f32::from(color[2]) / 255.0,
    )
}

/// Cut text to `width` mm, ending in "..." when shortened.
fn fit(text: Vec<u8>, font: Font, size: f32, width: f32) -> Vec<u8> {
    if font.text_width(&text, size) <= width {
        return text;
    }
    let ellipsis = font.units(b"...");
    let mut units = 0u32;
    let mut out = Vec::new();
    for byte in text {
        let glyph = u32::from(font.glyph_width(byte));
        if units_to_mm(units + glyph + ellipsis, size) > width {
            break;
        }
        units += glyph;
        out.push(byte);
    }
    out.extend_from_slice(b"...");
    out
}

pub struct Layout<'a> {
    logo: Option<&'a LogoImage>,
    current: Content,
    finished: Vec<Vec<u8>>,
    y: f32,
}

impl<'a> Layout<'a> {
    pub fn new(logo: Option<&'a LogoImage>) -> Self {
        let mut layout = Self {
            logo,
            current: Content::new(),
            finished: Vec::new(),
            y: HEADER_HEIGHT,
        };
        layout.draw_header();
        layout
    }

    /// Content streams, one per page.
    pub fn finish(mut self) -> Vec<Vec<u8>> {
        self.finished.push(self.current.finish());
        self.finished
    }

    fn add_page(&mut self) {
        let done = std::mem::replace(&mut self.current, Content::new());
        self.finished.push(done.finish());
        self.draw_header();
        self.y = HEADER_HEIGHT;
    }

    fn ensure_space(&mut self, height: f32) {
        if self.y + height > PAGE_HEIGHT - BREAK_MARGIN {
            self.add_page();
        }
    }

    pub fn gap(&mut self, height: f32) {
        self.y += height;
    }

    fn fill_rect(&mut self, x: f32, top: f32, w: f32, h: f32, color: [u8; 3]) {
        let (r, g, b) = rgb(color);
        self.current.set_fill_rgb(r, g, b);
        self.current.rect(x * MM, pt_y(top + h), w * MM, h * MM);
        self.current.fill_nonzero();
    }

    fn stroke_rect(&mut self, x: f32, top: f32, w: f32, h: f32) {
        let (r, g, b) = rgb(BORDER);
        self.current.set_stroke_rgb(r, g, b);
        self.current.set_line_width(0.2 * MM);
        self.current.rect(x * MM, pt_y(top + h), w * MM, h * MM);
        self.current.stroke();
    }

    fn text(&mut self, font: Font, size: f32, color: [u8; 3], x: f32, base: f32, bytes: &[u8]) {
        let (r, g, b) = rgb(color);
        self.current.begin_text();
        self.current.set_font(Name(font.resource_name()), size);
        self.current.set_fill_rgb(r, g, b);
        self.current.next_line(x * MM, pt_y(base));
        self.current.show(Str(bytes));
        self.current.end_text();
    }

    fn draw_header(&mut self) {
        self.fill_rect(0.0, 0.0, PAGE_WIDTH, HEADER_HEIGHT, PRIMARY);

        if let Some(logo) = self.logo {
            let height = logo.height_for_width(LOGO_WIDTH);
            let x = (PAGE_WIDTH - LOGO_WIDTH) / 2.0;
            self.current.save_state();
            self.current.transform([
                LOGO_WIDTH * MM,
                0.0,
                0.0,
                height * MM,
                x * MM,
                pt_y(LOGO_TOP + height),
            ]);
            self.current.x_object(Name(LOGO_RESOURCE));
            self.current.restore_state();
        }

        let size = 20.0;
        let title = text::encode(TITLE);
        let x = (PAGE_WIDTH - Font::Regular.text_width(&title, size)) / 2.0;
        let base = baseline(TITLE_TOP, TITLE_HEIGHT, size);
        self.text(Font::Regular, size, WHITE, x, base, &title);
    }

    pub fn section_title(&mut self, title: &str) {
        let size = 11.0;
        self.gap(2.0);
        self.ensure_space(SECTION_HEIGHT);
        let top = self.y;
        self.fill_rect(MARGIN_LEFT, top, content_width(), SECTION_HEIGHT, SECTION_BG);
        let label = text::encode(&format!("  {}", title));
        let base = baseline(top, SECTION_HEIGHT, size);
        self.text(Font::Bold, size, PRIMARY, MARGIN_LEFT + CELL_MARGIN, base, &label);
        self.y += SECTION_HEIGHT + 3.0;
    }

    /// One label/value row. The value wraps across as many lines (and pages) as needed.
    pub fn field(&mut self, label: &str, value: &str) {
        let size = 10.0;
        let label = if label.is_empty() { "-" } else { label };
        let value = if value.trim().is_empty() { "-" } else { value };

        let value_x = MARGIN_LEFT + LABEL_WIDTH;
        let max_width = content_width() - LABEL_WIDTH - 2.0 * CELL_MARGIN;
        let lines: Vec<Vec<u8>> = value
            .split('\n')
            .flat_map(|paragraph| wrap(&text::encode(paragraph), Font::Regular, size, max_width))
            .collect();

        self.ensure_space(LINE_HEIGHT);
        let label = text::encode(&format!("{}:", label));
        let base = baseline(self.y, LINE_HEIGHT, size);
        self.text(Font::Bold, size, PRIMARY, MARGIN_LEFT + CELL_MARGIN, base, &label);

        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                self.ensure_space(LINE_HEIGHT);
            }
            let base = baseline(self.y, LINE_HEIGHT, size);
            self.text(Font::Regular, size, BLACK, value_x + CELL_MARGIN, base, line);
            self.y += LINE_HEIGHT;
        }
        self.y += ROW_GAP;
    }

    fn table_row(&mut self, font: Font, name: &str, kind: &str) {
        let size = 10.0;
        self.ensure_space(TABLE_ROW_HEIGHT);
        let top = self.y;
        let base = baseline(top, TABLE_ROW_HEIGHT, size);
        let name = fit(text::encode(name), font, size, NAME_COLUMN - 2.0 * CELL_MARGIN);
        let kind = fit(text::encode(kind), font, size, TYPE_COLUMN - 2.0 * CELL_MARGIN);

        self.stroke_rect(MARGIN_LEFT, top, NAME_COLUMN, TABLE_ROW_HEIGHT);
        self.text(font, size, BLACK, MARGIN_LEFT + CELL_MARGIN, base, &name);
        let type_x = MARGIN_LEFT + NAME_COLUMN;
        self.stroke_rect(type_x, top, TYPE_COLUMN, TABLE_ROW_HEIGHT);
        self.text(font, size, BLACK, type_x + CELL_MARGIN, base, &kind);
        self.y += TABLE_ROW_HEIGHT;
    }

    /// Attachment table, or a single placeholder row when there are none.
    pub fn attachments(&mut self, files: &[UploadedFile]) {
        self.section_title(ATTACHMENTS_TITLE);
        if files.is_empty() {
            self.field("Files", NO_ATTACHMENTS);
            return;
        }
        self.table_row(Font::Bold, "Filename", "Type");
        for file in files {
            let summary = file.summary();
            self.table_row(Font::Regular, &summary.name, &summary.extension);
        }
    }
}

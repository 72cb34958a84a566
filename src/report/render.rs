//! Conversation summary rendering via `printpdf`.
//!
//! Single-pass: sections are drawn top to bottom through a `ReportWriter`
//! that owns the document, the current layer, and the layout cursor. Any
//! construction failure aborts the whole render — no partial document is
//! ever returned.

use std::io::BufWriter;

use chrono::{DateTime, Utc};
use printpdf::*;
use thiserror::Error;

use crate::models::{ConversationRecord, MessageRole};

use super::layout::{wrap_lines, PageCursor, LINE_HEIGHT, MARGIN, PAGE_HEIGHT, PAGE_WIDTH, WRAP_COLS};

const TITLE_PURPLE: (f32, f32, f32) = (0.5, 0.0, 0.5);
const ALERT_RED: (f32, f32, f32) = (0.5, 0.0, 0.0);

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("PDF font error: {0}")]
    Font(String),

    #[error("PDF save error: {0}")]
    Save(String),
}

/// A fully rendered report: the serialized bytes plus how many pages the
/// layout used.
pub struct RenderedReport {
    pub bytes: Vec<u8>,
    pub pages: usize,
}

/// Suggested download filename for a rendered report.
pub fn report_filename(app_name: &str, patient_name: &str, date: DateTime<Utc>) -> String {
    format!(
        "{}_Report_{}_{}.pdf",
        app_name,
        patient_name,
        date.format("%Y-%m-%d"),
    )
}

fn disclaimer_text(app_name: &str) -> String {
    format!(
        "DISCLAIMER: This report is generated based on your conversation with \
         {app_name} and is not a substitute for professional medical advice. \
         Please consult with your healthcare provider for medical guidance.",
    )
}

// ─── Writer ───────────────────────────────────────────────────────────────

fn pt(value: f32) -> Mm {
    Mm::from(Pt(value.into()))
}

struct ReportWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    bold: IndirectFontRef,
    cursor: PageCursor,
}

impl ReportWriter {
    fn new(title: &str) -> Result<Self, RenderError> {
        let (doc, page, layer) =
            PdfDocument::new(title, pt(PAGE_WIDTH), pt(PAGE_HEIGHT), "Layer 1");
        let layer = doc.get_page(page).get_layer(layer);
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| RenderError::Font(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| RenderError::Font(e.to_string()))?;
        Ok(Self {
            doc,
            layer,
            font,
            bold,
            cursor: PageCursor::top_of_first_page(),
        })
    }

    /// Allocate a fresh page if the cursor has passed the bottom margin.
    /// Called before every draw so content never lands below the margin.
    fn ensure_room(&mut self) {
        if self.cursor.needs_new_page() {
            let (page, layer) = self
                .doc
                .add_page(pt(PAGE_WIDTH), pt(PAGE_HEIGHT), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.cursor.start_new_page();
        }
    }

    /// Draw one line at the left margin and advance the cursor by `step`.
    fn line(&mut self, text: &str, size: f32, bold: bool, color: Option<(f32, f32, f32)>, step: f32) {
        self.ensure_room();
        if let Some((r, g, b)) = color {
            self.layer
                .set_fill_color(Color::Rgb(Rgb::new(r.into(), g.into(), b.into(), None)));
        }
        let font = if bold { &self.bold } else { &self.font };
        self.layer
            .use_text(text, size.into(), pt(MARGIN), pt(self.cursor.y), font);
        if color.is_some() {
            self.layer
                .set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
        }
        self.cursor.advance(step);
    }

    /// Word-wrap a block at the fixed threshold, draw every line, then add
    /// one extra line height of trailing spacing.
    fn text_block(
        &mut self,
        text: &str,
        size: f32,
        bold: bool,
        color: Option<(f32, f32, f32)>,
        step: f32,
    ) {
        for line in wrap_lines(text, WRAP_COLS) {
            self.line(&line, size, bold, color, step);
        }
        self.cursor.advance(LINE_HEIGHT);
    }

    fn spacer(&mut self, dy: f32) {
        self.cursor.advance(dy);
    }

    fn finish(self) -> Result<RenderedReport, RenderError> {
        let pages = self.cursor.page_index + 1;
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| RenderError::Save(e.to_string()))?;
        let bytes = buf
            .into_inner()
            .map_err(|e| RenderError::Save(e.to_string()))?;
        Ok(RenderedReport { bytes, pages })
    }
}

// ─── Rendering ────────────────────────────────────────────────────────────

/// Render a conversation record to a paginated summary document.
pub fn render_report(
    record: &ConversationRecord,
    app_name: &str,
) -> Result<RenderedReport, RenderError> {
    let title = format!("{app_name} Health Summary Report");
    let mut writer = ReportWriter::new(&title)?;

    writer.line(&title, 18.0, true, Some(TITLE_PURPLE), LINE_HEIGHT);
    writer.spacer(LINE_HEIGHT);

    // Patient metadata block; stage and treatments lines only when present
    let info = &record.patient_info;
    writer.line(
        &format!("Patient Name: {}", info.name),
        12.0,
        true,
        None,
        LINE_HEIGHT,
    );
    writer.line(
        &format!("Role: {}", info.role.as_str()),
        12.0,
        false,
        None,
        LINE_HEIGHT,
    );
    writer.line(
        &format!("Cancer Type: {}", info.cancer_type),
        12.0,
        false,
        None,
        LINE_HEIGHT,
    );
    if let Some(stage) = info.stage.as_deref().filter(|s| !s.trim().is_empty()) {
        writer.line(&format!("Stage: {stage}"), 12.0, false, None, LINE_HEIGHT);
    }
    if let Some(treatments) = info.treatments.as_deref().filter(|s| !s.trim().is_empty()) {
        writer.line(
            &format!("Treatments: {treatments}"),
            12.0,
            false,
            None,
            LINE_HEIGHT,
        );
    }
    writer.spacer(LINE_HEIGHT);

    writer.line(
        &format!("Report Date: {}", record.date.format("%Y-%m-%d")),
        12.0,
        true,
        None,
        LINE_HEIGHT,
    );
    writer.spacer(LINE_HEIGHT);

    // Assistant messages only — the summary is what the assistant said
    writer.line("Conversation Summary", 14.0, true, None, LINE_HEIGHT * 1.5);
    for message in record
        .messages
        .iter()
        .filter(|m| m.role == MessageRole::Assistant)
    {
        writer.text_block(&message.content, 10.0, false, None, LINE_HEIGHT);
    }

    // Omitted entirely when no files were uploaded
    if !record.files.is_empty() {
        writer.spacer(LINE_HEIGHT);
        writer.line("Uploaded Documents", 14.0, true, None, LINE_HEIGHT * 1.5);
        for file in &record.files {
            writer.line(&format!("• {file}"), 10.0, false, None, LINE_HEIGHT);
        }
    }

    writer.spacer(LINE_HEIGHT);
    writer.text_block(
        &disclaimer_text(app_name),
        8.0,
        true,
        Some(ALERT_RED),
        LINE_HEIGHT * 0.8,
    );

    writer.finish()
}

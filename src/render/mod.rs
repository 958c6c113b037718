//! Report PDF rendering.
//!
//! Lays a care report out as an A4 document: product header, report title
//! and date, diagnosis and recommendation sections, record footer. Long
//! content word-wraps and flows onto additional pages.

use anyhow::Result;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference};

use crate::store::Report;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const LINE_HEIGHT_MM: f32 = 5.5;
const FOOTER_Y_MM: f32 = 12.0;
// Conservative fit for 10pt Helvetica within the text column.
const WRAP_COLUMN: usize = 90;

const HEADER_TEXT: &str = "CareConnect Health Report";
const FOOTER_TEXT: &str = "This is an official patient record from CareConnect.";

/// Render one report as PDF bytes.
pub fn render_report_pdf(report: &Report) -> Result<Vec<u8>> {
    let mut writer = PageWriter::new(&format!("Report-{}", report.id))?;

    writer.heading(HEADER_TEXT, 18.0);
    writer.space(6.0);

    writer.heading(&report.title, 14.0);
    let date = report
        .display_date()
        .unwrap_or_else(|| "Not available".to_string());
    writer.line(&format!("Generated on: {}", date), 10.0);
    writer.space(6.0);

    writer.section("Official Diagnosis", &report.content.diagnosis);
    writer.section("Doctor's Recommendations", &report.content.recommendations);

    writer.finish()
}

struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
}

impl PageWriter {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| anyhow::anyhow!("failed to load PDF font: {e}"))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| anyhow::anyhow!("failed to load PDF font: {e}"))?;
        let layer = doc.get_page(page).get_layer(layer);

        let mut writer = Self {
            doc,
            layer,
            regular,
            bold,
            y: PAGE_HEIGHT_MM - MARGIN_MM,
        };
        writer.footer();
        Ok(writer)
    }

    fn footer(&self) {
        self.layer.use_text(
            FOOTER_TEXT,
            8.0,
            Mm(MARGIN_MM),
            Mm(FOOTER_Y_MM),
            &self.regular,
        );
    }

    /// Start a fresh page when the cursor would collide with the footer.
    fn ensure_room(&mut self, needed: f32) {
        if self.y - needed > FOOTER_Y_MM + LINE_HEIGHT_MM {
            return;
        }
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT_MM - MARGIN_MM;
        self.footer();
    }

    fn heading(&mut self, text: &str, size: f32) {
        self.ensure_room(LINE_HEIGHT_MM * 2.0);
        self.layer
            .use_text(text, size, Mm(MARGIN_MM), Mm(self.y), &self.bold);
        self.y -= LINE_HEIGHT_MM * 1.5;
    }

    fn line(&mut self, text: &str, size: f32) {
        self.ensure_room(LINE_HEIGHT_MM);
        self.layer
            .use_text(text, size, Mm(MARGIN_MM), Mm(self.y), &self.regular);
        self.y -= LINE_HEIGHT_MM;
    }

    fn space(&mut self, mm: f32) {
        self.y -= mm;
    }

    fn section(&mut self, heading: &str, content: &str) {
        self.heading(heading, 12.0);
        let content = if content.is_empty() {
            "Not provided."
        } else {
            content
        };
        for paragraph in content.split('\n') {
            for wrapped in wrap_text(paragraph, WRAP_COLUMN) {
                self.line(&wrapped, 10.0);
            }
        }
        self.space(4.0);
    }

    fn finish(self) -> Result<Vec<u8>> {
        self.doc
            .save_to_bytes()
            .map_err(|e| anyhow::anyhow!("failed to serialize PDF: {e}"))
    }
}

/// Greedy word wrap. Words longer than the column get their own line.
fn wrap_text(text: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.len() + 1 + word.len() <= columns {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(current);
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ReportContent;
    use chrono::{TimeZone, Utc};

    fn sample_report(diagnosis: &str) -> Report {
        Report {
            id: "r-42".into(),
            title: "Quarterly check".into(),
            icon_name: "LineChart".into(),
            date: Some(Utc.with_ymd_and_hms(2026, 7, 4, 9, 0, 0).unwrap()),
            content: ReportContent {
                diagnosis: diagnosis.into(),
                recommendations: "Keep walking daily.".into(),
            },
        }
    }

    #[test]
    fn rendered_output_is_a_pdf() {
        let bytes = render_report_pdf(&sample_report("Stable.")).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn long_content_still_renders() {
        let long = "word ".repeat(4000);
        let bytes = render_report_pdf(&sample_report(&long)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn wrap_text_respects_column_limit() {
        let lines = wrap_text("alpha beta gamma delta", 11);
        assert_eq!(lines, vec!["alpha beta", "gamma delta"]);
    }

    #[test]
    fn wrap_text_keeps_overlong_word_whole() {
        let lines = wrap_text("supercalifragilistic", 5);
        assert_eq!(lines, vec!["supercalifragilistic"]);
    }

    #[test]
    fn wrap_text_empty_input_yields_blank_line() {
        assert_eq!(wrap_text("", 80), vec![String::new()]);
    }
}

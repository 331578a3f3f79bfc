// printpdf-backed implementation of the `PageRenderer` capability.
//
// All layout policy lives here: US Letter pages, one-inch margins, a
// running title banner and page-number footer on every page, and the
// style ladder for the composer's text kinds. The composer itself never
// touches the engine.
use crate::compose::{PageRenderer, TextKind};
use crate::error::ComposeError;
use crate::util::wrap_text;
use printpdf::image_crate::codecs::png::PngDecoder;
use printpdf::{
    BuiltinFont, Color, CustomPdfConformance, Image, ImageTransform, IndirectFontRef, Mm,
    PdfConformance, PdfDocument, PdfDocumentReference, PdfLayerReference, Rgb,
};
use std::fmt::Display;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use time::OffsetDateTime;

const PAGE_WIDTH: f32 = 215.9; // US Letter, mm
const PAGE_HEIGHT: f32 = 279.4;
const MARGIN: f32 = 25.4;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
/// Lowest cursor position before a new page is opened automatically.
const BOTTOM_LIMIT: f32 = 22.0;

const MM_PER_PT: f32 = 0.352_778;
/// Average glyph advance of the Helvetica faces, as a fraction of the
/// point size. Good enough for wrapping and centering without embedding
/// full font metrics.
const GLYPH_WIDTH_EM: f32 = 0.5;

const DOC_TITLE: &str = "Incident Statistics Across Reporting Regions";

fn rgb(r: f32, g: f32, b: f32) -> Color {
    Color::Rgb(Rgb::new(r.into(), g.into(), b.into(), None))
}

fn backend_err<E: Display>(e: E) -> ComposeError {
    ComposeError::Backend(e.to_string())
}

pub struct PdfRenderer {
    doc: Option<PdfDocumentReference>,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
    layer: Option<PdfLayerReference>,
    /// Cursor height in mm from the bottom edge of the current page.
    cursor_y: f32,
    page_no: usize,
}

impl PdfRenderer {
    pub fn new() -> Result<Self, ComposeError> {
        // XMP metadata is disabled and the info-dictionary dates are pinned,
        // so identical runs produce byte-identical documents.
        let doc = PdfDocument::empty(DOC_TITLE)
            .with_conformance(PdfConformance::Custom(CustomPdfConformance {
                requires_icc_profile: false,
                requires_xmp_metadata: false,
                ..Default::default()
            }))
            .with_creation_date(OffsetDateTime::UNIX_EPOCH)
            .with_mod_date(OffsetDateTime::UNIX_EPOCH);
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(backend_err)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(backend_err)?;
        let italic = doc
            .add_builtin_font(BuiltinFont::HelveticaOblique)
            .map_err(backend_err)?;
        Ok(Self {
            doc: Some(doc),
            regular,
            bold,
            italic,
            layer: None,
            cursor_y: 0.0,
            page_no: 0,
        })
    }

    fn doc(&self) -> Result<&PdfDocumentReference, ComposeError> {
        self.doc
            .as_ref()
            .ok_or_else(|| ComposeError::Backend("document already flushed".to_string()))
    }

    fn layer(&self) -> Result<&PdfLayerReference, ComposeError> {
        self.layer
            .as_ref()
            .ok_or_else(|| ComposeError::Backend("no page open".to_string()))
    }

    /// Estimated rendered width of `text` in mm at `size` points.
    fn text_width(text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * size * GLYPH_WIDTH_EM * MM_PER_PT
    }

    fn wrap_budget(size: f32) -> usize {
        (CONTENT_WIDTH / (size * GLYPH_WIDTH_EM * MM_PER_PT)) as usize
    }

    /// Emit one line at the cursor, opening a fresh page first when the
    /// cursor has run out of room.
    fn line(
        &mut self,
        text: &str,
        font: Font,
        size: f32,
        color: Color,
        centered: bool,
    ) -> Result<(), ComposeError> {
        let line_height = size * MM_PER_PT * 1.45;
        if self.cursor_y - line_height < BOTTOM_LIMIT {
            self.open_page()?;
        }
        self.cursor_y -= line_height;

        let x = if centered {
            MARGIN + ((CONTENT_WIDTH - Self::text_width(text, size)) / 2.0).max(0.0)
        } else {
            MARGIN
        };
        let font = match font {
            Font::Regular => &self.regular,
            Font::Bold => &self.bold,
            Font::Italic => &self.italic,
        };
        let layer = self.layer()?;
        layer.set_fill_color(color);
        layer.use_text(text, size.into(), Mm(x.into()), Mm(self.cursor_y.into()), font);
        Ok(())
    }

    fn vspace(&mut self, mm: f32) {
        self.cursor_y -= mm;
    }

    /// Running banner and footer, drawn on every page as it opens.
    fn page_furniture(&mut self) -> Result<(), ComposeError> {
        let layer = self.layer()?.clone();

        layer.set_fill_color(rgb(0.0, 0.4, 0.8));
        let banner_x = MARGIN + ((CONTENT_WIDTH - Self::text_width(DOC_TITLE, 20.0)) / 2.0).max(0.0);
        layer.use_text(
            DOC_TITLE,
            20.0,
            Mm(banner_x.into()),
            Mm((PAGE_HEIGHT - 18.0).into()),
            &self.bold,
        );

        let footer = format!("Page {}", self.page_no);
        layer.set_fill_color(rgb(0.5, 0.5, 0.5));
        let footer_x = MARGIN + ((CONTENT_WIDTH - Self::text_width(&footer, 10.0)) / 2.0).max(0.0);
        layer.use_text(&footer, 10.0, Mm(footer_x.into()), Mm(12.0_f32.into()), &self.italic);
        Ok(())
    }
}

enum Font {
    Regular,
    Bold,
    Italic,
}

impl PageRenderer for PdfRenderer {
    fn open_page(&mut self) -> Result<(), ComposeError> {
        let (page, layer) =
            self.doc()?
                .add_page(Mm(PAGE_WIDTH.into()), Mm(PAGE_HEIGHT.into()), "content");
        self.layer = Some(self.doc()?.get_page(page).get_layer(layer));
        self.page_no += 1;
        self.cursor_y = PAGE_HEIGHT - 30.0;
        self.page_furniture()
    }

    fn draw_text(&mut self, kind: TextKind, text: &str) -> Result<(), ComposeError> {
        match kind {
            TextKind::Body => {
                for line in wrap_text(text, Self::wrap_budget(12.0)) {
                    self.line(&line, Font::Regular, 12.0, rgb(0.0, 0.0, 0.0), false)?;
                }
                self.vspace(4.0);
            }
            TextKind::SectionHeading => {
                self.vspace(3.0);
                self.line(text, Font::Bold, 14.0, rgb(0.0, 0.2, 0.4), false)?;
                self.vspace(1.5);
            }
            TextKind::EntityHeading => {
                self.vspace(1.5);
                self.line(text, Font::Bold, 13.0, rgb(0.0, 0.4, 0.8), false)?;
            }
            TextKind::DetailLine => {
                self.line(text, Font::Regular, 12.0, rgb(0.2, 0.2, 0.2), false)?;
            }
            TextKind::Caption => {
                self.vspace(5.0);
                for line in wrap_text(text, Self::wrap_budget(10.0)) {
                    self.line(&line, Font::Italic, 10.0, rgb(0.49, 0.49, 0.49), true)?;
                }
            }
            TextKind::AppendixHeading => {
                self.vspace(2.0);
                self.line(text, Font::Bold, 16.0, rgb(0.0, 0.2, 0.4), true)?;
                self.vspace(4.0);
            }
        }
        Ok(())
    }

    /// Embed the chart: decoded and stored in the document itself, scaled
    /// to content width with height fixed at 0.6 x width.
    fn draw_image(&mut self, path: &Path) -> Result<(), ComposeError> {
        let artifact_err = |reason: String| ComposeError::ChartArtifact {
            path: path.to_path_buf(),
            reason,
        };

        let file = File::open(path).map_err(|e| artifact_err(e.to_string()))?;
        let decoder =
            PngDecoder::new(BufReader::new(file)).map_err(|e| artifact_err(e.to_string()))?;
        let image = Image::try_from(decoder).map_err(|e| artifact_err(e.to_string()))?;

        let px_w = image.image.width.0 as f32;
        let px_h = image.image.height.0 as f32;
        if px_w == 0.0 || px_h == 0.0 {
            return Err(artifact_err("image has zero dimensions".to_string()));
        }

        let target_w = CONTENT_WIDTH;
        let target_h = target_w * 0.6;
        // dpi pins the rendered width; the vertical scale corrects the
        // height to the fixed aspect ratio.
        let dpi = px_w * 25.4 / target_w;
        let natural_h = px_h * 25.4 / dpi;
        let scale_y = target_h / natural_h;

        if self.cursor_y - target_h < BOTTOM_LIMIT {
            self.open_page()?;
        }
        self.cursor_y -= target_h;

        let layer = self.layer()?.clone();
        image.add_to_layer(
            layer,
            ImageTransform {
                translate_x: Some(Mm(MARGIN.into())),
                translate_y: Some(Mm(self.cursor_y.into())),
                dpi: Some(dpi.into()),
                scale_y: Some(scale_y.into()),
                ..Default::default()
            },
        );
        self.vspace(6.0);
        Ok(())
    }

    fn flush(&mut self, destination: &Path) -> Result<(), ComposeError> {
        let doc = self
            .doc
            .take()
            .ok_or_else(|| ComposeError::Backend("document already flushed".to_string()))?;
        self.layer = None;

        let file = File::create(destination).map_err(|source| ComposeError::Write {
            path: destination.to_path_buf(),
            source,
        })?;
        doc.save(&mut BufWriter::new(file)).map_err(backend_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::compose;
    use crate::types::Aggregate;
    use indexmap::IndexMap;

    fn small_aggregate() -> Aggregate {
        let mut counts = IndexMap::new();
        counts.insert("Violent".to_string(), 3u64);
        counts.insert("Property".to_string(), 7u64);
        let mut agg = Aggregate {
            categories: vec!["Violent".into(), "Property".into()],
            entities: IndexMap::new(),
        };
        agg.entities.insert("Springfield".to_string(), counts);
        agg
    }

    #[test]
    fn full_compose_produces_a_pdf_file() {
        let dir = tempfile::tempdir().unwrap();
        let agg = small_aggregate();

        let chart = dir.path().join("chart.png");
        crate::chart::render_chart(&agg, &chart).unwrap();

        let dest = dir.path().join("report.pdf");
        let mut renderer = PdfRenderer::new().unwrap();
        compose(&agg, &chart, &dest, &mut renderer).unwrap();

        let bytes = std::fs::read(&dest).unwrap();
        assert_eq!(&bytes[..5], b"%PDF-");
        // The chart is embedded by value, so the document outlives it.
        std::fs::remove_file(&chart).unwrap();
        assert!(std::fs::read(&dest).unwrap().len() > 1000);
    }

    #[test]
    fn identical_input_composes_identical_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let agg = small_aggregate();

        let chart = dir.path().join("chart.png");
        crate::chart::render_chart(&agg, &chart).unwrap();

        let a = dir.path().join("a.pdf");
        let mut renderer = PdfRenderer::new().unwrap();
        compose(&agg, &chart, &a, &mut renderer).unwrap();

        // Embedded dates have one-second resolution; leave a real gap so
        // any wall-clock leak shows up in the bytes.
        std::thread::sleep(std::time::Duration::from_millis(1100));

        let b = dir.path().join("b.pdf");
        let mut renderer = PdfRenderer::new().unwrap();
        compose(&agg, &chart, &b, &mut renderer).unwrap();

        assert_eq!(std::fs::read(&a).unwrap(), std::fs::read(&b).unwrap());
    }

    #[test]
    fn long_breakdown_overflows_onto_extra_pages() {
        let dir = tempfile::tempdir().unwrap();
        let mut agg = Aggregate {
            categories: vec!["A".into(), "B".into()],
            entities: IndexMap::new(),
        };
        for i in 0..60 {
            let mut counts = IndexMap::new();
            counts.insert("A".to_string(), i as u64);
            counts.insert("B".to_string(), (i * 2) as u64);
            agg.entities.insert(format!("Entity {i}"), counts);
        }

        let chart = dir.path().join("chart.png");
        crate::chart::render_chart(&agg, &chart).unwrap();

        let dest = dir.path().join("report.pdf");
        let mut renderer = PdfRenderer::new().unwrap();
        compose(&agg, &chart, &dest, &mut renderer).unwrap();
        assert!(dest.exists());
    }

    #[test]
    fn flush_twice_is_a_backend_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut renderer = PdfRenderer::new().unwrap();
        renderer.open_page().unwrap();
        renderer.flush(&dir.path().join("a.pdf")).unwrap();
        let err = renderer.flush(&dir.path().join("b.pdf")).unwrap_err();
        assert!(matches!(err, ComposeError::Backend(_)));
    }

    #[test]
    fn garbage_image_is_a_chart_artifact_error() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("not_a.png");
        std::fs::write(&bogus, b"definitely not png bytes").unwrap();

        let mut renderer = PdfRenderer::new().unwrap();
        renderer.open_page().unwrap();
        let err = renderer.draw_image(&bogus).unwrap_err();
        assert!(matches!(err, ComposeError::ChartArtifact { .. }));
    }
}

// Document composition: ordered assembly of report sections.
//
// The composer owns the section sequence and the exact line formats; all
// actual drawing and pagination is delegated to a `PageRenderer`
// capability, so the section logic stays independent of any one document
// engine (and trivially testable against a recording mock).
use crate::error::ComposeError;
use crate::types::Aggregate;
use std::path::Path;
use tracing::debug;

/// Fixed narrative for the INTRO section.
const INTRO_TEXT: &str = "This report provides an analytical overview of incident data \
collected from the reporting regions. The data covers every incident category present \
in the source records. The purpose of this report is to highlight incident patterns \
and support data-driven decisions.";

/// Fixed caption for the DISCLAIMER section.
const DISCLAIMER_TEXT: &str = "Note: Incident data is based on official records and may \
be subject to reporting delays or variations depending on the source jurisdiction.";

const BREAKDOWN_HEADING: &str = "Incident Data Breakdown by Region:";
const SUMMARY_HEADING: &str = "Overall Incident Totals:";
const APPENDIX_HEADING: &str = "Visual Representation of Incident Data";

/// Styling class of a text block handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    /// Section heading within the flow of a page.
    SectionHeading,
    /// One entity's name above its detail lines.
    EntityHeading,
    /// A single pre-formatted line (breakdown or totals).
    DetailLine,
    /// Narrative text, word-wrapped to content width.
    Body,
    /// Centered fine print.
    Caption,
    /// Centered heading at the top of the visual appendix.
    AppendixHeading,
}

/// Generic paginated-document capability the composer draws through.
///
/// Implementations apply the running header banner and page-number footer
/// themselves whenever a page opens; the composer sets neither per page.
pub trait PageRenderer {
    /// Open a fresh page (applying the running header and footer).
    fn open_page(&mut self) -> Result<(), ComposeError>;
    /// Draw a text block styled according to `kind`.
    fn draw_text(&mut self, kind: TextKind, text: &str) -> Result<(), ComposeError>;
    /// Embed the image at `path` (its bytes, not a reference to the path).
    fn draw_image(&mut self, path: &Path) -> Result<(), ComposeError>;
    /// Flush the assembled document to `destination`.
    fn flush(&mut self, destination: &Path) -> Result<(), ComposeError>;
}

/// Assemble the report and write it to `destination`.
///
/// Section order is fixed: primary page, intro, tabular breakdown,
/// summary, disclaimer, then an appendix page embedding the chart. The
/// chart artifact is a hard dependency: if it is missing or unreadable
/// the compose fails before anything reaches `destination`. Finalization
/// goes through a temporary file in the destination directory, so a
/// failed compose never leaves a truncated document behind.
pub fn compose(
    agg: &Aggregate,
    chart_artifact: &Path,
    destination: &Path,
    renderer: &mut dyn PageRenderer,
) -> Result<(), ComposeError> {
    // PAGE(primary)
    renderer.open_page()?;

    // INTRO
    renderer.draw_text(TextKind::Body, INTRO_TEXT)?;

    // TABULAR_BREAKDOWN, in aggregate order
    renderer.draw_text(TextKind::SectionHeading, BREAKDOWN_HEADING)?;
    for (entity, counts) in &agg.entities {
        renderer.draw_text(TextKind::EntityHeading, entity)?;
        for (category, count) in counts {
            renderer.draw_text(
                TextKind::DetailLine,
                &format!("- {category}: {count} incidents"),
            )?;
        }
    }

    // SUMMARY: totals are computed here, from the completed aggregate
    renderer.draw_text(TextKind::SectionHeading, SUMMARY_HEADING)?;
    for (category, total) in agg.totals() {
        renderer.draw_text(
            TextKind::DetailLine,
            &format!("Total {category} reported: {total}"),
        )?;
    }

    // DISCLAIMER
    renderer.draw_text(TextKind::Caption, DISCLAIMER_TEXT)?;

    // PAGE(appendix) + CHART_EMBED
    renderer.open_page()?;
    renderer.draw_text(TextKind::AppendixHeading, APPENDIX_HEADING)?;
    if let Err(e) = std::fs::metadata(chart_artifact) {
        return Err(ComposeError::ChartArtifact {
            path: chart_artifact.to_path_buf(),
            reason: e.to_string(),
        });
    }
    renderer.draw_image(chart_artifact)?;

    // FINALIZE
    finalize(renderer, destination)
}

fn finalize(renderer: &mut dyn PageRenderer, destination: &Path) -> Result<(), ComposeError> {
    let parent = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let write_err = |source| ComposeError::Write {
        path: destination.to_path_buf(),
        source,
    };

    let tmp = tempfile::Builder::new()
        .prefix(".incident_report")
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(write_err)?
        .into_temp_path();
    debug!(tmp = %tmp.display(), "flushing report to temporary file");
    renderer.flush(&tmp)?;
    tmp.persist(destination).map_err(|e| write_err(e.error))?;
    Ok(())
}

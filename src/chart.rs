// Grouped-bar chart rendering.
//
// One cluster per entity (aggregate order), one bar per category within a
// cluster (header order). Persists exactly one PNG at the destination;
// callers never see pixel data.
use crate::error::RenderError;
use crate::types::Aggregate;
use once_cell::sync::Lazy;
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle, FontTransform};
use std::fmt::Display;
use std::path::Path;

const CHART_WIDTH: u32 = 1000;
const CHART_HEIGHT: u32 = 600;

/// Fraction of each cluster's unit slot occupied by bars.
const CLUSTER_SPAN: f64 = 0.8;

// Fixed fill palette. The first three entries are the colors the incident
// dataset has always shipped with; the rest round it out for less common
// category names.
const PALETTE: [RGBColor; 12] = [
    RGBColor(231, 148, 60),
    RGBColor(52, 219, 94),
    RGBColor(109, 46, 204),
    RGBColor(52, 120, 219),
    RGBColor(219, 68, 55),
    RGBColor(244, 180, 0),
    RGBColor(15, 157, 88),
    RGBColor(171, 71, 188),
    RGBColor(0, 172, 193),
    RGBColor(255, 112, 67),
    RGBColor(124, 179, 66),
    RGBColor(93, 64, 55),
];

// The ab_glyph text backend has no system font discovery, so the face is
// bundled and registered once under the name the chart styles ask for.
static FONT_BYTES: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");
static FONT_REGISTERED: Lazy<bool> =
    Lazy::new(|| register_font("sans-serif", FontStyle::Normal, FONT_BYTES).is_ok());

fn ensure_font() -> Result<(), RenderError> {
    if *FONT_REGISTERED {
        Ok(())
    } else {
        Err(RenderError::FontRegistration)
    }
}

/// Fill color for a category.
///
/// Derived from the category name, not its column position, so the same
/// category keeps its color across runs and across datasets. Distinct
/// categories can collide into the same palette entry; that is accepted.
pub fn color_for(category: &str) -> RGBColor {
    PALETTE[(fnv1a(category) % PALETTE.len() as u64) as usize]
}

fn fnv1a(s: &str) -> u64 {
    let mut hash = 0xcbf2_9ce4_8422_2325u64;
    for byte in s.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

fn draw_err<E: Display>(e: E) -> RenderError {
    RenderError::Draw(e.to_string())
}

/// Render the aggregate as a grouped-bar PNG at `destination`.
///
/// Cluster centers sit at integer x positions, evenly spaced; entity
/// labels rotate once any name is long enough to collide with its
/// neighbors. The legend (color -> category) is drawn exactly once.
pub fn render_chart(agg: &Aggregate, destination: &Path) -> Result<(), RenderError> {
    ensure_font()?;

    // The bitmap backend retries the save on drop; reject an unwritable
    // destination before any drawing happens.
    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            return Err(RenderError::Persist {
                path: destination.to_path_buf(),
                reason: format!("directory '{}' does not exist", parent.display()),
            });
        }
    }

    let entity_names: Vec<String> = agg.entities.keys().cloned().collect();
    let n = entity_names.len();
    let n_cat = agg.categories.len();

    let root = BitMapBackend::new(destination, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let x_range = -0.5f64..(n.max(1) as f64 - 0.5);
    let y_max = (agg.max_count() as f64 * 1.15).max(1.0);

    let mut chart = ChartBuilder::on(&root)
        .caption("Incident Statistics by Region", ("sans-serif", 28))
        .margin(12)
        .x_label_area_size(if long_labels(&entity_names) { 110 } else { 50 })
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, 0f64..y_max)
        .map_err(draw_err)?;

    let label_font = if long_labels(&entity_names) {
        ("sans-serif", 14).into_font().transform(FontTransform::Rotate90)
    } else {
        ("sans-serif", 14).into_font()
    };

    let names_for_labels = entity_names.clone();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n.max(1))
        .x_label_style(label_font)
        .x_label_formatter(&move |x: &f64| {
            let idx = x.round();
            if (x - idx).abs() < 1e-6 && idx >= 0.0 && (idx as usize) < names_for_labels.len() {
                names_for_labels[idx as usize].clone()
            } else {
                String::new()
            }
        })
        .y_label_formatter(&|y: &f64| format!("{}", *y as u64))
        .x_desc("Region")
        .y_desc("Number of Incidents")
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(draw_err)?;

    // Bars for one category across all clusters form one series, so the
    // legend gets exactly one entry per category.
    let bar_width = if n_cat == 0 { CLUSTER_SPAN } else { CLUSTER_SPAN / n_cat as f64 };
    for (ci, category) in agg.categories.iter().enumerate() {
        let color = color_for(category);
        let bars = agg.entities.values().enumerate().map(|(i, counts)| {
            let value = counts.get(category).copied().unwrap_or(0) as f64;
            let x0 = i as f64 - CLUSTER_SPAN / 2.0 + ci as f64 * bar_width;
            let x1 = x0 + bar_width * 0.92;
            Rectangle::new([(x0, 0.0), (x1, value)], color.filled())
        });
        chart
            .draw_series(bars)
            .map_err(draw_err)?
            .label(category.clone())
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled())
            });
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.85))
        .border_style(&BLACK)
        .label_font(("sans-serif", 16))
        .draw()
        .map_err(draw_err)?;

    root.present().map_err(|e| RenderError::Persist {
        path: destination.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(())
}

fn long_labels(names: &[String]) -> bool {
    names.iter().any(|n| n.len() > 8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::types::{Header, RawRecord};

    fn sample_aggregate() -> Aggregate {
        let header = Header {
            entity_column: "City".to_string(),
            categories: vec!["Violent".into(), "Property".into(), "Drug".into()],
        };
        let rows = vec![
            RawRecord {
                row: 1,
                entity: "New York".to_string(),
                values: vec!["500".into(), "3000".into(), "200".into()],
            },
            RawRecord {
                row: 2,
                entity: "Chicago".to_string(),
                values: vec!["600".into(), "2000".into(), "250".into()],
            },
        ];
        aggregate(&header, &rows).unwrap()
    }

    #[test]
    fn writes_a_png_at_the_destination() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("chart.png");
        render_chart(&sample_aggregate(), &dest).unwrap();

        let bytes = std::fs::read(&dest).unwrap();
        assert_eq!(&bytes[..4], b"\x89PNG");
    }

    #[test]
    fn identical_input_renders_identical_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.png");
        render_chart(&sample_aggregate(), &a).unwrap();
        render_chart(&sample_aggregate(), &b).unwrap();
        assert_eq!(std::fs::read(&a).unwrap(), std::fs::read(&b).unwrap());
    }

    #[test]
    fn missing_parent_directory_is_a_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("no_such_dir").join("chart.png");
        let err = render_chart(&sample_aggregate(), &dest).unwrap_err();
        assert!(matches!(err, RenderError::Persist { .. }));
        assert!(!dest.exists());
    }

    #[test]
    fn empty_aggregate_still_renders() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("empty.png");
        render_chart(&Aggregate::default(), &dest).unwrap();
        assert!(dest.exists());
    }

    #[test]
    fn category_color_depends_on_name_not_position() {
        assert_eq!(color_for("Violent Crime"), color_for("Violent Crime"));
        let direct = color_for("Drug Offenses");
        // Rendering in between must not perturb the assignment.
        let dir = tempfile::tempdir().unwrap();
        render_chart(&sample_aggregate(), &dir.path().join("c.png")).unwrap();
        assert_eq!(color_for("Drug Offenses"), direct);
    }
}

// Console preview of the aggregate, printed before the artifacts are
// generated so a run's numbers can be eyeballed without opening the PDF.
use crate::types::{Aggregate, Header};
use crate::util::format_int;
use tabled::builder::Builder;
use tabled::settings::Style;

/// Print a Markdown table preview of the first `max_rows` entities.
///
/// Columns are dynamic (one per category), so this goes through the
/// `tabled` builder rather than a derived row struct.
pub fn preview_aggregate(header: &Header, agg: &Aggregate, max_rows: usize) {
    if agg.entities.is_empty() {
        println!("(no rows)\n");
        return;
    }

    let mut builder = Builder::default();
    let mut head = vec![header.entity_column.clone()];
    head.extend(agg.categories.iter().cloned());
    builder.push_record(head);

    for (entity, counts) in agg.entities.iter().take(max_rows) {
        let mut row = vec![entity.clone()];
        row.extend(
            agg.categories
                .iter()
                .map(|c| format_int(counts.get(c).copied().unwrap_or(0))),
        );
        builder.push_record(row);
    }

    let mut table = builder.build();
    println!("{}\n", table.with(Style::markdown()));
    if agg.entity_count() > max_rows {
        println!(
            "({} more entities not shown)\n",
            format_int((agg.entity_count() - max_rows) as u64)
        );
    }
}

/// One console line per category total, mirroring the report's SUMMARY.
pub fn print_totals(agg: &Aggregate) {
    for (category, total) in agg.totals() {
        println!("Total {} reported: {}", category, format_int(total));
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::types::RawRecord;

    // The preview functions print rather than return, so the tests cover
    // the data they derive instead of captured stdout.
    #[test]
    fn preview_handles_entities_missing_categories() {
        let header = Header {
            entity_column: "Region".to_string(),
            categories: vec!["A".into(), "B".into()],
        };
        let rows = vec![RawRecord {
            row: 1,
            entity: "X".to_string(),
            values: vec!["5".into(), "".into()],
        }];
        let agg = aggregate(&header, &rows).unwrap();
        // Must not panic on the zero-filled column.
        preview_aggregate(&header, &agg, 10);
        print_totals(&agg);
    }

    #[test]
    fn preview_of_empty_aggregate_does_not_panic() {
        let header = Header {
            entity_column: "Region".to_string(),
            categories: vec![],
        };
        preview_aggregate(&header, &Aggregate::default(), 10);
    }
}

// Folding raw records into per-entity per-category totals.
use crate::error::MalformedRecordError;
use crate::types::{Aggregate, Header, RawRecord};
use crate::util::parse_count;
use indexmap::IndexMap;

/// Fold raw rows into an [`Aggregate`].
///
/// Single pass, O(rows) time, O(entities x categories) space. Accumulation
/// is additive per (entity, category): repeated entities sum rather than
/// overwrite. Entity order in the result is first-seen order in `rows`,
/// which downstream chart clusters and report sections rely on.
///
/// An empty cell counts as zero (a wholly absent value is not an error),
/// but any non-empty field that does not parse as a non-negative integer
/// aborts with [`MalformedRecordError`] naming the row and column. Silent
/// skipping is not an option here: a dropped row would corrupt the totals.
pub fn aggregate(header: &Header, rows: &[RawRecord]) -> Result<Aggregate, MalformedRecordError> {
    let mut entities: IndexMap<String, IndexMap<String, u64>> = IndexMap::new();

    for record in rows {
        if record.entity.is_empty() {
            return Err(MalformedRecordError {
                row: record.row,
                field: header.entity_column.clone(),
                value: String::new(),
            });
        }

        let counts = entities.entry(record.entity.clone()).or_default();
        for (category, raw) in header.categories.iter().zip(&record.values) {
            let value = if raw.trim().is_empty() {
                0
            } else {
                parse_count(raw).ok_or_else(|| MalformedRecordError {
                    row: record.row,
                    field: category.clone(),
                    value: raw.trim().to_string(),
                })?
            };
            *counts.entry(category.clone()).or_insert(0) += value;
        }
    }

    Ok(Aggregate {
        categories: header.categories.clone(),
        entities,
    })
}

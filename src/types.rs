// Core data model for the aggregation-and-report pipeline.
use indexmap::IndexMap;

/// One raw input row, exactly as read from the record source.
///
/// `values` is parallel to [`Header::categories`]; rows shorter than the
/// header are padded with empty strings by the loader. Transient: consumed
/// by the aggregator and dropped.
#[derive(Debug, Clone)]
pub struct RawRecord {
    /// 1-based data-row index (the header row is not counted).
    pub row: usize,
    pub entity: String,
    pub values: Vec<String>,
}

/// Parsed header row: one entity-identifier column followed by the
/// category columns, in file order.
#[derive(Debug, Clone)]
pub struct Header {
    pub entity_column: String,
    pub categories: Vec<String>,
}

/// The completed aggregation: per-entity per-category totals.
///
/// Entity iteration order is first-seen order in the record source, and
/// each entity's category map preserves first-seen category order; both
/// the tabular report section and the chart iterate in this order so the
/// two stay visually aligned. Built once per run and treated as read-only
/// afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregate {
    /// All categories observed in the input, in header order.
    pub categories: Vec<String>,
    /// Entity name -> category name -> accumulated count.
    pub entities: IndexMap<String, IndexMap<String, u64>>,
}

impl Aggregate {
    /// Per-category sums across all entities, in category order.
    ///
    /// Computed from the completed aggregate at summary time; never cached
    /// mid-pipeline, so it always reflects the final totals.
    pub fn totals(&self) -> IndexMap<String, u64> {
        let mut totals: IndexMap<String, u64> = IndexMap::new();
        for category in &self.categories {
            let sum = self
                .entities
                .values()
                .map(|counts| counts.get(category).copied().unwrap_or(0))
                .sum();
            totals.insert(category.clone(), sum);
        }
        totals
    }

    /// Largest single (entity, category) count, used to scale the chart.
    pub fn max_count(&self) -> u64 {
        self.entities
            .values()
            .flat_map(|counts| counts.values().copied())
            .max()
            .unwrap_or(0)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }
}

//! Collapses fine-grained dispatch stall columns into the coarse
//! topdown buckets, gem5 and Xiangshan flavors.

use super::report::Row;
use once_cell::sync::Lazy;
use stats::{Category, StallReason};
use std::collections::HashMap;
use std::str::FromStr;

/// Identity columns that survive merging untouched.
pub const KEEP_COLUMNS: &[&str] = &["cpi", "point", "bmk", "workload"];

/// What happens to a column during the coarse merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Keep,
    Drop,
    Merge(Category),
}

/// gem5 column disposition. Already-merged bucket names map onto
/// themselves so re-applying the merge is a no-op.
#[must_use]
pub fn gem5_disposition(column: &str) -> Disposition {
    if KEEP_COLUMNS.contains(&column) {
        return Disposition::Keep;
    }
    if let Ok(category) = Category::from_str(column) {
        return Disposition::Merge(category);
    }
    match StallReason::from_str(column) {
        Ok(reason) => match reason.category() {
            Some(category) => Disposition::Merge(category),
            None => Disposition::Drop,
        },
        Err(_) => Disposition::Drop,
    }
}

/// Coarse bucket per Xiangshan dispatch bubble counter.
static XS_CATEGORIES: Lazy<HashMap<&'static str, Category>> = Lazy::new(|| {
    use Category::*;
    HashMap::from([
        ("NoStall", Base),
        ("OverrideBubble", Frontend),
        ("FtqFullStall", Frontend),
        ("ICacheMissBubble", Frontend),
        ("ITLBMissBubble", Frontend),
        ("FetchFragBubble", Frontend),
        ("FtqUpdateBubble", BadSpec),
        ("TAGEMissBubble", BadSpec),
        ("SCMissBubble", BadSpec),
        ("ITTAGEMissBubble", BadSpec),
        ("RASMissBubble", BadSpec),
        ("BTBMissBubble", BadSpec),
        ("MemVioRedirectBubble", BadSpec),
        ("FlushedInsts", BadSpec),
        ("LoadVioReplayStall", BadSpec),
        ("ControlRecoveryStall", BadSpec),
        ("MemVioRecoveryStall", BadSpec),
        ("OtherRecoveryStall", BadSpec),
        ("DivStall", Core),
        ("IntNotReadyStall", Core),
        ("FPNotReadyStall", Core),
        ("OtherCoreStall", Core),
        ("MemNotReadyStall", Load),
        ("LoadTLBStall", Load),
        ("LoadL1Stall", Load),
        ("LoadL2Stall", Load),
        ("LoadL3Stall", Load),
        ("LoadMemStall", Load),
        ("LoadMSHRReplayStall", Load),
        ("StoreStall", Store),
        ("AtomicStall", Misc),
        ("OtherRedirectBubble", Misc),
    ])
});

#[must_use]
pub fn xs_disposition(column: &str) -> Disposition {
    if KEEP_COLUMNS.contains(&column) {
        return Disposition::Keep;
    }
    if let Ok(category) = Category::from_str(column) {
        return Disposition::Merge(category);
    }
    match XS_CATEGORIES.get(column) {
        Some(category) => Disposition::Merge(*category),
        None => Disposition::Drop,
    }
}

/// Applies the coarse merge to one row: kept columns copied, mapped
/// columns accumulated into their bucket, the rest dropped.
#[must_use]
pub fn merge_row(row: &Row, disposition: impl Fn(&str) -> Disposition) -> Row {
    let mut merged = Row {
        labels: row.labels.clone(),
        values: indexmap::IndexMap::new(),
    };
    for (column, value) in &row.values {
        match disposition(column) {
            Disposition::Keep => {
                merged.values.insert(column.clone(), *value);
            }
            Disposition::Merge(category) => {
                let bucket: &'static str = category.into();
                *merged.values.entry(bucket.to_string()).or_insert(0.0) += value;
            }
            Disposition::Drop => {}
        }
    }
    merged
}

pub fn merge(rows: &[Row], disposition: impl Fn(&str) -> Disposition + Copy) -> Vec<Row> {
    rows.iter().map(|row| merge_row(row, disposition)).collect()
}

/// Caps the Base bucket at the slice instruction count and moves the
/// difference into BadSpec. Retired slots beyond one per committed
/// instruction are squashed work, so they count as bad speculation.
#[must_use]
pub fn attribute_base_excess(row: &Row, instructions: f64) -> Row {
    let base: &'static str = Category::Base.into();
    let bad_spec: &'static str = Category::BadSpec.into();
    let mut adjusted = row.clone();
    let Some(value) = adjusted.values.get_mut(base) else {
        return adjusted;
    };
    let excess = *value - instructions;
    *value = instructions;
    *adjusted.values.entry(bad_spec.to_string()).or_insert(0.0) += excess;
    adjusted
}

/// Rewrites the coarse bucket columns as percentages of their sum.
#[must_use]
pub fn percentages(row: &Row) -> Row {
    use strum::IntoEnumIterator;
    let buckets: Vec<&'static str> = Category::iter().map(Into::into).collect();
    let total: f64 = row
        .values
        .iter()
        .filter(|(column, _)| buckets.contains(&column.as_str()))
        .map(|(_, value)| value)
        .sum();

    let mut scaled = row.clone();
    if total > 0.0 {
        for (column, value) in &mut scaled.values {
            if buckets.contains(&column.as_str()) {
                *value = *value / total * 100.0;
            }
        }
    }
    scaled
}

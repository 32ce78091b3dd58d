//! Revenue statistics over contract snapshots.
//!
//! Every function here is a pure computation over the slice it is given:
//! no storage, no clock access (callers pass `today`), no caching. The
//! caller decides which snapshot to aggregate, e.g. the active set alone
//! or the active set plus archived contracts for historical series.

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

use crate::contract::{Contract, ServiceType};
use crate::error::CoreError;

/// Default window for the trailing monthly history.
pub const DEFAULT_HISTORY_MONTHS: u32 = 12;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Revenue and contract count for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyStats {
    /// Month label, e.g. `"July 2024"`.
    pub month: String,
    /// Sum of the monthly equivalents of the contracts active that month.
    pub revenue: f64,
    /// Number of contracts active during the month.
    pub contract_count: usize,
}

/// One service type's share of the portfolio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceTypeShare {
    pub service_type: ServiceType,
    /// Number of contracts carrying this service type.
    pub count: usize,
    /// Percentage of all service-type occurrences (a contract counts once
    /// per service type it carries).
    pub percentage: f64,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Total monthly revenue: the sum of each contract's monthly equivalent.
///
/// An empty snapshot yields `0.0`.
pub fn monthly_revenue(contracts: &[Contract]) -> f64 {
    contracts.iter().map(Contract::monthly_equivalent).sum()
}

/// Number of contracts in the snapshot.
pub fn active_contract_count(contracts: &[Contract]) -> usize {
    contracts.len()
}

/// Per-service-type occurrence counts and percentages.
///
/// Sorted descending by count; ties keep first-encountered order. An empty
/// snapshot yields an empty vec rather than dividing by zero.
pub fn service_type_distribution(contracts: &[Contract]) -> Vec<ServiceTypeShare> {
    let mut counts: Vec<(ServiceType, usize)> = Vec::new();
    let mut total: usize = 0;

    for contract in contracts {
        for &service_type in &contract.service_types {
            total += 1;
            match counts.iter_mut().find(|(t, _)| *t == service_type) {
                Some((_, count)) => *count += 1,
                None => counts.push((service_type, 1)),
            }
        }
    }

    if total == 0 {
        return Vec::new();
    }

    // Stable sort keeps first-encountered order among equal counts.
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    counts
        .into_iter()
        .map(|(service_type, count)| ServiceTypeShare {
            service_type,
            count,
            percentage: count as f64 / total as f64 * 100.0,
        })
        .collect()
}

/// Revenue and contract count for each of the trailing `window_months`
/// calendar months ending at `today`'s month, oldest first.
///
/// A contract counts toward a month when its `[start_date, end_date ?? +inf)`
/// interval overlaps the month's inclusive `[first day, last day]` window.
pub fn monthly_history(
    contracts: &[Contract],
    today: NaiveDate,
    window_months: u32,
) -> Vec<MonthlyStats> {
    let mut stats = Vec::with_capacity(window_months as usize);

    for back in (0..window_months).rev() {
        let anchor = today.checked_sub_months(Months::new(back)).unwrap_or(today);
        let (month_start, month_end) = month_bounds(anchor);

        let mut revenue = 0.0;
        let mut contract_count = 0;
        for contract in contracts {
            if contract.active_during(month_start, month_end) {
                revenue += contract.monthly_equivalent();
                contract_count += 1;
            }
        }

        stats.push(MonthlyStats {
            month: month_label(month_start),
            revenue,
            contract_count,
        });
    }

    stats
}

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

/// Render the statistics as CSV: a monthly-history section over the default
/// trailing window, followed by the service-type distribution. Amounts and
/// percentages are written to two decimals.
pub fn export_stats_csv(contracts: &[Contract], today: NaiveDate) -> Result<String, CoreError> {
    let bytes = write_stats_csv(contracts, today)
        .map_err(|e| CoreError::Internal(format!("CSV export failed: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| CoreError::Internal(format!("CSV export produced invalid UTF-8: {e}")))
}

fn write_stats_csv(contracts: &[Contract], today: NaiveDate) -> Result<Vec<u8>, csv::Error> {
    // Flexible: section headers and data rows have different widths.
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    writer.write_record(["Revenue statistics"])?;
    writer.write_record(["Month", "Monthly revenue", "Contracts"])?;
    for stat in monthly_history(contracts, today, DEFAULT_HISTORY_MONTHS) {
        writer.write_record([
            stat.month,
            format!("{:.2}", stat.revenue),
            stat.contract_count.to_string(),
        ])?;
    }

    writer.write_record([""])?;
    writer.write_record(["Service type distribution"])?;
    writer.write_record(["Service type", "Count", "Percentage"])?;
    for share in service_type_distribution(contracts) {
        writer.write_record([
            share.service_type.label().to_string(),
            share.count.to_string(),
            format!("{:.2}%", share.percentage),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

// ---------------------------------------------------------------------------
// Month arithmetic
// ---------------------------------------------------------------------------

/// First and last day of the month containing `anchor`.
fn month_bounds(anchor: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = anchor.with_day(1).unwrap_or(anchor);
    let end = start
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(start);
    (start, end)
}

/// English month label, e.g. `"July 2024"`.
fn month_label(month_start: NaiveDate) -> String {
    month_start.format("%B %Y").to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

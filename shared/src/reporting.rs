//! Period profit reports
//!
//! A report covers one aligned window (a day, an ISO week starting Monday,
//! or a calendar month) split into fixed buckets. Every bucket in the window
//! is present in the output, including those without sales.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::models::SaleMetrics;

/// Length of the reporting window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl ReportPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportPeriod::Daily => "daily",
            ReportPeriod::Weekly => "weekly",
            ReportPeriod::Monthly => "monthly",
        }
    }

    /// Bucket granularity used for this period
    pub fn interval(&self) -> ReportInterval {
        match self {
            ReportPeriod::Daily => ReportInterval::Hour,
            ReportPeriod::Weekly | ReportPeriod::Monthly => ReportInterval::Day,
        }
    }

    /// Aligned window containing `reference`
    pub fn window(&self, reference: NaiveDate) -> DomainResult<ReportWindow> {
        let (start, end) = match self {
            ReportPeriod::Daily => (reference, reference.succ_opt()),
            ReportPeriod::Weekly => {
                let monday =
                    reference - Duration::days(i64::from(reference.weekday().num_days_from_monday()));
                (monday, monday.checked_add_signed(Duration::days(7)))
            }
            ReportPeriod::Monthly => {
                let first = reference.with_day(1).unwrap_or(reference);
                (first, first.checked_add_months(Months::new(1)))
            }
        };
        let end = end.ok_or_else(|| DomainError::validation("date", "Date is out of range"))?;

        Ok(ReportWindow {
            start: start.and_time(NaiveTime::default()),
            end: end.and_time(NaiveTime::default()),
            interval: self.interval(),
        })
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportPeriod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(ReportPeriod::Daily),
            "weekly" => Ok(ReportPeriod::Weekly),
            "monthly" => Ok(ReportPeriod::Monthly),
            other => Err(DomainError::UnknownPeriod(other.to_string())),
        }
    }
}

/// Bucket granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportInterval {
    Hour,
    Day,
}

impl ReportInterval {
    fn step(&self) -> Duration {
        match self {
            ReportInterval::Hour => Duration::hours(1),
            ReportInterval::Day => Duration::days(1),
        }
    }

    fn key_format(&self) -> &'static str {
        match self {
            ReportInterval::Hour => "%Y-%m-%d %H:00",
            ReportInterval::Day => "%Y-%m-%d",
        }
    }

    /// Bucket key a timestamp falls into
    pub fn key(&self, at: NaiveDateTime) -> String {
        at.format(self.key_format()).to_string()
    }
}

/// Half-open `[start, end)` window in UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub interval: ReportInterval,
}

impl ReportWindow {
    pub fn start_utc(&self) -> DateTime<Utc> {
        self.start.and_utc()
    }

    pub fn end_utc(&self) -> DateTime<Utc> {
        self.end.and_utc()
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        at >= self.start && at < self.end
    }

    /// Keys of every bucket in the window, in order
    pub fn bucket_keys(&self) -> Vec<String> {
        let step = self.interval.step();
        let mut keys = Vec::new();
        let mut cursor = self.start;
        while cursor < self.end {
            keys.push(self.interval.key(cursor));
            cursor += step;
        }
        keys
    }
}

/// A sale's timestamp and metrics, as fed into a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportedSale {
    pub date: DateTime<Utc>,
    pub metrics: SaleMetrics,
}

/// Aggregates for one bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportBucket {
    pub period: String,
    pub revenue: Decimal,
    pub cost: Decimal,
    pub profit: Decimal,
    pub sales_count: i64,
}

impl ReportBucket {
    fn empty(period: String) -> Self {
        Self {
            period,
            revenue: Decimal::ZERO,
            cost: Decimal::ZERO,
            profit: Decimal::ZERO,
            sales_count: 0,
        }
    }

    fn add(&mut self, metrics: &SaleMetrics) {
        self.revenue += metrics.revenue;
        self.cost += metrics.cost;
        self.profit += metrics.profit;
        self.sales_count += 1;
    }
}

/// Totals over the whole window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ReportTotals {
    pub revenue: Decimal,
    pub cost: Decimal,
    pub profit: Decimal,
    pub sales_count: i64,
}

/// Profit report for one period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitReport {
    pub period: ReportPeriod,
    pub interval: ReportInterval,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub data: Vec<ReportBucket>,
    pub totals: ReportTotals,
}

/// Bucket `sales` into the window around `reference`. Sales outside the
/// window are ignored.
pub fn build_profit_report(
    period: ReportPeriod,
    reference: NaiveDate,
    sales: &[ReportedSale],
) -> DomainResult<ProfitReport> {
    let window = period.window(reference)?;

    let mut buckets: BTreeMap<String, ReportBucket> = window
        .bucket_keys()
        .into_iter()
        .map(|key| (key.clone(), ReportBucket::empty(key)))
        .collect();

    let mut totals = ReportTotals::default();
    for sale in sales {
        let at = sale.date.naive_utc();
        if !window.contains(at) {
            continue;
        }
        let key = window.interval.key(at);
        buckets
            .entry(key.clone())
            .or_insert_with(|| ReportBucket::empty(key))
            .add(&sale.metrics);

        totals.revenue += sale.metrics.revenue;
        totals.cost += sale.metrics.cost;
        totals.profit += sale.metrics.profit;
        totals.sales_count += 1;
    }

    Ok(ProfitReport {
        period,
        interval: window.interval,
        start: window.start_utc(),
        end: window.end_utc(),
        data: buckets.into_values().collect(),
        totals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_daily_window() {
        let window = ReportPeriod::Daily.window(date(2024, 3, 15)).unwrap();
        assert_eq!(window.start, date(2024, 3, 15).and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(window.end, date(2024, 3, 16).and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(window.bucket_keys().len(), 24);
        assert_eq!(window.bucket_keys()[13], "2024-03-15 13:00");
    }

    #[test]
    fn test_weekly_window_starts_monday() {
        // 2024-03-15 is a Friday
        let window = ReportPeriod::Weekly.window(date(2024, 3, 15)).unwrap();
        assert_eq!(window.start.date(), date(2024, 3, 11));
        assert_eq!(window.end.date(), date(2024, 3, 18));
        assert_eq!(window.bucket_keys().len(), 7);
    }

    #[test]
    fn test_monthly_window_handles_leap_february() {
        let window = ReportPeriod::Monthly.window(date(2024, 2, 10)).unwrap();
        assert_eq!(window.start.date(), date(2024, 2, 1));
        assert_eq!(window.end.date(), date(2024, 3, 1));
        assert_eq!(window.bucket_keys().len(), 29);
    }

    #[test]
    fn test_monthly_window_december_rolls_year() {
        let window = ReportPeriod::Monthly.window(date(2023, 12, 31)).unwrap();
        assert_eq!(window.end.date(), date(2024, 1, 1));
    }

    #[test]
    fn test_sales_folded_into_buckets() {
        let metrics = SaleMetrics::compute(Decimal::new(400, 2), Decimal::new(120, 2), 1);
        let sales = vec![
            ReportedSale { date: Utc.with_ymd_and_hms(2024, 3, 15, 9, 5, 0).unwrap(), metrics },
            ReportedSale { date: Utc.with_ymd_and_hms(2024, 3, 15, 9, 55, 0).unwrap(), metrics },
            ReportedSale { date: Utc.with_ymd_and_hms(2024, 3, 16, 0, 0, 0).unwrap(), metrics },
        ];

        let report = build_profit_report(ReportPeriod::Daily, date(2024, 3, 15), &sales).unwrap();
        let nine = report.data.iter().find(|b| b.period == "2024-03-15 09:00").unwrap();
        assert_eq!(nine.sales_count, 2);
        assert_eq!(nine.revenue, Decimal::new(800, 2));
        assert_eq!(report.totals.sales_count, 2);
        assert_eq!(report.totals.profit, Decimal::new(560, 2));
    }

    #[test]
    fn test_unknown_period() {
        assert!(matches!(
            "yearly".parse::<ReportPeriod>(),
            Err(DomainError::UnknownPeriod(_))
        ));
    }
}

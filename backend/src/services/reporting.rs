//! Profit reporting and CSV export

use chrono::NaiveDate;
use serde::Serialize;
use shared::reporting::{build_profit_report, ProfitReport, ReportPeriod, ReportedSale};
use sqlx::PgPool;

use crate::error::AppResult;
use crate::models::{Sale, SaleRow, SALE_SELECT};
use crate::services::sale::current_sale_metrics;

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

impl ReportingService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Revenue, cost and profit for the period containing `reference`,
    /// bucketed by hour (daily) or by day (weekly, monthly)
    pub async fn profit_report(
        &self,
        period: ReportPeriod,
        reference: NaiveDate,
    ) -> AppResult<ProfitReport> {
        let window = period.window(reference)?;

        let mut conn = self.db.acquire().await?;

        let rows = sqlx::query_as::<_, SaleRow>(&format!(
            "{} WHERE s.date >= $1 AND s.date < $2 ORDER BY s.date",
            SALE_SELECT
        ))
        .bind(window.start_utc())
        .bind(window.end_utc())
        .fetch_all(&mut *conn)
        .await?;

        let in_window: Vec<Sale> = rows.into_iter().map(Sale::from).collect();
        let metrics = current_sale_metrics(&mut conn, &in_window).await?;

        let reported: Vec<ReportedSale> = in_window
            .iter()
            .map(|sale| ReportedSale {
                date: sale.date,
                metrics: metrics.get(&sale.id).copied().unwrap_or_default(),
            })
            .collect();

        Ok(build_profit_report(period, reference, &reported)?)
    }

    /// Serialize records to CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record).map_err(|e| {
                crate::error::AppError::Internal(format!("CSV serialization error: {}", e))
            })?;
        }
        let csv_data = String::from_utf8(wtr.into_inner().map_err(|e| {
            crate::error::AppError::Internal(format!("CSV writer error: {}", e))
        })?)
        .map_err(|e| crate::error::AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}

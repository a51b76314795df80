//! Reporting handlers for profit analytics and export

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use shared::reporting::ReportPeriod;

use crate::error::{AppError, AppResult};
use crate::services::reporting::ReportingService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ProfitReportQuery {
    pub period: Option<String>,
    /// `YYYY-MM-DD`, defaults to today (UTC)
    pub date: Option<String>,
    pub format: Option<String>, // "json" or "csv"
}

/// Get the profit report for a day, week or month
pub async fn get_profit_report(
    State(state): State<AppState>,
    Query(query): Query<ProfitReportQuery>,
) -> AppResult<Response> {
    let period = match query.period.as_deref() {
        Some(value) => value.parse::<ReportPeriod>()?,
        None => ReportPeriod::default(),
    };

    let reference = match query.date.as_deref() {
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map_err(|_| AppError::validation("date", "Date must be formatted YYYY-MM-DD"))?,
        None => Utc::now().date_naive(),
    };

    let service = ReportingService::new(state.db.clone());
    let report = service.profit_report(period, reference).await?;

    match query.format.as_deref() {
        None | Some("json") => Ok(Json(report).into_response()),
        Some("csv") => {
            let csv = ReportingService::export_to_csv(&report.data)?;
            let disposition = format!(
                "attachment; filename=\"profit_{}_{}.csv\"",
                period,
                reference.format("%Y-%m-%d")
            );
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                csv,
            )
                .into_response())
        }
        Some(_) => Err(AppError::validation("format", "Format must be json or csv")),
    }
}

//! report command

use crate::context::Context;
use anyhow::Result;
use chrono::{Days, Local, NaiveDate};
use vitaltrack_cli::output::{format_count, format_macros};
use vitaltrack_cli::{print_json, Status};

/// Days covered when --start is omitted
const DEFAULT_SPAN_DAYS: u64 = 6;

pub async fn run(ctx: &Context, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<()> {
    let (start, end) = resolve_range(start, end, Local::now().date_naive());
    let client = ctx.client()?;
    let report = client.reports().comprehensive(start, end).await?;

    if ctx.format.is_json() {
        print_json(&report)?;
        return Ok(());
    }

    Status::header(&format!("Report {start} to {end}"));
    Status::field(
        "Logged",
        &format_count(report.meals_logged as usize, "meal", "meals"),
    );
    if let Some(avg) = report.average_daily {
        Status::field(
            "Daily average",
            &format_macros(avg.calories, avg.protein, avg.carbs, avg.fat),
        );
    }
    for day in &report.daily {
        let t = day.totals;
        Status::field(&day.date, &format_macros(t.calories, t.protein, t.carbs, t.fat));
    }
    if !report.appointments.is_empty() {
        Status::field(
            "Appointments",
            &format_count(report.appointments.len(), "appointment", "appointments"),
        );
    }
    Ok(())
}

fn resolve_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> (NaiveDate, NaiveDate) {
    let end = end.unwrap_or(today);
    let start = start.unwrap_or_else(|| {
        end.checked_sub_days(Days::new(DEFAULT_SPAN_DAYS))
            .unwrap_or(end)
    });
    (start, end)
}

use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::object::{Cell, Columns};
use tabled::settings::{Alignment, Span, Style};
use tabled::Table;

use amortization_core::amortization::schedule::AmortizationSchedule;
use amortization_core::amortization::summary::ScheduleSummary;
use amortization_core::types::ComputationOutput;

use super::money::{format_money, format_percent, format_years};

const SCHEDULE_HEADERS: [&str; 7] = [
    "Period",
    "Starting Balance",
    "Principal",
    "Cumulative Principal",
    "Interest",
    "Cumulative Interest",
    "Ending Balance",
];

/// Format output as a table using the tabled crate.
///
/// Schedule envelopes get the full amortization table and payment summaries
/// a formatted caption table; anything else falls back to a Field/Value
/// listing of the result.
pub fn print_table(value: &Value, symbol: &str) {
    if let Ok(output) =
        serde_json::from_value::<ComputationOutput<AmortizationSchedule>>(value.clone())
    {
        println!("{}", render_schedule(&output.result, symbol));
        print_warnings(&output.warnings);
        return;
    }
    if let Ok(output) = serde_json::from_value::<ComputationOutput<ScheduleSummary>>(value.clone())
    {
        println!("{}", render_summary(&output.result, symbol));
        print_warnings(&output.warnings);
        return;
    }

    match value.as_object() {
        Some(map) => {
            let result = map.get("result").unwrap_or(value);
            print_flat_object(result);
            if let Some(Value::Array(warnings)) = map.get("warnings") {
                let warnings: Vec<String> = warnings
                    .iter()
                    .filter_map(|w| w.as_str().map(str::to_string))
                    .collect();
                print_warnings(&warnings);
            }
            if let Some(Value::String(meth)) = map.get("methodology") {
                println!("\nMethodology: {}", meth);
            }
        }
        None => println!("{}", value),
    }
}

/// Caption line, e.g. "Payment: $1,264.14 per month at 6.50% for 30 years".
pub fn caption(schedule: &AmortizationSchedule, symbol: &str) -> String {
    summary_caption(&schedule.summary, symbol)
}

fn summary_caption(summary: &ScheduleSummary, symbol: &str) -> String {
    format!(
        "Payment: {} per month at {} for {}",
        format_money(summary.periodic_payment, symbol),
        format_percent(summary.annual_rate_percent),
        format_years(summary.term_years),
    )
}

/// Render the whole schedule from scratch: caption, one row per period and a
/// spanning separator row after every year marker.
pub fn render_schedule(schedule: &AmortizationSchedule, symbol: &str) -> String {
    let mut builder = Builder::default();
    builder.push_record(SCHEDULE_HEADERS);

    let mut separator_rows = Vec::with_capacity(schedule.year_markers.len());
    let mut row = 1;
    for rec in &schedule.periods {
        builder.push_record([
            rec.period.to_string(),
            format_money(rec.starting_balance, symbol),
            format_money(rec.principal_paid, symbol),
            format_money(rec.cumulative_principal_paid, symbol),
            format_money(rec.interest_paid, symbol),
            format_money(rec.cumulative_interest_paid, symbol),
            format_money(rec.ending_balance, symbol),
        ]);
        row += 1;

        if let Some(marker) = schedule.marker_after(rec.period) {
            let mut record = vec![String::new(); SCHEDULE_HEADERS.len()];
            record[0] = marker.label();
            builder.push_record(record);
            separator_rows.push(row);
            row += 1;
        }
    }

    let mut table = builder.build();
    table.with(Style::modern()).with(Alignment::right());
    for r in separator_rows {
        table
            .modify(Cell::new(r, 0), Span::column(SCHEDULE_HEADERS.len() as _))
            .modify(Cell::new(r, 0), Alignment::center());
    }

    format!(
        "{}\n{}\n{}",
        caption(schedule, symbol),
        table,
        totals_line(schedule, symbol)
    )
}

/// Payment summary: the caption line over a table of the headline figures.
pub fn render_summary(summary: &ScheduleSummary, symbol: &str) -> String {
    let rows = [
        ("Payment", format_money(summary.periodic_payment, symbol)),
        ("Principal", format_money(summary.principal, symbol)),
        ("Annual rate", format_percent(summary.annual_rate_percent)),
        ("Term", format_years(summary.term_years)),
        ("Payments", summary.term_periods.to_string()),
        ("Total interest", format_money(summary.total_interest, symbol)),
        ("Total paid", format_money(summary.total_paid, symbol)),
    ];

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (field, value) in rows {
        builder.push_record([field.to_string(), value]);
    }

    let mut table = builder.build();
    table.with(Style::modern());
    table.modify(Columns::single(1), Alignment::right());

    format!("{}\n{}", summary_caption(summary, symbol), table)
}

fn totals_line(schedule: &AmortizationSchedule, symbol: &str) -> String {
    format!(
        "Total interest: {}  Total paid: {}",
        format_money(schedule.summary.total_interest, symbol),
        format_money(schedule.summary.total_paid, symbol),
    )
}

fn print_warnings(warnings: &[String]) {
    if !warnings.is_empty() {
        println!("\nWarnings:");
        for w in warnings {
            println!("  - {}", w);
        }
    }
}

fn print_flat_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        let table = Table::from(builder);
        println!("{}", table);
    } else {
        println!("{}", format_value(value));
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

use serde_json::Value;
use std::io::{self, Write};

use amortization_core::amortization::schedule::AmortizationSchedule;
use amortization_core::types::ComputationOutput;

const SCHEDULE_COLUMNS: [&str; 8] = [
    "period",
    "starting_balance",
    "principal_paid",
    "cumulative_principal_paid",
    "interest_paid",
    "cumulative_interest_paid",
    "ending_balance",
    "year_marker",
];

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let written = match serde_json::from_value::<ComputationOutput<AmortizationSchedule>>(
        value.clone(),
    ) {
        Ok(output) => write_schedule_csv(&mut wtr, &output.result),
        Err(_) => write_field_csv(&mut wtr, value),
    };

    if let Err(e) = written.and_then(|_| wtr.flush().map_err(csv::Error::from)) {
        eprintln!("CSV write error: {}", e);
    }
}

/// One row per period, unrounded, with the year-boundary label where one falls.
pub fn write_schedule_csv<W: Write>(
    wtr: &mut csv::Writer<W>,
    schedule: &AmortizationSchedule,
) -> csv::Result<()> {
    wtr.write_record(SCHEDULE_COLUMNS)?;
    for rec in &schedule.periods {
        let marker = schedule
            .marker_after(rec.period)
            .map(|m| m.label())
            .unwrap_or_default();
        wtr.write_record([
            rec.period.to_string(),
            rec.starting_balance.to_string(),
            rec.principal_paid.to_string(),
            rec.cumulative_principal_paid.to_string(),
            rec.interest_paid.to_string(),
            rec.cumulative_interest_paid.to_string(),
            rec.ending_balance.to_string(),
            marker,
        ])?;
    }
    Ok(())
}

/// Two-column CSV: field, value
fn write_field_csv<W: Write>(wtr: &mut csv::Writer<W>, value: &Value) -> csv::Result<()> {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    wtr.write_record(["field", "value"])?;
    match result {
        Value::Object(map) => {
            for (key, val) in map {
                wtr.write_record([key.as_str(), &format_csv_value(val)])?;
            }
        }
        other => wtr.write_record(["value", &format_csv_value(other)])?,
    }
    Ok(())
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

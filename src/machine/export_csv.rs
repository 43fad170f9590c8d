//! Cascade step breakdown as CSV.

use std::io::Write;

use crate::machine::cascade::CascadeResult;

pub const CASCADE_CSV_HEADER: [&str; 11] = [
    "time_point",
    "items_expired",
    "extraction_speed",
    "skill_check_amount",
    "skill_check_chance",
    "units_completed",
    "units_remaining",
    "events",
    "successful_events",
    "actual_time_taken",
    "early_completion",
];

/// One row per cascade window; expired item names are joined with `;`.
pub fn write_cascade_csv<W: Write>(result: &CascadeResult, writer: W) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(CASCADE_CSV_HEADER)?;
    for step in &result.step_breakdown {
        out.write_record([
            step.time_point.to_string(),
            step.items_expired.join(";"),
            step.stats_at_step.extraction_speed.to_string(),
            step.stats_at_step.skill_check_amount.to_string(),
            step.stats_at_step.skill_check_chance.to_string(),
            step.units_completed.to_string(),
            step.units_remaining.to_string(),
            step.events_this_window.to_string(),
            step.successful_events_this_window.to_string(),
            step.actual_time_taken.to_string(),
            step.early_completion.to_string(),
        ])?;
    }
    out.flush()?;
    Ok(())
}

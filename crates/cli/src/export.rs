use std::io::Write;

use serde::Serialize;

use localmind_core::domain::report::{CompetitorReport, HoursReport, MarketScanReport};
use localmind_core::domain::week::day_name;

pub fn write_json<W: Write, T: Serialize>(mut out: W, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

pub fn write_competitors_csv<W: Write>(out: W, report: &CompetitorReport) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["Name", "Category", "Address", "Distance", "Rating"])?;
    for place in &report.competitors {
        writer.write_record([
            place.name.clone(),
            place.category.clone(),
            place.address.clone(),
            place.distance_m.to_string(),
            place.rating.map_or(String::new(), |r| format!("{r:.1}")),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_opportunities_csv<W: Write>(out: W, report: &MarketScanReport) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["Category", "Score", "Description"])?;
    for o in &report.opportunities {
        writer.write_record([o.category.clone(), format!("{:.1}", o.score), o.description.clone()])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_schedule_csv<W: Write>(out: W, report: &HoursReport) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["Day", "Hours"])?;
    for (day, hours) in report.recommendation.weekly_schedule.iter() {
        writer.write_record([day_name(day), hours])?;
    }
    writer.flush()?;
    Ok(())
}

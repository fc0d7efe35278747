use crate::domain::business::BusinessType;
use crate::domain::place::PlaceRecord;
use crate::domain::report::{
    DayHoursSummary, HoursAnalysis, HoursRecommendation, PeakWindow, WeeklySchedule,
};
use crate::domain::week::{day_name, format_clock, format_hour, WEEK};

/// Opening and closing hour (24h clock, 24 = midnight) for weekdays and weekends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HourPattern {
    weekday: (u32, u32),
    weekend: (u32, u32),
}

fn base_pattern(business_type: BusinessType) -> HourPattern {
    let (weekday, weekend) = match business_type {
        BusinessType::Restaurant => ((8, 22), (9, 23)),
        BusinessType::Retail => ((9, 19), (10, 20)),
        BusinessType::Fitness => ((5, 23), (7, 22)),
        BusinessType::Beauty => ((9, 19), (9, 18)),
        BusinessType::Professional => ((8, 18), (10, 16)),
        BusinessType::Healthcare => ((8, 17), (9, 15)),
        BusinessType::Education => ((8, 20), (9, 17)),
    };
    HourPattern { weekday, weekend }
}

fn adjusted_pattern(business_type: BusinessType) -> HourPattern {
    let mut p = base_pattern(business_type);
    match business_type {
        // Evening dining runs later.
        BusinessType::Restaurant => {
            p.weekday.1 = (p.weekday.1 + 1).min(23);
            p.weekend.1 = (p.weekend.1 + 1).min(24);
        }
        // Pre-work crowd.
        BusinessType::Fitness => {
            p.weekday.0 = p.weekday.0.saturating_sub(1).max(5);
            p.weekend.0 = p.weekend.0.saturating_sub(1).max(6);
        }
        BusinessType::Professional => {
            p.weekend.1 = p.weekend.1.min(17);
        }
        _ => {}
    }
    p
}

fn span(open: u32, close: u32) -> String {
    format!("{} - {}", format_hour(open), format_hour(close))
}

/// Mon-Wed regular, Thursday one hour later, Friday closes on the weekend hour, Sunday opens an
/// hour later and closes two hours earlier than Saturday.
pub fn weekly_schedule(business_type: BusinessType) -> WeeklySchedule {
    let HourPattern {
        weekday: (wd_open, wd_close),
        weekend: (we_open, we_close),
    } = adjusted_pattern(business_type);

    WeeklySchedule::new([
        span(wd_open, wd_close),
        span(wd_open, wd_close),
        span(wd_open, wd_close),
        span(wd_open, wd_close + 1),
        span(wd_open, we_close),
        span(we_open, we_close),
        span(we_open + 1, we_close.saturating_sub(2)),
    ])
}

pub fn peak_hours(business_type: BusinessType) -> Vec<PeakWindow> {
    let windows: &[(&'static str, &'static str)] = match business_type {
        BusinessType::Restaurant => &[
            ("morning", "8:00-10:00"),
            ("lunch", "12:00-14:00"),
            ("evening", "18:00-20:00"),
        ],
        BusinessType::Retail => &[
            ("morning", "10:00-12:00"),
            ("afternoon", "14:00-16:00"),
            ("evening", "17:00-19:00"),
        ],
        BusinessType::Fitness => &[
            ("morning", "6:00-8:00"),
            ("lunch", "12:00-13:00"),
            ("evening", "17:00-20:00"),
        ],
        _ => &[
            ("morning", "9:00-11:00"),
            ("afternoon", "13:00-15:00"),
            ("evening", "17:00-19:00"),
        ],
    };
    windows
        .iter()
        .map(|&(label, window)| PeakWindow { label, window })
        .collect()
}

fn base_insights(business_type: BusinessType) -> [&'static str; 3] {
    match business_type {
        BusinessType::Restaurant => [
            "Extended Friday and Saturday hours capture weekend dining traffic",
            "Thursday evening extension serves the local happy hour market",
            "Sunday hours are set for brunch and weekend leisure dining",
        ],
        BusinessType::Retail => [
            "Weekend hours extended to capture leisure shopping traffic",
            "Consistent weekday hours build customer shopping habits",
            "Later Friday closing serves after-work shoppers",
        ],
        BusinessType::Fitness => [
            "Early morning opening captures the pre-work fitness crowd",
            "Extended evening hours serve after-work members",
            "Weekend hours fit flexible fitness schedules",
        ],
        _ => [
            "Hours follow typical demand for this kind of business",
            "Schedule balances customer convenience with operating cost",
            "Weekend hours are shortened to match lower weekend demand",
        ],
    }
}

/// Count of places reporting hours and their mean closing time, if any do.
fn mean_close(places: &[PlaceRecord]) -> Option<(usize, u32)> {
    let mut reporting = 0usize;
    let mut closes: Vec<u32> = Vec::new();
    for hours in places.iter().filter_map(|p| p.hours.as_ref()) {
        reporting += 1;
        closes.extend(hours.iter().map(|(_, range)| range.close_minutes));
    }
    if closes.is_empty() {
        return None;
    }
    Some((reporting, mean_minutes(&closes)))
}

fn mean_minutes(values: &[u32]) -> u32 {
    let sum: u64 = values.iter().map(|v| u64::from(*v)).sum();
    (sum as f64 / values.len() as f64).round() as u32
}

/// Fixed insights for the business type plus one drawn from what nearby places report.
pub fn recommend(business_type: BusinessType, places: &[PlaceRecord]) -> HoursRecommendation {
    let mut insights: Vec<String> = base_insights(business_type)
        .iter()
        .map(|s| s.to_string())
        .collect();

    if let Some((reporting, close)) = mean_close(places) {
        insights.push(format!(
            "{reporting} nearby competitors publish hours and typically close around {}",
            format_clock(close)
        ));
    }

    HoursRecommendation {
        weekly_schedule: weekly_schedule(business_type),
        insights,
        peak_hours: peak_hours(business_type),
    }
}

pub fn analyze_local_hours(places: &[PlaceRecord]) -> HoursAnalysis {
    let with_hours: Vec<_> = places.iter().filter_map(|p| p.hours.as_ref()).collect();

    let days = WEEK
        .iter()
        .filter_map(|day| {
            let ranges: Vec<_> = with_hours.iter().filter_map(|h| h.get(*day)).collect();
            if ranges.is_empty() {
                return None;
            }
            let opens: Vec<u32> = ranges.iter().map(|r| r.open_minutes).collect();
            let closes: Vec<u32> = ranges.iter().map(|r| r.close_minutes).collect();
            Some(DayHoursSummary {
                day: day_name(*day),
                avg_open: format_clock(mean_minutes(&opens)),
                avg_close: format_clock(mean_minutes(&closes)),
                earliest_open: format_clock(opens.iter().copied().min().unwrap_or_default()),
                latest_close: format_clock(closes.iter().copied().max().unwrap_or_default()),
                sample_size: ranges.len(),
            })
        })
        .collect();

    HoursAnalysis {
        days,
        sample_size: with_hours.len(),
    }
}

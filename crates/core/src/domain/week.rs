use chrono::Weekday;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Calendar order used for every weekly structure in responses.
pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Maps the upstream day number (1 = Monday .. 7 = Sunday).
pub fn weekday_from_number(n: u8) -> Option<Weekday> {
    match n {
        1..=7 => Some(WEEK[(n - 1) as usize]),
        _ => None,
    }
}

/// 12-hour clock rendering of minutes past midnight; values past midnight wrap.
pub fn format_clock(minutes: u32) -> String {
    let m = minutes % MINUTES_PER_DAY;
    let (hour, minute) = (m / 60, m % 60);
    match hour {
        0 => format!("12:{minute:02} AM"),
        1..=11 => format!("{hour}:{minute:02} AM"),
        12 => format!("12:{minute:02} PM"),
        _ => format!("{}:{minute:02} PM", hour - 12),
    }
}

pub fn format_hour(hour: u32) -> String {
    format_clock(hour * 60)
}

use crate::domain::place::{OpenHours, PlaceRecord, TimeRange};
use crate::domain::week::{weekday_from_number, MINUTES_PER_DAY};
use crate::places::types::{FsqHours, FsqPlace};

const FALLBACK_CATEGORY: &str = "Other";

// Order matters: the first matching key wins.
const CATEGORY_MAPPINGS: &[(&str, &str)] = &[
    ("fast food", "Fast Food"),
    ("pizza", "Pizza Restaurant"),
    ("pizzeria", "Pizza Restaurant"),
    ("coffee", "Coffee Shop"),
    ("cafe", "Coffee Shop"),
    ("café", "Coffee Shop"),
    ("restaurant", "Restaurant"),
    ("gym", "Fitness Center"),
    ("fitness", "Fitness Center"),
    ("salon", "Beauty Salon"),
    ("spa", "Beauty Salon"),
    ("clinic", "Healthcare"),
    ("doctor", "Healthcare"),
];

const ADDRESS_ABBREVIATIONS: &[(&str, &str)] = &[
    ("st", "Street"),
    ("ave", "Avenue"),
    ("blvd", "Boulevard"),
    ("rd", "Road"),
    ("dr", "Drive"),
];

/// Converts one upstream place into a cleaned record. Places without a usable name are dropped.
pub fn into_place_record(place: FsqPlace) -> Option<PlaceRecord> {
    let name = clean_text(place.name.as_deref().unwrap_or_default());
    if name.is_empty() {
        return None;
    }

    let category = place
        .categories
        .first()
        .map(|c| standardize_category(&c.name))
        .unwrap_or_else(|| FALLBACK_CATEGORY.to_string());

    let address = place
        .location
        .as_ref()
        .and_then(|l| l.formatted_address.as_deref().or(l.address.as_deref()))
        .map(clean_address)
        .unwrap_or_default();

    let distance_m = place
        .distance
        .filter(|d| d.is_finite())
        .map(|d| d.max(0.0).round() as u32)
        .unwrap_or(0);

    let rating = place
        .rating
        .filter(|r| r.is_finite())
        .map(|r| r.clamp(0.0, 10.0));

    Some(PlaceRecord {
        id: place.fsq_id,
        name,
        category,
        distance_m,
        address,
        hours: place.hours.as_ref().and_then(convert_hours),
        rating,
    })
}

/// Collapses whitespace and strips characters that never belong in a display name.
pub fn clean_text(text: &str) -> String {
    let filtered: String = text
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || "-.,'&#/".contains(*c))
        .collect();
    filtered.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn clean_address(address: &str) -> String {
    clean_text(address)
        .split(' ')
        .map(|word| {
            let bare = word.trim_end_matches(['.', ',']);
            let tail = &word[bare.len()..];
            match ADDRESS_ABBREVIATIONS
                .iter()
                .find(|(abbr, _)| bare.eq_ignore_ascii_case(abbr))
            {
                // A trailing period belongs to the abbreviation, a comma stays.
                Some((_, full)) => format!("{full}{}", tail.trim_start_matches('.')),
                None => word.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn standardize_category(category: &str) -> String {
    let cleaned = clean_text(category);
    if cleaned.is_empty() {
        return FALLBACK_CATEGORY.to_string();
    }

    let lower = cleaned.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    let hit = CATEGORY_MAPPINGS.iter().find(|(key, _)| {
        if key.contains(' ') {
            lower.contains(*key)
        } else {
            words
                .iter()
                .any(|w| *w == *key || w.strip_suffix('s') == Some(*key))
        }
    });

    match hit {
        Some((_, standard)) => standard.to_string(),
        None => cleaned,
    }
}

fn convert_hours(hours: &FsqHours) -> Option<OpenHours> {
    let mut out = OpenHours::default();
    for entry in &hours.regular {
        let Some(day) = weekday_from_number(entry.day) else {
            continue;
        };
        let (Some(open), Some(close)) = (parse_hhmm(&entry.open), parse_hhmm(&entry.close)) else {
            continue;
        };
        // Closing at or before opening means the place closes after midnight.
        let close = if close <= open && close < MINUTES_PER_DAY {
            close + MINUTES_PER_DAY
        } else {
            close
        };
        out.set(
            day,
            TimeRange {
                open_minutes: open,
                close_minutes: close,
            },
        );
    }

    (!out.is_empty()).then_some(out)
}

/// `"0930"` → 570, `"+0200"` → 1560 (next day).
pub fn parse_hhmm(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    let (next_day, digits) = match raw.strip_prefix('+') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let hour: u32 = digits[..2].parse().ok()?;
    let minute: u32 = digits[2..].parse().ok()?;
    if hour > 24 || minute > 59 || (hour == 24 && minute != 0) {
        return None;
    }

    let minutes = hour * 60 + minute;
    Some(if next_day {
        minutes + MINUTES_PER_DAY
    } else {
        minutes
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::places::types::SearchResponse;
    use chrono::Weekday;
    use serde_json::json;

    #[test]
    fn converts_upstream_place() {
        let v = json!({
            "results": [
                {
                    "fsq_id": "4b0588",
                    "name": "  Downtown   Cafe ",
                    "categories": [{"id": 13035, "name": "Coffee Shop"}],
                    "location": {"formatted_address": "123 Main St., Austin, TX 78701"},
                    "distance": 249.6,
                    "rating": 8.4,
                    "hours": {
                        "display": "Mon 8:00 AM-10:00 PM",
                        "regular": [
                            {"day": 1, "open": "0800", "close": "2200"},
                            {"day": 6, "open": "1800", "close": "+0200"}
                        ]
                    }
                }
            ]
        });

        let parsed: SearchResponse = serde_json::from_value(v).unwrap();
        let place = into_place_record(parsed.results.into_iter().next().unwrap()).unwrap();

        assert_eq!(place.id, "4b0588");
        assert_eq!(place.name, "Downtown Cafe");
        assert_eq!(place.category, "Coffee Shop");
        assert_eq!(place.address, "123 Main Street, Austin, TX 78701");
        assert_eq!(place.distance_m, 250);
        assert_eq!(place.rating, Some(8.4));

        let hours = place.hours.unwrap();
        assert_eq!(
            hours.get(Weekday::Mon),
            Some(TimeRange {
                open_minutes: 480,
                close_minutes: 1320
            })
        );
        assert_eq!(hours.get(Weekday::Sat).unwrap().close_minutes, 26 * 60);
        assert_eq!(hours.get(Weekday::Sun), None);
    }

    #[test]
    fn drops_nameless_places() {
        let place = FsqPlace {
            fsq_id: "x".to_string(),
            name: Some("  !!! ".to_string()),
            ..Default::default()
        };
        assert!(into_place_record(place).is_none());
        assert!(into_place_record(FsqPlace::default()).is_none());
    }

    #[test]
    fn missing_fields_fall_back() {
        let place = FsqPlace {
            name: Some("Corner Market".to_string()),
            distance: Some(-5.0),
            rating: Some(14.0),
            ..Default::default()
        };
        let record = into_place_record(place).unwrap();
        assert_eq!(record.category, "Other");
        assert_eq!(record.address, "");
        assert_eq!(record.distance_m, 0);
        assert_eq!(record.rating, Some(10.0));
        assert!(record.hours.is_none());
    }

    #[test]
    fn standardizes_common_categories() {
        assert_eq!(standardize_category("Café"), "Coffee Shop");
        assert_eq!(standardize_category("Pizza Place"), "Pizza Restaurant");
        assert_eq!(standardize_category("Fast Food Restaurant"), "Fast Food");
        assert_eq!(standardize_category("Gym / Fitness Center"), "Fitness Center");
        assert_eq!(standardize_category("Spanish Restaurant"), "Restaurant");
        assert_eq!(standardize_category("Pet Store"), "Pet Store");
        assert_eq!(standardize_category(""), "Other");
    }

    #[test]
    fn parses_hhmm() {
        assert_eq!(parse_hhmm("0930"), Some(570));
        assert_eq!(parse_hhmm("2400"), Some(1440));
        assert_eq!(parse_hhmm("+0100"), Some(1500));
        assert_eq!(parse_hhmm("930"), None);
        assert_eq!(parse_hhmm("2560"), None);
        assert_eq!(parse_hhmm("ab12"), None);
    }

    #[test]
    fn expands_address_abbreviations() {
        assert_eq!(clean_address("456 Oak Ave"), "456 Oak Avenue");
        assert_eq!(clean_address("9 Elm Rd., Boston"), "9 Elm Road, Boston");
        assert_eq!(clean_address("1 Stanley Blvd"), "1 Stanley Boulevard");
    }
}

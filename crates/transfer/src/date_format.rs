//! Renders build timestamps through `SimpleDateFormat`-style patterns.
//!
//! Letters `G y Y M L w W D d F E u a H k K h m s S z Z X` are fields; text
//! in single quotes is literal and `''` is a quote. Every other ASCII letter
//! is rejected. The build time carries no zone, so it is rendered as UTC.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, Timelike, Weekday};

use crate::TransferError;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Formats `time` using `pattern`.
pub fn format_build_time(pattern: &str, time: &NaiveDateTime) -> Result<String, TransferError> {
    let bad = |reason: String| TransferError::BadDateFormat {
        pattern: pattern.to_string(),
        reason,
    };

    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            if chars.get(i + 1) == Some(&'\'') {
                out.push('\'');
                i += 2;
                continue;
            }
            // Quoted literal; '' inside it is an escaped quote.
            i += 1;
            loop {
                match chars.get(i) {
                    None => return Err(bad("unterminated quote".into())),
                    Some('\'') if chars.get(i + 1) == Some(&'\'') => {
                        out.push('\'');
                        i += 2;
                    }
                    Some('\'') => {
                        i += 1;
                        break;
                    }
                    Some(&other) => {
                        out.push(other);
                        i += 1;
                    }
                }
            }
            continue;
        }

        if !c.is_ascii_alphabetic() {
            out.push(c);
            i += 1;
            continue;
        }

        let mut count = 1;
        while chars.get(i + count) == Some(&c) {
            count += 1;
        }
        i += count;

        render_field(&mut out, c, count, time)
            .ok_or_else(|| bad(format!("illegal pattern character '{c}'")))?;
    }

    Ok(out)
}

fn pad(out: &mut String, value: i64, width: usize) {
    if value < 0 {
        out.push('-');
    }
    out.push_str(&format!("{:0width$}", value.unsigned_abs(), width = width));
}

fn text(out: &mut String, full: &str, count: usize) {
    if count >= 4 {
        out.push_str(full);
    } else {
        out.extend(full.chars().take(3));
    }
}

fn weekday_name(day: Weekday) -> &'static str {
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

/// Week-based year and week of year with weeks starting on Sunday and the
/// week holding January 1st as week 1.
fn sunday_week(date: NaiveDate) -> Option<(i32, u32)> {
    let next_jan1 = NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)?;
    let next_week_start =
        next_jan1.checked_sub_days(Days::new(u64::from(next_jan1.weekday().num_days_from_sunday())))?;
    if date >= next_week_start {
        return Some((date.year() + 1, 1));
    }
    let jan1 = NaiveDate::from_ymd_opt(date.year(), 1, 1)?;
    let offset = jan1.weekday().num_days_from_sunday();
    Some((date.year(), (date.ordinal0() + offset) / 7 + 1))
}

/// Writes one field. Returns `None` for an unknown pattern letter.
fn render_field(out: &mut String, letter: char, count: usize, time: &NaiveDateTime) -> Option<()> {
    let date = time.date();
    match letter {
        'G' => out.push_str(if date.year() > 0 { "AD" } else { "BC" }),
        'y' | 'Y' => {
            let year = if letter == 'y' {
                date.year()
            } else {
                sunday_week(date)?.0
            };
            if count == 2 {
                pad(out, i64::from(year.rem_euclid(100)), 2);
            } else {
                pad(out, i64::from(year), count);
            }
        }
        'M' | 'L' => {
            let month = date.month();
            if count >= 3 {
                text(out, MONTHS[month as usize - 1], count);
            } else {
                pad(out, i64::from(month), count);
            }
        }
        'w' => pad(out, i64::from(sunday_week(date)?.1), count),
        'W' => {
            // Weeks start on Sunday; the week holding the 1st is week 1.
            let first = date.with_day(1)?;
            let offset = first.weekday().num_days_from_sunday();
            pad(out, i64::from((date.day() - 1 + offset) / 7 + 1), count);
        }
        'D' => pad(out, i64::from(date.ordinal()), count),
        'd' => pad(out, i64::from(date.day()), count),
        'F' => pad(out, i64::from((date.day() - 1) / 7 + 1), count),
        'E' => text(out, weekday_name(date.weekday()), count),
        'u' => pad(out, i64::from(date.weekday().number_from_monday()), count),
        'a' => out.push_str(if time.hour() < 12 { "AM" } else { "PM" }),
        'H' => pad(out, i64::from(time.hour()), count),
        'k' => {
            let hour = if time.hour() == 0 { 24 } else { time.hour() };
            pad(out, i64::from(hour), count);
        }
        'K' => pad(out, i64::from(time.hour() % 12), count),
        'h' => {
            let hour = match time.hour() % 12 {
                0 => 12,
                h => h,
            };
            pad(out, i64::from(hour), count);
        }
        'm' => pad(out, i64::from(time.minute()), count),
        's' => pad(out, i64::from(time.second()), count),
        'S' => pad(out, i64::from(time.nanosecond() / 1_000_000), count),
        'z' => out.push_str(if count >= 4 {
            "Coordinated Universal Time"
        } else {
            "UTC"
        }),
        'Z' => out.push_str("+0000"),
        'X' => out.push('Z'),
        _ => return None,
    }
    Some(())
}

/*
** This file is a part of Divexml (streaming dive log XML parser)
** Copyright (C) 2025 Gurer Ozen
**
** Divexml is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

//! Attribute value decoders.
//!
//! Every decoder takes the raw attribute text and either returns a typed
//! value or a [DecodeError]. Absence of an attribute is not an error and is
//! handled by the callers with `Option`.

mod error;

use chrono::Local;
use chrono::NaiveDate;
use chrono::NaiveTime;
use chrono::TimeZone;

pub use error::DecodeError;

/// Decoded reals whose magnitude is at or below this are exactly zero.
pub const ZERO_EPSILON: f64 = 1e-6;

/// Unit suffixes used by the Subsurface dialect.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Unit {
    Meters,
    Celsius,
    Bar,
    Minutes,
    Liters,
}

impl Unit {
    pub fn suffix(&self) -> &'static str {
        match self {
            Unit::Meters => " m",
            Unit::Celsius => " C",
            Unit::Bar => " bar",
            Unit::Minutes => " min",
            Unit::Liters => " l",
        }
    }
}

fn non_empty(s: &str) -> Result<&str, DecodeError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(DecodeError::Empty);
    }
    Ok(s)
}

pub fn normalize(value: f64) -> f64 {
    if value.abs() <= ZERO_EPSILON {
        0.0
    } else {
        value
    }
}

/// Base 10 unsigned integer in the `[0, u32::MAX]` range.
pub fn uint(s: &str) -> Result<u32, DecodeError> {
    let s = non_empty(s)?;
    if !s.bytes().all(|c| c.is_ascii_digit()) {
        return Err(DecodeError::NotNumeric(s.to_string()));
    }
    s.parse::<u32>()
        .map_err(|_| DecodeError::OutOfRange(s.to_string()))
}

/// Reference number of a gas mix or tank, counted from one.
pub fn ordinal(s: &str) -> Result<u32, DecodeError> {
    match uint(s)? {
        0 => Err(DecodeError::OutOfRange(s.trim().to_string())),
        n => Ok(n),
    }
}

/// Finite real number, possibly negative.
pub fn real(s: &str) -> Result<f64, DecodeError> {
    let s = non_empty(s)?;
    let value: f64 = s
        .parse()
        .map_err(|_| DecodeError::NotNumeric(s.to_string()))?;
    if !value.is_finite() {
        return Err(DecodeError::OutOfRange(s.to_string()));
    }
    Ok(normalize(value))
}

/// Finite real number which cannot be negative, such as a depth.
pub fn unsigned_real(s: &str) -> Result<f64, DecodeError> {
    let value = real(s)?;
    if value < 0.0 {
        return Err(DecodeError::OutOfRange(s.trim().to_string()));
    }
    Ok(value)
}

/// Plain percentage number, `"32.5"`, decoded to the `0.0..=1.0` fraction.
///
/// The fraction is read from the decimal text shifted by two places, so it
/// is the closest value to the exact decimal rather than a rounded quotient.
pub fn percent_value(s: &str) -> Result<f64, DecodeError> {
    let value = real(s)?;
    let s = s.trim();
    if !(0.0..=100.0).contains(&value) {
        return Err(DecodeError::OutOfRange(s.to_string()));
    }
    let shifted = match s.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => {
            let exponent = exponent
                .parse::<i32>()
                .ok()
                .and_then(|e| e.checked_sub(2))
                .ok_or_else(|| DecodeError::OutOfRange(s.to_string()))?;
            format!("{}e{}", mantissa, exponent)
        }
        None => format!("{}e-2", s),
    };
    let fraction: f64 = shifted
        .parse()
        .map_err(|_| DecodeError::NotNumeric(s.to_string()))?;
    Ok(normalize(fraction))
}

/// Percentage with the sign, `"32.5%"`, decoded to the `0.0..=1.0` fraction.
pub fn percent(s: &str) -> Result<f64, DecodeError> {
    let s = non_empty(s)?;
    match s.strip_suffix('%') {
        Some(number) => percent_value(number),
        None => Err(DecodeError::MissingUnit {
            value: s.to_string(),
            unit: "%",
        }),
    }
}

/// Percentage with or without the sign.
pub fn percentage(s: &str) -> Result<f64, DecodeError> {
    if s.trim_end().ends_with('%') {
        percent(s)
    } else {
        percent_value(s)
    }
}

/// Duration in `mm:ss` form to seconds. Minutes can have any width, seconds
/// are always two digits.
pub fn duration(s: &str) -> Result<u32, DecodeError> {
    let s = non_empty(s)?;
    let bad = || DecodeError::BadFormat(s.to_string());
    let (minutes, seconds) = s.split_once(':').ok_or_else(bad)?;
    if seconds.len() != 2 || minutes.is_empty() {
        return Err(bad());
    }
    let minutes = uint(minutes).map_err(|_| bad())?;
    let seconds = uint(seconds).map_err(|_| bad())?;
    if seconds >= 60 {
        return Err(DecodeError::OutOfRange(s.to_string()));
    }
    minutes
        .checked_mul(60)
        .and_then(|m| m.checked_add(seconds))
        .ok_or_else(|| DecodeError::OutOfRange(s.to_string()))
}

fn strip_unit(s: &str, unit: Unit) -> Result<&str, DecodeError> {
    let s = non_empty(s)?;
    s.strip_suffix(unit.suffix())
        .ok_or_else(|| DecodeError::MissingUnit {
            value: s.to_string(),
            unit: unit.suffix().trim_start(),
        })
}

/// Time offset either as plain seconds, `"90"`, or in `mm:ss` form.
pub fn seconds(s: &str) -> Result<u32, DecodeError> {
    if s.contains(':') {
        duration(s)
    } else {
        uint(s)
    }
}

/// Physical quantity with a unit suffix, `"12.3 m"`.
pub fn quantity(s: &str, unit: Unit) -> Result<f64, DecodeError> {
    real(strip_unit(s, unit)?)
}

/// Duration with the minutes suffix, `"1:30 min"`, to seconds.
pub fn minutes(s: &str) -> Result<u32, DecodeError> {
    duration(strip_unit(s, Unit::Minutes)?)
}

/// Local `yyyy-mm-dd` date and `hh:mm:ss` time to a Unix timestamp.
///
/// A time which does not exist in the local zone (skipped by a daylight
/// saving change) is out of range; an ambiguous one resolves to the
/// earlier instant.
pub fn datetime(date: &str, time: &str) -> Result<i64, DecodeError> {
    let date = date.trim();
    let time = time.trim();
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| DecodeError::BadFormat(date.to_string()))?;
    let clock = NaiveTime::parse_from_str(time, "%H:%M:%S")
        .map_err(|_| DecodeError::BadFormat(time.to_string()))?;
    Local
        .from_local_datetime(&day.and_time(clock))
        .earliest()
        .map(|dt| dt.timestamp())
        .ok_or_else(|| DecodeError::OutOfRange(format!("{} {}", date, time)))
}

#[cfg(test)]
mod tests;

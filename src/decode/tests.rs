/*
** This file is a part of Divexml (streaming dive log XML parser)
** Copyright (C) 2025 Gurer Ozen
**
** Divexml is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use super::*;

#[test]
fn unsigned_integers() {
    assert_eq!(uint("0"), Ok(0));
    assert_eq!(uint(" 42 "), Ok(42));
    assert_eq!(uint("4294967295"), Ok(u32::MAX));
    assert_eq!(uint(""), Err(DecodeError::Empty));
    assert_eq!(uint("-1"), Err(DecodeError::NotNumeric("-1".into())));
    assert_eq!(uint("12a"), Err(DecodeError::NotNumeric("12a".into())));
    assert_eq!(
        uint("4294967296"),
        Err(DecodeError::OutOfRange("4294967296".into()))
    );
}

#[test]
fn reals() {
    assert_eq!(real("12.5"), Ok(12.5));
    assert_eq!(real("-1.5"), Ok(-1.5));
    assert_eq!(real("0.0000001"), Ok(0.0));
    assert_eq!(real("-0.0000001"), Ok(0.0));
    assert!(matches!(real("inf"), Err(DecodeError::OutOfRange(_))));
    assert!(matches!(real("NaN"), Err(DecodeError::OutOfRange(_))));
    assert!(matches!(real("deep"), Err(DecodeError::NotNumeric(_))));
    assert_eq!(unsigned_real("3"), Ok(3.0));
    assert!(matches!(unsigned_real("-3"), Err(DecodeError::OutOfRange(_))));
}

#[test]
fn percentages() {
    assert_eq!(percent_value("50"), Ok(0.5));
    assert_eq!(percent_value("0"), Ok(0.0));
    assert_eq!(percent("100%"), Ok(1.0));
    assert_eq!(percent("25.0%"), Ok(0.25));
    assert_eq!(percent("12.3456789%"), Ok(0.123456789));
    assert_eq!(percent_value("3.25e1"), Ok(0.325));
    assert!(matches!(percent("101%"), Err(DecodeError::OutOfRange(_))));
    assert!(matches!(percent("-5%"), Err(DecodeError::OutOfRange(_))));
    assert!(matches!(percent("21"), Err(DecodeError::MissingUnit { .. })));
    assert!(matches!(percent("abc%"), Err(DecodeError::NotNumeric(_))));
}

#[test]
fn durations() {
    assert_eq!(duration("0:00"), Ok(0));
    assert_eq!(duration("1:30"), Ok(90));
    assert_eq!(duration("125:05"), Ok(7505));
    assert!(matches!(duration("1:5"), Err(DecodeError::BadFormat(_))));
    assert!(matches!(duration(":30"), Err(DecodeError::BadFormat(_))));
    assert!(matches!(duration("90"), Err(DecodeError::BadFormat(_))));
    assert!(matches!(duration("1:60"), Err(DecodeError::OutOfRange(_))));
    assert_eq!(minutes("45:30 min"), Ok(2730));
    assert!(matches!(minutes("45:30"), Err(DecodeError::MissingUnit { .. })));
}

#[test]
fn lenient_forms() {
    assert_eq!(seconds("90"), Ok(90));
    assert_eq!(seconds("1:30"), Ok(90));
    assert!(matches!(seconds("1:3"), Err(DecodeError::BadFormat(_))));
    assert_eq!(percentage("50%"), Ok(0.5));
    assert_eq!(percentage("50"), Ok(0.5));
    assert!(matches!(percentage("150%"), Err(DecodeError::OutOfRange(_))));
    assert_eq!(ordinal("3"), Ok(3));
    assert_eq!(ordinal("0"), Err(DecodeError::OutOfRange("0".into())));
}

#[test]
fn quantities() {
    assert_eq!(quantity("12.3 m", Unit::Meters), Ok(12.3));
    assert_eq!(quantity("18.0 C", Unit::Celsius), Ok(18.0));
    assert_eq!(quantity("200.0 bar", Unit::Bar), Ok(200.0));
    assert_eq!(quantity("0.0 bar", Unit::Bar), Ok(0.0));
    assert_eq!(
        quantity("12.3", Unit::Meters),
        Err(DecodeError::MissingUnit {
            value: "12.3".into(),
            unit: "m",
        })
    );
    assert!(matches!(
        quantity("deep m", Unit::Meters),
        Err(DecodeError::NotNumeric(_))
    ));
    assert_eq!(quantity("", Unit::Meters), Err(DecodeError::Empty));
}

#[test]
fn datetimes() {
    let t1 = datetime("2017-03-01", "10:00:00").unwrap();
    let t2 = datetime("2017-03-01", "10:45:30").unwrap();
    assert_eq!(t2 - t1, 45 * 60 + 30);
    let next_day = datetime("2017-03-02", "10:00:00").unwrap();
    assert!(next_day > t2);
    assert!(matches!(
        datetime("2017/03/01", "10:00:00"),
        Err(DecodeError::BadFormat(_))
    ));
    assert!(matches!(
        datetime("2017-03-01", "25:00:00"),
        Err(DecodeError::BadFormat(_))
    ));
}

#[test]
fn display() {
    assert_eq!(DecodeError::Empty.to_string(), "empty value");
    assert_eq!(
        DecodeError::MissingUnit {
            value: "12".into(),
            unit: "m"
        }
        .to_string(),
        "missing 'm' unit: '12'"
    );
}

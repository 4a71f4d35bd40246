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
use crate::model::DiveLog;
use crate::model::GasMix;
use crate::model::Pressure;

fn logbook_with(dives: &[fn(&mut Dive)]) -> Logbook {
    let mut logbook = Logbook::default();
    let log = logbook.add_log(DiveLog {
        source: "test.xml".into(),
        ..Default::default()
    });
    for setup in dives {
        let id = logbook.begin_dive(log, None, 0);
        setup(logbook.dive_mut(id));
        logbook.end_dive(id);
    }
    logbook
}

fn mix(num: u32) -> GasMix {
    GasMix {
        num,
        o2: 0.21,
        ..Default::default()
    }
}

#[test]
fn resolved_references() {
    let mut logbook = logbook_with(&[|dive| {
        dive.gasmixes.push(mix(1));
        dive.tanks.push(Tank {
            gasmix: Some(1),
            ..Tank::new(1)
        });
        let index = dive.insert_sample(0);
        dive.set_gaschange(index, 1).unwrap();
        dive.add_pressure(index, Pressure { value: 200.0, tank: 1 });
    }]);
    assert_eq!(logbook.link(), Ok(()));
    assert_eq!(logbook.dive(DiveId(0)).tanks.len(), 1);
    assert!(logbook.diagnostics().is_empty());
}

#[test]
fn tanks_from_pressure_readings() {
    let mut logbook = logbook_with(&[|dive| {
        let index = dive.insert_sample(10);
        dive.add_pressure(index, Pressure { value: 200.0, tank: 9 });
        dive.add_pressure(index, Pressure { value: 150.0, tank: 2 });
        let index = dive.insert_sample(20);
        dive.add_pressure(index, Pressure { value: 190.0, tank: 9 });
    }]);
    assert_eq!(logbook.link(), Ok(()));
    let dive = logbook.dive(DiveId(0));
    assert_eq!(dive.tanks, [Tank::new(9), Tank::new(2)]);
    assert_eq!(dive.samples.len(), 2);
    // Linking again adds nothing
    assert_eq!(logbook.link(), Ok(()));
    assert_eq!(logbook.dive(DiveId(0)).tanks.len(), 2);
}

#[test]
fn unresolved_gas_mixes() {
    let mut logbook = logbook_with(&[
        |dive| {
            dive.gasmixes.push(mix(1));
            let index = dive.insert_sample(0);
            dive.set_depth(index, 3.0).unwrap();
            let index = dive.insert_sample(60);
            dive.set_gaschange(index, 2).unwrap();
        },
        |dive| {
            dive.tanks.push(Tank {
                gasmix: Some(4),
                ..Tank::new(1)
            });
        },
    ]);
    let errors = logbook.link().unwrap_err();
    assert_eq!(
        errors,
        [
            LinkError::UnknownGasChange {
                dive: DiveId(0),
                time: 60,
                mix: 2
            },
            LinkError::UnknownTankMix {
                dive: DiveId(1),
                tank: 1,
                mix: 4
            },
        ]
    );
    assert_eq!(logbook.len(), 2);
    assert_eq!(logbook.dive(DiveId(0)).samples.len(), 2);
    assert!(logbook.has_errors());
    let diag = &logbook.diagnostics()[0];
    assert_eq!(diag.source, "test.xml");
    assert_eq!(
        diag.message,
        "dive 0: gas change at 60s to undeclared gasmix 2"
    );
}

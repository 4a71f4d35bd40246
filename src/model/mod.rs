/*
** This file is a part of Divexml (streaming dive log XML parser)
** Copyright (C) 2025 Gurer Ozen
**
** Divexml is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

//! Dive, sample and divelog records.
//!
//! All records are owned by the [Logbook](crate::Logbook). References between
//! them are ids which index into the logbook collections.

mod kinds;

use std::fmt::Display;

pub use kinds::DecoKind;
pub use kinds::EventKind;
pub use kinds::Mode;
pub use kinds::UnknownName;

macro_rules! record_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
        pub struct $name(pub usize);

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(DiveId, "Sequence id of a dive, in order of appearance across all sources.");
record_id!(GroupId, "Id of a group, in order of creation.");
record_id!(LogId, "Id of a divelog, in order of appearance across all sources.");

/// One logical source device or download session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DiveLog {
    pub id: LogId,
    pub diver: Option<String>,
    pub vendor: Option<String>,
    pub product: Option<String>,
    pub model: Option<String>,
    pub program: Option<String>,
    pub version: Option<String>,
    /// Name of the source file, `-` for the standard input.
    pub source: String,
    /// Line of the `<divelog>` start tag, counted from one.
    pub line: usize,
}

impl DiveLog {
    /// True when both logs describe the same device and diver.
    ///
    /// Fields are compared as they are: a field given in one log but not in
    /// the other makes them different.
    pub fn same_identity(&self, other: &DiveLog) -> bool {
        self.vendor == other.vendor
            && self.product == other.product
            && self.model == other.model
            && self.diver == other.diver
    }

    /// Human readable name of the device and diver, if any is known.
    pub fn label(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.vendor, &self.product, &self.model, &self.diver]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

/// A breathing gas. Fractions are in the `0.0..=1.0` range; zero means the
/// gas was not given.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GasMix {
    pub num: u32,
    pub o2: f64,
    pub n2: f64,
    pub he: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tank {
    pub num: u32,
    pub gasmix: Option<u32>,
    pub size: Option<f64>,
    pub workpressure: Option<f64>,
    pub begin_pressure: Option<f64>,
    pub end_pressure: Option<f64>,
}

impl Tank {
    pub fn new(num: u32) -> Self {
        Tank {
            num,
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Deco {
    pub kind: DecoKind,
    pub depth: Option<f64>,
    pub duration: Option<u32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    pub kind: EventKind,
    pub duration: Option<u32>,
    pub flags: Option<u32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Pressure {
    pub value: f64,
    pub tank: u32,
}

/// Opaque vendor payload attached to a sample.
#[derive(Clone, Debug, PartialEq)]
pub struct Vendor {
    pub kind: u32,
    pub data: String,
}

/// One instant of a dive profile.
///
/// Every optional field is its own slot; a value is present exactly when the
/// slot is `Some` or the list is not empty.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sample {
    /// Seconds since the start of the dive.
    pub time: u32,
    pub depth: Option<f64>,
    pub temp: Option<f64>,
    /// Remaining bottom time in seconds.
    pub rbt: Option<u32>,
    /// CNS oxygen toxicity as a fraction.
    pub cns: Option<f64>,
    pub deco: Option<Deco>,
    pub vendor: Option<Vendor>,
    /// Number of the gas mix switched to.
    pub gaschange: Option<u32>,
    pub pressures: Vec<Pressure>,
    pub events: Vec<Event>,
}

impl Sample {
    pub fn new(time: u32) -> Self {
        Sample {
            time,
            ..Default::default()
        }
    }
}

/// Running minimum and maximum of a reading.
///
/// The first recorded value sets both bounds, later values can only move
/// them outward.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Extrema {
    pub min: f64,
    pub max: f64,
    pub seen: bool,
}

impl Extrema {
    pub fn record(&mut self, value: f64) {
        if self.seen {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        } else {
            self.min = value;
            self.max = value;
            self.seen = true;
        }
    }
}

/// One recorded dive.
///
/// `max_depth`, `max_time`, `temp` and `pressure` only ever grow from the
/// samples, they are never set directly. A `datetime` of zero means the
/// start time is unknown. Dive numbers come from the input and may repeat,
/// use `id` or `fingerprint` to tell dives apart.
#[derive(Clone, Debug, PartialEq)]
pub struct Dive {
    pub id: DiveId,
    pub number: Option<u32>,
    pub datetime: i64,
    /// Duration in seconds as declared by the input.
    pub duration: Option<u32>,
    pub mode: Option<Mode>,
    pub max_depth: f64,
    pub max_time: u32,
    pub temp: Extrema,
    pub pressure: Extrema,
    pub fingerprint: Option<String>,
    pub gasmixes: Vec<GasMix>,
    pub tanks: Vec<Tank>,
    pub samples: Vec<Sample>,
    pub log: LogId,
    pub group: GroupId,
}

/// A per-sample field was given more than once.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Restated;

impl Dive {
    pub fn new(id: DiveId, log: LogId, group: GroupId) -> Self {
        Dive {
            id,
            number: None,
            datetime: 0,
            duration: None,
            mode: None,
            max_depth: 0.0,
            max_time: 0,
            temp: Extrema::default(),
            pressure: Extrema::default(),
            fingerprint: None,
            gasmixes: Vec::new(),
            tanks: Vec::new(),
            samples: Vec::new(),
            log,
            group,
        }
    }

    pub fn is_timed(&self) -> bool {
        self.datetime != 0
    }

    pub fn gasmix(&self, num: u32) -> Option<&GasMix> {
        self.gasmixes.iter().find(|mix| mix.num == num)
    }

    pub fn tank(&self, num: u32) -> Option<&Tank> {
        self.tanks.iter().find(|tank| tank.num == num)
    }

    /// Inserts an empty sample after every sample with the same or an earlier
    /// time and returns its index.
    pub fn insert_sample(&mut self, time: u32) -> usize {
        let index = self.samples.partition_point(|s| s.time <= time);
        self.samples.insert(index, Sample::new(time));
        self.max_time = self.max_time.max(time);
        index
    }

    /// Index of the last sample at exactly `time`, inserting one if needed.
    pub fn sample_at(&mut self, time: u32) -> usize {
        let index = self.samples.partition_point(|s| s.time <= time);
        if index > 0 && self.samples[index - 1].time == time {
            index - 1
        } else {
            self.insert_sample(time)
        }
    }

    pub fn set_depth(&mut self, index: usize, depth: f64) -> Result<(), Restated> {
        let sample = &mut self.samples[index];
        if sample.depth.is_some() {
            return Err(Restated);
        }
        sample.depth = Some(depth);
        self.max_depth = self.max_depth.max(depth);
        Ok(())
    }

    pub fn set_temp(&mut self, index: usize, temp: f64) -> Result<(), Restated> {
        let sample = &mut self.samples[index];
        if sample.temp.is_some() {
            return Err(Restated);
        }
        sample.temp = Some(temp);
        self.temp.record(temp);
        Ok(())
    }

    pub fn set_rbt(&mut self, index: usize, rbt: u32) -> Result<(), Restated> {
        let sample = &mut self.samples[index];
        if sample.rbt.is_some() {
            return Err(Restated);
        }
        sample.rbt = Some(rbt);
        Ok(())
    }

    pub fn set_cns(&mut self, index: usize, cns: f64) -> Result<(), Restated> {
        let sample = &mut self.samples[index];
        if sample.cns.is_some() {
            return Err(Restated);
        }
        sample.cns = Some(cns);
        Ok(())
    }

    pub fn set_gaschange(&mut self, index: usize, mix: u32) -> Result<(), Restated> {
        let sample = &mut self.samples[index];
        if sample.gaschange.is_some() {
            return Err(Restated);
        }
        sample.gaschange = Some(mix);
        Ok(())
    }

    pub fn set_deco(&mut self, index: usize, deco: Deco) -> Result<(), Restated> {
        let sample = &mut self.samples[index];
        if sample.deco.is_some() {
            return Err(Restated);
        }
        sample.deco = Some(deco);
        Ok(())
    }

    pub fn add_pressure(&mut self, index: usize, pressure: Pressure) {
        self.pressure.record(pressure.value);
        self.samples[index].pressures.push(pressure);
    }

    pub fn add_event(&mut self, index: usize, event: Event) {
        self.samples[index].events.push(event);
    }
}

/// A bucket of dives sharing a grouping key.
#[derive(Clone, Debug, PartialEq)]
pub struct Group {
    pub id: GroupId,
    pub name: Option<String>,
    /// Divelog whose identity defines the group when grouping by divelog.
    pub log: Option<LogId>,
    /// Earliest start time of the timed members, zero when none is timed.
    pub min_datetime: i64,
    /// Latest end time (start plus last sample) of the timed members.
    pub max_datetime: i64,
    pub max_depth: f64,
    /// Members in the order of the configured policy.
    pub dives: Vec<DiveId>,
}

impl Group {
    pub fn new(id: GroupId, name: Option<String>, log: Option<LogId>) -> Self {
        Group {
            id,
            name,
            log,
            min_datetime: 0,
            max_datetime: 0,
            max_depth: 0.0,
            dives: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.dives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dives.is_empty()
    }
}

/*
** This file is a part of Divexml (streaming dive log XML parser)
** Copyright (C) 2025 Gurer Ozen
**
** Divexml is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

//! Native dialect output.
//!
//! Each writer is a [Display] adapter, so records can be written with
//! `format!`, `write!` or `to_string()`. What is written parses back to
//! equal records.

use std::fmt::Display;
use std::fmt::Formatter;

use chrono::Local;
use chrono::TimeZone;

use crate::Logbook;
use crate::entities::Escaped;
use crate::model::Dive;
use crate::model::DiveLog;
use crate::model::GroupId;
use crate::model::Sample;

type Result = std::fmt::Result;

/// Fraction written as a percentage.
///
/// The digits are those of the shortest form of the fraction with the
/// decimal point moved, so the text decodes back to the same value.
struct Percent(f64);

impl Display for Percent {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let text = self.0.to_string();
        let (sign, digits) = match text.strip_prefix('-') {
            Some(digits) => ("-", digits),
            None => ("", text.as_str()),
        };
        let (int, frac) = digits.split_once('.').unwrap_or((digits, ""));
        let moved = frac.len().min(2);
        let whole = format!("{}{}{}", int, &frac[..moved], "0".repeat(2 - moved));
        let whole = match whole.trim_start_matches('0') {
            "" => "0",
            trimmed => trimmed,
        };
        let rest = &frac[moved..];
        write!(f, "{}{}", sign, whole)?;
        if !rest.is_empty() {
            write!(f, ".{}", rest)?;
        }
        f.write_str("%")
    }
}

/// Seconds in `m:ss` form.
struct Clock(u32);

impl Display for Clock {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}:{:02}", self.0 / 60, self.0 % 60)
    }
}

fn attr(f: &mut Formatter<'_>, name: &str, value: Option<impl Display>) -> Result {
    match value {
        Some(value) => write!(f, " {}=\"{}\"", name, value),
        None => Ok(()),
    }
}

fn text_attr(f: &mut Formatter<'_>, name: &str, value: &Option<String>) -> Result {
    attr(f, name, value.as_deref().map(Escaped))
}

/// One `<sample>` element with its readings.
pub struct SampleXml<'a>(pub &'a Sample);

impl Display for SampleXml<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let sample = self.0;
        writeln!(f, "<sample time=\"{}\">", Clock(sample.time))?;
        if let Some(depth) = sample.depth {
            writeln!(f, "\t<depth value=\"{}\"/>", depth)?;
        }
        if let Some(temp) = sample.temp {
            writeln!(f, "\t<temp value=\"{}\"/>", temp)?;
        }
        if let Some(rbt) = sample.rbt {
            writeln!(f, "\t<rbt value=\"{}\"/>", Clock(rbt))?;
        }
        if let Some(cns) = sample.cns {
            writeln!(f, "\t<cns value=\"{}\"/>", Percent(cns))?;
        }
        for pressure in &sample.pressures {
            writeln!(
                f,
                "\t<pressure value=\"{}\" tank=\"{}\"/>",
                pressure.value, pressure.tank
            )?;
        }
        if let Some(mix) = sample.gaschange {
            writeln!(f, "\t<gaschange mix=\"{}\"/>", mix)?;
        }
        for event in &sample.events {
            write!(f, "\t<event type=\"{}\"", event.kind)?;
            attr(f, "duration", event.duration.map(Clock))?;
            attr(f, "flags", event.flags)?;
            writeln!(f, "/>")?;
        }
        if let Some(deco) = &sample.deco {
            write!(f, "\t<deco type=\"{}\"", deco.kind)?;
            attr(f, "depth", deco.depth)?;
            attr(f, "duration", deco.duration.map(Clock))?;
            writeln!(f, "/>")?;
        }
        if let Some(vendor) = &sample.vendor {
            writeln!(
                f,
                "\t<vendor type=\"{}\">{}</vendor>",
                vendor.kind,
                Escaped(&vendor.data)
            )?;
        }
        writeln!(f, "</sample>")
    }
}

/// One `<dive>` element with its gas mixes, tanks and samples.
pub struct DiveXml<'a>(pub &'a Dive);

impl Display for DiveXml<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let dive = self.0;
        write!(f, "<dive")?;
        attr(f, "number", dive.number)?;
        if dive.is_timed() {
            if let Some(start) = Local.timestamp_opt(dive.datetime, 0).earliest() {
                attr(f, "date", Some(start.format("%Y-%m-%d")))?;
                attr(f, "time", Some(start.format("%H:%M:%S")))?;
            }
        }
        attr(f, "duration", dive.duration)?;
        attr(f, "mode", dive.mode)?;
        writeln!(f, ">")?;

        if let Some(fingerprint) = &dive.fingerprint {
            writeln!(f, "<fingerprint>{}</fingerprint>", Escaped(fingerprint))?;
        }
        if !dive.gasmixes.is_empty() {
            writeln!(f, "<gasmixes>")?;
            for mix in &dive.gasmixes {
                write!(f, "\t<gasmix num=\"{}\"", mix.num)?;
                for (name, value) in [("o2", mix.o2), ("n2", mix.n2), ("he", mix.he)] {
                    attr(f, name, (value != 0.0).then_some(Percent(value)))?;
                }
                writeln!(f, "/>")?;
            }
            writeln!(f, "</gasmixes>")?;
        }
        if !dive.tanks.is_empty() {
            writeln!(f, "<tanks>")?;
            for tank in &dive.tanks {
                write!(f, "\t<tank num=\"{}\"", tank.num)?;
                attr(f, "gasmix", tank.gasmix)?;
                attr(f, "volume", tank.size)?;
                attr(f, "workpressure", tank.workpressure)?;
                attr(f, "beginpressure", tank.begin_pressure)?;
                attr(f, "endpressure", tank.end_pressure)?;
                writeln!(f, "/>")?;
            }
            writeln!(f, "</tanks>")?;
        }
        if !dive.samples.is_empty() {
            writeln!(f, "<samples>")?;
            for sample in &dive.samples {
                write!(f, "{}", SampleXml(sample))?;
            }
            writeln!(f, "</samples>")?;
        }
        writeln!(f, "</dive>")
    }
}

fn document<'a>(
    f: &mut Formatter<'_>,
    log: Option<&DiveLog>,
    dives: impl Iterator<Item = &'a Dive>,
) -> Result {
    write!(f, "<divelog")?;
    match log {
        Some(log) => {
            text_attr(f, "program", &log.program)?;
            text_attr(f, "version", &log.version)?;
            text_attr(f, "diver", &log.diver)?;
            text_attr(f, "vendor", &log.vendor)?;
            text_attr(f, "product", &log.product)?;
            text_attr(f, "model", &log.model)?;
        }
        None => {
            attr(f, "program", Some(env!("CARGO_PKG_NAME")))?;
            attr(f, "version", Some(env!("CARGO_PKG_VERSION")))?;
        }
    }
    writeln!(f, ">")?;
    writeln!(f, "<dives>")?;
    for dive in dives {
        write!(f, "{}", DiveXml(dive))?;
    }
    writeln!(f, "</dives>")?;
    writeln!(f, "</divelog>")
}

/// The dives of a group as a native document, in group order.
///
/// The divelog attributes are those of the group's divelog when grouping
/// by divelog, otherwise only the writing program is named.
pub struct GroupXml<'a> {
    pub logbook: &'a Logbook,
    pub group: GroupId,
}

impl Display for GroupXml<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let log = self.logbook.group(self.group).log.map(|id| self.logbook.log(id));
        document(f, log, self.logbook.group_dives(self.group))
    }
}

/// All dives of the logbook as one native document, in queue order.
///
/// Dives of several divelogs are merged under a single `<divelog>`, which
/// carries the attributes of the divelog only when there is exactly one.
pub struct LogbookXml<'a>(pub &'a Logbook);

impl Display for LogbookXml<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let log = match self.0.logs() {
            [log] => Some(log),
            _ => None,
        };
        document(f, log, self.0.dives())
    }
}

/*
** This file is a part of Divexml (streaming dive log XML parser)
** Copyright (C) 2025 Gurer Ozen
**
** Divexml is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

//! Element handlers of the Subsurface dialect.
//!
//! Subsurface writes many attributes which have no place in the dive model,
//! so unknown attributes are only reported at debug level here.

use crate::Attribute;
use crate::Severity;
use crate::decode;
use crate::decode::DecodeError;
use crate::decode::Unit;
use crate::model::Deco;
use crate::model::DecoKind;
use crate::model::DiveId;
use crate::model::DiveLog;
use crate::model::Event;
use crate::model::EventKind;
use crate::model::GasMix;
use crate::model::Mode;
use crate::model::Pressure;
use crate::model::Tank;

use super::context::Frame;
use super::context::ParseContext;
use super::context::attribute;

fn meters(s: &str) -> Result<f64, DecodeError> {
    decode::quantity(s, Unit::Meters)
}

fn celsius(s: &str) -> Result<f64, DecodeError> {
    decode::quantity(s, Unit::Celsius)
}

fn bar(s: &str) -> Result<f64, DecodeError> {
    decode::quantity(s, Unit::Bar)
}

fn liters(s: &str) -> Result<f64, DecodeError> {
    decode::quantity(s, Unit::Liters)
}

fn divelog(ctx: &mut ParseContext, attrs: &[Attribute]) -> Frame {
    ctx.check_attributes("divelog", attrs, &["program", "version"], Severity::Debug);
    let log = DiveLog {
        program: attribute(attrs, "program").map(str::to_string),
        version: attribute(attrs, "version").map(str::to_string),
        ..Default::default()
    };
    match ctx.open_log(log) {
        Some(_) => Frame::Log,
        None => Frame::Skipped,
    }
}

fn dive(ctx: &mut ParseContext, attrs: &[Attribute]) -> Frame {
    ctx.check_attributes(
        "dive",
        attrs,
        &[
            "number", "date", "time", "duration", "divesiteid", "rating", "visibility",
            "tags", "sac", "otu", "cns",
        ],
        Severity::Debug,
    );
    let Some(id) = ctx.open_dive(attribute(attrs, "date"), attribute(attrs, "time")) else {
        return Frame::Skipped;
    };
    let number = ctx.decode("dive", attrs, "number", decode::uint);
    let duration = ctx.decode("dive", attrs, "duration", decode::minutes);
    let dive = ctx.dive_mut(id);
    dive.number = number;
    dive.duration = duration;
    Frame::Dive
}

fn divecomputer(ctx: &mut ParseContext, attrs: &[Attribute]) -> Frame {
    ctx.check_attributes(
        "divecomputer",
        attrs,
        &["model", "deviceid", "diveid", "dctype", "last-manual-time"],
        Severity::Debug,
    );
    let Some(id) = ctx.dive_for("divecomputer") else {
        return Frame::Skipped;
    };
    ctx.computers += 1;
    if ctx.computers > 1 {
        ctx.debug("only the first <divecomputer> of a dive is used");
        return Frame::Skipped;
    }
    let mode = match attribute(attrs, "dctype") {
        None => None,
        Some("Freedive") => Some(Mode::FreeDive),
        Some("CCR") | Some("PSCR") => Some(Mode::ClosedCircuit),
        Some("OC") => Some(Mode::OpenCircuit),
        Some(other) => {
            ctx.warn(format!("unknown dive computer type '{}'", other));
            None
        }
    };
    let fingerprint = attribute(attrs, "diveid").map(str::to_string);
    let dive = ctx.dive_mut(id);
    if mode.is_some() {
        dive.mode = mode;
    }
    if dive.fingerprint.is_none() {
        dive.fingerprint = fingerprint;
    }
    Frame::Container
}

/// A cylinder declares both the gas mix and the tank with the same number.
fn cylinder(ctx: &mut ParseContext, attrs: &[Attribute]) -> Frame {
    ctx.check_attributes(
        "cylinder",
        attrs,
        &["size", "workpressure", "description", "o2", "n2", "he", "start", "end", "use", "depth"],
        Severity::Debug,
    );
    let Some(id) = ctx.dive_for("cylinder") else {
        return Frame::Skipped;
    };
    let num = ctx.logbook.dive(id).tanks.len() as u32 + 1;
    let mix = GasMix {
        num,
        o2: ctx.decode("cylinder", attrs, "o2", decode::percent).unwrap_or(0.0),
        n2: ctx.decode("cylinder", attrs, "n2", decode::percent).unwrap_or(0.0),
        he: ctx.decode("cylinder", attrs, "he", decode::percent).unwrap_or(0.0),
    };
    let tank = Tank {
        num,
        gasmix: Some(num),
        size: ctx.decode("cylinder", attrs, "size", liters),
        workpressure: ctx.decode("cylinder", attrs, "workpressure", bar),
        begin_pressure: ctx.decode("cylinder", attrs, "start", bar),
        end_pressure: ctx.decode("cylinder", attrs, "end", bar),
    };
    let dive = ctx.dive_mut(id);
    dive.gasmixes.push(mix);
    dive.tanks.push(tank);
    Frame::Leaf
}

/// Tank number of a `pressureN` attribute. Older files write the first
/// tank as plain `pressure`.
fn pressure_tank(name: &str) -> Option<u32> {
    let digits = name.strip_prefix("pressure")?;
    if digits.is_empty() {
        return Some(1);
    }
    if !digits.bytes().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u32>().ok()?.checked_add(1)
}

/// Flat sample, every reading is an attribute.
fn sample(ctx: &mut ParseContext, attrs: &[Attribute]) -> Frame {
    for attr in attrs {
        let known = [
            "time", "depth", "temp", "rbt", "cns", "ndl", "stoptime", "stopdepth", "in_deco",
            "tts", "heartbeat", "bearing", "po2", "sensor1", "sensor2", "sensor3",
        ];
        if !known.contains(&attr.name.as_str()) && pressure_tank(&attr.name).is_none() {
            ctx.debug(format!("unknown attribute '{}' in <sample>", attr.name));
        }
    }
    let Some(id) = ctx.dive_for("sample") else {
        return Frame::Skipped;
    };
    let Some(time) = ctx.require("sample", attrs, "time", decode::minutes) else {
        return Frame::Skipped;
    };
    let index = ctx.add_sample(id, time, true);
    ctx.sample = Some(index);

    if let Some(depth) = ctx.decode("sample", attrs, "depth", meters) {
        let result = ctx.dive_mut(id).set_depth(index, depth);
        ctx.restatement("depth", result);
    }
    if let Some(temp) = ctx.decode("sample", attrs, "temp", celsius) {
        let result = ctx.dive_mut(id).set_temp(index, temp);
        ctx.restatement("temp", result);
    }
    if let Some(rbt) = ctx.decode("sample", attrs, "rbt", decode::minutes) {
        let result = ctx.dive_mut(id).set_rbt(index, rbt);
        ctx.restatement("rbt", result);
    }
    match ctx.decode("sample", attrs, "cns", decode::percent) {
        Some(cns) if cns > 0.0 => {
            let result = ctx.dive_mut(id).set_cns(index, cns);
            ctx.restatement("cns", result);
        }
        _ => (),
    }
    for attr in attrs {
        let Some(tank) = pressure_tank(&attr.name) else {
            continue;
        };
        match bar(&attr.value) {
            Ok(value) if value > 0.0 => {
                let sample = &ctx.logbook.dive(id).samples[index];
                if sample.pressures.iter().any(|p| p.tank == tank) {
                    ctx.error(format!(
                        "pressure of tank {} given more than once in a sample",
                        tank
                    ));
                    continue;
                }
                ctx.dive_mut(id).add_pressure(index, Pressure { value, tank });
            }
            Ok(_) => (),
            Err(err) => ctx.error(format!("bad '{}' in <sample>: {}", attr.name, err)),
        }
    }
    sample_deco(ctx, attrs, id, index);
    Frame::Sample
}

fn sample_deco(
    ctx: &mut ParseContext,
    attrs: &[Attribute],
    id: DiveId,
    index: usize,
) {
    let ndl = ctx.decode("sample", attrs, "ndl", decode::minutes);
    let stoptime = ctx.decode("sample", attrs, "stoptime", decode::minutes);
    let stopdepth = ctx.decode("sample", attrs, "stopdepth", meters);
    let deco = match (ndl, stoptime, stopdepth) {
        (Some(ndl), _, _) if ndl > 0 => Deco {
            kind: DecoKind::Ndl,
            depth: None,
            duration: Some(ndl),
        },
        (_, None, None) => return,
        (_, duration, depth) => Deco {
            kind: DecoKind::DecoStop,
            depth,
            duration,
        },
    };
    if ctx.logbook.dive(id).mode == Some(Mode::FreeDive) {
        return;
    }
    let result = ctx.dive_mut(id).set_deco(index, deco);
    ctx.restatement("deco", result);
}

/// Events carry their own time and attach to the sample at that time.
fn event(ctx: &mut ParseContext, attrs: &[Attribute]) -> Frame {
    ctx.check_attributes(
        "event",
        attrs,
        &["time", "type", "flags", "name", "value", "cylinder", "divemode"],
        Severity::Debug,
    );
    let Some(id) = ctx.dive_for("event") else {
        return Frame::Skipped;
    };
    let Some(time) = ctx.require("event", attrs, "time", decode::minutes) else {
        return Frame::Skipped;
    };
    if attribute(attrs, "name") == Some("gaschange") {
        if let Some(cylinder) = ctx.decode("event", attrs, "cylinder", decode::uint) {
            let index = ctx.add_sample(id, time, true);
            let result = ctx.dive_mut(id).set_gaschange(index, cylinder.saturating_add(1));
            ctx.restatement("gaschange", result);
            return Frame::Leaf;
        }
    }
    let kind = ctx.require("event", attrs, "type", |s: &str| -> Result<EventKind, DecodeError> {
        let index = decode::uint(s)?;
        EventKind::from_index(index).ok_or_else(|| DecodeError::OutOfRange(s.to_string()))
    });
    let Some(kind) = kind else {
        return Frame::Skipped;
    };
    let event = Event {
        kind,
        duration: None,
        flags: ctx.decode("event", attrs, "flags", decode::uint),
    };
    let index = ctx.add_sample(id, time, true);
    ctx.dive_mut(id).add_event(index, event);
    Frame::Leaf
}

pub(super) fn open(ctx: &mut ParseContext, name: &str, attrs: &[Attribute]) -> Frame {
    match name {
        "divelog" => divelog(ctx, attrs),
        "dives" | "trip" => Frame::Container,
        "settings" | "divesites" => Frame::Skipped,
        "dive" => dive(ctx, attrs),
        "divecomputer" => divecomputer(ctx, attrs),
        "cylinder" => cylinder(ctx, attrs),
        "sample" => sample(ctx, attrs),
        "event" => event(ctx, attrs),
        _ => {
            ctx.debug(format!("unknown element <{}> ignored", name));
            Frame::Unknown
        }
    }
}

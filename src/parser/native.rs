/*
** This file is a part of Divexml (streaming dive log XML parser)
** Copyright (C) 2025 Gurer Ozen
**
** Divexml is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

//! Element handlers of the native dialect.

use crate::Attribute;
use crate::Severity;
use crate::decode;
use crate::model::Deco;
use crate::model::DecoKind;
use crate::model::DiveLog;
use crate::model::Event;
use crate::model::EventKind;
use crate::model::GasMix;
use crate::model::Mode;
use crate::model::Pressure;
use crate::model::Restated;
use crate::model::Tank;

use super::context::Frame;
use super::context::ParseContext;
use super::context::attribute;

fn divelog(ctx: &mut ParseContext, attrs: &[Attribute]) -> Frame {
    ctx.check_attributes(
        "divelog",
        attrs,
        &["program", "version", "diver", "vendor", "product", "model"],
        Severity::Warning,
    );
    let text = |name| attribute(attrs, name).map(str::to_string);
    let log = DiveLog {
        program: text("program"),
        version: text("version"),
        diver: text("diver"),
        vendor: text("vendor"),
        product: text("product"),
        model: text("model"),
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
        &["number", "duration", "date", "time", "mode"],
        Severity::Warning,
    );
    let Some(id) = ctx.open_dive(attribute(attrs, "date"), attribute(attrs, "time")) else {
        return Frame::Skipped;
    };
    let number = ctx.decode("dive", attrs, "number", decode::uint);
    let duration = ctx.decode("dive", attrs, "duration", decode::seconds);
    let mode = match attribute(attrs, "mode").map(str::parse::<Mode>) {
        Some(Ok(mode)) => Some(mode),
        Some(Err(err)) => {
            ctx.warn(err.to_string());
            None
        }
        None => None,
    };
    let dive = ctx.dive_mut(id);
    dive.number = number;
    dive.duration = duration;
    dive.mode = mode;
    Frame::Dive
}

fn fingerprint(ctx: &mut ParseContext, attrs: &[Attribute]) -> Frame {
    ctx.check_attributes("fingerprint", attrs, &[], Severity::Warning);
    let Some(id) = ctx.dive_for("fingerprint") else {
        return Frame::Skipped;
    };
    if ctx.logbook.dive(id).fingerprint.is_some() {
        ctx.error("<fingerprint> given more than once in a dive");
        return Frame::Skipped;
    }
    ctx.text.clear();
    Frame::Fingerprint
}

fn gasmix(ctx: &mut ParseContext, attrs: &[Attribute]) -> Frame {
    ctx.check_attributes("gasmix", attrs, &["num", "o2", "n2", "he"], Severity::Warning);
    let Some(id) = ctx.dive_for("gasmix") else {
        return Frame::Skipped;
    };
    let Some(num) = ctx.require("gasmix", attrs, "num", decode::ordinal) else {
        return Frame::Skipped;
    };
    if ctx.logbook.dive(id).gasmix(num).is_some() {
        ctx.error(format!("gasmix {} declared more than once", num));
        return Frame::Skipped;
    }
    let mix = GasMix {
        num,
        o2: ctx.decode("gasmix", attrs, "o2", decode::percentage).unwrap_or(0.0),
        n2: ctx.decode("gasmix", attrs, "n2", decode::percentage).unwrap_or(0.0),
        he: ctx.decode("gasmix", attrs, "he", decode::percentage).unwrap_or(0.0),
    };
    ctx.dive_mut(id).gasmixes.push(mix);
    Frame::Leaf
}

fn tank(ctx: &mut ParseContext, attrs: &[Attribute]) -> Frame {
    ctx.check_attributes(
        "tank",
        attrs,
        &["num", "gasmix", "volume", "workpressure", "beginpressure", "endpressure"],
        Severity::Warning,
    );
    let Some(id) = ctx.dive_for("tank") else {
        return Frame::Skipped;
    };
    let Some(num) = ctx.require("tank", attrs, "num", decode::ordinal) else {
        return Frame::Skipped;
    };
    if ctx.logbook.dive(id).tank(num).is_some() {
        ctx.error(format!("tank {} declared more than once", num));
        return Frame::Skipped;
    }
    let tank = Tank {
        num,
        gasmix: ctx.decode("tank", attrs, "gasmix", decode::ordinal),
        size: ctx.decode("tank", attrs, "volume", decode::unsigned_real),
        workpressure: ctx.decode("tank", attrs, "workpressure", decode::unsigned_real),
        begin_pressure: ctx.decode("tank", attrs, "beginpressure", decode::unsigned_real),
        end_pressure: ctx.decode("tank", attrs, "endpressure", decode::unsigned_real),
    };
    ctx.dive_mut(id).tanks.push(tank);
    Frame::Leaf
}

fn sample(ctx: &mut ParseContext, attrs: &[Attribute]) -> Frame {
    ctx.check_attributes("sample", attrs, &["time"], Severity::Warning);
    let Some(id) = ctx.dive_for("sample") else {
        return Frame::Skipped;
    };
    let Some(time) = ctx.require("sample", attrs, "time", decode::seconds) else {
        return Frame::Skipped;
    };
    ctx.sample = Some(ctx.add_sample(id, time, false));
    Frame::Sample
}

/// Handles the sample elements with a single `value` attribute.
fn reading(ctx: &mut ParseContext, name: &str, attrs: &[Attribute]) -> Frame {
    ctx.check_attributes(name, attrs, &["value"], Severity::Warning);
    let Some((id, index)) = ctx.sample_for(name) else {
        return Frame::Skipped;
    };
    let result = match name {
        "depth" => ctx
            .require(name, attrs, "value", decode::unsigned_real)
            .map(|depth| ctx.dive_mut(id).set_depth(index, depth)),
        "temp" => ctx
            .require(name, attrs, "value", decode::real)
            .map(|temp| ctx.dive_mut(id).set_temp(index, temp)),
        "rbt" => ctx
            .require(name, attrs, "value", decode::seconds)
            .map(|rbt| ctx.dive_mut(id).set_rbt(index, rbt)),
        _ => ctx
            .require(name, attrs, "value", decode::percentage)
            .map(|cns| ctx.dive_mut(id).set_cns(index, cns)),
    };
    if let Some(result) = result {
        ctx.restatement(name, result);
    }
    Frame::Leaf
}

fn pressure(ctx: &mut ParseContext, attrs: &[Attribute]) -> Frame {
    ctx.check_attributes("pressure", attrs, &["value", "tank"], Severity::Warning);
    let Some((id, index)) = ctx.sample_for("pressure") else {
        return Frame::Skipped;
    };
    let value = ctx.require("pressure", attrs, "value", decode::unsigned_real);
    let tank = ctx.require("pressure", attrs, "tank", decode::ordinal);
    if let (Some(value), Some(tank)) = (value, tank) {
        ctx.dive_mut(id).add_pressure(index, Pressure { value, tank });
    }
    Frame::Leaf
}

fn gaschange(ctx: &mut ParseContext, attrs: &[Attribute]) -> Frame {
    ctx.check_attributes("gaschange", attrs, &["mix"], Severity::Warning);
    let Some((id, index)) = ctx.sample_for("gaschange") else {
        return Frame::Skipped;
    };
    if let Some(mix) = ctx.require("gaschange", attrs, "mix", decode::ordinal) {
        let result = ctx.dive_mut(id).set_gaschange(index, mix);
        ctx.restatement("gaschange", result);
    }
    Frame::Leaf
}

fn event(ctx: &mut ParseContext, attrs: &[Attribute]) -> Frame {
    ctx.check_attributes("event", attrs, &["type", "duration", "flags"], Severity::Warning);
    let Some((id, index)) = ctx.sample_for("event") else {
        return Frame::Skipped;
    };
    let Some(kind) = ctx.require("event", attrs, "type", str::parse::<EventKind>) else {
        return Frame::Skipped;
    };
    let event = Event {
        kind,
        duration: ctx.decode("event", attrs, "duration", decode::seconds),
        flags: ctx.decode("event", attrs, "flags", decode::uint),
    };
    ctx.dive_mut(id).add_event(index, event);
    Frame::Leaf
}

fn deco(ctx: &mut ParseContext, attrs: &[Attribute]) -> Frame {
    ctx.check_attributes("deco", attrs, &["type", "depth", "duration"], Severity::Warning);
    let Some((id, index)) = ctx.sample_for("deco") else {
        return Frame::Skipped;
    };
    if ctx.logbook.dive(id).mode == Some(Mode::FreeDive) {
        ctx.debug("<deco> ignored in a freedive");
        return Frame::Skipped;
    }
    let Some(kind) = ctx.require("deco", attrs, "type", str::parse::<DecoKind>) else {
        return Frame::Skipped;
    };
    let deco = Deco {
        kind,
        depth: ctx.decode("deco", attrs, "depth", decode::unsigned_real),
        duration: ctx.decode("deco", attrs, "duration", decode::seconds),
    };
    let result = ctx.dive_mut(id).set_deco(index, deco);
    ctx.restatement("deco", result);
    Frame::Leaf
}

fn vendor(ctx: &mut ParseContext, attrs: &[Attribute]) -> Frame {
    ctx.check_attributes("vendor", attrs, &["type"], Severity::Warning);
    let Some((id, index)) = ctx.sample_for("vendor") else {
        return Frame::Skipped;
    };
    let Some(kind) = ctx.require("vendor", attrs, "type", decode::uint) else {
        return Frame::Skipped;
    };
    if ctx.logbook.dive(id).samples[index].vendor.is_some() {
        ctx.restatement("vendor", Err(Restated));
        return Frame::Skipped;
    }
    ctx.text.clear();
    Frame::Vendor(kind)
}

pub(super) fn open(ctx: &mut ParseContext, name: &str, attrs: &[Attribute]) -> Frame {
    match name {
        "divelog" => divelog(ctx, attrs),
        "dives" | "gasmixes" | "tanks" | "samples" => Frame::Container,
        "dive" => dive(ctx, attrs),
        "fingerprint" => fingerprint(ctx, attrs),
        "gasmix" => gasmix(ctx, attrs),
        "tank" => tank(ctx, attrs),
        "sample" => sample(ctx, attrs),
        "depth" | "temp" | "rbt" | "cns" => reading(ctx, name, attrs),
        "pressure" => pressure(ctx, attrs),
        "gaschange" => gaschange(ctx, attrs),
        "event" => event(ctx, attrs),
        "deco" => deco(ctx, attrs),
        "vendor" => vendor(ctx, attrs),
        _ => {
            ctx.debug(format!("unknown element <{}> ignored", name));
            Frame::Unknown
        }
    }
}

/*
** This file is a part of Divexml (streaming dive log XML parser)
** Copyright (C) 2025 Gurer Ozen
**
** Divexml is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::fmt::Display;
use std::str::FromStr;

use thiserror::Error;

/// The name is not one of the known values of an enumeration.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("unknown {what}: '{name}'")]
pub struct UnknownName {
    pub what: &'static str,
    pub name: String,
}

macro_rules! named_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $what:literal {
            $($variant:ident => $text:literal,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        pub enum $name {
            $($variant,)*
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)*];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)*
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownName;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)*
                    _ => Err(UnknownName {
                        what: $what,
                        name: s.to_string(),
                    }),
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

named_enum! {
    /// Operating mode of the dive computer.
    Mode, "dive mode" {
        FreeDive => "freedive",
        Gauge => "gauge",
        OpenCircuit => "opencircuit",
        ClosedCircuit => "closedcircuit",
    }
}

named_enum! {
    /// Decompression status of a sample.
    DecoKind, "decompression status" {
        Ndl => "ndl",
        SafetyStop => "safetystop",
        DecoStop => "decostop",
        DeepStop => "deepstop",
    }
}

named_enum! {
    /// Timed sample events reported by dive computers.
    ///
    /// The order matches the numeric event types of the Subsurface dialect.
    EventKind, "event type" {
        None => "none",
        DecoStop => "decostop",
        Rbt => "rbt",
        Ascent => "ascent",
        Ceiling => "ceiling",
        Workload => "workload",
        Transmitter => "transmitter",
        Violation => "violation",
        Bookmark => "bookmark",
        Surface => "surface",
        SafetyStop => "safetystop",
        GasChange => "gaschange",
        SafetyStopVoluntary => "safetystop_voluntary",
        SafetyStopMandatory => "safetystop_mandatory",
        DeepStop => "deepstop",
        CeilingSafetyStop => "ceiling_safetystop",
        Floor => "floor",
        DiveTime => "divetime",
        MaxDepth => "maxdepth",
        Olf => "olf",
        Po2 => "po2",
        AirTime => "airtime",
        Rgbm => "rgbm",
        Heading => "heading",
        TissueLevel => "tissuelevel",
        GasChange2 => "gaschange2",
    }
}

impl EventKind {
    pub fn from_index(index: u32) -> Option<EventKind> {
        EventKind::ALL.get(index as usize).copied()
    }
}

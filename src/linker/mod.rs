/*
** This file is a part of Divexml (streaming dive log XML parser)
** Copyright (C) 2025 Gurer Ozen
**
** Divexml is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use thiserror::Error;

use crate::Diagnostic;
use crate::Logbook;
use crate::Severity;
use crate::model::Dive;
use crate::model::DiveId;
use crate::model::Tank;

/// A reference to a gas mix which the dive does not declare.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum LinkError {
    #[error("dive {dive}: gas change at {time}s to undeclared gasmix {mix}")]
    UnknownGasChange { dive: DiveId, time: u32, mix: u32 },

    #[error("dive {dive}: tank {tank} uses undeclared gasmix {mix}")]
    UnknownTankMix { dive: DiveId, tank: u32, mix: u32 },
}

impl LinkError {
    pub fn dive(&self) -> DiveId {
        match self {
            LinkError::UnknownGasChange { dive, .. } => *dive,
            LinkError::UnknownTankMix { dive, .. } => *dive,
        }
    }
}

/// Checks the references of one dive. Tanks which are only known from
/// pressure readings are added, their numbers are returned.
fn link_dive(dive: &mut Dive, errors: &mut Vec<LinkError>) -> Vec<u32> {
    let mut added = Vec::new();
    for sample in &dive.samples {
        if let Some(mix) = sample.gaschange {
            if dive.gasmix(mix).is_none() {
                errors.push(LinkError::UnknownGasChange {
                    dive: dive.id,
                    time: sample.time,
                    mix,
                });
            }
        }
        for pressure in &sample.pressures {
            if dive.tank(pressure.tank).is_none() && !added.contains(&pressure.tank) {
                added.push(pressure.tank);
            }
        }
    }
    for tank in &dive.tanks {
        if let Some(mix) = tank.gasmix {
            if dive.gasmix(mix).is_none() {
                errors.push(LinkError::UnknownTankMix {
                    dive: dive.id,
                    tank: tank.num,
                    mix,
                });
            }
        }
    }
    dive.tanks.extend(added.iter().map(|&num| Tank::new(num)));
    added
}

/// Resolves the gas mix and tank references of every dive.
///
/// Runs once after all sources are parsed. Unresolved references are
/// reported as errors and returned, but the dives stay in the logbook.
pub fn link(logbook: &mut Logbook) -> Result<(), Vec<LinkError>> {
    let mut errors = Vec::new();
    for dive in logbook.dives_mut() {
        for tank in link_dive(dive, &mut errors) {
            tracing::debug!(dive = dive.id.0, tank, "tank added from pressure readings");
        }
    }
    for err in &errors {
        let source = logbook.log(logbook.dive(err.dive()).log).source.clone();
        logbook.report(Diagnostic {
            severity: Severity::Error,
            source,
            location: None,
            message: err.to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

impl Logbook {
    /// See [link()].
    pub fn link(&mut self) -> Result<(), Vec<LinkError>> {
        link(self)
    }
}

#[cfg(test)]
mod tests;

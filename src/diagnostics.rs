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

use crate::Location;

/// How bad a reported condition is.
///
/// Debug messages only go to the `tracing` subscriber; warnings and errors
/// are also kept in the [Logbook](crate::Logbook).
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum Severity {
    Debug,
    /// Questionable data, the affected field is left at its default.
    Warning,
    /// The element's contribution was dropped, or a source failed.
    Error,
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Severity::Debug => "debug",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// A condition reported while parsing or linking.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Name of the source, `-` for the standard input.
    pub source: String,
    pub location: Option<Location>,
    pub message: String,
}

impl Diagnostic {
    /// Sends the diagnostic to the `tracing` subscriber.
    pub fn emit(&self) {
        let (line, column) = match self.location {
            Some(loc) => (loc.lines + 1, loc.column + 1),
            None => (0, 0),
        };
        match self.severity {
            Severity::Debug => {
                tracing::debug!(source = %self.source, line, column, "{}", self.message)
            }
            Severity::Warning => {
                tracing::warn!(source = %self.source, line, column, "{}", self.message)
            }
            Severity::Error => {
                tracing::error!(source = %self.source, line, column, "{}", self.message)
            }
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.location {
            Some(location) => write!(
                f,
                "{}:{}: {}: {}",
                self.source, location, self.severity, self.message
            ),
            None => write!(f, "{}: {}: {}", self.source, self.severity, self.message),
        }
    }
}

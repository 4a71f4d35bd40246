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

use crate::Location;
use crate::SaxError;

/// A source which could not be parsed to the end.
///
/// Dives completed before the failure stay in the logbook. The same failure
/// is also recorded there as an error diagnostic.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The source could not be opened or read.
    #[error("{name}: read error: {error}")]
    Io {
        name: String,
        #[source]
        error: std::io::Error,
    },

    /// Malformed XML stopped the token stream.
    #[error("{name}:{location}: invalid xml syntax: {message}")]
    BadXml {
        name: String,
        location: Location,
        message: String,
    },

    /// The element handler stopped the token stream.
    #[error("{name}: parsing aborted")]
    Aborted { name: String },
}

impl ParseError {
    pub(super) fn from_sax(name: &str, err: SaxError) -> ParseError {
        let name = name.to_string();
        match err {
            SaxError::Io(error) => ParseError::Io { name, error },
            SaxError::BadXml { location, message } => ParseError::BadXml {
                name,
                location,
                message,
            },
            SaxError::HandlerAbort => ParseError::Aborted { name },
        }
    }

    /// Name of the failed source, `-` for the standard input.
    pub fn name(&self) -> &str {
        match self {
            ParseError::Io { name, .. } => name,
            ParseError::BadXml { name, .. } => name,
            ParseError::Aborted { name } => name,
        }
    }

    pub fn location(&self) -> Option<Location> {
        match self {
            ParseError::BadXml { location, .. } => Some(*location),
            _ => None,
        }
    }

    /// Description without the source name and location.
    pub(super) fn message(&self) -> String {
        match self {
            ParseError::Io { error, .. } => format!("read error: {}", error),
            ParseError::BadXml { message, .. } => format!("invalid xml syntax: {}", message),
            ParseError::Aborted { .. } => "parsing aborted".to_string(),
        }
    }
}

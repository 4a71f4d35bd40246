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

use super::Location;

/// Type of the error which stopped the token stream of a source.
///
/// These categories correspond to the distinct actions the caller might
/// take. Every variant ends the current source; whatever the handler built
/// before the error stays valid.
#[derive(Debug, Error)]
pub enum SaxError {
    /// Reading the next chunk of the source failed.
    #[error("read error: {0}")]
    Io(#[from] std::io::Error),

    /// A syntax error is encountered in the XML input.
    ///
    /// Typical action is telling the location and description to the user
    /// so they can fix the document.
    #[error("invalid xml syntax at {location}: {message}")]
    BadXml { location: Location, message: String },

    /// Element handler function returned this error.
    ///
    /// This is intended for the caller's handler to be able to abort the
    /// processing while signalling that the interruption is not caused by
    /// the document syntax.
    #[error("error from sax handler")]
    HandlerAbort,
}

pub(super) mod description {
    pub(in super::super) const DOC_NO_CONTENT: &str = "Document has no root tag";
    pub(in super::super) const DOC_OPEN_TAGS: &str = "Document has unclosed tags";
    pub(in super::super) const TAG_OUTSIDE_ROOT: &str = "Tags cannot be outside of the root tag";
    pub(in super::super) const DOC_CDATA_WITHOUT_PARENT: &str =
        "Character data not allowed outside of the root tag";
    pub(in super::super) const BAD_UTF8: &str = "Invalid UTF8 sequence";
}

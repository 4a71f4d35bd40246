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

/// Why an attribute value could not be decoded.
///
/// Decoding failures are never fatal. The parser reports them and leaves
/// the affected field at its default.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum DecodeError {
    #[error("empty value")]
    Empty,

    #[error("not a number: '{0}'")]
    NotNumeric(String),

    #[error("value out of range: '{0}'")]
    OutOfRange(String),

    #[error("missing '{unit}' unit: '{value}'")]
    MissingUnit { value: String, unit: &'static str },

    #[error("malformed value: '{0}'")]
    BadFormat(String),
}

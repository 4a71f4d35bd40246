/*
** This file is a part of Divexml (streaming dive log XML parser)
** Copyright (C) 2025 Gurer Ozen
**
** Divexml is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

pub mod predefined {
    pub const LT: &str = "&lt;";
    pub const GT: &str = "&gt;";
    pub const AMP: &str = "&amp;";
    pub const APOS: &str = "&apos;";
    pub const QUOT: &str = "&quot;";
}

fn entity(c: char) -> Option<&'static str> {
    match c {
        '<' => Some(predefined::LT),
        '>' => Some(predefined::GT),
        '&' => Some(predefined::AMP),
        '\'' => Some(predefined::APOS),
        '"' => Some(predefined::QUOT),
        _ => None,
    }
}

/// Writes `s` with the markup characters replaced by entities, so it can be
/// used both as character data and as a quoted attribute value.
pub fn escape_fmt(s: &str, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let mut plain = 0;
    for (pos, c) in s.char_indices() {
        if let Some(entity) = entity(c) {
            f.write_str(&s[plain..pos])?;
            f.write_str(entity)?;
            plain = pos + c.len_utf8();
        }
    }
    f.write_str(&s[plain..])
}

/// Display adapter for [escape_fmt].
pub struct Escaped<'a>(pub &'a str);

impl std::fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        escape_fmt(self.0, f)
    }
}

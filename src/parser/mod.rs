/*
** This file is a part of Divexml (streaming dive log XML parser)
** Copyright (C) 2025 Gurer Ozen
**
** Divexml is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

mod context;
mod error;
mod native;
mod subsurface;

use std::fmt::Display;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use crate::Attribute;
use crate::Diagnostic;
use crate::Location;
use crate::Logbook;
use crate::SaxElement;
use crate::SaxError;
use crate::SaxHandler;
use crate::SaxReader;
use crate::Severity;
use crate::model::UnknownName;

use context::Frame;
use context::ParseContext;
pub use error::ParseError;

/// Dive log format of a source. Never guessed from the content, the caller
/// picks the one it expects.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Dialect {
    #[default]
    Native,
    Subsurface,
}

impl FromStr for Dialect {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "native" => Ok(Dialect::Native),
            "subsurface" => Ok(Dialect::Subsurface),
            _ => Err(UnknownName {
                what: "dialect",
                name: s.to_string(),
            }),
        }
    }
}

impl Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Dialect::Native => "native",
            Dialect::Subsurface => "subsurface",
        })
    }
}

/// Turns the token stream of one source into records of the logbook.
///
/// Every open element has a frame on the stack, so an end tag always closes
/// what its own start tag opened, even when that element was rejected.
struct Driver<'a> {
    ctx: ParseContext<'a>,
    dialect: Dialect,
    frames: Vec<Frame>,
}

impl<'a> Driver<'a> {
    fn new(ctx: ParseContext<'a>, dialect: Dialect) -> Self {
        Driver {
            ctx,
            dialect,
            frames: Vec::new(),
        }
    }

    fn start_tag(&mut self, name: &str, attrs: &[Attribute]) -> Frame {
        match self.frames.last() {
            Some(Frame::Skipped | Frame::Leaf) => return Frame::Skipped,
            Some(frame) if frame.captures_text() => {
                self.ctx.error(format!("<{}> inside a text element", name));
                return Frame::Skipped;
            }
            _ => (),
        }
        match self.dialect {
            Dialect::Native => native::open(&mut self.ctx, name, attrs),
            Dialect::Subsurface => subsurface::open(&mut self.ctx, name, attrs),
        }
    }
}

impl SaxHandler for Driver<'_> {
    fn handle_element(&mut self, element: &SaxElement, location: Location) -> Result<(), SaxError> {
        self.ctx.location = location;
        match element {
            SaxElement::StartTag(name, attrs) => {
                let frame = self.start_tag(name, attrs);
                self.frames.push(frame);
            }
            SaxElement::EndTag(_) => {
                if let Some(frame) = self.frames.pop() {
                    self.ctx.close(frame);
                }
            }
            SaxElement::CData(text) => {
                if self.frames.last().is_some_and(Frame::captures_text) {
                    self.ctx.text.push_str(text);
                }
            }
        }
        Ok(())
    }
}

/// Dive log parser.
///
/// One parser reads any number of sources one after another, all into the
/// same [Logbook]. A malformed source stops at the first syntax error; the
/// dives it completed before that stay in the logbook.
///
/// ```
/// use divexml::{Config, Dialect, DiveParser, Logbook};
///
/// let xml = r#"<divelog diver="Kim"><dives>
///     <dive number="1" date="2017-03-01" time="10:00:00">
///         <samples><sample time="0:10"><depth value="4.5"/></sample></samples>
///     </dive>
/// </dives></divelog>"#;
///
/// let mut logbook = Logbook::new(Config::default());
/// let mut parser = DiveParser::new(Dialect::Native);
/// parser.parse_str(&mut logbook, "log.xml", xml).unwrap();
/// assert_eq!(logbook.len(), 1);
/// assert_eq!(logbook.dives().next().unwrap().max_depth, 4.5);
/// ```
pub struct DiveParser {
    reader: SaxReader,
    dialect: Dialect,
}

impl DiveParser {
    pub fn new(dialect: Dialect) -> DiveParser {
        DiveParser {
            reader: SaxReader::new(),
            dialect,
        }
    }

    pub fn with_chunk_size(dialect: Dialect, chunk_size: usize) -> DiveParser {
        DiveParser {
            reader: SaxReader::with_chunk_size(chunk_size),
            dialect,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Location of the last element seen, or of the syntax error which
    /// stopped the last source.
    pub fn location(&self) -> Location {
        self.reader.location()
    }

    /// Parses a file, or the standard input if the path is `-`.
    pub fn parse_path(
        &mut self,
        logbook: &mut Logbook,
        path: impl AsRef<Path>,
    ) -> Result<(), ParseError> {
        let path = path.as_ref();
        if path == Path::new("-") {
            return self.parse_reader(logbook, "-", std::io::stdin().lock());
        }
        let name = path.display().to_string();
        match File::open(path) {
            Ok(file) => self.parse_reader(logbook, &name, file),
            Err(error) => Err(failed(logbook, ParseError::Io { name, error })),
        }
    }

    pub fn parse_str(
        &mut self,
        logbook: &mut Logbook,
        name: &str,
        text: &str,
    ) -> Result<(), ParseError> {
        self.parse_reader(logbook, name, text.as_bytes())
    }

    /// Parses a source read in chunks from `source`. `name` identifies the
    /// source in diagnostics and in the divelogs.
    pub fn parse_reader<R: Read>(
        &mut self,
        logbook: &mut Logbook,
        name: &str,
        source: R,
    ) -> Result<(), ParseError> {
        tracing::debug!(source = name, dialect = %self.dialect, "parsing");
        let mut driver = Driver::new(ParseContext::new(logbook, name), self.dialect);
        let result = self.reader.parse(source, &mut driver);
        driver.ctx.finish();
        drop(driver);
        match result {
            Ok(()) => Ok(()),
            Err(err) => Err(failed(logbook, ParseError::from_sax(name, err))),
        }
    }
}

fn failed(logbook: &mut Logbook, err: ParseError) -> ParseError {
    logbook.report(Diagnostic {
        severity: Severity::Error,
        source: err.name().to_string(),
        location: err.location(),
        message: err.message(),
    });
    err
}

/*
** This file is a part of Divexml (streaming dive log XML parser)
** Copyright (C) 2025 Gurer Ozen
**
** Divexml is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

mod error;
mod location;

use std::io::BufReader;
use std::io::Read;

use quick_xml::Reader;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;

use error::description;
pub use error::SaxError;
use location::LineIndex;
pub use location::Location;

/// Default size of the chunks read from a source.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// A tag attribute with all references in the value replaced.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// An XML element sent to the handler.
#[derive(Debug, Eq, PartialEq)]
pub enum SaxElement<'a> {
    /// A start tag or empty element tag with all of its attributes.
    ///
    /// An empty element tag is always followed by a matching EndTag, so the
    /// handler does not need to tell the two forms apart.
    StartTag(&'a str, &'a [Attribute]),

    /// An end tag element.
    ///
    /// The tokenizer checks that the name matches the open start tag.
    EndTag(&'a str),

    /// A character data element.
    ///
    /// Whitespace between tags is sent as well; handlers which only care
    /// about text content of certain elements should ignore it elsewhere.
    CData(&'a str),
}

pub trait SaxHandler {
    fn handle_element(&mut self, element: &SaxElement, location: Location)
    -> Result<(), SaxError>;
}

/// Counts the raw bytes going into the tokenizer so that event positions can
/// be turned into lines and columns.
struct ChunkReader<'a, R> {
    inner: R,
    offset: usize,
    lines: &'a mut LineIndex,
}

impl<R: Read> Read for ChunkReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let len = self.inner.read(buf)?;
        self.lines.observe(self.offset, &buf[..len]);
        self.offset += len;
        Ok(len)
    }
}

type ChunkedXml<'a, R> = Reader<BufReader<ChunkReader<'a, R>>>;

/// Push style XML tokenizer.
///
/// The source is read in fixed size chunks and every parsed element is
/// pushed to a [SaxHandler] as soon as it is complete. A zero length read
/// marks the end of the input, at which point the document is checked for
/// missing root or unclosed tags.
///
/// One tokenizer can be reused for any number of sources, every call to
/// [parse()](SaxReader::parse) starts from a clean state.
///
/// ```
/// use divexml::{Location, SaxElement, SaxError, SaxHandler, SaxReader};
///
/// struct Counter { tags: usize }
/// impl SaxHandler for Counter {
///     fn handle_element(&mut self, element: &SaxElement, _: Location) -> Result<(), SaxError> {
///         if let SaxElement::StartTag(..) = element {
///             self.tags += 1;
///         }
///         Ok(())
///     }
/// }
///
/// let mut counter = Counter { tags: 0 };
/// let mut reader = SaxReader::new();
/// reader.parse(&b"<a><b/><c>text</c></a>"[..], &mut counter).unwrap();
/// assert_eq!(counter.tags, 3);
/// ```
pub struct SaxReader {
    chunk_size: usize,
    buffer: Vec<u8>,
    attributes: Vec<Attribute>,
    lines: LineIndex,
    location: Location,
}

fn bad_xml(location: Location, message: impl ToString) -> SaxError {
    SaxError::BadXml {
        location,
        message: message.to_string(),
    }
}

fn stream_error<R>(reader: &ChunkedXml<'_, R>, err: quick_xml::Error) -> SaxError {
    match err {
        quick_xml::Error::Io(err) => SaxError::Io(std::io::Error::new(err.kind(), err.to_string())),
        err => {
            let lines = &reader.get_ref().get_ref().lines;
            bad_xml(lines.locate(reader.error_position() as usize), err)
        }
    }
}

fn collect_tag<'t>(
    tag: &'t BytesStart<'_>,
    attributes: &mut Vec<Attribute>,
) -> Result<&'t str, String> {
    attributes.clear();
    for attr in tag.attributes() {
        let attr = attr.map_err(|err| err.to_string())?;
        let name = std::str::from_utf8(attr.key.as_ref()).map_err(|_| description::BAD_UTF8)?;
        let value = attr.unescape_value().map_err(|err| err.to_string())?;
        attributes.push(Attribute {
            name: name.to_string(),
            value: value.into_owned(),
        });
    }
    let name = std::str::from_utf8(tag.name().into_inner()).map_err(|_| description::BAD_UTF8)?;
    Ok(name)
}

impl SaxReader {
    pub fn new() -> SaxReader {
        SaxReader::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(chunk_size: usize) -> SaxReader {
        SaxReader {
            chunk_size: chunk_size.max(1),
            buffer: Vec::new(),
            attributes: Vec::new(),
            lines: LineIndex::new(),
            location: Location::new(),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.attributes.clear();
        self.lines.clear();
        self.location = Location::new();
    }

    /// Location of the last element sent to the handler, or of the error
    /// if the last parse failed.
    pub fn location(&self) -> Location {
        self.location
    }

    pub fn parse<R: Read>(
        &mut self,
        source: R,
        handler: &mut impl SaxHandler,
    ) -> Result<(), SaxError> {
        self.reset();
        let result = self.run(source, handler);
        if let Err(SaxError::BadXml { location, .. }) = &result {
            self.location = *location;
        }
        result
    }

    fn run<R: Read>(&mut self, source: R, handler: &mut impl SaxHandler) -> Result<(), SaxError> {
        let SaxReader {
            chunk_size,
            buffer,
            attributes,
            lines,
            location,
        } = self;
        let chunks = ChunkReader {
            inner: source,
            offset: 0,
            lines,
        };
        let mut reader = Reader::from_reader(BufReader::with_capacity(*chunk_size, chunks));
        let mut depth: usize = 0;
        let mut seen_root = false;

        loop {
            let start = reader.buffer_position() as usize;
            let index = &mut *reader.get_mut().get_mut().lines;
            index.fold_before(start);
            *location = index.locate(start);
            buffer.clear();
            let event = match reader.read_event_into(buffer) {
                Ok(event) => event,
                Err(err) => return Err(stream_error(&reader, err)),
            };
            match event {
                Event::Start(tag) => {
                    if depth == 0 && seen_root {
                        return Err(bad_xml(*location, description::TAG_OUTSIDE_ROOT));
                    }
                    seen_root = true;
                    depth += 1;
                    let name = collect_tag(&tag, attributes).map_err(|m| bad_xml(*location, m))?;
                    handler.handle_element(&SaxElement::StartTag(name, attributes.as_slice()), *location)?;
                }
                Event::Empty(tag) => {
                    if depth == 0 && seen_root {
                        return Err(bad_xml(*location, description::TAG_OUTSIDE_ROOT));
                    }
                    seen_root = true;
                    let name = collect_tag(&tag, attributes).map_err(|m| bad_xml(*location, m))?;
                    handler.handle_element(&SaxElement::StartTag(name, attributes.as_slice()), *location)?;
                    handler.handle_element(&SaxElement::EndTag(name), *location)?;
                }
                Event::End(tag) => {
                    depth = depth.saturating_sub(1);
                    let name = std::str::from_utf8(tag.name().into_inner())
                        .map_err(|_| bad_xml(*location, description::BAD_UTF8))?;
                    handler.handle_element(&SaxElement::EndTag(name), *location)?;
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(|err| bad_xml(*location, err))?;
                    if depth == 0 {
                        if !text.trim().is_empty() {
                            return Err(bad_xml(*location, description::DOC_CDATA_WITHOUT_PARENT));
                        }
                        continue;
                    }
                    handler.handle_element(&SaxElement::CData(text.as_ref()), *location)?;
                }
                Event::CData(data) => {
                    if depth == 0 {
                        return Err(bad_xml(*location, description::DOC_CDATA_WITHOUT_PARENT));
                    }
                    let text = std::str::from_utf8(&data)
                        .map_err(|_| bad_xml(*location, description::BAD_UTF8))?;
                    handler.handle_element(&SaxElement::CData(text), *location)?;
                }
                Event::Eof => break,
                _ => (),
            }
        }

        if !seen_root {
            return Err(bad_xml(*location, description::DOC_NO_CONTENT));
        }
        if depth > 0 {
            return Err(bad_xml(*location, description::DOC_OPEN_TAGS));
        }
        Ok(())
    }
}

impl Default for SaxReader {
    fn default() -> Self {
        Self::new()
    }
}

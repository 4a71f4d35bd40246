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

use crate::Attribute;
use crate::Diagnostic;
use crate::Location;
use crate::Logbook;
use crate::Severity;
use crate::decode;
use crate::model::Dive;
use crate::model::DiveId;
use crate::model::DiveLog;
use crate::model::LogId;
use crate::model::Restated;
use crate::model::Vendor;

/// What an open element is, decided when its start tag is seen.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum Frame {
    Log,
    /// Grouping element without meaning of its own, children are handled
    /// as if they were in the parent.
    Container,
    /// Element of no known meaning. Like a container, its children are
    /// still looked at.
    Unknown,
    Dive,
    Sample,
    /// Text of the element is the dive fingerprint.
    Fingerprint,
    /// Text of the element is a vendor payload of the given type.
    Vendor(u32),
    /// Handled completely by its start tag, content is not looked at.
    Leaf,
    /// Ignored together with everything inside.
    Skipped,
}

impl Frame {
    pub(super) fn captures_text(&self) -> bool {
        matches!(self, Frame::Fingerprint | Frame::Vendor(_))
    }
}

pub(super) fn attribute<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|attr| attr.name == name)
        .map(|attr| attr.value.as_str())
}

/// Parse state of one source.
///
/// Holds the records being built as handles into the logbook, and the text
/// of the element which is currently captured.
pub(super) struct ParseContext<'a> {
    pub(super) logbook: &'a mut Logbook,
    source: &'a str,
    pub(super) location: Location,
    pub(super) log: Option<LogId>,
    pub(super) dive: Option<DiveId>,
    /// Index of the open sample in the open dive.
    pub(super) sample: Option<usize>,
    /// Number of dive computers seen in the open dive.
    pub(super) computers: u32,
    pub(super) text: String,
}

impl<'a> ParseContext<'a> {
    pub(super) fn new(logbook: &'a mut Logbook, source: &'a str) -> Self {
        ParseContext {
            logbook,
            source,
            location: Location::new(),
            log: None,
            dive: None,
            sample: None,
            computers: 0,
            text: String::new(),
        }
    }

    pub(super) fn report(&mut self, severity: Severity, message: String) {
        self.logbook.report(Diagnostic {
            severity,
            source: self.source.to_string(),
            location: Some(self.location),
            message,
        });
    }

    pub(super) fn debug(&mut self, message: impl Into<String>) {
        self.report(Severity::Debug, message.into());
    }

    pub(super) fn warn(&mut self, message: impl Into<String>) {
        self.report(Severity::Warning, message.into());
    }

    pub(super) fn error(&mut self, message: impl Into<String>) {
        self.report(Severity::Error, message.into());
    }

    pub(super) fn check_attributes(
        &mut self,
        element: &str,
        attrs: &[Attribute],
        known: &[&str],
        severity: Severity,
    ) {
        for attr in attrs {
            if !known.contains(&attr.name.as_str()) {
                self.report(
                    severity,
                    format!("unknown attribute '{}' in <{}>", attr.name, element),
                );
            }
        }
    }

    /// Decodes an optional attribute. A value which does not decode is
    /// reported and treated as absent.
    pub(super) fn decode<T, E: Display>(
        &mut self,
        element: &str,
        attrs: &[Attribute],
        name: &str,
        decoder: impl Fn(&str) -> Result<T, E>,
    ) -> Option<T> {
        let value = attribute(attrs, name)?;
        match decoder(value) {
            Ok(value) => Some(value),
            Err(err) => {
                self.error(format!("bad '{}' in <{}>: {}", name, element, err));
                None
            }
        }
    }

    /// Decodes an attribute the element is meaningless without.
    pub(super) fn require<T, E: Display>(
        &mut self,
        element: &str,
        attrs: &[Attribute],
        name: &str,
        decoder: impl Fn(&str) -> Result<T, E>,
    ) -> Option<T> {
        if attribute(attrs, name).is_none() {
            self.error(format!("missing '{}' in <{}>", name, element));
            return None;
        }
        self.decode(element, attrs, name, decoder)
    }

    /// Reports a per-sample value given twice, the first one is kept.
    pub(super) fn restatement(&mut self, field: &str, result: Result<(), Restated>) {
        if result.is_err() {
            self.error(format!("{} given more than once in a sample", field));
        }
    }

    /// The open dive, for elements which belong to a dive but not to a sample.
    pub(super) fn dive_for(&mut self, element: &str) -> Option<DiveId> {
        match (self.dive, self.sample) {
            (Some(id), None) => Some(id),
            (Some(_), Some(_)) => {
                self.error(format!("<{}> inside a sample", element));
                None
            }
            (None, _) => {
                self.error(format!("<{}> outside of a dive", element));
                None
            }
        }
    }

    /// The open dive and sample, for elements which belong to a sample.
    pub(super) fn sample_for(&mut self, element: &str) -> Option<(DiveId, usize)> {
        match (self.dive, self.sample) {
            (Some(id), Some(index)) => Some((id, index)),
            _ => {
                self.error(format!("<{}> outside of a sample", element));
                None
            }
        }
    }

    pub(super) fn dive_mut(&mut self, id: DiveId) -> &mut Dive {
        self.logbook.dive_mut(id)
    }

    pub(super) fn open_log(&mut self, mut log: DiveLog) -> Option<LogId> {
        if self.log.is_some() {
            self.error("nested <divelog>");
            return None;
        }
        log.source = self.source.to_string();
        log.line = self.location.lines + 1;
        let id = self.logbook.add_log(log);
        self.log = Some(id);
        self.debug(format!("new divelog {}", id));
        Some(id)
    }

    /// Starts a dive of the open divelog and links it into the logbook.
    ///
    /// The dive stays untimed unless both `date` and `time` decode.
    pub(super) fn open_dive(&mut self, date: Option<&str>, time: Option<&str>) -> Option<DiveId> {
        let Some(log) = self.log else {
            self.error("<dive> outside of a divelog");
            return None;
        };
        if self.dive.is_some() {
            self.error("nested <dive>");
            return None;
        }
        let datetime = match (date, time) {
            (Some(date), Some(time)) => match decode::datetime(date, time) {
                Ok(datetime) => datetime,
                Err(err) => {
                    self.error(format!("bad date and time in <dive>: {}", err));
                    0
                }
            },
            (None, None) => 0,
            _ => {
                self.warn("<dive> needs both date and time to be timed");
                0
            }
        };
        let id = self.logbook.begin_dive(log, date, datetime);
        self.dive = Some(id);
        self.sample = None;
        self.computers = 0;
        self.debug(format!("new dive {}", id));
        Some(id)
    }

    /// Adds a sample at `time` to the dive and returns its index.
    ///
    /// With `merge`, an existing sample at the same time is used instead.
    pub(super) fn add_sample(&mut self, id: DiveId, time: u32, merge: bool) -> usize {
        let dive = self.logbook.dive_mut(id);
        let index = if merge {
            dive.sample_at(time)
        } else {
            dive.insert_sample(time)
        };
        self.logbook.note_sample(id, time);
        index
    }

    fn take_text(&mut self) -> Option<String> {
        let text = std::mem::take(&mut self.text);
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == text.len() {
            Some(text)
        } else {
            Some(trimmed.to_string())
        }
    }

    fn close_dive(&mut self) {
        self.sample = None;
        if let Some(id) = self.dive.take() {
            self.logbook.end_dive(id);
        }
    }

    pub(super) fn close(&mut self, frame: Frame) {
        match frame {
            Frame::Log => self.log = None,
            Frame::Dive => self.close_dive(),
            Frame::Sample => self.sample = None,
            Frame::Fingerprint => {
                let text = self.take_text();
                if let Some(id) = self.dive {
                    self.dive_mut(id).fingerprint = text;
                }
            }
            Frame::Vendor(kind) => {
                let text = self.take_text();
                if let (Some(id), Some(index)) = (self.dive, self.sample) {
                    self.dive_mut(id).samples[index].vendor =
                        text.map(|data| Vendor { kind, data });
                }
            }
            Frame::Container | Frame::Unknown | Frame::Leaf | Frame::Skipped => (),
        }
    }

    /// Closes whatever the source left open, so that a stream stopped in
    /// the middle of a dive still leaves the logbook consistent.
    pub(super) fn finish(&mut self) {
        if self.dive.is_some() {
            self.debug("closing unfinished dive");
            self.close_dive();
        }
        self.log = None;
        self.text = String::new();
    }
}

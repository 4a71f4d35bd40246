/*
** This file is a part of Divexml (streaming dive log XML parser)
** Copyright (C) 2025 Gurer Ozen
**
** Divexml is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

mod config;
pub mod decode;
mod diagnostics;
mod entities;
mod linker;
mod logbook;
mod model;
mod parser;
mod tokenizer;
mod writer;

pub use tokenizer::Attribute;
pub use tokenizer::DEFAULT_CHUNK_SIZE;
pub use tokenizer::Location;
pub use tokenizer::SaxElement;
pub use tokenizer::SaxError;
pub use tokenizer::SaxHandler;
pub use tokenizer::SaxReader;

pub use config::Config;
pub use config::ConfigError;
pub use config::GroupBy;
pub use config::OrderBy;

pub use diagnostics::Diagnostic;
pub use diagnostics::Severity;

pub use model::DecoKind;
pub use model::Deco;
pub use model::Dive;
pub use model::DiveId;
pub use model::DiveLog;
pub use model::Event;
pub use model::EventKind;
pub use model::Extrema;
pub use model::GasMix;
pub use model::Group;
pub use model::GroupId;
pub use model::LogId;
pub use model::Mode;
pub use model::Pressure;
pub use model::Restated;
pub use model::Sample;
pub use model::Tank;
pub use model::UnknownName;
pub use model::Vendor;

pub use logbook::Logbook;

pub use parser::Dialect;
pub use parser::DiveParser;
pub use parser::ParseError;

pub use linker::LinkError;
pub use linker::link;

pub use entities::Escaped;
pub use writer::DiveXml;
pub use writer::GroupXml;
pub use writer::LogbookXml;
pub use writer::SampleXml;

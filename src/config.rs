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
use std::str::FromStr;

use thiserror::Error;

use crate::tokenizer::DEFAULT_CHUNK_SIZE;

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    #[error("unknown grouping '{0}', expected none, date, diver or divelog")]
    UnknownGroupBy(String),

    #[error(
        "unknown ordering '{0}', expected date, maxtime, maxtime-desc, maxdepth or maxdepth-desc"
    )]
    UnknownOrderBy(String),
}

/// Key which puts dives into the same group.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum GroupBy {
    /// Every dive goes into one implicit group.
    #[default]
    None,
    /// Literal date attribute of the dive, dives without one share a bucket.
    Date,
    /// Diver of the divelog.
    Diver,
    /// Vendor, product, model and diver of the divelog.
    DiveLog,
}

/// Order of the dives within a group.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OrderBy {
    /// By start time, dives without one last.
    #[default]
    Date,
    MaxTimeAsc,
    MaxTimeDesc,
    MaxDepthAsc,
    MaxDepthDesc,
}

impl OrderBy {
    /// True if the order key is only known after all samples are read.
    pub fn needs_readd(&self) -> bool {
        !matches!(self, OrderBy::Date)
    }
}

impl FromStr for GroupBy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(GroupBy::None),
            "date" => Ok(GroupBy::Date),
            "diver" => Ok(GroupBy::Diver),
            "divelog" => Ok(GroupBy::DiveLog),
            _ => Err(ConfigError::UnknownGroupBy(s.to_string())),
        }
    }
}

impl Display for GroupBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            GroupBy::None => "none",
            GroupBy::Date => "date",
            GroupBy::Diver => "diver",
            GroupBy::DiveLog => "divelog",
        })
    }
}

impl FromStr for OrderBy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(OrderBy::Date),
            "maxtime" => Ok(OrderBy::MaxTimeAsc),
            "maxtime-desc" => Ok(OrderBy::MaxTimeDesc),
            "maxdepth" => Ok(OrderBy::MaxDepthAsc),
            "maxdepth-desc" => Ok(OrderBy::MaxDepthDesc),
            _ => Err(ConfigError::UnknownOrderBy(s.to_string())),
        }
    }
}

impl Display for OrderBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            OrderBy::Date => "date",
            OrderBy::MaxTimeAsc => "maxtime",
            OrderBy::MaxTimeDesc => "maxtime-desc",
            OrderBy::MaxDepthAsc => "maxdepth",
            OrderBy::MaxDepthDesc => "maxdepth-desc",
        })
    }
}

/// Settings of one parse run, shared by every source of the run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub group: GroupBy,
    pub order: OrderBy,
    /// Order the dive queue by time since the start of each dive's group
    /// instead of by absolute time.
    pub split: bool,
    /// Size of the chunks read from each source.
    pub chunk_size: usize,
}

impl Config {
    pub fn new(group: GroupBy, order: OrderBy) -> Self {
        Config {
            group,
            order,
            ..Default::default()
        }
    }

    pub fn with_split(mut self, split: bool) -> Self {
        self.split = split;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            group: GroupBy::None,
            order: OrderBy::Date,
            split: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/*
** This file is a part of Divexml (streaming dive log XML parser)
** Copyright (C) 2025 Gurer Ozen
**
** Divexml is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use crate::Diagnostic;
use crate::Severity;
use crate::config::Config;
use crate::config::GroupBy;
use crate::config::OrderBy;
use crate::model::Dive;
use crate::model::DiveId;
use crate::model::DiveLog;
use crate::model::Group;
use crate::model::GroupId;
use crate::model::LogId;

/// All dives, groups and divelogs of a parse run.
///
/// The logbook is the only owner of the parsed records. Dives are kept in
/// two orders at all times: the dive queue, ordered by start time (relative
/// to the start of the dive's group when the run is split), and each group's
/// member list, ordered by the configured [OrderBy] policy.
///
/// Orders which depend on the samples cannot place a dive when it starts. Such
/// a dive is appended to its group and moved to its final place when it ends,
/// so the member list is ordered except for the one dive being parsed.
#[derive(Debug)]
pub struct Logbook {
    config: Config,
    logs: Vec<DiveLog>,
    dives: Vec<Dive>,
    groups: Vec<Group>,
    queue: Vec<DiveId>,
    timestamp_min: i64,
    timestamp_max: i64,
    diagnostics: Vec<Diagnostic>,
}

fn precedes(order: OrderBy, a: &Dive, b: &Dive) -> bool {
    match order {
        OrderBy::Date => a.is_timed() && (!b.is_timed() || a.datetime < b.datetime),
        OrderBy::MaxTimeAsc => a.max_time < b.max_time,
        OrderBy::MaxTimeDesc => a.max_time > b.max_time,
        OrderBy::MaxDepthAsc => a.max_depth < b.max_depth,
        OrderBy::MaxDepthDesc => a.max_depth > b.max_depth,
    }
}

/// Insert position after every member which does not come later than `dive`.
fn ordered_position(order: OrderBy, dives: &[Dive], members: &[DiveId], dive: &Dive) -> usize {
    members
        .iter()
        .position(|m| precedes(order, dive, &dives[m.0]))
        .unwrap_or(members.len())
}

impl Logbook {
    pub fn new(config: Config) -> Logbook {
        Logbook {
            config,
            logs: Vec::new(),
            dives: Vec::new(),
            groups: Vec::new(),
            queue: Vec::new(),
            timestamp_min: 0,
            timestamp_max: 0,
            diagnostics: Vec::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn logs(&self) -> &[DiveLog] {
        &self.logs
    }

    pub fn log(&self, id: LogId) -> &DiveLog {
        &self.logs[id.0]
    }

    pub fn dive(&self, id: DiveId) -> &Dive {
        &self.dives[id.0]
    }

    /// Dives in queue order.
    pub fn dives(&self) -> impl Iterator<Item = &Dive> {
        self.queue.iter().map(|id| &self.dives[id.0])
    }

    pub fn queue(&self) -> &[DiveId] {
        &self.queue
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group(&self, id: GroupId) -> &Group {
        &self.groups[id.0]
    }

    /// Members of a group in the configured order.
    pub fn group_dives(&self, id: GroupId) -> impl Iterator<Item = &Dive> {
        self.groups[id.0].dives.iter().map(|id| &self.dives[id.0])
    }

    pub fn len(&self) -> usize {
        self.dives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dives.is_empty()
    }

    /// Earliest dive start time, zero when no dive is timed.
    pub fn timestamp_min(&self) -> i64 {
        self.timestamp_min
    }

    /// Latest dive start or sample time, zero when no dive is timed.
    pub fn timestamp_max(&self) -> i64 {
        self.timestamp_max
    }

    /// Warnings and errors reported so far, in the order they happened.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == Severity::Error)
    }

    /// Releases every dive, group, divelog and diagnostic. The configuration
    /// is kept, so the logbook can be used for another run.
    pub fn clear(&mut self) {
        self.logs.clear();
        self.dives.clear();
        self.groups.clear();
        self.queue.clear();
        self.diagnostics.clear();
        self.timestamp_min = 0;
        self.timestamp_max = 0;
    }

    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        diagnostic.emit();
        if diagnostic.severity > Severity::Debug {
            self.diagnostics.push(diagnostic);
        }
    }

    pub(crate) fn add_log(&mut self, mut log: DiveLog) -> LogId {
        let id = LogId(self.logs.len());
        log.id = id;
        self.logs.push(log);
        id
    }

    pub(crate) fn dive_mut(&mut self, id: DiveId) -> &mut Dive {
        &mut self.dives[id.0]
    }

    pub(crate) fn dives_mut(&mut self) -> &mut [Dive] {
        &mut self.dives
    }

    fn new_group(&mut self, name: Option<String>, log: Option<LogId>) -> GroupId {
        let id = GroupId(self.groups.len());
        tracing::debug!(group = id.0, name = name.as_deref().unwrap_or(""), "new group");
        self.groups.push(Group::new(id, name, log));
        id
    }

    fn find_group(&mut self, log: LogId, date: Option<&str>) -> GroupId {
        let found = match self.config.group {
            GroupBy::None => self.groups.first(),
            GroupBy::Date => self.groups.iter().find(|g| g.name.as_deref() == date),
            GroupBy::Diver => {
                let diver = self.logs[log.0].diver.as_deref();
                self.groups.iter().find(|g| g.name.as_deref() == diver)
            }
            GroupBy::DiveLog => {
                let this = &self.logs[log.0];
                self.groups.iter().find(|g| {
                    g.log
                        .is_some_and(|other| self.logs[other.0].same_identity(this))
                })
            }
        }
        .map(|group| group.id);
        if let Some(id) = found {
            return id;
        }
        match self.config.group {
            GroupBy::None => self.new_group(None, None),
            GroupBy::Date => self.new_group(date.map(str::to_string), None),
            GroupBy::Diver => self.new_group(self.logs[log.0].diver.clone(), None),
            GroupBy::DiveLog => self.new_group(self.logs[log.0].label(), Some(log)),
        }
    }

    fn queue_key(&self, dive: &Dive) -> Option<i64> {
        if !dive.is_timed() {
            return None;
        }
        if self.config.split {
            Some(dive.datetime - self.groups[dive.group.0].min_datetime)
        } else {
            Some(dive.datetime)
        }
    }

    /// Creates a dive of `log`, puts it into its group and into the queue.
    ///
    /// `date` is the literal date attribute, used as the key when grouping
    /// by date. `datetime` is zero when the start time is unknown.
    pub(crate) fn begin_dive(&mut self, log: LogId, date: Option<&str>, datetime: i64) -> DiveId {
        let id = DiveId(self.dives.len());
        let group_id = self.find_group(log, date);
        let mut dive = Dive::new(id, log, group_id);
        dive.datetime = datetime;

        if dive.is_timed() {
            if self.timestamp_min == 0 || datetime < self.timestamp_min {
                self.timestamp_min = datetime;
            }
            self.timestamp_max = self.timestamp_max.max(datetime);
            let group = &mut self.groups[group_id.0];
            if group.min_datetime == 0 || datetime < group.min_datetime {
                group.min_datetime = datetime;
            }
            group.max_datetime = group.max_datetime.max(datetime);
        }

        let group = &self.groups[group_id.0];
        let member_pos = match self.config.order {
            OrderBy::Date => ordered_position(OrderBy::Date, &self.dives, &group.dives, &dive),
            _ => group.dives.len(),
        };
        let queue_pos = match self.queue_key(&dive) {
            None => self.queue.len(),
            Some(key) => self
                .queue
                .iter()
                .position(|q| match self.queue_key(&self.dives[q.0]) {
                    None => true,
                    Some(other) => other > key,
                })
                .unwrap_or(self.queue.len()),
        };

        self.dives.push(dive);
        self.groups[group_id.0].dives.insert(member_pos, id);
        self.queue.insert(queue_pos, id);
        id
    }

    /// Records that a sample at `time` seconds was added to the dive.
    pub(crate) fn note_sample(&mut self, id: DiveId, time: u32) {
        let dive = &self.dives[id.0];
        if dive.is_timed() {
            let end = dive.datetime + i64::from(time);
            self.timestamp_max = self.timestamp_max.max(end);
        }
    }

    /// Finalizes the dive once its samples are complete: updates the group
    /// extrema and moves the dive to its place in the group if the order
    /// depends on the samples.
    pub(crate) fn end_dive(&mut self, id: DiveId) {
        let dive = &self.dives[id.0];
        let group_id = dive.group;
        let group = &mut self.groups[group_id.0];
        if dive.is_timed() {
            let end = dive.datetime + i64::from(dive.max_time);
            group.max_datetime = group.max_datetime.max(end);
        }
        group.max_depth = group.max_depth.max(dive.max_depth);

        if self.config.order.needs_readd() {
            let members = &mut self.groups[group_id.0].dives;
            if let Some(pos) = members.iter().position(|&m| m == id) {
                members.remove(pos);
            }
            let pos = ordered_position(
                self.config.order,
                &self.dives,
                &self.groups[group_id.0].dives,
                &self.dives[id.0],
            );
            self.groups[group_id.0].dives.insert(pos, id);
        }
    }
}

impl Default for Logbook {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests;

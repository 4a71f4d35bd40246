/*
** This file is a part of Divexml (streaming dive log XML parser)
** Copyright (C) 2025 Gurer Ozen
**
** Divexml is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use super::*;

const T0: i64 = 1_500_000_000;

fn logbook(group: GroupBy, order: OrderBy) -> Logbook {
    Logbook::new(Config::new(group, order))
}

fn diver_log(book: &mut Logbook, diver: Option<&str>) -> LogId {
    book.add_log(DiveLog {
        diver: diver.map(str::to_string),
        ..Default::default()
    })
}

fn add_dive(
    book: &mut Logbook,
    log: LogId,
    date: Option<&str>,
    datetime: i64,
    profile: &[(u32, f64)],
) -> DiveId {
    let id = book.begin_dive(log, date, datetime);
    for &(time, depth) in profile {
        let dive = book.dive_mut(id);
        let index = dive.insert_sample(time);
        dive.set_depth(index, depth).unwrap();
        book.note_sample(id, time);
    }
    book.end_dive(id);
    id
}

fn ids(list: &[DiveId]) -> Vec<usize> {
    list.iter().map(|id| id.0).collect()
}

#[test]
fn chronological_groups() {
    let mut book = logbook(GroupBy::None, OrderBy::Date);
    let log = diver_log(&mut book, None);
    add_dive(&mut book, log, None, T0 + 200, &[]);
    add_dive(&mut book, log, None, 0, &[]);
    add_dive(&mut book, log, None, T0, &[]);
    add_dive(&mut book, log, None, T0 + 200, &[]);
    add_dive(&mut book, log, None, 0, &[]);

    assert_eq!(book.groups().len(), 1);
    let group = &book.groups()[0];
    assert_eq!(ids(&group.dives), [2, 0, 3, 1, 4]);
    assert_eq!(group.min_datetime, T0);
    assert_eq!(ids(book.queue()), [2, 0, 3, 1, 4]);
    assert_eq!(book.timestamp_min(), T0);
    assert_eq!(book.timestamp_max(), T0 + 200);
}

#[test]
fn depth_order_settles_when_the_dive_ends() {
    let mut book = logbook(GroupBy::None, OrderBy::MaxDepthDesc);
    let log = diver_log(&mut book, None);
    add_dive(&mut book, log, None, T0, &[(0, 5.0), (60, 10.0)]);
    add_dive(&mut book, log, None, T0 + 10, &[(0, 30.0)]);

    // While a dive is open it waits at the end of its group.
    let open = book.begin_dive(log, None, T0 + 20);
    assert_eq!(ids(&book.groups()[0].dives), [1, 0, 2]);
    let dive = book.dive_mut(open);
    let index = dive.insert_sample(0);
    dive.set_depth(index, 20.0).unwrap();
    book.end_dive(open);
    assert_eq!(ids(&book.groups()[0].dives), [1, 2, 0]);

    add_dive(&mut book, log, None, T0 + 30, &[(0, 20.0)]);
    let depths: Vec<f64> = book.group_dives(GroupId(0)).map(|d| d.max_depth).collect();
    assert_eq!(depths, [30.0, 20.0, 20.0, 10.0]);
    assert_eq!(ids(&book.groups()[0].dives), [1, 2, 3, 0]);
    assert_eq!(book.groups()[0].max_depth, 30.0);
}

#[test]
fn time_orders() {
    for (order, expected) in [
        (OrderBy::MaxTimeAsc, [1usize, 2, 0]),
        (OrderBy::MaxTimeDesc, [0, 2, 1]),
        (OrderBy::MaxDepthAsc, [2, 0, 1]),
    ] {
        let mut book = logbook(GroupBy::None, order);
        let log = diver_log(&mut book, None);
        add_dive(&mut book, log, None, 0, &[(0, 3.0), (600, 8.0)]);
        add_dive(&mut book, log, None, 0, &[(0, 4.0), (100, 9.0)]);
        add_dive(&mut book, log, None, 0, &[(0, 1.0), (300, 2.0)]);
        assert_eq!(ids(&book.groups()[0].dives), expected, "{}", order);
        // Untimed dives keep their order in the queue.
        assert_eq!(ids(book.queue()), [0, 1, 2]);
    }
}

#[test]
fn group_by_date() {
    let mut book = logbook(GroupBy::Date, OrderBy::Date);
    let log = diver_log(&mut book, None);
    add_dive(&mut book, log, Some("2017-03-01"), T0, &[]);
    add_dive(&mut book, log, Some("2017-03-02"), T0 + 86400, &[]);
    add_dive(&mut book, log, None, 0, &[]);
    add_dive(&mut book, log, Some("2017-03-01"), T0 + 3600, &[]);
    add_dive(&mut book, log, None, 0, &[]);

    let groups = book.groups();
    assert_eq!(groups.len(), 3);
    assert_eq!(groups[0].name.as_deref(), Some("2017-03-01"));
    assert_eq!(ids(&groups[0].dives), [0, 3]);
    assert_eq!(groups[1].name.as_deref(), Some("2017-03-02"));
    assert_eq!(groups[2].name, None);
    assert_eq!(ids(&groups[2].dives), [2, 4]);
    assert_eq!(book.dive(DiveId(3)).group, GroupId(0));
}

#[test]
fn group_by_diver() {
    let mut book = logbook(GroupBy::Diver, OrderBy::Date);
    let kim = diver_log(&mut book, Some("Kim"));
    let alex = diver_log(&mut book, Some("Alex"));
    let kim_again = diver_log(&mut book, Some("Kim"));
    add_dive(&mut book, kim, None, T0, &[]);
    add_dive(&mut book, alex, None, T0, &[]);
    add_dive(&mut book, kim_again, None, T0 + 10, &[]);
    assert_eq!(book.groups().len(), 2);
    assert_eq!(book.groups()[0].name.as_deref(), Some("Kim"));
    assert_eq!(ids(&book.groups()[0].dives), [0, 2]);
}

#[test]
fn group_by_divelog_identity() {
    let mut book = logbook(GroupBy::DiveLog, OrderBy::Date);
    let base = DiveLog {
        vendor: Some("Suunto".into()),
        product: Some("D6i".into()),
        diver: Some("Kim".into()),
        ..Default::default()
    };
    let first = book.add_log(base.clone());
    let same = book.add_log(DiveLog {
        program: Some("divecmd".into()),
        ..base.clone()
    });
    let other_product = book.add_log(DiveLog {
        product: Some("Vyper".into()),
        ..base.clone()
    });
    let other_diver = book.add_log(DiveLog {
        diver: Some("Alex".into()),
        ..base.clone()
    });
    let no_diver = book.add_log(DiveLog {
        diver: None,
        ..base
    });

    let a = add_dive(&mut book, first, None, T0, &[]);
    let b = add_dive(&mut book, same, None, T0 + 1, &[]);
    let c = add_dive(&mut book, other_product, None, T0 + 2, &[]);
    let d = add_dive(&mut book, other_diver, None, T0 + 3, &[]);
    let e = add_dive(&mut book, no_diver, None, T0 + 4, &[]);

    assert_eq!(book.dive(a).group, book.dive(b).group);
    let groups: Vec<GroupId> = [a, c, d, e].iter().map(|&id| book.dive(id).group).collect();
    assert_eq!(groups, [GroupId(0), GroupId(1), GroupId(2), GroupId(3)]);
    assert_eq!(book.groups()[0].name.as_deref(), Some("Suunto D6i Kim"));
    assert_eq!(book.groups()[0].log, Some(first));
}

#[test]
fn split_queue_interleaves_groups() {
    for (split, expected) in [(false, [0usize, 1, 2, 3, 4]), (true, [0, 2, 3, 1, 4])] {
        let mut book = Logbook::new(Config::new(GroupBy::Diver, OrderBy::Date).with_split(split));
        let kim = diver_log(&mut book, Some("Kim"));
        let alex = diver_log(&mut book, Some("Alex"));
        add_dive(&mut book, kim, None, T0, &[]);
        add_dive(&mut book, kim, None, T0 + 100, &[]);
        add_dive(&mut book, alex, None, T0 + 1000, &[]);
        add_dive(&mut book, alex, None, T0 + 1050, &[]);
        add_dive(&mut book, alex, None, 0, &[]);
        assert_eq!(ids(book.queue()), expected, "split {}", split);
    }
}

#[test]
fn group_and_run_extrema() {
    let mut book = logbook(GroupBy::None, OrderBy::Date);
    let log = diver_log(&mut book, None);
    add_dive(&mut book, log, None, T0, &[(0, 1.0), (1800, 2.0)]);
    add_dive(&mut book, log, None, T0 - 7200, &[(0, 1.0), (600, 2.0)]);
    let group = &book.groups()[0];
    assert_eq!(group.min_datetime, T0 - 7200);
    assert_eq!(group.max_datetime, T0 + 1800);
    assert_eq!(book.timestamp_min(), T0 - 7200);
    assert_eq!(book.timestamp_max(), T0 + 1800);
}

#[test]
fn clear_releases_everything() {
    let mut book = logbook(GroupBy::Date, OrderBy::MaxDepthAsc);
    let log = diver_log(&mut book, None);
    add_dive(&mut book, log, Some("2017-03-01"), T0, &[(0, 1.0)]);
    book.report(Diagnostic {
        severity: Severity::Warning,
        source: "-".into(),
        location: None,
        message: "test".into(),
    });
    book.report(Diagnostic {
        severity: Severity::Debug,
        source: "-".into(),
        location: None,
        message: "not kept".into(),
    });
    assert_eq!(book.diagnostics().len(), 1);
    assert!(!book.has_errors());
    book.clear();
    assert!(book.is_empty());
    assert!(book.groups().is_empty());
    assert!(book.logs().is_empty());
    assert!(book.queue().is_empty());
    assert!(book.diagnostics().is_empty());
    assert_eq!(book.timestamp_min(), 0);
    assert_eq!(book.config().order, OrderBy::MaxDepthAsc);
}

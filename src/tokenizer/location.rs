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

/// A position in the tokenizer input byte stream.
///
/// Lines and columns are counted from zero the same way the bytes are,
/// so the first byte of a document is at line 0, column 0. Diagnostics
/// add one to both when they are shown to the user.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Location {
    /// Byte position in the input stream.
    pub bytes: usize,
    /// How many lines have been read before this position.
    pub lines: usize,
    /// How many bytes after the last newline character.
    pub column: usize,
}

impl Location {
    /// Creates a new location at the beginning of the input stream.
    pub fn new() -> Self {
        Location {
            bytes: 0,
            lines: 0,
            column: 0,
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.lines + 1, self.column + 1)
    }
}

/// Newline offsets seen so far in a byte stream.
///
/// The tokenizer reads ahead of the events it reports, so positions are
/// resolved against the newlines observed in the raw chunks rather than by
/// counting as events go by. Lookups only move forward, so newlines before
/// the current event are folded into a count.
#[derive(Debug, Default)]
pub(super) struct LineIndex {
    newlines: Vec<usize>,
    /// Number of newlines folded away.
    folded: usize,
    /// Offset of the last folded newline.
    last_folded: Option<usize>,
}

impl LineIndex {
    pub(super) fn new() -> Self {
        LineIndex {
            newlines: Vec::new(),
            folded: 0,
            last_folded: None,
        }
    }

    pub(super) fn clear(&mut self) {
        self.newlines.clear();
        self.folded = 0;
        self.last_folded = None;
    }

    /// Records the newlines of a chunk which starts at `offset`.
    pub(super) fn observe(&mut self, offset: usize, chunk: &[u8]) {
        self.newlines.extend(
            chunk
                .iter()
                .enumerate()
                .filter(|(_, c)| **c == b'\n')
                .map(|(i, _)| offset + i),
        );
    }

    /// Folds the newlines before `bytes`. Positions before it cannot be
    /// located afterwards.
    pub(super) fn fold_before(&mut self, bytes: usize) {
        let count = self.newlines.partition_point(|&nl| nl < bytes);
        if count > 0 {
            self.last_folded = Some(self.newlines[count - 1]);
            self.folded += count;
            self.newlines.drain(..count);
        }
    }

    #[cfg(test)]
    pub(super) fn retained(&self) -> usize {
        self.newlines.len()
    }

    pub(super) fn locate(&self, bytes: usize) -> Location {
        let pending = self.newlines.partition_point(|&nl| nl < bytes);
        let last = match pending {
            0 => self.last_folded,
            n => Some(self.newlines[n - 1]),
        };
        let column = match last {
            Some(nl) => bytes.saturating_sub(nl + 1),
            None => bytes,
        };
        Location {
            bytes,
            lines: self.folded + pending,
            column,
        }
    }
}

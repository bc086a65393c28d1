// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Line-based unified diff.
//
// Alignment is Myers' O((N+M)D) shortest edit script in its linear-space
// form: find the middle snake, recurse on both halves, and trim common
// prefix and suffix at every level. Hunks carry three lines of context and
// use the usual `@@ -a,b +c,d @@` range notation.

use pruefwerk_core::{DiffLine, DiffLineKind, UnifiedDiff};

/// Lines of unchanged context around each change.
pub const CONTEXT_LINES: usize = 3;

/// A run of lines: `old[old_start..old_end]` ↔ `new[new_start..new_end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Opcode {
    tag: Tag,
    old_start: usize,
    old_end: usize,
    new_start: usize,
    new_end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Equal,
    /// Lines removed from `old` and/or added from `new`.
    Change,
}

/// Single-line edit produced by the Myers backtrack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edit {
    Equal,
    Delete,
    Insert,
}

/// Diff two texts line by line.
///
/// Returns `None` when the texts split into identical line sequences.
pub fn unified_diff(old: &str, new: &str, old_label: &str, new_label: &str) -> Option<UnifiedDiff> {
    let old_lines = split_lines(old);
    let new_lines = split_lines(new);

    let opcodes = opcodes(&old_lines, &new_lines);
    let groups = grouped(&opcodes, CONTEXT_LINES);
    if groups.is_empty() {
        return None;
    }

    let mut lines = vec![
        DiffLine::new(DiffLineKind::OldFileHeader, old_label),
        DiffLine::new(DiffLineKind::NewFileHeader, new_label),
    ];
    for group in groups {
        let (first, last) = (group[0], group[group.len() - 1]);
        lines.push(DiffLine::new(
            DiffLineKind::HunkHeader,
            format!(
                "@@ -{} +{} @@",
                format_range(first.old_start, last.old_end),
                format_range(first.new_start, last.new_end)
            ),
        ));
        for op in group {
            match op.tag {
                Tag::Equal => lines.extend(
                    old_lines[op.old_start..op.old_end]
                        .iter()
                        .map(|line| DiffLine::new(DiffLineKind::Context, *line)),
                ),
                Tag::Change => {
                    lines.extend(
                        old_lines[op.old_start..op.old_end]
                            .iter()
                            .map(|line| DiffLine::new(DiffLineKind::Removed, *line)),
                    );
                    lines.extend(
                        new_lines[op.new_start..op.new_end]
                            .iter()
                            .map(|line| DiffLine::new(DiffLineKind::Added, *line)),
                    );
                }
            }
        }
    }

    Some(UnifiedDiff::from_lines(lines))
}

/// `start,len` with 1-based start; a single line omits the length and an
/// empty range points at the line before it.
fn format_range(start: usize, end: usize) -> String {
    let length = end - start;
    match length {
        1 => format!("{}", start + 1),
        0 => format!("{},0", start),
        _ => format!("{},{}", start + 1, length),
    }
}

/// Split opcodes into hunks with `context` lines of surrounding equality.
fn grouped(opcodes: &[Opcode], context: usize) -> Vec<Vec<Opcode>> {
    if !opcodes.iter().any(|op| op.tag == Tag::Change) {
        return Vec::new();
    }

    let mut codes = opcodes.to_vec();
    if let Some(first) = codes.first_mut()
        && first.tag == Tag::Equal
    {
        first.old_start = first.old_start.max(first.old_end.saturating_sub(context));
        first.new_start = first.new_start.max(first.new_end.saturating_sub(context));
    }
    if let Some(last) = codes.last_mut()
        && last.tag == Tag::Equal
    {
        last.old_end = last.old_end.min(last.old_start + context);
        last.new_end = last.new_end.min(last.new_start + context);
    }

    let mut groups = Vec::new();
    let mut group: Vec<Opcode> = Vec::new();
    for mut op in codes {
        if op.tag == Tag::Equal && op.old_end - op.old_start > 2 * context {
            group.push(Opcode {
                old_end: op.old_end.min(op.old_start + context),
                new_end: op.new_end.min(op.new_start + context),
                ..op
            });
            groups.push(std::mem::take(&mut group));
            op.old_start = op.old_start.max(op.old_end - context);
            op.new_start = op.new_start.max(op.new_end - context);
        }
        group.push(op);
    }
    if !(group.is_empty() || (group.len() == 1 && group[0].tag == Tag::Equal)) {
        groups.push(group);
    }
    groups
}

/// Split on `\n`, `\r\n` and bare `\r`. A trailing terminator does not
/// start an extra empty line.
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        match rest.find(['\n', '\r']) {
            Some(pos) => {
                lines.push(&rest[..pos]);
                let terminator = if rest[pos..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[pos + terminator..];
            }
            None => {
                lines.push(rest);
                break;
            }
        }
    }
    lines
}

/// Collapse a line-level edit script into equal/change runs.
fn opcodes(old: &[&str], new: &[&str]) -> Vec<Opcode> {
    let mut edits = Vec::with_capacity(old.len() + new.len());
    conquer(old, new, &mut edits);

    let mut codes: Vec<Opcode> = Vec::new();
    let (mut i, mut j) = (0usize, 0usize);
    for edit in edits {
        let tag = if edit == Edit::Equal { Tag::Equal } else { Tag::Change };
        let (di, dj) = match edit {
            Edit::Equal => (1, 1),
            Edit::Delete => (1, 0),
            Edit::Insert => (0, 1),
        };
        match codes.last_mut() {
            Some(last) if last.tag == tag => {
                last.old_end += di;
                last.new_end += dj;
            }
            _ => codes.push(Opcode {
                tag,
                old_start: i,
                old_end: i + di,
                new_start: j,
                new_end: j + dj,
            }),
        }
        i += di;
        j += dj;
    }
    codes
}

/// Furthest-reaching x per diagonal `k`, for `k` in `-bound..=bound`.
struct Frontier {
    xs: Vec<usize>,
    offset: isize,
}

impl Frontier {
    fn new(bound: usize) -> Self {
        Self {
            xs: vec![0; 2 * bound + 1],
            offset: bound as isize,
        }
    }

    fn get(&self, k: isize) -> usize {
        self.xs[(k + self.offset) as usize]
    }

    fn set(&mut self, k: isize, x: usize) {
        self.xs[(k + self.offset) as usize] = x;
    }
}

fn common_prefix(a: &[&str], b: &[&str]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

fn common_suffix(a: &[&str], b: &[&str]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

/// Append the shortest edit script turning `a` into `b` to `edits`.
fn conquer(a: &[&str], b: &[&str], edits: &mut Vec<Edit>) {
    let prefix = common_prefix(a, b);
    edits.extend(std::iter::repeat_n(Edit::Equal, prefix));
    let (a, b) = (&a[prefix..], &b[prefix..]);
    let suffix = common_suffix(a, b);
    let (a, b) = (&a[..a.len() - suffix], &b[..b.len() - suffix]);

    if a.is_empty() {
        edits.extend(std::iter::repeat_n(Edit::Insert, b.len()));
    } else if b.is_empty() {
        edits.extend(std::iter::repeat_n(Edit::Delete, a.len()));
    } else {
        let (x, y) = middle_snake(a, b);
        conquer(&a[..x], &b[..y], edits);
        conquer(&a[x..], &b[y..], edits);
    }

    edits.extend(std::iter::repeat_n(Edit::Equal, suffix));
}

/// Split point of an optimal path through `a` × `b`.
///
/// Runs the greedy search forwards from the origin and backwards from the
/// far corner until the two frontiers overlap. Both slices must be non-empty
/// and differ in their first and last elements, so the optimal path has at
/// least two edits and the returned point is strictly inside it.
fn middle_snake(a: &[&str], b: &[&str]) -> (usize, usize) {
    let (n, m) = (a.len(), b.len());
    let delta = n as isize - m as isize;
    let odd = delta.rem_euclid(2) == 1;
    let max_d = (n + m).div_ceil(2) + 1;
    let mut forward = Frontier::new(max_d + 1);
    let mut backward = Frontier::new(max_d + 1);

    for d in 0..=max_d as isize {
        for k in (-d..=d).step_by(2) {
            let start = if k == -d || (k != d && forward.get(k - 1) < forward.get(k + 1)) {
                forward.get(k + 1)
            } else {
                forward.get(k - 1) + 1
            };
            let start_y = (start as isize - k) as usize;
            let (mut x, mut y) = (start, start_y);
            while x < n && y < m && a[x] == b[y] {
                x += 1;
                y += 1;
            }
            forward.set(k, x);
            // Backward diagonal `delta - k` holds round d-1 values here.
            if odd && (k - delta).abs() < d && x + backward.get(delta - k) >= n {
                return (start, start_y);
            }
        }

        // Backward coordinates count from the far corner.
        for k in (-d..=d).step_by(2) {
            let mut x = if k == -d || (k != d && backward.get(k - 1) < backward.get(k + 1)) {
                backward.get(k + 1)
            } else {
                backward.get(k - 1) + 1
            };
            let mut y = (x as isize - k) as usize;
            while x < n && y < m && a[n - x - 1] == b[m - y - 1] {
                x += 1;
                y += 1;
            }
            backward.set(k, x);
            if !odd && (k - delta).abs() <= d && x + forward.get(delta - k) >= n {
                return (n - x, m - y);
            }
        }
    }

    // The frontiers always meet by round ceil((n + m) / 2).
    unreachable!("middle snake search exhausted for {}x{} input", n, m)
}

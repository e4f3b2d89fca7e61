//! Line-level edit scripts for rendering tool-generated file changes.
//!
//! The script is computed with longest-common-subsequence dynamic programming
//! over line arrays. Inputs longer than [`MAX_LCS_LINES`] skip the quadratic
//! pass and degrade to a full remove/add script, bounding worst-case cost at
//! the expense of diff quality for large files.
//!
//! For display, [`window_context`] drops unchanged stretches that sit more
//! than [`CONTEXT_RADIUS`] lines away from any changed line.

/// Classification of a single script line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffKind {
    Context,
    Add,
    Remove,
}

/// One line of an edit script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub kind: DiffKind,
    pub text: String,
}

impl DiffLine {
    fn new(kind: DiffKind, text: &str) -> Self {
        Self {
            kind,
            text: text.to_string(),
        }
    }

    #[must_use]
    pub fn is_change(&self) -> bool {
        matches!(self.kind, DiffKind::Add | DiffKind::Remove)
    }
}

/// Added/removed line counts for a script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub additions: usize,
    pub deletions: usize,
}

impl DiffStats {
    pub fn merge(&mut self, other: DiffStats) {
        self.additions += other.additions;
        self.deletions += other.deletions;
    }
}

/// Largest input (in lines, either side) still diffed with the LCS pass.
pub const MAX_LCS_LINES: usize = 500;

/// Context lines farther than this from any change are windowed away.
pub const CONTEXT_RADIUS: usize = 2;

/// Computes the full line-level edit script between `old` and `new`.
///
/// Identical inputs produce an all-context script; an empty input produces a
/// one-sided script. Above [`MAX_LCS_LINES`] the result is every old line
/// removed followed by every new line added.
#[must_use]
pub fn diff_lines(old: &str, new: &str) -> Vec<DiffLine> {
    let old_lines = split_lines(old);
    let new_lines = split_lines(new);

    if old_lines.len() > MAX_LCS_LINES || new_lines.len() > MAX_LCS_LINES {
        return fallback_script(&old_lines, &new_lines);
    }

    lcs_script(&old_lines, &new_lines)
}

/// Computes the edit script and windows it for display in one step.
#[must_use]
pub fn windowed_diff(old: &str, new: &str) -> Vec<DiffLine> {
    window_context(&diff_lines(old, new))
}

/// Keeps every changed line, and context lines within [`CONTEXT_RADIUS`]
/// of a change in either direction. Long unchanged stretches disappear.
#[must_use]
pub fn window_context(script: &[DiffLine]) -> Vec<DiffLine> {
    let mut keep = vec![false; script.len()];

    for (index, line) in script.iter().enumerate() {
        if !line.is_change() {
            continue;
        }

        let start = index.saturating_sub(CONTEXT_RADIUS);
        let end = (index + CONTEXT_RADIUS).min(script.len().saturating_sub(1));
        for slot in keep.iter_mut().take(end + 1).skip(start) {
            *slot = true;
        }
    }

    script
        .iter()
        .zip(keep)
        .filter_map(|(line, keep)| keep.then(|| line.clone()))
        .collect()
}

/// Counts added and removed lines in a script.
#[must_use]
pub fn stats(script: &[DiffLine]) -> DiffStats {
    let mut totals = DiffStats::default();
    for line in script {
        match line.kind {
            DiffKind::Add => totals.additions += 1,
            DiffKind::Remove => totals.deletions += 1,
            DiffKind::Context => {}
        }
    }

    totals
}

fn split_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        Vec::new()
    } else {
        text.lines().collect()
    }
}

fn fallback_script(old_lines: &[&str], new_lines: &[&str]) -> Vec<DiffLine> {
    let mut script = Vec::with_capacity(old_lines.len() + new_lines.len());
    script.extend(
        old_lines
            .iter()
            .map(|line| DiffLine::new(DiffKind::Remove, line)),
    );
    script.extend(
        new_lines
            .iter()
            .map(|line| DiffLine::new(DiffKind::Add, line)),
    );
    script
}

fn lcs_script(old_lines: &[&str], new_lines: &[&str]) -> Vec<DiffLine> {
    let rows = old_lines.len();
    let columns = new_lines.len();

    // dp[i][j] holds the LCS length of old_lines[..i] and new_lines[..j].
    let mut dp = vec![vec![0usize; columns + 1]; rows + 1];
    for i in 1..=rows {
        for j in 1..=columns {
            dp[i][j] = if old_lines[i - 1] == new_lines[j - 1] {
                dp[i - 1][j - 1] + 1
            } else {
                dp[i - 1][j].max(dp[i][j - 1])
            };
        }
    }

    let mut script = Vec::new();
    let mut i = rows;
    let mut j = columns;

    while i > 0 && j > 0 {
        if old_lines[i - 1] == new_lines[j - 1] {
            script.push(DiffLine::new(DiffKind::Context, old_lines[i - 1]));
            i -= 1;
            j -= 1;
        } else if dp[i][j - 1] >= dp[i - 1][j] {
            // Tie-break toward additions so insertions stay grouped.
            script.push(DiffLine::new(DiffKind::Add, new_lines[j - 1]));
            j -= 1;
        } else {
            script.push(DiffLine::new(DiffKind::Remove, old_lines[i - 1]));
            i -= 1;
        }
    }

    while j > 0 {
        script.push(DiffLine::new(DiffKind::Add, new_lines[j - 1]));
        j -= 1;
    }

    while i > 0 {
        script.push(DiffLine::new(DiffKind::Remove, old_lines[i - 1]));
        i -= 1;
    }

    script.reverse();
    script
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(script: &[DiffLine]) -> Vec<(&DiffKind, &str)> {
        script
            .iter()
            .map(|line| (&line.kind, line.text.as_str()))
            .collect()
    }

    #[test]
    fn identical_inputs_are_all_context() {
        let script = diff_lines("a\nb\nc", "a\nb\nc");
        assert!(script.iter().all(|line| line.kind == DiffKind::Context));
        assert!(window_context(&script).is_empty());
    }

    #[test]
    fn empty_old_is_add_only() {
        let script = diff_lines("", "a\nb");
        assert_eq!(
            texts(&script),
            vec![(&DiffKind::Add, "a"), (&DiffKind::Add, "b")]
        );
    }

    #[test]
    fn empty_new_is_remove_only() {
        let script = diff_lines("a\nb", "");
        assert_eq!(
            texts(&script),
            vec![(&DiffKind::Remove, "a"), (&DiffKind::Remove, "b")]
        );
    }

    #[test]
    fn single_line_replacement_keeps_surrounding_context() {
        let script = diff_lines("a\nb\nc", "a\nx\nc");
        let changed: Vec<_> = script.iter().filter(|line| line.is_change()).collect();
        assert_eq!(changed.len(), 2);
        assert!(changed
            .iter()
            .any(|line| line.kind == DiffKind::Remove && line.text == "b"));
        assert!(changed
            .iter()
            .any(|line| line.kind == DiffKind::Add && line.text == "x"));
    }

    #[test]
    fn window_keeps_context_within_radius_only() {
        let old = "a\nb\nc\nd\ne\nf\ng\nh";
        let new = "a\nb\nc\nd\ne\nf\ng\nH";
        let windowed = windowed_diff(old, new);

        // Change at the last line; only the two preceding context lines stay.
        assert_eq!(
            texts(&windowed),
            vec![
                (&DiffKind::Context, "f"),
                (&DiffKind::Context, "g"),
                (&DiffKind::Remove, "h"),
                (&DiffKind::Add, "H"),
            ]
        );
    }

    #[test]
    fn stats_count_changes_only() {
        let script = diff_lines("a\nb\nc", "a\nx\ny\nc");
        let totals = stats(&script);
        assert_eq!(totals.additions, 2);
        assert_eq!(totals.deletions, 1);
    }
}

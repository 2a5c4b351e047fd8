// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source context rendering with a column marker.

/// Lines shown above the target line, counting the target itself.
const LINES_BEFORE: usize = 4;
/// Line indices shown past the target's 1-based line number.
const LINES_AFTER: usize = 2;

/// Render the lines around `line` (1-based) with a caret beneath it.
///
/// The window covers 0-based indices `[line - 4, line + 2]`, clipped to the
/// file. The marker line is `column` spaces followed by `^` and is inserted
/// directly after the target line. The marker never extends past the end of
/// the target line, whatever column the map reports.
pub fn render_context(source: &str, line: u32, column: u32) -> String {
	let lines: Vec<&str> = source.split('\n').collect();
	let line = line as usize;

	let begin = line.saturating_sub(LINES_BEFORE);
	let end = (line + LINES_AFTER).min(lines.len() - 1);

	let mut window: Vec<String> = if begin <= end {
		lines[begin..=end].iter().map(|l| l.to_string()).collect()
	} else {
		Vec::new()
	};

	let width = lines
		.get(line.saturating_sub(1))
		.map_or(0, |l| l.chars().count())
		.min(column as usize);
	let marker = format!("{}^", " ".repeat(width));
	let at = line.saturating_sub(begin).min(window.len());
	window.insert(at, marker);

	window.join("\n")
}

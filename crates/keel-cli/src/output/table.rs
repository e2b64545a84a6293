//! Plain aligned tables for `--format table`.

const MIN_COLUMN_WIDTH: usize = 4;

#[derive(Clone, Copy, Debug)]
pub struct TableOptions {
    pub max_width: Option<usize>,
    pub color: bool,
}

/// Render string rows under `headers`, two spaces between columns.
///
/// Numeric cells are right-aligned. With `max_width`, the widest columns are
/// narrowed first and overflowing cells end in `…`.
#[must_use]
pub fn render_entity_table(
    headers: &[&str],
    rows: &[Vec<String>],
    options: TableOptions,
) -> String {
    let mut widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            rows.iter()
                .filter_map(|row| row.get(index))
                .map(|cell| display_len(cell))
                .max()
                .unwrap_or(0)
                .max(display_len(header))
                .max(MIN_COLUMN_WIDTH)
        })
        .collect();

    fit_widths(&mut widths, headers, options.max_width);

    let header_line = headers
        .iter()
        .zip(widths.iter())
        .map(|(header, width)| pad(&truncate_text(header, *width), *width, false))
        .collect::<Vec<_>>()
        .join("  ");
    let header_line = header_line.trim_end().to_string();

    let divider = "-".repeat(display_len(&header_line));

    let row_lines = rows.iter().map(|row| {
        widths
            .iter()
            .enumerate()
            .map(|(index, width)| {
                let value = row.get(index).map_or("-", String::as_str);
                let truncated = truncate_text(value, *width);
                let padded = pad(&truncated, *width, looks_numeric(&truncated));
                if options.color {
                    colorize_status(&padded, &truncated)
                } else {
                    padded
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    });

    let mut lines = Vec::with_capacity(2 + rows.len());
    lines.push(header_line);
    lines.push(divider);
    lines.extend(row_lines);
    lines.join("\n")
}

fn display_len(value: &str) -> usize {
    value.chars().count()
}

fn fit_widths(widths: &mut [usize], headers: &[&str], max_width: Option<usize>) {
    let Some(max_width) = max_width else {
        return;
    };
    let separators = widths.len().saturating_sub(1) * 2;

    while widths.iter().sum::<usize>() + separators > max_width {
        let widest = widths
            .iter()
            .enumerate()
            .filter(|(idx, width)| **width > display_len(headers[*idx]).max(MIN_COLUMN_WIDTH))
            .max_by_key(|(_, width)| **width)
            .map(|(idx, _)| idx);
        let Some(idx) = widest else {
            break;
        };
        widths[idx] -= 1;
    }
}

fn truncate_text(value: &str, width: usize) -> String {
    if display_len(value) <= width {
        return value.to_string();
    }
    if width <= 1 {
        return "…".to_string();
    }
    let mut out: String = value.chars().take(width - 1).collect();
    out.push('…');
    out
}

fn looks_numeric(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty()
        && trimmed.chars().any(|ch| ch.is_ascii_digit())
        && trimmed
            .chars()
            .all(|ch| ch.is_ascii_digit() || matches!(ch, '-' | '+' | '.' | ','))
        && !looks_like_date(trimmed)
}

/// `2026-05` and `2026-05-14` stay left-aligned with the other text.
fn looks_like_date(value: &str) -> bool {
    let parts: Vec<&str> = value.split('-').collect();
    (parts.len() == 2 || parts.len() == 3)
        && parts[0].len() == 4
        && parts[1..].iter().all(|part| part.len() == 2)
}

fn pad(value: &str, width: usize, right_align: bool) -> String {
    let fill = " ".repeat(width.saturating_sub(display_len(value)));
    if right_align {
        format!("{fill}{value}")
    } else {
        format!("{value}{fill}")
    }
}

/// Color a padded cell by the status word it holds.
fn colorize_status(padded: &str, word: &str) -> String {
    let code = match word.to_ascii_lowercase().as_str() {
        "active" | "completed" | "won" | "open" | "done" | "true" => "32",
        "planned" | "on_hold" | "draft" | "in_progress" | "new" | "contacted" | "qualified"
        | "proposal" | "negotiation" | "todo" => "33",
        "cancelled" | "lost" | "closed" | "false" => "31",
        _ => return padded.to_string(),
    };
    format!("\u{1b}[{code}m{padded}\u{1b}[0m")
}

#[cfg(test)]
fn strip_ansi(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' && chars.peek() == Some(&'[') {
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
            continue;
        }
        out.push(ch);
    }
    out
}

/*!
format.rs

Human-output formatting for the `invoke` CLI: colors, emoji tags, a boxed
header line and aligned tables.

  - NO_COLOR disables ANSI colors, NO_EMOJI disables emoji tags.
  - COLUMNS (clamped to 40..=220, default 100) bounds box and table width.
  - Functions return strings; nothing here prints.
  - JSON output paths do not use these helpers.
*/

use std::borrow::Cow;

#[derive(Debug, Clone)]
pub struct StyleOptions {
    pub use_color: bool,
    pub use_emoji: bool,
    pub term_width: usize,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self::detect()
    }
}

impl StyleOptions {
    pub fn detect() -> Self {
        let term_width = std::env::var("COLUMNS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .map(|w| w.clamp(40, 220))
            .unwrap_or(100);
        StyleOptions {
            use_color: std::env::var_os("NO_COLOR").is_none(),
            use_emoji: std::env::var_os("NO_EMOJI").is_none(),
            term_width,
        }
    }

    /// No color, no emoji; used by tests.
    #[cfg(test)]
    pub fn plain(term_width: usize) -> Self {
        StyleOptions {
            use_color: false,
            use_emoji: false,
            term_width,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Role {
    Primary,
    Secondary,
    Accent,
    Success,
    Error,
    Dim,
}

pub fn color(role: Role, text: impl AsRef<str>, style: &StyleOptions) -> String {
    if !style.use_color {
        return text.as_ref().to_string();
    }
    let code = match role {
        Role::Primary => "38;5;45",
        Role::Secondary => "38;5;250",
        Role::Accent => "38;5;213",
        Role::Success => "38;5;82",
        Role::Error => "38;5;196",
        Role::Dim => "2",
    };
    format!("\x1b[{code}m{}\x1b[0m", text.as_ref())
}

pub fn emoji(tag: &str, style: &StyleOptions) -> &'static str {
    if !style.use_emoji {
        return "";
    }
    match tag {
        "success" => "✔",
        "error" => "✖",
        "info" => "ℹ",
        "method" => "🛠",
        "list" => "📜",
        _ => "",
    }
}

/* -------------------------------------------------------------------------- */
/* Box Header                                                                 */
/* -------------------------------------------------------------------------- */

/// Single-line boxed title with an optional dimmed subtitle, truncated to the
/// terminal width.
pub fn box_header(
    title: impl AsRef<str>,
    subtitle: Option<impl AsRef<str>>,
    style: &StyleOptions,
) -> String {
    let mut plain = title.as_ref().to_string();
    if let Some(sub) = &subtitle {
        plain.push_str("  ");
        plain.push_str(sub.as_ref());
    }
    let max_inner = style.term_width.saturating_sub(4).max(10);
    let plain = truncate_ellipsis(&plain, max_inner);
    let inner_width = display_width(&plain);

    // Color the title part only when nothing was truncated away.
    let title_len = display_width(title.as_ref());
    let body = if inner_width > title_len && plain.starts_with(title.as_ref()) {
        let (t, rest) = plain.split_at(title.as_ref().len());
        format!(
            "{}{}",
            color(Role::Primary, t, style),
            color(Role::Secondary, rest, style)
        )
    } else {
        color(Role::Primary, &plain, style)
    };

    let bar = "─".repeat(inner_width + 2);
    format!("┌{bar}┐\n│ {body} │\n└{bar}┘")
}

/* -------------------------------------------------------------------------- */
/* Table Rendering                                                            */
/* -------------------------------------------------------------------------- */

/// Left-aligned columns separated by two spaces, header underlined. The
/// widest columns are truncated until the table fits `style.term_width`.
pub fn table(headers: &[&str], rows: &[Vec<String>], style: &StyleOptions) -> String {
    if headers.is_empty() {
        return String::new();
    }
    let cols = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| display_width(h)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(cols) {
            widths[i] = widths[i].max(display_width(cell));
        }
    }

    let budget = style.term_width;
    let mut total = widths.iter().sum::<usize>() + (cols - 1) * 2;
    while total > budget {
        let Some((idx, widest)) = widths
            .iter()
            .copied()
            .enumerate()
            .max_by_key(|(_, w)| *w)
        else {
            break;
        };
        if widest <= 4 {
            break;
        }
        let shrink = (total - budget).min(widest - 4);
        widths[idx] -= shrink;
        total -= shrink;
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(color(
        Role::Accent,
        render_row(headers.iter().copied(), &widths),
        style,
    ));
    let sep = widths
        .iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<_>>()
        .join("  ");
    lines.push(color(Role::Dim, sep, style));
    for row in rows {
        let cells = (0..cols).map(|c| row.get(c).map(String::as_str).unwrap_or(""));
        lines.push(render_row(cells, &widths));
    }
    lines.join("\n")
}

fn render_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths.iter())
        .map(|(cell, w)| pad(&truncate_ellipsis(cell, *w), *w))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

fn pad(s: &str, width: usize) -> String {
    let len = display_width(s);
    if len >= width {
        s.to_string()
    } else {
        format!("{s}{}", " ".repeat(width - len))
    }
}

pub fn truncate_ellipsis(s: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

/* -------------------------------------------------------------------------- */
/* ANSI / Width Utilities                                                     */
/* -------------------------------------------------------------------------- */

fn strip_ansi(s: &str) -> Cow<'_, str> {
    if !s.contains('\x1b') {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for t in chars.by_ref() {
                if t.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        out.push(c);
    }
    Cow::Owned(out)
}

fn display_width(s: &str) -> usize {
    strip_ansi(s).chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_header_contains_title_and_subtitle() {
        let style = StyleOptions::plain(80);
        let b = box_header("Title", Some("sub info"), &style);
        assert!(b.contains("Title  sub info"));
        assert_eq!(b.lines().count(), 3);
    }

    #[test]
    fn table_aligns_columns() {
        let style = StyleOptions::plain(80);
        let t = table(
            &["A", "B"],
            &[
                vec!["x".into(), "y".into()],
                vec!["longer".into(), "val".into()],
            ],
            &style,
        );
        let lines: Vec<&str> = t.lines().collect();
        assert_eq!(lines[0], "A       B");
        assert_eq!(lines[2], "x       y");
        assert_eq!(lines[3], "longer  val");
    }

    #[test]
    fn table_shrinks_to_width() {
        let style = StyleOptions::plain(40);
        let long = "z".repeat(100);
        let t = table(&["K", "V"], &[vec!["k".into(), long]], &style);
        assert!(t.lines().all(|l| display_width(l) <= 40));
        assert!(t.contains('…'));
    }

    #[test]
    fn truncate() {
        assert_eq!(truncate_ellipsis("abcdef", 4), "abc…");
        assert_eq!(truncate_ellipsis("abc", 4), "abc");
    }

    #[test]
    fn strip_ansi_removes_sequences() {
        assert_eq!(strip_ansi("\x1b[31mRED\x1b[0m"), "RED");
    }
}

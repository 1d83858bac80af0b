//! This crate contains utility functions used by the `Display`
//! implementations across the PARDA workspace, most notably the aligned
//! matrix table rendering of parametric difference-bound matrices.

use std::fmt::Display;

/// Size of a tab when indenting blocks
pub const TAB_SIZE: usize = 4;

/// Join an iterator of displayable items using the given separator
///
/// The separator is only inserted between items, never appended at the end.
///
/// # Example
///
/// ```
/// use parda_display_utils::join_iterator;
///
/// let list = vec!["a", "b", "c"];
/// assert_eq!(join_iterator(list.iter(), " /\\ "), "a /\\ b /\\ c");
/// assert_eq!(join_iterator(Vec::<u32>::new().iter(), ", "), "");
/// ```
pub fn join_iterator<T: Display>(items: impl IntoIterator<Item = T>, sep: &str) -> String {
    let mut out = String::new();
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            out.push_str(sep);
        }
        out.push_str(&item.to_string());
    }
    out
}

/// Indent every non-empty line of the input by one tab
///
/// # Example
///
/// ```
/// use parda_display_utils::indent_all;
///
/// assert_eq!(indent_all("a\nb"), "    a\n    b");
/// assert_eq!(indent_all("a\n\nb\n"), "    a\n\n    b\n");
/// ```
pub fn indent_all(input: &str) -> String {
    let tab = " ".repeat(TAB_SIZE);
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('\n') {
        let line = &rest[..pos];
        if !line.is_empty() {
            out.push_str(&tab);
        }
        out.push_str(line);
        out.push('\n');
        rest = &rest[pos + 1..];
    }
    if !rest.is_empty() {
        out.push_str(&tab);
        out.push_str(rest);
    }
    out
}

/// Render rows of cells as a table with left-aligned, padded columns
///
/// Every column is padded to the width of its widest cell, columns are
/// separated by two spaces, and rows by a newline. Rows may have different
/// lengths; missing trailing cells are simply absent from the output.
///
/// # Example
///
/// ```
/// use parda_display_utils::aligned_columns;
///
/// let rows = vec![
///     vec!["".to_string(), "x0".to_string(), "x1".to_string()],
///     vec!["x1".to_string(), "<= 0".to_string(), "< inf".to_string()],
/// ];
/// let table = aligned_columns(&rows);
/// let lines: Vec<&str> = table.lines().collect();
/// assert!(lines[1].starts_with("x1"));
/// assert_eq!(lines[0].find("x1"), lines[1].find("< inf"));
/// ```
pub fn aligned_columns(rows: &[Vec<String>]) -> String {
    let columns = rows.iter().map(|r| r.len()).max().unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for row in rows {
        for (c, cell) in row.iter().enumerate() {
            widths[c] = widths[c].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for (r, row) in rows.iter().enumerate() {
        if r > 0 {
            out.push('\n');
        }
        for (c, cell) in row.iter().enumerate() {
            if c > 0 {
                out.push_str("  ");
            }
            out.push_str(cell);
            // no padding after the last cell of a row
            if c + 1 < row.len() {
                let pad = widths[c] - cell.chars().count();
                out.push_str(&" ".repeat(pad));
            }
        }
    }
    out
}

//! Terminal rendering for rows, trees and query parameters.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use serde_json::Value;
use viewkit_engine::{MenuState, PageState, RowView};
use viewkit_model::{TreeNode, flatten_forest};

/// Default number of record columns when none are requested.
const DEFAULT_COLUMN_LIMIT: usize = 5;

/// Longest cell text before truncation.
const MAX_CELL_CHARS: usize = 48;

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

/// Record fields in first-seen order across `rows`, capped.
pub fn default_columns(rows: &[RowView]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for row in rows {
        for (field, _) in row.record.fields() {
            if columns.len() == DEFAULT_COLUMN_LIMIT {
                return columns;
            }
            if !columns.iter().any(|c| c == field) {
                columns.push(field.to_string());
            }
        }
    }
    columns
}

/// Row table: position, key, render identity, requested fields, edit flag.
pub fn rows_table(rows: &[RowView], columns: &[String], first_position: usize) -> Table {
    let mut table = Table::new();
    let mut header = vec![header_cell("#"), header_cell("Key"), header_cell("Identity")];
    header.extend(columns.iter().map(String::as_str).map(header_cell));
    header.push(header_cell("Edit"));
    table.set_header(header);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);

    for (offset, row) in rows.iter().enumerate() {
        let mut cells = vec![
            Cell::new(first_position + offset),
            key_cell(row),
            identity_cell(row),
        ];
        cells.extend(
            columns
                .iter()
                .map(|field| Cell::new(row.record.get(field).map(cell_text).unwrap_or_default())),
        );
        cells.push(if row.can_mutate {
            Cell::new("yes").fg(Color::Green)
        } else {
            dim_cell("no")
        });
        table.add_row(cells);
    }
    table
}

/// `page 2/3 (rows 11-20 of 25)`.
pub fn page_footer(state: &PageState, shown: usize) -> String {
    let start = state.page() * state.page_size();
    let range = if shown == 0 {
        "no rows".to_string()
    } else {
        format!("rows {}-{}", start + 1, start + shown)
    };
    format!(
        "page {}/{} ({range} of {})",
        state.page() + 1,
        state.page_count(),
        state.total()
    )
}

/// One line per node, indented two spaces per level.
///
/// With a menu state, branch nodes are marked `[+]` (closed) or `[-]`
/// (open); a node under a closed branch is not listed.
pub fn tree_lines(
    forest: &[TreeNode],
    id_field: &str,
    label_field: &str,
    menu: Option<&MenuState>,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut hidden_below: Option<usize> = None;
    for (depth, node) in flatten_forest(forest) {
        if let Some(limit) = hidden_below {
            if depth > limit {
                continue;
            }
            hidden_below = None;
        }
        let id = node.record.scalar_string(id_field).unwrap_or_default();
        let label = node
            .record
            .scalar_string(label_field)
            .unwrap_or_else(|| id.clone());
        let marker = match menu {
            Some(menu) if !node.children.is_empty() => {
                if menu.is_open(&id) {
                    "[-] "
                } else {
                    hidden_below = Some(depth);
                    "[+] "
                }
            }
            _ => "",
        };
        lines.push(format!("{}{marker}{label} ({id})", "  ".repeat(depth)));
    }
    lines
}

/// `key=value` lines.
pub fn params_lines(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Display text for a field value: strings unquoted, long text cut.
pub fn cell_text(value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    if text.chars().count() > MAX_CELL_CHARS {
        let cut: String = text.chars().take(MAX_CELL_CHARS - 3).collect();
        format!("{cut}...")
    } else {
        text
    }
}

fn key_cell(row: &RowView) -> Cell {
    if row.key.is_addressable() {
        Cell::new(&row.key).fg(Color::Blue)
    } else {
        dim_cell("-")
    }
}

fn identity_cell(row: &RowView) -> Cell {
    if row.identity.is_synthetic() {
        dim_cell(&row.identity)
    } else {
        Cell::new(&row.identity)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

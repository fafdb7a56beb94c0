//! Renders the classified nodes of one page region into a single text block.

use crate::page::{ListItem, Node};

/// Class attribute marking a negative status on availability list items.
const INACTIVE_STATUS_CLASS: &str = "status_2";

/// Fold nodes into one normalized text block, in encounter order.
pub fn format_nodes(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            Node::Heading(text) => {
                out.push('\n');
                out.push_str(text);
                out.push_str("\n\n");
            }
            Node::Paragraph(text) => {
                out.push('\n');
                out.push_str(text);
                out.push('\n');
            }
            Node::List(items) => {
                for item in items {
                    out.push_str(status_glyph(item));
                    out.push(' ');
                    out.push_str(&item.text);
                    out.push('\n');
                }
            }
            Node::Table(rows) => out.push_str(&format_table(rows)),
        }
    }
    out
}

/// Tri-state status glyph: neutral, negative, positive.
fn status_glyph(item: &ListItem) -> &'static str {
    match item.class.as_deref() {
        None | Some("") => "●",
        Some(INACTIVE_STATUS_CLASS) => "☒",
        Some(_) => "☑",
    }
}

/// Left-justify every cell to its column's maximum width, two spaces between
/// columns, one row per line. A table with no rows renders as nothing.
fn format_table(rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|col| {
            rows.iter()
                .filter_map(|row| row.get(col))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    rows.iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(col, cell)| format!("{:<width$}", cell, width = widths[col]))
                .collect::<Vec<_>>()
                .join("  ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(class: Option<&str>, text: &str) -> ListItem {
        ListItem {
            class: class.map(str::to_string),
            text: text.to_string(),
        }
    }

    fn table(rows: &[&[&str]]) -> Node {
        Node::Table(
            rows.iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn heading_gets_blank_line_after() {
        assert_eq!(
            format_nodes(&[Node::Heading("About".to_string())]),
            "\nAbout\n\n"
        );
    }

    #[test]
    fn paragraph_is_newline_wrapped() {
        assert_eq!(
            format_nodes(&[Node::Paragraph("Some text.".to_string())]),
            "\nSome text.\n"
        );
    }

    #[test]
    fn list_glyphs_cover_all_three_states() {
        let nodes = [Node::List(vec![
            item(None, "Outdoor work"),
            item(Some("status_2"), "Not accessible"),
            item(Some("status_1"), "Expenses paid"),
        ])];
        assert_eq!(
            format_nodes(&nodes),
            "● Outdoor work\n☒ Not accessible\n☑ Expenses paid\n"
        );
    }

    #[test]
    fn empty_class_counts_as_no_class() {
        let nodes = [Node::List(vec![item(Some(""), "Plain")])];
        assert_eq!(format_nodes(&nodes), "● Plain\n");
    }

    #[test]
    fn table_pads_cells_to_column_width() {
        let nodes = [table(&[&["Name", "Age"], &["Al", "30"]])];
        assert_eq!(format_nodes(&nodes), "Name  Age\nAl    30 ");
    }

    #[test]
    fn zero_row_table_formats_to_nothing() {
        assert_eq!(format_nodes(&[table(&[])]), "");
    }

    #[test]
    fn ragged_rows_do_not_panic() {
        let nodes = [table(&[&["Day"], &["Monday", "Yes"]])];
        assert_eq!(format_nodes(&nodes), "Day   \nMonday  Yes");
    }

    #[test]
    fn fragments_accumulate_in_encounter_order() {
        let nodes = [
            Node::Heading("Availability".to_string()),
            Node::Paragraph("Mornings preferred.".to_string()),
            Node::List(vec![item(None, "Monday")]),
        ];
        assert_eq!(
            format_nodes(&nodes),
            "\nAvailability\n\n\nMornings preferred.\n● Monday\n"
        );
    }

    #[test]
    fn empty_node_list_yields_empty_section() {
        assert_eq!(format_nodes(&[]), "");
    }
}

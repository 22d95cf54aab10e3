//! Plain-text rendering of forest snapshots (table and tree views).

use termtree::Tree;

use crate::config::DisplayConfig;
use crate::domain::{effective_value, variance_or, Forest, Row};

const LABEL_HEADER: &str = "Label";
const VALUE_HEADER: &str = "Value";
const VARIANCE_HEADER: &str = "Variance";

/// Render rows depth-first as aligned columns: indented label, effective value, variance.
pub fn render_table(forest: &Forest, display: &DisplayConfig) -> String {
    let lines: Vec<(String, String, String)> = forest
        .iter()
        .map(|(depth, row)| {
            (
                format!("{}{}", " ".repeat(depth * display.indent), row.label),
                format_value(row, display),
                variance_or(row, &display.na_sentinel),
            )
        })
        .collect();

    let label_width = lines
        .iter()
        .map(|(label, _, _)| label.chars().count())
        .chain(std::iter::once(LABEL_HEADER.len()))
        .max()
        .unwrap_or(0);
    let value_width = lines
        .iter()
        .map(|(_, value, _)| value.len())
        .chain(std::iter::once(VALUE_HEADER.len()))
        .max()
        .unwrap_or(0);

    let mut out = format!(
        "{:<label_width$}  {:>value_width$}  {}\n",
        LABEL_HEADER, VALUE_HEADER, VARIANCE_HEADER
    );
    for (label, value, variance) in &lines {
        out.push_str(&format!(
            "{:<label_width$}  {:>value_width$}  {:>8}\n",
            label, value, variance
        ));
    }
    out
}

/// Render each root as its own tree, nodes labelled `label [id] = value`.
pub fn render_tree(forest: &Forest, display: &DisplayConfig) -> String {
    if forest.is_empty() {
        return "Empty table\n".to_string();
    }
    forest
        .roots()
        .iter()
        .map(|root| to_tree(root, display).to_string())
        .collect()
}

fn to_tree(row: &Row, display: &DisplayConfig) -> Tree<String> {
    let node = format!("{} [{}] = {}", row.label, row.id, format_value(row, display));
    let leaves: Vec<_> = row
        .children
        .iter()
        .map(|child| to_tree(child, display))
        .collect();
    Tree::new(node).with_leaves(leaves)
}

fn format_value(row: &Row, display: &DisplayConfig) -> String {
    format!("{:.*}", display.value_precision, effective_value(row))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forest() -> Forest {
        Forest::new(vec![Row::new(1, "Total", 100.0)
            .with_override(110.0)
            .with_children(vec![
                Row::new(2, "A", 40.0).with_override(50.0),
                Row::new(3, "Zero", 0.0),
            ])])
    }

    #[test]
    fn given_forest_when_rendering_table_then_indents_and_formats() {
        let out = render_table(&forest(), &DisplayConfig::default());
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Label"));
        assert!(lines[1].starts_with("Total"));
        assert!(lines[1].contains("110.00"));
        assert!(lines[1].ends_with("10.00%"));
        assert!(lines[2].starts_with("  A"));
        assert!(lines[2].ends_with("25.00%"));
        assert!(lines[3].ends_with("N/A"));
    }

    #[test]
    fn given_forest_when_rendering_tree_then_nests_children() {
        let out = render_tree(&forest(), &DisplayConfig::default());
        assert!(out.starts_with("Total [1] = 110.00"));
        assert!(out.contains("A [2] = 50.00"));
        assert!(out.contains("Zero [3] = 0.00"));
    }

    #[test]
    fn given_empty_forest_when_rendering_tree_then_placeholder() {
        assert_eq!(
            render_tree(&Forest::default(), &DisplayConfig::default()),
            "Empty table\n"
        );
    }
}

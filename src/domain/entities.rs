//! Domain entities: rows, forests and the table document

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::error::{DomainError, DomainResult};

/// Stable identifier of a row, unique across the whole forest.
///
/// Table documents carry ids either as strings or as integers; both are
/// normalized to their textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RowId(String);

impl RowId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RowId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<i32> for RowId {
    fn from(id: i32) -> Self {
        Self(id.to_string())
    }
}

impl From<i64> for RowId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl std::str::FromStr for RowId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DomainError::MalformedInput("empty row id".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl<'de> Deserialize<'de> for RowId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Integer(i64),
            Unsigned(u64),
            Float(f64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => RowId(s),
            RawId::Integer(n) => RowId(n.to_string()),
            RawId::Unsigned(n) => RowId(n.to_string()),
            // `1.0` displays as `1`, so integral floats match their integer id
            RawId::Float(n) if n.is_finite() => RowId(n.to_string()),
            RawId::Float(n) => {
                return Err(serde::de::Error::custom(format!("row id is not finite: {n}")))
            }
        })
    }
}

/// One line item of the allocation table.
///
/// Field names on the wire follow the table document format: `value` is the
/// base value, `modifiedValue` the override left by a prior edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: RowId,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "value")]
    pub base_value: f64,
    #[serde(
        rename = "modifiedValue",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub override_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Arc<Row>>,
}

impl Row {
    pub fn new(id: impl Into<RowId>, label: impl Into<String>, base_value: f64) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            base_value,
            override_value: None,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Row>) -> Self {
        self.children = children.into_iter().map(Arc::new).collect();
        self
    }

    pub fn with_override(mut self, value: f64) -> Self {
        self.override_value = Some(value);
        self
    }

    /// Override if set, else base value.
    pub fn effective_value(&self) -> f64 {
        self.override_value.unwrap_or(self.base_value)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Ordered sequence of root rows.
///
/// Snapshots share unchanged subtrees: cloning a forest or producing a new
/// one from an edit only allocates the rows on the edited path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Forest {
    roots: Vec<Arc<Row>>,
}

impl Forest {
    pub fn new(roots: Vec<Row>) -> Self {
        Self {
            roots: roots.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn from_shared(roots: Vec<Arc<Row>>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[Arc<Row>] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total number of rows at all levels.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Depth-first, pre-order traversal yielding `(depth, row)`; roots have depth 0.
    pub fn iter(&self) -> ForestIter<'_> {
        ForestIter::new(self)
    }

    pub fn find(&self, id: &RowId) -> Option<&Row> {
        self.iter().map(|(_, row)| row).find(|row| &row.id == id)
    }

    pub fn contains(&self, id: &RowId) -> bool {
        self.find(id).is_some()
    }

    /// Number of levels of the deepest tree, 0 for an empty forest.
    pub fn depth(&self) -> usize {
        self.iter().map(|(depth, _)| depth + 1).max().unwrap_or(0)
    }

    pub fn leaf_ids(&self) -> Vec<RowId> {
        self.iter()
            .filter(|(_, row)| row.is_leaf())
            .map(|(_, row)| row.id.clone())
            .collect()
    }

    /// Rows from the root down to the parent of `id`.
    ///
    /// Returns `None` if `id` is not in the forest and an empty path for a root.
    pub fn ancestors_of(&self, id: &RowId) -> Option<Vec<&Row>> {
        fn walk<'a>(rows: &'a [Arc<Row>], id: &RowId, path: &mut Vec<&'a Row>) -> bool {
            for row in rows {
                if &row.id == id {
                    return true;
                }
                path.push(row.as_ref());
                if walk(&row.children, id, path) {
                    return true;
                }
                path.pop();
            }
            false
        }

        let mut path = Vec::new();
        walk(&self.roots, id, &mut path).then_some(path)
    }

    /// Fails with the first id that occurs more than once.
    pub fn validate_unique_ids(&self) -> DomainResult<()> {
        let mut seen = HashSet::new();
        for (_, row) in self.iter() {
            if !seen.insert(&row.id) {
                return Err(DomainError::ConflictingIdentifier(row.id.clone()));
            }
        }
        Ok(())
    }
}

pub struct ForestIter<'a> {
    stack: Vec<(usize, &'a Row)>,
}

impl<'a> ForestIter<'a> {
    fn new(forest: &'a Forest) -> Self {
        // Push in reverse for left-to-right traversal
        let stack = forest
            .roots
            .iter()
            .rev()
            .map(|row| (0, row.as_ref()))
            .collect();
        Self { stack }
    }
}

impl<'a> Iterator for ForestIter<'a> {
    type Item = (usize, &'a Row);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, row) = self.stack.pop()?;
        for child in row.children.iter().rev() {
            self.stack.push((depth + 1, child.as_ref()));
        }
        Some((depth, row))
    }
}

/// Top-level shape of a table document: `{"rows": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableDocument {
    pub rows: Forest,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Forest {
        Forest::new(vec![
            Row::new(1, "Total", 100.0).with_children(vec![
                Row::new(2, "A", 40.0),
                Row::new(3, "B", 60.0).with_children(vec![Row::new(4, "B1", 60.0)]),
            ]),
            Row::new(5, "Other", 10.0),
        ])
    }

    #[test]
    fn given_forest_when_iterating_then_visits_preorder_with_depth() {
        let forest = sample();
        let visited: Vec<(usize, &str)> =
            forest.iter().map(|(d, r)| (d, r.id.as_str())).collect();
        assert_eq!(
            visited,
            vec![(0, "1"), (1, "2"), (1, "3"), (2, "4"), (0, "5")]
        );
    }

    #[test]
    fn given_forest_when_querying_shape_then_reports_depth_len_and_leaves() {
        let forest = sample();
        assert_eq!(forest.len(), 5);
        assert_eq!(forest.depth(), 3);
        assert_eq!(
            forest.leaf_ids(),
            vec![RowId::from(2), RowId::from(4), RowId::from(5)]
        );
    }

    #[test]
    fn given_nested_row_when_asking_ancestors_then_returns_root_first_path() {
        let forest = sample();
        let path: Vec<&str> = forest
            .ancestors_of(&RowId::from(4))
            .unwrap()
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(path, vec!["1", "3"]);
        assert_eq!(forest.ancestors_of(&RowId::from(5)).unwrap().len(), 0);
        assert!(forest.ancestors_of(&RowId::from(99)).is_none());
    }

    #[test]
    fn given_duplicate_ids_in_cousins_when_validating_then_conflict() {
        let forest = Forest::new(vec![
            Row::new(1, "x", 1.0).with_children(vec![Row::new(7, "a", 1.0)]),
            Row::new(2, "y", 1.0).with_children(vec![Row::new(7, "b", 1.0)]),
        ]);
        assert_eq!(
            forest.validate_unique_ids(),
            Err(DomainError::ConflictingIdentifier(RowId::from(7)))
        );
        assert!(sample().validate_unique_ids().is_ok());
    }

    #[test]
    fn given_zero_override_when_reading_effective_value_then_zero_wins() {
        let row = Row::new(1, "x", 50.0).with_override(0.0);
        assert_eq!(row.effective_value(), 0.0);
    }

    #[test]
    fn given_document_with_mixed_ids_when_deserializing_then_normalizes() {
        let json = r#"{"rows":[{"id":"electronics","label":"Electronics","value":1500,
            "children":[{"id":7,"label":"Phones","value":800,"modifiedValue":0}]}]}"#;
        let doc: TableDocument = serde_json::from_str(json).unwrap();
        let phones = doc.rows.find(&RowId::from(7)).unwrap();
        assert_eq!(phones.label, "Phones");
        assert_eq!(phones.override_value, Some(0.0));
        assert!(doc.rows.contains(&RowId::from("electronics")));
    }

    #[test]
    fn given_numeric_ids_beyond_i64_or_as_floats_when_deserializing_then_normalizes() {
        let json = r#"[{"id":18446744073709551615,"value":1},{"id":1.0,"value":2},{"id":2.5,"value":3}]"#;
        let forest: Forest = serde_json::from_str(json).unwrap();
        assert!(forest.contains(&RowId::from("18446744073709551615")));
        assert!(forest.contains(&RowId::from(1)));
        assert!(forest.contains(&RowId::from("2.5")));
    }

    #[test]
    fn given_row_without_override_when_serializing_then_omits_optional_fields() {
        let json = serde_json::to_string(&Row::new("a", "A", 1.5)).unwrap();
        assert_eq!(json, r#"{"id":"a","label":"A","value":1.5}"#);
    }
}

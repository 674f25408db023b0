//! Select/expand query construction for item requests

use crate::types::{FieldDescriptor, FieldKind};
use tracing::debug;

/// The `$select`/`$expand`/`$top` query of a first-page item request
///
/// Continuation requests never restate the query; they only carry the
/// token handed back by the previous page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemQuery {
    /// Selected field paths, in field order
    pub select: Vec<String>,
    /// Expanded fields, in field order
    pub expand: Vec<String>,
    /// Page-size ceiling
    pub top: Option<u32>,
}

impl ItemQuery {
    /// Build the query that retrieves every field a view renders
    ///
    /// Person fields select `<field>/Title`, lookups select
    /// `<field>/<target>`, and both expand `<field>`. Everything else
    /// selects the bare internal name.
    pub fn from_descriptors(descriptors: &[FieldDescriptor]) -> Self {
        let mut select = Vec::with_capacity(descriptors.len());
        let mut expand = Vec::new();

        for field in descriptors {
            let name = &field.internal_name;
            match &field.kind {
                FieldKind::PersonOrGroup => {
                    select.push(format!("{}/Title", name));
                    expand.push(name.clone());
                }
                FieldKind::Lookup { target_field } => {
                    select.push(format!("{}/{}", name, target_field));
                    expand.push(name.clone());
                }
                _ => select.push(name.clone()),
            }
        }

        let query = Self {
            select,
            expand,
            top: None,
        };
        debug!(query = %query, "generated item query from view fields");
        query
    }

    /// The same query with a page-size ceiling
    pub fn with_top(mut self, top: u32) -> Self {
        self.top = Some(top);
        self
    }

    /// Render as a URL query string, leading `?` included
    pub fn to_query_string(&self) -> String {
        let mut query = format!("?$select={}", self.select.join(","));
        if !self.expand.is_empty() {
            query.push_str("&$expand=");
            query.push_str(&self.expand.join(","));
        }
        if let Some(top) = self.top {
            query.push_str(&format!("&$top={}", top));
        }
        query
    }
}

impl std::fmt::Display for ItemQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str, target: &str) -> FieldDescriptor {
        FieldDescriptor::new(
            name,
            name,
            FieldKind::Lookup {
                target_field: target.to_string(),
            },
        )
    }

    #[test]
    fn test_person_and_lookup_fields_are_expanded() {
        let fields = vec![
            FieldDescriptor::new("Title", "Title", FieldKind::Computed),
            FieldDescriptor::new("Owner", "Owner", FieldKind::PersonOrGroup),
            lookup("Dept", "DeptName"),
            FieldDescriptor::new("Due", "Due", FieldKind::DateTime),
        ];

        let query = ItemQuery::from_descriptors(&fields);
        assert_eq!(query.select, ["Title", "Owner/Title", "Dept/DeptName", "Due"]);
        assert_eq!(query.expand, ["Owner", "Dept"]);
        assert_eq!(
            query.to_query_string(),
            "?$select=Title,Owner/Title,Dept/DeptName,Due&$expand=Owner,Dept"
        );
    }

    #[test]
    fn test_plain_fields_omit_expand() {
        let fields = vec![
            FieldDescriptor::new("Title", "Title", FieldKind::PlainText),
            FieldDescriptor::new("Answer", "Answer", FieldKind::MultiLineText),
        ];
        let query = ItemQuery::from_descriptors(&fields);
        assert_eq!(query.to_query_string(), "?$select=Title,Answer");
    }

    #[test]
    fn test_top_is_appended_last() {
        let fields = vec![FieldDescriptor::new("Owner", "Owner", FieldKind::PersonOrGroup)];
        let query = ItemQuery::from_descriptors(&fields).with_top(5000);
        assert_eq!(
            query.to_string(),
            "?$select=Owner/Title&$expand=Owner&$top=5000"
        );
    }
}

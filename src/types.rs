//! Core types for export2word

use crate::error::{Error, MetadataError};
use serde::{Deserialize, Serialize};

/// MIME type of the emitted document
pub const DOC_MIME_TYPE: &str = "application/vnd.ms-word";

/// File extension of the emitted document
pub const DOC_EXTENSION: &str = "doc";

/// A raw record as returned by the store: internal field name to untyped value
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Domain-level kind of a field, independent of its wire representation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    /// Single line of text
    PlainText,
    /// Computed field (e.g. the linked title column)
    Computed,
    /// Multiple lines of text
    MultiLineText,
    /// Person or group reference
    PersonOrGroup,
    /// Reference into another list
    Lookup,
    /// Managed metadata term
    Taxonomy,
    /// Hyperlink
    Url,
    /// Date and time
    DateTime,
    /// Anything else; rendered as its raw value
    Other,
}

impl SemanticType {
    /// Map the store's `TypeAsString` (or a row field's `fieldType`) to a semantic type
    pub fn from_wire(type_name: &str) -> Self {
        match type_name {
            "Text" => SemanticType::PlainText,
            "Computed" => SemanticType::Computed,
            "Note" => SemanticType::MultiLineText,
            "User" | "UserMulti" | "Person or Group" => SemanticType::PersonOrGroup,
            "Lookup" | "LookupMulti" => SemanticType::Lookup,
            "TaxonomyFieldType" | "TaxonomyFieldTypeMulti" => SemanticType::Taxonomy,
            "URL" => SemanticType::Url,
            "DateTime" => SemanticType::DateTime,
            _ => SemanticType::Other,
        }
    }
}

impl std::fmt::Display for SemanticType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SemanticType::PlainText => "plain_text",
            SemanticType::Computed => "computed",
            SemanticType::MultiLineText => "multi_line_text",
            SemanticType::PersonOrGroup => "person_or_group",
            SemanticType::Lookup => "lookup",
            SemanticType::Taxonomy => "taxonomy",
            SemanticType::Url => "url",
            SemanticType::DateTime => "date_time",
            SemanticType::Other => "other",
        };
        f.write_str(name)
    }
}

/// Typed shape of a field, fixed when metadata is resolved
///
/// Carries everything value extraction needs so formatting never has to
/// probe a record's runtime shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// Single line of text
    PlainText,
    /// Computed field
    Computed,
    /// Multiple lines of text
    MultiLineText,
    /// Person or group; the expanded value carries `Title`
    PersonOrGroup,
    /// Lookup; the expanded value carries `target_field`
    Lookup {
        /// Field of the target list shown for this lookup
        target_field: String,
    },
    /// Managed metadata; the value carries `Label`
    Taxonomy,
    /// Hyperlink; the value carries `Url` and `Description`
    Url,
    /// ISO 8601 timestamp
    DateTime,
    /// Anything else
    Other,
}

impl FieldKind {
    /// The semantic type this kind belongs to
    pub fn semantic_type(&self) -> SemanticType {
        match self {
            FieldKind::PlainText => SemanticType::PlainText,
            FieldKind::Computed => SemanticType::Computed,
            FieldKind::MultiLineText => SemanticType::MultiLineText,
            FieldKind::PersonOrGroup => SemanticType::PersonOrGroup,
            FieldKind::Lookup { .. } => SemanticType::Lookup,
            FieldKind::Taxonomy => SemanticType::Taxonomy,
            FieldKind::Url => SemanticType::Url,
            FieldKind::DateTime => SemanticType::DateTime,
            FieldKind::Other => SemanticType::Other,
        }
    }
}

/// A field of a list, ready for query construction and formatting
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Unique key of the field within its list
    pub internal_name: String,
    /// Title shown to users
    pub display_title: String,
    /// Typed shape of the field
    pub kind: FieldKind,
}

impl FieldDescriptor {
    /// Create a new descriptor
    pub fn new(
        internal_name: impl Into<String>,
        display_title: impl Into<String>,
        kind: FieldKind,
    ) -> Self {
        Self {
            internal_name: internal_name.into(),
            display_title: display_title.into(),
            kind,
        }
    }

    /// The field's semantic type
    pub fn semantic_type(&self) -> SemanticType {
        self.kind.semantic_type()
    }

    /// Target field of a lookup, None for every other kind
    pub fn lookup_target_field(&self) -> Option<&str> {
        match &self.kind {
            FieldKind::Lookup { target_field } => Some(target_field),
            _ => None,
        }
    }
}

/// Field definition exactly as the store describes it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FieldDefinition {
    /// Internal name
    pub internal_name: String,
    /// Display title
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Wire type name (e.g. "Text", "User", "Lookup")
    #[serde(default, deserialize_with = "null_as_default")]
    pub type_as_string: String,
    /// Lookup target field; present for lookups
    #[serde(default)]
    pub lookup_field: Option<String>,
}

/// Read `null` as the type's default
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl TryFrom<FieldDefinition> for FieldDescriptor {
    type Error = Error;

    fn try_from(def: FieldDefinition) -> Result<Self, Self::Error> {
        let kind = match SemanticType::from_wire(&def.type_as_string) {
            SemanticType::PlainText => FieldKind::PlainText,
            SemanticType::Computed => FieldKind::Computed,
            SemanticType::MultiLineText => FieldKind::MultiLineText,
            SemanticType::PersonOrGroup => FieldKind::PersonOrGroup,
            SemanticType::Lookup => match def.lookup_field.filter(|f| !f.is_empty()) {
                Some(target_field) => FieldKind::Lookup { target_field },
                None => {
                    return Err(MetadataError::InvalidDescriptor {
                        field: def.internal_name,
                        reason: "lookup field without a LookupField".to_string(),
                    }
                    .into());
                }
            },
            SemanticType::Taxonomy => FieldKind::Taxonomy,
            SemanticType::Url => FieldKind::Url,
            SemanticType::DateTime => FieldKind::DateTime,
            SemanticType::Other => FieldKind::Other,
        };

        Ok(FieldDescriptor {
            internal_name: def.internal_name,
            display_title: def.title,
            kind,
        })
    }
}

/// A list view as returned by the store
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ViewInfo {
    /// View id
    #[serde(default)]
    pub id: String,
    /// View title
    pub title: String,
}

/// Ordered internal names of the fields a view displays
///
/// Order is render order and is preserved end to end.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewFieldOrder(pub Vec<String>);

impl ViewFieldOrder {
    /// Create a view field order
    pub fn new(names: Vec<String>) -> Self {
        Self(names)
    }

    /// Number of fields in the view
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the view has no fields
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the view displays the given field
    pub fn contains(&self, internal_name: &str) -> bool {
        self.0.iter().any(|n| n == internal_name)
    }

    /// Iterate over field names in render order
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl From<Vec<String>> for ViewFieldOrder {
    fn from(names: Vec<String>) -> Self {
        Self(names)
    }
}

impl From<Vec<&str>> for ViewFieldOrder {
    fn from(names: Vec<&str>) -> Self {
        Self(names.into_iter().map(String::from).collect())
    }
}

impl<'a> IntoIterator for &'a ViewFieldOrder {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One response of the paged item query
#[derive(Debug)]
pub struct RecordPage {
    /// Whether the page was received and decoded
    pub success: bool,
    /// Records on the page, in source order
    pub items: Vec<RawRecord>,
    /// Opaque token for the next page; None means exhausted
    pub continuation_token: Option<String>,
    /// Why the page failed
    pub failure_detail: Option<Error>,
}

impl RecordPage {
    /// A successfully received page
    pub fn ok(items: Vec<RawRecord>, continuation_token: Option<String>) -> Self {
        Self {
            success: true,
            items,
            continuation_token,
            failure_detail: None,
        }
    }

    /// A failed page, optionally still carrying a continuation token
    pub fn failed(error: Error, continuation_token: Option<String>) -> Self {
        Self {
            success: false,
            items: Vec::new(),
            continuation_token,
            failure_detail: Some(error),
        }
    }
}

/// Records accumulated for one export
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExportResult {
    /// Title of the exported list
    pub list_title: String,
    /// Records in page-arrival order
    pub items: Vec<RawRecord>,
}

/// Document layout
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Two-column field/value table per record
    Table,
    /// Heading per question, paragraph per answer
    QnA,
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Layout::Table => f.write_str("table"),
            Layout::QnA => f.write_str("qna"),
        }
    }
}

/// A finished document, as handed to a [`DocumentSink`](crate::sink::DocumentSink)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportedDocument {
    /// File name, `<list title>.doc`
    pub file_name: String,
    /// MIME type of the content
    pub mime_type: &'static str,
    /// Complete HTML envelope
    pub content: String,
    /// Layout the body was composed with
    pub layout: Layout,
    /// Number of records rendered
    pub record_count: usize,
    /// Number of pages whose records were dropped
    pub failed_pages: usize,
}

impl ExportedDocument {
    /// Build a document for the given list title
    pub fn new(list_title: &str, content: String, layout: Layout, record_count: usize) -> Self {
        Self {
            file_name: document_file_name(list_title),
            mime_type: DOC_MIME_TYPE,
            content,
            layout,
            record_count,
            failed_pages: 0,
        }
    }

    /// Whether some records were dropped on the way
    pub fn is_partial(&self) -> bool {
        self.failed_pages > 0
    }
}

/// File name of the document exported for a list
pub fn document_file_name(list_title: &str) -> String {
    format!("{}.{}", list_title, DOC_EXTENSION)
}

/// A field of a row the host already has selected
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedField {
    /// Internal name
    pub internal_name: String,
    /// Display name
    pub display_name: String,
    /// Semantic type of the field
    pub semantic_type: SemanticType,
}

impl SelectedField {
    /// Create a selected field from the host's wire type name
    pub fn new(
        internal_name: impl Into<String>,
        display_name: impl Into<String>,
        field_type: &str,
    ) -> Self {
        Self {
            internal_name: internal_name.into(),
            display_name: display_name.into(),
            semantic_type: SemanticType::from_wire(field_type),
        }
    }
}

/// One field/value pair of a selected row
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectedCell {
    /// The field
    pub field: SelectedField,
    /// The host's value for it
    pub value: serde_json::Value,
}

/// A row the host already has selected, fields in display order
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectedRow {
    /// Cells in display order
    pub cells: Vec<SelectedCell>,
}

impl SelectedRow {
    /// Append a cell
    pub fn with(mut self, field: SelectedField, value: serde_json::Value) -> Self {
        self.cells.push(SelectedCell { field, value });
        self
    }
}

//! Field metadata resolution
//!
//! Determines which fields an export renders and in which order: the fields
//! of an explicit view, or of the list's default view, matched against the
//! list's full field set and re-ordered to the view's order.

use crate::error::{Error, MetadataError, Result};
use crate::store::RecordStore;
use crate::types::{FieldDescriptor, ViewFieldOrder};
use tracing::debug;

/// Field metadata of one view, in view order
///
/// `slots[i]` describes `view_fields[i]`. A `None` slot means the view names
/// a field the list does not define.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedFields {
    /// Internal names of the view's fields, in render order
    pub view_fields: ViewFieldOrder,
    /// Descriptor per view field, same order
    pub slots: Vec<Option<FieldDescriptor>>,
}

impl ResolvedFields {
    /// Internal names of view fields without a descriptor
    pub fn missing_fields(&self) -> Vec<&str> {
        self.view_fields
            .iter()
            .zip(&self.slots)
            .filter(|(_, slot)| slot.is_none())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Every descriptor, in view order
    ///
    /// # Errors
    /// Returns [`Error::DataIntegrity`] naming the first view field without a
    /// descriptor
    pub fn require_complete(&self) -> Result<Vec<FieldDescriptor>> {
        self.view_fields
            .iter()
            .zip(&self.slots)
            .map(|(name, slot)| {
                slot.clone()
                    .ok_or_else(|| Error::DataIntegrity { field: name.clone() })
            })
            .collect()
    }
}

/// Resolve the fields an export of `list` renders
///
/// With `view_id`, the fields of that view are used; otherwise the fields of
/// the list's default view. Any failed metadata read aborts resolution.
pub async fn resolve(
    store: &dyn RecordStore,
    list: &str,
    view_id: Option<&str>,
) -> Result<ResolvedFields> {
    let view_fields = match view_id {
        Some(id) => {
            debug!(list, view_id = id, "retrieving fields of explicit view");
            store
                .view_fields_by_id(list, id)
                .await
                .map_err(|e| MetadataError::ViewFields {
                    list: list.to_string(),
                    view: id.to_string(),
                    reason: e.to_string(),
                })?
        }
        None => {
            debug!(list, "retrieving fields of default view");
            let view = store
                .default_view(list)
                .await
                .map_err(|e| MetadataError::DefaultView {
                    list: list.to_string(),
                    reason: e.to_string(),
                })?;
            store
                .view_fields_by_title(list, &view.title)
                .await
                .map_err(|e| MetadataError::ViewFields {
                    list: list.to_string(),
                    view: view.title.clone(),
                    reason: e.to_string(),
                })?
        }
    };

    let definitions = store
        .list_fields(list)
        .await
        .map_err(|e| MetadataError::ListFields {
            list: list.to_string(),
            reason: e.to_string(),
        })?;

    // Only typed descriptors for fields the view shows; a bad definition of
    // a field nobody renders must not fail the export. Stores skip
    // definitions they cannot read at all.
    let descriptors = definitions
        .into_iter()
        .filter(|def| view_fields.iter().any(|name| *name == def.internal_name))
        .map(FieldDescriptor::try_from)
        .collect::<Result<Vec<_>>>()?;

    let slots: Vec<Option<FieldDescriptor>> = view_fields
        .iter()
        .map(|name| {
            descriptors
                .iter()
                .find(|d| d.internal_name == *name)
                .cloned()
        })
        .collect();

    let resolved = ResolvedFields {
        view_fields: ViewFieldOrder::new(view_fields),
        slots,
    };
    debug!(
        list,
        fields = resolved.view_fields.len(),
        missing = resolved.missing_fields().len(),
        "field metadata resolved"
    );
    Ok(resolved)
}

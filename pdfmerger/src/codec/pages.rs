//! Page tree manipulation.
//!
//! This module handles the page-level plumbing behind page copying:
//! - Locating the root page tree node
//! - Resolving attributes a page inherits from its ancestors
//! - Re-parenting copied pages and appending them to `Kids`

use super::CodecContext;
use crate::error::{MergerError, Result};
use lopdf::{Document, Object, ObjectId};

/// Page attributes that may be inherited from ancestor `Pages` nodes.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against cyclic `Parent` chains in malformed files.
const MAX_TREE_DEPTH: usize = 64;

/// Id of the root `Pages` node referenced by the catalog.
pub fn root_pages_id(doc: &Document, subject: &str) -> Result<ObjectId> {
    doc.catalog()
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(Object::as_reference)
        .codec_context(subject)
}

/// Page object ids at the given 0-based positions, in the order requested.
pub fn ids_at(doc: &Document, indices: &[usize]) -> Vec<ObjectId> {
    let all: Vec<ObjectId> = doc.get_pages().into_values().collect();
    indices.iter().filter_map(|&i| all.get(i).copied()).collect()
}

/// Copy inherited attributes onto the page itself.
///
/// A copied page is re-parented under a different tree, so anything it used
/// to pick up from its old ancestors has to live on the page.
pub fn materialize_inherited(doc: &mut Document, page_id: ObjectId, subject: &str) -> Result<()> {
    let page = doc.get_dictionary(page_id).codec_context(subject)?;
    let mut missing: Vec<&[u8]> = INHERITABLE
        .iter()
        .copied()
        .filter(|key| !page.has(key))
        .collect();
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();

    let mut inherited = Vec::new();
    let mut depth = 0;
    while let Some(node_id) = parent {
        if missing.is_empty() || depth >= MAX_TREE_DEPTH {
            break;
        }
        let Ok(node) = doc.get_dictionary(node_id) else {
            break;
        };

        missing.retain(|key| match node.get(key) {
            Ok(value) => {
                inherited.push((key.to_vec(), value.clone()));
                false
            }
            Err(_) => true,
        });

        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        depth += 1;
    }

    if inherited.is_empty() {
        return Ok(());
    }

    let page = doc.get_dictionary_mut(page_id).codec_context(subject)?;
    for (key, value) in inherited {
        page.set(key, value);
    }
    Ok(())
}

/// Point a page at a new parent node.
pub fn reparent(
    doc: &mut Document,
    page_id: ObjectId,
    parent_id: ObjectId,
    subject: &str,
) -> Result<()> {
    let page = doc.get_dictionary_mut(page_id).codec_context(subject)?;
    page.set("Parent", parent_id);
    Ok(())
}

/// Append page references to a `Pages` node and bump its `Count`.
pub fn append_kids(
    doc: &mut Document,
    pages_id: ObjectId,
    page_ids: &[ObjectId],
    subject: &str,
) -> Result<()> {
    let pages = doc.get_dictionary_mut(pages_id).codec_context(subject)?;

    if !pages.has(b"Kids") {
        pages.set("Kids", Vec::<Object>::new());
    }

    match pages.get_mut(b"Kids") {
        Ok(Object::Array(kids)) => {
            kids.extend(page_ids.iter().map(|&id| Object::Reference(id)));
        }
        _ => return Err(MergerError::codec(subject, "Kids is not an array")),
    }

    let count = pages.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
    pages.set("Count", Object::Integer(count + page_ids.len() as i64));
    Ok(())
}

//! Streamed boundary delivery.
//!
//! These apply to a [`Document`] what the server stream's inline scripts do
//! to a browser document when out-of-order content arrives.

use honox_core::protocol::{BoundaryId, DATA_HONO_TARGET};
use tracing::debug;

use crate::dom::{Document, NodeData, NodeId};

/// Delivers the resolved content of boundary `id`.
///
/// Appends a `data-hono-target` template holding `markup`, then, if the
/// placeholder template is live, removes its inline fallback up to and
/// including the closing comment and replaces it with `markup`. Returns
/// whether a live placeholder was found.
pub fn resolve_boundary(doc: &Document, id: BoundaryId, markup: &str) -> bool {
	let key = id.to_string();

	let target = doc.create_element("template");
	doc.set_attr(target, DATA_HONO_TARGET, &key);
	doc.append_child(target, doc.parse_fragment(markup));
	doc.append_child(doc.root(), target);

	let Some(placeholder) = doc.get_element_by_id(&key) else {
		debug!(boundary = %id, "no live placeholder; content kept as target only");
		return false;
	};

	for sibling in following_siblings(doc, placeholder) {
		let is_sentinel = matches!(doc.data(sibling), NodeData::Comment(_));
		doc.remove(sibling);
		if is_sentinel {
			break;
		}
	}
	doc.replace_with(placeholder, doc.parse_fragment(markup));
	true
}

/// Delivers the fallback of a failed error boundary `id`, inserting `markup`
/// before its placeholder template. Returns whether the placeholder was found.
pub fn deliver_error_fallback(doc: &Document, id: BoundaryId, markup: &str) -> bool {
	let Some(placeholder) = doc.get_element_by_id(&id.to_string()) else {
		return false;
	};
	let Some(parent) = doc.parent(placeholder) else {
		return false;
	};
	doc.insert_before(parent, doc.parse_fragment(markup), placeholder);
	true
}

/// Appends streamed-in `markup` to `parent`.
pub fn append_markup(doc: &Document, parent: NodeId, markup: &str) {
	doc.append_child(parent, doc.parse_fragment(markup));
}

fn following_siblings(doc: &Document, node: NodeId) -> Vec<NodeId> {
	let Some(parent) = doc.parent(node) else {
		return Vec::new();
	};
	doc.children(parent)
		.into_iter()
		.skip_while(|&sibling| sibling != node)
		.skip(1)
		.collect()
}

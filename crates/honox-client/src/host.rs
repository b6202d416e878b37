//! Capabilities supplied by the rendering engine.
//!
//! The runtime decides what to hydrate; the [`Host`] decides how a live node
//! is created and attached. A reactive UI engine implements `mount` by
//! taking over the marker element. [`StaticHost`] writes the rendered
//! markup into the marker instead.

use futures::FutureExt;
use futures::future::LocalBoxFuture;

use crate::component::Component;
use crate::dom::{Document, NodeId};
use crate::error::MountError;
use crate::node::{ClientProps, LiveNode};

pub trait Host {
	/// Creates the live node for a component invocation.
	fn create_element(&self, component: &Component, props: ClientProps) -> LiveNode {
		LiveNode::Component {
			component: component.clone(),
			props,
			key: None,
		}
	}

	/// Creates a generic element rebuilt from markup.
	fn create_tag(&self, tag: &str, attrs: Vec<(String, String)>, children: Vec<LiveNode>) -> LiveNode {
		LiveNode::Element {
			tag: tag.to_string(),
			attrs,
			key: None,
			children,
		}
	}

	/// Attaches `node` over the marker element `target`.
	fn mount<'a>(
		&'a self,
		node: LiveNode,
		target: NodeId,
		doc: &'a Document,
	) -> LocalBoxFuture<'a, Result<(), MountError>>;
}

/// Host that replaces the marker's content with the node's current render.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticHost;

impl Host for StaticHost {
	fn mount<'a>(
		&'a self,
		node: LiveNode,
		target: NodeId,
		doc: &'a Document,
	) -> LocalBoxFuture<'a, Result<(), MountError>> {
		async move {
			if !doc.is_connected(target) {
				return Err(MountError::new("target is not attached to the document"));
			}
			doc.set_inner_html(target, &node.render_to_string());
			Ok(())
		}
		.boxed_local()
	}
}

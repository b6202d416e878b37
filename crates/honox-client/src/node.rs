//! Live node tree handed to the host.

use std::fmt;
use std::future::Future;

use futures::FutureExt;
use futures::future::{LocalBoxFuture, Shared};
use honox_core::props::Props;
use honox_core::protocol::BoundaryId;

use crate::component::Component;
use crate::dom::{escape, is_void};

/// Props as seen by client components: element values are node lists.
pub type ClientProps = Props<Vec<LiveNode>>;

/// A node produced by reconstruction or by a component render.
#[derive(Debug, Clone)]
pub enum LiveNode {
	Text(String),
	Element {
		tag: String,
		attrs: Vec<(String, String)>,
		key: Option<u64>,
		children: Vec<LiveNode>,
	},
	/// A component invocation, rendered by the host.
	Component {
		component: Component,
		props: ClientProps,
		key: Option<u64>,
	},
	/// Content that shows `fallback` until its boundary resolves.
	Suspense {
		boundary: BoundaryId,
		fallback: Vec<LiveNode>,
		content: BoundaryContent,
		key: Option<u64>,
	},
}

impl LiveNode {
	pub fn text(text: impl Into<String>) -> Self {
		LiveNode::Text(text.into())
	}

	pub fn tag(tag: impl Into<String>, children: Vec<LiveNode>) -> Self {
		LiveNode::Element {
			tag: tag.into(),
			attrs: Vec::new(),
			key: None,
			children,
		}
	}

	/// Sets the key. Text nodes carry no key.
	pub fn with_key(mut self, new_key: u64) -> Self {
		match &mut self {
			LiveNode::Text(_) => {}
			LiveNode::Element { key, .. }
			| LiveNode::Component { key, .. }
			| LiveNode::Suspense { key, .. } => *key = Some(new_key),
		}
		self
	}

	pub fn key(&self) -> Option<u64> {
		match self {
			LiveNode::Text(_) => None,
			LiveNode::Element { key, .. }
			| LiveNode::Component { key, .. }
			| LiveNode::Suspense { key, .. } => *key,
		}
	}

	/// Renders what the node currently displays.
	///
	/// Components are rendered through their render function. A suspense node
	/// shows its resolved content once its boundary future has completed, and
	/// its fallback until then.
	pub fn render_to_string(&self) -> String {
		let mut out = String::new();
		self.render_into(&mut out);
		out
	}

	fn render_into(&self, out: &mut String) {
		match self {
			LiveNode::Text(text) => out.push_str(&escape(text, false)),
			LiveNode::Element {
				tag,
				attrs,
				children,
				..
			} => {
				out.push('<');
				out.push_str(tag);
				for (name, value) in attrs {
					out.push(' ');
					out.push_str(name);
					out.push_str("=\"");
					out.push_str(&escape(value, true));
					out.push('"');
				}
				out.push('>');
				if !is_void(tag) {
					render_all(children, out);
					out.push_str("</");
					out.push_str(tag);
					out.push('>');
				}
			}
			LiveNode::Component {
				component, props, ..
			} => render_all(&component.render(props), out),
			LiveNode::Suspense {
				fallback, content, ..
			} => match content.peek() {
				Some(resolved) => render_all(resolved, out),
				None => render_all(fallback, out),
			},
		}
	}
}

/// Renders a node list.
pub fn render_nodes(nodes: &[LiveNode]) -> String {
	let mut out = String::new();
	render_all(nodes, &mut out);
	out
}

fn render_all(nodes: &[LiveNode], out: &mut String) {
	for node in nodes {
		node.render_into(out);
	}
}

/// The eventual content of a boundary.
///
/// Cloning shares the same underlying future; the content is reconstructed
/// once no matter how many clones await it.
#[derive(Clone)]
pub struct BoundaryContent(Shared<LocalBoxFuture<'static, Vec<LiveNode>>>);

impl BoundaryContent {
	pub(crate) fn new<F>(content: F) -> Self
	where
		F: Future<Output = Vec<LiveNode>> + 'static,
	{
		Self(content.boxed_local().shared())
	}

	/// Content that is already available.
	pub fn ready(nodes: Vec<LiveNode>) -> Self {
		let content = Self::new(futures::future::ready(nodes));
		// Completes on first poll, which makes it visible to `peek`.
		let _ = content.0.clone().now_or_never();
		content
	}

	/// Resolved content, if the boundary future has completed.
	pub fn peek(&self) -> Option<&Vec<LiveNode>> {
		self.0.peek()
	}

	pub fn is_resolved(&self) -> bool {
		self.peek().is_some()
	}

	/// Waits for the boundary to resolve. Never completes for a boundary
	/// that is never resolved.
	pub async fn resolved(&self) -> Vec<LiveNode> {
		self.0.clone().await
	}
}

impl fmt::Debug for BoundaryContent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("BoundaryContent")
			.field("resolved", &self.is_resolved())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_render_element_tree() {
		let node = LiveNode::tag(
			"ul",
			vec![
				LiveNode::tag("li", vec![LiveNode::text("a < b")]),
				LiveNode::tag("li", vec![LiveNode::text("c")]),
			],
		);
		assert_eq!(
			node.render_to_string(),
			"<ul><li>a &lt; b</li><li>c</li></ul>"
		);
	}

	#[rstest]
	fn test_render_void_elements_without_close_tag() {
		let img = LiveNode::Element {
			tag: "img".to_string(),
			attrs: vec![("src".to_string(), "x".to_string())],
			children: Vec::new(),
			key: None,
		};
		let node = LiveNode::tag(
			"p",
			vec![
				LiveNode::text("a"),
				LiveNode::tag("br", Vec::new()),
				LiveNode::text("b"),
				img,
			],
		);
		assert_eq!(node.render_to_string(), r#"<p>a<br>b<img src="x"></p>"#);
	}

	#[rstest]
	fn test_key_assignment() {
		assert_eq!(LiveNode::text("x").with_key(3).key(), None);
		assert_eq!(LiveNode::tag("p", Vec::new()).with_key(3).key(), Some(3));
	}

	#[tokio::test]
	async fn test_suspense_shows_fallback_until_resolved() {
		let (tx, rx) = futures::channel::oneshot::channel::<Vec<LiveNode>>();
		let content = BoundaryContent::new(async move { rx.await.unwrap_or_default() });
		let node = LiveNode::Suspense {
			boundary: BoundaryId::suspense(0),
			fallback: vec![LiveNode::text("loading")],
			content: content.clone(),
			key: None,
		};

		assert_eq!(node.render_to_string(), "loading");

		tx.send(vec![LiveNode::tag("b", vec![LiveNode::text("done")])])
			.unwrap();
		content.resolved().await;

		assert_eq!(node.render_to_string(), "<b>done</b>");
	}
}

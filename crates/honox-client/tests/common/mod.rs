//! Shared fixtures for client runtime tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use honox_client::{
	BoundaryContent, ClientProps, Component, Document, Host, IslandModule, IslandRegistry,
	LiveNode, LoadError, MountError, NodeId, StaticHost,
};
use honox_core::props::PropValue;
use honox_core::protocol::BoundaryId;

/// Host that records every mount and then writes the render like [`StaticHost`].
#[derive(Default)]
pub struct RecordingHost {
	mounts: RefCell<Vec<(NodeId, LiveNode)>>,
	failing: Option<String>,
}

impl RecordingHost {
	pub fn new() -> Rc<Self> {
		Rc::new(Self::default())
	}

	/// A host that refuses to mount components named `component`.
	pub fn failing(component: &str) -> Rc<Self> {
		Rc::new(Self {
			mounts: RefCell::new(Vec::new()),
			failing: Some(component.to_string()),
		})
	}

	pub fn mount_count(&self) -> usize {
		self.mounts.borrow().len()
	}

	pub fn mounts_of(&self, node: NodeId) -> usize {
		self.mounts.borrow().iter().filter(|(n, _)| *n == node).count()
	}

	pub fn mounted(&self, node: NodeId) -> Option<LiveNode> {
		self.mounts
			.borrow()
			.iter()
			.find(|(n, _)| *n == node)
			.map(|(_, live)| live.clone())
	}
}

impl Host for RecordingHost {
	fn mount<'a>(
		&'a self,
		node: LiveNode,
		target: NodeId,
		doc: &'a Document,
	) -> LocalBoxFuture<'a, Result<(), MountError>> {
		async move {
			if let LiveNode::Component { component, .. } = &node {
				if self.failing.as_deref() == Some(component.name()) {
					return Err(MountError::new(format!("{} refused", component.name())));
				}
			}
			self.mounts.borrow_mut().push((target, node.clone()));
			StaticHost.mount(node, target, doc).await
		}
		.boxed_local()
	}
}

fn children(props: &ClientProps) -> Vec<LiveNode> {
	props
		.get("children")
		.and_then(PropValue::as_element)
		.cloned()
		.unwrap_or_default()
}

fn text_prop(props: &ClientProps, key: &str) -> String {
	match props.get_value(key) {
		Some(serde_json::Value::String(s)) => s.clone(),
		Some(other) => other.to_string(),
		None => String::new(),
	}
}

/// `<div><span>{count}</span>{children}</div>`
pub fn counter() -> Component {
	Component::new("Counter", |props| {
		let mut content = vec![LiveNode::tag("span", vec![LiveNode::text(text_prop(props, "count"))])];
		content.extend(children(props));
		vec![LiveNode::tag("div", content)]
	})
}

/// `<b>{label}</b>{children}`
pub fn badge() -> Component {
	Component::new("Badge", |props| {
		let mut content = vec![LiveNode::tag("b", vec![LiveNode::text(text_prop(props, "label"))])];
		content.extend(children(props));
		content
	})
}

/// `<article>{header}{children}</article>`
pub fn card() -> Component {
	Component::new("Card", |props| {
		let mut content = props
			.get("header")
			.and_then(PropValue::as_element)
			.cloned()
			.unwrap_or_default();
		content.extend(children(props));
		vec![LiveNode::tag("article", content)]
	})
}

/// Registry with Counter, Badge and a named Card export, plus a module that
/// always fails to load. `loads` counts loader invocations.
pub fn registry(loads: Rc<Cell<usize>>) -> IslandRegistry {
	let counted = move |module: IslandModule| {
		let loads = loads.clone();
		move || {
			loads.set(loads.get() + 1);
			futures::future::ready(Ok::<_, LoadError>(module.clone()))
		}
	};
	IslandRegistry::new()
		.with(
			"/islands/Counter.tsx",
			counted(IslandModule::new().with_default(counter())),
		)
		.with(
			"/islands/Badge.tsx",
			counted(IslandModule::new().with_default(badge())),
		)
		.with(
			"/islands/Card.tsx",
			counted(IslandModule::new().with_export("Card", card())),
		)
		.with("/islands/Broken.tsx", || async {
			Err(LoadError::failed("/islands/Broken.tsx", "module threw during evaluation"))
		})
}

/// Marker markup as the server renders it.
pub fn marker(path: &str, props_json: &str, live: &str, templates: &[(&str, &str)]) -> String {
	let mut html = format!(
		r#"<honox-island component-name="{path}" data-serialized-props="{}">{live}"#,
		props_json.replace('"', "&quot;")
	);
	for (key, content) in templates {
		html.push_str(&format!(r#"<template data-hono-template="{key}">{content}</template>"#));
	}
	html.push_str("</honox-island>");
	html
}

/// Every suspense node in `nodes`, depth first, with the props and fallbacks
/// of components searched as well.
pub fn suspense_nodes(nodes: &[LiveNode]) -> Vec<(BoundaryId, BoundaryContent)> {
	let mut found = Vec::new();
	collect_suspense(nodes, &mut found);
	found
}

fn collect_suspense(nodes: &[LiveNode], found: &mut Vec<(BoundaryId, BoundaryContent)>) {
	for node in nodes {
		match node {
			LiveNode::Text(_) => {}
			LiveNode::Element { children, .. } => collect_suspense(children, found),
			LiveNode::Component { props, .. } => {
				for (_, value) in props.iter() {
					if let Some(elements) = value.as_element() {
						collect_suspense(elements, found);
					}
				}
			}
			LiveNode::Suspense {
				boundary,
				fallback,
				content,
				..
			} => {
				found.push((*boundary, content.clone()));
				collect_suspense(fallback, found);
			}
		}
	}
}

/// First element under the document root named `tag`.
pub fn first(doc: &Document, tag: &str) -> NodeId {
	doc.query_all(doc.root(), |el| el.name == tag)
		.into_iter()
		.next()
		.unwrap_or_else(|| panic!("no <{tag}> in {}", doc.html()))
}

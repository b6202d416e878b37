//! Island marker rendering.
//!
//! An [`IslandView`] is the server branch of an island wrapper. Whether it
//! emits a `<honox-island>` marker depends on where it is rendered:
//!
//! - outside any island: marker
//! - inside another island's template children: marker, since the client
//!   reconstructs children and must find nested islands there
//! - inside another island's live render: the component renders directly,
//!   because the enclosing island's client render will produce it
//!
//! A marker holds the live server render of the component, followed by one
//! `<template data-hono-template="key">` per prop that cannot travel as JSON,
//! in prop order.

use std::fmt;
use std::sync::Arc;

use honox_core::props::{PropValue, Props};
use honox_core::protocol::{
	CHILDREN_PROP, DATA_HONO_TEMPLATE, ISLAND_TAG, IslandMarker, template_key,
};
use serde_json::Value;
use tracing::debug;

use crate::view::{IntoView, View, html_escape, push_attrs, push_close};

/// Props as seen by server components.
pub type ServerProps = Props<View>;

/// A component the server can render.
pub trait ServerComponent {
	fn render(&self, props: &ServerProps) -> View;
}

impl<F> ServerComponent for F
where
	F: Fn(&ServerProps) -> View,
{
	fn render(&self, props: &ServerProps) -> View {
		self(props)
	}
}

/// Where an island is being rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IslandContext {
	/// Inside an island's live render.
	pub in_island: bool,
	/// Inside an island's template children.
	pub in_children: bool,
}

impl IslandContext {
	/// Context for an island's live render.
	pub fn enter_island(self) -> Self {
		Self {
			in_island: true,
			..self
		}
	}

	/// Context for an island's template children.
	pub fn enter_children(self) -> Self {
		Self {
			in_children: true,
			..self
		}
	}

	/// Whether an island rendered here emits a marker.
	pub fn renders_marker(&self) -> bool {
		!self.in_island || self.in_children
	}
}

/// An island invocation in the view tree.
#[derive(Clone)]
pub struct IslandView {
	marker: IslandMarker,
	component: Arc<dyn ServerComponent + Send + Sync>,
	props: ServerProps,
}

impl fmt::Debug for IslandView {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("IslandView")
			.field("marker", &self.marker)
			.field("props", &self.props)
			.finish_non_exhaustive()
	}
}

impl IslandView {
	/// Island for the default export of `component_path`.
	pub fn new<C>(component_path: impl Into<String>, component: C) -> Self
	where
		C: ServerComponent + Send + Sync + 'static,
	{
		Self {
			marker: IslandMarker::new(component_path),
			component: Arc::new(component),
			props: ServerProps::new(),
		}
	}

	/// Sets the export name; `default` leaves the attribute off.
	pub fn export(mut self, export: impl Into<String>) -> Self {
		self.marker = self.marker.with_export(export);
		self
	}

	pub fn props(mut self, props: ServerProps) -> Self {
		self.props = props;
		self
	}

	/// Adds a single prop.
	pub fn prop(mut self, key: impl Into<String>, value: impl Into<PropValue<View>>) -> Self {
		self.props.insert(key, value);
		self
	}

	/// Sets the `children` prop.
	pub fn children(self, children: impl IntoView) -> Self {
		self.prop(CHILDREN_PROP, PropValue::Element(children.into_view()))
	}

	pub fn marker(&self) -> &IslandMarker {
		&self.marker
	}

	pub(crate) fn render_into(&self, cx: IslandContext, output: &mut String) {
		let live = self.component.render(&self.props);
		if !cx.renders_marker() {
			live.render_into(cx, output);
			return;
		}

		let serialized = self.props.serialized();
		debug!(
			component_path = %self.marker.component_path,
			export = self.marker.export_name(),
			"rendering island marker"
		);

		output.push('<');
		output.push_str(ISLAND_TAG);
		push_attrs(
			output,
			self.marker
				.to_attrs(&serialized)
				.iter()
				.map(|(name, value)| (*name, value.as_str())),
		);
		output.push('>');

		live.render_into(cx.enter_island(), output);

		let children_cx = cx.enter_children();
		for (key, value) in self.props.template_entries() {
			output.push_str("<template");
			push_attrs(output, [(DATA_HONO_TEMPLATE, template_key(key))]);
			output.push('>');
			render_prop(value, children_cx, output);
			push_close(output, "template");
		}

		push_close(output, ISLAND_TAG);
	}
}

impl From<View> for PropValue<View> {
	fn from(view: View) -> Self {
		PropValue::Element(view)
	}
}

fn render_prop(value: &PropValue<View>, cx: IslandContext, output: &mut String) {
	match value {
		PropValue::Element(view) => view.render_into(cx, output),
		PropValue::List(items) => {
			for item in items {
				render_prop(item, cx, output);
			}
		}
		PropValue::Value(Value::Null) => {}
		PropValue::Value(Value::String(text)) => output.push_str(&html_escape(text)),
		PropValue::Value(other) => output.push_str(&html_escape(&other.to_string())),
	}
}

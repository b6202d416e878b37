//! Client components and island modules.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use honox_core::protocol::DEFAULT_EXPORT;

use crate::node::{ClientProps, LiveNode};

/// A client component: a named render function.
#[derive(Clone)]
pub struct Component {
	name: Rc<str>,
	render: Rc<dyn Fn(&ClientProps) -> Vec<LiveNode>>,
}

impl Component {
	pub fn new<F>(name: &str, render: F) -> Self
	where
		F: Fn(&ClientProps) -> Vec<LiveNode> + 'static,
	{
		Self {
			name: Rc::from(name),
			render: Rc::new(render),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn render(&self, props: &ClientProps) -> Vec<LiveNode> {
		(self.render)(props)
	}
}

impl fmt::Debug for Component {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Component").field(&self.name).finish()
	}
}

/// The exports of a loaded island module.
#[derive(Debug, Clone, Default)]
pub struct IslandModule {
	exports: BTreeMap<String, Component>,
}

impl IslandModule {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_default(self, component: Component) -> Self {
		self.with_export(DEFAULT_EXPORT, component)
	}

	pub fn with_export(mut self, name: impl Into<String>, component: Component) -> Self {
		self.exports.insert(name.into(), component);
		self
	}

	pub fn get(&self, export: &str) -> Option<&Component> {
		self.exports.get(export)
	}

	pub fn export_names(&self) -> impl Iterator<Item = &str> {
		self.exports.keys().map(String::as_str)
	}
}

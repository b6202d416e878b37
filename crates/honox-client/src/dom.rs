//! Arena-backed document.
//!
//! The runtime works against this document model rather than a browser DOM.
//! It keeps the parts of DOM behaviour the hydration protocol depends on:
//!
//! - `<template>` contents are inert, so queries never descend into them
//! - child-list mutations are reported to observers synchronously
//! - `replace_with` and `insert_before` can be overridden per node, which is
//!   how pending boundaries intercept streamed replacements
//!
//! [`Document`] is a cheap, reference-counted handle. Node ids are only
//! meaningful for the document that created them.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use scraper::{ElementRef, Html, Node};

/// Handle to a node in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

/// Handle to a registered mutation observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
	/// The document root.
	Root,
	/// A detached container whose children are moved on insertion.
	Fragment,
	Element(ElementData),
	Text(String),
	Comment(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
	pub name: String,
	pub attrs: Vec<(String, String)>,
}

impl ElementData {
	pub fn attr(&self, name: &str) -> Option<&str> {
		self.attrs
			.iter()
			.find(|(k, _)| k == name)
			.map(|(_, v)| v.as_str())
	}

	pub fn has_attr(&self, name: &str) -> bool {
		self.attr(name).is_some()
	}

	fn set_attr(&mut self, name: &str, value: &str) {
		match self.attrs.iter_mut().find(|(k, _)| k == name) {
			Some((_, v)) => *v = value.to_string(),
			None => self.attrs.push((name.to_string(), value.to_string())),
		}
	}
}

/// A child-list change on `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
	pub target: NodeId,
	pub added: Vec<NodeId>,
	pub removed: Vec<NodeId>,
}

/// Observer callback, invoked with the records for its observed targets.
pub type MutationCallback = Rc<dyn Fn(&Document, &[MutationRecord])>;

/// Per-node override of `replace_with`/`insert_before`.
///
/// Receives the node that would have been inserted.
pub type NodeHook = Rc<dyn Fn(&Document, NodeId)>;

struct Slot {
	data: NodeData,
	parent: Option<NodeId>,
	children: Vec<NodeId>,
	replace_hook: Option<NodeHook>,
	insert_hook: Option<NodeHook>,
}

impl Slot {
	fn new(data: NodeData) -> Self {
		Self {
			data,
			parent: None,
			children: Vec::new(),
			replace_hook: None,
			insert_hook: None,
		}
	}
}

struct Observer {
	targets: BTreeSet<NodeId>,
	callback: MutationCallback,
}

struct Tree {
	nodes: Vec<Slot>,
	observers: Vec<Option<Observer>>,
}

impl Tree {
	fn alloc(&mut self, data: NodeData) -> NodeId {
		let id = NodeId(self.nodes.len());
		self.nodes.push(Slot::new(data));
		id
	}

	fn element(&self, id: NodeId) -> Option<&ElementData> {
		match &self.nodes[id.0].data {
			NodeData::Element(el) => Some(el),
			_ => None,
		}
	}

	fn is_template(&self, id: NodeId) -> bool {
		self.element(id).is_some_and(|el| el.name == "template")
	}

	/// Unlinks `id` from its parent, returning the parent.
	fn detach(&mut self, id: NodeId) -> Option<NodeId> {
		let parent = self.nodes[id.0].parent.take()?;
		self.nodes[parent.0].children.retain(|c| *c != id);
		Some(parent)
	}

	/// Nodes actually inserted for `child`: a fragment contributes its children.
	fn insertable(&self, child: NodeId) -> Vec<NodeId> {
		match self.nodes[child.0].data {
			NodeData::Fragment => self.nodes[child.0].children.clone(),
			_ => vec![child],
		}
	}

	/// Inserts `child` under `parent` before `reference` (or at the end),
	/// recording the removal from any previous parent.
	fn insert(
		&mut self,
		parent: NodeId,
		child: NodeId,
		reference: Option<NodeId>,
		records: &mut Vec<MutationRecord>,
	) -> Vec<NodeId> {
		let nodes = self.insertable(child);
		for &node in &nodes {
			if let Some(old) = self.detach(node) {
				records.push(MutationRecord {
					target: old,
					added: Vec::new(),
					removed: vec![node],
				});
			}
		}
		let at = reference
			.and_then(|r| self.nodes[parent.0].children.iter().position(|c| *c == r))
			.unwrap_or(self.nodes[parent.0].children.len());
		for (offset, &node) in nodes.iter().enumerate() {
			self.nodes[node.0].parent = Some(parent);
			self.nodes[parent.0].children.insert(at + offset, node);
		}
		if !nodes.is_empty() {
			records.push(MutationRecord {
				target: parent,
				added: nodes.clone(),
				removed: Vec::new(),
			});
		}
		nodes
	}

	/// Copies the parsed children of `element` under `parent`.
	///
	/// Template contents live in a fragment below the template; they are
	/// flattened so the template's children are its contents.
	fn import_children(&mut self, element: ElementRef<'_>, parent: NodeId) {
		let mut pending = vec![(*element, parent)];
		while let Some((node, parent)) = pending.pop() {
			for child in node.children() {
				let data = match child.value() {
					Node::Text(text) => NodeData::Text(String::from(&**text)),
					Node::Comment(comment) => NodeData::Comment(String::from(&**comment)),
					Node::Element(el) => NodeData::Element(ElementData {
						name: el.name().to_string(),
						attrs: el
							.attrs()
							.map(|(k, v)| (k.to_string(), v.to_string()))
							.collect(),
					}),
					Node::Fragment => {
						pending.push((child, parent));
						continue;
					}
					_ => continue,
				};
				let id = self.alloc(data);
				self.nodes[id.0].parent = Some(parent);
				self.nodes[parent.0].children.push(id);
				if child.has_children() {
					pending.push((child, id));
				}
			}
		}
	}

	fn write_html(&self, id: NodeId, out: &mut String) {
		let slot = &self.nodes[id.0];
		match &slot.data {
			NodeData::Root | NodeData::Fragment => self.write_children(id, out),
			NodeData::Element(el) => {
				out.push('<');
				out.push_str(&el.name);
				for (name, value) in &el.attrs {
					out.push(' ');
					out.push_str(name);
					out.push_str("=\"");
					out.push_str(&escape(value, true));
					out.push('"');
				}
				out.push('>');
				if !is_void(&el.name) {
					self.write_children(id, out);
					out.push_str("</");
					out.push_str(&el.name);
					out.push('>');
				}
			}
			NodeData::Text(text) => out.push_str(&escape(text, false)),
			NodeData::Comment(comment) => {
				out.push_str("<!--");
				out.push_str(comment);
				out.push_str("-->");
			}
		}
	}

	fn write_children(&self, id: NodeId, out: &mut String) {
		for &child in &self.nodes[id.0].children {
			self.write_html(child, out);
		}
	}
}

/// A mutable document tree.
#[derive(Clone)]
pub struct Document {
	tree: Rc<RefCell<Tree>>,
}

impl fmt::Debug for Document {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let tree = self.tree.borrow();
		f.debug_struct("Document")
			.field("nodes", &tree.nodes.len())
			.field("observers", &tree.observers.iter().flatten().count())
			.finish()
	}
}

impl Default for Document {
	fn default() -> Self {
		Self::new()
	}
}

const ROOT: NodeId = NodeId(0);

impl Document {
	/// Creates an empty document.
	pub fn new() -> Self {
		let mut tree = Tree {
			nodes: Vec::new(),
			observers: Vec::new(),
		};
		tree.alloc(NodeData::Root);
		Self {
			tree: Rc::new(RefCell::new(tree)),
		}
	}

	/// Parses `html` as the body of a new document.
	pub fn parse(html: &str) -> Self {
		let doc = Self::new();
		doc.import_html(html, ROOT);
		doc
	}

	pub fn root(&self) -> NodeId {
		ROOT
	}

	/// Parses `html` into a detached fragment.
	pub fn parse_fragment(&self, html: &str) -> NodeId {
		let fragment = self.tree.borrow_mut().alloc(NodeData::Fragment);
		self.import_html(html, fragment);
		fragment
	}

	fn import_html(&self, html: &str, parent: NodeId) {
		let parsed = Html::parse_fragment(html);
		self.tree
			.borrow_mut()
			.import_children(parsed.root_element(), parent);
	}

	/// Creates a detached element.
	pub fn create_element(&self, name: &str) -> NodeId {
		self.tree
			.borrow_mut()
			.alloc(NodeData::Element(ElementData {
				name: name.to_string(),
				attrs: Vec::new(),
			}))
	}

	pub fn create_text(&self, text: &str) -> NodeId {
		self.tree
			.borrow_mut()
			.alloc(NodeData::Text(text.to_string()))
	}

	pub fn data(&self, id: NodeId) -> NodeData {
		self.tree.borrow().nodes[id.0].data.clone()
	}

	pub fn tag_name(&self, id: NodeId) -> Option<String> {
		self.tree.borrow().element(id).map(|el| el.name.clone())
	}

	pub fn attr(&self, id: NodeId, name: &str) -> Option<String> {
		self.tree
			.borrow()
			.element(id)
			.and_then(|el| el.attr(name))
			.map(str::to_string)
	}

	pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
		self.tree
			.borrow()
			.element(id)
			.is_some_and(|el| el.has_attr(name))
	}

	/// Sets an attribute. Does nothing on non-elements.
	pub fn set_attr(&self, id: NodeId, name: &str, value: &str) {
		if let NodeData::Element(el) = &mut self.tree.borrow_mut().nodes[id.0].data {
			el.set_attr(name, value);
		}
	}

	pub fn parent(&self, id: NodeId) -> Option<NodeId> {
		self.tree.borrow().nodes[id.0].parent
	}

	pub fn children(&self, id: NodeId) -> Vec<NodeId> {
		self.tree.borrow().nodes[id.0].children.clone()
	}

	/// Whether `id` is attached to the document root.
	pub fn is_connected(&self, id: NodeId) -> bool {
		let tree = self.tree.borrow();
		let mut current = id;
		loop {
			if current == ROOT {
				return true;
			}
			match tree.nodes[current.0].parent {
				Some(parent) => current = parent,
				None => return false,
			}
		}
	}

	/// Elements under `scope` matching `predicate`, in document order.
	///
	/// `scope` itself is not considered, and template contents are skipped.
	pub fn query_all<P>(&self, scope: NodeId, predicate: P) -> Vec<NodeId>
	where
		P: Fn(&ElementData) -> bool,
	{
		let tree = self.tree.borrow();
		let mut found = Vec::new();
		let mut stack: Vec<NodeId> = tree.nodes[scope.0].children.iter().rev().copied().collect();
		while let Some(id) = stack.pop() {
			let Some(el) = tree.element(id) else {
				continue;
			};
			if predicate(el) {
				found.push(id);
			}
			if !tree.is_template(id) {
				stack.extend(tree.nodes[id.0].children.iter().rev().copied());
			}
		}
		found
	}

	/// First connected element whose `id` attribute equals `id`.
	pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
		self.query_all(ROOT, |el| el.attr("id") == Some(id))
			.into_iter()
			.next()
	}

	/// Appends `child` (or a fragment's children) to `parent`.
	pub fn append_child(&self, parent: NodeId, child: NodeId) {
		let mut records = Vec::new();
		self.tree
			.borrow_mut()
			.insert(parent, child, None, &mut records);
		self.notify(records);
	}

	/// Inserts `child` before `reference` under `parent`, unless `parent`
	/// carries an insert hook, which then receives `child` instead.
	pub fn insert_before(&self, parent: NodeId, child: NodeId, reference: NodeId) {
		let hook = self.tree.borrow().nodes[parent.0].insert_hook.clone();
		if let Some(hook) = hook {
			hook(self, child);
			return;
		}
		let mut records = Vec::new();
		self.tree
			.borrow_mut()
			.insert(parent, child, Some(reference), &mut records);
		self.notify(records);
	}

	/// Replaces `node` with `replacement` (or a fragment's children), unless
	/// `node` carries a replace hook, which then receives `replacement`.
	pub fn replace_with(&self, node: NodeId, replacement: NodeId) {
		let hook = self.tree.borrow().nodes[node.0].replace_hook.clone();
		if let Some(hook) = hook {
			hook(self, replacement);
			return;
		}
		let mut records = Vec::new();
		{
			let mut tree = self.tree.borrow_mut();
			let Some(parent) = tree.nodes[node.0].parent else {
				return;
			};
			tree.insert(parent, replacement, Some(node), &mut records);
			tree.detach(node);
			records.push(MutationRecord {
				target: parent,
				added: Vec::new(),
				removed: vec![node],
			});
		}
		self.notify(records);
	}

	/// Detaches `node` from its parent.
	pub fn remove(&self, node: NodeId) {
		let parent = self.tree.borrow_mut().detach(node);
		if let Some(parent) = parent {
			self.notify(vec![MutationRecord {
				target: parent,
				added: Vec::new(),
				removed: vec![node],
			}]);
		}
	}

	/// Replaces the children of `node` with the parsed `html`.
	pub fn set_inner_html(&self, node: NodeId, html: &str) {
		let fragment = self.parse_fragment(html);
		let mut records = Vec::new();
		{
			let mut tree = self.tree.borrow_mut();
			let removed = std::mem::take(&mut tree.nodes[node.0].children);
			for &child in &removed {
				tree.nodes[child.0].parent = None;
			}
			if !removed.is_empty() {
				records.push(MutationRecord {
					target: node,
					added: Vec::new(),
					removed,
				});
			}
			tree.insert(node, fragment, None, &mut records);
		}
		self.notify(records);
	}

	pub fn set_replace_hook<F>(&self, node: NodeId, hook: F)
	where
		F: Fn(&Document, NodeId) + 'static,
	{
		self.tree.borrow_mut().nodes[node.0].replace_hook = Some(Rc::new(hook));
	}

	pub fn set_insert_hook<F>(&self, node: NodeId, hook: F)
	where
		F: Fn(&Document, NodeId) + 'static,
	{
		self.tree.borrow_mut().nodes[node.0].insert_hook = Some(Rc::new(hook));
	}

	/// Observes child-list changes on every node in `targets` with one callback.
	pub fn observe<F>(&self, targets: impl IntoIterator<Item = NodeId>, callback: F) -> ObserverId
	where
		F: Fn(&Document, &[MutationRecord]) + 'static,
	{
		let mut tree = self.tree.borrow_mut();
		let id = ObserverId(tree.observers.len());
		tree.observers.push(Some(Observer {
			targets: targets.into_iter().collect(),
			callback: Rc::new(callback),
		}));
		id
	}

	pub fn disconnect(&self, observer: ObserverId) {
		if let Some(slot) = self.tree.borrow_mut().observers.get_mut(observer.0) {
			*slot = None;
		}
	}

	/// Number of connected observers.
	pub fn observer_count(&self) -> usize {
		self.tree.borrow().observers.iter().flatten().count()
	}

	pub fn is_observing(&self, observer: ObserverId) -> bool {
		self.tree
			.borrow()
			.observers
			.get(observer.0)
			.is_some_and(Option::is_some)
	}

	fn notify(&self, records: Vec<MutationRecord>) {
		if records.is_empty() {
			return;
		}
		// Callbacks may mutate the document, so they run after the borrow ends.
		let deliveries: Vec<(MutationCallback, Vec<MutationRecord>)> = {
			let tree = self.tree.borrow();
			tree.observers
				.iter()
				.flatten()
				.filter_map(|observer| {
					let matched: Vec<_> = records
						.iter()
						.filter(|r| observer.targets.contains(&r.target))
						.cloned()
						.collect();
					(!matched.is_empty()).then(|| (observer.callback.clone(), matched))
				})
				.collect()
		};
		for (callback, matched) in deliveries {
			callback(self, &matched);
		}
	}

	pub fn outer_html(&self, id: NodeId) -> String {
		let mut out = String::new();
		self.tree.borrow().write_html(id, &mut out);
		out
	}

	pub fn inner_html(&self, id: NodeId) -> String {
		let mut out = String::new();
		self.tree.borrow().write_children(id, &mut out);
		out
	}

	/// Serializes the whole document.
	pub fn html(&self) -> String {
		self.inner_html(ROOT)
	}
}

pub(crate) fn is_void(name: &str) -> bool {
	matches!(
		name,
		"area"
			| "base" | "br"
			| "col" | "embed"
			| "hr" | "img"
			| "input" | "link"
			| "meta" | "source"
			| "track" | "wbr"
	)
}

pub(crate) fn escape(s: &str, in_attribute: bool) -> String {
	let mut out = String::with_capacity(s.len());
	for c in s.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' if in_attribute => out.push_str("&quot;"),
			c => out.push(c),
		}
	}
	out
}

//! Server view tree.

use std::borrow::Cow;

use crate::island::{IslandContext, IslandView};

/// Renderable server content.
#[derive(Debug, Clone)]
pub enum View {
	/// An HTML element.
	Element(ElementView),
	/// A text node.
	Text(Cow<'static, str>),
	/// Multiple views without a wrapper element.
	Fragment(Vec<View>),
	/// An island invocation, rendered according to its [`IslandContext`].
	Island(Box<IslandView>),
	/// Renders nothing.
	Empty,
}

/// An HTML element in the view tree.
#[derive(Debug, Clone)]
pub struct ElementView {
	tag: Cow<'static, str>,
	attrs: Vec<(Cow<'static, str>, Cow<'static, str>)>,
	children: Vec<View>,
	is_void: bool,
}

impl ElementView {
	pub fn new(tag: impl Into<Cow<'static, str>>) -> Self {
		let tag = tag.into();
		let is_void = matches!(
			tag.as_ref(),
			"area"
				| "base" | "br"
				| "col" | "embed"
				| "hr" | "img"
				| "input" | "link"
				| "meta" | "source"
				| "track" | "wbr"
		);
		Self {
			tag,
			attrs: Vec::new(),
			children: Vec::new(),
			is_void,
		}
	}

	pub fn attr(
		mut self,
		name: impl Into<Cow<'static, str>>,
		value: impl Into<Cow<'static, str>>,
	) -> Self {
		self.attrs.push((name.into(), value.into()));
		self
	}

	pub fn child(mut self, child: impl IntoView) -> Self {
		self.children.push(child.into_view());
		self
	}

	pub fn children(mut self, children: impl IntoIterator<Item = impl IntoView>) -> Self {
		self.children
			.extend(children.into_iter().map(IntoView::into_view));
		self
	}

	pub fn tag_name(&self) -> &str {
		&self.tag
	}

	pub fn attrs(&self) -> &[(Cow<'static, str>, Cow<'static, str>)] {
		&self.attrs
	}

	pub fn child_views(&self) -> &[View] {
		&self.children
	}

	pub fn is_void(&self) -> bool {
		self.is_void
	}
}

impl View {
	pub fn element(tag: impl Into<Cow<'static, str>>) -> ElementView {
		ElementView::new(tag)
	}

	pub fn text(content: impl Into<Cow<'static, str>>) -> Self {
		Self::Text(content.into())
	}

	pub fn fragment(children: impl IntoIterator<Item = impl IntoView>) -> Self {
		Self::Fragment(children.into_iter().map(IntoView::into_view).collect())
	}

	pub fn empty() -> Self {
		Self::Empty
	}

	/// Renders the view as a page-level tree, outside any island.
	pub fn render_to_string(&self) -> String {
		self.render_in(IslandContext::default())
	}

	/// Renders the view within `cx`.
	pub fn render_in(&self, cx: IslandContext) -> String {
		let mut output = String::new();
		self.render_into(cx, &mut output);
		output
	}

	pub(crate) fn render_into(&self, cx: IslandContext, output: &mut String) {
		match self {
			View::Element(el) => {
				output.push('<');
				output.push_str(el.tag_name());
				push_attrs(output, el.attrs().iter().map(|(k, v)| (k.as_ref(), v.as_ref())));

				if el.is_void() {
					output.push_str(" />");
				} else {
					output.push('>');
					for child in el.child_views() {
						child.render_into(cx, output);
					}
					push_close(output, el.tag_name());
				}
			}
			View::Text(text) => output.push_str(&html_escape(text)),
			View::Fragment(children) => {
				for child in children {
					child.render_into(cx, output);
				}
			}
			View::Island(island) => island.render_into(cx, output),
			View::Empty => {}
		}
	}
}

pub(crate) fn push_attrs<'a>(output: &mut String, attrs: impl IntoIterator<Item = (&'a str, &'a str)>) {
	for (name, value) in attrs {
		output.push(' ');
		output.push_str(name);
		output.push_str("=\"");
		output.push_str(&html_escape(value));
		output.push('"');
	}
}

pub(crate) fn push_close(output: &mut String, tag: &str) {
	output.push_str("</");
	output.push_str(tag);
	output.push('>');
}

/// Escapes text and attribute values.
pub(crate) fn html_escape(s: &str) -> String {
	s.replace('&', "&amp;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
		.replace('"', "&quot;")
		.replace('\'', "&#x27;")
}

/// Types that can be turned into a [`View`].
pub trait IntoView {
	fn into_view(self) -> View;
}

impl IntoView for View {
	fn into_view(self) -> View {
		self
	}
}

impl IntoView for ElementView {
	fn into_view(self) -> View {
		View::Element(self)
	}
}

impl IntoView for IslandView {
	fn into_view(self) -> View {
		View::Island(Box::new(self))
	}
}

impl From<ElementView> for View {
	fn from(element: ElementView) -> Self {
		element.into_view()
	}
}

impl From<IslandView> for View {
	fn from(island: IslandView) -> Self {
		island.into_view()
	}
}

impl IntoView for String {
	fn into_view(self) -> View {
		View::Text(Cow::Owned(self))
	}
}

impl IntoView for &'static str {
	fn into_view(self) -> View {
		View::Text(Cow::Borrowed(self))
	}
}

impl<T: IntoView> IntoView for Option<T> {
	fn into_view(self) -> View {
		match self {
			Some(v) => v.into_view(),
			None => View::Empty,
		}
	}
}

impl<T: IntoView> IntoView for Vec<T> {
	fn into_view(self) -> View {
		View::fragment(self)
	}
}

//! Client bootstrap gating.
//!
//! The client runtime is only worth shipping when the page can contain an
//! island. The router reports that per page through [`PageContext`], using
//! the `__importing_islands` flag the build adds to route modules.

use tracing::debug;

use crate::view::{IntoView, View};

/// What the router knows about the page being rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageContext {
	/// Whether any island is reachable from the page's route module.
	pub importing_islands: bool,
}

impl PageContext {
	pub fn new(importing_islands: bool) -> Self {
		Self { importing_islands }
	}
}

/// Renders `view` only if the page imports islands.
pub fn has_islands(page: &PageContext, view: impl IntoView) -> View {
	if page.importing_islands {
		view.into_view()
	} else {
		View::Empty
	}
}

/// The client bootstrap `<script>` and its stylesheets.
///
/// In development the script is always emitted so newly added islands work
/// without a rebuild. In production it is emitted only for pages that import
/// islands.
#[derive(Debug, Clone)]
pub struct Script {
	src: String,
	is_async: bool,
	production: bool,
	stylesheets: Vec<String>,
}

impl Script {
	pub fn new(src: impl Into<String>) -> Self {
		Self {
			src: src.into(),
			is_async: false,
			production: false,
			stylesheets: Vec::new(),
		}
	}

	/// Adds the `async` attribute.
	pub fn with_async(mut self) -> Self {
		self.is_async = true;
		self
	}

	pub fn production(mut self, production: bool) -> Self {
		self.production = production;
		self
	}

	/// Adds a stylesheet emitted before the script.
	pub fn stylesheet(mut self, href: impl Into<String>) -> Self {
		self.stylesheets.push(href.into());
		self
	}

	pub fn render(&self, page: &PageContext) -> View {
		if self.production && !page.importing_islands {
			debug!(src = %self.src, "page imports no islands; omitting client script");
			return View::Empty;
		}

		let links = self
			.stylesheets
			.iter()
			.map(|href| View::element("link").attr("href", href.clone()).attr("rel", "stylesheet"));

		let mut script = View::element("script")
			.attr("type", "module")
			.attr("src", self.src.clone());
		if self.is_async {
			script = script.attr("async", "");
		}

		View::fragment(links.map(IntoView::into_view).chain(std::iter::once(script.into_view())))
	}
}

//! Hydration runtime and children reconstruction against server markup.

mod common;

use std::cell::Cell;
use std::rc::Rc;

use common::{RecordingHost, first, marker, registry};
use honox_client::{
	Client, ClientOptions, Document, HydrationError, HydrationReport, Hydrator, LiveNode,
	ReconstructError,
};
use honox_core::protocol::DATA_HONO_HYDRATED;
use rstest::{fixture, rstest};

#[fixture]
fn loads() -> Rc<Cell<usize>> {
	Rc::new(Cell::new(0))
}

fn hydrator(doc: &Document, host: &Rc<RecordingHost>, loads: Rc<Cell<usize>>) -> Hydrator {
	Hydrator::new(doc.clone(), registry(loads), host.clone())
}

/// Any number of passes, sequential or overlapping,
/// mount each marker exactly once
#[rstest]
#[tokio::test]
async fn test_single_hydration_under_repeated_calls(loads: Rc<Cell<usize>>) {
	let html = [
		marker("/islands/Counter.tsx", r#"{"count":1}"#, "<div><span>1</span></div>", &[]),
		marker("/islands/Counter.tsx", r#"{"count":2}"#, "<div><span>2</span></div>", &[]),
		marker("/islands/Badge.tsx", r#"{"label":"new"}"#, "<b>new</b>", &[]),
	]
	.concat();
	let doc = Document::parse(&html);
	let host = RecordingHost::new();
	let hydrator = hydrator(&doc, &host, loads.clone());

	let (a, b) = futures::join!(hydrator.hydrate_document(), hydrator.hydrate_document());
	let c = hydrator.hydrate_document().await;

	assert_eq!(a.hydrated.len() + b.hydrated.len() + c.hydrated.len(), 3);
	assert_eq!(host.mount_count(), 3);
	for node in a.hydrated.iter().chain(&b.hydrated) {
		assert_eq!(host.mounts_of(*node), 1);
		assert_eq!(doc.attr(*node, DATA_HONO_HYDRATED).as_deref(), Some("true"));
	}
	// Counter is loaded once for both of its markers.
	assert_eq!(loads.get(), 2);
}

#[rstest]
#[tokio::test]
async fn test_props_and_live_render(loads: Rc<Cell<usize>>) {
	let doc = Document::parse(&marker(
		"/islands/Counter.tsx",
		r#"{"count":41}"#,
		"<div><span>41</span></div>",
		&[],
	));
	let host = RecordingHost::new();

	let report = hydrator(&doc, &host, loads).hydrate_document().await;

	let island = report.hydrated[0];
	assert_eq!(doc.inner_html(island), "<div><span>41</span></div>");
	let Some(LiveNode::Component { component, props, .. }) = host.mounted(island) else {
		panic!("expected a component mount");
	};
	assert_eq!(component.name(), "Counter");
	assert_eq!(props.get_value("count"), Some(&serde_json::json!(41)));
}

/// An island inside template children becomes a live
/// component at every depth
#[rstest]
#[tokio::test]
async fn test_nested_islands_are_live(loads: Rc<Cell<usize>>) {
	let inner = marker("/islands/Badge.tsx", r#"{"label":"inner"}"#, "<b>inner</b>", &[]);
	let outer = marker(
		"/islands/Badge.tsx",
		r#"{"label":"outer"}"#,
		"<b>outer</b><b>inner</b>",
		&[("", &inner)],
	);
	let html = marker(
		"/islands/Counter.tsx",
		r#"{"count":1}"#,
		"<div><span>1</span><b>outer</b><b>inner</b></div>",
		&[("", &outer)],
	);
	let doc = Document::parse(&html);
	let host = RecordingHost::new();

	let report = hydrator(&doc, &host, loads).hydrate_document().await;

	assert!(report.is_clean(), "{:?}", report.errors);
	assert_eq!(host.mount_count(), 1);
	let counter = report.hydrated[0];
	let Some(LiveNode::Component { props, .. }) = host.mounted(counter) else {
		panic!("expected a component mount");
	};

	let children = props.get("children").and_then(|v| v.as_element()).unwrap();
	let LiveNode::Component {
		component,
		props: outer_props,
		key,
	} = &children[0]
	else {
		panic!("outer badge was rebuilt as a generic element: {:?}", children[0]);
	};
	assert_eq!(component.name(), "Badge");
	assert_eq!(*key, Some(1));

	let grandchildren = outer_props.get("children").and_then(|v| v.as_element()).unwrap();
	assert!(matches!(
		&grandchildren[0],
		LiveNode::Component { component, .. } if component.name() == "Badge"
	));

	assert_eq!(
		doc.inner_html(counter),
		"<div><span>1</span><b>outer</b><b>inner</b></div>"
	);
}

/// Trailing templates supply the props they are keyed by,
/// an empty key supplying `children`
#[rstest]
#[tokio::test]
async fn test_named_export_with_template_props(loads: Rc<Cell<usize>>) {
	let doc = Document::parse(concat!(
		r#"<honox-island component-name="/islands/Card.tsx" component-export="Card" data-serialized-props="{}">"#,
		"<article><h2>Title</h2><p>body</p></article>",
		r#"<template data-hono-template="header"><h2>Title</h2></template>"#,
		r#"<template data-hono-template=""><p>body</p></template>"#,
		"</honox-island>",
	));
	let host = RecordingHost::new();

	let report = hydrator(&doc, &host, loads).hydrate_document().await;

	assert!(report.is_clean(), "{:?}", report.errors);
	let card = report.hydrated[0];
	assert_eq!(doc.inner_html(card), "<article><h2>Title</h2><p>body</p></article>");
	let Some(LiveNode::Component { props, .. }) = host.mounted(card) else {
		panic!("expected a component mount");
	};
	let keys: Vec<_> = props.iter().map(|(k, _)| k).collect();
	assert_eq!(keys, vec!["header", "children"]);
}

#[rstest]
#[tokio::test]
async fn test_void_elements_in_template_children(loads: Rc<Cell<usize>>) {
	let child = r#"<p>a<br>b<img src="x"></p>"#;
	let doc = Document::parse(&marker(
		"/islands/Counter.tsx",
		r#"{"count":1}"#,
		&format!("<div><span>1</span>{child}</div>"),
		&[("", child)],
	));
	let host = RecordingHost::new();

	let report = hydrator(&doc, &host, loads).hydrate_document().await;

	assert!(report.is_clean(), "{:?}", report.errors);
	let rendered = doc.inner_html(report.hydrated[0]);
	assert_eq!(rendered, format!("<div><span>1</span>{child}</div>"));
	assert_eq!(rendered.matches("<br>").count(), 1);
}

/// Decode and load failures are contained to their marker
#[rstest]
#[tokio::test]
async fn test_failures_do_not_abort_siblings(loads: Rc<Cell<usize>>) {
	let html = [
		marker("/islands/Broken.tsx", "{}", "<p>broken static</p>", &[]),
		marker("/islands/Counter.tsx", "{not json", "<p>bad props static</p>", &[]),
		marker("/islands/Badge.tsx", r#"{"label":"ok"}"#, "<b>ok</b>", &[]),
	]
	.concat();
	let doc = Document::parse(&html);
	let host = RecordingHost::new();

	let report = hydrator(&doc, &host, loads).hydrate_document().await;

	assert_eq!(report.hydrated.len(), 1);
	assert_eq!(report.errors.len(), 2);
	assert!(report.errors.iter().any(|e| matches!(e, HydrationError::Load(_))));
	assert!(report.errors.iter().any(|e| matches!(e, HydrationError::Decode { .. })));

	let html = doc.html();
	assert!(html.contains("<p>broken static</p>"));
	assert!(html.contains("<p>bad props static</p>"));
	assert_eq!(host.mount_count(), 1);
}

#[rstest]
#[tokio::test]
async fn test_mount_failure_is_contained(loads: Rc<Cell<usize>>) {
	let html = [
		marker("/islands/Badge.tsx", r#"{"label":"a"}"#, "<b>a</b>", &[]),
		marker("/islands/Counter.tsx", r#"{"count":1}"#, "<div><span>1</span></div>", &[]),
	]
	.concat();
	let doc = Document::parse(&html);
	let host = RecordingHost::failing("Badge");

	let report = hydrator(&doc, &host, loads).hydrate_document().await;

	assert_eq!(report.hydrated.len(), 1);
	assert!(matches!(
		report.errors.as_slice(),
		[HydrationError::Mount { component_path, .. }] if component_path == "/islands/Badge.tsx"
	));
}

/// A nested island that cannot load degrades to its static
/// markup and the enclosing island still mounts
#[rstest]
#[tokio::test]
async fn test_nested_failure_is_isolated(loads: Rc<Cell<usize>>) {
	let broken = marker("/islands/Broken.tsx", "{}", "<i>fallback</i>", &[]);
	let html = marker(
		"/islands/Counter.tsx",
		r#"{"count":3}"#,
		"<div><span>3</span></div>",
		&[("", &broken)],
	);
	let doc = Document::parse(&html);
	let host = RecordingHost::new();

	let report = hydrator(&doc, &host, loads).hydrate_document().await;

	assert_eq!(report.hydrated.len(), 1);
	assert!(matches!(
		report.errors.as_slice(),
		[HydrationError::Reconstruct(ReconstructError::Island { component_path, .. })]
			if component_path == "/islands/Broken.tsx"
	));
	let rendered = doc.inner_html(report.hydrated[0]);
	assert!(rendered.starts_with("<div><span>3</span><honox-island "), "{rendered}");
	assert!(rendered.ends_with("><i>fallback</i></honox-island></div>"), "{rendered}");
}

#[rstest]
#[tokio::test]
async fn test_hydrate_is_scoped_to_root(loads: Rc<Cell<usize>>) {
	let html = format!(
		r#"<section>{}</section><aside>{}</aside>"#,
		marker("/islands/Badge.tsx", r#"{"label":"in"}"#, "<b>in</b>", &[]),
		marker("/islands/Badge.tsx", r#"{"label":"out"}"#, "<b>out</b>", &[]),
	);
	let doc = Document::parse(&html);
	let host = RecordingHost::new();
	let hydrator = hydrator(&doc, &host, loads);

	let report = hydrator.hydrate(first(&doc, "section")).await;

	assert_eq!(report.hydrated.len(), 1);
	assert_eq!(doc.inner_html(report.hydrated[0]), "<b>in</b>");
	let aside = first(&doc, "aside");
	let unhydrated = doc.query_all(aside, |el| el.has_attr(DATA_HONO_HYDRATED));
	assert!(unhydrated.is_empty());
}

#[rstest]
#[tokio::test]
async fn test_client_trigger_override(loads: Rc<Cell<usize>>) {
	let doc = Document::parse(&format!(
		r#"<main>{}</main><template id="H:0"></template><!--/$-->"#,
		marker("/islands/Badge.tsx", r#"{"label":"x"}"#, "<b>x</b>", &[]),
	));
	let host = RecordingHost::new();
	let triggered = Rc::new(Cell::new(false));

	let seen = triggered.clone();
	let options = ClientOptions::new(registry(loads))
		.with_host(host.clone())
		.with_trigger(move |_hydrator| {
			seen.set(true);
			async { HydrationReport::default() }
		});
	let started = Client::new(doc.clone(), options).start().await;

	assert!(triggered.get());
	assert!(started.reconciler.is_none());
	assert_eq!(host.mount_count(), 0);
	assert_eq!(doc.observer_count(), 0);
}

//! Island props.
//!
//! Props crossing the server/client boundary are split in two. Plain data is
//! carried as a JSON object on the marker element; element subtrees cannot be
//! serialized and travel as `<template>` children instead. [`PropValue`] makes
//! that split explicit, and the same predicate ([`PropValue::is_element`])
//! decides it on both sides.
//!
//! `E` is the element representation of whichever side holds the props: a
//! server view on the server, a reconstructed node list on the client.

use serde_json::{Map, Value};

use crate::protocol::CHILDREN_PROP;

/// A single prop value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue<E> {
	/// JSON-serializable data.
	Value(Value),
	/// A component or element subtree.
	Element(E),
	/// A list that may mix data and elements.
	List(Vec<PropValue<E>>),
}

impl<E> PropValue<E> {
	/// Returns `true` if this value is, or transitively contains through
	/// lists, an element.
	pub fn is_element(&self) -> bool {
		match self {
			PropValue::Value(_) => false,
			PropValue::Element(_) => true,
			PropValue::List(items) => items.iter().any(PropValue::is_element),
		}
	}

	/// JSON form of this value, or `None` if it holds an element.
	pub fn to_json(&self) -> Option<Value> {
		match self {
			PropValue::Value(value) => Some(value.clone()),
			PropValue::Element(_) => None,
			PropValue::List(items) => items
				.iter()
				.map(PropValue::to_json)
				.collect::<Option<Vec<_>>>()
				.map(Value::Array),
		}
	}

	pub fn as_value(&self) -> Option<&Value> {
		match self {
			PropValue::Value(value) => Some(value),
			_ => None,
		}
	}

	pub fn as_element(&self) -> Option<&E> {
		match self {
			PropValue::Element(element) => Some(element),
			_ => None,
		}
	}
}

impl<E> From<Value> for PropValue<E> {
	fn from(value: Value) -> Self {
		PropValue::Value(value)
	}
}

impl<E> From<&str> for PropValue<E> {
	fn from(value: &str) -> Self {
		PropValue::Value(Value::String(value.to_string()))
	}
}

impl<E> From<String> for PropValue<E> {
	fn from(value: String) -> Self {
		PropValue::Value(Value::String(value))
	}
}

impl<E> From<bool> for PropValue<E> {
	fn from(value: bool) -> Self {
		PropValue::Value(Value::Bool(value))
	}
}

impl<E> From<i64> for PropValue<E> {
	fn from(value: i64) -> Self {
		PropValue::Value(Value::from(value))
	}
}

/// Error decoding the serialized props attribute.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
	#[error("malformed serialized props: {0}")]
	Json(#[from] serde_json::Error),
	#[error("serialized props must be a JSON object, found {found}")]
	NotAnObject { found: &'static str },
}

/// Insertion-ordered island props.
#[derive(Debug, Clone, PartialEq)]
pub struct Props<E> {
	entries: Vec<(String, PropValue<E>)>,
}

impl<E> Default for Props<E> {
	fn default() -> Self {
		Self {
			entries: Vec::new(),
		}
	}
}

impl<E> Props<E> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder form of [`Props::insert`].
	pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue<E>>) -> Self {
		self.insert(key, value);
		self
	}

	/// Sets `key`, keeping its original position if it already exists.
	pub fn insert(
		&mut self,
		key: impl Into<String>,
		value: impl Into<PropValue<E>>,
	) -> Option<PropValue<E>> {
		let key = key.into();
		let value = value.into();
		match self.entries.iter_mut().find(|(k, _)| *k == key) {
			Some((_, slot)) => Some(std::mem::replace(slot, value)),
			None => {
				self.entries.push((key, value));
				None
			}
		}
	}

	pub fn get(&self, key: &str) -> Option<&PropValue<E>> {
		self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
	}

	/// Data value of `key`, if it holds data rather than an element.
	pub fn get_value(&self, key: &str) -> Option<&Value> {
		self.get(key).and_then(PropValue::as_value)
	}

	pub fn remove(&mut self, key: &str) -> Option<PropValue<E>> {
		let index = self.entries.iter().position(|(k, _)| k == key)?;
		Some(self.entries.remove(index).1)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.get(key).is_some()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue<E>)> {
		self.entries.iter().map(|(k, v)| (k.as_str(), v))
	}

	/// Entries that travel as template children, in insertion order.
	///
	/// Element-valued entries always do. `children` does too whenever it is
	/// present and not null, because it is never part of the JSON payload.
	pub fn template_entries(&self) -> impl Iterator<Item = (&str, &PropValue<E>)> {
		self.iter().filter(|(k, v)| travels_as_template(k, v))
	}

	/// Plain-data entries as a JSON object.
	pub fn to_json_map(&self) -> Map<String, Value> {
		self.iter()
			.filter(|(k, v)| *k != CHILDREN_PROP && !v.is_element())
			.filter_map(|(k, v)| v.to_json().map(|json| (k.to_string(), json)))
			.collect()
	}

	/// The `data-serialized-props` payload: every entry except `children` and
	/// element-valued ones.
	pub fn serialized(&self) -> String {
		Value::Object(self.to_json_map()).to_string()
	}

	/// Decodes a `data-serialized-props` payload.
	///
	/// An empty payload decodes to empty props.
	pub fn from_serialized(payload: &str) -> Result<Self, DecodeError> {
		if payload.trim().is_empty() {
			return Ok(Self::new());
		}
		match serde_json::from_str::<Value>(payload)? {
			Value::Object(map) => Ok(map
				.into_iter()
				.map(|(k, v)| (k, PropValue::Value(v)))
				.collect()),
			other => Err(DecodeError::NotAnObject {
				found: json_kind(&other),
			}),
		}
	}
}

fn travels_as_template<E>(key: &str, value: &PropValue<E>) -> bool {
	value.is_element() || (key == CHILDREN_PROP && !matches!(value, PropValue::Value(Value::Null)))
}

fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}

impl<E> FromIterator<(String, PropValue<E>)> for Props<E> {
	fn from_iter<I: IntoIterator<Item = (String, PropValue<E>)>>(iter: I) -> Self {
		let mut props = Self::new();
		for (key, value) in iter {
			props.insert(key, value);
		}
		props
	}
}

impl<E> IntoIterator for Props<E> {
	type Item = (String, PropValue<E>);
	type IntoIter = std::vec::IntoIter<(String, PropValue<E>)>;

	fn into_iter(self) -> Self::IntoIter {
		self.entries.into_iter()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use rstest::rstest;
	use serde_json::json;

	type TestProps = Props<&'static str>;

	#[rstest]
	fn test_serialized_excludes_children_and_elements() {
		let props = TestProps::new()
			.with("title", "Hello")
			.with("count", 3i64)
			.with("children", PropValue::Element("<p>child</p>"))
			.with("header", PropValue::Element("<h1>header</h1>"))
			.with(
				"items",
				PropValue::List(vec![
					PropValue::Value(json!(1)),
					PropValue::Element("<li>2</li>"),
				]),
			)
			.with("flags", PropValue::List(vec![true.into(), false.into()]));

		assert_eq!(
			props.serialized(),
			r#"{"title":"Hello","count":3,"flags":[true,false]}"#
		);

		let templated: Vec<_> = props.template_entries().map(|(k, _)| k).collect();
		assert_eq!(templated, vec!["children", "header", "items"]);
	}

	#[rstest]
	fn test_text_children_travel_as_template() {
		let props = TestProps::new().with("children", "plain text");
		assert_eq!(props.serialized(), "{}");
		assert_eq!(props.template_entries().count(), 1);

		let props = TestProps::new().with("children", Value::Null);
		assert_eq!(props.template_entries().count(), 0);
	}

	#[rstest]
	fn test_insert_keeps_position() {
		let mut props = TestProps::new().with("a", 1i64).with("b", 2i64);
		let previous = props.insert("a", 10i64);
		assert_eq!(previous, Some(PropValue::Value(json!(1))));
		assert_eq!(props.serialized(), r#"{"a":10,"b":2}"#);
	}

	#[rstest]
	#[case("", 0)]
	#[case("   ", 0)]
	#[case("{}", 0)]
	#[case(r#"{"a":1,"b":{"c":[1,2]}}"#, 2)]
	fn test_from_serialized(#[case] payload: &str, #[case] len: usize) {
		let props = TestProps::from_serialized(payload).unwrap();
		assert_eq!(props.len(), len);
	}

	#[rstest]
	#[case("{", "malformed serialized props")]
	#[case("[1,2]", "found an array")]
	#[case("\"text\"", "found a string")]
	fn test_from_serialized_rejects(#[case] payload: &str, #[case] message: &str) {
		let err = TestProps::from_serialized(payload).unwrap_err();
		assert!(err.to_string().contains(message), "{err}");
	}

	fn json_leaf() -> impl Strategy<Value = Value> {
		prop_oneof![
			Just(Value::Null),
			any::<bool>().prop_map(Value::Bool),
			any::<i64>().prop_map(Value::from),
			(-1000i32..1000).prop_map(|n| Value::from(f64::from(n) / 4.0)),
			"[ -~\\n\\t\u{e9}\u{3042}]{0,16}".prop_map(Value::String),
		]
	}

	fn json_value() -> impl Strategy<Value = Value> {
		json_leaf().prop_recursive(3, 24, 4, |inner| {
			prop_oneof![
				prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
				prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
					.prop_map(|m| Value::Object(m.into_iter().collect())),
			]
		})
	}

	proptest! {
		#[test]
		fn prop_data_props_round_trip(
			entries in prop::collection::btree_map("[a-z][a-zA-Z0-9]{0,8}", json_value(), 0..6)
		) {
			let props: TestProps = entries
				.iter()
				.filter(|(k, _)| k.as_str() != CHILDREN_PROP)
				.map(|(k, v)| (k.clone(), PropValue::Value(v.clone())))
				.collect();

			let decoded = TestProps::from_serialized(&props.serialized()).unwrap();
			prop_assert_eq!(decoded, props);
		}
	}
}

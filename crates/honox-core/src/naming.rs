//! Component-name classification.
//!
//! Only exports whose name looks like a component are wrapped as islands.
//! A component name starts with an uppercase letter, may continue with more
//! uppercase letters or digits, and must contain at least one lowercase
//! letter somewhere after that. This keeps constants such as `MAX` or
//! `MAX_LENGTH` (and single letters) out of the island transform.

/// Returns `true` if `name` is an island-eligible component name.
///
/// Equivalent to matching `^[A-Z][A-Z0-9]*[a-z][A-Za-z0-9]*$`.
///
/// # Examples
///
/// ```
/// use honox_core::naming::is_component_name;
///
/// assert!(is_component_name("Badge"));
/// assert!(is_component_name("B1Badge"));
/// assert!(!is_component_name("MAX"));
/// assert!(!is_component_name("badge"));
/// ```
pub fn is_component_name(name: &str) -> bool {
	let mut chars = name.chars();
	if !matches!(chars.next(), Some(c) if c.is_ascii_uppercase()) {
		return false;
	}

	// Everything before the first lowercase letter is necessarily [A-Z0-9]
	// once the whole name is known to be ASCII alphanumeric.
	let mut seen_lowercase = false;
	for c in chars {
		if !c.is_ascii_alphanumeric() {
			return false;
		}
		seen_lowercase |= c.is_ascii_lowercase();
	}
	seen_lowercase
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use regex::Regex;
	use rstest::rstest;

	#[rstest]
	#[case("Badge")]
	#[case("B1Badge")]
	#[case("BadgeComponent")]
	#[case("UIButton")]
	#[case("Ab")]
	#[case("A1b2C3")]
	fn test_component_names(#[case] name: &str) {
		assert!(is_component_name(name), "{name} should be a component name");
	}

	#[rstest]
	#[case("")]
	#[case("A")]
	#[case("MAX")]
	#[case("MAX_LENGTH")]
	#[case("B1")]
	#[case("badge")]
	#[case("utilityFn")]
	#[case("Badge_Item")]
	#[case("$Badge")]
	#[case("Ünicode")]
	#[case("default")]
	fn test_non_component_names(#[case] name: &str) {
		assert!(!is_component_name(name), "{name} should not be a component name");
	}

	proptest! {
		#[test]
		fn prop_agrees_with_reference_pattern(name in "[A-Za-z0-9_$]{0,12}") {
			let pattern = Regex::new(r"^[A-Z][A-Z0-9]*[a-z][A-Za-z0-9]*$").unwrap();
			prop_assert_eq!(is_component_name(&name), pattern.is_match(&name));
		}

		#[test]
		fn prop_pascal_case_is_component(name in "[A-Z][A-Z0-9]{0,4}[a-z][A-Za-z0-9]{0,8}") {
			prop_assert!(is_component_name(&name));
		}

		#[test]
		fn prop_constants_are_not_components(name in "[A-Z0-9_]{0,12}") {
			prop_assert!(!is_component_name(&name));
		}

		#[test]
		fn prop_lowercase_leading_is_not_component(name in "[a-z][A-Za-z0-9]{0,12}") {
			prop_assert!(!is_component_name(&name));
		}
	}
}

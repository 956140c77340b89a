use super::core::{normalize_pattern, PatternError, RoutePattern, Segment};

#[test]
fn normalization_strips_surrounding_slashes_and_whitespace() {
    assert_eq!(normalize_pattern("/foo/"), "/foo");
    assert_eq!(normalize_pattern("foo"), "/foo");
    assert_eq!(normalize_pattern(" /foo "), "/foo");
    assert_eq!(normalize_pattern("/"), "/");
    assert_eq!(normalize_pattern(""), "/");
}

#[test]
fn literal_pattern_has_single_static_variant() {
    let pattern = RoutePattern::parse("/users/all").expect("parse");
    assert_eq!(pattern.variants().len(), 1);
    let variant = &pattern.variants()[0];
    assert!(variant.is_static());
    assert_eq!(variant.literal_path().as_deref(), Some("/users/all"));
}

#[test]
fn placeholder_gets_default_regex() {
    let pattern = RoutePattern::parse("/users/{id}").expect("parse");
    let variant = &pattern.variants()[0];
    assert!(!variant.is_static());
    match &variant.segments()[1] {
        Segment::Placeholder { name, regex } => {
            assert_eq!(name.as_ref(), "id");
            assert_eq!(regex, "[^/]+");
        }
        other => panic!("expected placeholder, got {other:?}"),
    }
}

#[test]
fn custom_regex_may_contain_nested_braces() {
    let pattern = RoutePattern::parse(r"/year/{year:\d{4}}").expect("parse");
    match &pattern.variants()[0].segments()[1] {
        Segment::Placeholder { regex, .. } => assert_eq!(regex, r"\d{4}"),
        other => panic!("expected placeholder, got {other:?}"),
    }
}

#[test]
fn optional_suffixes_desugar_to_variants() {
    let pattern = RoutePattern::parse("/files[/{path:.+}]").expect("parse");
    let variants = pattern.variants();
    assert_eq!(variants.len(), 2);
    assert_eq!(variants[0].literal_path().as_deref(), Some("/files"));
    assert_eq!(variants[1].placeholder_names().len(), 1);
}

#[test]
fn nested_optionals_desugar_depth_first() {
    let pattern = RoutePattern::parse("/a[/{b}[/{c}]]").expect("parse");
    let variants = pattern.variants();
    assert_eq!(variants.len(), 3);
    assert_eq!(variants[0].literal_path().as_deref(), Some("/a"));
    assert_eq!(variants[1].placeholder_names().len(), 1);
    assert_eq!(variants[2].placeholder_names().len(), 2);
}

#[test]
fn capturing_group_in_placeholder_regex_is_rejected() {
    let err = RoutePattern::parse(r"/users/{id:(\d+)}").expect_err("must fail");
    assert_eq!(
        err,
        PatternError::CapturingGroup {
            name: "id".to_string()
        }
    );
}

#[test]
fn non_capturing_group_in_placeholder_regex_is_allowed() {
    RoutePattern::parse(r"/users/{id:(?:\d+)}").expect("non-capturing groups are fine");
}

#[test]
fn named_group_counts_as_capturing() {
    let err = RoutePattern::parse(r"/users/{id:(?P<n>\d+)}").expect_err("must fail");
    assert!(matches!(err, PatternError::CapturingGroup { .. }));
}

#[test]
fn optional_part_in_the_middle_is_rejected() {
    let err = RoutePattern::parse("/a[/b]/c").expect_err("must fail");
    assert_eq!(err, PatternError::OptionalNotAtEnd);
}

#[test]
fn unbalanced_brackets_are_rejected() {
    assert_eq!(
        RoutePattern::parse("/a[/b").expect_err("must fail"),
        PatternError::UnbalancedBrackets
    );
    assert_eq!(
        RoutePattern::parse("/a/b]").expect_err("must fail"),
        PatternError::UnbalancedBrackets
    );
}

#[test]
fn empty_optional_part_is_rejected() {
    let err = RoutePattern::parse("/a[]").expect_err("must fail");
    assert_eq!(err, PatternError::EmptyOptionalPart);
}

#[test]
fn unclosed_placeholder_is_rejected() {
    let err = RoutePattern::parse("/users/{id").expect_err("must fail");
    assert_eq!(err, PatternError::UnclosedPlaceholder);
}

#[test]
fn duplicate_placeholder_is_rejected() {
    let err = RoutePattern::parse("/{a}/{a}").expect_err("must fail");
    assert_eq!(
        err,
        PatternError::DuplicatePlaceholder {
            name: "a".to_string()
        }
    );
}

#[test]
fn duplicate_across_optional_suffix_is_rejected() {
    let err = RoutePattern::parse("/{a}[/{a}]").expect_err("must fail");
    assert!(matches!(err, PatternError::DuplicatePlaceholder { .. }));
}

#[test]
fn invalid_placeholder_regex_is_rejected_at_parse_time() {
    let err = RoutePattern::parse("/users/{id:[}").expect_err("must fail");
    assert!(matches!(err, PatternError::InvalidRegex { .. }));
}

#[test]
fn regex_body_escapes_literal_text() {
    let pattern = RoutePattern::parse("/v1.0/{id}").expect("parse");
    let body = pattern.variants()[0].regex_body();
    assert!(body.contains(r"/v1\.0/"));
    assert!(body.ends_with("([^/]+)"));
}

//! Selection of document elements by JSONPath-like path strings.
//!
//! A path walks a document by named or bracketed steps and yields the
//! matching element views. Bracketed steps may embed filter expressions
//! (`?(...)`) evaluated per child, or computed subscripts (`(...)`)
//! evaluated against the current document.
//!
//! ```
//! use bsonpath::{json, path::path_select};
//!
//! let doc = json::from_str(r#"{"store":{"book":[{"price":10},{"price":20}]}}"#)?;
//! let cheap = path_select(&doc, "$.store.book[?(@.price < 15)].price")?;
//! assert_eq!(cheap.len(), 1);
//! assert_eq!(cheap[0].as_i32()?, 10);
//! # Ok::<(), bsonpath::error::Error>(())
//! ```

mod expr;
mod parser;
mod vm;

use std::collections::HashSet;

use self::{
    parser::{Segment, SegmentKind, Subscript},
    vm::Value,
};
use crate::{
    error::{Error, Result},
    raw::{RawDocument, RawElement},
    spec::ElementType,
};

/// Selects all elements of `doc` matched by `path`.
///
/// Matches are element views borrowing from `doc`; an element may appear more
/// than once when the path reaches it through multiple subtrees. Selection is
/// pure: repeated invocations yield identical sequences.
pub fn path_select<'a>(doc: &'a RawDocument, path: &str) -> Result<Vec<RawElement<'a>>> {
    let segments = parser::parse_path(path)?;
    let mut out = Vec::new();
    select(doc, &segments, &mut out)?;
    Ok(out)
}

/// Selection entry point for expression variables (`Load` ops).
pub(crate) fn select_in<'a>(doc: &'a RawDocument, path: &str) -> Result<Vec<RawElement<'a>>> {
    path_select(doc, path)
}

fn select<'a>(
    doc: &'a RawDocument,
    segments: &[Segment],
    out: &mut Vec<RawElement<'a>>,
) -> Result<()> {
    let Some((segment, rest)) = segments.split_first() else {
        // an exhausted path selects every element of the current document
        for result in doc.iter() {
            out.push(result?);
        }
        return Ok(());
    };

    apply_segment(doc, segment, rest, out)?;

    if segment.recursive {
        // document pre-order: matches at this level were emitted above, then
        // the whole remaining path re-applies inside every child container
        for result in doc.iter() {
            let elem = result?;
            if let Some(child) = child_container(&elem)? {
                select(child, segments, out)?;
            }
        }
    }

    Ok(())
}

/// The embedded document of a document- or array-valued element.
fn child_container<'a>(elem: &RawElement<'a>) -> Result<Option<&'a RawDocument>> {
    Ok(match elem.element_type() {
        ElementType::EmbeddedDocument => Some(elem.as_document()?),
        ElementType::Array => Some(elem.as_array()?.as_doc()),
        _ => None,
    })
}

fn apply_segment<'a>(
    doc: &'a RawDocument,
    segment: &Segment,
    rest: &[Segment],
    out: &mut Vec<RawElement<'a>>,
) -> Result<()> {
    match &segment.kind {
        SegmentKind::Name(name) => {
            if let Some(elem) = find_first(doc, name)? {
                emit_or_descend(elem, rest, out)?;
            }
        }
        SegmentKind::Wildcard => {
            for result in doc.iter() {
                emit_or_descend(result?, rest, out)?;
            }
        }
        SegmentKind::Brackets(subscripts) => {
            // bracket lists deduplicate their matches by element identity
            let mut seen: HashSet<(usize, usize)> = HashSet::new();
            let mut matched: Vec<RawElement<'a>> = Vec::new();
            for subscript in subscripts {
                apply_subscript(doc, subscript, &mut seen, &mut matched)?;
            }
            for elem in matched {
                emit_or_descend(elem, rest, out)?;
            }
        }
    }
    Ok(())
}

fn apply_subscript<'a>(
    doc: &'a RawDocument,
    subscript: &Subscript,
    seen: &mut HashSet<(usize, usize)>,
    matched: &mut Vec<RawElement<'a>>,
) -> Result<()> {
    let mut push = |elem: RawElement<'a>| {
        if seen.insert(elem.identity()) {
            matched.push(elem);
        }
    };

    match subscript {
        Subscript::Name(name) => {
            if let Some(elem) = find_first(doc, name)? {
                push(elem);
            }
        }
        Subscript::Wildcard => {
            for result in doc.iter() {
                push(result?);
            }
        }
        Subscript::Computed(program) => {
            let name = coerce_to_name(vm::eval(program, doc)?)?;
            if let Some(elem) = find_first(doc, &name)? {
                push(elem);
            }
        }
        Subscript::Filter(program) => {
            for result in doc.iter() {
                let elem = result?;
                let Some(child) = child_container(&elem)? else {
                    // scalar children carry no bindings for the expression
                    continue;
                };
                let keep = match vm::eval(program, child)? {
                    Value::Bool(b) => b,
                    Value::Int(n) => elem.name() == n.to_string(),
                    Value::Str(s) => elem.name() == s,
                    Value::Element(_) => true,
                };
                if keep {
                    push(elem);
                }
            }
        }
    }
    Ok(())
}

/// The first child with the given name; duplicates are reachable through
/// iteration, not through by-name steps.
fn find_first<'a>(doc: &'a RawDocument, name: &str) -> Result<Option<RawElement<'a>>> {
    doc.get(name)
}

fn emit_or_descend<'a>(
    elem: RawElement<'a>,
    rest: &[Segment],
    out: &mut Vec<RawElement<'a>>,
) -> Result<()> {
    if rest.is_empty() {
        out.push(elem);
        return Ok(());
    }
    if let Some(child) = child_container(&elem)? {
        select(child, rest, out)?;
    }
    Ok(())
}

/// Coerces a computed-subscript result into a child name.
fn coerce_to_name(value: Value<'_>) -> Result<String> {
    match value {
        Value::Int(n) => Ok(n.to_string()),
        Value::Str(s) => Ok(s),
        Value::Element(e) => match e.element_type() {
            ElementType::String => Ok(e.as_str()?.to_string()),
            ElementType::Int32 => Ok(e.as_i32()?.to_string()),
            ElementType::Int64 => Ok(e.as_i64()?.to_string()),
            other => Err(Error::expression_evaluation(format!(
                "cannot use a {:?} element as a subscript",
                other
            ))),
        },
        Value::Bool(_) => Err(Error::expression_evaluation(
            "cannot use a boolean as a subscript",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{json, rawdoc};
    use pretty_assertions::assert_eq;

    fn store() -> crate::raw::RawDocumentBuf {
        json::from_str(r#"{"store":{"book":[{"price":10},{"price":20}]}}"#).unwrap()
    }

    #[test]
    fn filter_selects_matching_children() {
        let doc = store();
        let matches = path_select(&doc, "$.store.book[?(@.price < 15)].price").unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].as_i32().unwrap(), 10);
    }

    #[test]
    fn recursive_descent_is_preorder() {
        let doc = store();
        let matches = path_select(&doc, "$..price").unwrap();
        let prices: Vec<i32> = matches.iter().map(|e| e.as_i32().unwrap()).collect();
        assert_eq!(prices, vec![10, 20]);
    }

    #[test]
    fn recursive_descent_matches_current_level_first() {
        let doc = rawdoc! { "x": 1_i32, "sub": { "x": 2_i32, "deeper": { "x": 3_i32 } } };
        let matches = path_select(&doc, "$..x").unwrap();
        let values: Vec<i32> = matches.iter().map(|e| e.as_i32().unwrap()).collect();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn missing_names_yield_no_match() {
        let doc = store();
        assert!(path_select(&doc, "$.shop").unwrap().is_empty());
        assert!(path_select(&doc, "$.store.bicycle.price").unwrap().is_empty());
    }

    #[test]
    fn wildcard_selects_every_child() {
        let doc = rawdoc! { "a": 1_i32, "b": 2_i32 };
        let matches = path_select(&doc, "$.*").unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].name(), "a");
        assert_eq!(matches[1].name(), "b");
    }

    #[test]
    fn bare_root_selects_all_elements() {
        let doc = rawdoc! { "a": 1_i32, "b": 2_i32 };
        assert_eq!(path_select(&doc, "$").unwrap().len(), 2);
    }

    #[test]
    fn index_subscripts_use_decimal_names() {
        let doc = store();
        let matches = path_select(&doc, "$.store.book[1].price").unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].as_i32().unwrap(), 20);

        // out of range
        assert!(path_select(&doc, "$.store.book[5]").unwrap().is_empty());
    }

    #[test]
    fn bracket_name_lists_preserve_order_and_dedup() {
        let doc = rawdoc! { "a": 1_i32, "b": 2_i32, "c": 3_i32 };
        let matches = path_select(&doc, "$['b','a','b']").unwrap();
        let names: Vec<&str> = matches.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn computed_subscript_coerces_to_name() {
        let doc = store();
        let matches = path_select(&doc, "$.store.book[(1 + 0)].price").unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].as_i32().unwrap(), 20);
    }

    #[test]
    fn filter_string_result_matches_child_name() {
        let doc = rawdoc! { "a": { "x": 1_i32 }, "b": { "x": 2_i32 } };
        let matches = path_select(&doc, "$[?(\"b\")]").unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name(), "b");
    }

    #[test]
    fn filter_element_result_always_emits() {
        // `@.x` loads an element, which is truthy by existence
        let doc = rawdoc! { "a": { "x": 1_i32 }, "b": { "y": 2_i32 } };
        let matches = path_select(&doc, "$[?(@.x)]").unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name(), "a");
    }

    #[test]
    fn selection_is_pure() {
        let doc = store();
        let first = path_select(&doc, "$..price").unwrap();
        let second = path_select(&doc, "$..price").unwrap();
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn division_by_zero_propagates() {
        let doc = store();
        let err = path_select(&doc, "$.store.book[?(@.price / 0 == 1)]").unwrap_err();
        assert!(matches!(
            err.kind,
            crate::error::ErrorKind::ExpressionEvaluation { .. }
        ));
    }

    #[test]
    fn recursive_descent_with_subscript() {
        // `..[0]` selects the first entry of every container that has one
        let doc = json::from_str(r#"{"a":[{"b":[5,6]}]}"#).unwrap();
        let matches = path_select(&doc, "$..[0]").unwrap();
        // the first entry of "a" and the first entry of "b"
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[1].as_i32().unwrap(), 5);
    }

    #[test]
    fn logical_connectives_in_filters() {
        let doc = json::from_str(
            r#"{"items":[{"price":5,"ok":true},{"price":30,"ok":true},{"price":7,"ok":false}]}"#,
        )
        .unwrap();
        let matches = path_select(&doc, "$.items[?(@.price < 10 && @.ok == true)]").unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name(), "0");
    }

    #[test]
    fn string_comparison_in_filters() {
        let doc = json::from_str(r#"{"users":[{"name":"ann"},{"name":"bob"}]}"#).unwrap();
        let matches = path_select(&doc, "$.users[?(@.name == \"bob\")]").unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name(), "1");
    }
}

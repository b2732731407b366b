//! Size-reducing SVG rewrite.
//!
//! A small set of lossless passes modelled on the usual icon optimizer
//! presets. Passes are applied to the owned tree and repeated until the
//! serialized output stops changing.

use std::collections::HashSet;

use log::trace;

use crate::{
    error::Result,
    tree::{Element, Node},
};

const MAX_PASSES: usize = 10;

/// Namespaces written by authoring tools that carry no rendering information.
const EDITOR_NAMESPACES: &[&str] = &[
    "http://www.inkscape.org/namespaces/inkscape",
    "http://sodipodi.sourceforge.net/DTD/sodipodi-0.dtd",
    "http://www.bohemiancoding.com/sketch/ns",
    "http://www.serif.com/",
    "http://www.vector.evaxdesign.sk",
    "http://ns.adobe.com/AdobeIllustrator/10.0/",
    "http://ns.adobe.com/Graphs/1.0/",
    "http://ns.adobe.com/AdobeSVGViewerExtensions/3.0/",
    "http://ns.adobe.com/Variables/1.0/",
    "http://ns.adobe.com/SaveForWeb/1.0/",
    "http://ns.adobe.com/Extensibility/1.0/",
    "http://ns.adobe.com/Flows/1.0/",
    "http://ns.adobe.com/ImageReplacement/1.0/",
    "http://ns.adobe.com/GenericCustomNamespace/1.0/",
    "http://ns.adobe.com/XPath/1.0/",
    "http://creativecommons.org/ns#",
    "http://purl.org/dc/elements/1.1/",
    "http://www.w3.org/1999/02/22-rdf-syntax-ns#",
];

/// Elements removed wherever they appear.
const REMOVED_ELEMENTS: &[&str] = &["metadata", "title", "desc"];

/// Containers dropped when they end up with no children and no attributes.
const EMPTY_CONTAINERS: &[&str] = &["g", "defs", "symbol", "marker", "mask", "pattern", "clipPath"];

/// Elements whose text content is significant.
const TEXT_ELEMENTS: &[&str] = &["text", "tspan", "textPath", "style", "script"];

/// Attributes holding a single number or a list of numbers.
const NUMERIC_ATTRIBUTES: &[&str] = &[
    "x", "y", "x1", "y1", "x2", "y2", "cx", "cy", "r", "rx", "ry", "fx", "fy", "width",
    "height", "stroke-width", "opacity", "fill-opacity", "stroke-opacity", "offset",
    "viewBox", "points",
];

#[derive(Debug, Clone)]
pub struct OptimizeOptions {
    /// Repeat passes until the output is stable.
    pub multipass: bool,
    /// Replace `width`/`height` on the root with a `viewBox`.
    pub remove_dimensions: bool,
    /// Decimal places kept in numeric attributes and path data.
    pub precision: u32,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self { multipass: true, remove_dimensions: true, precision: 3 }
    }
}

/// Optimize SVG markup with the default options.
pub fn optimize(source: &str) -> Result<String> {
    optimize_with(source, &OptimizeOptions::default())
}

pub fn optimize_with(source: &str, options: &OptimizeOptions) -> Result<String> {
    let mut root = Element::parse(source)?;
    let mut markup = root.to_markup();
    let passes = if options.multipass { MAX_PASSES } else { 1 };

    for pass in 1..=passes {
        run_passes(&mut root, options);
        let next = root.to_markup();
        if next == markup {
            break;
        }
        trace!("optimize pass {pass}: {} -> {} bytes", markup.len(), next.len());
        markup = next;
    }

    Ok(markup)
}

fn run_passes(root: &mut Element, options: &OptimizeOptions) {
    remove_editor_data(root);
    remove_elements(root);
    cleanup_attributes(root);
    remove_empty_text(root);
    if options.remove_dimensions {
        remove_dimensions(root, options.precision);
    }
    remove_root_defaults(root);
    cleanup_ids(root);
    remove_useless_defs(root);
    collapse_groups(root);
    remove_empty_containers(root);
    round_numbers(root, options.precision);
    remove_unused_namespaces(root);
}

fn is_editor_namespace(uri: Option<&str>) -> bool {
    uri.is_some_and(|uri| EDITOR_NAMESPACES.contains(&uri))
}

fn remove_editor_data(element: &mut Element) {
    element.attributes.retain(|a| {
        if a.is_namespace_declaration() {
            !is_editor_namespace(Some(a.value.as_str()))
        } else {
            !is_editor_namespace(a.namespace.as_deref())
        }
    });
    element.children.retain(|node| match node {
        Node::Element(child) => !is_editor_namespace(child.namespace.as_deref()),
        Node::Text(_) => true,
    });
    element.child_elements_mut().for_each(remove_editor_data);
}

fn remove_elements(element: &mut Element) {
    element.children.retain(|node| match node {
        Node::Element(child) => !REMOVED_ELEMENTS.iter().any(|name| child.is(name)),
        Node::Text(_) => true,
    });
    element.child_elements_mut().for_each(remove_elements);
}

fn cleanup_attributes(root: &mut Element) {
    root.walk_mut(&mut |element| {
        for attribute in &mut element.attributes {
            if attribute.value.chars().any(char::is_whitespace) {
                attribute.value = attribute.value.split_whitespace().collect::<Vec<_>>().join(" ");
            }
        }
        element.attributes.retain(|a| a.is_namespace_declaration() || !a.value.is_empty());
    });
}

fn remove_empty_text(element: &mut Element) {
    let keeps_text = TEXT_ELEMENTS.iter().any(|name| element.is(name));
    if !keeps_text {
        element.children.retain(|node| match node {
            Node::Text(text) => !text.trim().is_empty(),
            Node::Element(_) => true,
        });
    }
    element.child_elements_mut().for_each(remove_empty_text);
}

fn remove_dimensions(root: &mut Element, precision: u32) {
    if !root.has_attr("viewBox") {
        let width = root.attr("width").and_then(parse_length);
        let height = root.attr("height").and_then(parse_length);
        let (Some(width), Some(height)) = (width, height) else {
            return;
        };
        root.set_attr(
            "viewBox",
            format!("0 0 {} {}", format_number(width, precision), format_number(height, precision)),
        );
    }
    root.remove_attr("width");
    root.remove_attr("height");
}

fn remove_root_defaults(root: &mut Element) {
    root.remove_attr("version");
    root.remove_attr("enable-background");
    for axis in ["x", "y"] {
        if root.attr(axis).and_then(parse_length) == Some(0.0) {
            root.remove_attr(axis);
        }
    }
}

/// Drop `id`s nothing refers to. Skipped when the document has styles or
/// scripts, which may select by id.
fn cleanup_ids(root: &mut Element) {
    let mut has_style = false;
    let mut referenced = HashSet::new();

    root.walk(&mut |element| {
        if element.is("style") || element.is("script") {
            has_style = true;
        }
        for attribute in element.plain_attributes() {
            collect_references(&attribute.value, &mut referenced);
            if attribute.name == "href" || attribute.name.ends_with(":href") {
                if let Some(id) = attribute.value.strip_prefix('#') {
                    referenced.insert(id.to_string());
                }
            }
        }
    });

    if has_style {
        return;
    }

    root.walk_mut(&mut |element| {
        if element.attr("id").is_some_and(|id| !referenced.contains(id)) {
            element.remove_attr("id");
        }
    });
}

fn collect_references(value: &str, referenced: &mut HashSet<String>) {
    let mut rest = value;
    while let Some(start) = rest.find("url(") {
        let after = &rest[start + 4..];
        let Some(end) = after.find(')') else {
            break;
        };
        let target = after[..end].trim().trim_matches(|c: char| c == '"' || c == '\'');
        if let Some(id) = target.strip_prefix('#') {
            referenced.insert(id.to_string());
        }
        rest = &after[end..];
    }
}

/// Children of `<defs>` without an `id` can never be used.
fn remove_useless_defs(root: &mut Element) {
    root.walk_mut(&mut |element| {
        if element.is("defs") {
            element.children.retain(|node| match node {
                Node::Element(child) => child.has_attr("id") || child.is("style"),
                Node::Text(_) => false,
            });
        }
    });
}

/// Hoist the children of attribute-less groups into their parent.
fn collapse_groups(element: &mut Element) {
    element.child_elements_mut().for_each(collapse_groups);

    if !element.children.iter().any(is_bare_group) {
        return;
    }

    let children = std::mem::take(&mut element.children);
    for node in children {
        match node {
            Node::Element(group) if group.is("g") && group.attributes.is_empty() => {
                element.children.extend(group.children);
            }
            other => element.children.push(other),
        }
    }
}

fn is_bare_group(node: &Node) -> bool {
    matches!(node, Node::Element(group) if group.is("g") && group.attributes.is_empty())
}

fn remove_empty_containers(element: &mut Element) {
    element.child_elements_mut().for_each(remove_empty_containers);
    element.children.retain(|node| match node {
        Node::Element(child) => {
            let container = EMPTY_CONTAINERS.iter().any(|name| child.is(name));
            !(container && child.children.is_empty() && child.attr("id").is_none())
        }
        Node::Text(_) => true,
    });
}

fn round_numbers(root: &mut Element, precision: u32) {
    root.walk_mut(&mut |element| {
        for attribute in &mut element.attributes {
            if attribute.namespace.is_some() {
                continue;
            }
            if attribute.name == "d" {
                attribute.value = round_path_data(&attribute.value, precision);
            } else if NUMERIC_ATTRIBUTES.contains(&attribute.name.as_str()) {
                if let Some(rounded) = round_number_list(&attribute.value, precision) {
                    attribute.value = rounded;
                }
            }
        }
    });
}

/// Drop `xmlns:prefix` declarations no element or attribute uses.
fn remove_unused_namespaces(root: &mut Element) {
    let mut used = HashSet::new();
    root.walk(&mut |element| {
        if let Some((prefix, _)) = element.name.split_once(':') {
            used.insert(prefix.to_string());
        }
        for attribute in element.plain_attributes() {
            if let Some(prefix) = attribute.prefix() {
                used.insert(prefix.to_string());
            }
        }
    });

    root.walk_mut(&mut |element| {
        element.attributes.retain(|a| match a.declared_prefix() {
            Some(prefix) => prefix == "xml" || used.contains(prefix),
            None => true,
        });
    });
}

fn parse_length(value: &str) -> Option<f64> {
    value.trim().trim_end_matches("px").parse().ok()
}

/// Round with `precision` decimals, printing the shortest form.
pub(crate) fn format_number(value: f64, precision: u32) -> String {
    let factor = 10f64.powi(precision as i32);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 {
        return "0".to_string();
    }
    format!("{rounded}")
}

fn round_number_list(value: &str, precision: u32) -> Option<String> {
    let parts: Vec<&str> =
        value.split(|c: char| c == ',' || c.is_whitespace()).filter(|s| !s.is_empty()).collect();
    let numbers: Option<Vec<f64>> = parts.iter().map(|p| p.parse().ok()).collect();
    let numbers = numbers?;
    Some(numbers.iter().map(|n| format_number(*n, precision)).collect::<Vec<_>>().join(" "))
}

/// Round every number in path data and strip redundant separators.
///
/// Handles the compact forms editors emit: `1.5.5` is two numbers, `-`
/// starts a new number, and arc flags may be written without separators
/// (`a1 1 0 011 1`).
fn round_path_data(d: &str, precision: u32) -> String {
    let mut out = String::with_capacity(d.len());
    let mut previous_was_number = false;
    let chars: Vec<char> = d.chars().collect();
    let mut command = ' ';
    let mut param = 0usize;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_ascii_alphabetic() && c != 'e' && c != 'E' {
            out.push(c);
            command = c;
            param = 0;
            previous_was_number = false;
            i += 1;
        } else if is_arc_flag(command, param) && (c == '0' || c == '1') {
            if previous_was_number {
                out.push(' ');
            }
            out.push(c);
            previous_was_number = true;
            param += 1;
            i += 1;
        } else if c.is_ascii_digit() || c == '.' || c == '-' || c == '+' {
            let (end, text) = scan_number(&chars, i);
            let formatted = match text.parse::<f64>() {
                Ok(number) => format_number(number, precision),
                Err(_) => text,
            };
            if previous_was_number && !formatted.starts_with('-') {
                out.push(' ');
            }
            out.push_str(&formatted);
            previous_was_number = true;
            param += 1;
            i = end;
        } else {
            // Separators are re-inserted only where needed.
            i += 1;
        }
    }

    out
}

/// Large-arc and sweep flags are the 4th and 5th of each 7 arc parameters.
fn is_arc_flag(command: char, param: usize) -> bool {
    matches!(command, 'a' | 'A') && matches!(param % 7, 3 | 4)
}

fn scan_number(chars: &[char], start: usize) -> (usize, String) {
    let mut i = start;
    let mut seen_dot = false;
    let mut seen_exp = false;

    if chars[i] == '-' || chars[i] == '+' {
        i += 1;
    }
    while i < chars.len() {
        let c = chars[i];
        if c.is_ascii_digit() {
            i += 1;
        } else if c == '.' && !seen_dot && !seen_exp {
            seen_dot = true;
            i += 1;
        } else if (c == 'e' || c == 'E') && !seen_exp {
            seen_exp = true;
            i += 1;
            if i < chars.len() && (chars[i] == '-' || chars[i] == '+') {
                i += 1;
            }
        } else {
            break;
        }
    }

    (i, chars[start..i].iter().collect())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_strips_editor_noise() {
        let source = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- Generator: Sketch -->
<svg xmlns="http://www.w3.org/2000/svg" xmlns:sketch="http://www.bohemiancoding.com/sketch/ns" width="24px" height="24px" viewBox="0 0 24 24" version="1.1">
  <title>home</title>
  <desc>Created with Sketch.</desc>
  <metadata>whatever</metadata>
  <g>
    <path sketch:type="MSShapeGroup" d="M 2.00001 12 L 12 2 L 22 12 Z"/>
  </g>
</svg>
"#;
        let optimized = optimize(source).unwrap();
        assert_eq!(
            optimized,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><path d="M2 12L12 2L22 12Z"/></svg>"#
        );
    }

    #[test]
    fn test_adds_view_box_from_dimensions() {
        let source = r#"<svg xmlns="http://www.w3.org/2000/svg" width="16" height="16"><path d="M0 0h16v16H0z"/></svg>"#;
        let optimized = optimize(source).unwrap();
        assert_eq!(
            optimized,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 16 16"><path d="M0 0h16v16H0z"/></svg>"#
        );
    }

    #[test]
    fn test_keeps_referenced_ids() {
        let source = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><defs><clipPath id="c"><rect width="24" height="24"/></clipPath><linearGradient/></defs><g id="unused" clip-path="url(#c)"><path d="M0 0"/></g></svg>"##;
        let optimized = optimize(source).unwrap();
        assert_eq!(
            optimized,
            r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><defs><clipPath id="c"><rect width="24" height="24"/></clipPath></defs><g clip-path="url(#c)"><path d="M0 0"/></g></svg>"##
        );
    }

    #[test]
    fn test_ids_kept_when_styles_present() {
        let source = r#"<svg xmlns="http://www.w3.org/2000/svg"><style>#a{fill:red}</style><path id="a" d="M0 0"/></svg>"#;
        let optimized = optimize(source).unwrap();
        assert!(optimized.contains(r#"id="a""#));
        assert!(optimized.contains("<style>#a{fill:red}</style>"));
    }

    #[test]
    fn test_round_path_data() {
        assert_eq!(round_path_data("M 1.23456,-7.0001 L.5.5", 3), "M1.235-7L0.5 0.5");
        assert_eq!(round_path_data("m10 20c1e1 0 0 0 0 0", 3), "m10 20c10 0 0 0 0 0");
    }

    #[test]
    fn test_compact_arc_flags_stay_separate() {
        assert_eq!(round_path_data("M0 0a1 1 0 011 1", 3), "M0 0a1 1 0 0 1 1 1");
        assert_eq!(
            round_path_data("M2 2A5 5 0 1 0 8 8a2.5 2.5 0 10-1.25.5", 3),
            "M2 2A5 5 0 1 0 8 8a2.5 2.5 0 1 0-1.25 0.5"
        );
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1.0, 3), "1");
        assert_eq!(format_number(-0.0001, 3), "0");
        assert_eq!(format_number(0.30000000000000004, 3), "0.3");
    }

    #[test]
    fn test_invalid_markup_fails() {
        assert!(optimize("<svg").is_err());
    }
}

use crate::{
    error::{Error, Result},
    tree::{Element, Node},
};

/// CSS class added to every drawable child when restyling for draw.io.
pub const ICON_CLASS: &str = "icon";

/// Markup of the `<svg>` root with double quotes swapped for single quotes,
/// ready to be embedded in a double-quoted string.
///
/// Returns `None` when the document is well formed but its root is not `<svg>`.
pub fn inline_markup(source: &str) -> Result<Option<String>> {
    match Element::parse(source) {
        Ok(root) => Ok(Some(root.to_markup().replace('"', "'"))),
        Err(Error::NotSvg(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Prepend a `<style>` element holding `style_rule` and add the `icon` class
/// to every direct child of the root, the new style element included.
pub fn add_icon_class(source: &str, style_rule: &str) -> Result<String> {
    let mut root = Element::parse(source)?;

    let mut style = Element::new("style");
    style.set_attr("type", "text/css");
    style.children.push(Node::Text(style_rule.to_string()));
    root.children.insert(0, Node::Element(style));

    for child in root.child_elements_mut() {
        let class = match child.attr("class") {
            Some(existing) if existing.split_whitespace().any(|c| c == ICON_CLASS) => continue,
            Some(existing) if !existing.trim().is_empty() => format!("{existing} {ICON_CLASS}"),
            _ => ICON_CLASS.to_string(),
        };
        child.set_attr("class", class);
    }

    Ok(root.to_markup())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_inline_markup_swaps_quotes() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><path d="M0 0"/></svg>"#;
        assert_eq!(
            inline_markup(svg).unwrap().as_deref(),
            Some("<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 24 24'><path d='M0 0'/></svg>")
        );
    }

    #[test]
    fn test_inline_markup_skips_other_documents() {
        assert_eq!(inline_markup("<html/>").unwrap(), None);
        assert!(inline_markup("not xml").is_err());
    }

    #[test]
    fn test_add_icon_class() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><path d="M0 0"/><circle class="dot" r="1"/></svg>"#;
        let styled = add_icon_class(svg, ".icon{fill:#000000;}").unwrap();
        assert_eq!(
            styled,
            r#"<svg xmlns="http://www.w3.org/2000/svg"><style type="text/css" class="icon">.icon{fill:#000000;}</style><path d="M0 0" class="icon"/><circle class="dot icon" r="1"/></svg>"#
        );
    }
}

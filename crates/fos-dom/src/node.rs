//! DOM Node
//!
//! Nodes link to each other through `NodeId` indices instead of pointers, so
//! a detached subtree stays addressable until the arena is dropped.

use crate::NodeId;
use crate::geometry::DOMRect;

/// Box given to elements until the host lays them out.
pub(crate) const PLACEHOLDER_BOX: DOMRect = DOMRect { x: 0.0, y: 0.0, width: 100.0, height: 20.0 };

/// DOM Node - Core structure
#[derive(Debug)]
pub struct Node {
    /// Parent node (NONE if root or detached)
    pub parent: NodeId,
    /// First child
    pub first_child: NodeId,
    /// Last child (for O(1) append)
    pub last_child: NodeId,
    /// Previous sibling
    pub prev_sibling: NodeId,
    /// Next sibling
    pub next_sibling: NodeId,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    fn with_data(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }

    /// Create a new element node
    pub fn element(tag: &str) -> Self {
        Self::with_data(NodeData::Element(ElementData::new(tag)))
    }

    /// Create a new text node
    pub fn text(content: &str) -> Self {
        Self::with_data(NodeData::Text(content.to_string()))
    }

    /// Create a new comment node
    pub fn comment(content: &str) -> Self {
        Self::with_data(NodeData::Comment(content.to_string()))
    }

    /// Create a document node
    pub fn document() -> Self {
        Self::with_data(NodeData::Document)
    }

    /// Check if this is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// Check if children may be inserted under this node
    #[inline]
    pub fn is_container(&self) -> bool {
        matches!(self.data, NodeData::Element(_) | NodeData::Document)
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get mutable element data
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get text content if this is a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug)]
pub enum NodeData {
    /// Document root
    Document,
    /// Element
    Element(ElementData),
    /// Text content
    Text(String),
    /// Comment
    Comment(String),
}

/// Element-specific data
#[derive(Debug)]
pub struct ElementData {
    /// Lower-case tag name
    pub tag: String,
    /// Attributes in insertion order
    pub attrs: Vec<Attribute>,
    /// Inline style declarations in insertion order
    pub style: Vec<(String, String)>,
    /// Border box as laid out by the host
    pub rect: DOMRect,
    /// Text selection range (inputs and textareas)
    pub selection: Option<(usize, usize)>,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            style: Vec::new(),
            rect: PLACEHOLDER_BOX,
            selection: None,
        }
    }

    /// Get an attribute value
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    /// Check attribute presence
    pub fn has_attr(&self, name: &str) -> bool {
        self.get_attr(name).is_some()
    }

    /// Set an attribute, returning the previous value
    pub fn set_attr(&mut self, name: &str, value: &str) -> Option<String> {
        if let Some(attr) = self.attrs.iter_mut().find(|a| a.name.eq_ignore_ascii_case(name)) {
            return Some(std::mem::replace(&mut attr.value, value.to_string()));
        }
        self.attrs.push(Attribute { name: name.to_ascii_lowercase(), value: value.to_string() });
        None
    }

    /// Remove an attribute, returning its value
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self.attrs.iter().position(|a| a.name.eq_ignore_ascii_case(name))?;
        Some(self.attrs.remove(pos).value)
    }

    /// Get an inline style property
    pub fn get_style(&self, property: &str) -> Option<&str> {
        self.style.iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(property))
            .map(|(_, value)| value.as_str())
    }

    /// Set an inline style property
    pub fn set_style(&mut self, property: &str, value: &str) {
        if let Some(entry) = self.style.iter_mut().find(|(name, _)| name.eq_ignore_ascii_case(property)) {
            entry.1 = value.to_string();
            return;
        }
        self.style.push((property.to_ascii_lowercase(), value.to_string()));
    }

    /// Remove an inline style property, returning its value
    pub fn remove_style(&mut self, property: &str) -> Option<String> {
        let pos = self.style.iter().position(|(name, _)| name.eq_ignore_ascii_case(property))?;
        Some(self.style.remove(pos).1)
    }

    /// Check for a class in the `class` attribute
    pub fn has_class(&self, class: &str) -> bool {
        self.get_attr("class")
            .is_some_and(|list| list.split_ascii_whitespace().any(|c| c == class))
    }
}

/// Attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes() {
        let mut elem = ElementData::new("BUTTON");
        assert_eq!(elem.tag, "button");

        assert_eq!(elem.set_attr("TabIndex", "0"), None);
        assert_eq!(elem.get_attr("tabindex"), Some("0"));
        assert_eq!(elem.set_attr("tabindex", "-1"), Some("0".to_string()));
        assert_eq!(elem.remove_attr("tabindex"), Some("-1".to_string()));
        assert!(!elem.has_attr("tabindex"));
    }

    #[test]
    fn test_inline_style() {
        let mut elem = ElementData::new("div");
        elem.set_style("display", "none");
        elem.set_style("Display", "block");

        assert_eq!(elem.style.len(), 1);
        assert_eq!(elem.get_style("display"), Some("block"));
        assert_eq!(elem.remove_style("display"), Some("block".to_string()));
        assert_eq!(elem.get_style("display"), None);
    }

    #[test]
    fn test_class_list() {
        let mut elem = ElementData::new("li");
        elem.set_attr("class", "item  active");

        assert!(elem.has_class("item"));
        assert!(elem.has_class("active"));
        assert!(!elem.has_class("act"));
    }
}

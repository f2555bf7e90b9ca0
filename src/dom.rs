//! Document-tree access and mutation
//!
//! Thin helpers over the shared-ownership `rcdom` node graph. Handles are
//! `Rc`-based element references with interior mutability, so callers can
//! hold on to an image element across deferrals the same way page script
//! would, and mutations stay visible through every outstanding handle.
//!
//! Everything here is plain tree surgery: attribute get/set, id lookup,
//! element creation, and child append/insert/detach that keep the parent
//! back-pointers consistent.

use crate::error::Result;
use html5ever::parse_document;
use html5ever::tendril::StrTendril;
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::Attribute;
use html5ever::LocalName;
use html5ever::Namespace;
use html5ever::ParseOpts;
use html5ever::QualName;
use markup5ever_rcdom::Handle;
use markup5ever_rcdom::Node;
use markup5ever_rcdom::NodeData;
use markup5ever_rcdom::RcDom;
use std::cell::RefCell;
use std::rc::Rc;

pub const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Parse an HTML string into a document handle.
///
/// Scripting is disabled; the tree is built with html5ever defaults
/// otherwise.
pub fn parse_html(html: &str) -> Result<Handle> {
  let opts = ParseOpts {
    tree_builder: TreeBuilderOpts {
      scripting_enabled: false,
      ..Default::default()
    },
    ..Default::default()
  };

  let mut input = html.as_bytes();
  let dom = parse_document(RcDom::default(), opts)
    .from_utf8()
    .read_from(&mut input)?;
  Ok(dom.document)
}

/// Returns the lowercased tag name, or `None` for non-element nodes.
pub fn tag_name(node: &Handle) -> Option<String> {
  match &node.data {
    NodeData::Element { name, .. } => Some(name.local.as_ref().to_ascii_lowercase()),
    _ => None,
  }
}

/// Returns an attribute value. Attribute names compare ASCII
/// case-insensitively, matching HTML semantics.
pub fn get_attr(node: &Handle, name: &str) -> Option<String> {
  match &node.data {
    NodeData::Element { attrs, .. } => attrs
      .borrow()
      .iter()
      .find(|a| a.name.local.as_ref().eq_ignore_ascii_case(name))
      .map(|a| a.value.to_string()),
    _ => None,
  }
}

/// Sets an attribute, replacing any existing value. No-op on non-elements.
pub fn set_attr(node: &Handle, name: &str, value: &str) {
  if let NodeData::Element { attrs, .. } = &node.data {
    let mut attrs = attrs.borrow_mut();
    if let Some(existing) = attrs
      .iter_mut()
      .find(|a| a.name.local.as_ref().eq_ignore_ascii_case(name))
    {
      existing.value = StrTendril::from(value);
    } else {
      attrs.push(Attribute {
        name: QualName::new(None, Namespace::from(""), LocalName::from(name)),
        value: StrTendril::from(value),
      });
    }
  }
}

/// Removes an attribute if present.
pub fn remove_attr(node: &Handle, name: &str) {
  if let NodeData::Element { attrs, .. } = &node.data {
    let mut attrs = attrs.borrow_mut();
    if let Some(idx) = attrs
      .iter()
      .position(|a| a.name.local.as_ref().eq_ignore_ascii_case(name))
    {
      attrs.remove(idx);
    }
  }
}

/// Reads an attribute as a pixel quantity. Unparseable values read as absent.
pub fn attr_f64(node: &Handle, name: &str) -> Option<f64> {
  get_attr(node, name).and_then(|v| v.trim().parse().ok())
}

/// Finds the element carrying the given `id`, searching the whole subtree.
///
/// Id comparison is case-sensitive, per HTML. Linear in document size;
/// forum pages are small enough that no index is kept.
pub fn get_element_by_id(root: &Handle, id: &str) -> Option<Handle> {
  if get_attr(root, "id").as_deref() == Some(id) {
    return Some(root.clone());
  }
  for child in root.children.borrow().iter() {
    if let Some(found) = get_element_by_id(child, id) {
      return Some(found);
    }
  }
  None
}

/// Finds the first element with the given tag name in tree order.
pub fn find_first_element(root: &Handle, tag: &str) -> Option<Handle> {
  if tag_name(root).as_deref() == Some(tag) {
    return Some(root.clone());
  }
  for child in root.children.borrow().iter() {
    if let Some(found) = find_first_element(child, tag) {
      return Some(found);
    }
  }
  None
}

/// Creates a detached HTML element.
pub fn create_element(tag: &str) -> Handle {
  Node::new(NodeData::Element {
    name: QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from(tag)),
    attrs: RefCell::new(Vec::new()),
    template_contents: RefCell::new(None),
    mathml_annotation_xml_integration_point: false,
  })
}

/// Returns the node's parent, if it is attached.
pub fn parent_of(node: &Handle) -> Option<Handle> {
  // Cell<Option<Weak>> has no non-consuming read; take and restore.
  let weak = node.parent.take();
  let parent = weak.as_ref().and_then(|w| w.upgrade());
  node.parent.set(weak);
  parent
}

/// Appends `child` as the last child of `parent`.
pub fn append_child(parent: &Handle, child: &Handle) {
  child.parent.set(Some(Rc::downgrade(parent)));
  parent.children.borrow_mut().push(child.clone());
}

/// Inserts `new` immediately before `reference` among `parent`'s children.
///
/// Falls back to appending when `reference` is not a child of `parent`;
/// the callers in this crate always pass a current child.
pub fn insert_before(parent: &Handle, new: &Handle, reference: &Handle) {
  new.parent.set(Some(Rc::downgrade(parent)));
  let mut children = parent.children.borrow_mut();
  match children.iter().position(|c| Rc::ptr_eq(c, reference)) {
    Some(pos) => children.insert(pos, new.clone()),
    None => children.push(new.clone()),
  }
}

/// Detaches a node from its parent, if any.
pub fn detach(node: &Handle) {
  if let Some(parent) = parent_of(node) {
    let mut children = parent.children.borrow_mut();
    if let Some(pos) = children.iter().position(|c| Rc::ptr_eq(c, node)) {
      children.remove(pos);
    }
  }
  node.parent.set(None);
}

/// Returns the element children of a node, skipping text and comments.
pub fn element_children(node: &Handle) -> Vec<Handle> {
  node
    .children
    .borrow()
    .iter()
    .filter(|c| matches!(c.data, NodeData::Element { .. }))
    .cloned()
    .collect()
}

//! Descriptor extraction — the single-pass stylesheet walk.
//! Spec: <https://www.w3.org/TR/css-properties-values-api-1/#registering-custom-properties>

use crate::inference::infer_value_syntax;
use crate::pattern::compile;
use crate::registration::{PropertyDescriptor, descriptor_from_block};
use css_syntax::{Declaration, Node, Stylesheet};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// A registration block's params: exactly one custom property name.
static REGISTRATION_NAME: Lazy<Regex> = Lazy::new(|| compile(r"^\s*(--[\w-]+)\s*$"));

/// The generic custom property name pattern.
static CUSTOM_PROPERTY_NAME: Lazy<Regex> = Lazy::new(|| compile(r"^--[\w-]+$"));

/// Name-keyed descriptor table preserving first-encounter order.
///
/// Inserting an existing name overwrites in place, keeping the
/// first-seen position; inserting a new name appends. The table lives
/// for one extraction pass and is then drained into an ordered list.
#[derive(Clone, Debug, Default)]
pub struct DescriptorTable {
    entries: Vec<PropertyDescriptor>,
    index_by_name: HashMap<String, usize>,
}

impl DescriptorTable {
    /// An empty table.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored descriptors.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table holds no descriptors.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Store a descriptor under its name.
    ///
    /// Plain document-order overwrite: a later descriptor replaces an
    /// earlier one for the same name wholesale, keeping the first-seen
    /// position in the emitted order.
    pub fn insert(&mut self, descriptor: PropertyDescriptor) {
        if let Some(&position) = self.index_by_name.get(&descriptor.name) {
            if let Some(entry) = self.entries.get_mut(position) {
                *entry = descriptor;
            }
        } else {
            self.index_by_name
                .insert(descriptor.name.clone(), self.entries.len());
            self.entries.push(descriptor);
        }
    }

    /// Drop the entry for `name`, if any. A later insert for the same
    /// name starts over at the end of the order.
    pub fn remove(&mut self, name: &str) {
        if let Some(position) = self.index_by_name.remove(name) {
            let _removed = self.entries.remove(position);
            for index in self.index_by_name.values_mut() {
                if *index > position {
                    *index = index.wrapping_sub(1);
                }
            }
        }
    }

    /// Drain the table into the ordered descriptor list.
    #[inline]
    pub fn into_descriptors(self) -> Vec<PropertyDescriptor> {
        self.entries
    }
}

/// Extract the registration name from an at-rule's params, if the
/// params are exactly one custom property name.
fn registration_name(params: &str) -> Option<&str> {
    let captures = REGISTRATION_NAME.captures(params)?;
    Some(captures.get(1)?.as_str())
}

/// Whether a declaration names a custom property (`--*` with at least
/// one identifier character).
fn is_custom_property_declaration(declaration: &Declaration) -> bool {
    CUSTOM_PROPERTY_NAME.is_match(&declaration.name)
}

/// Infer a descriptor from one plain declaration, when its value is
/// informative enough.
fn detect_declaration(declaration: &Declaration, table: &mut DescriptorTable) {
    if !is_custom_property_declaration(declaration) {
        return;
    }
    if let Some(syntax) = infer_value_syntax(&declaration.value) {
        log::trace!(
            "detected syntax \"{syntax}\" for custom property {}",
            declaration.name
        );
        let mut descriptor = PropertyDescriptor::new(declaration.name.clone());
        descriptor.syntax = Some(syntax);
        table.insert(descriptor);
    }
}

/// Recursively detect custom property declarations below a kept node.
fn detect_in_node(node: &Node, table: &mut DescriptorTable) {
    match node {
        Node::Rule(rule) => {
            for declaration in &rule.declarations {
                detect_declaration(declaration, table);
            }
        }
        Node::AtRule(at_rule) => {
            for child in &at_rule.nodes {
                detect_in_node(child, table);
            }
        }
        Node::Declaration(declaration) => detect_declaration(declaration, table),
    }
}

/// Walk the stylesheet once, in document order, building the descriptor
/// table and removing consumed registration blocks from the tree.
///
/// Registration blocks are recognized only among the stylesheet's
/// direct children; a matching block is always removed, whether or not
/// it produced a non-default descriptor. An all-default block also
/// clears any earlier entry for its name. When `detect` is set, plain
/// custom property declarations at any remaining depth contribute
/// inferred descriptors.
pub fn extract_descriptors(stylesheet: &mut Stylesheet, detect: bool) -> DescriptorTable {
    let mut table = DescriptorTable::new();
    stylesheet.nodes.retain(|node| {
        if let Node::AtRule(at_rule) = node
            && let Some(name) = registration_name(&at_rule.params)
        {
            match descriptor_from_block(name, &at_rule.nodes) {
                Some(descriptor) => {
                    log::debug!("registered custom property {name}");
                    table.insert(descriptor);
                }
                // A block with nothing non-default registers nothing.
                None => table.remove(name),
            }
            // Consume the block either way.
            return false;
        }
        if detect {
            detect_in_node(node, &mut table);
        }
        true
    });
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use css_syntax::parse_stylesheet;

    fn names(table: DescriptorTable) -> Vec<String> {
        table
            .into_descriptors()
            .into_iter()
            .map(|descriptor| descriptor.name)
            .collect()
    }

    /// Registration blocks are consumed and their descriptors stored.
    ///
    /// # Panics
    /// Panics if assertions fail.
    #[test]
    fn registers_and_removes_blocks() {
        let mut sheet = parse_stylesheet(
            "@property --hue { syntax: \"<angle>\"; inherits: true; }\n\
             a { color: red; }",
        );
        let table = extract_descriptors(&mut sheet, false);
        assert_eq!(table.len(), 1);
        assert_eq!(sheet.nodes.len(), 1);
        assert!(matches!(sheet.nodes.first(), Some(Node::Rule(_))));
    }

    /// An all-default block is removed without emitting a descriptor.
    ///
    /// # Panics
    /// Panics if assertions fail.
    #[test]
    fn all_default_block_is_a_no_op() {
        let mut sheet = parse_stylesheet("@property --quiet { inherits: false; }");
        let table = extract_descriptors(&mut sheet, false);
        assert!(table.is_empty());
        assert!(sheet.nodes.is_empty());
    }

    /// Running the walk again on the processed tree adds nothing.
    ///
    /// # Panics
    /// Panics if assertions fail.
    #[test]
    fn second_walk_is_idempotent() {
        let mut sheet = parse_stylesheet(
            "@property --hue { syntax: \"<angle>\"; }\n\
             p { margin: 0; }",
        );
        let first = extract_descriptors(&mut sheet, false);
        assert_eq!(first.len(), 1);
        let second = extract_descriptors(&mut sheet, false);
        assert!(second.is_empty());
        assert_eq!(sheet.nodes.len(), 1);
    }

    /// Nested registration-shaped blocks are ignored and left in place.
    ///
    /// # Panics
    /// Panics if assertions fail.
    #[test]
    fn nested_blocks_are_ignored() {
        let mut sheet = parse_stylesheet(
            "@media screen { @property --hue { syntax: \"<angle>\"; } }",
        );
        let table = extract_descriptors(&mut sheet, true);
        assert!(table.is_empty());
        let Some(Node::AtRule(media)) = sheet.nodes.first() else {
            panic!("expected the media rule to survive");
        };
        assert_eq!(media.nodes.len(), 1);
    }

    /// Detection finds declarations nested under grouping at-rules.
    ///
    /// # Panics
    /// Panics if assertions fail.
    #[test]
    fn detects_inside_grouping_at_rules() {
        let mut sheet = parse_stylesheet(
            "@media screen { p { --detect-color: red; --plain: foo; } }",
        );
        let table = extract_descriptors(&mut sheet, true);
        let descriptors = table.into_descriptors();
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].name, "--detect-color");
        assert_eq!(descriptors[0].syntax, Some("<color>".to_owned()));
        assert_eq!(descriptors[0].inherits, None);
    }

    /// Detection is off by default and uninformative values are
    /// suppressed even when it is on.
    ///
    /// # Panics
    /// Panics if assertions fail.
    #[test]
    fn detection_gating() {
        let mut sheet = parse_stylesheet("a { --detect-color: red; }");
        assert!(extract_descriptors(&mut sheet, false).is_empty());

        let mut uninformative = parse_stylesheet("a { --words: foo bar; }");
        assert!(extract_descriptors(&mut uninformative, true).is_empty());
    }

    /// Same-name collisions across registration and detection resolve
    /// by plain document order: the last node to write wins, and the
    /// replacement is wholesale.
    ///
    /// # Panics
    /// Panics if assertions fail.
    #[test]
    fn document_order_overwrite_across_node_kinds() {
        let mut sheet = parse_stylesheet(
            "a { --hue: 90deg; }\n\
             @property --hue { syntax: \"<angle>\"; inherits: true; }\n\
             b { --hue: red; }",
        );
        let table = extract_descriptors(&mut sheet, true);
        let descriptors = table.into_descriptors();
        assert_eq!(descriptors.len(), 1);
        // The trailing detected declaration replaced the registration.
        assert_eq!(descriptors[0].syntax, Some("<color>".to_owned()));
        assert_eq!(descriptors[0].inherits, None);
        assert_eq!(descriptors[0].initial_value, None);
    }

    /// A registration block appearing after a detected declaration
    /// overwrites it the same way.
    ///
    /// # Panics
    /// Panics if assertions fail.
    #[test]
    fn later_registration_overwrites_detected_entry() {
        let mut sheet = parse_stylesheet(
            "a { --hue: red; }\n\
             @property --hue { syntax: \"<angle>\"; inherits: true; }",
        );
        let table = extract_descriptors(&mut sheet, true);
        let descriptors = table.into_descriptors();
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].syntax, Some("<angle>".to_owned()));
        assert_eq!(descriptors[0].inherits, Some(true));
    }

    /// Within detection, plain document-order overwrite applies.
    ///
    /// # Panics
    /// Panics if assertions fail.
    #[test]
    fn later_detection_overwrites_earlier() {
        let mut sheet = parse_stylesheet(
            "a { --accent: 4px; }\n\
             b { --other: 1s; }\n\
             c { --accent: red; }",
        );
        let table = extract_descriptors(&mut sheet, true);
        let descriptors = table.into_descriptors();
        // First-seen order is preserved across the overwrite.
        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[0].name, "--accent");
        assert_eq!(descriptors[0].syntax, Some("<color>".to_owned()));
        assert_eq!(descriptors[1].name, "--other");
    }

    /// Malformed registration params fail recognition and the block is
    /// left untouched.
    ///
    /// # Panics
    /// Panics if assertions fail.
    #[test]
    fn malformed_params_are_not_registrations() {
        let mut sheet = parse_stylesheet(
            "@property --bad name { syntax: \"<color>\"; }\n\
             @property { syntax: \"<color>\"; }",
        );
        let table = extract_descriptors(&mut sheet, false);
        assert!(table.is_empty());
        assert_eq!(sheet.nodes.len(), 2);
    }

    /// An all-default registration clears an earlier detected entry.
    ///
    /// # Panics
    /// Panics if assertions fail.
    #[test]
    fn all_default_registration_clears_detected_entry() {
        let mut sheet = parse_stylesheet(
            "a { --accent: red; }\n\
             @property --accent { inherits: false; }",
        );
        let table = extract_descriptors(&mut sheet, true);
        assert!(names(table).is_empty());
    }
}

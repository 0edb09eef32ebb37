//! Registering custom properties — descriptor validation and defaults.
//! Spec: <https://www.w3.org/TR/css-properties-values-api-1/#at-property-rule>

use css_syntax::{Declaration, Node};
use serde::Serialize;

/// Default for the `syntax` descriptor (the universal syntax).
/// Spec: <https://www.w3.org/TR/css-properties-values-api-1/#universal-syntax-definition>
pub const DEFAULT_SYNTAX: &str = "*";

/// The normalized metadata record for one registered custom property.
///
/// Only non-default fields are kept: `inherits` defaults to false,
/// `initialValue` to the empty string and `syntax` to `*`; a default
/// field is `None` and omitted from serialized output. Serialized key
/// order follows field order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PropertyDescriptor {
    /// The custom property name, including the leading `--`.
    pub name: String,
    /// Whether the property inherits. Only ever `Some(true)`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inherits: Option<bool>,
    /// The initial value, verbatim from the stylesheet.
    #[serde(rename = "initialValue", skip_serializing_if = "Option::is_none")]
    pub initial_value: Option<String>,
    /// The syntax string, or an inferred space-joined component list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub syntax: Option<String>,
}

impl PropertyDescriptor {
    /// A descriptor with every field at its default.
    #[inline]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inherits: None,
            initial_value: None,
            syntax: None,
        }
    }

    /// Whether no field beyond the name carries a non-default value.
    /// Such a descriptor is indistinguishable from "no registration"
    /// and is never emitted.
    #[inline]
    pub fn is_all_default(&self) -> bool {
        self.inherits.is_none() && self.initial_value.is_none() && self.syntax.is_none()
    }
}

/// The three recognized sub-declarations of a registration block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DescriptorField {
    Syntax,
    Inherits,
    InitialValue,
}

/// Map a sub-declaration property name to a descriptor field.
///
/// Matching is case- and hyphen-insensitive (`initial-value` and
/// `initialValue` are the same key). Custom properties never match.
fn descriptor_field(property_name: &str) -> Option<DescriptorField> {
    if property_name.starts_with("--") {
        return None;
    }
    let folded: String = property_name
        .chars()
        .filter(|character| *character != '-')
        .collect::<String>()
        .to_ascii_lowercase();
    match folded.as_str() {
        "syntax" => Some(DescriptorField::Syntax),
        "inherits" => Some(DescriptorField::Inherits),
        "initialvalue" => Some(DescriptorField::InitialValue),
        _ => None,
    }
}

/// Strip one matching pair of single or double quotes, if present.
fn unquote(value: &str) -> Option<&str> {
    let bytes = value.as_bytes();
    let open = bytes.first()?;
    let close = bytes.last()?;
    if bytes.len() >= 2 && open == close && (*open == b'"' || *open == b'\'') {
        value.get(1..value.len().wrapping_sub(1))
    } else {
        None
    }
}

/// Apply one recognized sub-declaration to the descriptor. Only
/// non-default results are written, so a later duplicate overwrites an
/// earlier one but a default-valued duplicate leaves it alone.
fn apply_field(
    descriptor: &mut PropertyDescriptor,
    field: DescriptorField,
    declaration: &Declaration,
) {
    match field {
        DescriptorField::Syntax => {
            // The syntax descriptor is a quoted string; unquoted text is
            // discarded and falls back to the universal default.
            if let Some(inner) = unquote(&declaration.value)
                .filter(|contents| !contents.is_empty() && *contents != DEFAULT_SYNTAX)
            {
                descriptor.syntax = Some(inner.to_owned());
            }
        }
        DescriptorField::Inherits => {
            // Strictly the literal `true`; anything else is the default.
            if declaration.value == "true" {
                descriptor.inherits = Some(true);
            }
        }
        DescriptorField::InitialValue => {
            if !declaration.value.is_empty() {
                descriptor.initial_value = Some(declaration.value.clone());
            }
        }
    }
}

/// Build a normalized descriptor from a registration block's body.
///
/// Unrecognized child declarations and non-declaration children are
/// ignored, never an error. Returns `None` when every recognized field
/// normalized to its default — such a block registers nothing.
pub fn descriptor_from_block(name: &str, children: &[Node]) -> Option<PropertyDescriptor> {
    let mut descriptor = PropertyDescriptor::new(name);
    for child in children {
        if let Node::Declaration(declaration) = child
            && let Some(field) = descriptor_field(&declaration.name)
        {
            apply_field(&mut descriptor, field, declaration);
        }
    }
    if descriptor.is_all_default() {
        None
    } else {
        Some(descriptor)
    }
}

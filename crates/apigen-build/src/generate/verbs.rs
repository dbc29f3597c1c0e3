//! Verb set shared by the Python front-end targets (`osc`, `ansible`).

use std::fmt;

use crate::descriptor::{is_server_assigned, AttributeDescriptor, AttributeType, ResourceDescriptor};
use crate::naming;

/// A command verb on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// List the collection.
    List,
    /// Show one resource.
    Show,
    /// Create a resource.
    Create,
    /// Delete resources.
    Delete,
    /// Change attributes.
    Set,
    /// Clear attributes.
    Unset,
}

impl Verb {
    /// Every verb in emission order.
    pub const ALL: [Self; 6] = [
        Self::List,
        Self::Show,
        Self::Create,
        Self::Delete,
        Self::Set,
        Self::Unset,
    ];

    /// Lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Show => "show",
            Self::Create => "create",
            Self::Delete => "delete",
            Self::Set => "set",
            Self::Unset => "unset",
        }
    }

    /// Whether the resource's capability flags allow this verb.
    #[must_use]
    pub fn is_allowed(self, descriptor: &ResourceDescriptor) -> bool {
        match self {
            Self::List => descriptor.allow_list,
            Self::Show => descriptor.allow_fetch,
            Self::Create => descriptor.allow_create,
            Self::Delete => descriptor.allow_delete,
            Self::Set | Self::Unset => descriptor.allow_commit,
        }
    }

    /// Verbs the resource allows.
    #[must_use]
    pub fn allowed(descriptor: &ResourceDescriptor) -> Vec<Self> {
        Self::ALL
            .into_iter()
            .filter(|verb| verb.is_allowed(descriptor))
            .collect()
    }

    /// Whether the verb names existing resources.
    #[must_use]
    pub fn targets_existing(self) -> bool {
        !matches!(self, Self::List | Self::Create)
    }

    /// Options the verb accepts, in attribute order.
    ///
    /// `list` filters by scalar attributes; `create` and `set` take every
    /// client-settable attribute; `unset` takes the optional ones as flags.
    #[must_use]
    pub fn options(self, descriptor: &ResourceDescriptor) -> Vec<VerbOption<'_>> {
        descriptor
            .attributes
            .iter()
            .filter(|(name, _)| !is_server_assigned(name))
            .filter_map(|(name, attribute)| {
                let option = VerbOption {
                    name: name.as_str(),
                    attribute,
                    required: false,
                    clears: false,
                };
                match self {
                    Self::List => is_scalar(attribute.attr_type).then_some(option),
                    Self::Create => Some(VerbOption {
                        required: attribute.required,
                        ..option
                    }),
                    Self::Set => Some(option),
                    Self::Unset => (!attribute.required).then_some(VerbOption {
                        clears: true,
                        ..option
                    }),
                    Self::Show | Self::Delete => None,
                }
            })
            .collect()
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One option of a verb.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerbOption<'d> {
    /// Attribute name.
    pub name: &'d str,
    /// Attribute descriptor.
    pub attribute: &'d AttributeDescriptor,
    /// Must be supplied.
    pub required: bool,
    /// A flag clearing the attribute instead of a value.
    pub clears: bool,
}

impl VerbOption<'_> {
    /// `--flag-name`.
    #[must_use]
    pub fn flag(&self) -> String {
        format!("--{}", naming::kebab(self.name))
    }

    /// `flag_name` as the parsed-argument attribute.
    #[must_use]
    pub fn dest(&self) -> String {
        naming::module_name(self.name)
    }
}

fn is_scalar(attr_type: AttributeType) -> bool {
    matches!(
        attr_type,
        AttributeType::Str | AttributeType::Int | AttributeType::Float | AttributeType::Bool
    )
}

/// Python type callable of an attribute (`int`), if it needs one.
pub(crate) fn python_type(attr_type: AttributeType) -> Option<&'static str> {
    match attr_type {
        AttributeType::Int => Some("int"),
        AttributeType::Float => Some("float"),
        AttributeType::Str
        | AttributeType::Bool
        | AttributeType::List
        | AttributeType::Dict
        | AttributeType::Raw => None,
    }
}

/// Python string literal.
pub(crate) fn py_str(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n");
    format!("\"{escaped}\"")
}

/// First line of a doc string, without trailing period.
pub(crate) fn summary_line(doc: Option<&str>) -> Option<&str> {
    doc.and_then(|d| d.lines().map(str::trim).find(|l| !l.is_empty()))
        .map(|line| line.trim_end_matches('.'))
}

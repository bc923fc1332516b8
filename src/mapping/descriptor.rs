// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping descriptors: the structural description of a binding target.
//!
//! Descriptors are supplied by an external layer (an annotation processor, a
//! derive macro, hand-written registration code); the engine discovers
//! nothing about target shapes itself. A descriptor lists a target's members
//! in order, each with a logical config name, a declared shape and an
//! optional literal default.

use crate::domain::Key;
use std::any::TypeId;

/// The structural description of one binding target.
///
/// # Examples
///
/// ```
/// use treecfg::mapping::{MappingDescriptor, Member, Shape};
///
/// let server = MappingDescriptor::new("Server")
///     .with_member(Member::new("host", Shape::scalar::<String>()))
///     .with_member(Member::new("port", Shape::scalar::<u16>()).with_default("8080"));
///
/// assert_eq!(server.members().len(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct MappingDescriptor {
    name: String,
    members: Vec<Member>,
}

impl MappingDescriptor {
    /// Creates an empty descriptor for the named target shape.
    ///
    /// The name is used in diagnostics only.
    pub fn new(name: impl Into<String>) -> Self {
        MappingDescriptor {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Appends a member; members bind in the order they were added.
    pub fn with_member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    /// The target shape's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The ordered members of this shape.
    pub fn members(&self) -> &[Member] {
        &self.members
    }
}

/// One member of a mapping descriptor.
#[derive(Clone, Debug)]
pub struct Member {
    ident: String,
    name_override: Option<String>,
    shape: Shape,
    default: Option<String>,
}

impl Member {
    /// Creates a member from its source identifier and declared shape.
    ///
    /// The config name is derived from the identifier via the kebab-case
    /// transformation unless overridden with [`Member::with_name`].
    pub fn new(ident: impl Into<String>, shape: Shape) -> Self {
        Member {
            ident: ident.into(),
            name_override: None,
            shape,
            default: None,
        }
    }

    /// Overrides the derived config name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name_override = Some(name.into());
        self
    }

    /// Declares a literal default, used when no source defines the member's
    /// path, as if it came from a lowest-priority source.
    pub fn with_default(mut self, raw: impl Into<String>) -> Self {
        self.default = Some(raw.into());
        self
    }

    /// The member's source identifier.
    pub fn ident(&self) -> &str {
        &self.ident
    }

    /// The member's logical config name: the override if present, otherwise
    /// the kebab-case form of the identifier.
    pub fn config_name(&self) -> String {
        match &self.name_override {
            Some(name) => name.clone(),
            None => Key::kebab(&self.ident),
        }
    }

    /// The member's declared shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// The literal default, if declared.
    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }
}

/// The declared shape of a member.
#[derive(Clone, Debug)]
pub enum Shape {
    /// A single convertible value.
    Scalar(ScalarType),
    /// A nested mapping bound at the member's path.
    Group(MappingDescriptor),
    /// Absence yields an explicit no-value instead of failing.
    Optional(Box<Shape>),
    /// Indexed children `0..`, contiguous, bound in order.
    List(Box<Shape>),
    /// Like a list, but duplicate bound values are dropped and order is not
    /// significant.
    Set(Box<Shape>),
    /// Named children; each child key becomes a map key and its subtree
    /// binds the value shape.
    Map(Box<Shape>),
}

impl Shape {
    /// A scalar of type `T`, converted through the converter registry.
    pub fn scalar<T: Send + Sync + 'static>() -> Shape {
        Shape::Scalar(ScalarType::of::<T>())
    }

    /// A nested group.
    pub fn group(descriptor: MappingDescriptor) -> Shape {
        Shape::Group(descriptor)
    }

    /// An optional wrapper around any shape.
    pub fn optional(inner: Shape) -> Shape {
        Shape::Optional(Box::new(inner))
    }

    /// A list of the given element shape.
    pub fn list(element: Shape) -> Shape {
        Shape::List(Box::new(element))
    }

    /// A set of the given element shape.
    pub fn set(element: Shape) -> Shape {
        Shape::Set(Box::new(element))
    }

    /// A map from child-key segment to the given value shape.
    pub fn map(value: Shape) -> Shape {
        Shape::Map(Box::new(value))
    }
}

/// Runtime identity of a scalar target type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScalarType {
    id: TypeId,
    name: &'static str,
}

impl ScalarType {
    /// The scalar type descriptor for `T`.
    pub fn of<T: Send + Sync + 'static>() -> Self {
        ScalarType {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The `TypeId` of the target type.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The target type's name, for diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_config_name_derived() {
        let member = Member::new("maxRetries", Shape::scalar::<u32>());
        assert_eq!(member.config_name(), "max-retries");
    }

    #[test]
    fn test_member_config_name_snake_case() {
        let member = Member::new("max_retries", Shape::scalar::<u32>());
        assert_eq!(member.config_name(), "max-retries");
    }

    #[test]
    fn test_member_config_name_override() {
        let member = Member::new("maxRetries", Shape::scalar::<u32>()).with_name("retries");
        assert_eq!(member.config_name(), "retries");
    }

    #[test]
    fn test_member_default() {
        let member = Member::new("port", Shape::scalar::<u16>()).with_default("8080");
        assert_eq!(member.default_value(), Some("8080"));
    }

    #[test]
    fn test_scalar_type_identity() {
        assert_eq!(ScalarType::of::<i32>(), ScalarType::of::<i32>());
        assert_ne!(ScalarType::of::<i32>().id(), ScalarType::of::<u32>().id());
    }

    #[test]
    fn test_descriptor_member_order_preserved() {
        let desc = MappingDescriptor::new("T")
            .with_member(Member::new("b", Shape::scalar::<String>()))
            .with_member(Member::new("a", Shape::scalar::<String>()));
        let idents: Vec<_> = desc.members().iter().map(Member::ident).collect();
        assert_eq!(idents, ["b", "a"]);
    }
}

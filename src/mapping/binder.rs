// SPDX-License-Identifier: MIT OR Apache-2.0

//! The binder walks a descriptor against a config node and produces a
//! populated [`BoundNode`] graph.
//!
//! Missing required paths are collected across the whole walk and reported in
//! one aggregate error, so a caller sees every gap at once instead of fixing
//! them one rebuild at a time. Conversion failures abort the walk immediately;
//! a present-but-invalid value is a harder error than an absent one.

use crate::domain::{ConfigError, Result};
use crate::service::Config;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::descriptor::{MappingDescriptor, Member, ScalarType, Shape};

/// A converted leaf value plus the raw string it came from.
#[derive(Clone)]
pub struct BoundScalar {
    raw: String,
    value: Arc<dyn Any + Send + Sync>,
}

impl BoundScalar {
    /// The raw string the value was converted from, after placeholder
    /// expansion.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The converted value, if `T` matches the declared scalar type.
    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }
}

impl fmt::Debug for BoundScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundScalar").field("raw", &self.raw).finish()
    }
}

/// Two scalars are equal when they were converted from the same raw string;
/// the converted payloads are not compared.
impl PartialEq for BoundScalar {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for BoundScalar {}

/// The output of a bind: a tree mirroring the descriptor's shape.
///
/// Equality is structural, with scalars compared by raw string, so two binds
/// of the same descriptor against the same snapshot compare equal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BoundNode {
    /// An optional member with no value.
    Absent,
    /// A converted scalar.
    Scalar(BoundScalar),
    /// A bound group, keyed by member identifier.
    Group(BTreeMap<String, BoundNode>),
    /// A bound list in element order.
    List(Vec<BoundNode>),
    /// A bound map, keyed by child key segment.
    Map(BTreeMap<String, BoundNode>),
}

impl BoundNode {
    /// Looks up a group member by its identifier.
    pub fn member(&self, ident: &str) -> Option<&BoundNode> {
        match self {
            BoundNode::Group(members) => members.get(ident),
            _ => None,
        }
    }

    /// The scalar payload, if this node is a scalar.
    pub fn scalar(&self) -> Option<&BoundScalar> {
        match self {
            BoundNode::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// The list elements, if this node is a list or set.
    pub fn list(&self) -> Option<&[BoundNode]> {
        match self {
            BoundNode::List(items) => Some(items),
            _ => None,
        }
    }

    /// The map entries, if this node is a map.
    pub fn map(&self) -> Option<&BTreeMap<String, BoundNode>> {
        match self {
            BoundNode::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Returns `true` for an absent optional.
    pub fn is_absent(&self) -> bool {
        matches!(self, BoundNode::Absent)
    }

    /// Structural identity used for set deduplication: two bound subtrees
    /// with the same raw content collapse to one element.
    fn fingerprint(&self) -> String {
        match self {
            BoundNode::Absent => "~".to_string(),
            BoundNode::Scalar(s) => format!("={}", s.raw),
            BoundNode::Group(members) => {
                let inner: Vec<String> = members
                    .iter()
                    .map(|(k, v)| format!("{k}:{}", v.fingerprint()))
                    .collect();
                format!("{{{}}}", inner.join(","))
            }
            BoundNode::List(items) => {
                let inner: Vec<String> = items.iter().map(BoundNode::fingerprint).collect();
                format!("[{}]", inner.join(","))
            }
            BoundNode::Map(entries) => {
                let inner: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("{k}:{}", v.fingerprint()))
                    .collect();
                format!("<{}>", inner.join(","))
            }
        }
    }
}

/// Binds a descriptor at a node.
///
/// Required scalars with neither a configured value nor a literal default are
/// collected; if any remain after the walk the bind fails with
/// [`ConfigError::Mapping`] naming each missing fully qualified path.
pub fn bind(descriptor: &MappingDescriptor, node: &Config) -> Result<BoundNode> {
    let mut missing = Vec::new();
    let bound = bind_group(descriptor, node, &mut missing)?;
    if missing.is_empty() {
        Ok(bound)
    } else {
        Err(ConfigError::Mapping { missing })
    }
}

fn bind_group(
    descriptor: &MappingDescriptor,
    node: &Config,
    missing: &mut Vec<String>,
) -> Result<BoundNode> {
    let mut members = BTreeMap::new();
    for member in descriptor.members() {
        let child = node.get(&member.config_name());
        let bound = bind_member(member, &child, missing)?;
        members.insert(member.ident().to_string(), bound);
    }
    Ok(BoundNode::Group(members))
}

fn bind_member(member: &Member, node: &Config, missing: &mut Vec<String>) -> Result<BoundNode> {
    bind_shape(member.shape(), node, member.default_value(), missing)
}

fn bind_shape(
    shape: &Shape,
    node: &Config,
    default: Option<&str>,
    missing: &mut Vec<String>,
) -> Result<BoundNode> {
    match shape {
        Shape::Scalar(scalar) => bind_scalar(scalar, node, default, missing),
        Shape::Group(descriptor) => bind_group(descriptor, node, missing),
        Shape::Optional(inner) => {
            // Optionals absorb absence, never conversion failures.
            let mut inner_missing = Vec::new();
            let bound = bind_shape(inner, node, default, &mut inner_missing)?;
            if inner_missing.is_empty() {
                Ok(bound)
            } else {
                Ok(BoundNode::Absent)
            }
        }
        Shape::List(element) => bind_sequence(element, node, missing, false),
        Shape::Set(element) => bind_sequence(element, node, missing, true),
        Shape::Map(value) => {
            let mut entries = BTreeMap::new();
            for child in node.children() {
                let bound = bind_shape(value, &node.get(&child), None, missing)?;
                entries.insert(child, bound);
            }
            Ok(BoundNode::Map(entries))
        }
    }
}

fn bind_scalar(
    scalar: &ScalarType,
    node: &Config,
    default: Option<&str>,
    missing: &mut Vec<String>,
) -> Result<BoundNode> {
    if node.exists() {
        let raw = node.as_string()?.unwrap_or_default();
        let value = node.convert_dyn_by(scalar.id(), scalar.name())?;
        return Ok(BoundNode::Scalar(BoundScalar {
            raw,
            value: Arc::from(value),
        }));
    }
    if let Some(raw) = default {
        let value = node.convert_raw_dyn_by(scalar.id(), scalar.name(), raw)?;
        return Ok(BoundNode::Scalar(BoundScalar {
            raw: raw.to_string(),
            value: Arc::from(value),
        }));
    }
    missing.push(node.key().as_str().to_string());
    Ok(BoundNode::Absent)
}

/// Binds indexed children `0..`; the sequence must start at index 0 and the
/// first gap terminates it. A sequence with no element 0 is missing.
fn bind_sequence(
    element: &Shape,
    node: &Config,
    missing: &mut Vec<String>,
    dedup: bool,
) -> Result<BoundNode> {
    let children = node.children();
    if !children.iter().any(|c| c == "0") {
        missing.push(node.key().as_str().to_string());
        return Ok(BoundNode::Absent);
    }
    let mut items: Vec<BoundNode> = Vec::new();
    let mut seen = std::collections::BTreeSet::new();
    let mut index = 0usize;
    loop {
        let name = index.to_string();
        if !children.iter().any(|c| *c == name) {
            break;
        }
        let bound = bind_shape(element, &node.get(&name), None, missing)?;
        if !dedup || seen.insert(bound.fingerprint()) {
            items.push(bound);
        }
        index += 1;
    }
    Ok(BoundNode::List(items))
}

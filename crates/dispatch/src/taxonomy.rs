//! The static hierarchy of event types.
//!
//! Event types form a tree stored in an arena and addressed by
//! [`EventTypeId`]. Index 0 is always the synthetic base node `Event`, which
//! carries no criteria. Its direct children are the *event roots*: one per
//! GitHub event name, identified by the `X-GitHub-Event` header. Deeper nodes
//! refine their parent with further criteria, usually on the `action` body
//! field.
//!
//! ```text
//! Event
//! ├── IssueCommentEvent          X-GitHub-Event = issue_comment
//! │   ├── IssueCommentCreatedEvent   action = created
//! │   └── IssueCommentDeletedEvent   action = deleted
//! └── CreateEvent                X-GitHub-Event = create
//!     ├── CreateBranchEvent          ref_type = branch
//!     └── CreateTagEvent             ref_type = tag
//! ```
//!
//! The tree is declared once through [`TaxonomyBuilder`] and frozen into an
//! immutable [`Taxonomy`] by [`TaxonomyBuilder::build`].

use serde_json::Value;
use thiserror::Error;

use crate::{headers::EVENT_HEADER, resolver, EventTypeId, RawHeaders, ResolutionError};

/// Name of the synthetic base node.
pub const BASE_EVENT_NAME: &str = "Event";

// ============================================================================
// Criteria
// ============================================================================

/// Where an identifying criterion reads its value from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CriterionSource {
    /// A request header, matched case-insensitively by name.
    Header(String),
    /// A dot-separated path into the JSON body (e.g. `"action"`, `"check_run.status"`).
    Body(String),
}

/// A single field-path to required-value pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    source: CriterionSource,
    expected: Value,
}

impl Criterion {
    /// Require header `name` to equal `value`.
    pub fn header(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            source: CriterionSource::Header(name.into()),
            expected: Value::String(value.into()),
        }
    }

    /// Require the body value at `path` to equal `expected`.
    pub fn body(path: impl Into<String>, expected: impl Into<Value>) -> Self {
        Self {
            source: CriterionSource::Body(path.into()),
            expected: expected.into(),
        }
    }

    /// Require the body `action` field to equal `action`.
    pub fn action(action: impl Into<String>) -> Self {
        Self::body("action", Value::String(action.into()))
    }

    pub fn source(&self) -> &CriterionSource {
        &self.source
    }

    pub fn expected(&self) -> &Value {
        &self.expected
    }

    /// Returns `true` if the request satisfies this criterion.
    ///
    /// An absent header or body path never matches.
    pub fn matches(&self, headers: &RawHeaders, body: &Value) -> bool {
        match &self.source {
            CriterionSource::Header(name) => match (headers.get(name), self.expected.as_str()) {
                (Some(actual), Some(expected)) => actual.trim() == expected,
                _ => false,
            },
            CriterionSource::Body(path) => {
                resolve_json_path(body, path).is_some_and(|actual| *actual == self.expected)
            }
        }
    }

    fn is_event_header(&self) -> bool {
        matches!(&self.source, CriterionSource::Header(name) if name.eq_ignore_ascii_case(EVENT_HEADER))
    }
}

impl std::fmt::Display for Criterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            CriterionSource::Header(name) => write!(f, "header {name} = {}", self.expected),
            CriterionSource::Body(path) => write!(f, "body {path} = {}", self.expected),
        }
    }
}

/// Traverse a dot-separated JSON path and return a reference to the value.
///
/// Example: `resolve_json_path(&json, "installation.id")` returns `&json["installation"]["id"]`.
pub fn resolve_json_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, key| current.get(key))
}

// ============================================================================
// Nodes
// ============================================================================

/// One declared event type.
#[derive(Debug, Clone)]
pub struct EventTypeDef {
    id: EventTypeId,
    name: String,
    parent: Option<EventTypeId>,
    children: Vec<EventTypeId>,
    criteria: Vec<Criterion>,
    required_fields: Vec<String>,
    depth: usize,
}

impl EventTypeDef {
    pub fn id(&self) -> EventTypeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<EventTypeId> {
        self.parent
    }

    /// Children in declaration order.
    pub fn children(&self) -> &[EventTypeId] {
        &self.children
    }

    /// This node's own criteria, excluding those inherited from ancestors.
    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    /// Body fields this node requires on top of its ancestors' requirements.
    pub fn required_fields(&self) -> &[String] {
        &self.required_fields
    }

    /// Distance from the base node (which has depth 0).
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns `true` if the request satisfies every one of this node's own criteria.
    pub fn matches(&self, headers: &RawHeaders, body: &Value) -> bool {
        self.criteria.iter().all(|c| c.matches(headers, body))
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Programming errors detected while declaring the taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaxonomyError {
    #[error("Event type name must not be empty")]
    EmptyName,

    #[error("Event type '{name}' is already declared")]
    DuplicateName { name: String },

    #[error("Parent {parent} of event type '{name}' is not declared")]
    UnknownParent { name: String, parent: EventTypeId },

    #[error("Event type '{name}' declares no identifying criteria")]
    EmptyCriteria { name: String },

    #[error("Root event type '{name}' must be identified by the X-GitHub-Event header")]
    MissingEventHeader { name: String },

    #[error("Event type '{name}' has the same effective criteria as '{existing}'")]
    DuplicateCriteria { name: String, existing: String },
}

// ============================================================================
// Builder
// ============================================================================

/// Declares event types. Consumed by [`TaxonomyBuilder::build`].
#[derive(Debug, Clone)]
pub struct TaxonomyBuilder {
    nodes: Vec<EventTypeDef>,
}

impl Default for TaxonomyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TaxonomyBuilder {
    /// Creates a builder containing only the base `Event` node.
    pub fn new() -> Self {
        let base = EventTypeDef {
            id: EventTypeId::from_index(0),
            name: BASE_EVENT_NAME.to_string(),
            parent: None,
            children: Vec::new(),
            criteria: Vec::new(),
            required_fields: Vec::new(),
            depth: 0,
        };
        Self { nodes: vec![base] }
    }

    /// The base `Event` node.
    pub fn base(&self) -> EventTypeId {
        EventTypeId::from_index(0)
    }

    /// Declare an event root identified by `X-GitHub-Event: <event>`.
    pub fn declare_root(
        &mut self,
        name: &str,
        event: &str,
        required_fields: &[&str],
    ) -> Result<EventTypeId, TaxonomyError> {
        self.declare(
            self.base(),
            name,
            vec![Criterion::header(EVENT_HEADER, event)],
            required_fields,
        )
    }

    /// Declare a child of an event type distinguished by its `action` field.
    pub fn declare_action(
        &mut self,
        parent: EventTypeId,
        name: &str,
        action: &str,
        required_fields: &[&str],
    ) -> Result<EventTypeId, TaxonomyError> {
        self.declare(parent, name, vec![Criterion::action(action)], required_fields)
    }

    /// Declare an event type under `parent`.
    ///
    /// # Errors
    ///
    /// - [`TaxonomyError::EmptyName`] / [`TaxonomyError::DuplicateName`]
    /// - [`TaxonomyError::UnknownParent`] if `parent` was not declared here
    /// - [`TaxonomyError::EmptyCriteria`] if `criteria` is empty
    /// - [`TaxonomyError::MissingEventHeader`] if a root lacks the event header criterion
    /// - [`TaxonomyError::DuplicateCriteria`] if another node at the same depth
    ///   has an identical effective criteria set
    pub fn declare(
        &mut self,
        parent: EventTypeId,
        name: &str,
        criteria: Vec<Criterion>,
        required_fields: &[&str],
    ) -> Result<EventTypeId, TaxonomyError> {
        if name.is_empty() {
            return Err(TaxonomyError::EmptyName);
        }
        if self.nodes.iter().any(|n| n.name == name) {
            return Err(TaxonomyError::DuplicateName {
                name: name.to_string(),
            });
        }
        let Some(parent_node) = self.nodes.get(parent.index()) else {
            return Err(TaxonomyError::UnknownParent {
                name: name.to_string(),
                parent,
            });
        };
        if criteria.is_empty() {
            return Err(TaxonomyError::EmptyCriteria {
                name: name.to_string(),
            });
        }
        if parent_node.depth == 0 && !criteria.iter().any(Criterion::is_event_header) {
            return Err(TaxonomyError::MissingEventHeader {
                name: name.to_string(),
            });
        }

        let depth = parent_node.depth + 1;
        let mut effective = effective_criteria_of(&self.nodes, parent);
        effective.extend(criteria.iter().cloned());
        if let Some(existing) = self.nodes.iter().find(|n| {
            n.depth == depth && same_criteria(&effective_criteria_of(&self.nodes, n.id), &effective)
        }) {
            return Err(TaxonomyError::DuplicateCriteria {
                name: name.to_string(),
                existing: existing.name.clone(),
            });
        }

        let id = EventTypeId::from_index(self.nodes.len());
        self.nodes.push(EventTypeDef {
            id,
            name: name.to_string(),
            parent: Some(parent),
            children: Vec::new(),
            criteria,
            required_fields: required_fields.iter().map(|f| f.to_string()).collect(),
            depth,
        });
        self.nodes[parent.index()].children.push(id);
        Ok(id)
    }

    /// Freeze the declarations.
    pub fn build(self) -> Taxonomy {
        Taxonomy { nodes: self.nodes }
    }
}

fn effective_criteria_of(nodes: &[EventTypeDef], id: EventTypeId) -> Vec<Criterion> {
    let mut chain = Vec::new();
    let mut current = Some(id);
    while let Some(node_id) = current {
        let node = &nodes[node_id.index()];
        chain.push(node);
        current = node.parent;
    }
    chain
        .into_iter()
        .rev()
        .flat_map(|n| n.criteria.iter().cloned())
        .collect()
}

fn same_criteria(a: &[Criterion], b: &[Criterion]) -> bool {
    a.iter().all(|c| b.contains(c)) && b.iter().all(|c| a.contains(c))
}

// ============================================================================
// Taxonomy
// ============================================================================

/// The frozen event type hierarchy.
///
/// Immutable after [`TaxonomyBuilder::build`]; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    nodes: Vec<EventTypeDef>,
}

impl Taxonomy {
    /// The base `Event` node.
    pub fn base(&self) -> EventTypeId {
        EventTypeId::from_index(0)
    }

    pub fn get(&self, id: EventTypeId) -> Option<&EventTypeDef> {
        self.nodes.get(id.index())
    }

    /// Like [`Taxonomy::get`] for ids known to come from this taxonomy.
    ///
    /// # Panics
    ///
    /// Panics if `id` was produced by a different taxonomy with more nodes.
    pub fn node(&self, id: EventTypeId) -> &EventTypeDef {
        &self.nodes[id.index()]
    }

    pub fn by_name(&self, name: &str) -> Option<EventTypeId> {
        self.nodes.iter().find(|n| n.name == name).map(|n| n.id)
    }

    pub fn contains(&self, id: EventTypeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: the base node is present in every taxonomy.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in declaration order, starting with the base node.
    pub fn iter(&self) -> impl Iterator<Item = &EventTypeDef> {
        self.nodes.iter()
    }

    pub fn children(&self, id: EventTypeId) -> &[EventTypeId] {
        self.node(id).children()
    }

    pub fn parent(&self, id: EventTypeId) -> Option<EventTypeId> {
        self.node(id).parent()
    }

    pub fn is_leaf(&self, id: EventTypeId) -> bool {
        self.node(id).is_leaf()
    }

    pub fn depth(&self, id: EventTypeId) -> usize {
        self.node(id).depth()
    }

    /// Ancestors of `id`, nearest first, ending with the base node.
    pub fn ancestors(&self, id: EventTypeId) -> Vec<EventTypeId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(ancestor) = current {
            out.push(ancestor);
            current = self.parent(ancestor);
        }
        out
    }

    /// Returns `true` if `ancestor` is `id` itself or one of its ancestors.
    pub fn is_same_or_descendant(&self, id: EventTypeId, ancestor: EventTypeId) -> bool {
        id == ancestor || self.ancestors(id).contains(&ancestor)
    }

    /// Every leaf at or below `id`, in declaration order.
    ///
    /// A leaf returns itself.
    pub fn leaf_descendants(&self, id: EventTypeId) -> Vec<EventTypeId> {
        let mut leaves = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = self.node(current);
            if node.is_leaf() {
                leaves.push(current);
            } else {
                // Reverse so the first declared child is visited first.
                stack.extend(node.children.iter().rev().copied());
            }
        }
        leaves
    }

    /// Own criteria plus those of every ancestor, base first.
    pub fn effective_criteria(&self, id: EventTypeId) -> Vec<Criterion> {
        effective_criteria_of(&self.nodes, id)
    }

    /// Required body fields of `id` and all its ancestors, base first, without duplicates.
    pub fn effective_required_fields(&self, id: EventTypeId) -> Vec<String> {
        let mut chain: Vec<EventTypeId> = self.ancestors(id);
        chain.reverse();
        chain.push(id);

        let mut fields: Vec<String> = Vec::new();
        for node in chain {
            for field in &self.node(node).required_fields {
                if !fields.contains(field) {
                    fields.push(field.clone());
                }
            }
        }
        fields
    }

    /// Resolve a delivery to its most specific event type.
    ///
    /// See [`resolver::resolve`].
    pub fn resolve(
        &self,
        headers: &RawHeaders,
        body: &Value,
    ) -> Result<EventTypeId, ResolutionError> {
        resolver::resolve(self, headers, body)
    }
}

#[cfg(test)]
#[path = "taxonomy_tests.rs"]
mod tests;

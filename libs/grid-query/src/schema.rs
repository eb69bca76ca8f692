//! Field registry for a grid-queried entity.
//!
//! A [`GridSchema`] maps the grid's column ids onto entity columns, carries
//! the substring-search allow-list, and knows how to resolve dotted field
//! names (`"district.name"`) through to-one relation joins: every path
//! segment but the last is a join edge, the last is the leaf attribute
//! compared on the joined table.

use std::collections::HashMap;

use sea_orm::{EntityTrait, RelationDef};
use tracing::warn;

/// One join an emitted predicate depends on.
#[derive(Clone, Debug)]
pub struct JoinStep {
    /// Name of the joined table, used to deduplicate join application and to
    /// qualify leaf columns.
    pub table: &'static str,
    rel: Option<fn() -> RelationDef>,
}

impl JoinStep {
    /// The relation to join, or `None` when the base select is known to
    /// already contain the table.
    #[must_use]
    pub fn relation(&self) -> Option<RelationDef> {
        self.rel.map(|f| f())
    }
}

/// The column a resolved field compares against.
#[derive(Clone)]
pub enum ColumnTarget<E: EntityTrait> {
    /// An attribute of the queried entity itself.
    Base(E::Column),
    /// An attribute reached through joins; compared as `"table"."column"`.
    /// The leaf path segment doubles as the column name, mirroring how the
    /// grid's dotted ids name attributes.
    Joined { table: &'static str, column: String },
}

/// A leaf attribute resolved through zero or more to-one joins.
#[derive(Clone)]
pub struct ResolvedColumn<E: EntityTrait> {
    pub joins: Vec<JoinStep>,
    pub target: ColumnTarget<E>,
}

#[derive(Default)]
struct JoinNode {
    edges: HashMap<String, JoinEdge>,
}

struct JoinEdge {
    step: JoinStep,
    node: JoinNode,
}

/// Grid field registry for entity `E`.
pub struct GridSchema<E: EntityTrait> {
    columns: HashMap<String, E::Column>,
    joins: JoinNode,
    search_fields: Vec<String>,
    numeric_field: Option<String>,
    timestamp_fields: Vec<String>,
}

impl<E: EntityTrait> Default for GridSchema<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EntityTrait> GridSchema<E>
where
    E::Column: Copy,
{
    #[must_use]
    pub fn new() -> Self {
        Self {
            columns: HashMap::new(),
            joins: JoinNode::default(),
            search_fields: Vec::new(),
            numeric_field: None,
            timestamp_fields: Vec::new(),
        }
    }

    /// Register a base attribute under its grid column id.
    #[must_use]
    pub fn column(mut self, api_name: impl Into<String>, col: E::Column) -> Self {
        self.columns.insert(api_name.into(), col);
        self
    }

    /// Register a to-one join edge under a (possibly dotted) path. Parent
    /// segments must already be registered.
    #[must_use]
    pub fn relation(self, path: &str, rel: fn() -> RelationDef, table: &'static str) -> Self {
        self.insert_edge(
            path,
            JoinStep {
                table,
                rel: Some(rel),
            },
        )
    }

    /// Like [`Self::relation`], for a table the base select joins itself;
    /// no extra JOIN is emitted for predicates that traverse this edge.
    #[must_use]
    pub fn provided_relation(self, path: &str, table: &'static str) -> Self {
        self.insert_edge(path, JoinStep { table, rel: None })
    }

    /// Put a field on the substring-search allow-list. Searchable fields get
    /// case-insensitive `LIKE` matching and take part in the global term.
    #[must_use]
    pub fn searchable(mut self, field: impl Into<String>) -> Self {
        self.search_fields.push(field.into());
        self
    }

    /// Field the global term compares against when it parses as an integer.
    #[must_use]
    pub fn global_numeric(mut self, field: impl Into<String>) -> Self {
        self.numeric_field = Some(field.into());
        self
    }

    /// Add a timestamp field the global term date-matches against.
    #[must_use]
    pub fn global_timestamp(mut self, field: impl Into<String>) -> Self {
        self.timestamp_fields.push(field.into());
        self
    }

    fn insert_edge(mut self, path: &str, step: JoinStep) -> Self {
        let segments: Vec<&str> = path.split('.').collect();
        let Some((leaf, parents)) = segments.split_last() else {
            return self;
        };
        let mut node = &mut self.joins;
        for seg in parents {
            match node.edges.get_mut(*seg) {
                Some(edge) => node = &mut edge.node,
                None => {
                    warn!(path, segment = *seg, "relation parent not registered, ignoring");
                    return self;
                }
            }
        }
        node.edges.insert(
            (*leaf).to_owned(),
            JoinEdge {
                step,
                node: JoinNode::default(),
            },
        );
        self
    }

    #[must_use]
    pub fn base_column(&self, field: &str) -> Option<E::Column> {
        self.columns.get(field).copied()
    }

    #[must_use]
    pub fn is_searchable(&self, field: &str) -> bool {
        self.search_fields.iter().any(|f| f == field)
    }

    #[must_use]
    pub fn search_fields(&self) -> &[String] {
        &self.search_fields
    }

    #[must_use]
    pub fn numeric_field(&self) -> Option<&str> {
        self.numeric_field.as_deref()
    }

    #[must_use]
    pub fn timestamp_fields(&self) -> &[String] {
        &self.timestamp_fields
    }

    /// Resolve a grid field to the column it compares against, collecting the
    /// joins a dotted path traverses.
    #[must_use]
    pub fn resolve(&self, field: &str) -> Option<ResolvedColumn<E>> {
        if let Some(col) = self.base_column(field) {
            return Some(ResolvedColumn {
                joins: Vec::new(),
                target: ColumnTarget::Base(col),
            });
        }
        let segments: Vec<&str> = field.split('.').collect();
        let mut joins = Vec::new();
        let target = Self::walk(&self.joins, &segments, &mut joins)?;
        Some(ResolvedColumn { joins, target })
    }

    fn walk(
        node: &JoinNode,
        segments: &[&str],
        joins: &mut Vec<JoinStep>,
    ) -> Option<ColumnTarget<E>> {
        match segments {
            [] | [_] => None,
            [head, leaf] => {
                let edge = node.edges.get(*head)?;
                joins.push(edge.step.clone());
                Some(ColumnTarget::Joined {
                    table: edge.step.table,
                    column: (*leaf).to_owned(),
                })
            }
            [head, rest @ ..] => {
                let edge = node.edges.get(*head)?;
                joins.push(edge.step.clone());
                Self::walk(&edge.node, rest, joins)
            }
        }
    }
}

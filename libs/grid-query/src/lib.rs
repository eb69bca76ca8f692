//! Grid table query translation (grid descriptors in, `SeaORM` queries out).
//!
//! Server-side paginated UI grids send three things next to their paging
//! offsets: a JSON sort descriptor, a JSON per-column filter descriptor and a
//! free-text global search term. This crate decodes the descriptors and
//! compiles them into a [`sea_orm::Condition`] plus the joins it depends on,
//! driven by a [`GridSchema`] describing the queried entity.
//!
//! Descriptor decoding degrades softly: malformed JSON never fails the
//! request, it is logged and treated as "unsorted" / "no usable predicate".
//! Unknown field names surface as [`GridError`] when the predicate is built.

pub mod classify;
pub mod condition;
pub mod schema;

pub use condition::{GridCondition, GridError, GridSelectExt, build_condition, translate};
pub use schema::{ColumnTarget, GridSchema, JoinStep, ResolvedColumn};

use serde::Deserialize;
use tracing::warn;

/// Sort direction for a single grid column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

/// Single-column sort order.
///
/// Grids send a list of sort rules; only the first is honored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub dir: SortDir,
}

/// One `{id, value}` pair from the grid's column filter descriptor.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ColumnFilter {
    #[serde(rename = "id")]
    pub field: String,
    pub value: String,
}

/// A page of rows plus the table's total row count.
///
/// `total_count` is the unfiltered table count: the service issues a plain
/// count next to the filtered fetch and reports that, filters notwithstanding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageData<T> {
    pub items: Vec<T>,
    pub total_count: u64,
}

#[derive(Debug, Deserialize)]
struct RawSortRule {
    id: String,
    desc: bool,
}

/// Decode the grid's JSON sort descriptor, `[{"id": "...", "desc": bool}]`.
///
/// Only the first rule is used, any others are silently ignored; an empty
/// list means unsorted. Malformed JSON degrades to unsorted with a warning
/// instead of failing the request.
pub fn parse_sort(raw: &str) -> Option<SortKey> {
    let rules: Vec<RawSortRule> = match serde_json::from_str(raw) {
        Ok(rules) => rules,
        Err(e) => {
            warn!(error = %e, "malformed sort descriptor, falling back to unsorted");
            return None;
        }
    };
    let first = rules.into_iter().next()?;
    Some(SortKey {
        field: first.id,
        dir: if first.desc {
            SortDir::Desc
        } else {
            SortDir::Asc
        },
    })
}

/// Decode the grid's JSON filter descriptor, `[{"id": "...", "value": "..."}]`.
///
/// Malformed JSON degrades to `None` with a warning; callers treat that as
/// "no usable predicate" and run the query unconstrained. The global search
/// term is dropped with it, since translation never runs.
pub fn parse_column_filters(raw: &str) -> Option<Vec<ColumnFilter>> {
    match serde_json::from_str(raw) {
        Ok(filters) => Some(filters),
        Err(e) => {
            warn!(error = %e, "malformed filter descriptor, dropping all filters");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_takes_first_rule_only() {
        let key = parse_sort(r#"[{"id":"name","desc":true},{"id":"id","desc":false}]"#).unwrap();
        assert_eq!(key.field, "name");
        assert_eq!(key.dir, SortDir::Desc);
    }

    #[test]
    fn sort_ascending_when_desc_false() {
        let key = parse_sort(r#"[{"id":"createdOn","desc":false}]"#).unwrap();
        assert_eq!(key.field, "createdOn");
        assert_eq!(key.dir, SortDir::Asc);
    }

    #[test]
    fn sort_empty_list_is_unsorted() {
        assert_eq!(parse_sort("[]"), None);
    }

    #[test]
    fn sort_malformed_json_is_unsorted() {
        assert_eq!(parse_sort("not json"), None);
        assert_eq!(parse_sort(r#"[{"id":"name"}]"#), None);
    }

    #[test]
    fn filters_decode_field_value_pairs() {
        let filters = parse_column_filters(r#"[{"id":"name","value":"central"}]"#).unwrap();
        assert_eq!(
            filters,
            vec![ColumnFilter {
                field: "name".to_owned(),
                value: "central".to_owned(),
            }]
        );
    }

    #[test]
    fn filters_malformed_json_drops_everything() {
        assert_eq!(parse_column_filters("not json"), None);
        assert_eq!(parse_column_filters(r#"{"id":"name"}"#), None);
    }

    #[test]
    fn filters_empty_list_is_usable() {
        assert_eq!(parse_column_filters("[]"), Some(Vec::new()));
    }
}

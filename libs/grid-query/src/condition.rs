//! Grid filter descriptors → `sea_orm::Condition` compiler.
//!
//! Column filters are AND-combined; the global search term contributes one
//! OR-group AND-ed with the rest. Each filter value is classified (integer,
//! instant, text) and the matching predicate shape is emitted:
//!
//! - integer → `field = n`
//! - instant → `DATE(field) = local-date` (date-truncating equality)
//! - text on an allow-listed field → `UPPER(field) LIKE '%VALUE%'`, dotted
//!   paths resolved through joins
//! - text elsewhere → literal equality against the raw value
//!
//! Field names are looked up in the [`GridSchema`]; unknown names fail the
//! build, which callers propagate like any other storage error.

use chrono::{DateTime, Local, NaiveDate, Utc};
use sea_orm::sea_query::{Alias, Expr, Func, Order, SimpleExpr};
use sea_orm::{Condition, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect, Select};
use thiserror::Error;

use crate::classify::{Classified, as_instant, as_int, classify};
use crate::schema::{ColumnTarget, GridSchema, JoinStep};
use crate::{ColumnFilter, SortDir, SortKey, parse_column_filters};

#[derive(Debug, Error, Clone)]
pub enum GridError {
    #[error("unknown grid field: {0}")]
    UnknownField(String),
}

pub type GridResult<T> = Result<T, GridError>;

/// A compiled filter: the condition plus the joins its predicates traverse.
///
/// Joins are collected per predicate, in emission order; application
/// deduplicates them by table, since SQL cannot join the same unaliased
/// table twice.
#[derive(Debug)]
pub struct GridCondition {
    pub condition: Condition,
    pub joins: Vec<JoinStep>,
}

/* ---------- LIKE helpers ---------- */

fn like_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '%' | '_' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            c => out.push(c),
        }
    }
    out
}

fn like_contains(s: &str) -> String {
    format!("%{}%", like_escape(s))
}

/* ---------- column expressions ---------- */

fn target_expr<E: EntityTrait>(target: &ColumnTarget<E>) -> Expr
where
    E::Column: Copy,
{
    match target {
        ColumnTarget::Base(col) => Expr::col((E::default(), *col)),
        ColumnTarget::Joined { table, column } => {
            Expr::col((Alias::new(*table), Alias::new(column.as_str())))
        }
    }
}

fn date_eq(col: Expr, date: NaiveDate) -> SimpleExpr {
    Expr::expr(Func::cust(Alias::new("DATE")).arg(col)).eq(date)
}

fn contains_upper<E: EntityTrait>(target: &ColumnTarget<E>, upper_value: &str) -> SimpleExpr
where
    E::Column: Copy,
{
    Expr::expr(Func::upper(target_expr::<E>(target))).like(like_contains(upper_value))
}

fn local_date(ts: DateTime<Utc>) -> NaiveDate {
    ts.with_timezone(&Local).date_naive()
}

/* ---------- predicate translation ---------- */

fn base_column<E: EntityTrait>(schema: &GridSchema<E>, field: &str) -> GridResult<E::Column>
where
    E::Column: Copy,
{
    schema
        .base_column(field)
        .ok_or_else(|| GridError::UnknownField(field.to_owned()))
}

fn column_predicate<E: EntityTrait>(
    filter: &ColumnFilter,
    schema: &GridSchema<E>,
    joins: &mut Vec<JoinStep>,
) -> GridResult<SimpleExpr>
where
    E::Column: Copy,
{
    match classify(&filter.value) {
        Classified::Int(n) => {
            let col = base_column(schema, &filter.field)?;
            Ok(Expr::col((E::default(), col)).eq(n))
        }
        Classified::Instant(ts) => {
            let col = base_column(schema, &filter.field)?;
            Ok(date_eq(Expr::col((E::default(), col)), local_date(ts)))
        }
        Classified::Text(text) => {
            if schema.is_searchable(&filter.field) {
                let resolved = schema
                    .resolve(&filter.field)
                    .ok_or_else(|| GridError::UnknownField(filter.field.clone()))?;
                joins.extend(resolved.joins);
                Ok(contains_upper::<E>(&resolved.target, &text.to_uppercase()))
            } else {
                // Off the allow-list: verbatim, case-sensitive equality,
                // no substring matching.
                let col = base_column(schema, &filter.field)?;
                Ok(Expr::col((E::default(), col)).eq(text))
            }
        }
    }
}

fn global_group<E: EntityTrait>(
    term: &str,
    schema: &GridSchema<E>,
    joins: &mut Vec<JoinStep>,
) -> GridResult<Condition>
where
    E::Column: Copy,
{
    let mut group = Condition::any();
    let upper = term.to_uppercase();

    for field in schema.search_fields() {
        let resolved = schema
            .resolve(field)
            .ok_or_else(|| GridError::UnknownField(field.clone()))?;
        joins.extend(resolved.joins);
        group = group.add(contains_upper::<E>(&resolved.target, &upper));
    }

    if let Some(n) = as_int(term) {
        if let Some(field) = schema.numeric_field() {
            let col = base_column(schema, field)?;
            group = group.add(Expr::col((E::default(), col)).eq(n));
        }
    }

    if let Some(ts) = as_instant(term) {
        let date = local_date(ts);
        for field in schema.timestamp_fields() {
            let col = base_column(schema, field)?;
            group = group.add(date_eq(Expr::col((E::default(), col)), date));
        }
    }

    Ok(group)
}

/// Compile decoded column filters plus the optional global term.
///
/// # Errors
/// Returns [`GridError::UnknownField`] when a filter names a field the schema
/// does not know.
pub fn build_condition<E: EntityTrait>(
    filters: &[ColumnFilter],
    global: Option<&str>,
    schema: &GridSchema<E>,
) -> GridResult<GridCondition>
where
    E::Column: Copy,
{
    let mut joins = Vec::new();
    let mut all = Condition::all();

    for filter in filters {
        all = all.add(column_predicate(filter, schema, &mut joins)?);
    }

    if let Some(term) = global.filter(|t| !t.is_empty()) {
        all = all.add(global_group(term, schema, &mut joins)?);
    }

    Ok(GridCondition {
        condition: all,
        joins,
    })
}

/// Decode the filter descriptor and compile it in one step.
///
/// Malformed descriptor JSON yields `Ok(None)`: no usable predicate, the
/// caller runs the query unconstrained (the global term is dropped with it).
///
/// # Errors
/// Returns [`GridError::UnknownField`] for unknown field names in a
/// well-formed descriptor.
pub fn translate<E: EntityTrait>(
    filters_json: &str,
    global: Option<&str>,
    schema: &GridSchema<E>,
) -> GridResult<Option<GridCondition>>
where
    E::Column: Copy,
{
    let Some(filters) = parse_column_filters(filters_json) else {
        return Ok(None);
    };
    build_condition(&filters, global, schema).map(Some)
}

/* ---------- Select extensions ---------- */

/// Apply a compiled grid query to a `SeaORM` select.
pub trait GridSelectExt<E: EntityTrait>: Sized {
    /// Add the joins the condition and the sort key depend on (deduplicated
    /// by table), then the condition, then the single-key `ORDER BY`.
    ///
    /// Sort fields resolve through the schema the same way filter predicates
    /// do, so dotted names order by the joined column. `grid: None` (no
    /// usable predicate) still honors the sort; `sort: None` leaves the
    /// select unsorted.
    ///
    /// # Errors
    /// Returns [`GridError::UnknownField`] when the sort key names a field
    /// the schema does not know.
    fn apply_grid(
        self,
        grid: Option<GridCondition>,
        sort: Option<&SortKey>,
        schema: &GridSchema<E>,
    ) -> GridResult<Self>;
}

impl<E> GridSelectExt<E> for Select<E>
where
    E: EntityTrait,
    E::Column: Copy,
{
    fn apply_grid(
        self,
        grid: Option<GridCondition>,
        sort: Option<&SortKey>,
        schema: &GridSchema<E>,
    ) -> GridResult<Self> {
        let (mut joins, condition) = match grid {
            Some(grid) => (grid.joins, Some(grid.condition)),
            None => (Vec::new(), None),
        };

        let order = match sort {
            Some(key) => {
                let resolved = schema
                    .resolve(&key.field)
                    .ok_or_else(|| GridError::UnknownField(key.field.clone()))?;
                joins.extend(resolved.joins);
                let dir = match key.dir {
                    SortDir::Asc => Order::Asc,
                    SortDir::Desc => Order::Desc,
                };
                Some((target_expr::<E>(&resolved.target), dir))
            }
            None => None,
        };

        let mut select = self;
        let mut joined: Vec<&'static str> = Vec::new();
        for step in joins {
            if joined.contains(&step.table) {
                continue;
            }
            joined.push(step.table);
            if let Some(rel) = step.relation() {
                select = select.join(JoinType::InnerJoin, rel);
            }
        }
        if let Some(condition) = condition {
            select = select.filter(condition);
        }
        if let Some((expr, dir)) = order {
            select = select.order_by(SimpleExpr::from(expr), dir);
        }
        Ok(select)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_sort;
    use sea_orm::{DbBackend, EntityTrait, QueryTrait, RelationTrait};

    mod ticket {
        use sea_orm::entity::prelude::*;

        #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
        #[sea_orm(table_name = "ticket")]
        pub struct Model {
            #[sea_orm(primary_key)]
            pub id: i32,
            pub subject: String,
            pub customer_id: i32,
            pub opened_on: String,
            pub updated_on: String,
        }

        #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
        pub enum Relation {
            #[sea_orm(
                belongs_to = "super::customer::Entity",
                from = "Column::CustomerId",
                to = "super::customer::Column::Id"
            )]
            Customer,
        }

        impl ActiveModelBehavior for ActiveModel {}
    }

    mod customer {
        use sea_orm::entity::prelude::*;

        #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
        #[sea_orm(table_name = "customer")]
        pub struct Model {
            #[sea_orm(primary_key)]
            pub id: i32,
            pub name: String,
        }

        #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
        pub enum Relation {}

        impl ActiveModelBehavior for ActiveModel {}
    }

    fn schema() -> GridSchema<ticket::Entity> {
        GridSchema::new()
            .column("id", ticket::Column::Id)
            .column("subject", ticket::Column::Subject)
            .column("openedOn", ticket::Column::OpenedOn)
            .column("updatedOn", ticket::Column::UpdatedOn)
            .relation(
                "customer",
                || ticket::Relation::Customer.def(),
                "customer",
            )
            .searchable("subject")
            .searchable("customer.name")
            .global_numeric("id")
            .global_timestamp("openedOn")
            .global_timestamp("updatedOn")
    }

    fn sql_for(filters_json: &str, global: Option<&str>, sort_json: &str) -> String {
        let schema = schema();
        let grid = translate(filters_json, global, &schema).unwrap();
        ticket::Entity::find()
            .apply_grid(grid, parse_sort(sort_json).as_ref(), &schema)
            .unwrap()
            .build(DbBackend::Sqlite)
            .to_string()
    }

    #[test]
    fn numeric_filter_is_an_equality() {
        let sql = sql_for(r#"[{"id":"id","value":"5"}]"#, None, "[]");
        assert!(sql.contains(r#""ticket"."id" = 5"#), "{sql}");
    }

    #[test]
    fn text_filter_on_searchable_field_is_upper_like() {
        let sql = sql_for(r#"[{"id":"subject","value":"central"}]"#, None, "[]");
        assert!(
            sql.contains(r#"UPPER("ticket"."subject") LIKE '%CENTRAL%'"#),
            "{sql}"
        );
    }

    #[test]
    fn text_filter_off_the_allow_list_is_raw_equality() {
        let schema = schema().column("code", ticket::Column::Subject);
        let grid = translate(r#"[{"id":"code","value":"Central"}]"#, None, &schema).unwrap();
        let sql = ticket::Entity::find()
            .apply_grid(grid, None, &schema)
            .unwrap()
            .build(DbBackend::Sqlite)
            .to_string();
        // raw value, not uppercased, no LIKE
        assert!(sql.contains(r#""ticket"."subject" = 'Central'"#), "{sql}");
    }

    #[test]
    fn instant_filter_truncates_to_local_date() {
        let expected = as_instant("2023-05-01T12:00:00Z")
            .map(local_date)
            .unwrap()
            .to_string();
        let sql = sql_for(r#"[{"id":"openedOn","value":"2023-05-01T12:00:00Z"}]"#, None, "[]");
        assert!(sql.contains("DATE("), "{sql}");
        assert!(sql.contains(&format!("'{expected}'")), "{sql}");
    }

    #[test]
    fn dotted_path_joins_the_relation() {
        let sql = sql_for(r#"[{"id":"customer.name","value":"acme"}]"#, None, "[]");
        assert!(sql.contains(r#"INNER JOIN "customer""#), "{sql}");
        assert!(
            sql.contains(r#"UPPER("customer"."name") LIKE '%ACME%'"#),
            "{sql}"
        );
    }

    #[test]
    fn column_filters_are_and_combined() {
        let sql = sql_for(
            r#"[{"id":"id","value":"5"},{"id":"subject","value":"central"}]"#,
            None,
            "[]",
        );
        assert!(
            sql.contains(r#""ticket"."id" = 5 AND UPPER("ticket"."subject") LIKE '%CENTRAL%'"#),
            "{sql}"
        );
    }

    #[test]
    fn global_text_term_is_an_or_group_over_search_fields() {
        let sql = sql_for("[]", Some("central"), "[]");
        assert!(
            sql.contains(
                r#"UPPER("ticket"."subject") LIKE '%CENTRAL%' OR UPPER("customer"."name") LIKE '%CENTRAL%'"#
            ),
            "{sql}"
        );
        assert!(sql.contains(r#"INNER JOIN "customer""#), "{sql}");
    }

    #[test]
    fn global_numeric_term_also_probes_the_id() {
        let sql = sql_for("[]", Some("7"), "[]");
        assert!(sql.contains(r#"OR "ticket"."id" = 7"#), "{sql}");
    }

    #[test]
    fn global_instant_term_probes_both_timestamps() {
        let sql = sql_for("[]", Some("2023-05-01T00:00:00Z"), "[]");
        let dates = sql.matches("DATE(").count();
        assert_eq!(dates, 2, "{sql}");
    }

    #[test]
    fn global_term_is_anded_with_column_filters() {
        let sql = sql_for(r#"[{"id":"id","value":"5"}]"#, Some("central"), "[]");
        assert!(sql.contains(r#""ticket"."id" = 5 AND ("#), "{sql}");
    }

    #[test]
    fn empty_global_term_adds_nothing() {
        let sql = sql_for("[]", Some(""), "[]");
        assert!(!sql.contains("LIKE"), "{sql}");
    }

    #[test]
    fn malformed_filter_json_translates_to_none() {
        let schema = schema();
        assert!(translate("not json", Some("central"), &schema).unwrap().is_none());
    }

    #[test]
    fn unknown_field_is_an_error() {
        let schema = schema();
        let err = translate(r#"[{"id":"bogus","value":"5"}]"#, None, &schema).unwrap_err();
        assert!(matches!(err, GridError::UnknownField(f) if f == "bogus"));
    }

    #[test]
    fn sort_descending_orders_by_field() {
        let sql = sql_for("[]", None, r#"[{"id":"subject","desc":true}]"#);
        assert!(sql.contains(r#"ORDER BY "ticket"."subject" DESC"#), "{sql}");
    }

    #[test]
    fn invalid_sort_json_leaves_select_unsorted() {
        let sql = sql_for("[]", None, "not json");
        assert!(!sql.contains("ORDER BY"), "{sql}");
    }

    #[test]
    fn sort_by_dotted_field_orders_by_the_joined_column() {
        let sql = sql_for("[]", None, r#"[{"id":"customer.name","desc":true}]"#);
        assert!(sql.contains(r#"INNER JOIN "customer""#), "{sql}");
        assert!(sql.contains(r#"ORDER BY "customer"."name" DESC"#), "{sql}");
    }

    #[test]
    fn sort_join_is_shared_with_filter_joins() {
        let sql = sql_for(
            r#"[{"id":"customer.name","value":"acme"}]"#,
            None,
            r#"[{"id":"customer.name","desc":false}]"#,
        );
        assert_eq!(sql.matches(r#"JOIN "customer""#).count(), 1, "{sql}");
        assert!(sql.contains(r#"ORDER BY "customer"."name" ASC"#), "{sql}");
    }

    #[test]
    fn sort_survives_a_malformed_filter_descriptor() {
        let sql = sql_for("not json", None, r#"[{"id":"subject","desc":false}]"#);
        assert!(!sql.contains("WHERE"), "{sql}");
        assert!(sql.contains(r#"ORDER BY "ticket"."subject" ASC"#), "{sql}");
    }

    #[test]
    fn unknown_sort_field_is_an_error() {
        let schema = schema();
        let err = ticket::Entity::find()
            .apply_grid(None, parse_sort(r#"[{"id":"bogus","desc":false}]"#).as_ref(), &schema)
            .unwrap_err();
        assert!(matches!(err, GridError::UnknownField(f) if f == "bogus"));
    }

    #[test]
    fn like_values_are_escaped() {
        let sql = sql_for(r#"[{"id":"subject","value":"50%_off"}]"#, None, "[]");
        assert!(sql.contains(r"%50\%\_OFF%"), "{sql}");
    }

    #[test]
    fn duplicate_join_targets_are_applied_once() {
        let sql = sql_for(
            r#"[{"id":"customer.name","value":"acme"}]"#,
            Some("acme"),
            "[]",
        );
        assert_eq!(sql.matches(r#"JOIN "customer""#).count(), 1, "{sql}");
    }
}

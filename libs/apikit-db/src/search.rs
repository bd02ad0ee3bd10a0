//! [`SearchExpr`] / [`ListQuery`] → `sea_orm` conditions and selects.
//!
//! Patterns arrive already escaped by the search compiler, so every `LIKE` carries
//! `ESCAPE '\'`.

use std::collections::HashMap;

use resource_core::{ListQuery, SearchExpr, SortDir};
use sea_orm::{
    sea_query::{Expr, LikeExpr, Order},
    ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use thiserror::Error;

/// Whitelist of API field names → entity columns. Lookups ignore case.
#[derive(Clone)]
pub struct FieldMap<E: EntityTrait> {
    map: HashMap<String, E::Column>,
}

impl<E: EntityTrait> Default for FieldMap<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EntityTrait> FieldMap<E> {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn insert(mut self, api_name: impl Into<String>, col: E::Column) -> Self {
        self.map.insert(api_name.into().to_lowercase(), col);
        self
    }

    pub fn get(&self, name: &str) -> Option<&E::Column> {
        self.map.get(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SearchBuildError {
    #[error("unknown search field: {0}")]
    UnknownField(String),

    #[error("unknown sort field: {0}")]
    UnknownSortField(String),
}

pub type SearchBuildResult<T> = Result<T, SearchBuildError>;

/// Lower a search tree; `Ok(None)` when the tree has no leaves (blank term).
pub fn search_to_condition<E>(
    expr: &SearchExpr,
    fields: &FieldMap<E>,
) -> SearchBuildResult<Option<Condition>>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    if expr.is_empty() {
        return Ok(None);
    }
    lower(expr, fields).map(Some)
}

fn lower<E>(expr: &SearchExpr, fields: &FieldMap<E>) -> SearchBuildResult<Condition>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    Ok(match expr {
        SearchExpr::Or(children) => {
            let mut any = Condition::any();
            for child in children.iter().filter(|c| !c.is_empty()) {
                any = any.add(lower(child, fields)?);
            }
            any
        }
        SearchExpr::Like { field, pattern } => {
            let col = *fields
                .get(field)
                .ok_or_else(|| SearchBuildError::UnknownField(field.clone()))?;
            Condition::all().add(Expr::col(col).like(LikeExpr::new(pattern.as_str()).escape('\\')))
        }
    })
}

/// List query application on a plain `Select<E>`.
pub trait ListQueryExt<E: EntityTrait>: Sized {
    fn apply_search(self, expr: &SearchExpr, fields: &FieldMap<E>) -> SearchBuildResult<Self>;

    /// Search filter, then `orderBy`/`order`, then offset and clamped limit.
    fn apply_list_query(
        self,
        query: &ListQuery,
        search: Option<&SearchExpr>,
        fields: &FieldMap<E>,
    ) -> SearchBuildResult<Self>;
}

impl<E> ListQueryExt<E> for sea_orm::Select<E>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    fn apply_search(self, expr: &SearchExpr, fields: &FieldMap<E>) -> SearchBuildResult<Self> {
        Ok(match search_to_condition(expr, fields)? {
            Some(cond) => self.filter(cond),
            None => self,
        })
    }

    fn apply_list_query(
        self,
        query: &ListQuery,
        search: Option<&SearchExpr>,
        fields: &FieldMap<E>,
    ) -> SearchBuildResult<Self> {
        let mut select = match search {
            Some(expr) => self.apply_search(expr, fields)?,
            None => self,
        };

        if let Some(key) = query.sort() {
            let col = *fields
                .get(&key.field)
                .ok_or_else(|| SearchBuildError::UnknownSortField(key.field.clone()))?;
            let order = match key.dir {
                SortDir::Asc => Order::Asc,
                SortDir::Desc => Order::Desc,
            };
            select = select.order_by(col, order);
        }

        let (offset, limit) = (query.effective_offset(), query.effective_limit());
        tracing::trace!(offset, limit, "applying list window");
        Ok(select.offset(offset).limit(limit))
    }
}

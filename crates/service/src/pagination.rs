//! Listing helpers shared by every resource: query-string validation,
//! case-insensitive search and page fetching.

use sea_orm::{
    sea_query::{Expr, Func, LikeExpr},
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, Order, PaginatorTrait, Select,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{FieldIssue, ServiceError};

pub const MAX_LIMIT: u64 = 100;
/// Largest page whose offset `(page - 1) * MAX_LIMIT` still fits a Postgres bigint.
pub const MAX_PAGE: u64 = i64::MAX as u64 / MAX_LIMIT;
const MAX_SEARCH_LEN: usize = 100;

/// Raw listing parameters as they arrive in the query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub search: Option<String>,
    pub is_active: Option<String>,
}

/// Validated listing parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    /// 1-based page index
    pub page: u64,
    pub limit: u64,
    pub sort_by: Option<String>,
    pub descending: bool,
    pub search: Option<String>,
    pub is_active: Option<bool>,
}

impl ListParams {
    pub fn order(&self) -> Order {
        if self.descending { Order::Desc } else { Order::Asc }
    }
}

impl ListQuery {
    pub fn validate(&self, default_limit: u64) -> Result<ListParams, ServiceError> {
        let mut issues = Vec::new();
        let params = self.collect(default_limit, &mut issues);
        if issues.is_empty() { Ok(params) } else { Err(ServiceError::Validation(issues)) }
    }

    /// Same as [`ListQuery::validate`] but appends problems to `issues`, so
    /// callers can report resource filters in the same response.
    pub fn collect(&self, default_limit: u64, issues: &mut Vec<FieldIssue>) -> ListParams {
        let page = parse_bounded("page", self.page.as_deref(), 1, MAX_PAGE, 1, issues);
        let limit = parse_bounded("limit", self.limit.as_deref(), 1, MAX_LIMIT, default_limit, issues);
        let search = match self.search.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(s) if s.chars().count() > MAX_SEARCH_LEN => {
                issues.push(FieldIssue::new("search", "Search term must be between 1 and 100 characters"));
                None
            }
            Some(s) => Some(s.to_string()),
        };
        let descending = self
            .sort_order
            .as_deref()
            .map(|s| s.trim().eq_ignore_ascii_case("desc"))
            .unwrap_or(false);
        ListParams {
            page,
            limit,
            sort_by: self.sort_by.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(String::from),
            descending,
            search,
            is_active: parse_bool("isActive", self.is_active.as_deref(), issues),
        }
    }
}

fn parse_bounded(field: &str, raw: Option<&str>, min: u64, max: u64, default: u64, issues: &mut Vec<FieldIssue>) -> u64 {
    let Some(raw) = raw.map(str::trim) else { return default };
    match raw.parse::<u64>() {
        Ok(v) if (min..=max).contains(&v) => v,
        _ => {
            issues.push(FieldIssue::new(field, format!("{field} must be an integer between {min} and {max}")));
            default
        }
    }
}

/// `true`/`false` (case-insensitive); anything else is a field error.
pub fn parse_bool(field: &str, raw: Option<&str>, issues: &mut Vec<FieldIssue>) -> Option<bool> {
    match raw.map(str::trim) {
        None | Some("") => None,
        Some(v) if v.eq_ignore_ascii_case("true") => Some(true),
        Some(v) if v.eq_ignore_ascii_case("false") => Some(false),
        Some(_) => {
            issues.push(FieldIssue::new(field, format!("{field} must be true or false")));
            None
        }
    }
}

pub fn parse_uuid(field: &str, raw: Option<&str>, issues: &mut Vec<FieldIssue>) -> Option<Uuid> {
    match raw.map(str::trim) {
        None | Some("") => None,
        Some(v) => match Uuid::parse_str(v) {
            Ok(id) => Some(id),
            Err(_) => {
                issues.push(FieldIssue::new(field, format!("{field} must be a valid UUID")));
                None
            }
        },
    }
}

/// Parse a standalone `limit` parameter (featured/popular/recent lists).
pub fn parse_limit(raw: Option<&str>, default: u64, max: u64) -> Result<u64, ServiceError> {
    let mut issues = Vec::new();
    let limit = parse_bounded("limit", raw, 1, max, default, &mut issues);
    if issues.is_empty() { Ok(limit) } else { Err(ServiceError::Validation(issues)) }
}

pub fn finish<T>(value: T, issues: Vec<FieldIssue>) -> Result<T, ServiceError> {
    if issues.is_empty() { Ok(value) } else { Err(ServiceError::Validation(issues)) }
}

fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Case-insensitive substring match over any of `columns`.
pub fn search_condition<C: ColumnTrait + 'static>(columns: &[C], term: &str) -> Condition {
    let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
    columns.iter().fold(Condition::any(), |cond, col| {
        cond.add(Expr::expr(Func::lower(Expr::col(*col))).like(LikeExpr::new(pattern.clone()).escape('\\')))
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub pages: u64,
}

impl PageMeta {
    pub fn new(page: u64, limit: u64, total: u64) -> Self {
        Self { page, limit, total, pages: total.div_ceil(limit.max(1)) }
    }
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page { items: self.items.into_iter().map(f).collect(), meta: self.meta }
    }
}

/// Count and fetch the requested page of an already filtered and ordered select.
pub async fn fetch_page<E, C>(conn: &C, select: Select<E>, params: &ListParams) -> Result<Page<E::Model>, ServiceError>
where
    E: EntityTrait,
    E::Model: Send + Sync,
    C: ConnectionTrait,
{
    let paginator = select.paginate(conn, params.limit);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(params.page - 1).await?;
    Ok(Page { items, meta: PageMeta::new(params.page, params.limit, total) })
}

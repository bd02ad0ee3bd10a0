use serde::{Deserialize, Serialize};

use crate::error::QueryError;

pub const DEFAULT_LIMIT: u64 = 50;
pub const MAX_LIMIT: u64 = 1000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    pub fn reverse(self) -> Self {
        match self {
            SortDir::Asc => SortDir::Desc,
            SortDir::Desc => SortDir::Asc,
        }
    }
}

impl std::str::FromStr for SortDir {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDir::Asc),
            "desc" => Ok(SortDir::Desc),
            _ => Err(QueryError::InvalidOrder(s.to_string())),
        }
    }
}

/// Sort key from `orderBy`; a leading `-` means descending.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderKey {
    pub field: String,
    pub dir: SortDir,
}

impl OrderKey {
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix('-') {
            Some(field) => Self {
                field: field.to_string(),
                dir: SortDir::Desc,
            },
            None => Self {
                field: raw.to_string(),
                dir: SortDir::Asc,
            },
        }
    }
}

/// List endpoint query parameters as received on the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub offset: Option<u64>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
    pub order_by: Option<OrderKey>,
    pub order: Option<SortDir>,
    pub include: Vec<String>,
}

impl ListQuery {
    /// Build from raw `(name, value)` pairs. Unknown names are ignored; `include`
    /// may repeat or carry a comma-separated list.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut q = ListQuery::default();
        for (name, value) in pairs {
            match name {
                "offset" => q.offset = Some(parse_number("offset", value)?),
                "page" => q.page = Some(parse_number("page", value)?),
                "limit" => q.limit = Some(parse_number("limit", value)?),
                "search" if !value.trim().is_empty() => q.search = Some(value.to_string()),
                "orderBy" if !value.is_empty() => q.order_by = Some(OrderKey::parse(value)),
                "order" => q.order = Some(value.parse()?),
                "include" => q.include.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string),
                ),
                _ => {}
            }
        }
        Ok(q)
    }

    /// Requested limit clamped to `1..=MAX_LIMIT`.
    pub fn effective_limit(&self) -> u64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    /// Explicit offset wins over `page`; pages are 1-based.
    pub fn effective_offset(&self) -> u64 {
        match (self.offset, self.page) {
            (Some(offset), _) => offset,
            (None, Some(page)) => page.saturating_sub(1).saturating_mul(self.effective_limit()),
            (None, None) => 0,
        }
    }

    /// Final sort: `orderBy` direction, flipped when `order=desc` is also given.
    pub fn sort(&self) -> Option<OrderKey> {
        self.order_by.as_ref().map(|key| OrderKey {
            field: key.field.clone(),
            dir: match self.order {
                Some(SortDir::Desc) => key.dir.reverse(),
                _ => key.dir,
            },
        })
    }
}

fn parse_number(param: &'static str, value: &str) -> Result<u64, QueryError> {
    value
        .trim()
        .parse()
        .map_err(|_| QueryError::InvalidNumber {
            param,
            value: value.to_string(),
        })
}

/// `meta` block of the list envelope.
#[cfg_attr(feature = "with-utoipa", derive(utoipa::ToSchema))]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMeta {
    pub offset: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
    pub total_items: u64,
}

impl ListMeta {
    pub fn new(offset: u64, limit: u64, total_items: u64) -> Self {
        let limit = limit.max(1);
        Self {
            offset,
            page: (offset / limit).saturating_add(1),
            limit,
            total_pages: total_items.div_ceil(limit),
            total_items,
        }
    }
}

/// List response body: `{data, meta}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ListPage<T> {
    pub data: Vec<T>,
    pub meta: ListMeta,
}

impl<T> ListPage<T> {
    pub fn new(data: Vec<T>, query: &ListQuery, total_items: u64) -> Self {
        Self {
            data,
            meta: ListMeta::new(query.effective_offset(), query.effective_limit(), total_items),
        }
    }

    pub fn map_items<U>(self, f: impl FnMut(T) -> U) -> ListPage<U> {
        ListPage {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_math() {
        let meta = ListMeta::new(40, 20, 45);
        assert_eq!(meta.page, 3);
        assert_eq!(meta.total_pages, 3);
        assert_eq!(ListMeta::new(0, 10, 0).total_pages, 0);
        assert_eq!(ListMeta::new(0, 10, 10).total_pages, 1);
    }

    #[test]
    fn meta_serializes_camel_case() {
        let json = serde_json::to_value(ListMeta::new(0, 10, 11)).unwrap();
        assert_eq!(json["totalPages"], 2);
        assert_eq!(json["totalItems"], 11);
    }

    #[test]
    fn parses_pairs() {
        let q = ListQuery::from_pairs([
            ("page", "3"),
            ("limit", "5000"),
            ("orderBy", "-name"),
            ("include", "author, tags"),
            ("include", "comments"),
            ("search", "  "),
            ("unrelated", "x"),
        ])
        .unwrap();
        assert_eq!(q.effective_limit(), MAX_LIMIT);
        assert_eq!(q.effective_offset(), 2 * MAX_LIMIT);
        assert_eq!(
            q.sort(),
            Some(OrderKey {
                field: "name".into(),
                dir: SortDir::Desc
            })
        );
        assert_eq!(q.include, vec!["author", "tags", "comments"]);
        assert_eq!(q.search, None);
    }

    #[test]
    fn offset_wins_over_page_and_limit_has_floor() {
        let q = ListQuery::from_pairs([("offset", "7"), ("page", "4"), ("limit", "0")]).unwrap();
        assert_eq!(q.effective_offset(), 7);
        assert_eq!(q.effective_limit(), 1);
        assert_eq!(ListQuery::default().effective_limit(), DEFAULT_LIMIT);
    }

    #[test]
    fn huge_page_saturates_offset() {
        let q = ListQuery::from_pairs([("page", "400000000000000000")]).unwrap();
        assert_eq!(q.effective_offset(), u64::MAX);

        let page = ListPage::new(Vec::<u8>::new(), &q, 3);
        assert_eq!(page.meta.offset, u64::MAX);
        assert_eq!(page.meta.page, u64::MAX / DEFAULT_LIMIT + 1);
        assert_eq!(ListMeta::new(u64::MAX, 1, 0).page, u64::MAX);
    }

    #[test]
    fn order_flips_direction() {
        let q = ListQuery::from_pairs([("orderBy", "-name"), ("order", "DESC")]).unwrap();
        assert_eq!(q.sort().unwrap().dir, SortDir::Asc);
        let q = ListQuery::from_pairs([("orderBy", "name"), ("order", "desc")]).unwrap();
        assert_eq!(q.sort().unwrap().dir, SortDir::Desc);
    }

    #[test]
    fn rejects_bad_values() {
        assert_eq!(
            ListQuery::from_pairs([("limit", "ten")]),
            Err(QueryError::InvalidNumber {
                param: "limit",
                value: "ten".into()
            })
        );
        assert_eq!(
            ListQuery::from_pairs([("order", "sideways")]),
            Err(QueryError::InvalidOrder("sideways".into()))
        );
    }
}

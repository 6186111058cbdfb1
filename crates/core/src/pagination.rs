//! Page-number pagination for list endpoints.

use std::num::IntErrorKind;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Page requested by a client: 1-based page number + page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u32,
}

impl PageRequest {
    pub const DEFAULT_PAGE: u64 = 1;
    pub const DEFAULT_LIMIT: u32 = 10;

    /// Build a request from already-typed values.
    ///
    /// `page` and `limit` must be positive; `limit` is clamped to `max_limit`.
    pub fn new(page: u64, limit: u64, max_limit: u32) -> DomainResult<Self> {
        if page == 0 || limit == 0 {
            return Err(DomainError::validation("page and limit must be positive integers"));
        }
        let max_limit = max_limit.max(1);
        Ok(Self {
            page,
            limit: u32::try_from(limit).map_or(max_limit, |l| l.min(max_limit)),
        })
    }

    /// Parse raw query-string values; absent values take the defaults.
    ///
    /// Integers too large for `u64` saturate: they still name a page past the
    /// end, or a limit above the maximum.
    pub fn parse(page: Option<&str>, limit: Option<&str>, max_limit: u32) -> DomainResult<Self> {
        let page = parse_positive(page, Self::DEFAULT_PAGE)?;
        let limit = parse_positive(limit, u64::from(Self::DEFAULT_LIMIT))?;
        Self::new(page, limit, max_limit)
    }

    /// Number of rows preceding this page.
    pub fn offset(&self) -> u64 {
        self.page
            .saturating_sub(1)
            .saturating_mul(u64::from(self.limit))
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: Self::DEFAULT_PAGE,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

fn parse_positive(raw: Option<&str>, default: u64) -> DomainResult<u64> {
    let Some(s) = raw else {
        return Ok(default);
    };
    match s.trim().parse::<u64>() {
        Ok(n) => Ok(n),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Ok(u64::MAX),
        Err(_) => Err(DomainError::validation("page and limit must be positive integers")),
    }
}

/// One page of an ordered result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total number of rows across all pages.
    pub total: u64,
    pub page: u64,
    pub limit: u32,
}

impl<T: Clone> Page<T> {
    /// Cut the requested page out of a fully materialized, ordered row set.
    pub fn paginate<'a, I>(rows: I, request: PageRequest) -> Self
    where
        I: ExactSizeIterator<Item = &'a T>,
        T: 'a,
    {
        let total = rows.len() as u64;
        let start = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let items = rows
            .skip(start)
            .take(request.limit as usize)
            .cloned()
            .collect();
        Self {
            items,
            total,
            page: request.page,
            limit: request.limit,
        }
    }
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
        }
    }
}

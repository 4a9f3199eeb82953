//! Pagination utilities for list requests
//!
//! `page` is 0-based; `page_size` defaults to the collection length, so a
//! request without parameters returns everything.

use std::ops::Range;

use crate::errors::ServiceError;

/// Validated pagination parameters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pagination {
    /// 0-based page index
    pub page: u64,
    /// items per page; `None` means "whole collection"
    pub page_size: Option<u64>,
}

impl Pagination {
    /// Parse raw query values. Anything that is not a non-negative integer
    /// is rejected with `InvalidParams`.
    pub fn parse(page: Option<&str>, page_size: Option<&str>) -> Result<Self, ServiceError> {
        let page = page.map(parse_param).transpose()?.unwrap_or(0);
        let page_size = page_size.map(parse_param).transpose()?;
        Ok(Self { page, page_size })
    }

    /// Index window into a sequence of `len` items.
    ///
    /// `skip = page * size`, `end = min(size * (page + 1), len)`; a window
    /// starting at or past `len` is empty.
    pub fn window(self, len: usize) -> Range<usize> {
        let len64 = len as u64;
        let size = self.page_size.unwrap_or(len64);
        let skip = self.page.saturating_mul(size);
        if skip >= len64 {
            return len..len;
        }
        let end = size.saturating_mul(self.page.saturating_add(1)).min(len64);
        // both bounds are <= len here
        (skip as usize)..(end as usize)
    }
}

fn parse_param(raw: &str) -> Result<u64, ServiceError> {
    let n: i64 = raw.parse().map_err(|_| ServiceError::InvalidParams)?;
    u64::try_from(n).map_err(|_| ServiceError::InvalidParams)
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Page arithmetic for list endpoints.

use crate::error::{AppError, Result};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// One page of an ordered result set.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PaginatedList<T> {
    pub items: Vec<T>,
    /// 1-based page number
    pub page_index: u32,
    pub total_pages: u32,
    pub total_count: u32,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

impl<T> PaginatedList<T> {
    pub fn new(items: Vec<T>, total_count: u32, page_index: u32, page_size: u32) -> Self {
        let total_pages = total_pages(total_count, page_size);
        Self {
            items,
            page_index,
            total_pages,
            total_count,
            has_previous_page: page_index > 1,
            has_next_page: page_index < total_pages,
        }
    }

    /// Page through an already ordered slice.
    pub fn from_slice(all: &[T], page_index: u32, page_size: u32) -> Result<Self>
    where
        T: Clone,
    {
        let start = page_offset(page_index, page_size)?;
        let items = if start < all.len() {
            let end = start.saturating_add(page_size as usize).min(all.len());
            all[start..end].to_vec()
        } else {
            vec![]
        };

        let total_count = u32::try_from(all.len())
            .map_err(|_| AppError::BadRequest("Result set too large".to_string()))?;
        Ok(Self::new(items, total_count, page_index, page_size))
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedList<U> {
        PaginatedList {
            items: self.items.into_iter().map(f).collect(),
            page_index: self.page_index,
            total_pages: self.total_pages,
            total_count: self.total_count,
            has_previous_page: self.has_previous_page,
            has_next_page: self.has_next_page,
        }
    }
}

/// `ceil(total_count / page_size)`; zero when `page_size` is zero.
pub fn total_pages(total_count: u32, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    total_count.div_ceil(page_size)
}

/// Index of the first item of `page_index` (1-based).
pub fn page_offset(page_index: u32, page_size: u32) -> Result<usize> {
    if page_index < 1 {
        return Err(AppError::BadRequest(
            "Page must be greater than 0".to_string(),
        ));
    }

    (page_index as usize - 1)
        .checked_mul(page_size as usize)
        .ok_or_else(|| AppError::BadRequest("Page number causes overflow".to_string()))
}

//! A read-only, paginated data source that only accepts translatable filters.
//!
//! [`MemoryStore`] behaves like a remote query provider would: it never calls
//! a specification's in-memory predicate. Each request translates the
//! filter's expression into a [`Filter`](crate::Filter), rebuilds a lambda
//! from that wire form, compiles it once and runs it over the stored items.
//! A filter that would only work in memory is rejected up front.

use tracing::debug;

use crate::entity::Entity;
use crate::error::{Result, SpecError};
use crate::expr::CompiledPredicate;
use crate::sort::SortSpec;
use crate::spec::Spec;
use crate::translate::{translate, TranslateOptions};

/// One page of matching items.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, T> {
    /// Items on this page, in sort order.
    pub items: Vec<&'a T>,
    /// 1-based position of the first item on this page.
    pub offset: usize,
    /// Requested page size.
    pub limit: usize,
    /// Total number of matching items across all pages.
    pub matched: usize,
}

impl<T> Page<'_, T> {
    /// Number of items on this page.
    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether more matches follow this page.
    pub fn has_more(&self) -> bool {
        self.offset.saturating_sub(1) + self.items.len() < self.matched
    }
}

/// In-memory stand-in for a queryable data source.
#[derive(Debug, Clone)]
pub struct MemoryStore<T> {
    items: Vec<T>,
    options: TranslateOptions,
}

impl<T> MemoryStore<T> {
    pub fn new(items: Vec<T>) -> Self {
        MemoryStore {
            items,
            options: TranslateOptions::default(),
        }
    }

    /// Uses the given translator settings for every request.
    pub fn with_options(mut self, options: TranslateOptions) -> Self {
        self.options = options;
        self
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> FromIterator<T> for MemoryStore<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        MemoryStore::new(iter.into_iter().collect())
    }
}

impl<T: Entity + 'static> MemoryStore<T> {
    /// Returns up to `limit` matches starting at the 1-based `offset`.
    ///
    /// Both `offset` and `limit` must be at least 1.
    pub fn page(
        &self,
        offset: usize,
        limit: usize,
        filter: &Spec<T>,
        sort: Option<&SortSpec<T>>,
    ) -> Result<Page<'_, T>> {
        if offset < 1 || limit < 1 {
            return Err(SpecError::InvalidPage { offset, limit });
        }
        let predicate = self.pushdown(filter)?;
        let mut matches: Vec<&T> = self
            .items
            .iter()
            .filter(|item| predicate.call(item))
            .collect();
        if let Some(sort) = sort {
            matches.sort_by(|a, b| sort.compare(a, b));
        }

        let matched = matches.len();
        let items: Vec<&T> = matches.into_iter().skip(offset - 1).take(limit).collect();
        debug!(offset, limit, matched, returned = items.len(), "served page");
        Ok(Page {
            items,
            offset,
            limit,
            matched,
        })
    }

    /// Number of items matching `filter`.
    pub fn count(&self, filter: &Spec<T>) -> Result<usize> {
        let predicate = self.pushdown(filter)?;
        Ok(self.items.iter().filter(|item| predicate.call(item)).count())
    }

    /// First stored item matching `filter`, in storage order.
    pub fn first(&self, filter: &Spec<T>) -> Result<Option<&T>> {
        let predicate = self.pushdown(filter)?;
        Ok(self.items.iter().find(|item| predicate.call(item)))
    }

    fn pushdown(&self, filter: &Spec<T>) -> Result<CompiledPredicate<T>> {
        let lambda = filter.try_expression()?;
        let wire = translate(&lambda, &self.options)?;
        wire.to_lambda::<T>(lambda.param().name())?.compile()
    }
}

//! Lazy, forward-only iteration over a paginated result set.

use std::iter::FusedIterator;

use crate::error::OrdersError;
use crate::loader::{PageRecord, PagedLoader};
use crate::model::{OrderItem, OrderRecord};

/// Flattens a [`PagedLoader`] into a single sequence of records.
///
/// - Construction issues no request; the first `next()` does.
/// - At most one decoded page is held at a time.
/// - Not restartable: once exhausted (or after yielding an error) it only
///   returns `None` and never touches the network again. Build a new one per
///   sync call.
pub struct PagedIterator<'c, R> {
    loader: PagedLoader<'c, R>,
    page: std::vec::IntoIter<R>,
    done: bool,
}

pub type OrderIterator<'c> = PagedIterator<'c, OrderRecord>;
pub type OrderItemIterator<'c> = PagedIterator<'c, OrderItem>;

impl<'c, R: PageRecord> PagedIterator<'c, R> {
    pub fn new(loader: PagedLoader<'c, R>) -> Self {
        Self {
            loader,
            page: Vec::new().into_iter(),
            done: false,
        }
    }

    pub fn loader(&self) -> &PagedLoader<'c, R> {
        &self.loader
    }
}

impl<'c, R: PageRecord> Iterator for PagedIterator<'c, R> {
    type Item = Result<R, OrdersError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.page.next() {
                return Some(Ok(record));
            }
            if self.done {
                return None;
            }
            // Empty pages with a token are skipped by looping.
            match self.loader.next_page() {
                Ok(Some(records)) => self.page = records.into_iter(),
                Ok(None) => {
                    self.done = true;
                    return None;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

impl<'c, R: PageRecord> FusedIterator for PagedIterator<'c, R> {}

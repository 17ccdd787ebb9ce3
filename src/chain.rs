//! Wrap-chain traversal.
//!
//! A chain is an error followed by its `source()`, that source's `source()`,
//! and so on. Links do not need to be [`Error`]s: any `std::error::Error`
//! with a `source()` can sit between two of ours, for example an
//! application error enum wrapping a `tagged_errors::Error`.
//!
//! ```rust
//! use tagged_errors::{chain, errorf};
//!
//! let root = errorf!("db#c1: connection refused");
//! let top = errorf!("api: request failed: %w", root);
//!
//! let links = chain::flatten(&top);
//! assert_eq!(links.len(), 2);
//! assert_eq!(links.leaf().to_string(), "db#c1: connection refused");
//! ```

use crate::Error;
use smallvec::SmallVec;
use std::error::Error as StdError;
use std::iter::FusedIterator;

/// Flattened wrap chain, from the outermost error to the innermost cause.
///
/// Index 0 is the error the chain was built from; the last index is the
/// cause-less terminal. Never empty.
#[derive(Debug, Clone)]
pub struct Chain<'a> {
    links: SmallVec<[&'a (dyn StdError + 'static); 4]>,
}

impl<'a> Chain<'a> {
    /// Walk `error` and all its sources.
    pub fn new(error: &'a (dyn StdError + 'static)) -> Self {
        Self {
            links: Sources::new(error).collect(),
        }
    }

    /// Number of links (one more than the number of causes).
    #[inline]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Always `false`; a chain holds at least the error it was built from.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// The error the chain was built from.
    #[inline]
    pub fn root(&self) -> &'a (dyn StdError + 'static) {
        self.links[0]
    }

    /// The innermost cause (the root itself when there is no cause).
    #[inline]
    pub fn leaf(&self) -> &'a (dyn StdError + 'static) {
        self.links[self.links.len() - 1]
    }

    /// Link at `index`, 0 being the root.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&'a (dyn StdError + 'static)> {
        self.links.get(index).copied()
    }

    /// Iterate from the outermost error to the innermost cause.
    #[inline]
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &'a (dyn StdError + 'static)> + '_ {
        self.links.iter().copied()
    }

    /// Links that are [`Error`]s, in chain order.
    pub fn tagged(&self) -> impl Iterator<Item = &'a Error> + '_ {
        self.iter().filter_map(|e| e.downcast_ref::<Error>())
    }

    /// First link that is an [`Error`].
    #[inline]
    pub fn first_tagged(&self) -> Option<&'a Error> {
        self.tagged().next()
    }

    /// Copy the links out.
    pub fn to_vec(&self) -> Vec<&'a (dyn StdError + 'static)> {
        self.links.to_vec()
    }
}

impl<'a> IntoIterator for Chain<'a> {
    type Item = &'a (dyn StdError + 'static);
    type IntoIter = smallvec::IntoIter<[&'a (dyn StdError + 'static); 4]>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.into_iter()
    }
}

/// Lazy walk over an error and its sources.
#[derive(Debug, Clone)]
pub struct Sources<'a> {
    next: Option<&'a (dyn StdError + 'static)>,
}

impl<'a> Sources<'a> {
    /// Start at `error` itself.
    #[inline]
    pub fn new(error: &'a (dyn StdError + 'static)) -> Self {
        Self { next: Some(error) }
    }
}

impl<'a> Iterator for Sources<'a> {
    type Item = &'a (dyn StdError + 'static);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.source();
        Some(current)
    }
}

impl FusedIterator for Sources<'_> {}

/// The error followed by every cause, one level at a time.
#[inline]
pub fn flatten<'a>(error: &'a (dyn StdError + 'static)) -> Chain<'a> {
    Chain::new(error)
}

/// First link of the chain, `error` included, that is an [`Error`].
#[inline]
pub fn first<'a>(error: &'a (dyn StdError + 'static)) -> Option<&'a Error> {
    Sources::new(error).find_map(|e| e.downcast_ref::<Error>())
}

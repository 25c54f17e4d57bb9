use std::{error, fmt};

/// Error enumerates over all possible errors that this package
/// shall return.
#[derive(Debug, PartialEq)]
pub enum Error<T> {
    /// Returned by create() API when an equal item is already present.
    OverwriteKey,
    /// Fatal case, root node is colored red.
    RedRoot,
    /// Fatal case, a red node has a red parent.
    ConsecutiveReds,
    /// Fatal case, paths under a node cross different number of black
    /// nodes. The String component can be used for debugging.
    UnbalancedBlacks(String),
    /// Fatal case, items are not in sort-order. Carries the offending
    /// child item and its parent item.
    SortError(T, T),
    /// Fatal case, a child does not point back to its parent.
    BrokenLink(String),
    /// Fatal case, (reachable nodes, counted entries) do not agree.
    SizeMismatch(usize, usize),
}

impl<T> fmt::Display for Error<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::OverwriteKey => write!(f, "item already present"),
            Error::RedRoot => write!(f, "root is red"),
            Error::ConsecutiveReds => write!(f, "consecutive red nodes"),
            Error::UnbalancedBlacks(msg) => write!(f, "unbalanced blacks, {}", msg),
            Error::SortError(child, parent) => {
                write!(f, "sort error, child {:?} parent {:?}", child, parent)
            }
            Error::BrokenLink(msg) => write!(f, "broken link, {}", msg),
            Error::SizeMismatch(nodes, entries) => {
                write!(f, "size mismatch, nodes {} entries {}", nodes, entries)
            }
        }
    }
}

impl<T> error::Error for Error<T> where T: fmt::Debug {}

mod depth;
mod error;
mod item;
mod iter;
mod node;
mod rbtree;

pub use crate::depth::Depth;
pub use crate::error::Error;
pub use crate::item::Item;
pub use crate::iter::Iter;
pub use crate::rbtree::{RbTree, Stats};

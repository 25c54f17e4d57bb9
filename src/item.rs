use std::cmp::Ordering;

/// Item is the capability every value stored in [`RbTree`] must provide.
///
/// `less` should return `true` if `self` is ordered strictly before
/// `other`. Items are considered equal if neither is less than the other,
/// that is, `a` and `b` are equal when `!a.less(b) && !b.less(a)`.
///
/// Records keyed on a subset of their fields can implement `less` on the
/// key alone, upserting such a record replaces the stored one:
///
/// ```
/// use rb_index::{Item, RbTree};
///
/// struct Account {
///     id: u32,
///     balance: i64,
/// }
///
/// impl Item for Account {
///     fn less(&self, other: &Self) -> bool {
///         self.id < other.id
///     }
/// }
///
/// let mut tree = RbTree::default();
/// assert!(tree.upsert(Account { id: 1, balance: 10 }).is_none());
/// let old = tree.upsert(Account { id: 1, balance: 20 }).unwrap();
/// assert_eq!(old.balance, 10);
/// assert_eq!(tree.len(), 1);
/// ```
///
/// [`RbTree`]: crate::RbTree
pub trait Item {
    fn less(&self, other: &Self) -> bool;
}

macro_rules! impl_item_for_ord {
    ($($t:ty),*) => {
        $(
            impl Item for $t {
                #[inline]
                fn less(&self, other: &Self) -> bool {
                    self < other
                }
            }
        )*
    };
}

impl_item_for_ord!(i8, i16, i32, i64, i128, isize);
impl_item_for_ord!(u8, u16, u32, u64, u128, usize);
impl_item_for_ord!(char, bool, String);

impl<'a> Item for &'a str {
    #[inline]
    fn less(&self, other: &Self) -> bool {
        self < other
    }
}

// Compare `a` with `b` using only the less-than capability. An ordering
// that claims both `a < b` and `b < a` is a contract violation, fail
// right here instead of corrupting the tree.
#[inline]
pub(crate) fn order<T>(a: &T, b: &T) -> Ordering
where
    T: Item,
{
    if a.less(b) {
        if b.less(a) {
            panic!("order(): items are less than each other, broken ordering");
        }
        Ordering::Less
    } else if b.less(a) {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Contrary;

    impl Item for Contrary {
        fn less(&self, _other: &Self) -> bool {
            true
        }
    }

    #[test]
    fn test_order() {
        assert_eq!(order(&1_i64, &2), Ordering::Less);
        assert_eq!(order(&2_i64, &1), Ordering::Greater);
        assert_eq!(order(&"abc", &"abc"), Ordering::Equal);
        assert_eq!(order(&'z', &'a'), Ordering::Greater);
        assert_eq!(order(&"b".to_string(), &"a".to_string()), Ordering::Greater);
    }

    #[test]
    #[should_panic]
    fn test_order_contrary() {
        order(&Contrary, &Contrary);
    }
}

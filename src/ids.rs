//! Id and position newtypes shared across the table and engine modules.
//!
//! These mirror the small, `Copy`, `i32`-backed id wrappers of the teacher
//! crate (`NodeId`, `EdgeId`, ...): dense integers with a reserved `NULL`
//! sentinel, rather than `Option<usize>`, so that arrays indexed by id can
//! use the sentinel directly (`P[u] == NodeId::NULL`) the way the
//! propagation core's parent array does.

use std::fmt;

/// The sentinel used by every id type in this crate to mean "no such row" /
/// "no parent" / "no parent mutation".
pub const TSK_NULL: i32 = -1;

macro_rules! define_id_type {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
        pub struct $name(pub i32);

        impl $name {
            /// The null value for this id type.
            pub const NULL: Self = Self(TSK_NULL);

            /// `true` if this id is the null sentinel.
            pub fn is_null(&self) -> bool {
                self.0 == TSK_NULL
            }

            /// Panics if negative. Used where an id is known to be a row index.
            pub fn as_usize(&self) -> usize {
                debug_assert!(self.0 >= 0, "attempt to index with a null/negative id");
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(value: i32) -> Self {
                Self(value)
            }
        }

        impl From<usize> for $name {
            fn from(value: usize) -> Self {
                Self(value as i32)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl From<$name> for usize {
            fn from(value: $name) -> Self {
                value.as_usize()
            }
        }
    };
}

define_id_type!(NodeId, "Id of a row in the node table.");
define_id_type!(EdgeId, "Id of a row in the edge table.");
define_id_type!(SiteId, "Id of a row in the site table.");
define_id_type!(MutationId, "Id of a row in the mutation table.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_is_negative_one() {
        assert_eq!(NodeId::NULL.0, -1);
        assert!(NodeId::NULL.is_null());
        assert!(!NodeId::from(0).is_null());
    }
}

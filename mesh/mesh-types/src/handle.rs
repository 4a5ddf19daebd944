//! Handle types for mesh and point cloud elements.
//!
//! A handle is a small `Copy` value wrapping a dense index into the arena
//! that owns the element. Handles never borrow their container, so they can
//! be stored, compared, and hashed freely.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Common interface of all element handles.
///
/// Property tables use this to address their arrays regardless of which
/// kind of element (vertex, face, point, ...) they are attached to.
pub trait Handle: Copy + Eq + fmt::Debug {
    /// Build a handle from a dense arena index.
    fn from_index(index: usize) -> Self;

    /// The dense arena index of this handle.
    fn idx(self) -> usize;
}

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub struct $name(u32);

        impl $name {
            /// Create a handle for the given index.
            ///
            /// Indices are stored as `u32`; containers with more than
            /// `u32::MAX` elements are not supported.
            #[inline]
            #[must_use]
            #[allow(clippy::cast_possible_truncation)]
            pub const fn new(index: usize) -> Self {
                Self(index as u32)
            }

            /// The dense arena index of this handle.
            #[inline]
            #[must_use]
            pub const fn idx(self) -> usize {
                self.0 as usize
            }
        }

        impl Handle for $name {
            #[inline]
            fn from_index(index: usize) -> Self {
                Self::new(index)
            }

            #[inline]
            fn idx(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

define_handle!(
    /// Handle of a mesh vertex.
    VertexId,
    "v"
);

define_handle!(
    /// Handle of a directed half-edge.
    HalfedgeId,
    "h"
);

define_handle!(
    /// Handle of a polygonal face.
    FaceId,
    "f"
);

define_handle!(
    /// Handle of a point in a point cloud.
    PointId,
    "p"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_round_trips_index() {
        let v = VertexId::new(42);
        assert_eq!(v.idx(), 42);
        assert_eq!(<FaceId as Handle>::from_index(7).idx(), 7);
    }

    #[test]
    fn handle_display_uses_prefix() {
        assert_eq!(VertexId::new(3).to_string(), "v3");
        assert_eq!(HalfedgeId::new(7).to_string(), "h7");
        assert_eq!(FaceId::new(2).to_string(), "f2");
        assert_eq!(PointId::new(11).to_string(), "p11");
    }

    #[test]
    fn handles_order_by_index() {
        assert!(PointId::new(1) < PointId::new(2));
    }
}

//! Dense integer identifiers used throughout the engine.
//!
//! States, labels and blocks are all addressed by small dense integers so
//! that they can index directly into `Vec`s rather than hash maps. Blocks
//! are the one id space that grows during a run (a new id is minted on
//! every successful split); states and labels are fixed by the input LTS.

use std::fmt;

macro_rules! dense_id {
    ($name:ident) => {
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(pub u32);

        impl $name {
            /// The raw index, for use as a `Vec`/array subscript.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<usize> for $name {
            fn from(v: usize) -> Self {
                $name(v as u32)
            }
        }

        impl From<u32> for $name {
            fn from(v: u32) -> Self {
                $name(v)
            }
        }
    };
}

dense_id!(StateId);
dense_id!(LabelId);
dense_id!(BlockId);

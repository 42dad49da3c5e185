//! Core type definitions for the RED/ULP-FEC receive pipeline.
//!
//! Provides zero-cost newtypes to prevent field mixups at compile time.
//! All types use `#[repr(transparent)]` for guaranteed zero runtime cost.

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

/// Macro to generate wire-field newtype wrappers with common implementations
macro_rules! wire_newtype {
    (
        $(#[$meta:meta])*
        $name:ident($inner:ty) => $prefix:literal
        $(, custom_methods: { $($custom:tt)* })?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[derive(Serialize, Deserialize)]
        #[repr(transparent)]
        pub struct $name(pub $inner);

        impl $name {
            /// Creates a new instance
            #[inline]
            pub const fn new(value: $inner) -> Self {
                Self(value)
            }

            /// Raw value
            #[inline]
            pub const fn value(self) -> $inner {
                self.0
            }

            $($($custom)*)?
        }

        // Display with custom prefix
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }

        // Deref for transparent access
        impl Deref for $name {
            type Target = $inner;

            #[inline]
            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        // From/Into conversions
        impl From<$inner> for $name {
            #[inline]
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl From<$name> for $inner {
            #[inline]
            fn from(value: $name) -> Self {
                value.0
            }
        }

        // Enable direct comparisons with raw values
        impl PartialEq<$inner> for $name {
            #[inline]
            fn eq(&self, other: &$inner) -> bool {
                self.0 == *other
            }
        }

        impl PartialEq<$name> for $inner {
            #[inline]
            fn eq(&self, other: &$name) -> bool {
                *self == other.0
            }
        }
    };
}

wire_newtype!(
    /// RTP synchronization source identifier, grouping packets into one
    /// logical media stream.
    Ssrc(u32) => "SSRC"
);

wire_newtype!(
    /// RTP sequence number with 16-bit wrapping semantics.
    SequenceNumber(u16) => "SN",
    custom_methods: {
        /// Wrapping addition
        #[inline]
        pub const fn wrapping_add(self, rhs: u16) -> Self {
            Self(self.0.wrapping_add(rhs))
        }

        /// Wrapping distance from `rhs` to `self`, modulo 2^16
        #[inline]
        pub const fn wrapping_sub(self, rhs: Self) -> u16 {
            self.0.wrapping_sub(rhs.0)
        }
    }
);

wire_newtype!(
    /// 7-bit RTP payload type carried in the RED block header.
    PayloadType(u8) => "PT"
);

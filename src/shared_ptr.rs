//! The pointer kinds a [`FrozenMap`][crate::FrozenMap] can share its
//! contents through, re-exported from [`archery`].
//!
//! A map, its views and its builder take the pointer kind as their `P`
//! parameter. They're [`Send`] and [`Sync`] with [`ArcK`] (or [`ArcTK`]
//! with the `triomphe` feature) and confined to their thread with
//! [`RcK`], which skips the atomic reference counting.
//!
//! [`archery`]: https://docs.rs/archery/latest/
//! [`ArcTK`]: https://docs.rs/archery/latest/archery/shared_pointer/kind/struct.ArcTK.html

pub use archery::{ArcK, RcK, SharedPointer, SharedPointerKind};

#[cfg(feature = "triomphe")]
pub use archery::ArcTK;

/// The pointer kind behind [`FrozenMap`][crate::FrozenMap] and
/// [`Builder`][crate::Builder]: [`ArcK`], or `ArcTK` with the
/// `triomphe` feature.
#[cfg(not(feature = "triomphe"))]
pub type DefaultSharedPtr = ArcK;

/// The pointer kind behind [`FrozenMap`][crate::FrozenMap] and
/// [`Builder`][crate::Builder]: [`ArcK`], or [`ArcTK`] with the
/// `triomphe` feature.
#[cfg(feature = "triomphe")]
pub type DefaultSharedPtr = ArcTK;

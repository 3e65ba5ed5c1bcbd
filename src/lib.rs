//! An ordered, self-balancing associative container backed by a red-black tree.
//!
//! This crate provides [`RbTree`], an ordered multiset with O(log n)
//! worst-case insertion, deletion, and exact-key search:
//!
//! - [`insert`](RbTree::insert) / [`remove`](RbTree::remove) - Logarithmic mutation
//! - [`get`](RbTree::get) / [`contains`](RbTree::contains) - Exact-key lookup
//! - [`iter`](RbTree::iter) - In-order traversal, smallest key first
//! - [`traverse`](RbTree::traverse) - Pre/in/post-order visitors with early exit
//! - [`validate`](RbTree::validate) - Structural invariant checking for tests and debugging
//!
//! # Example
//!
//! ```
//! use scarlet_tree::RbTree;
//!
//! let mut tree = RbTree::new();
//! tree.insert(20);
//! tree.insert(10);
//! tree.insert(30);
//!
//! assert!(tree.contains(&10));
//! assert_eq!(tree.len(), 3);
//! assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![10, 20, 30]);
//!
//! tree.remove(&20);
//! assert!(!tree.contains(&20));
//! assert!(tree.validate().is_ok());
//! ```
//!
//! # Duplicate keys
//!
//! `RbTree` is a multiset: inserting an equal key always succeeds and the new
//! entry descends to the right of the existing one. Removal takes out one
//! occurrence at a time.
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **No `unsafe`** - Nodes live in an arena indexed by handles; parent links are
//!   plain indices, not second owners
//! - **O(log n) everything** - Height is bounded by 2·log₂(n+1) via the red-black
//!   coloring invariants
//!
//! # Implementation
//!
//! Nodes are stored in a slot arena and connected by handle indices. The
//! parent link is a non-owning back-reference used only for navigation and
//! rebalancing; ownership flows strictly parent-to-child from the root. The
//! absent child (the classical "nil leaf") is `Option::None` and queries as
//! BLACK, which keeps the fixup case analysis free of scattered null checks.
//!
//! The crate also carries [`fft`], a self-contained radix-2 FFT kernel that
//! shares no state with the tree.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod raw;

pub mod fft;
pub mod rb_tree;

pub use rb_tree::{InvariantViolation, NodeRef, RbTree};

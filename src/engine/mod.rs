//! The three statistics engines named in spec.md §4: branch, site, node.
//! Each owns its own incremental implementation and a from-scratch naive
//! counterpart used only for cross-checking in tests.

pub mod branch;
pub mod node;
pub mod site;

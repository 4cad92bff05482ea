//! Forgeplan Core -- demand-driven logistics planning for factory-building
//! games.
//!
//! Given a target production demand (finished items plus how many concurrent
//! fabrication units must sustain each), the planner synthesizes a fully
//! wired logistics network: fabrication nodes, storage buffers, and relay
//! nodes connected by directed links, subject to hard per-node link caps and
//! flow conservation.
//!
//! # Planning Pipeline
//!
//! Each call to [`planner::build_factory`] runs four fixed phases:
//!
//! 1. **Synthesis** -- For every requirement, an output sink and its
//!    fabrication nodes are created, recursing into every ingredient via
//!    [`synthesis::produce`].
//! 2. **Byproduct reconciliation** -- Unconsumed recipe byproducts are
//!    routed to dedicated buffers through relays.
//! 3. **Link-limit resolution** -- Fabrication nodes with too many direct
//!    inputs are restructured around consolidating relay-storage nodes.
//! 4. **Validation** -- Every capacity and flow invariant is checked; the
//!    graph is only returned if all of them hold.
//!
//! # Key Types
//!
//! - [`planner::build_factory`] -- Sole public entry point.
//! - [`graph::FactoryGraph`] -- Registry of all nodes, owning every link
//!   and flow ledger; populated monotonically, nodes are never removed.
//! - [`registry::Registry`] -- Immutable item/recipe database (frozen at
//!   build time).
//! - [`rate::Rate`] -- Q32.32 fixed-point type for deterministic per-minute
//!   flow rates.
//! - [`error::PlanError`] -- Fatal planning failures; never recovered.
//!
//! The planner is a greedy, deterministic heuristic: first-fit reuse over
//! creation-ordered node collections, no search for a minimum-node layout.

pub mod byproduct;
pub mod error;
pub mod graph;
pub mod id;
pub mod link_limit;
pub mod planner;
pub mod rate;
pub mod registry;
pub mod synthesis;
pub mod validate;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

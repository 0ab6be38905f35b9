// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Function signature hygiene
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! View/host synchronization core for an interactive PDB structure viewer.
//!
//! A host application pushes structure text and highlight requests to a
//! rendering view; the view colors atoms by residue name, reports clicked
//! atoms back, and keeps the rendered scene consistent while structure loads
//! resolve asynchronously.
//!
//! # Key entry points
//!
//! - [`view::MolView`] - owns the controllers and routes commands, clicks,
//!   and load completions
//! - [`stage::Stage`] - the renderer capability the view drives
//! - [`bridge::Bridge`] - host-bound event delivery with local fallback
//! - [`host::HostSession`] - the host-side half of the protocol
//! - [`options::Options`] - palette, highlight, display, and scene settings
//!
//! # Architecture
//!
//! Everything runs on one control thread. Structure loads are handed to the
//! [`stage::Stage`] together with a completion sender tagged with a load
//! generation; [`view::MolView::pump`] drains completions and the
//! [`scene::SceneController`] discards any whose generation has been
//! superseded, so a slow early load can never overwrite a newer one.

pub mod bridge;
pub mod color;
pub mod error;
pub mod host;
pub mod options;
pub mod picking;
pub mod scene;
pub mod selection;
pub mod stage;
pub mod structure;
pub mod view;
#[cfg(feature = "web")]
pub mod web;

#[cfg(test)]
mod testing;

pub use error::ViewError;
pub use view::MolView;

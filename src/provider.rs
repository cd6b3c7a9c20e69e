//! Provider-facing descriptors.
//!
//! `descriptor` exposes validated metadata (`ProviderDescriptor`) covering the authorize,
//! token, and resource API endpoints plus the provider quirks that shape the authorize URL.
//! The built-in [`ProviderDescriptor::freee`] targets the production freee endpoints; tests and
//! sandboxes assemble their own through [`ProviderDescriptor::builder`].

pub mod descriptor;

pub use descriptor::*;

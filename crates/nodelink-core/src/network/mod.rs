//! Per-network endpoint selection and derivation path lookup.

pub mod dpath;
pub mod selector;

pub use dpath::{get_dpath, get_dpaths};
pub use selector::select_endpoints;

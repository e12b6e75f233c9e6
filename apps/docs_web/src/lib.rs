//! Browser glue for the documentation page: binds the API-key field to the
//! dataset multi-select through `client_core`.
//!
//! Build with `wasm-pack build apps/docs_web --target web --out-dir ../../static/pkg`.

pub mod options;
pub mod selectors;

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod wasm;

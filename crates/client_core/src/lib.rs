//! Keeps a documentation page's dataset multi-select in sync with the API key
//! typed next to it.
//!
//! [`ApiKeyChangeHandler`] ties an [`OptionsSource`] (normally
//! [`HttpOptionsSource`]) to an [`OptionListTarget`] (the DOM select in the
//! browser, [`MemoryOptionList`] elsewhere).

pub mod error;
pub mod handler;
pub mod target;
pub mod transport;

pub use error::{FetchError, TargetError};
pub use handler::{ApiKeyChangeHandler, RefreshOutcome};
pub use target::{MemoryOptionList, OptionListTarget};
pub use transport::{HttpOptionsSource, OptionsSource};

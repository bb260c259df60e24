//! Edge-list provider: loads `source target` text into a seeded SLPA graph.

mod errors;
mod provider;

pub use errors::EdgeListError;
pub use provider::{EdgeListProvider, MalformedLinePolicy};

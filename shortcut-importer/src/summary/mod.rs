//! Run summary types.

mod import_summary;
mod link_summary;

pub use import_summary::ImportSummary;
pub use link_summary::LinkSummary;

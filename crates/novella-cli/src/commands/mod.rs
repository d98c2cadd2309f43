//! Command handlers grouped by concern.

pub(crate) mod bans;
pub(crate) mod drafts;
pub(crate) mod engagement;
pub(crate) mod identity;
pub(crate) mod reports;

//! Field coercers and row validators used by the dataset cleaners.

pub mod coerce;
pub mod validate;

pub use validate::{
    AllowList, allowed_mask, complete_mask, retain_allowed, retain_complete, retain_not_excluded,
};

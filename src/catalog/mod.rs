//! Pure catalog domain logic: library identifiers, change detection and
//! query filter normalization. No I/O here; persistence lives in the
//! repository layer.

pub mod dirty;
pub mod filters;
pub mod lib_id;

pub use dirty::BookSnapshot;
pub use filters::{BookFilters, FilterField};

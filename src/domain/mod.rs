pub mod hierarchy;
pub mod validation;

pub use hierarchy::{HierarchyError, MAX_DEPTH, SupplierTree};
pub use validation::{SupplierCandidate, ValidationError, validate};

pub mod queries;

pub use queries::MergePolicy;

pub mod entity;
pub use entity::*;

mod seed;
pub use seed::seed_reference_data;

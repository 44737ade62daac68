pub mod answer;
pub mod inventory;
pub mod query;

pub use answer::*;
pub use inventory::*;
pub use query::*;

pub mod common;
pub mod pagination;
pub mod pass;
pub mod pass_type;
pub mod pass_validation;
pub mod program;
pub mod user;

pub use common::*;
pub use pagination::*;
pub use pass::*;
pub use pass_type::*;
pub use pass_validation::*;
pub use program::*;
pub use user::*;

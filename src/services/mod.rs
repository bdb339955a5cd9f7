pub mod pass_service;
pub mod pass_validation_service;
pub mod program_service;
pub mod qr_code_service;
pub mod user_service;

pub use pass_service::*;
pub use pass_validation_service::*;
pub use program_service::*;
pub use qr_code_service::*;
pub use user_service::*;

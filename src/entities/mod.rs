pub mod pass_types;
pub mod pass_validations;
pub mod passes;
pub mod programs;
pub mod qr_codes;
pub mod users;

pub use pass_types as pass_type_entity;
pub use pass_validations as pass_validation_entity;
pub use passes as pass_entity;
pub use programs as program_entity;
pub use qr_codes as qr_code_entity;
pub use users as user_entity;

pub use pass_validations::{PassValidationStatus, ValidationMethod};
pub use passes::PassStatus;
pub use programs::ProgramStatus;
pub use qr_codes::QrCodeStatus;

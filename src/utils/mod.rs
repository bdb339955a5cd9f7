pub mod jwt;
pub mod keyed_lock;
pub mod manual_code;

pub use jwt::*;
pub use keyed_lock::{InventoryLocks, KeyedGuard, KeyedLocks};
pub use manual_code::{MANUAL_CODE_ALPHABET, generate_manual_code, normalize_manual_code};

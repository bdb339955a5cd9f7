//! 持久化访问层
//!
//! 所有函数对 `ConnectionTrait` 泛型，既可以在连接池上调用，也可以在事务内调用。

pub mod inventory;
pub mod validation_history;

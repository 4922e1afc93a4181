//! Expense store and report generation.
//!
//! [`Engine`] owns the database connection and exposes the CRUD operations,
//! all scoped by the owning chat user. [`report`] turns a list of expenses
//! into an `.xlsx` document.

pub use error::EngineError;
pub use expenses::{Expense, ExpenseChanges, ExpenseNew};
pub use money::to_usd;
pub use ops::{Engine, EngineBuilder};

mod error;
mod expenses;
mod money;
mod ops;
pub mod report;

type ResultEngine<T> = Result<T, EngineError>;

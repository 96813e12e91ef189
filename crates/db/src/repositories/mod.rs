//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod budget;
pub mod category;
pub mod expense;
pub mod report;
pub mod user;
pub mod wishlist;

pub use budget::{BudgetError, BudgetRepository};
pub use category::{CategoryError, CategoryRepository};
pub use expense::{ExpenseError, ExpenseFilter, ExpenseRepository};
pub use report::{CategoryTotal, ReportRepository};
pub use user::{UserError, UserRepository};
pub use wishlist::{WishlistError, WishlistRepository};

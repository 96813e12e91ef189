//! `SeaORM` entity definitions.

#![allow(missing_docs)]

pub mod prelude;

pub mod budgets;
pub mod categories;
pub mod expense_categories;
pub mod expenses;
pub mod sea_orm_active_enums;
pub mod users;
pub mod wishlist;

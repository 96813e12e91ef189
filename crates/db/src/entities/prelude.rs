//! Entity re-exports.

pub use super::budgets::Entity as Budgets;
pub use super::categories::Entity as Categories;
pub use super::expense_categories::Entity as ExpenseCategories;
pub use super::expenses::Entity as Expenses;
pub use super::users::Entity as Users;
pub use super::wishlist::Entity as Wishlist;

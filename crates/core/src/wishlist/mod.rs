//! Wishlist: planned purchases, ranked by priority.
//!
//! Wishlist items never count toward budget spend; only recorded expenses do.

pub mod error;
pub mod types;
pub mod validation;

pub use error::WishlistError;
pub use types::{NewWishlistItem, WishStatus, WishlistItem, WishlistPatch};
pub use validation::{MAX_PRIORITY, MIN_PRIORITY};

//! Which budgets an expense mutation invalidates.

use tally_shared::types::{CategoryId, UserId};

/// A committed change to an expense or its category links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpenseMutation {
    /// Expense inserted and linked to `linked`.
    Created {
        /// Expense owner.
        owner: UserId,
        /// Every category linked in the same write, including new ones.
        linked: Vec<CategoryId>,
    },
    /// Expense fields changed, possibly with extra links.
    Updated {
        /// Expense owner.
        owner: UserId,
        /// Links as they were before the update.
        before: Vec<CategoryId>,
        /// Links added by the update.
        added: Vec<CategoryId>,
    },
    /// Expense removed together with its links.
    Deleted {
        /// Expense owner.
        owner: UserId,
        /// Links the expense had.
        linked: Vec<CategoryId>,
    },
    /// One link added.
    Linked {
        /// Expense owner.
        owner: UserId,
        /// Added category.
        category: CategoryId,
    },
    /// One link removed.
    Unlinked {
        /// Expense owner.
        owner: UserId,
        /// Removed category.
        category: CategoryId,
    },
}

impl ExpenseMutation {
    /// Owner whose budgets are affected.
    #[must_use]
    pub const fn owner(&self) -> UserId {
        match self {
            Self::Created { owner, .. }
            | Self::Updated { owner, .. }
            | Self::Deleted { owner, .. }
            | Self::Linked { owner, .. }
            | Self::Unlinked { owner, .. } => *owner,
        }
    }

    /// Categories to recalculate, in order.
    ///
    /// An update yields the previous links followed by the added ones, so a
    /// category in both lists appears twice.
    #[must_use]
    pub fn affected_categories(&self) -> Vec<CategoryId> {
        match self {
            Self::Created { linked, .. } | Self::Deleted { linked, .. } => linked.clone(),
            Self::Updated { before, added, .. } => {
                before.iter().chain(added.iter()).copied().collect()
            }
            Self::Linked { category, .. } | Self::Unlinked { category, .. } => vec![*category],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_recalculates_every_link() {
        let owner = UserId::new();
        let (a, b) = (CategoryId::new(), CategoryId::new());

        let mutation = ExpenseMutation::Created {
            owner,
            linked: vec![a, b],
        };

        assert_eq!(mutation.owner(), owner);
        assert_eq!(mutation.affected_categories(), vec![a, b]);
    }

    #[test]
    fn test_updated_keeps_duplicates() {
        let (a, b) = (CategoryId::new(), CategoryId::new());

        let mutation = ExpenseMutation::Updated {
            owner: UserId::new(),
            before: vec![a, b],
            added: vec![b],
        };

        assert_eq!(mutation.affected_categories(), vec![a, b, b]);
    }

    #[test]
    fn test_updated_without_links_touches_nothing() {
        let mutation = ExpenseMutation::Updated {
            owner: UserId::new(),
            before: Vec::new(),
            added: Vec::new(),
        };

        assert!(mutation.affected_categories().is_empty());
    }

    #[test]
    fn test_single_link_changes() {
        let category = CategoryId::new();
        let owner = UserId::new();

        for mutation in [
            ExpenseMutation::Linked { owner, category },
            ExpenseMutation::Unlinked { owner, category },
        ] {
            assert_eq!(mutation.affected_categories(), vec![category]);
        }
    }

    #[test]
    fn test_deleted_uses_previous_links() {
        let a = CategoryId::new();

        let mutation = ExpenseMutation::Deleted {
            owner: UserId::new(),
            linked: vec![a],
        };

        assert_eq!(mutation.affected_categories(), vec![a]);
    }
}

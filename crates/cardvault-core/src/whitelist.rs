//! Vendor allow-list
//!
//! A single replaceable set of identities allowed to withdraw from any card.
//! Replacement is wholesale: installing a new list drops every prior member
//! that is not in it.

use std::collections::BTreeSet;

use cardvault_types::Address;
use serde::{Deserialize, Serialize};

/// The set of vendors currently allowed to withdraw
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorWhitelist {
    members: BTreeSet<Address>,
}

/// Membership delta produced by a replacement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistChange {
    pub added: Vec<Address>,
    pub removed: Vec<Address>,
}

impl WhitelistChange {
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

impl VendorWhitelist {
    pub fn new(members: impl IntoIterator<Item = Address>) -> Self {
        Self {
            members: members.into_iter().collect(),
        }
    }

    /// Membership test. Total and side-effect free.
    pub fn contains(&self, identity: &Address) -> bool {
        self.members.contains(identity)
    }

    /// Replace the whole membership, returning what changed.
    pub fn replace(&mut self, members: impl IntoIterator<Item = Address>) -> WhitelistChange {
        let next: BTreeSet<Address> = members.into_iter().collect();
        let change = WhitelistChange {
            added: next.difference(&self.members).copied().collect(),
            removed: self.members.difference(&next).copied().collect(),
        };
        self.members = next;
        change
    }

    /// Sorted snapshot of the members
    pub fn members(&self) -> Vec<Address> {
        self.members.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

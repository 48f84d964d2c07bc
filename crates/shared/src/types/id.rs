//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `UserId` where an `AccountId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(UserId, "Unique identifier for a registered user.");
typed_id!(AccountId, "Unique identifier for a bank account.");
typed_id!(ContactId, "Unique identifier for an address book contact.");

const TX_PREFIX: &str = "tx-";

/// Which side of a posting a transaction id names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostingLeg {
    /// Money leaving the account (transfer debit).
    Outgoing,
    /// Money entering the account (transfer credit).
    Incoming,
    /// Administrative adjustment.
    Adjustment,
}

impl PostingLeg {
    /// Suffix appended to the transaction id.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Outgoing => "out",
            Self::Incoming => "in",
            Self::Adjustment => "adj",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "out" => Some(Self::Outgoing),
            "in" => Some(Self::Incoming),
            "adj" => Some(Self::Adjustment),
            _ => None,
        }
    }
}

/// Identifier of a ledger transaction.
///
/// Formatted as `tx-<stem>-<leg>`. The stem is a fresh UUID v7, so ids never
/// repeat within an account log. Both halves of an internal transfer share a
/// stem and differ only by their leg suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Creates the debit and credit ids of one transfer, sharing a stem.
    #[must_use]
    pub fn transfer_pair() -> (Self, Self) {
        let stem = fresh_stem();
        (
            Self::with_leg(&stem, PostingLeg::Outgoing),
            Self::with_leg(&stem, PostingLeg::Incoming),
        )
    }

    /// Creates an id for a single leg with a fresh stem.
    #[must_use]
    pub fn single(leg: PostingLeg) -> Self {
        Self::with_leg(&fresh_stem(), leg)
    }

    fn with_leg(stem: &str, leg: PostingLeg) -> Self {
        Self(format!("{TX_PREFIX}{stem}-{}", leg.suffix()))
    }

    /// Wraps an id read from storage or a request path.
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the shared stem, if the id is well formed.
    #[must_use]
    pub fn stem(&self) -> Option<&str> {
        self.0
            .strip_prefix(TX_PREFIX)?
            .rsplit_once('-')
            .map(|(stem, _)| stem)
    }

    /// Returns the posting leg encoded in the suffix, if any.
    #[must_use]
    pub fn leg(&self) -> Option<PostingLeg> {
        self.0
            .rsplit_once('-')
            .and_then(|(_, suffix)| PostingLeg::from_suffix(suffix))
    }

    /// Returns the raw id string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn fresh_stem() -> String {
    Uuid::now_v7().simple().to_string()
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

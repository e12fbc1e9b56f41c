//! The gift value object.

use std::num::NonZeroU32;

use catalog_store::{Member, MemberId, OptionDetails};
use chrono::{DateTime, Utc};

use crate::error::DomainError;

/// Number of units moved by one gift.
///
/// Always between 1 and `i32::MAX`, so zero-unit and negative gifts cannot
/// reach the stock ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GiftQuantity(NonZeroU32);

impl GiftQuantity {
    /// Largest quantity a single gift may carry; matches the stock column range.
    pub const MAX: u32 = i32::MAX as u32;

    /// Validates a caller-supplied quantity.
    pub fn new(quantity: i64) -> Result<Self, DomainError> {
        u32::try_from(quantity)
            .ok()
            .filter(|q| *q <= Self::MAX)
            .and_then(NonZeroU32::new)
            .map(Self)
            .ok_or(DomainError::InvalidQuantity { quantity })
    }

    /// Returns the quantity as a non-zero count.
    pub fn get(&self) -> NonZeroU32 {
        self.0
    }
}

impl TryFrom<i64> for GiftQuantity {
    type Error = DomainError;

    fn try_from(quantity: i64) -> Result<Self, Self::Error> {
        Self::new(quantity)
    }
}

impl std::fmt::Display for GiftQuantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A gift in flight: who sends what to whom.
///
/// Built once stock has been decremented and handed to delivery. Carries the
/// sender and receiver as loaded inside the gift's transaction, so delivery
/// needs no further reads. Gifts are never persisted.
#[derive(Debug, Clone)]
pub struct Gift {
    sender: Member,
    receiver: Member,
    option: OptionDetails,
    quantity: GiftQuantity,
    message: String,
    sent_at: DateTime<Utc>,
}

impl Gift {
    /// Creates a gift stamped with the current time.
    pub fn new(
        sender: Member,
        receiver: Member,
        option: OptionDetails,
        quantity: GiftQuantity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            sender,
            receiver,
            option,
            quantity,
            message: message.into(),
            sent_at: Utc::now(),
        }
    }

    /// Returns the sending member's id.
    pub fn from(&self) -> MemberId {
        self.sender.id
    }

    /// Returns the receiving member's id.
    pub fn to(&self) -> MemberId {
        self.receiver.id
    }

    pub fn sender(&self) -> &Member {
        &self.sender
    }

    pub fn receiver(&self) -> &Member {
        &self.receiver
    }

    /// Returns the gifted option with its product.
    pub fn option(&self) -> &OptionDetails {
        &self.option
    }

    pub fn quantity(&self) -> GiftQuantity {
        self.quantity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn sent_at(&self) -> DateTime<Utc> {
        self.sent_at
    }
}

//! Gift delivery trait and its implementations.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use catalog_store::{MemberId, OptionId};
use domain::Gift;

use crate::error::GiftError;

/// Notifies sender and receiver that a gift was sent.
///
/// Called exactly once per gift, inside the gift's unit of work: an error
/// here rolls the stock decrement back. Implementations work from the gift
/// alone and must not touch the catalog.
#[async_trait]
pub trait GiftDelivery: Send + Sync {
    /// Delivers the gift notification.
    async fn deliver(&self, gift: &Gift) -> Result<(), GiftError>;
}

/// Delivery that writes the notification to the log.
///
/// Stands in for push or email delivery. Member names come from the gift
/// itself, so delivery never reaches back into the store while the gift's
/// transaction holds its connection and row lock.
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeGiftDelivery;

impl FakeGiftDelivery {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl GiftDelivery for FakeGiftDelivery {
    #[tracing::instrument(skip_all, fields(from = %gift.from(), to = %gift.to()))]
    async fn deliver(&self, gift: &Gift) -> Result<(), GiftError> {
        let details = gift.option();
        tracing::info!(
            quantity = %gift.quantity(),
            message = gift.message(),
            "{} → {}: {} {}",
            gift.sender().name,
            gift.receiver().name,
            details.product.name,
            details.option.name
        );
        Ok(())
    }
}

/// A gift recorded by [`InMemoryGiftDelivery`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredGift {
    pub from: MemberId,
    pub to: MemberId,
    pub option_id: OptionId,
    pub quantity: u32,
    pub message: String,
}

#[derive(Debug, Default)]
struct InMemoryDeliveryState {
    delivered: Vec<DeliveredGift>,
    fail_on_deliver: bool,
}

/// In-memory delivery for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGiftDelivery {
    state: Arc<Mutex<InMemoryDeliveryState>>,
}

impl InMemoryGiftDelivery {
    /// Creates a new in-memory delivery.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the delivery to fail on every subsequent call.
    pub fn set_fail_on_deliver(&self, fail: bool) {
        self.lock().fail_on_deliver = fail;
    }

    /// Returns the number of gifts delivered so far.
    pub fn delivered_count(&self) -> usize {
        self.lock().delivered.len()
    }

    /// Returns the gifts delivered so far, oldest first.
    pub fn delivered(&self) -> Vec<DeliveredGift> {
        self.lock().delivered.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, InMemoryDeliveryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl GiftDelivery for InMemoryGiftDelivery {
    async fn deliver(&self, gift: &Gift) -> Result<(), GiftError> {
        let mut state = self.lock();

        if state.fail_on_deliver {
            return Err(GiftError::Delivery("notification channel unavailable".to_string()));
        }

        state.delivered.push(DeliveredGift {
            from: gift.from(),
            to: gift.to(),
            option_id: gift.option().option.id,
            quantity: gift.quantity().get().get(),
            message: gift.message().to_string(),
        });
        Ok(())
    }
}

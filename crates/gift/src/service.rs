//! The gift transaction.

use std::time::Instant;

use catalog_store::{CatalogStore, MemberId, OptionId, StockTransaction};
use chrono::{DateTime, Utc};
use domain::{Gift, GiftQuantity};
use uuid::Uuid;

use crate::delivery::GiftDelivery;
use crate::error::{GiftError, Result};

/// Command to send a gift.
#[derive(Debug, Clone)]
pub struct SendGift {
    pub sender_id: MemberId,
    pub option_id: OptionId,
    pub receiver_id: MemberId,
    /// Units to gift as requested by the caller; validated into a [`GiftQuantity`].
    pub quantity: i64,
    /// Free text passed through to delivery. Not stored.
    pub message: String,
}

/// Outcome of a successful gift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GiftReceipt {
    /// Identifier for correlating this gift in logs.
    pub gift_id: Uuid,
    pub sender_id: MemberId,
    pub receiver_id: MemberId,
    pub option_id: OptionId,
    pub quantity: u32,
    /// Option stock left after this gift.
    pub remaining_stock: u32,
    pub sent_at: DateTime<Utc>,
}

/// Sends gifts: validates the parties, takes the units out of stock and
/// triggers delivery, all in one store transaction.
pub struct GiftService<S, D>
where
    S: CatalogStore,
    D: GiftDelivery,
{
    store: S,
    delivery: D,
}

impl<S, D> GiftService<S, D>
where
    S: CatalogStore,
    D: GiftDelivery,
{
    /// Creates a new gift service.
    pub fn new(store: S, delivery: D) -> Self {
        Self { store, delivery }
    }

    /// Returns a reference to the delivery used for notifications.
    pub fn delivery(&self) -> &D {
        &self.delivery
    }

    /// Sends a gift.
    ///
    /// On success the option's stock has dropped by the gifted quantity and
    /// delivery has been called exactly once. On failure no stock change is
    /// visible.
    #[tracing::instrument(
        skip(self, cmd),
        fields(
            sender_id = %cmd.sender_id,
            option_id = %cmd.option_id,
            receiver_id = %cmd.receiver_id,
            quantity = cmd.quantity,
        )
    )]
    pub async fn send_gift(&self, cmd: SendGift) -> Result<GiftReceipt> {
        metrics::counter!("gifts_requested_total").increment(1);
        let start = Instant::now();

        let result = self.execute(cmd).await;
        metrics::histogram!("gift_duration_seconds").record(start.elapsed().as_secs_f64());

        match &result {
            Ok(receipt) => {
                metrics::counter!("gifts_sent_total").increment(1);
                metrics::counter!("gift_units_total").increment(u64::from(receipt.quantity));
                tracing::info!(
                    gift_id = %receipt.gift_id,
                    remaining_stock = receipt.remaining_stock,
                    "gift sent"
                );
            }
            Err(err) => {
                metrics::counter!("gifts_failed_total", "reason" => err.kind()).increment(1);
                tracing::warn!(error = %err, "gift failed");
            }
        }

        result
    }

    async fn execute(&self, cmd: SendGift) -> Result<GiftReceipt> {
        let quantity = GiftQuantity::new(cmd.quantity).map_err(|_| GiftError::InvalidQuantity {
            quantity: cmd.quantity,
        })?;

        let mut tx = self.store.begin().await?;

        match self.run(&mut tx, cmd, quantity).await {
            Ok(receipt) => {
                tx.commit().await?;
                Ok(receipt)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!(error = %rollback_err, "gift rollback failed");
                }
                Err(err)
            }
        }
    }

    /// The steps of a gift, in order. Everything here runs inside `tx`.
    async fn run(
        &self,
        tx: &mut S::Transaction,
        cmd: SendGift,
        quantity: GiftQuantity,
    ) -> Result<GiftReceipt> {
        // 1. Option and product
        let option = tx
            .get_option_for_update(cmd.option_id)
            .await?
            .ok_or(GiftError::OptionNotFound(cmd.option_id))?;

        // 2. Both parties, before any stock moves
        let sender = tx
            .get_member(cmd.sender_id)
            .await?
            .ok_or(GiftError::MemberNotFound(cmd.sender_id))?;
        let receiver = tx
            .get_member(cmd.receiver_id)
            .await?
            .ok_or(GiftError::MemberNotFound(cmd.receiver_id))?;

        // 3. Stock
        let remaining_stock = tx.decrement_stock(cmd.option_id, quantity.get()).await?;

        // 4. Delivery
        let gift = Gift::new(sender, receiver, option, quantity, cmd.message);
        self.delivery.deliver(&gift).await?;

        Ok(GiftReceipt {
            gift_id: Uuid::new_v4(),
            sender_id: gift.from(),
            receiver_id: gift.to(),
            option_id: gift.option().option.id,
            quantity: quantity.get().get(),
            remaining_stock,
            sent_at: gift.sent_at(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_store::{InMemoryCatalogStore, NewCategory, NewMember, NewOption, NewProduct};

    use crate::delivery::InMemoryGiftDelivery;

    struct Fixture {
        service: GiftService<InMemoryCatalogStore, InMemoryGiftDelivery>,
        store: InMemoryCatalogStore,
        sender: MemberId,
        receiver: MemberId,
        option: OptionId,
    }

    async fn fixture(stock: u32) -> Fixture {
        let store = InMemoryCatalogStore::new();
        let category = store
            .insert_category(NewCategory {
                name: "Test category".to_string(),
            })
            .await
            .unwrap();
        let product = store
            .insert_product(NewProduct {
                name: "Test product".to_string(),
                price: 10000,
                image_url: "http://image.png".to_string(),
                category_id: category.id,
            })
            .await
            .unwrap();
        let option = store
            .insert_option(NewOption {
                name: "Default".to_string(),
                quantity: stock,
                product_id: product.id,
            })
            .await
            .unwrap();
        let sender = store
            .insert_member(NewMember {
                name: "Sender".to_string(),
                email: "sender@test.com".to_string(),
            })
            .await
            .unwrap();
        let receiver = store
            .insert_member(NewMember {
                name: "Receiver".to_string(),
                email: "receiver@test.com".to_string(),
            })
            .await
            .unwrap();

        Fixture {
            service: GiftService::new(store.clone(), InMemoryGiftDelivery::new()),
            store,
            sender: sender.id,
            receiver: receiver.id,
            option: option.id,
        }
    }

    impl Fixture {
        fn gift(&self, quantity: i64) -> SendGift {
            SendGift {
                sender_id: self.sender,
                option_id: self.option,
                receiver_id: self.receiver,
                quantity,
                message: "A gift for you".to_string(),
            }
        }

        async fn stock(&self) -> u32 {
            self.store
                .get_option(self.option)
                .await
                .unwrap()
                .unwrap()
                .quantity
        }
    }

    #[tokio::test]
    async fn test_send_gift_decrements_and_delivers_once() {
        let f = fixture(10).await;

        let receipt = f.service.send_gift(f.gift(3)).await.unwrap();

        assert_eq!(receipt.remaining_stock, 7);
        assert_eq!(receipt.quantity, 3);
        assert_eq!(f.stock().await, 7);
        assert_eq!(f.service.delivery().delivered_count(), 1);
    }

    #[tokio::test]
    async fn test_quantity_is_validated_before_the_transaction() {
        let f = fixture(10).await;

        for quantity in [0, -5] {
            let result = f.service.send_gift(f.gift(quantity)).await;
            assert!(matches!(result, Err(GiftError::InvalidQuantity { .. })));
        }
        assert_eq!(f.stock().await, 10);
        assert_eq!(f.service.delivery().delivered_count(), 0);
    }

    #[tokio::test]
    async fn test_delivery_failure_rolls_back_stock() {
        let f = fixture(10).await;
        f.service.delivery().set_fail_on_deliver(true);

        let result = f.service.send_gift(f.gift(3)).await;

        assert!(matches!(result, Err(GiftError::Delivery(_))));
        assert_eq!(f.stock().await, 10);
    }

    #[test]
    fn test_error_kinds_are_stable() {
        assert_eq!(
            GiftError::OptionNotFound(OptionId::new(1)).kind(),
            "option_not_found"
        );
        assert_eq!(
            GiftError::InvalidQuantity { quantity: 0 }.kind(),
            "invalid_quantity"
        );
    }
}

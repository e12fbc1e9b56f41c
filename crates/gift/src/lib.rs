//! Gift sending for the gift catalog service.
//!
//! [`GiftService::send_gift`] runs one gift as a single unit of work:
//! 1. Load the option (with its product) and claim it
//! 2. Load the sender and the receiver
//! 3. Decrement the option's stock
//! 4. Hand the gift to [`GiftDelivery`]
//! 5. Commit
//!
//! If any step fails, the transaction is rolled back and no stock change
//! becomes visible.

pub mod delivery;
pub mod error;
pub mod service;

pub use delivery::{DeliveredGift, FakeGiftDelivery, GiftDelivery, InMemoryGiftDelivery};
pub use error::GiftError;
pub use service::{GiftReceipt, GiftService, SendGift};

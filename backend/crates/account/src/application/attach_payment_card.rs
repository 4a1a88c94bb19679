//! Attach Payment Card Use Case
//!
//! The provider customer is created on first use and remembered on the
//! identity.

use kernel::id::IdentityId;

use crate::application::ports::{AccountDeps, AccountPorts};
use crate::domain::repository::{IdentityRepository, PaymentProvider};
use crate::error::{AccountError, AccountResult};

/// Longest accepted provider card token
const MAX_CARD_TOKEN_LEN: usize = 255;

/// Attach payment card output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedCard {
    pub customer_id: String,
    pub card_id: String,
}

/// Attach payment card use case
pub struct AttachPaymentCardUseCase<P: AccountPorts> {
    deps: AccountDeps<P>,
}

impl<P: AccountPorts> AttachPaymentCardUseCase<P> {
    pub fn new(deps: AccountDeps<P>) -> Self {
        Self { deps }
    }

    pub async fn execute(&self, identity_id: IdentityId, card_token: &str) -> AccountResult<AttachedCard> {
        let card_token = card_token.trim();
        if card_token.is_empty() || card_token.len() > MAX_CARD_TOKEN_LEN {
            return Err(AccountError::Validation("Invalid card token".into()));
        }

        let identity = self
            .deps
            .identities
            .find(&identity_id)
            .await?
            .ok_or(AccountError::NotFound)?;

        let customer_id = match identity.payment_customer_id {
            Some(customer_id) => customer_id,
            None => {
                let customer_id = self
                    .deps
                    .payments
                    .create_customer(identity.email.as_str())
                    .await?;
                self.deps
                    .identities
                    .set_payment_customer(&identity_id, &customer_id)
                    .await?;
                tracing::info!(identity_id = %identity_id, "Payment customer created");
                customer_id
            }
        };

        let card_id = self.deps.payments.create_card(card_token, &customer_id).await?;

        tracing::info!(identity_id = %identity_id, "Payment card attached");
        Ok(AttachedCard {
            customer_id,
            card_id,
        })
    }
}

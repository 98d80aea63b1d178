use rust_decimal::Decimal;

use super::wagers_model::{NewWager, Wager, WagerResult, WagerUpdate};
use crate::Result;

/// Trait defining the contract for wager repository operations.
pub trait WagerRepositoryTrait: Send + Sync {
    fn create(&self, new_wager: NewWager) -> Result<Wager>;
    fn update(&self, wager_update: WagerUpdate) -> Result<Wager>;
    fn delete(&self, wager_id: &str) -> Result<()>;
    fn get_by_id(&self, wager_id: &str) -> Result<Wager>;
    fn list(&self, user_id: &str) -> Result<Vec<Wager>>;
}

/// Trait defining the contract for wager service operations.
///
/// Every mutation keeps the wager's generated ledger entry in sync: at any
/// point a wager owns exactly zero or one entry, reflecting its current
/// result, stake and payout.
#[async_trait::async_trait]
pub trait WagerServiceTrait: Send + Sync {
    fn get_wager(&self, wager_id: &str) -> Result<Wager>;
    fn list_wagers(&self, user_id: &str) -> Result<Vec<Wager>>;

    async fn create_wager(&self, new_wager: NewWager) -> Result<Wager>;
    async fn update_wager(&self, wager_update: WagerUpdate) -> Result<Wager>;
    async fn set_wager_result(
        &self,
        user_id: &str,
        wager_id: &str,
        result: WagerResult,
        payout: Option<Decimal>,
    ) -> Result<Wager>;
    async fn delete_wager(&self, user_id: &str, wager_id: &str) -> Result<()>;
}

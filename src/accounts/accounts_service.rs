use log::debug;
use std::sync::Arc;

use super::accounts_model::{Account, AccountUpdate, NewAccount};
use super::accounts_traits::{AccountRepositoryTrait, AccountServiceTrait};
use crate::errors::Result;

/// Service for managing accounts.
///
/// Balances never pass through here: the ledger mutator is the only writer
/// of `Account::balance`.
pub struct AccountService {
    repository: Arc<dyn AccountRepositoryTrait>,
}

impl AccountService {
    pub fn new(repository: Arc<dyn AccountRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait::async_trait]
impl AccountServiceTrait for AccountService {
    async fn create_account(&self, new_account: NewAccount) -> Result<Account> {
        debug!(
            "Creating account '{}' for user {}",
            new_account.name, new_account.user_id
        );
        self.repository.create(new_account)
    }

    async fn update_account(&self, account_update: AccountUpdate) -> Result<Account> {
        self.repository.update(account_update)
    }

    fn get_account(&self, account_id: &str) -> Result<Account> {
        self.repository.get_by_id(account_id)
    }

    fn list_accounts(
        &self,
        user_id: &str,
        is_active_filter: Option<bool>,
        account_ids: Option<&[String]>,
    ) -> Result<Vec<Account>> {
        self.repository.list(user_id, is_active_filter, account_ids)
    }

    fn get_active_accounts(&self, user_id: &str) -> Result<Vec<Account>> {
        self.list_accounts(user_id, Some(true), None)
    }
}

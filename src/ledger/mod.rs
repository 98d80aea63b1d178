//! Ledger module - the single write path for entries and account balances.

mod ledger_errors;
mod ledger_model;
mod ledger_repository;
mod ledger_service;
mod ledger_traits;

pub use ledger_errors::LedgerError;
pub use ledger_model::{
    balance_effects, merge_deltas, reverse_effects, Entry, EntryDB, EntryItemDB, EntryKind,
    EntryUpdate, LineItem, NewEntry, NewLineItem, ENTRY_TYPE_ADJUSTMENT, ENTRY_TYPE_EXPENSE,
    ENTRY_TYPE_INCOME, ENTRY_TYPE_TRANSFER,
};
pub use ledger_repository::LedgerRepository;
pub use ledger_service::LedgerService;
pub use ledger_traits::{LedgerRepositoryTrait, LedgerServiceTrait};

#[cfg(test)]
mod ledger_service_tests;

//! Debts module - payment accumulation independent of account balances.

mod debts_model;
mod debts_repository;
mod debts_service;
mod debts_traits;

pub use debts_model::{
    Debt, DebtDB, DebtPayment, DebtPaymentDB, DebtUpdate, NewDebt, NewDebtPayment,
};
pub use debts_repository::DebtRepository;
pub use debts_service::DebtService;
pub use debts_traits::{DebtRepositoryTrait, DebtServiceTrait};

#[cfg(test)]
mod debts_service_tests;

//! Wagers module - bets whose resolution drives a single generated ledger entry.

mod wagers_model;
mod wagers_repository;
mod wagers_service;
mod wagers_traits;

pub use wagers_model::{
    NewWager, Wager, WagerDB, WagerResult, WagerUpdate, WAGER_RESULT_LOST, WAGER_RESULT_PENDING,
    WAGER_RESULT_WON,
};
pub use wagers_repository::WagerRepository;
pub use wagers_service::WagerService;
pub use wagers_traits::{WagerRepositoryTrait, WagerServiceTrait};

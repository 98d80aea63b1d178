//! Recurring module - templates that materialize ledger entries over time.

mod recurring_model;
mod recurring_repository;
mod recurring_service;
mod recurring_traits;

pub use recurring_model::{
    Frequency, NewRecurringTemplate, RecurringTemplate, RecurringTemplateDB, FREQUENCY_ANNUAL,
    FREQUENCY_BIWEEKLY, FREQUENCY_DAILY, FREQUENCY_MONTHLY, FREQUENCY_WEEKLY,
};
pub use recurring_repository::RecurringRepository;
pub use recurring_service::RecurringService;
pub use recurring_traits::{RecurringRepositoryTrait, RecurringServiceTrait};

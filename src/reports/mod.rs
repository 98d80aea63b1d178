//! Reports module - the read-only aggregation engine.

mod reports_model;
mod reports_service;
mod reports_traits;

pub use reports_model::{
    AccountStat, AntExpenseOverview, AntExpenseSplit, BudgetAlert, CategoryTotal,
    DailyExpensePoint, GoalProgress, HabitCategoryComparison, HabitComparison, MonthlyTrendPoint,
    Report, ReportFilters, ReportPeriod, ReportTotals, Summary,
};
pub use reports_service::ReportsService;
pub use reports_traits::ReportsServiceTrait;

#[cfg(test)]
mod reports_service_tests;

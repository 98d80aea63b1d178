use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::reports_model::{
    AntExpenseOverview, GoalProgress, HabitComparison, Report, ReportFilters, Summary,
};
use crate::Result;

/// Trait defining the contract for report queries. All operations are
/// read-only and safe to run concurrently with mutations.
pub trait ReportsServiceTrait: Send + Sync {
    fn get_report(
        &self,
        user_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        filters: &ReportFilters,
    ) -> Result<Report>;

    fn get_summary(&self, user_id: &str, today: NaiveDate) -> Result<Summary>;

    fn get_ant_expense_overview(&self, user_id: &str, today: NaiveDate)
        -> Result<AntExpenseOverview>;

    fn get_habit_comparison(
        &self,
        user_id: &str,
        pivot: NaiveDate,
        window_days: u32,
    ) -> Result<HabitComparison>;

    fn get_goal_progress(&self, user_id: &str, today: NaiveDate) -> Result<Vec<GoalProgress>>;

    /// Sum of balances across active accounts included in the total.
    fn total_balance(&self, user_id: &str) -> Result<Decimal>;
}

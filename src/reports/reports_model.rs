use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::budgets::{BudgetAlertStatus, BudgetPeriod};
use crate::goals::GoalKind;
use crate::ledger::EntryKind;

/// Optional narrowing applied to every aggregation in a report request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilters {
    pub account_id: Option<String>,
    pub category_id: Option<String>,
    pub kind: Option<EntryKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTotals {
    pub income: Decimal,
    pub expenses: Decimal,
    pub transfers: Decimal,
    pub balance: Decimal,
}

/// Expenses split into "ant" (small habitual) and normal parts.
/// Invariant: `ant + normal == total`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AntExpenseSplit {
    pub ant: Decimal,
    pub normal: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category_id: String,
    pub category_name: String,
    pub total: Decimal,
    pub entry_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountStat {
    pub account_id: String,
    pub account_name: String,
    pub income: Decimal,
    pub expenses: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetAlert {
    pub budget_id: String,
    pub category_id: String,
    pub category_name: String,
    pub period: BudgetPeriod,
    pub limit: Decimal,
    pub spent: Decimal,
    pub percentage: Decimal,
    pub status: BudgetAlertStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrendPoint {
    pub year: i32,
    pub month: u32,
    pub income: Decimal,
    pub expenses: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyExpensePoint {
    pub date: NaiveDate,
    pub total: Decimal,
}

/// The full aggregation bundle for one report request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub period: ReportPeriod,
    pub totals: ReportTotals,
    pub ant_expenses: AntExpenseSplit,
    pub by_category: Vec<CategoryTotal>,
    pub by_account: Vec<AccountStat>,
    pub budget_alerts: Vec<BudgetAlert>,
    pub monthly_trend: Vec<MonthlyTrendPoint>,
    pub daily_expenses: Vec<DailyExpensePoint>,
}

/// Dashboard header figures for the current month.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_balance: Decimal,
    pub accounts_count: usize,
    pub month: ReportTotals,
    pub ant_expenses: AntExpenseSplit,
    pub budget_alerts: Vec<BudgetAlert>,
}

/// Month-over-month view of ant expenses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AntExpenseOverview {
    pub current_month_total: Decimal,
    pub current_month_count: usize,
    pub previous_month_total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitCategoryComparison {
    pub category_id: Option<String>,
    pub category_name: String,
    pub before: Decimal,
    pub after: Decimal,
    pub savings: Decimal,
    pub savings_percentage: Decimal,
}

/// Spending before vs after a pivot date over symmetric windows of
/// `window_days`, per category and overall.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitComparison {
    pub pivot: NaiveDate,
    pub window_days: u32,
    pub total_before: Decimal,
    pub total_after: Decimal,
    pub savings: Decimal,
    pub savings_percentage: Decimal,
    pub by_category: Vec<HabitCategoryComparison>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub goal_id: String,
    pub name: String,
    pub kind: GoalKind,
    pub target_amount: Decimal,
    pub achieved_amount: Decimal,
    pub progress_percentage: Decimal,
    pub days_remaining: i64,
    pub is_completed: bool,
}

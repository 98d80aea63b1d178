use chrono::{Datelike, Days, NaiveDate};
use log::error;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::accounts::AccountRepositoryTrait;
use crate::budgets::{BudgetAlertStatus, BudgetPeriod, BudgetRepositoryTrait};
use crate::categories::{CategoryRepositoryTrait, CategoryScope};
use crate::errors::Result;
use crate::goals::{GoalKind, GoalRepositoryTrait};
use crate::ledger::{Entry, EntryKind, LedgerRepositoryTrait};

use super::reports_model::{
    AccountStat, AntExpenseOverview, AntExpenseSplit, BudgetAlert, CategoryTotal,
    DailyExpensePoint, GoalProgress, HabitCategoryComparison, HabitComparison, MonthlyTrendPoint,
    Report, ReportFilters, ReportPeriod, ReportTotals, Summary,
};
use super::reports_traits::ReportsServiceTrait;

const TREND_POINT_CAP: usize = 12;

/// Read-only aggregation engine over the ledger and account store.
///
/// Sub-aggregations degrade independently: a failed piece is logged and
/// replaced with its zero/empty value so the report as a whole still
/// answers. Mutation paths never do this.
pub struct ReportsService {
    ledger_repository: Arc<dyn LedgerRepositoryTrait>,
    account_repository: Arc<dyn AccountRepositoryTrait>,
    category_repository: Arc<dyn CategoryRepositoryTrait>,
    budget_repository: Arc<dyn BudgetRepositoryTrait>,
    goal_repository: Arc<dyn GoalRepositoryTrait>,
}

impl ReportsService {
    pub fn new(
        ledger_repository: Arc<dyn LedgerRepositoryTrait>,
        account_repository: Arc<dyn AccountRepositoryTrait>,
        category_repository: Arc<dyn CategoryRepositoryTrait>,
        budget_repository: Arc<dyn BudgetRepositoryTrait>,
        goal_repository: Arc<dyn GoalRepositoryTrait>,
    ) -> Self {
        Self {
            ledger_repository,
            account_repository,
            category_repository,
            budget_repository,
            goal_repository,
        }
    }

    fn degrade<T: Default>(what: &str, result: Result<T>) -> T {
        result.unwrap_or_else(|e| {
            error!("Report sub-aggregation '{}' failed: {}", what, e);
            T::default()
        })
    }

    fn apply_filters(&self, entries: Vec<Entry>, filters: &ReportFilters) -> Vec<Entry> {
        let category_subtree: Option<Vec<String>> = filters.category_id.as_deref().map(|id| {
            Self::degrade(
                "category filter",
                self.category_repository.get_with_children(id),
            )
        });

        entries
            .into_iter()
            .filter(|entry| {
                if let Some(account_id) = filters.account_id.as_deref() {
                    if entry.account_id != account_id
                        && entry.destination_account_id.as_deref() != Some(account_id)
                    {
                        return false;
                    }
                }
                if let Some(kind) = filters.kind {
                    if entry.kind != kind {
                        return false;
                    }
                }
                if let Some(ids) = &category_subtree {
                    let entry_match = entry
                        .category_id
                        .as_ref()
                        .is_some_and(|id| ids.contains(id));
                    let item_match = entry
                        .line_items
                        .iter()
                        .any(|item| item.category_id.as_ref().is_some_and(|id| ids.contains(id)));
                    if !entry_match && !item_match {
                        return false;
                    }
                }
                true
            })
            .collect()
    }

    fn category_names(&self, user_id: &str) -> HashMap<String, String> {
        let scope = CategoryScope::new(user_id);
        Self::degrade("category names", self.category_repository.list_visible(&scope))
            .into_iter()
            .map(|category| (category.id, category.name))
            .collect()
    }

    fn budget_alerts(&self, user_id: &str, today: NaiveDate) -> Result<Vec<BudgetAlert>> {
        let budgets = self.budget_repository.list_active(user_id)?;
        let names = self.category_names(user_id);

        let mut alerts = Vec::new();
        for budget in budgets {
            let (start, end) = budget.period.window(today);
            let entries = Self::degrade(
                "budget window entries",
                self.ledger_repository
                    .get_entries_in_range(user_id, start, end),
            );
            let subtree = Self::degrade(
                "budget category subtree",
                self.category_repository.get_with_children(&budget.category_id),
            );

            let spent = category_spent(&entries, &subtree);
            let status = budget.alert_status(spent);
            if status == BudgetAlertStatus::Ok {
                continue;
            }

            alerts.push(BudgetAlert {
                budget_id: budget.id.clone(),
                category_name: names
                    .get(&budget.category_id)
                    .cloned()
                    .unwrap_or_else(|| budget.category_id.clone()),
                period: budget.period,
                limit: budget.amount_limit,
                spent,
                percentage: budget.percentage_used(spent),
                status,
                category_id: budget.category_id,
            });
        }
        Ok(alerts)
    }

    fn month_entries(&self, user_id: &str, today: NaiveDate) -> Result<Vec<Entry>> {
        let (start, end) = BudgetPeriod::Monthly.window(today);
        self.ledger_repository
            .get_entries_in_range(user_id, start, end)
    }
}

impl ReportsServiceTrait for ReportsService {
    fn get_report(
        &self,
        user_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        filters: &ReportFilters,
    ) -> Result<Report> {
        let entries = Self::degrade(
            "report entries",
            self.ledger_repository
                .get_entries_in_range(user_id, start_date, end_date),
        );
        let entries = self.apply_filters(entries, filters);

        let names = self.category_names(user_id);
        let accounts = Self::degrade(
            "report accounts",
            self.account_repository.list(user_id, Some(true), None),
        );

        let by_account = accounts
            .iter()
            .filter(|account| {
                filters
                    .account_id
                    .as_deref()
                    .is_none_or(|id| account.id == id)
            })
            .map(|account| {
                let restricted: Vec<&Entry> = entries
                    .iter()
                    .filter(|e| e.account_id == account.id)
                    .collect();
                AccountStat {
                    account_id: account.id.clone(),
                    account_name: account.name.clone(),
                    income: restricted
                        .iter()
                        .filter(|e| e.kind == EntryKind::Income)
                        .map(|e| e.amount)
                        .sum(),
                    expenses: restricted
                        .iter()
                        .filter(|e| e.kind == EntryKind::Expense)
                        .map(|e| e.amount)
                        .sum(),
                }
            })
            .collect();

        Ok(Report {
            period: ReportPeriod {
                start: start_date,
                end: end_date,
            },
            totals: totals(&entries),
            ant_expenses: ant_split(&entries),
            by_category: category_rollup(&entries, &names),
            by_account,
            budget_alerts: Self::degrade("budget alerts", self.budget_alerts(user_id, end_date)),
            monthly_trend: monthly_trend(&entries),
            daily_expenses: daily_expenses(&entries, start_date, end_date),
        })
    }

    fn get_summary(&self, user_id: &str, today: NaiveDate) -> Result<Summary> {
        let accounts = Self::degrade(
            "summary accounts",
            self.account_repository.list(user_id, Some(true), None),
        );
        let total_balance = accounts
            .iter()
            .filter(|account| account.include_in_total)
            .map(|account| account.balance)
            .sum();

        let entries = Self::degrade("summary entries", self.month_entries(user_id, today));

        Ok(Summary {
            total_balance,
            accounts_count: accounts.len(),
            month: totals(&entries),
            ant_expenses: ant_split(&entries),
            budget_alerts: Self::degrade("budget alerts", self.budget_alerts(user_id, today)),
        })
    }

    fn get_ant_expense_overview(
        &self,
        user_id: &str,
        today: NaiveDate,
    ) -> Result<AntExpenseOverview> {
        let current = Self::degrade("ant current month", self.month_entries(user_id, today));

        let (month_start, _) = BudgetPeriod::Monthly.window(today);
        let previous_day = month_start - Days::new(1);
        let previous = Self::degrade(
            "ant previous month",
            self.month_entries(user_id, previous_day),
        );

        let current_split = ant_split(&current);
        Ok(AntExpenseOverview {
            current_month_total: current_split.ant,
            current_month_count: current
                .iter()
                .filter(|e| e.kind == EntryKind::Expense && contributes_to_ant(e))
                .count(),
            previous_month_total: ant_split(&previous).ant,
        })
    }

    fn get_habit_comparison(
        &self,
        user_id: &str,
        pivot: NaiveDate,
        window_days: u32,
    ) -> Result<HabitComparison> {
        let window = Days::new(u64::from(window_days));
        let before_start = pivot - window;
        let after_end = pivot + window - Days::new(1);

        let entries = Self::degrade(
            "habit comparison entries",
            self.ledger_repository
                .get_entries_in_range(user_id, before_start, after_end),
        );
        let names = self.category_names(user_id);

        let mut before_by_category: BTreeMap<Option<String>, Decimal> = BTreeMap::new();
        let mut after_by_category: BTreeMap<Option<String>, Decimal> = BTreeMap::new();
        let mut total_before = Decimal::ZERO;
        let mut total_after = Decimal::ZERO;

        for entry in entries.iter().filter(|e| e.kind == EntryKind::Expense) {
            let (bucket, total) = if entry.date < pivot {
                (&mut before_by_category, &mut total_before)
            } else {
                (&mut after_by_category, &mut total_after)
            };
            *bucket.entry(entry.category_id.clone()).or_default() += entry.amount;
            *total += entry.amount;
        }

        let mut keys: Vec<Option<String>> = before_by_category
            .keys()
            .chain(after_by_category.keys())
            .cloned()
            .collect();
        keys.sort();
        keys.dedup();

        let mut by_category: Vec<HabitCategoryComparison> = keys
            .into_iter()
            .map(|category_id| {
                let before = before_by_category
                    .get(&category_id)
                    .copied()
                    .unwrap_or_default();
                let after = after_by_category
                    .get(&category_id)
                    .copied()
                    .unwrap_or_default();
                let savings = before - after;
                HabitCategoryComparison {
                    category_name: category_id
                        .as_ref()
                        .and_then(|id| names.get(id).cloned())
                        .unwrap_or_else(|| "Uncategorized".to_string()),
                    category_id,
                    before,
                    after,
                    savings,
                    savings_percentage: percentage_of(savings, before),
                }
            })
            .collect();
        by_category.sort_by(|a, b| b.savings.cmp(&a.savings));

        let savings = total_before - total_after;
        Ok(HabitComparison {
            pivot,
            window_days,
            total_before,
            total_after,
            savings,
            savings_percentage: percentage_of(savings, total_before),
            by_category,
        })
    }

    fn get_goal_progress(&self, user_id: &str, today: NaiveDate) -> Result<Vec<GoalProgress>> {
        let goals = self.goal_repository.list_active(user_id)?;

        let mut progress = Vec::with_capacity(goals.len());
        for goal in goals {
            let start = goal.created_at.date();
            let end = today.min(goal.target_date);
            let entries = Self::degrade(
                "goal window entries",
                self.ledger_repository
                    .get_entries_in_range(user_id, start, end),
            );

            let achieved = match goal.kind {
                GoalKind::Savings => {
                    let window_totals = totals(&entries);
                    window_totals.income - window_totals.expenses
                }
                GoalKind::CategoryReduction => {
                    let subtree = goal
                        .category_id
                        .as_deref()
                        .map(|id| {
                            Self::degrade(
                                "goal category subtree",
                                self.category_repository.get_with_children(id),
                            )
                        })
                        .unwrap_or_default();
                    let spent = category_spent(&entries, &subtree);
                    goal.baseline_amount.unwrap_or_default() - spent
                }
            };

            let percentage = goal.progress_percentage(achieved);
            progress.push(GoalProgress {
                goal_id: goal.id.clone(),
                name: goal.name.clone(),
                kind: goal.kind,
                target_amount: goal.target_amount,
                achieved_amount: achieved,
                progress_percentage: percentage,
                days_remaining: goal.days_remaining(today),
                is_completed: percentage >= Decimal::ONE_HUNDRED,
            });
        }
        Ok(progress)
    }

    fn total_balance(&self, user_id: &str) -> Result<Decimal> {
        let accounts = self.account_repository.list(user_id, Some(true), None)?;
        Ok(accounts
            .iter()
            .filter(|account| account.include_in_total)
            .map(|account| account.balance)
            .sum())
    }
}

fn percentage_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    (part / whole * Decimal::ONE_HUNDRED).round_dp(1)
}

pub(crate) fn totals(entries: &[Entry]) -> ReportTotals {
    let mut result = ReportTotals::default();
    for entry in entries {
        match entry.kind {
            EntryKind::Income => result.income += entry.amount,
            EntryKind::Expense => result.expenses += entry.amount,
            EntryKind::Transfer => result.transfers += entry.amount,
            // Adjustments reconcile balances; they are neither income nor
            // spending and stay out of the flow totals.
            EntryKind::Adjustment => {}
        }
    }
    result.balance = result.income - result.expenses;
    result
}

fn contributes_to_ant(entry: &Entry) -> bool {
    entry.is_ant_expense || entry.line_items.iter().any(|item| item.is_ant_expense)
}

pub(crate) fn ant_split(entries: &[Entry]) -> AntExpenseSplit {
    let mut split = AntExpenseSplit::default();
    for entry in entries.iter().filter(|e| e.kind == EntryKind::Expense) {
        split.total += entry.amount;
        if entry.line_items.is_empty() {
            if entry.is_ant_expense {
                split.ant += entry.amount;
            } else {
                split.normal += entry.amount;
            }
        } else {
            // Line items partition the entry amount, so splitting per item
            // keeps ant + normal equal to the total.
            for item in &entry.line_items {
                if item.is_ant_expense || entry.is_ant_expense {
                    split.ant += item.total();
                } else {
                    split.normal += item.total();
                }
            }
        }
    }
    split
}

/// Per-category expense rollup without double counting: an entry with line
/// items contributes through them, an entry without contributes directly.
pub(crate) fn category_rollup(
    entries: &[Entry],
    names: &HashMap<String, String>,
) -> Vec<CategoryTotal> {
    let mut buckets: BTreeMap<String, (Decimal, usize)> = BTreeMap::new();

    for entry in entries.iter().filter(|e| e.kind == EntryKind::Expense) {
        if entry.line_items.is_empty() {
            if let Some(category_id) = &entry.category_id {
                let bucket = buckets.entry(category_id.clone()).or_default();
                bucket.0 += entry.amount;
                bucket.1 += 1;
            }
        } else {
            for item in &entry.line_items {
                if let Some(category_id) = &item.category_id {
                    let bucket = buckets.entry(category_id.clone()).or_default();
                    bucket.0 += item.total();
                    bucket.1 += 1;
                }
            }
        }
    }

    let mut rollup: Vec<CategoryTotal> = buckets
        .into_iter()
        .map(|(category_id, (total, entry_count))| CategoryTotal {
            category_name: names
                .get(&category_id)
                .cloned()
                .unwrap_or_else(|| category_id.clone()),
            category_id,
            total,
            entry_count,
        })
        .collect();
    rollup.sort_by(|a, b| b.total.cmp(&a.total));
    rollup
}

/// Expense total attributable to any of the given category ids, using the
/// same entry-or-line-item contribution rule as the rollup.
pub(crate) fn category_spent(entries: &[Entry], category_ids: &[String]) -> Decimal {
    let mut spent = Decimal::ZERO;
    for entry in entries.iter().filter(|e| e.kind == EntryKind::Expense) {
        if entry.line_items.is_empty() {
            if entry
                .category_id
                .as_ref()
                .is_some_and(|id| category_ids.contains(id))
            {
                spent += entry.amount;
            }
        } else {
            for item in &entry.line_items {
                if item
                    .category_id
                    .as_ref()
                    .is_some_and(|id| category_ids.contains(id))
                {
                    spent += item.total();
                }
            }
        }
    }
    spent
}

pub(crate) fn monthly_trend(entries: &[Entry]) -> Vec<MonthlyTrendPoint> {
    let mut buckets: BTreeMap<(i32, u32), (Decimal, Decimal)> = BTreeMap::new();
    for entry in entries {
        let key = (entry.date.year(), entry.date.month());
        let bucket = buckets.entry(key).or_default();
        match entry.kind {
            EntryKind::Income => bucket.0 += entry.amount,
            EntryKind::Expense => bucket.1 += entry.amount,
            _ => {}
        }
    }

    let points: Vec<MonthlyTrendPoint> = buckets
        .into_iter()
        .map(|((year, month), (income, expenses))| MonthlyTrendPoint {
            year,
            month,
            income,
            expenses,
        })
        .collect();

    // Most recent 12 months only.
    let skip = points.len().saturating_sub(TREND_POINT_CAP);
    points.into_iter().skip(skip).collect()
}

pub(crate) fn daily_expenses(
    entries: &[Entry],
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Vec<DailyExpensePoint> {
    let mut buckets: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    let mut day = start_date;
    while day <= end_date {
        buckets.insert(day, Decimal::ZERO);
        day = day + Days::new(1);
    }

    for entry in entries.iter().filter(|e| e.kind == EntryKind::Expense) {
        if let Some(total) = buckets.get_mut(&entry.date) {
            *total += entry.amount;
        }
    }

    buckets
        .into_iter()
        .map(|(date, total)| DailyExpensePoint { date, total })
        .collect()
}

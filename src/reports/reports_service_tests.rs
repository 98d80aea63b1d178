use crate::accounts::{Account, AccountRepositoryTrait, AccountUpdate, NewAccount};
use crate::budgets::{Budget, BudgetPeriod, BudgetRepositoryTrait, NewBudget};
use crate::categories::{Category, CategoryKind, CategoryRepositoryTrait, CategoryScope};
use crate::errors::{DatabaseError, Error, Result};
use crate::goals::{Goal, GoalKind, GoalRepositoryTrait, NewGoal};
use crate::ledger::{
    Entry, EntryKind, EntryUpdate, LedgerRepositoryTrait, LineItem, NewEntry,
};
use crate::reports::{ReportFilters, ReportsService, ReportsServiceTrait};
use chrono::NaiveDate;
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::{Arc, Mutex};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// --- Mock LedgerRepository ---
#[derive(Clone)]
struct MockLedgerRepository {
    entries: Arc<Mutex<Vec<Entry>>>,
    fail_reads: bool,
}

impl MockLedgerRepository {
    fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
            fail_reads: false,
        }
    }

    fn failing() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
            fail_reads: true,
        }
    }

    fn add(&self, entry: Entry) {
        self.entries.lock().unwrap().push(entry);
    }
}

impl LedgerRepositoryTrait for MockLedgerRepository {
    fn get_entry(&self, _entry_id: &str) -> Result<Entry> {
        unimplemented!()
    }

    fn get_entries_in_range(
        &self,
        user_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Entry>> {
        if self.fail_reads {
            return Err(Error::Database(DatabaseError::QueryFailed(
                "simulated read failure".to_string(),
            )));
        }
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.user_id == user_id && e.date >= start_date && e.date <= end_date)
            .cloned()
            .collect())
    }

    fn get_entries_for_wager(&self, _wager_id: &str) -> Result<Vec<Entry>> {
        unimplemented!()
    }

    fn get_entry_in_transaction(
        &self,
        _entry_id: &str,
        _conn: &mut SqliteConnection,
    ) -> Result<Entry> {
        unimplemented!()
    }

    fn create_in_transaction(
        &self,
        _new_entry: NewEntry,
        _conn: &mut SqliteConnection,
    ) -> Result<Entry> {
        unimplemented!()
    }

    fn update_in_transaction(
        &self,
        _entry_update: EntryUpdate,
        _conn: &mut SqliteConnection,
    ) -> Result<Entry> {
        unimplemented!()
    }

    fn delete_in_transaction(
        &self,
        _entry_id: &str,
        _conn: &mut SqliteConnection,
    ) -> Result<Entry> {
        unimplemented!()
    }
}

// --- Mock AccountRepository ---
#[derive(Clone)]
struct MockAccountRepository {
    accounts: Arc<Mutex<Vec<Account>>>,
}

impl MockAccountRepository {
    fn new() -> Self {
        Self {
            accounts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn add(&self, account: Account) {
        self.accounts.lock().unwrap().push(account);
    }
}

impl AccountRepositoryTrait for MockAccountRepository {
    fn create(&self, _new_account: NewAccount) -> Result<Account> {
        unimplemented!()
    }

    fn update(&self, _account_update: AccountUpdate) -> Result<Account> {
        unimplemented!()
    }

    fn get_by_id(&self, account_id: &str) -> Result<Account> {
        self.accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == account_id)
            .cloned()
            .ok_or_else(|| {
                Error::Database(DatabaseError::NotFound("Account not found".to_string()))
            })
    }

    fn list(
        &self,
        user_id: &str,
        _is_active_filter: Option<bool>,
        _account_ids: Option<&[String]>,
    ) -> Result<Vec<Account>> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }

    fn apply_balance_deltas_in_transaction(
        &self,
        _deltas: &[(String, Decimal)],
        _conn: &mut SqliteConnection,
    ) -> Result<()> {
        unimplemented!()
    }
}

// --- Mock CategoryRepository ---
#[derive(Clone)]
struct MockCategoryRepository {
    categories: Arc<Mutex<Vec<Category>>>,
}

impl MockCategoryRepository {
    fn new() -> Self {
        Self {
            categories: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn add(&self, id: &str, name: &str, parent_id: Option<&str>) {
        self.categories.lock().unwrap().push(Category {
            id: id.to_string(),
            user_id: None,
            name: name.to_string(),
            kind: CategoryKind::Expense,
            parent_id: parent_id.map(str::to_string),
            is_default: true,
            created_at: chrono::Utc::now().naive_utc(),
        });
    }
}

impl CategoryRepositoryTrait for MockCategoryRepository {
    fn get_by_id(&self, category_id: &str) -> Result<Category> {
        self.categories
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == category_id)
            .cloned()
            .ok_or_else(|| {
                Error::Database(DatabaseError::NotFound("Category not found".to_string()))
            })
    }

    fn list_visible(&self, scope: &CategoryScope) -> Result<Vec<Category>> {
        Ok(self
            .categories
            .lock()
            .unwrap()
            .iter()
            .filter(|c| scope.visible(c))
            .cloned()
            .collect())
    }

    fn get_with_children(&self, category_id: &str) -> Result<Vec<String>> {
        let categories = self.categories.lock().unwrap();
        let mut ids = vec![category_id.to_string()];
        ids.extend(
            categories
                .iter()
                .filter(|c| c.parent_id.as_deref() == Some(category_id))
                .map(|c| c.id.clone()),
        );
        Ok(ids)
    }
}

// --- Mock BudgetRepository ---
#[derive(Clone)]
struct MockBudgetRepository {
    budgets: Arc<Mutex<Vec<Budget>>>,
}

impl MockBudgetRepository {
    fn new() -> Self {
        Self {
            budgets: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn add(&self, budget: Budget) {
        self.budgets.lock().unwrap().push(budget);
    }
}

impl BudgetRepositoryTrait for MockBudgetRepository {
    fn create(&self, _new_budget: NewBudget) -> Result<Budget> {
        unimplemented!()
    }

    fn delete(&self, _budget_id: &str) -> Result<()> {
        unimplemented!()
    }

    fn get_by_id(&self, _budget_id: &str) -> Result<Budget> {
        unimplemented!()
    }

    fn list_active(&self, user_id: &str) -> Result<Vec<Budget>> {
        Ok(self
            .budgets
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.user_id == user_id && b.is_active)
            .cloned()
            .collect())
    }

    fn set_active(&self, _budget_id: &str, _active: bool) -> Result<()> {
        unimplemented!()
    }
}

// --- Mock GoalRepository ---
#[derive(Clone)]
struct MockGoalRepository {
    goals: Arc<Mutex<Vec<Goal>>>,
}

impl MockGoalRepository {
    fn new() -> Self {
        Self {
            goals: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn add(&self, goal: Goal) {
        self.goals.lock().unwrap().push(goal);
    }
}

impl GoalRepositoryTrait for MockGoalRepository {
    fn create(&self, _new_goal: NewGoal) -> Result<Goal> {
        unimplemented!()
    }

    fn delete(&self, _goal_id: &str) -> Result<()> {
        unimplemented!()
    }

    fn get_by_id(&self, _goal_id: &str) -> Result<Goal> {
        unimplemented!()
    }

    fn list_active(&self, user_id: &str) -> Result<Vec<Goal>> {
        Ok(self
            .goals
            .lock()
            .unwrap()
            .iter()
            .filter(|g| g.user_id == user_id && g.is_active)
            .cloned()
            .collect())
    }
}

struct Fixture {
    ledger: MockLedgerRepository,
    accounts: MockAccountRepository,
    categories: MockCategoryRepository,
    budgets: MockBudgetRepository,
    goals: MockGoalRepository,
}

impl Fixture {
    fn new() -> Self {
        Self {
            ledger: MockLedgerRepository::new(),
            accounts: MockAccountRepository::new(),
            categories: MockCategoryRepository::new(),
            budgets: MockBudgetRepository::new(),
            goals: MockGoalRepository::new(),
        }
    }

    fn service(&self) -> ReportsService {
        ReportsService::new(
            Arc::new(self.ledger.clone()),
            Arc::new(self.accounts.clone()),
            Arc::new(self.categories.clone()),
            Arc::new(self.budgets.clone()),
            Arc::new(self.goals.clone()),
        )
    }
}

fn entry(
    kind: EntryKind,
    amount: Decimal,
    date: NaiveDate,
    account_id: &str,
    category_id: Option<&str>,
) -> Entry {
    let now = chrono::Utc::now().naive_utc();
    Entry {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: "user-1".to_string(),
        kind,
        amount,
        description: String::new(),
        date,
        account_id: account_id.to_string(),
        destination_account_id: None,
        category_id: category_id.map(str::to_string),
        wager_id: None,
        is_recurring: false,
        is_ant_expense: false,
        line_items: vec![],
        created_at: now,
        updated_at: now,
    }
}

fn line_item(entry_id: &str, amount: Decimal, quantity: i32, category: Option<&str>, ant: bool) -> LineItem {
    LineItem {
        id: uuid::Uuid::new_v4().to_string(),
        entry_id: entry_id.to_string(),
        name: "item".to_string(),
        amount,
        quantity,
        category_id: category.map(str::to_string),
        is_ant_expense: ant,
    }
}

fn account(id: &str, balance: Decimal, include_in_total: bool) -> Account {
    Account {
        id: id.to_string(),
        user_id: "user-1".to_string(),
        name: id.to_string(),
        account_type: "bank".to_string(),
        balance,
        currency: "CLP".to_string(),
        include_in_total,
        is_active: true,
        created_at: chrono::Utc::now().naive_utc(),
        updated_at: chrono::Utc::now().naive_utc(),
    }
}

#[test]
fn test_totals_are_filter_consistent() {
    let fixture = Fixture::new();
    fixture.accounts.add(account("acc-1", dec!(0), true));
    fixture
        .ledger
        .add(entry(EntryKind::Income, dec!(1000), day(2025, 3, 5), "acc-1", None));
    fixture
        .ledger
        .add(entry(EntryKind::Expense, dec!(400), day(2025, 3, 6), "acc-1", None));
    fixture
        .ledger
        .add(entry(EntryKind::Adjustment, dec!(-50), day(2025, 3, 7), "acc-1", None));

    let report = fixture
        .service()
        .get_report("user-1", day(2025, 3, 1), day(2025, 3, 31), &ReportFilters::default())
        .unwrap();

    assert_eq!(report.totals.income, dec!(1000));
    assert_eq!(report.totals.expenses, dec!(400));
    assert_eq!(report.totals.balance, report.totals.income - report.totals.expenses);
    // Adjustments stay out of flow totals.
    assert_eq!(report.totals.balance, dec!(600));
}

#[test]
fn test_ant_plus_normal_equals_total_expenses() {
    let fixture = Fixture::new();
    let mut flagged = entry(EntryKind::Expense, dec!(300), day(2025, 3, 5), "acc-1", None);
    flagged.is_ant_expense = true;
    fixture.ledger.add(flagged);

    let mut itemized = entry(EntryKind::Expense, dec!(100), day(2025, 3, 6), "acc-1", None);
    itemized.line_items = vec![
        line_item(&itemized.id, dec!(30), 1, None, true),
        line_item(&itemized.id, dec!(35), 2, None, false),
    ];
    fixture.ledger.add(itemized);

    let report = fixture
        .service()
        .get_report("user-1", day(2025, 3, 1), day(2025, 3, 31), &ReportFilters::default())
        .unwrap();

    assert_eq!(report.ant_expenses.ant, dec!(330));
    assert_eq!(report.ant_expenses.normal, dec!(70));
    assert_eq!(
        report.ant_expenses.ant + report.ant_expenses.normal,
        report.totals.expenses
    );
}

#[test]
fn test_category_rollup_never_double_counts() {
    let fixture = Fixture::new();
    fixture.categories.add("cat-food", "Food", None);
    fixture.categories.add("cat-fun", "Fun", None);

    // Entry with line items: only the items count, not the entry total.
    let mut itemized = entry(
        EntryKind::Expense,
        dec!(100),
        day(2025, 3, 5),
        "acc-1",
        Some("cat-food"),
    );
    itemized.line_items = vec![
        line_item(&itemized.id, dec!(60), 1, Some("cat-food"), false),
        line_item(&itemized.id, dec!(40), 1, Some("cat-fun"), false),
    ];
    fixture.ledger.add(itemized);

    fixture.ledger.add(entry(
        EntryKind::Expense,
        dec!(25),
        day(2025, 3, 6),
        "acc-1",
        Some("cat-fun"),
    ));

    let report = fixture
        .service()
        .get_report("user-1", day(2025, 3, 1), day(2025, 3, 31), &ReportFilters::default())
        .unwrap();

    let rollup_total: Decimal = report.by_category.iter().map(|c| c.total).sum();
    assert_eq!(rollup_total, dec!(125));

    let fun = report
        .by_category
        .iter()
        .find(|c| c.category_id == "cat-fun")
        .unwrap();
    assert_eq!(fun.total, dec!(65));
    assert_eq!(fun.category_name, "Fun");
}

#[test]
fn test_budget_alert_thresholds() {
    let fixture = Fixture::new();
    fixture.categories.add("cat-food", "Food", None);
    fixture.budgets.add(Budget {
        id: "budget-1".to_string(),
        user_id: "user-1".to_string(),
        category_id: "cat-food".to_string(),
        amount_limit: dec!(100000),
        period: BudgetPeriod::Monthly,
        alert_threshold: 80,
        is_active: true,
        created_at: chrono::Utc::now().naive_utc(),
    });

    fixture.ledger.add(entry(
        EntryKind::Expense,
        dec!(85000),
        day(2025, 3, 10),
        "acc-1",
        Some("cat-food"),
    ));

    let summary = fixture.service().get_summary("user-1", day(2025, 3, 15)).unwrap();
    assert_eq!(summary.budget_alerts.len(), 1);
    assert_eq!(
        summary.budget_alerts[0].status,
        crate::budgets::BudgetAlertStatus::Warning
    );

    // Push past the limit.
    fixture.ledger.add(entry(
        EntryKind::Expense,
        dec!(15001),
        day(2025, 3, 11),
        "acc-1",
        Some("cat-food"),
    ));
    let summary = fixture.service().get_summary("user-1", day(2025, 3, 15)).unwrap();
    assert_eq!(
        summary.budget_alerts[0].status,
        crate::budgets::BudgetAlertStatus::Exceeded
    );
}

#[test]
fn test_budget_just_under_threshold_raises_no_alert() {
    let fixture = Fixture::new();
    fixture.categories.add("cat-food", "Food", None);
    fixture.budgets.add(Budget {
        id: "budget-1".to_string(),
        user_id: "user-1".to_string(),
        category_id: "cat-food".to_string(),
        amount_limit: dec!(100000),
        period: BudgetPeriod::Monthly,
        alert_threshold: 80,
        is_active: true,
        created_at: chrono::Utc::now().naive_utc(),
    });

    // 79.999% of the limit: under the threshold, even though it rounds to 80.0.
    fixture.ledger.add(entry(
        EntryKind::Expense,
        dec!(79999),
        day(2025, 3, 10),
        "acc-1",
        Some("cat-food"),
    ));

    let summary = fixture.service().get_summary("user-1", day(2025, 3, 15)).unwrap();
    assert!(summary.budget_alerts.is_empty());
}

#[test]
fn test_monthly_trend_caps_at_twelve_points() {
    let fixture = Fixture::new();
    for month_offset in 0..15 {
        let year = 2024 + month_offset / 12;
        let month = 1 + (month_offset % 12) as u32;
        fixture.ledger.add(entry(
            EntryKind::Expense,
            dec!(10),
            day(year, month, 5),
            "acc-1",
            None,
        ));
    }

    let report = fixture
        .service()
        .get_report("user-1", day(2024, 1, 1), day(2025, 3, 31), &ReportFilters::default())
        .unwrap();

    assert_eq!(report.monthly_trend.len(), 12);
    // Oldest points are dropped first.
    assert_eq!(report.monthly_trend[0].year, 2024);
    assert_eq!(report.monthly_trend[0].month, 4);
    assert_eq!(report.monthly_trend[11].year, 2025);
    assert_eq!(report.monthly_trend[11].month, 3);
}

#[test]
fn test_daily_series_has_one_point_per_day() {
    let fixture = Fixture::new();
    fixture
        .ledger
        .add(entry(EntryKind::Expense, dec!(10), day(2025, 3, 2), "acc-1", None));

    let report = fixture
        .service()
        .get_report("user-1", day(2025, 3, 1), day(2025, 3, 7), &ReportFilters::default())
        .unwrap();

    assert_eq!(report.daily_expenses.len(), 7);
    assert_eq!(report.daily_expenses[0].total, dec!(0));
    assert_eq!(report.daily_expenses[1].total, dec!(10));
}

#[test]
fn test_account_filter_narrows_every_aggregation() {
    let fixture = Fixture::new();
    fixture.accounts.add(account("acc-1", dec!(0), true));
    fixture.accounts.add(account("acc-2", dec!(0), true));
    fixture
        .ledger
        .add(entry(EntryKind::Expense, dec!(100), day(2025, 3, 5), "acc-1", None));
    fixture
        .ledger
        .add(entry(EntryKind::Expense, dec!(40), day(2025, 3, 5), "acc-2", None));

    let filters = ReportFilters {
        account_id: Some("acc-1".to_string()),
        ..Default::default()
    };
    let report = fixture
        .service()
        .get_report("user-1", day(2025, 3, 1), day(2025, 3, 31), &filters)
        .unwrap();

    assert_eq!(report.totals.expenses, dec!(100));
    assert_eq!(report.by_account.len(), 1);
    assert_eq!(report.by_account[0].account_id, "acc-1");
}

#[test]
fn test_failed_sub_aggregation_degrades_to_empty() {
    let fixture = Fixture {
        ledger: MockLedgerRepository::failing(),
        accounts: MockAccountRepository::new(),
        categories: MockCategoryRepository::new(),
        budgets: MockBudgetRepository::new(),
        goals: MockGoalRepository::new(),
    };
    fixture.accounts.add(account("acc-1", dec!(5000), true));

    // The report still answers, with zeroed figures where reads failed.
    let report = fixture
        .service()
        .get_report("user-1", day(2025, 3, 1), day(2025, 3, 31), &ReportFilters::default())
        .unwrap();
    assert_eq!(report.totals.income, dec!(0));
    assert!(report.by_category.is_empty());

    // Account-store reads still work and are unaffected.
    let summary = fixture.service().get_summary("user-1", day(2025, 3, 15)).unwrap();
    assert_eq!(summary.total_balance, dec!(5000));
}

#[test]
fn test_total_balance_respects_include_flag() {
    let fixture = Fixture::new();
    fixture.accounts.add(account("acc-1", dec!(1000), true));
    fixture.accounts.add(account("acc-2", dec!(999), false));

    assert_eq!(fixture.service().total_balance("user-1").unwrap(), dec!(1000));
}

#[test]
fn test_habit_comparison_sorts_by_savings() {
    let fixture = Fixture::new();
    fixture.categories.add("cat-bets", "Bets", None);
    fixture.categories.add("cat-food", "Food", None);

    let pivot = day(2025, 3, 10);
    // Before the pivot: heavy betting, some food.
    fixture.ledger.add(entry(
        EntryKind::Expense,
        dec!(50000),
        day(2025, 3, 5),
        "acc-1",
        Some("cat-bets"),
    ));
    fixture.ledger.add(entry(
        EntryKind::Expense,
        dec!(10000),
        day(2025, 3, 6),
        "acc-1",
        Some("cat-food"),
    ));
    // After: betting stopped, food unchanged.
    fixture.ledger.add(entry(
        EntryKind::Expense,
        dec!(10000),
        day(2025, 3, 12),
        "acc-1",
        Some("cat-food"),
    ));

    let comparison = fixture
        .service()
        .get_habit_comparison("user-1", pivot, 7)
        .unwrap();

    assert_eq!(comparison.total_before, dec!(60000));
    assert_eq!(comparison.total_after, dec!(10000));
    assert_eq!(comparison.savings, dec!(50000));
    assert_eq!(comparison.savings_percentage, dec!(83.3));

    assert_eq!(comparison.by_category[0].category_name, "Bets");
    assert_eq!(comparison.by_category[0].savings, dec!(50000));
    assert_eq!(comparison.by_category[0].savings_percentage, dec!(100));
    assert_eq!(comparison.by_category[1].savings, dec!(0));
}

#[test]
fn test_goal_progress_for_savings_and_reduction() {
    let fixture = Fixture::new();
    fixture.categories.add("cat-bets", "Bets", None);

    let created = day(2025, 1, 1).and_hms_opt(0, 0, 0).unwrap();
    fixture.goals.add(Goal {
        id: "goal-1".to_string(),
        user_id: "user-1".to_string(),
        name: "save up".to_string(),
        kind: GoalKind::Savings,
        target_amount: dec!(100000),
        target_date: day(2025, 12, 31),
        category_id: None,
        baseline_amount: None,
        is_active: true,
        created_at: created,
    });
    fixture.goals.add(Goal {
        id: "goal-2".to_string(),
        user_id: "user-1".to_string(),
        name: "bet less".to_string(),
        kind: GoalKind::CategoryReduction,
        target_amount: dec!(40000),
        target_date: day(2025, 12, 31),
        category_id: Some("cat-bets".to_string()),
        baseline_amount: Some(dec!(50000)),
        is_active: true,
        created_at: created,
    });

    fixture
        .ledger
        .add(entry(EntryKind::Income, dec!(80000), day(2025, 2, 1), "acc-1", None));
    fixture
        .ledger
        .add(entry(EntryKind::Expense, dec!(30000), day(2025, 2, 10), "acc-1", None));
    fixture.ledger.add(entry(
        EntryKind::Expense,
        dec!(10000),
        day(2025, 2, 15),
        "acc-1",
        Some("cat-bets"),
    ));

    let progress = fixture
        .service()
        .get_goal_progress("user-1", day(2025, 3, 1))
        .unwrap();

    let savings = progress.iter().find(|p| p.goal_id == "goal-1").unwrap();
    assert_eq!(savings.achieved_amount, dec!(40000));
    assert_eq!(savings.progress_percentage, dec!(40));
    assert!(!savings.is_completed);

    let reduction = progress.iter().find(|p| p.goal_id == "goal-2").unwrap();
    assert_eq!(reduction.achieved_amount, dec!(40000));
    assert_eq!(reduction.progress_percentage, dec!(100));
    assert!(reduction.is_completed);
}

#[test]
fn test_ant_overview_compares_consecutive_months() {
    let fixture = Fixture::new();
    let mut current = entry(EntryKind::Expense, dec!(3000), day(2025, 3, 8), "acc-1", None);
    current.is_ant_expense = true;
    fixture.ledger.add(current);

    let mut previous = entry(EntryKind::Expense, dec!(9000), day(2025, 2, 20), "acc-1", None);
    previous.is_ant_expense = true;
    fixture.ledger.add(previous);

    let overview = fixture
        .service()
        .get_ant_expense_overview("user-1", day(2025, 3, 15))
        .unwrap();

    assert_eq!(overview.current_month_total, dec!(3000));
    assert_eq!(overview.current_month_count, 1);
    assert_eq!(overview.previous_month_total, dec!(9000));
}

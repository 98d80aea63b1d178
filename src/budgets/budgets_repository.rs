use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use crate::db::get_connection;
use crate::errors::{DatabaseError, Error, Result};
use crate::schema::budgets;

use super::budgets_model::{Budget, BudgetDB, NewBudget};
use super::budgets_traits::BudgetRepositoryTrait;

/// Repository for managing budget data in the database
pub struct BudgetRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl BudgetRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }
}

impl BudgetRepositoryTrait for BudgetRepository {
    fn create(&self, new_budget: NewBudget) -> Result<Budget> {
        new_budget.validate()?;
        let budget_db: BudgetDB = new_budget.into();

        let mut conn = get_connection(&self.pool)?;
        diesel::insert_into(budgets::table)
            .values(&budget_db)
            .execute(&mut conn)?;

        Ok(budget_db.into())
    }

    fn delete(&self, budget_id: &str) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        diesel::delete(budgets::table.find(budget_id)).execute(&mut conn)?;
        Ok(())
    }

    fn get_by_id(&self, budget_id: &str) -> Result<Budget> {
        let mut conn = get_connection(&self.pool)?;

        let budget = budgets::table
            .select(BudgetDB::as_select())
            .find(budget_id)
            .first::<BudgetDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => Error::Database(DatabaseError::NotFound(
                    format!("Budget {} not found", budget_id),
                )),
                other => other.into(),
            })?;

        Ok(budget.into())
    }

    fn list_active(&self, user_id: &str) -> Result<Vec<Budget>> {
        let mut conn = get_connection(&self.pool)?;

        let results = budgets::table
            .filter(budgets::user_id.eq(user_id))
            .filter(budgets::is_active.eq(true))
            .select(BudgetDB::as_select())
            .order(budgets::created_at.desc())
            .load::<BudgetDB>(&mut conn)?;

        Ok(results.into_iter().map(Budget::from).collect())
    }

    fn set_active(&self, budget_id: &str, active: bool) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        diesel::update(budgets::table.find(budget_id))
            .set(budgets::is_active.eq(active))
            .execute(&mut conn)?;
        Ok(())
    }
}

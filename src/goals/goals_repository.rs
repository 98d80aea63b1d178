use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use crate::db::get_connection;
use crate::errors::{DatabaseError, Error, Result};
use crate::schema::goals;

use super::goals_model::{Goal, GoalDB, NewGoal};
use super::goals_traits::GoalRepositoryTrait;

/// Repository for managing goal data in the database
pub struct GoalRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl GoalRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }
}

impl GoalRepositoryTrait for GoalRepository {
    fn create(&self, new_goal: NewGoal) -> Result<Goal> {
        new_goal.validate()?;
        let goal_db: GoalDB = new_goal.into();

        let mut conn = get_connection(&self.pool)?;
        diesel::insert_into(goals::table)
            .values(&goal_db)
            .execute(&mut conn)?;

        Ok(goal_db.into())
    }

    fn delete(&self, goal_id: &str) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        diesel::delete(goals::table.find(goal_id)).execute(&mut conn)?;
        Ok(())
    }

    fn get_by_id(&self, goal_id: &str) -> Result<Goal> {
        let mut conn = get_connection(&self.pool)?;

        let goal = goals::table
            .select(GoalDB::as_select())
            .find(goal_id)
            .first::<GoalDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => Error::Database(DatabaseError::NotFound(
                    format!("Goal {} not found", goal_id),
                )),
                other => other.into(),
            })?;

        Ok(goal.into())
    }

    fn list_active(&self, user_id: &str) -> Result<Vec<Goal>> {
        let mut conn = get_connection(&self.pool)?;

        let results = goals::table
            .filter(goals::user_id.eq(user_id))
            .filter(goals::is_active.eq(true))
            .select(GoalDB::as_select())
            .order(goals::created_at.desc())
            .load::<GoalDB>(&mut conn)?;

        Ok(results.into_iter().map(Goal::from).collect())
    }
}

use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use crate::db::get_connection;
use crate::errors::Result;
use crate::schema::categories::dsl::*;

use super::categories_model::{Category, CategoryDB, CategoryScope};
use super::categories_traits::CategoryRepositoryTrait;

/// Repository for reading category reference data.
pub struct CategoryRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl CategoryRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }
}

impl CategoryRepositoryTrait for CategoryRepository {
    fn get_by_id(&self, category_id: &str) -> Result<Category> {
        let mut conn = get_connection(&self.pool)?;

        let category = categories
            .select(CategoryDB::as_select())
            .find(category_id)
            .first::<CategoryDB>(&mut conn)?;

        Ok(category.into())
    }

    fn list_visible(&self, scope: &CategoryScope) -> Result<Vec<Category>> {
        let mut conn = get_connection(&self.pool)?;

        let results = categories
            .filter(
                is_default
                    .eq(true)
                    .or(user_id.eq(Some(scope.user_id.clone()))),
            )
            .select(CategoryDB::as_select())
            .order((category_type.asc(), name.asc()))
            .load::<CategoryDB>(&mut conn)?;

        Ok(results.into_iter().map(Category::from).collect())
    }

    fn get_with_children(&self, category_id: &str) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;

        let children: Vec<String> = categories
            .filter(parent_id.eq(Some(category_id.to_string())))
            .select(id)
            .load::<String>(&mut conn)?;

        let mut ids = Vec::with_capacity(children.len() + 1);
        ids.push(category_id.to_string());
        ids.extend(children);
        Ok(ids)
    }
}

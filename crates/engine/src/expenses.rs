//! The module contains the `Expense` record and its database entity.

use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// An expense owned by a single chat user.
///
/// `amount_usd` is a snapshot computed from `amount_uah` with the rate in
/// effect at the last write that touched the amount. It is never refreshed
/// afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i32,
    pub user_id: i64,
    pub title: String,
    pub date: NaiveDate,
    pub amount_uah: f64,
    pub amount_usd: f64,
}

/// Input for a new expense. The dollar amount is derived by the engine.
#[derive(Clone, Debug, PartialEq)]
pub struct ExpenseNew {
    pub user_id: i64,
    pub title: String,
    pub date: NaiveDate,
    pub amount_uah: f64,
}

/// Fields to change on an existing expense. `None` leaves the field as is.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExpenseChanges {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub amount_uah: Option<f64>,
}

impl ExpenseChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.date.is_none() && self.amount_uah.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i64,
    pub title: String,
    pub date: NaiveDate,
    pub amount_uah: f64,
    pub amount_usd: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Expense {
    fn from(value: Model) -> Self {
        Self {
            id: value.id,
            user_id: value.user_id,
            title: value.title,
            date: value.date,
            amount_uah: value.amount_uah,
            amount_usd: value.amount_usd,
        }
    }
}

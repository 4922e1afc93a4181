use chrono::NaiveDate;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    EngineError, Expense, ExpenseChanges, ExpenseNew, ResultEngine, expenses,
    money::{to_usd, validate_amount},
};

use super::{Engine, normalize_title, with_tx};

impl Engine {
    /// Stores a new expense with an already computed dollar amount.
    pub async fn new_expense(
        &self,
        user_id: i64,
        title: &str,
        date: NaiveDate,
        amount_uah: f64,
        amount_usd: f64,
    ) -> ResultEngine<Expense> {
        let title = normalize_title(title)?;
        let amount_uah = validate_amount(amount_uah)?;

        let model = expenses::ActiveModel {
            id: ActiveValue::NotSet,
            user_id: ActiveValue::Set(user_id),
            title: ActiveValue::Set(title),
            date: ActiveValue::Set(date),
            amount_uah: ActiveValue::Set(amount_uah),
            amount_usd: ActiveValue::Set(amount_usd),
        }
        .insert(&self.database)
        .await?;

        Ok(model.into())
    }

    /// Stores a new expense, deriving the dollar amount from `rate`
    /// (hryvnia per dollar).
    pub async fn new_expense_at_rate(&self, cmd: ExpenseNew, rate: f64) -> ResultEngine<Expense> {
        let amount_usd = to_usd(cmd.amount_uah, rate)?;
        self.new_expense(cmd.user_id, &cmd.title, cmd.date, cmd.amount_uah, amount_usd)
            .await
    }

    /// Lists the user's expenses between the optional inclusive bounds,
    /// oldest first.
    pub async fn expenses(
        &self,
        user_id: i64,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> ResultEngine<Vec<Expense>> {
        let mut query = expenses::Entity::find().filter(expenses::Column::UserId.eq(user_id));
        if let Some(start) = start {
            query = query.filter(expenses::Column::Date.gte(start));
        }
        if let Some(end) = end {
            query = query.filter(expenses::Column::Date.lte(end));
        }

        let models = query
            .order_by_asc(expenses::Column::Date)
            .order_by_asc(expenses::Column::Id)
            .all(&self.database)
            .await?;

        Ok(models.into_iter().map(Expense::from).collect())
    }

    /// Returns the expense if it exists and belongs to `user_id`.
    pub async fn expense(&self, id: i32, user_id: i64) -> ResultEngine<Option<Expense>> {
        let model = expenses::Entity::find_by_id(id)
            .filter(expenses::Column::UserId.eq(user_id))
            .one(&self.database)
            .await?;

        Ok(model.map(Expense::from))
    }

    /// Applies `changes` to an expense owned by `user_id`.
    ///
    /// `rate` is required only when the amount changes: the dollar snapshot
    /// is recomputed with it. Returns `None` when the expense does not exist
    /// or belongs to somebody else.
    pub async fn update_expense(
        &self,
        id: i32,
        user_id: i64,
        changes: ExpenseChanges,
        rate: Option<f64>,
    ) -> ResultEngine<Option<Expense>> {
        let title = changes.title.as_deref().map(normalize_title).transpose()?;
        let amounts = match changes.amount_uah {
            Some(amount_uah) => {
                let rate = rate.ok_or_else(|| {
                    EngineError::InvalidRate("a rate is required to change the amount".to_string())
                })?;
                Some((validate_amount(amount_uah)?, to_usd(amount_uah, rate)?))
            }
            None => None,
        };

        with_tx!(self, |db_tx| {
            let Some(model) = expenses::Entity::find_by_id(id)
                .filter(expenses::Column::UserId.eq(user_id))
                .one(&db_tx)
                .await?
            else {
                return Ok(None);
            };

            if changes.is_empty() {
                return Ok(Some(model.into()));
            }

            let mut active: expenses::ActiveModel = model.into();
            if let Some(title) = title {
                active.title = ActiveValue::Set(title);
            }
            if let Some(date) = changes.date {
                active.date = ActiveValue::Set(date);
            }
            if let Some((amount_uah, amount_usd)) = amounts {
                active.amount_uah = ActiveValue::Set(amount_uah);
                active.amount_usd = ActiveValue::Set(amount_usd);
            }

            let updated = active.update(&db_tx).await?;
            Ok(Some(Expense::from(updated)))
        })
    }

    /// Deletes an expense owned by `user_id`. Returns whether a row was removed.
    pub async fn delete_expense(&self, id: i32, user_id: i64) -> ResultEngine<bool> {
        let result = expenses::Entity::delete_many()
            .filter(expenses::Column::Id.eq(id))
            .filter(expenses::Column::UserId.eq(user_id))
            .exec(&self.database)
            .await?;

        Ok(result.rows_affected > 0)
    }
}

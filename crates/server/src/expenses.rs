//! Expenses API endpoints.

use api_types::{
    DATE_FORMAT,
    expense::{Expense, ExpenseDeleted, ExpenseList, ExpenseNew, ExpenseUpdate, Owner, ReportQuery},
};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::NaiveDate;

use crate::{REPORT_FILE_NAME, ServerError, XLSX_CONTENT_TYPE, server::ServerState};

fn to_api(expense: engine::Expense) -> Expense {
    Expense {
        id: expense.id,
        user_id: expense.user_id,
        title: expense.title,
        date: expense.date,
        amount_uah: expense.amount_uah,
        amount_usd: expense.amount_usd,
    }
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ServerError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| ServerError::Generic(format!("{field} must be a date formatted as YYYY-MM-DD")))
}

fn parse_optional_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>, ServerError> {
    value.map(|v| parse_date(field, v)).transpose()
}

fn not_found(id: i32) -> ServerError {
    ServerError::NotFound(format!("expense {id} not found"))
}

pub async fn list(
    State(state): State<ServerState>,
    query: Result<Query<ExpenseList>, QueryRejection>,
) -> Result<Json<Vec<Expense>>, ServerError> {
    let Query(query) = query?;
    let start = parse_optional_date("start_date", query.start_date.as_deref())?;
    let end = parse_optional_date("end_date", query.end_date.as_deref())?;

    let expenses = state.engine.expenses(query.user_id, start, end).await?;

    Ok(Json(expenses.into_iter().map(to_api).collect()))
}

pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<ExpenseNew>, JsonRejection>,
) -> Result<(StatusCode, Json<Expense>), ServerError> {
    let Json(payload) = payload?;
    let rate = state.rates.usd_rate().await;

    let expense = state
        .engine
        .new_expense_at_rate(
            engine::ExpenseNew {
                user_id: payload.user_id,
                title: payload.title,
                date: payload.date,
                amount_uah: payload.amount_uah,
            },
            rate,
        )
        .await?;
    tracing::info!(
        "user {} created expense {} at rate {rate}",
        expense.user_id,
        expense.id
    );

    Ok((StatusCode::CREATED, Json(to_api(expense))))
}

pub async fn delete(
    State(state): State<ServerState>,
    id: Result<Path<i32>, PathRejection>,
    owner: Result<Query<Owner>, QueryRejection>,
) -> Result<Json<ExpenseDeleted>, ServerError> {
    let Path(id) = id?;
    let Query(owner) = owner?;

    if !state.engine.delete_expense(id, owner.user_id).await? {
        return Err(not_found(id));
    }
    tracing::info!("user {} deleted expense {id}", owner.user_id);

    Ok(Json(ExpenseDeleted {
        status: "deleted".to_string(),
    }))
}

pub async fn update(
    State(state): State<ServerState>,
    id: Result<Path<i32>, PathRejection>,
    owner: Result<Query<Owner>, QueryRejection>,
    payload: Result<Json<ExpenseUpdate>, JsonRejection>,
) -> Result<Json<Expense>, ServerError> {
    let Path(id) = id?;
    let Query(owner) = owner?;
    let Json(payload) = payload?;

    // The rate is only looked up when the snapshot has to be recomputed.
    let rate = match payload.amount_uah {
        Some(_) => Some(state.rates.usd_rate().await),
        None => None,
    };

    let changes = engine::ExpenseChanges {
        title: payload.title,
        date: payload.date,
        amount_uah: payload.amount_uah,
    };
    let expense = state
        .engine
        .update_expense(id, owner.user_id, changes, rate)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!("user {} updated expense {id}", owner.user_id);

    Ok(Json(to_api(expense)))
}

pub async fn report(
    State(state): State<ServerState>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ServerError> {
    let Query(query) = query?;
    let start = parse_date("start_date", &query.start_date)?;
    let end = parse_date("end_date", &query.end_date)?;

    let expenses = state
        .engine
        .expenses(query.user_id, Some(start), Some(end))
        .await?;
    let bytes = engine::report::build_report(&expenses)?;
    tracing::debug!(
        "report for user {} with {} rows",
        query.user_id,
        expenses.len()
    );

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={REPORT_FILE_NAME}"),
            ),
        ],
        bytes,
    ))
}

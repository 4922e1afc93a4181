use api_types::{
    DATE_FORMAT,
    expense::{Expense, ExpenseDeleted, ExpenseList, ExpenseNew, ExpenseUpdate, Owner, ReportQuery},
};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};

#[derive(Clone, Debug)]
pub(crate) struct ApiClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{status}: {message}")]
    Server { status: StatusCode, message: String },
    /// The call went through but its answer could not be read.
    #[error("unreadable response: {0}")]
    Decode(String),
}

/// Operations the conversation needs from the expenses API.
#[async_trait]
pub(crate) trait ExpenseApi: Send + Sync {
    async fn create(&self, expense: &ExpenseNew) -> Result<Expense, ApiError>;

    async fn list(
        &self,
        user_id: i64,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Expense>, ApiError>;

    /// Returns the `.xlsx` bytes of the report.
    async fn report(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<u8>, ApiError>;

    async fn delete(&self, user_id: i64, id: i32) -> Result<(), ApiError>;

    async fn update(
        &self,
        user_id: i64,
        id: i32,
        changes: &ExpenseUpdate,
    ) -> Result<Expense, ApiError>;
}

fn wire_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

impl ApiClient {
    pub(crate) fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Sends the request and turns non-2xx answers into [`ApiError::Server`].
    async fn send(&self, req: RequestBuilder) -> Result<Response, ApiError> {
        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let message = match resp.json::<ErrorBody>().await {
            Ok(err) => err.error,
            Err(_) => "server error".to_string(),
        };
        tracing::warn!("api answered {status}: {message}");
        Err(ApiError::Server { status, message })
    }

    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ApiError> {
        self.send(req)
            .await?
            .json()
            .await
            .map_err(|err| ApiError::Decode(err.to_string()))
    }
}

#[async_trait]
impl ExpenseApi for ApiClient {
    async fn create(&self, expense: &ExpenseNew) -> Result<Expense, ApiError> {
        let req = self.client.post(self.url("/expenses/")).json(expense);
        self.send_json(req).await
    }

    async fn list(
        &self,
        user_id: i64,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Expense>, ApiError> {
        let query = ExpenseList {
            user_id,
            start_date: start.map(wire_date),
            end_date: end.map(wire_date),
        };
        let req = self.client.get(self.url("/expenses/")).query(&query);
        self.send_json(req).await
    }

    async fn report(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<u8>, ApiError> {
        let query = ReportQuery {
            user_id,
            start_date: wire_date(start),
            end_date: wire_date(end),
        };
        let req = self.client.get(self.url("/expenses/report/")).query(&query);
        Ok(self.send(req).await?.bytes().await?.to_vec())
    }

    async fn delete(&self, user_id: i64, id: i32) -> Result<(), ApiError> {
        let req = self
            .client
            .delete(self.url(&format!("/expenses/{id}")))
            .query(&Owner { user_id });
        let _: ExpenseDeleted = self.send_json(req).await?;
        Ok(())
    }

    async fn update(
        &self,
        user_id: i64,
        id: i32,
        changes: &ExpenseUpdate,
    ) -> Result<Expense, ApiError> {
        let req = self
            .client
            .put(self.url(&format!("/expenses/{id}")))
            .query(&Owner { user_id })
            .json(changes);
        self.send_json(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slashes() {
        let api = ApiClient::new(Client::new(), "http://localhost:8000/".to_string());
        assert_eq!(api.url("/expenses/"), "http://localhost:8000/expenses/");
        assert_eq!(api.url("expenses/7"), "http://localhost:8000/expenses/7");
    }

    #[test]
    fn dates_go_over_the_wire_as_iso() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(wire_date(date), "2024-01-05");
    }
}

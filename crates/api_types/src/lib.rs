use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Format used for dates on the wire, both in JSON bodies and query strings.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// MIME type of the report attachment.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const REPORT_FILE_NAME: &str = "expenses_report.xlsx";

pub mod expense {
    use super::*;

    /// A stored expense as returned by every endpoint that yields records.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Expense {
        pub id: i32,
        pub user_id: i64,
        pub title: String,
        pub date: NaiveDate,
        pub amount_uah: f64,
        pub amount_usd: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub user_id: i64,
        pub title: String,
        pub date: NaiveDate,
        pub amount_uah: f64,
    }

    /// Partial update. Absent (or `null`) fields are left untouched.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseUpdate {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub date: Option<NaiveDate>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub amount_uah: Option<f64>,
    }

    /// Query string of `GET /expenses/`.
    ///
    /// Dates stay strings here so the server can answer malformed values with
    /// its own error body.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseList {
        pub user_id: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub start_date: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub end_date: Option<String>,
    }

    /// Query string of `GET /expenses/report/`. Both bounds are required.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReportQuery {
        pub user_id: i64,
        pub start_date: String,
        pub end_date: String,
    }

    /// Query string carrying only the owner, used by delete and update.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct Owner {
        pub user_id: i64,
    }

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ExpenseDeleted {
        pub status: String,
    }
}

pub mod health {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Health {
        pub status: String,
    }
}

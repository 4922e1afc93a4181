use std::{collections::HashMap, sync::Arc};

use api_types::expense::Expense;
use chrono::NaiveDate;
use tokio::sync::Mutex;

/// Where a user is in a wizard, together with what was collected so far.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) enum DialogueState {
    #[default]
    Idle,
    AddTitle,
    AddDate {
        title: String,
    },
    AddAmount {
        title: String,
        date: NaiveDate,
    },
    ReportMode,
    ReportStart,
    ReportEnd {
        start: NaiveDate,
    },
    /// Waiting for the id to delete; `ids` are the ones shown to the user.
    DeleteId {
        ids: Vec<i32>,
    },
    EditId {
        expenses: Vec<Expense>,
    },
    EditChoice {
        expense: Expense,
    },
    EditTitle {
        id: i32,
    },
    EditAmount {
        id: i32,
    },
}

/// In-memory sessions keyed by the Telegram user id. Lost on restart.
#[derive(Clone, Default)]
pub(crate) struct SessionStore {
    inner: Arc<Mutex<HashMap<u64, DialogueState>>>,
}

impl SessionStore {
    pub(crate) async fn get(&self, user_id: u64) -> DialogueState {
        let guard = self.inner.lock().await;
        guard.get(&user_id).cloned().unwrap_or_default()
    }

    /// Stores the new state. Going back to idle drops the session.
    pub(crate) async fn set(&self, user_id: u64, state: DialogueState) {
        let mut guard = self.inner.lock().await;
        if state == DialogueState::Idle {
            guard.remove(&user_id);
        } else {
            guard.insert(user_id, state);
        }
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}

use api_types::expense::{Expense, ExpenseNew, ExpenseUpdate};
use chrono::NaiveDate;
use reqwest::StatusCode;

use crate::{
    api::{ApiError, ExpenseApi},
    dialogue::{Effect, Input, Outgoing, Step, step},
    parsing::format_date,
    state::{DialogueState, SessionStore},
    ui::{self, Keyboard},
};

/// Drives the wizards of every user: decodes the text, applies the
/// transition and runs the requested API calls.
pub(crate) struct Conversation<A> {
    api: A,
    sessions: SessionStore,
}

impl<A: ExpenseApi> Conversation<A> {
    pub(crate) fn new(api: A) -> Self {
        Self {
            api,
            sessions: SessionStore::default(),
        }
    }

    pub(crate) async fn handle(&self, user: u64, text: &str, today: NaiveDate) -> Vec<Outgoing> {
        let Ok(user_id) = i64::try_from(user) else {
            tracing::warn!("ignoring message from out of range user id {user}");
            return Vec::new();
        };

        let input = Input::decode(text);
        let state = self.sessions.get(user).await;
        let Step {
            next,
            mut replies,
            effect,
        } = step(state, &input, today);

        let next = match effect {
            Some(effect) => {
                tracing::debug!("user {user} runs {effect:?}");
                self.run(user_id, effect, &mut replies).await
            }
            None => next,
        };

        self.sessions.set(user, next).await;
        replies
    }

    async fn run(&self, user_id: i64, effect: Effect, out: &mut Vec<Outgoing>) -> DialogueState {
        match effect {
            Effect::Create {
                title,
                date,
                amount_uah,
            } => {
                let new = ExpenseNew {
                    user_id,
                    title,
                    date,
                    amount_uah,
                };
                let text = match self.api.create(&new).await {
                    Ok(created) => {
                        tracing::info!("user {user_id} added expense {}", created.id);
                        "✅ Expense added!".to_string()
                    }
                    Err(err) => user_message_for_api_error(
                        err,
                        "❌ Could not add the expense. Try again later 😔",
                    ),
                };
                out.push(Outgoing::with_keyboard(text, Keyboard::MainMenu));
                DialogueState::Idle
            }

            Effect::Report { start, end } => {
                self.report(user_id, start, end, out).await;
                DialogueState::Idle
            }

            Effect::ListForDelete => match self.listing(user_id, out).await {
                Some(expenses) => {
                    out.push(Outgoing::with_keyboard(
                        "🗑️ Enter the ID of the expense to delete:",
                        Keyboard::Remove,
                    ));
                    DialogueState::DeleteId {
                        ids: expenses.iter().map(|e| e.id).collect(),
                    }
                }
                None => DialogueState::Idle,
            },

            Effect::ListForEdit => match self.listing(user_id, out).await {
                Some(expenses) => {
                    out.push(Outgoing::with_keyboard(
                        "✏️ Enter the ID of the expense to edit:",
                        Keyboard::Remove,
                    ));
                    DialogueState::EditId { expenses }
                }
                None => DialogueState::Idle,
            },

            Effect::Delete { id } => {
                let text = match self.api.delete(user_id, id).await {
                    Ok(()) => {
                        tracing::info!("user {user_id} deleted expense {id}");
                        "✅ Expense deleted!".to_string()
                    }
                    Err(err) => user_message_for_api_error(err, "❗ Could not delete the expense."),
                };
                out.push(Outgoing::with_keyboard(text, Keyboard::MainMenu));
                DialogueState::Idle
            }

            Effect::UpdateTitle { id, title } => {
                let changes = ExpenseUpdate {
                    title: Some(title),
                    ..Default::default()
                };
                self.update(user_id, id, changes, out).await;
                DialogueState::Idle
            }
            Effect::UpdateAmount { id, amount_uah } => {
                let changes = ExpenseUpdate {
                    amount_uah: Some(amount_uah),
                    ..Default::default()
                };
                self.update(user_id, id, changes, out).await;
                DialogueState::Idle
            }
        }
    }

    async fn update(&self, user_id: i64, id: i32, changes: ExpenseUpdate, out: &mut Vec<Outgoing>) {
        let text = match self.api.update(user_id, id, &changes).await {
            Ok(expense) => {
                tracing::info!("user {user_id} updated expense {id}");
                format!("✅ Expense updated!\n\n{}", ui::expense_card(&expense))
            }
            Err(err) => user_message_for_api_error(err, "❗ Could not update the expense."),
        };
        out.push(Outgoing::with_keyboard(text, Keyboard::MainMenu));
    }

    /// Fetches the report document and the list for the total
    /// independently, so either can fail on its own.
    async fn report(&self, user_id: i64, start: NaiveDate, end: NaiveDate, out: &mut Vec<Outgoing>) {
        let (report, list) = tokio::join!(
            self.api.report(user_id, start, end),
            self.api.list(user_id, Some(start), Some(end)),
        );
        let total = list.map(|expenses| expenses.iter().map(|e| e.amount_uah).sum::<f64>());
        let caption = ui::report_caption(&format_date(start), &format_date(end));

        match (report, total) {
            (Ok(bytes), Ok(total)) => {
                out.push(report_document(bytes, caption));
                out.push(Outgoing::text(ui::total_text(total)));
            }
            (Ok(bytes), Err(err)) => {
                tracing::warn!("report total unavailable: {err}");
                out.push(report_document(bytes, caption));
                out.push(Outgoing::text(
                    "❌ Could not compute the total. Try again later.",
                ));
            }
            (Err(err), Ok(total)) => {
                tracing::warn!("report document unavailable: {err}");
                out.push(Outgoing::text("⚠️ The report is not available right now."));
                out.push(Outgoing::text(ui::total_text(total)));
            }
            (Err(report_err), Err(list_err)) => {
                tracing::warn!("report failed: {report_err}; total failed: {list_err}");
                out.push(Outgoing::text(
                    "❗ Something went wrong while fetching the report.",
                ));
            }
        }
        out.push(Outgoing::with_keyboard(
            ui::back_to_menu_text(),
            Keyboard::MainMenu,
        ));
    }

    /// Sends every expense of the user as a spreadsheet so the user can pick
    /// an id. Returns `None` when the wizard can't go on.
    async fn listing(&self, user_id: i64, out: &mut Vec<Outgoing>) -> Option<Vec<Expense>> {
        let expenses = match self.api.list(user_id, None, None).await {
            Ok(expenses) => expenses,
            Err(err) => {
                out.push(Outgoing::with_keyboard(
                    user_message_for_api_error(err, "❗ Could not fetch the list of expenses."),
                    Keyboard::MainMenu,
                ));
                return None;
            }
        };

        if expenses.is_empty() {
            out.push(Outgoing::with_keyboard(
                format!("😞 You have no expenses yet. Add one with «{}».", ui::ADD),
                Keyboard::MainMenu,
            ));
            return None;
        }

        match listing_document(&expenses) {
            Ok(bytes) => {
                out.push(Outgoing::Document {
                    bytes,
                    file_name: ui::LISTING_FILE_NAME.to_string(),
                    caption: Some("📊 All your expenses with their IDs:".to_string()),
                });
                Some(expenses)
            }
            Err(err) => {
                tracing::error!("could not build the expenses listing: {err}");
                out.push(Outgoing::with_keyboard(
                    "❗ Could not prepare the list of expenses.",
                    Keyboard::MainMenu,
                ));
                None
            }
        }
    }
}

fn report_document(bytes: Vec<u8>, caption: String) -> Outgoing {
    Outgoing::Document {
        bytes,
        file_name: api_types::REPORT_FILE_NAME.to_string(),
        caption: Some(caption),
    }
}

fn listing_document(expenses: &[Expense]) -> Result<Vec<u8>, engine::EngineError> {
    let rows: Vec<engine::Expense> = expenses
        .iter()
        .map(|e| engine::Expense {
            id: e.id,
            user_id: e.user_id,
            title: e.title.clone(),
            date: e.date,
            amount_uah: e.amount_uah,
            amount_usd: e.amount_usd,
        })
        .collect();
    engine::report::build_report(&rows)
}

fn user_message_for_api_error(err: ApiError, failed: &str) -> String {
    match err {
        ApiError::Network(err) => {
            tracing::warn!("api unreachable: {err}");
            "⚠️ Could not reach the server. Try again later.".to_string()
        }
        ApiError::Decode(err) => {
            tracing::warn!("api answer unreadable: {err}");
            "⚠️ The server answered with something unexpected. Check your expenses before retrying."
                .to_string()
        }
        ApiError::Server { status, message } => match status {
            StatusCode::NOT_FOUND => format!("{failed} The expense no longer exists."),
            StatusCode::UNPROCESSABLE_ENTITY => format!("{failed} {message}"),
            _ => failed.to_string(),
        },
    }
}


#[cfg(test)]
mod http_tests {
    use std::sync::Arc;

    use axum::{Router, routing::post};
    use migration::{Migrator, MigratorTrait};
    use reqwest::Client;
    use sea_orm::Database;
    use server::rates::FixedRate;
    use tokio::net::TcpListener;

    use super::*;
    use crate::api::ApiClient;

    const USER: u64 = 777;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    async fn spawn_api() -> String {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        let engine = engine::Engine::builder().database(db).build().await.unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = server::spawn_with_listener(engine, Arc::new(FixedRate(40.0)), listener).unwrap();
        format!("http://{addr}")
    }

    fn conversation(base_url: String) -> Conversation<ApiClient> {
        Conversation::new(ApiClient::new(Client::new(), base_url))
    }

    async fn say(conv: &Conversation<ApiClient>, text: &str) -> Vec<Outgoing> {
        conv.handle(USER, text, today()).await
    }

    fn texts(out: &[Outgoing]) -> Vec<&str> {
        out.iter()
            .filter_map(|o| match o {
                Outgoing::Text { text, .. } => Some(text.as_str()),
                Outgoing::Document { .. } => None,
            })
            .collect()
    }

    fn document<'a>(out: &'a [Outgoing], name: &str) -> &'a [u8] {
        out.iter()
            .find_map(|o| match o {
                Outgoing::Document {
                    bytes, file_name, ..
                } if file_name == name => Some(bytes.as_slice()),
                _ => None,
            })
            .unwrap()
    }

    #[tokio::test]
    async fn every_wizard_works_against_the_server() {
        let conv = conversation(spawn_api().await);

        say(&conv, ui::ADD).await;
        say(&conv, "Taxi").await;
        say(&conv, "today").await;
        let out = say(&conv, "50,5").await;
        assert_eq!(texts(&out), vec!["✅ Expense added!"]);

        say(&conv, ui::REPORT).await;
        let out = say(&conv, ui::ALL_TIME).await;
        assert!(document(&out, api_types::REPORT_FILE_NAME).starts_with(b"PK"));
        assert_eq!(texts(&out)[0], "💸 Total spent in the period: 50.50 UAH.");

        let out = say(&conv, ui::EDIT).await;
        assert!(document(&out, ui::LISTING_FILE_NAME).starts_with(b"PK"));
        let DialogueState::EditId { expenses } = conv.sessions.get(USER).await else {
            panic!("edit wizard did not wait for an id");
        };
        assert_eq!(expenses.len(), 1);
        let id = expenses[0].id.to_string();

        say(&conv, &id).await;
        say(&conv, ui::EDIT_AMOUNT).await;
        let out = say(&conv, "200").await;
        assert!(texts(&out)[0].starts_with("✅ Expense updated!"));
        assert!(texts(&out)[0].contains("200.00 UAH (5.00 USD)"));

        say(&conv, ui::DELETE).await;
        let out = say(&conv, &id).await;
        assert_eq!(texts(&out), vec!["✅ Expense deleted!"]);

        let out = say(&conv, ui::DELETE).await;
        assert!(texts(&out)[0].starts_with("😞 You have no expenses yet."));
        assert_eq!(conv.sessions.get(USER).await, DialogueState::Idle);
    }

    #[tokio::test]
    async fn missing_expense_is_reported_from_the_404() {
        let conv = conversation(spawn_api().await);
        conv.sessions
            .set(USER, DialogueState::EditTitle { id: 99 })
            .await;

        let out = say(&conv, "Groceries").await;

        assert_eq!(
            texts(&out),
            vec!["❗ Could not update the expense. The expense no longer exists."]
        );
        assert_eq!(conv.sessions.get(USER).await, DialogueState::Idle);
    }

    #[tokio::test]
    async fn unreachable_server_gives_a_generic_message_and_clears() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let conv = conversation(format!("http://{addr}"));

        say(&conv, ui::ADD).await;
        say(&conv, "Taxi").await;
        say(&conv, "today").await;
        let out = say(&conv, "50").await;

        assert_eq!(
            texts(&out),
            vec!["⚠️ Could not reach the server. Try again later."]
        );
        assert_eq!(conv.sessions.get(USER).await, DialogueState::Idle);
    }

    #[tokio::test]
    async fn unreadable_answer_is_not_reported_as_unreachable() {
        let app = Router::new().route("/expenses/", post(|| async { "stored, not json" }));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await });
        let conv = conversation(format!("http://{addr}"));

        say(&conv, ui::ADD).await;
        say(&conv, "Taxi").await;
        say(&conv, "today").await;
        let out = say(&conv, "50").await;

        assert_eq!(
            texts(&out),
            vec!["⚠️ The server answered with something unexpected. Check your expenses before retrying."]
        );
        assert_eq!(conv.sessions.get(USER).await, DialogueState::Idle);
    }
}

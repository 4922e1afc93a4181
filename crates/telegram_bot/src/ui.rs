use api_types::expense::Expense;
use teloxide::types::{KeyboardButton, KeyboardMarkup, KeyboardRemove, ReplyMarkup};

use crate::parsing::format_date;

pub(crate) const ADD: &str = "➕ Add expense";
pub(crate) const REPORT: &str = "📊 Report for a period";
pub(crate) const DELETE: &str = "❌ Delete expense";
pub(crate) const EDIT: &str = "✏️ Edit expense";

pub(crate) const TODAY: &str = "📅 Today";
pub(crate) const YESTERDAY: &str = "📆 Yesterday";

pub(crate) const LAST_MONTH: &str = "🗓️ Last month";
pub(crate) const LAST_THREE_MONTHS: &str = "📉 Last 3 months";
pub(crate) const ALL_TIME: &str = "🕓 All time";
pub(crate) const MANUAL: &str = "✍️ Enter dates manually";

pub(crate) const EDIT_TITLE: &str = "📝 Edit title";
pub(crate) const EDIT_AMOUNT: &str = "💸 Edit amount";

pub(crate) const EXIT: &str = "🔙 Exit";

pub(crate) const LISTING_FILE_NAME: &str = "all_expenses.xlsx";

/// Keyboard attached to a message. Kept free of transport types so the
/// dialogue can be tested without teloxide.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Keyboard {
    MainMenu,
    Dates,
    ReportPeriods,
    EditOptions,
    Remove,
}

fn rows(labels: &[&[&str]]) -> ReplyMarkup {
    let keyboard = labels
        .iter()
        .map(|row| row.iter().map(|label| KeyboardButton::new(*label)).collect::<Vec<_>>())
        .collect::<Vec<_>>();
    ReplyMarkup::Keyboard(KeyboardMarkup::new(keyboard).resize_keyboard())
}

pub(crate) fn markup(keyboard: Keyboard) -> ReplyMarkup {
    match keyboard {
        Keyboard::MainMenu => rows(&[&[ADD, REPORT], &[DELETE, EDIT]]),
        Keyboard::Dates => rows(&[&[TODAY, YESTERDAY]]),
        Keyboard::ReportPeriods => rows(&[
            &[LAST_MONTH, LAST_THREE_MONTHS],
            &[ALL_TIME, MANUAL],
            &[EXIT],
        ]),
        Keyboard::EditOptions => rows(&[&[EDIT_TITLE], &[EDIT_AMOUNT], &[EXIT]]),
        Keyboard::Remove => ReplyMarkup::KeyboardRemove(KeyboardRemove::new()),
    }
}

pub(crate) fn welcome_text() -> &'static str {
    "👋 Welcome! Choose an action from the menu below ⬇️"
}

pub(crate) fn help_text() -> &'static str {
    "I keep track of your expenses in hryvnias and convert them to dollars.\n\n\
     ➕ Add expense: title, date and amount.\n\
     📊 Report: a spreadsheet of the expenses in a period and their total.\n\
     ❌ Delete / ✏️ Edit: pick an expense by its ID.\n\n\
     Dates are written as dd.mm.yyyy. /start brings you back to the main menu."
}

pub(crate) fn menu_hint_text() -> &'static str {
    "📋 Choose an action from the menu."
}

pub(crate) fn back_to_menu_text() -> &'static str {
    "🔙 Back to the main menu. Choose the next action 👇"
}

pub(crate) fn expense_card(expense: &Expense) -> String {
    format!(
        "ID {}: {}\n📅 {}\n💰 {:.2} UAH ({:.2} USD)",
        expense.id,
        expense.title,
        format_date(expense.date),
        expense.amount_uah,
        expense.amount_usd
    )
}

pub(crate) fn total_text(total: f64) -> String {
    format!("💸 Total spent in the period: {total:.2} UAH.")
}

pub(crate) fn report_caption(start: &str, end: &str) -> String {
    format!("📊 Expenses from {start} to {end}")
}

//! Wizard transitions.
//!
//! [`step`] is a pure function of the current state, the decoded input and
//! today's date. Anything that needs the HTTP API is returned as an
//! [`Effect`] and executed by [`crate::conversation::Conversation`].

use chrono::{Days, NaiveDate};

use crate::{
    parsing::{format_date, parse_amount, parse_date, parse_id},
    state::DialogueState,
    ui::{self, Keyboard},
};

/// First day covered by the "all time" report.
pub(crate) fn all_time_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or(NaiveDate::MIN)
}

const LAST_MONTH_DAYS: u64 = 30;
const LAST_THREE_MONTHS_DAYS: u64 = 90;

/// What a message means, independently of how it is labelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Intent {
    Start,
    Help,
    Add,
    Report,
    Delete,
    Edit,
    Today,
    Yesterday,
    LastMonth,
    LastThreeMonths,
    AllTime,
    Manual,
    EditTitle,
    EditAmount,
    Exit,
    Text,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Input {
    pub text: String,
    pub intent: Intent,
}

impl Input {
    pub(crate) fn decode(text: &str) -> Self {
        let text = text.trim();
        Self {
            text: text.to_string(),
            intent: intent_of(text),
        }
    }
}

fn intent_of(text: &str) -> Intent {
    if let Some(command) = text.strip_prefix('/') {
        // `/start@my_bot payload` in groups.
        let name = command
            .split(|c: char| c == '@' || c.is_whitespace())
            .next()
            .unwrap_or_default();
        match name.to_ascii_lowercase().as_str() {
            "start" => return Intent::Start,
            "help" => return Intent::Help,
            _ => {}
        }
    }

    match text {
        ui::ADD => Intent::Add,
        ui::REPORT => Intent::Report,
        ui::DELETE => Intent::Delete,
        ui::EDIT => Intent::Edit,
        ui::TODAY => Intent::Today,
        ui::YESTERDAY => Intent::Yesterday,
        ui::LAST_MONTH => Intent::LastMonth,
        ui::LAST_THREE_MONTHS => Intent::LastThreeMonths,
        ui::ALL_TIME => Intent::AllTime,
        ui::MANUAL => Intent::Manual,
        ui::EDIT_TITLE => Intent::EditTitle,
        ui::EDIT_AMOUNT => Intent::EditAmount,
        ui::EXIT => Intent::Exit,
        _ if text.eq_ignore_ascii_case("today") => Intent::Today,
        _ if text.eq_ignore_ascii_case("yesterday") => Intent::Yesterday,
        _ => Intent::Text,
    }
}

/// A message to deliver to the user.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Outgoing {
    Text {
        text: String,
        keyboard: Option<Keyboard>,
    },
    Document {
        bytes: Vec<u8>,
        file_name: String,
        caption: Option<String>,
    },
}

impl Outgoing {
    pub(crate) fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            keyboard: None,
        }
    }

    pub(crate) fn with_keyboard(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self::Text {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }
}

/// Remote work requested by a transition.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Effect {
    Create {
        title: String,
        date: NaiveDate,
        amount_uah: f64,
    },
    Report {
        start: NaiveDate,
        end: NaiveDate,
    },
    ListForDelete,
    ListForEdit,
    Delete {
        id: i32,
    },
    UpdateTitle {
        id: i32,
        title: String,
    },
    UpdateAmount {
        id: i32,
        amount_uah: f64,
    },
}

/// Result of a transition. When `effect` is set the runner picks the final
/// state from the outcome of the call and `next` is left at idle.
#[derive(Debug, PartialEq)]
pub(crate) struct Step {
    pub next: DialogueState,
    pub replies: Vec<Outgoing>,
    pub effect: Option<Effect>,
}

impl Step {
    fn stay(state: DialogueState, reply: Outgoing) -> Self {
        Self {
            next: state,
            replies: vec![reply],
            effect: None,
        }
    }

    fn go(next: DialogueState, reply: Outgoing) -> Self {
        Self::stay(next, reply)
    }

    fn run(effect: Effect) -> Self {
        Self {
            next: DialogueState::Idle,
            replies: Vec::new(),
            effect: Some(effect),
        }
    }

    fn to_menu(text: impl Into<String>) -> Self {
        Self::go(
            DialogueState::Idle,
            Outgoing::with_keyboard(text, Keyboard::MainMenu),
        )
    }
}

pub(crate) fn step(state: DialogueState, input: &Input, today: NaiveDate) -> Step {
    match input.intent {
        Intent::Start => return Step::to_menu(ui::welcome_text()),
        Intent::Help => return Step::stay(state, Outgoing::text(ui::help_text())),
        _ => {}
    }

    match state {
        DialogueState::Idle => idle(input),

        DialogueState::AddTitle => {
            if input.text.is_empty() {
                return Step::stay(state, Outgoing::text("📝 The title can't be empty. Enter it again:"));
            }
            Step::go(
                DialogueState::AddDate {
                    title: input.text.clone(),
                },
                Outgoing::with_keyboard(
                    "📆 Pick a date with the buttons or type it as dd.mm.yyyy",
                    Keyboard::Dates,
                ),
            )
        }
        DialogueState::AddDate { title } => {
            let date = match input.intent {
                Intent::Today => Some(today),
                Intent::Yesterday => today.checked_sub_days(Days::new(1)),
                _ => parse_date(&input.text).ok(),
            };
            match date {
                Some(date) => Step::go(
                    DialogueState::AddAmount { title, date },
                    Outgoing::with_keyboard("💸 Enter the amount in hryvnias (UAH):", Keyboard::Remove),
                ),
                None => Step::stay(
                    DialogueState::AddDate { title },
                    Outgoing::with_keyboard(
                        "❌ Wrong date format! Type it as dd.mm.yyyy or use the buttons below ⬇️",
                        Keyboard::Dates,
                    ),
                ),
            }
        }
        DialogueState::AddAmount { title, date } => match parse_amount(&input.text) {
            Ok(amount_uah) => Step::run(Effect::Create {
                title,
                date,
                amount_uah,
            }),
            Err(_) => Step::stay(
                DialogueState::AddAmount { title, date },
                Outgoing::text("⚠️ Wrong amount format. Use digits, with a dot or a comma."),
            ),
        },

        DialogueState::ReportMode => {
            let start = match input.intent {
                Intent::LastMonth => today.checked_sub_days(Days::new(LAST_MONTH_DAYS)),
                Intent::LastThreeMonths => today.checked_sub_days(Days::new(LAST_THREE_MONTHS_DAYS)),
                Intent::AllTime => Some(all_time_start()),
                Intent::Manual => {
                    return Step::go(
                        DialogueState::ReportStart,
                        Outgoing::with_keyboard(
                            "📅 Enter the first day of the period (dd.mm.yyyy):",
                            Keyboard::Remove,
                        ),
                    );
                }
                Intent::Exit => return Step::to_menu(ui::back_to_menu_text()),
                _ => None,
            };
            match start {
                Some(start) => Step::run(Effect::Report { start, end: today }),
                None => Step::stay(
                    DialogueState::ReportMode,
                    Outgoing::with_keyboard(
                        "Pick one of the periods or press «Enter dates manually».",
                        Keyboard::ReportPeriods,
                    ),
                ),
            }
        }
        DialogueState::ReportStart => match parse_date(&input.text) {
            Ok(start) => Step::go(
                DialogueState::ReportEnd { start },
                Outgoing::text("📅 Enter the last day of the period (dd.mm.yyyy):"),
            ),
            Err(_) => Step::stay(
                state,
                Outgoing::text("❌ Wrong date format. Try again (dd.mm.yyyy)."),
            ),
        },
        DialogueState::ReportEnd { start } => match parse_date(&input.text) {
            Ok(end) if end < start => Step::stay(
                state,
                Outgoing::text(format!(
                    "❌ The period can't end before it starts ({}). Enter the last day again:",
                    format_date(start)
                )),
            ),
            Ok(end) => Step::run(Effect::Report { start, end }),
            Err(_) => Step::stay(
                state,
                Outgoing::text("❌ Wrong date format. Try again (dd.mm.yyyy)."),
            ),
        },

        DialogueState::DeleteId { ids } => match parse_id(&input.text) {
            Ok(id) if ids.contains(&id) => Step::run(Effect::Delete { id }),
            Ok(_) => Step::to_menu("❗ There is no expense with that ID."),
            Err(_) => Step::stay(
                DialogueState::DeleteId { ids },
                Outgoing::text("Enter a valid ID (a number)."),
            ),
        },

        DialogueState::EditId { expenses } => match parse_id(&input.text) {
            Ok(id) => match expenses.into_iter().find(|e| e.id == id) {
                Some(expense) => {
                    let card = ui::expense_card(&expense);
                    Step::go(
                        DialogueState::EditChoice { expense },
                        Outgoing::with_keyboard(
                            format!("{card}\n\nWhat do you want to change?"),
                            Keyboard::EditOptions,
                        ),
                    )
                }
                None => Step::to_menu("❗ There is no expense with that ID."),
            },
            Err(_) => Step::stay(
                DialogueState::EditId { expenses },
                Outgoing::text("Enter a valid ID (a number)."),
            ),
        },
        DialogueState::EditChoice { expense } => match input.intent {
            Intent::EditTitle => Step::go(
                DialogueState::EditTitle { id: expense.id },
                Outgoing::with_keyboard("📝 Enter the new title:", Keyboard::Remove),
            ),
            Intent::EditAmount => Step::go(
                DialogueState::EditAmount { id: expense.id },
                Outgoing::with_keyboard("💸 Enter the new amount (UAH):", Keyboard::Remove),
            ),
            Intent::Exit => Step::to_menu(ui::back_to_menu_text()),
            _ => Step::stay(
                DialogueState::EditChoice { expense },
                Outgoing::with_keyboard(
                    "📋 Pick one of the options or press «Exit».",
                    Keyboard::EditOptions,
                ),
            ),
        },
        DialogueState::EditTitle { id } => {
            if input.text.is_empty() {
                return Step::stay(state, Outgoing::text("📝 The title can't be empty. Enter it again:"));
            }
            Step::run(Effect::UpdateTitle {
                id,
                title: input.text.clone(),
            })
        }
        DialogueState::EditAmount { id } => match parse_amount(&input.text) {
            Ok(amount_uah) => Step::run(Effect::UpdateAmount { id, amount_uah }),
            Err(_) => Step::stay(
                state,
                Outgoing::text("❗ Wrong amount format. Try again (digits, with a dot or a comma)."),
            ),
        },
    }
}

fn idle(input: &Input) -> Step {
    match input.intent {
        Intent::Add => Step::go(
            DialogueState::AddTitle,
            Outgoing::with_keyboard("📝 Enter the expense title:", Keyboard::Remove),
        ),
        Intent::Report => Step::go(
            DialogueState::ReportMode,
            Outgoing::with_keyboard(
                "Pick a period or press «Enter dates manually»:",
                Keyboard::ReportPeriods,
            ),
        ),
        Intent::Delete => Step::run(Effect::ListForDelete),
        Intent::Edit => Step::run(Effect::ListForEdit),
        _ => Step::to_menu(ui::menu_hint_text()),
    }
}

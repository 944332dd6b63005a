use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::database::models::Event;
use crate::utils::datetime::{parse_br_date, parse_hhmm};

/// How the event occupies the day. Timed events always carry both ends;
/// all-day events carry neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Schedule {
    AllDay,
    Timed {
        start_time: NaiveTime,
        end_time: NaiveTime,
    },
}

/// The event-creation conversation. Each variant is one open question, and
/// only carries what has already been answered, so a state like "waiting for
/// the end time without a start time" cannot be built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum WizardState {
    AwaitingTitle,
    AwaitingDate {
        title: String,
    },
    AwaitingAllDay {
        title: String,
        event_date: NaiveDate,
    },
    AwaitingStart {
        title: String,
        event_date: NaiveDate,
    },
    AwaitingEnd {
        title: String,
        event_date: NaiveDate,
        start_time: NaiveTime,
    },
    AwaitingLocation {
        title: String,
        event_date: NaiveDate,
        schedule: Schedule,
    },
    Review,
}

/// What the user answered with: free text, or one of the all-day buttons.
#[derive(Debug, Clone, Copy)]
pub enum StepInput<'a> {
    Text(&'a str),
    AllDayChoice(bool),
}

/// A validated answer, ready to be written to the draft.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldCapture {
    Title(String),
    EventDate(NaiveDate),
    AllDay(bool),
    StartTime(NaiveTime),
    EndTime(NaiveTime),
    Location(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepError {
    EmptyTitle,
    BadDate,
    BadTime,
    /// Free text arrived while the all-day buttons are on screen.
    ChoicePending,
    /// The wizard has no open question for this input.
    NotCollecting,
}

impl StepError {
    pub fn retry_message(&self) -> Option<&'static str> {
        match self {
            StepError::EmptyTitle => {
                Some("❌ O título não pode ficar vazio. Envie o título do evento:")
            }
            StepError::BadDate => Some("❌ Data inválida. Use o formato dd/mm/aaaa"),
            StepError::BadTime => Some("❌ Horário inválido. Use o formato HH:MM"),
            StepError::ChoicePending => Some("Use os botões da mensagem acima para escolher ☝️"),
            StepError::NotCollecting => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Advance {
    pub capture: FieldCapture,
    pub next: WizardState,
}

/// The question sent as a force-reply message for a collecting state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepPrompt {
    pub text: &'static str,
    pub placeholder: &'static str,
}

/// Snapshot of the draft's captured fields, used to decide which question
/// comes next.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftFields {
    pub title: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub all_day: Option<bool>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub location: Option<String>,
}

impl DraftFields {
    pub fn from_event(event: &Event) -> Self {
        DraftFields {
            title: event.title.clone(),
            event_date: event
                .event_date
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()),
            all_day: event.all_day,
            start_time: event.start_time.as_deref().and_then(parse_hhmm),
            end_time: event.end_time.as_deref().and_then(parse_hhmm),
            location: event.location.clone(),
        }
    }

    /// The snapshot after applying one capture. Choosing all-day drops any
    /// previously captured times, mirroring what the draft update does.
    pub fn with(&self, capture: &FieldCapture) -> Self {
        let mut next = self.clone();
        match capture {
            FieldCapture::Title(title) => next.title = Some(title.clone()),
            FieldCapture::EventDate(date) => next.event_date = Some(*date),
            FieldCapture::AllDay(true) => {
                next.all_day = Some(true);
                next.start_time = None;
                next.end_time = None;
            }
            FieldCapture::AllDay(false) => next.all_day = Some(false),
            FieldCapture::StartTime(time) => next.start_time = Some(*time),
            FieldCapture::EndTime(time) => next.end_time = Some(*time),
            FieldCapture::Location(location) => next.location = Some(location.clone()),
        }
        next
    }

    pub fn is_complete(&self) -> bool {
        matches!(resume_state(self), WizardState::Review)
    }
}

/// The state matching the draft's first unanswered question, in the order
/// title, date, all-day choice, start, end, location. A fully answered draft
/// resumes at Review. Re-entering the wizard and answering a single edited
/// field both land here, so the conversation always has exactly one open
/// question.
pub fn resume_state(fields: &DraftFields) -> WizardState {
    let Some(title) = fields.title.clone() else {
        return WizardState::AwaitingTitle;
    };
    let Some(event_date) = fields.event_date else {
        return WizardState::AwaitingDate { title };
    };
    let Some(all_day) = fields.all_day else {
        return WizardState::AwaitingAllDay { title, event_date };
    };
    let schedule = if all_day {
        Schedule::AllDay
    } else {
        let Some(start_time) = fields.start_time else {
            return WizardState::AwaitingStart { title, event_date };
        };
        let Some(end_time) = fields.end_time else {
            return WizardState::AwaitingEnd {
                title,
                event_date,
                start_time,
            };
        };
        Schedule::Timed {
            start_time,
            end_time,
        }
    };
    if fields.location.is_none() {
        return WizardState::AwaitingLocation {
            title,
            event_date,
            schedule,
        };
    }
    WizardState::Review
}

/// Which field an edit button re-opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Title,
    EventDate,
    StartTime,
    EndTime,
    Location,
}

/// State for re-asking a single field from the review card. None when the
/// draft no longer supports that question (for example a time edit on an
/// all-day event); callers fall back to `resume_state`.
pub fn state_for_edit(field: EditField, fields: &DraftFields) -> Option<WizardState> {
    match field {
        EditField::Title => Some(WizardState::AwaitingTitle),
        EditField::EventDate => fields
            .title
            .clone()
            .map(|title| WizardState::AwaitingDate { title }),
        EditField::StartTime => match (&fields.title, fields.event_date, fields.all_day) {
            (Some(title), Some(event_date), Some(false)) => Some(WizardState::AwaitingStart {
                title: title.clone(),
                event_date,
            }),
            _ => None,
        },
        EditField::EndTime => match (
            &fields.title,
            fields.event_date,
            fields.all_day,
            fields.start_time,
        ) {
            (Some(title), Some(event_date), Some(false), Some(start_time)) => {
                Some(WizardState::AwaitingEnd {
                    title: title.clone(),
                    event_date,
                    start_time,
                })
            }
            _ => None,
        },
        EditField::Location => {
            let title = fields.title.clone()?;
            let event_date = fields.event_date?;
            let schedule = if fields.all_day? {
                Schedule::AllDay
            } else {
                Schedule::Timed {
                    start_time: fields.start_time?,
                    end_time: fields.end_time?,
                }
            };
            Some(WizardState::AwaitingLocation {
                title,
                event_date,
                schedule,
            })
        }
    }
}

impl WizardState {
    /// Validates one answer against the current question. Returns the field
    /// to persist plus the next state; on error the state is unchanged and
    /// `retry_message` tells the user what to fix.
    pub fn advance(&self, input: StepInput<'_>, fields: &DraftFields) -> Result<Advance, StepError> {
        let capture = match (self, input) {
            (WizardState::AwaitingTitle, StepInput::Text(text)) => {
                let title = text.trim();
                if title.is_empty() {
                    return Err(StepError::EmptyTitle);
                }
                FieldCapture::Title(title.to_string())
            }
            (WizardState::AwaitingDate { .. }, StepInput::Text(text)) => {
                let date = parse_br_date(text).ok_or(StepError::BadDate)?;
                FieldCapture::EventDate(date)
            }
            (WizardState::AwaitingAllDay { .. }, StepInput::AllDayChoice(all_day)) => {
                FieldCapture::AllDay(all_day)
            }
            (WizardState::AwaitingAllDay { .. }, StepInput::Text(_)) => {
                return Err(StepError::ChoicePending);
            }
            (WizardState::AwaitingStart { .. }, StepInput::Text(text)) => {
                let time = parse_hhmm(text).ok_or(StepError::BadTime)?;
                FieldCapture::StartTime(time)
            }
            (WizardState::AwaitingEnd { .. }, StepInput::Text(text)) => {
                let time = parse_hhmm(text).ok_or(StepError::BadTime)?;
                FieldCapture::EndTime(time)
            }
            (WizardState::AwaitingLocation { .. }, StepInput::Text(text)) => {
                // Any text is a valid location
                FieldCapture::Location(text.trim().to_string())
            }
            _ => return Err(StepError::NotCollecting),
        };

        let next = resume_state(&fields.with(&capture));
        Ok(Advance { capture, next })
    }

    /// The force-reply question for this state. All-day and review states
    /// are answered with inline buttons instead, so they have no prompt.
    pub fn prompt(&self) -> Option<StepPrompt> {
        match self {
            WizardState::AwaitingTitle => Some(StepPrompt {
                text: "📝 Qual o título do evento?\n<i>Ex: Reunião com a equipe</i>",
                placeholder: "Título do evento",
            }),
            WizardState::AwaitingDate { .. } => Some(StepPrompt {
                text: "📅 Qual a data? (dd/mm/aaaa)\n<i>Ex: 15/02/2026</i>",
                placeholder: "dd/mm/aaaa",
            }),
            WizardState::AwaitingStart { .. } => Some(StepPrompt {
                text: "🟢 Horário de início? (HH:MM)\n<i>Ex: 14:00</i>",
                placeholder: "HH:MM",
            }),
            WizardState::AwaitingEnd { .. } => Some(StepPrompt {
                text: "🔴 Horário de fim?\n<i>Ex: 16:00</i>",
                placeholder: "HH:MM",
            }),
            WizardState::AwaitingLocation { .. } => Some(StepPrompt {
                text: "📍 Qual o local?\n<i>Ex: Escritório, Sala 302</i>",
                placeholder: "Local",
            }),
            WizardState::AwaitingAllDay { .. } | WizardState::Review => None,
        }
    }

    pub fn step_name(&self) -> &'static str {
        match self {
            WizardState::AwaitingTitle => "awaiting_title",
            WizardState::AwaitingDate { .. } => "awaiting_date",
            WizardState::AwaitingAllDay { .. } => "awaiting_allday_choice",
            WizardState::AwaitingStart { .. } => "awaiting_start",
            WizardState::AwaitingEnd { .. } => "awaiting_end",
            WizardState::AwaitingLocation { .. } => "awaiting_location",
            WizardState::Review => "review",
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn from_json(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }
}

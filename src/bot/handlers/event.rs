use super::{hub, HandlerContext};
use crate::bot::cards::event as cards;
use crate::bot::transport::Transport;
use crate::bot::wizard::{
    resume_state, state_for_edit, DraftFields, EditField, FieldCapture, StepInput, WizardState,
};
use crate::database::models::{BotState, Event, EventStatus};

pub(super) async fn load_state(
    ctx: &HandlerContext,
    user_id: i64,
) -> Result<Option<WizardState>, sqlx::Error> {
    Ok(BotState::load(ctx.db.pool(), user_id)
        .await?
        .and_then(|s| s.state)
        .and_then(|raw| WizardState::from_json(&raw)))
}

async fn apply_capture(
    ctx: &HandlerContext,
    event_id: &str,
    capture: &FieldCapture,
) -> Result<(), sqlx::Error> {
    let pool = ctx.db.pool();
    match capture {
        FieldCapture::Title(title) => Event::set_title(pool, event_id, title).await,
        FieldCapture::EventDate(date) => {
            Event::set_event_date(pool, event_id, &date.format("%Y-%m-%d").to_string()).await
        }
        FieldCapture::AllDay(all_day) => Event::apply_all_day(pool, event_id, *all_day).await,
        FieldCapture::StartTime(time) => {
            Event::set_start_time(pool, event_id, &time.format("%H:%M").to_string()).await
        }
        FieldCapture::EndTime(time) => {
            Event::set_end_time(pool, event_id, &time.format("%H:%M").to_string()).await
        }
        FieldCapture::Location(location) => Event::set_location(pool, event_id, location).await,
    }
}

/// Shows the card matching the wizard state and sends its force-reply
/// question when the state collects text.
async fn render_step(
    transport: &Transport,
    state: &WizardState,
    fields: &DraftFields,
) -> anyhow::Result<()> {
    let card = match state {
        WizardState::AwaitingAllDay { .. } => cards::allday_card(fields),
        WizardState::Review => cards::review_card(fields),
        _ => cards::creating_card(fields, state),
    };
    transport.show_card(&card).await?;

    if let Some(prompt) = state.prompt() {
        transport.send_prompt(prompt.text, prompt.placeholder).await?;
    }
    Ok(())
}

/// Opens the wizard. An abandoned draft is picked up at its first
/// unanswered question instead of starting over.
pub async fn start_wizard(transport: &Transport, ctx: &HandlerContext) -> anyhow::Result<()> {
    let user_id = transport.user_id();
    let draft = Event::create_draft(ctx.db.pool(), user_id).await?;
    let fields = DraftFields::from_event(&draft);
    let state = resume_state(&fields);

    BotState::set_state(ctx.db.pool(), user_id, Some(&state.to_json())).await?;
    render_step(transport, &state, &fields).await
}

pub async fn allday_choice(
    transport: &Transport,
    ctx: &HandlerContext,
    all_day: bool,
) -> anyhow::Result<()> {
    let user_id = transport.user_id();
    let Some(draft) = Event::find_draft(ctx.db.pool(), user_id).await? else {
        BotState::clear_state(ctx.db.pool(), user_id).await?;
        return Ok(());
    };
    let fields = DraftFields::from_event(&draft);
    let state = load_state(ctx, user_id)
        .await?
        .unwrap_or_else(|| resume_state(&fields));

    // A tap on a stale button outside the all-day question is ignored.
    if let Ok(advance) = state.advance(StepInput::AllDayChoice(all_day), &fields) {
        apply_capture(ctx, &draft.id, &advance.capture).await?;
        BotState::set_state(ctx.db.pool(), user_id, Some(&advance.next.to_json())).await?;
        render_step(transport, &advance.next, &fields.with(&advance.capture)).await?;
    }
    Ok(())
}

/// One free-text answer while the wizard is active. Returns false when the
/// wizard is not collecting and the message should go to the classifier.
pub async fn handle_wizard_text(
    transport: &Transport,
    ctx: &HandlerContext,
    state: WizardState,
    text: &str,
) -> anyhow::Result<bool> {
    let user_id = transport.user_id();
    let Some(draft) = Event::find_draft(ctx.db.pool(), user_id).await? else {
        // State without a draft row. Drop it and swallow the message.
        BotState::clear_state(ctx.db.pool(), user_id).await?;
        return Ok(true);
    };
    let fields = DraftFields::from_event(&draft);

    match state.advance(StepInput::Text(text), &fields) {
        Ok(advance) => {
            apply_capture(ctx, &draft.id, &advance.capture).await?;
            BotState::set_state(ctx.db.pool(), user_id, Some(&advance.next.to_json())).await?;
            render_step(transport, &advance.next, &fields.with(&advance.capture)).await?;
            Ok(true)
        }
        Err(err) => match err.retry_message() {
            Some(message) => {
                match state.prompt() {
                    Some(prompt) => {
                        transport.send_prompt(message, prompt.placeholder).await?;
                    }
                    None => {
                        transport.send_line(message).await?;
                    }
                }
                Ok(true)
            }
            None => Ok(false),
        },
    }
}

pub async fn confirm(transport: &Transport, ctx: &HandlerContext) -> anyhow::Result<()> {
    let user_id = transport.user_id();
    let Some(draft) = Event::find_draft(ctx.db.pool(), user_id).await? else {
        return Ok(());
    };
    let fields = DraftFields::from_event(&draft);

    if !fields.is_complete() {
        // A confirm tap on a half-filled draft resumes the open question.
        let state = resume_state(&fields);
        BotState::set_state(ctx.db.pool(), user_id, Some(&state.to_json())).await?;
        return render_step(transport, &state, &fields).await;
    }

    Event::set_status(ctx.db.pool(), &draft.id, EventStatus::Confirmed).await?;
    BotState::clear_state(ctx.db.pool(), user_id).await?;
    transport.clear_prompt().await?;
    transport.show_card(&cards::confirmed_card(&fields)).await
}

pub async fn cancel(transport: &Transport, ctx: &HandlerContext) -> anyhow::Result<()> {
    let user_id = transport.user_id();
    if let Some(draft) = Event::find_draft(ctx.db.pool(), user_id).await? {
        Event::set_status(ctx.db.pool(), &draft.id, EventStatus::Cancelled).await?;
    }
    BotState::clear_state(ctx.db.pool(), user_id).await?;
    transport.clear_prompt().await?;
    hub::show_hub(transport, ctx).await
}

pub async fn edit_menu(transport: &Transport, ctx: &HandlerContext) -> anyhow::Result<()> {
    let Some(draft) = Event::find_draft(ctx.db.pool(), transport.user_id()).await? else {
        return Ok(());
    };
    transport
        .show_card(&cards::edit_menu_card(&DraftFields::from_event(&draft)))
        .await
}

/// Back from the edit menu to wherever the draft stands, normally Review.
pub async fn exit_edit(transport: &Transport, ctx: &HandlerContext) -> anyhow::Result<()> {
    let user_id = transport.user_id();
    let Some(draft) = Event::find_draft(ctx.db.pool(), user_id).await? else {
        return Ok(());
    };
    let fields = DraftFields::from_event(&draft);
    let state = resume_state(&fields);

    BotState::set_state(ctx.db.pool(), user_id, Some(&state.to_json())).await?;
    render_step(transport, &state, &fields).await
}

/// Re-asks a single field from the review card. Once answered, the
/// first-unanswered-question rule brings the user straight back to Review.
pub async fn edit_field(
    transport: &Transport,
    ctx: &HandlerContext,
    field: EditField,
) -> anyhow::Result<()> {
    let user_id = transport.user_id();
    let Some(draft) = Event::find_draft(ctx.db.pool(), user_id).await? else {
        return Ok(());
    };
    let fields = DraftFields::from_event(&draft);
    let state = state_for_edit(field, &fields).unwrap_or_else(|| resume_state(&fields));

    BotState::set_state(ctx.db.pool(), user_id, Some(&state.to_json())).await?;
    transport.clear_prompt().await?;
    render_step(transport, &state, &fields).await
}

//! Command Handlers module for turning typed lines into application events

use anyhow::Result;
use std::path::PathBuf;

use super::ui_builder::{format_notices, format_share, help_text, render_view};
use crate::app::{App, AppEvent, CookingInput};
use crate::browse::BrowseQuery;
use crate::filters::{DietaryFilter, DifficultyFilter, FilterChange, TimeFilter};
use crate::session_context::AppView;

/// A parsed console line
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Help,
    Quit,
    Show,
    Event(AppEvent),
    /// Start cooking the n-th visible recipe
    Open(usize),
    /// Toggle favorite on the n-th visible recipe
    Save(usize),
    Share(usize),
    ToggleItem(usize),
    RemoveItem(usize),
}

/// Whether the loop should keep reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

fn parse_index(arg: &str) -> Result<usize, String> {
    arg.trim()
        .parse::<usize>()
        .ok()
        .filter(|n| *n >= 1)
        .ok_or_else(|| format!("Expected a number, got '{}'", arg.trim()))
}

fn parse_filter(kind: &str, value: &str) -> Result<FilterChange, String> {
    match kind {
        "diet" => value.parse::<DietaryFilter>().map(FilterChange::Dietary),
        "prep" => value.parse::<TimeFilter>().map(FilterChange::PrepTime),
        "cook" => value.parse::<TimeFilter>().map(FilterChange::CookTime),
        "difficulty" => value.parse::<DifficultyFilter>().map(FilterChange::Difficulty),
        other => Err(format!("Unknown filter '{}'", other)),
    }
}

/// Parse a line. While cooking, anything unknown is passed on as a spoken phrase.
pub fn parse_command(line: &str, in_cooking: bool) -> Result<Option<ConsoleCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word.to_lowercase(), rest.trim()),
        None => (line.to_lowercase(), ""),
    };

    if in_cooking {
        return Ok(Some(parse_cooking(&word, rest, line)?));
    }

    let command = match word.as_str() {
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" => ConsoleCommand::Quit,
        "show" | "ls" => ConsoleCommand::Show,
        "home" => ConsoleCommand::Event(AppEvent::Navigate(AppView::Home)),
        "recipes" => ConsoleCommand::Event(AppEvent::Navigate(AppView::Recipes)),
        "saved" => ConsoleCommand::Event(AppEvent::Navigate(AppView::Saved)),
        "shopping" => ConsoleCommand::Event(AppEvent::Navigate(AppView::Shopping)),
        "profile" => ConsoleCommand::Event(AppEvent::Navigate(AppView::Profile)),
        "camera" => ConsoleCommand::Event(AppEvent::StartCamera),
        "snap" => ConsoleCommand::Event(AppEvent::Snap),
        "retake" => ConsoleCommand::Event(AppEvent::Retake),
        "use" => ConsoleCommand::Event(AppEvent::ConfirmCapture),
        "upload" if rest.starts_with("data:") => {
            ConsoleCommand::Event(AppEvent::UploadDataUrl(rest.to_string()))
        }
        "upload" if !rest.is_empty() => ConsoleCommand::Event(AppEvent::UploadFile(PathBuf::from(rest))),
        "diet" | "prep" | "cook" | "difficulty" => {
            ConsoleCommand::Event(AppEvent::ChangeFilter(parse_filter(&word, rest)?))
        }
        "search" => ConsoleCommand::Event(AppEvent::Search(BrowseQuery::new(rest, ""))),
        "ingredient" => ConsoleCommand::Event(AppEvent::Search(BrowseQuery::new("", rest))),
        "images" => ConsoleCommand::Event(AppEvent::LoadImages),
        "open" => ConsoleCommand::Open(parse_index(rest)?),
        "save" => ConsoleCommand::Save(parse_index(rest)?),
        "share" => ConsoleCommand::Share(parse_index(rest)?),
        "voice" => ConsoleCommand::Event(AppEvent::ToggleGlobalVoice),
        "say" if !rest.is_empty() => ConsoleCommand::Event(AppEvent::GlobalUtterance(rest.to_string())),
        "add" if !rest.is_empty() => ConsoleCommand::Event(AppEvent::AddShoppingItem(rest.to_string())),
        "toggle" => ConsoleCommand::ToggleItem(parse_index(rest)?),
        "remove" => ConsoleCommand::RemoveItem(parse_index(rest)?),
        "clear" => ConsoleCommand::Event(AppEvent::ClearShoppingList),
        "guest" => ConsoleCommand::Event(AppEvent::SignInGuest),
        "login" => ConsoleCommand::Event(AppEvent::SignInFederated),
        "logout" => ConsoleCommand::Event(AppEvent::SignOut),
        "staple" if !rest.is_empty() => ConsoleCommand::Event(AppEvent::ToggleStaple(rest.to_string())),
        _ => return Err(format!("Unknown command '{}'. Type 'help'.", line)),
    };
    Ok(Some(command))
}

fn parse_cooking(word: &str, rest: &str, line: &str) -> Result<ConsoleCommand, String> {
    let input = match word {
        "help" | "?" => return Ok(ConsoleCommand::Help),
        "show" => return Ok(ConsoleCommand::Show),
        "next" if rest.is_empty() => CookingInput::Next,
        "back" if rest.is_empty() => CookingInput::Previous,
        "step" => CookingInput::Jump(parse_index(rest)?),
        "read" if rest.is_empty() => CookingInput::ToggleRead,
        "stop" if rest.is_empty() => CookingInput::StopReading,
        "add" if rest.is_empty() => CookingInput::AddMissing,
        "rate" => CookingInput::Rate(parse_index(rest)?.min(u8::MAX as usize) as u8),
        "ingredients" if rest.is_empty() => CookingInput::ToggleIngredients,
        "photo" if rest.is_empty() => CookingInput::OpenPhoto,
        "close" if rest.is_empty() => CookingInput::ClosePhoto,
        "zoom" => match rest {
            "in" => CookingInput::ZoomIn,
            "out" => CookingInput::ZoomOut,
            "reset" => CookingInput::ResetZoom,
            other => match other.parse::<f64>() {
                Ok(delta) => CookingInput::Wheel(delta),
                Err(_) => return Err(format!("Unknown zoom '{}'", other)),
            },
        },
        "mic" => CookingInput::ToggleVoice,
        "exit" | "quit" | "done" => CookingInput::Exit,
        _ => CookingInput::Utterance(line.to_string()),
    };
    Ok(ConsoleCommand::Event(AppEvent::Cooking(input)))
}

fn recipe_id_at(app: &App, number: usize) -> Option<String> {
    app.visible_recipes()
        .get(number.checked_sub(1)?)
        .map(|recipe| recipe.id.clone())
}

fn shopping_id_at(app: &App, number: usize) -> Option<String> {
    app.shopping()
        .items()
        .get(number.checked_sub(1)?)
        .map(|item| item.id.clone())
}

/// Run one command against the app, returning the lines to print
pub async fn handle_command(app: &mut App, command: ConsoleCommand) -> Result<(Flow, Vec<String>)> {
    let in_cooking = app.cooking().is_some();
    let event = match command {
        ConsoleCommand::Help => return Ok((Flow::Continue, help_text(in_cooking))),
        ConsoleCommand::Quit => return Ok((Flow::Quit, vec![])),
        ConsoleCommand::Show => return Ok((Flow::Continue, render_view(app))),
        ConsoleCommand::Share(number) => {
            let lines = match number.checked_sub(1).and_then(|i| app.visible_recipes().get(i).copied()) {
                Some(recipe) => format_share(recipe, app.localization(), app.language()),
                None => vec![format!("No recipe #{}", number)],
            };
            return Ok((Flow::Continue, lines));
        }
        ConsoleCommand::Event(event) => event,
        ConsoleCommand::Open(number) => match recipe_id_at(app, number) {
            Some(id) => AppEvent::SelectRecipe(id),
            None => return Ok((Flow::Continue, vec![format!("No recipe #{}", number)])),
        },
        ConsoleCommand::Save(number) => match recipe_id_at(app, number) {
            Some(id) => AppEvent::ToggleSave(id),
            None => return Ok((Flow::Continue, vec![format!("No recipe #{}", number)])),
        },
        ConsoleCommand::ToggleItem(number) => match shopping_id_at(app, number) {
            Some(id) => AppEvent::ToggleShoppingItem(id),
            None => return Ok((Flow::Continue, vec![format!("No item #{}", number)])),
        },
        ConsoleCommand::RemoveItem(number) => match shopping_id_at(app, number) {
            Some(id) => AppEvent::RemoveShoppingItem(id),
            None => return Ok((Flow::Continue, vec![format!("No item #{}", number)])),
        },
    };

    let notices = app.dispatch(event).await;
    let mut lines = format_notices(&notices);
    lines.extend(render_view(app));
    Ok((Flow::Continue, lines))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_browse_commands() {
        assert_eq!(parse_command("  ", false), Ok(None));
        assert_eq!(parse_command("open 2", false), Ok(Some(ConsoleCommand::Open(2))));
        assert_eq!(
            parse_command("diet gluten free", false),
            Ok(Some(ConsoleCommand::Event(AppEvent::ChangeFilter(FilterChange::Dietary(
                DietaryFilter::GlutenFree
            )))))
        );
        assert!(parse_command("open zero", false).is_err());
        assert!(parse_command("open 0", false).is_err());
        assert!(parse_command("fly", false).is_err());
    }

    #[test]
    fn test_unknown_cooking_line_is_an_utterance() {
        assert_eq!(
            parse_command("Next please", true),
            Ok(Some(ConsoleCommand::Event(AppEvent::Cooking(CookingInput::Utterance(
                "Next please".to_string()
            )))))
        );
        assert_eq!(
            parse_command("step 3", true),
            Ok(Some(ConsoleCommand::Event(AppEvent::Cooking(CookingInput::Jump(3)))))
        );
        assert_eq!(
            parse_command("zoom in", true),
            Ok(Some(ConsoleCommand::Event(AppEvent::Cooking(CookingInput::ZoomIn))))
        );
    }
}

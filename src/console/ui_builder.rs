//! UI Builder module for formatting terminal screens

use crate::app::{App, Notice};
use crate::browse::{share_text, CardImage, MissingSummary};
use crate::cooking::CookingSession;
use crate::filters::FilterState;
use crate::localization::LocalizationManager;
use crate::models::Recipe;
use crate::profile::{UserProfile, COMMON_STAPLES};
use crate::session_context::AppView;

/// Format notices, alerts standing out
pub fn format_notices(notices: &[Notice]) -> Vec<String> {
    notices
        .iter()
        .map(|notice| match notice {
            Notice::Info(text) => format!("ℹ️  {}", text),
            Notice::Alert(text) => format!("⚠️  {}", text),
        })
        .collect()
}

pub fn format_filters(filters: &FilterState) -> String {
    format!(
        "Diet: {} | Prep: {} | Cook: {} | Difficulty: {}",
        filters.dietary, filters.prep_time, filters.cook_time, filters.difficulty
    )
}

fn header(app: &App) -> String {
    let loc = app.localization();
    let lang = app.language();
    format!(
        "== {} · {} ==",
        loc.t_lang("app-title", lang),
        loc.t_lang(app.context().view().message_key(), lang)
    )
}

/// Render whatever the current view shows
pub fn render_view(app: &App) -> Vec<String> {
    let mut lines = vec![header(app)];
    match app.context().view() {
        AppView::Home => lines.extend(render_home(app)),
        AppView::Recipes | AppView::Saved => lines.extend(render_recipe_list(app)),
        AppView::Cooking => {
            if let Some(session) = app.cooking() {
                lines.extend(render_cooking(session));
            }
        }
        AppView::Shopping => lines.extend(render_shopping(app)),
        AppView::Profile => lines.extend(render_profile(app)),
    }
    lines
}

fn render_home(app: &App) -> Vec<String> {
    let loc = app.localization();
    let lang = app.language();
    let mut lines = vec![
        loc.t_lang("app-tagline", lang),
        format_filters(&app.context().filters()),
    ];
    if let Some(key) = app.capture().status_key() {
        lines.push(loc.t_lang(key, lang));
    } else if app.capture().is_streaming() {
        lines.push(loc.t_lang("camera-streaming", lang));
    } else if app.capture().captured().is_some() {
        lines.push(loc.t_lang("capture-ready", lang));
    }
    lines
}

fn render_recipe_list(app: &App) -> Vec<String> {
    let loc = app.localization();
    let lang = app.language();
    let context = app.context();
    let mut lines = Vec::new();

    if context.view() == AppView::Recipes {
        lines.push(format_filters(&context.filters()));
        if context.is_generating() {
            lines.push(loc.t_lang("generating", lang));
            return lines;
        }
        if !context.intro_text().is_empty() {
            lines.push(context.intro_text().to_string());
        }
    }

    let recipes = app.visible_recipes();
    if recipes.is_empty() {
        lines.push(loc.t_lang("no-recipes", lang));
    }
    for (index, recipe) in recipes.iter().enumerate() {
        lines.extend(format_recipe_card(app, index + 1, recipe));
    }
    lines
}

/// One card: title, meta line, missing summary, rating and image state
pub fn format_recipe_card(app: &App, number: usize, recipe: &Recipe) -> Vec<String> {
    let loc = app.localization();
    let lang = app.language();
    let star = if app.is_saved(&recipe.id) { "★" } else { "☆" };
    let image = match app.images().card_image(recipe) {
        CardImage::Ready(_) => "📷",
        CardImage::Loading => "⏳",
        CardImage::Placeholder => "🍽",
    };

    let mut lines = vec![
        format!("{}. {} {} {}", number, star, image, recipe.title),
        format!(
            "   {} · {} prep · {} cook · {}",
            recipe.difficulty, recipe.prep_time, recipe.cook_time, recipe.calories
        ),
        format!(
            "   {} · {}",
            MissingSummary::for_recipe(recipe).render(loc, lang),
            app.rating_summary(&recipe.title)
        ),
    ];
    if !recipe.tags.is_empty() {
        lines.push(format!("   #{}", recipe.tags.join(" #")));
    }
    lines
}

pub fn format_share(recipe: &Recipe, localization: &LocalizationManager, language: Option<&str>) -> Vec<String> {
    share_text(recipe, localization, language)
        .lines()
        .map(str::to_string)
        .collect()
}

fn render_cooking(session: &CookingSession) -> Vec<String> {
    let recipe = session.recipe();
    let mut lines = vec![
        format!("🍳 {}", recipe.title),
        format!("[{}/{}] {}", session.step() + 1, session.step_count(), session.current_step_text()),
    ];

    if session.ingredients_visible() {
        lines.push("Ingredients:".to_string());
        for item in &recipe.ingredients {
            lines.push(format!("  • {}", item.shopping_label()));
        }
    }

    let viewer = session.viewer();
    if viewer.is_open() {
        let pan = viewer.pan();
        lines.push(format!(
            "📷 zoom {:.1}x, pan ({:.0}, {:.0})",
            viewer.zoom(),
            pan.x,
            pan.y
        ));
    }

    if session.is_reading() {
        lines.push("🔊 …".to_string());
    }
    if session.rating().selected() > 0 {
        let stars = session.rating().selected() as usize;
        lines.push(format!("{}{}", "★".repeat(stars), "☆".repeat(5 - stars)));
    }
    lines
}

fn render_shopping(app: &App) -> Vec<String> {
    let loc = app.localization();
    let lang = app.language();
    let list = app.shopping();
    if list.is_empty() {
        return vec![loc.t_lang("shopping-empty", lang)];
    }

    let number_of = |id: &str| {
        list.items()
            .iter()
            .position(|item| item.id == id)
            .map(|i| i + 1)
            .unwrap_or(0)
    };

    let mut lines = Vec::new();
    for group in list.grouped() {
        let title = group
            .title
            .map(str::to_string)
            .unwrap_or_else(|| loc.t_lang("shopping-general", lang));
        let mark = if group.all_acquired() { " ✓" } else { "" };
        lines.push(format!("{}{}", title, mark));
        for item in group.items {
            let check = if item.acquired { "[x]" } else { "[ ]" };
            lines.push(format!("  {}. {} {}", number_of(&item.id), check, item.name));
        }
    }
    lines
}

fn render_profile(app: &App) -> Vec<String> {
    let loc = app.localization();
    let lang = app.language();
    match app.profile().profile() {
        Some(profile) => format_profile(profile),
        None => vec![loc.t_lang("signed-out", lang)],
    }
}

pub fn format_profile(profile: &UserProfile) -> Vec<String> {
    let mut lines = vec![
        format!("👩‍🍳 {}", profile.display_name()),
        format!("Diet: {}", profile.preferences.dietary),
        "Pantry staples:".to_string(),
    ];
    for staple in COMMON_STAPLES {
        let check = if profile.has_pantry_item(staple) { "[x]" } else { "[ ]" };
        lines.push(format!("  {} {}", check, staple));
    }
    let custom = profile.custom_items();
    if !custom.is_empty() {
        lines.push(format!("Custom: {}", custom.join(", ")));
    }
    lines
}

pub fn help_text(in_cooking: bool) -> Vec<String> {
    let lines: &[&str] = if in_cooking {
        &[
            "next | back | step <n> | read | stop | add | rate <1-5>",
            "ingredients | photo | close | zoom in|out|reset | mic | exit",
            "Anything else is treated as a spoken command.",
        ]
    } else {
        &[
            "home | recipes | saved | shopping | profile | help | quit",
            "camera | snap | upload <path> | retake | use",
            "diet <value> | prep <value> | cook <value> | difficulty <value>",
            "search <text> | ingredient <text> | images | open <n> | save <n> | share <n>",
            "voice | say <phrase>",
            "add <item> | toggle <n> | remove <n> | clear",
            "guest | login | logout | staple <name>",
        ]
    };
    lines.iter().map(|l| l.to_string()).collect()
}

mod test_helpers;

use chef_snap::filters::{DietaryFilter, DifficultyFilter, FilterChange};
use chef_snap::gateway_errors::GatewayError;
use chef_snap::session_context::{AppView, GenerationOutcome, SessionContext};
use test_helpers::{sample_generation, sample_recipe};

#[cfg(test)]
mod tests {
    use super::*;

    fn browsing_context() -> SessionContext {
        let mut context = SessionContext::new();
        context.begin_analysis();
        context.analysis_complete(vec!["Eggs".to_string()], vec!["Salt".to_string()]);
        let outcome = context.finish_generation(Ok(sample_generation()));
        assert_eq!(outcome, GenerationOutcome::Ready { count: 2 });
        context
    }

    #[test]
    fn test_analysis_moves_to_browsing() {
        let mut context = SessionContext::new();
        context.begin_analysis();
        assert!(context.is_analyzing());

        let request = context.analysis_complete(vec!["Eggs".to_string()], vec!["Salt".to_string()]);
        assert_eq!(context.view(), AppView::Recipes);
        assert!(context.is_generating());
        assert_eq!(request.ingredients, vec!["Eggs".to_string()]);
        assert_eq!(request.pantry, vec!["Salt".to_string()]);
    }

    #[test]
    fn test_analysis_failure_returns_home() {
        let mut context = SessionContext::new();
        context.begin_analysis();
        context.analysis_failed();
        assert_eq!(context.view(), AppView::Home);
        assert!(!context.is_analyzing());
    }

    /// Changing a filter while browsing clears the list before regenerating
    #[test]
    fn test_filter_change_clears_and_regenerates() {
        let mut context = browsing_context();

        let request = context
            .apply_filter(FilterChange::Dietary(DietaryFilter::Vegan), vec![])
            .expect("browsing with ingredients regenerates");
        assert!(context.generated().is_empty());
        assert!(context.is_generating());
        assert_eq!(request.filters.dietary, DietaryFilter::Vegan);
        assert_eq!(request.ingredients, vec!["Eggs".to_string()]);
    }

    /// Outside browsing the filter is only remembered
    #[test]
    fn test_filter_change_at_home_is_stored_only() {
        let mut context = SessionContext::new();
        let request = context.apply_filter(FilterChange::Difficulty(DifficultyFilter::Easy), vec![]);
        assert!(request.is_none());
        assert_eq!(context.filters().difficulty, DifficultyFilter::Easy);
    }

    /// A failed regeneration stays in browsing with an empty list
    #[test]
    fn test_regeneration_failure_keeps_browsing() {
        let mut context = browsing_context();
        context.apply_filter(FilterChange::Dietary(DietaryFilter::Keto), vec![]);

        let outcome = context.finish_generation(Err(GatewayError::generation("quota exceeded")));
        assert!(matches!(outcome, GenerationOutcome::RegenerationFailed(_)));
        assert_eq!(context.view(), AppView::Recipes);
        assert!(context.generated().is_empty());
    }

    #[test]
    fn test_capture_generation_failure_returns_home() {
        let mut context = SessionContext::new();
        context.analysis_complete(vec!["Eggs".to_string()], vec![]);
        let outcome = context.finish_generation(Err(GatewayError::generation("boom")));
        assert!(matches!(outcome, GenerationOutcome::CaptureFailed(_)));
        assert_eq!(context.view(), AppView::Home);
    }

    #[test]
    fn test_unrequested_result_is_ignored() {
        let mut context = SessionContext::new();
        assert_eq!(context.finish_generation(Ok(sample_generation())), GenerationOutcome::Ignored);
        assert!(context.generated().is_empty());
    }

    /// Cooking returns to the view it was opened from
    #[test]
    fn test_cooking_returns_to_origin() {
        let mut context = browsing_context();
        context.navigate(AppView::Saved);
        context.select_recipe(sample_recipe("r1", "Spinach Omelette", 3, &[]));
        assert_eq!(context.view(), AppView::Cooking);
        context.close_cooking();
        assert_eq!(context.view(), AppView::Saved);

        context.navigate(AppView::Recipes);
        context.select_recipe(sample_recipe("r2", "Green Shakshuka", 3, &[]));
        context.close_cooking();
        assert_eq!(context.view(), AppView::Recipes);
    }

    #[test]
    fn test_global_voice_pauses_while_cooking() {
        let mut context = browsing_context();
        assert!(context.toggle_global_voice());
        assert!(context.global_voice_should_run());

        context.select_recipe(sample_recipe("r1", "Spinach Omelette", 3, &[]));
        assert!(!context.global_voice_should_run());
        context.close_cooking();
        assert!(context.global_voice_should_run());
    }

    #[test]
    fn test_patch_image_reaches_selected_recipe() {
        let mut context = browsing_context();
        let selected = context.generated()[0].clone();
        context.select_recipe(selected);

        let patched = context.patch_image("r1", "data:image/png;base64,AAAA");
        assert_eq!(patched, 2);
        assert!(context.generated()[0].has_image());
        assert!(context.selected().is_some_and(|r| r.has_image()));
    }
}

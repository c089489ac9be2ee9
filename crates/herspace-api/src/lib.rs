pub mod analytics;
pub mod assistant;
pub mod auth;
pub mod chat;
pub mod community;
pub mod error;
pub mod extract;
pub mod journal;
pub mod middleware;
pub mod motherhood;
pub mod notifications;
pub mod reading;
pub mod rituals;
pub mod tarot;
pub mod users;
pub mod wellness;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::auth::AppState;
use crate::middleware::{require_auth, resolve_identity};

/// Every HTTP route, mounted under `/api`.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/users/auth/register/", post(auth::register))
        .route("/token/", post(auth::login))
        .route("/token/refresh/", post(auth::refresh));

    let protected_routes = Router::new()
        // Users
        .route("/users/me/", get(users::me))
        .route("/users/stats/", get(users::stats))
        // Journal
        .route("/journal/journal-entries/", get(journal::list_entries).post(journal::create_entry))
        .route(
            "/journal/journal-entries/{id}/",
            get(journal::get_entry)
                .put(journal::update_entry)
                .patch(journal::update_entry)
                .delete(journal::delete_entry),
        )
        .route("/journal/mood-checkins/", get(journal::list_checkins).post(journal::create_checkin))
        .route(
            "/journal/mood-checkins/{id}/",
            get(journal::get_checkin)
                .put(journal::update_checkin)
                .patch(journal::update_checkin)
                .delete(journal::delete_checkin),
        )
        .route("/journal/daily-tasks/", get(journal::list_tasks).post(journal::create_task))
        .route(
            "/journal/daily-tasks/{id}/",
            get(journal::get_task)
                .put(journal::update_task)
                .patch(journal::update_task)
                .delete(journal::delete_task),
        )
        .route("/journal/rituals/", get(rituals::list_rituals).post(rituals::create_ritual))
        .route(
            "/journal/rituals/{id}/",
            get(rituals::get_ritual)
                .put(rituals::update_ritual)
                .patch(rituals::update_ritual)
                .delete(rituals::delete_ritual),
        )
        // Tarot and assistant
        .route("/journal/tarot/cards/", get(tarot::list_cards))
        .route("/journal/tarot/readings/", get(tarot::list_readings).post(tarot::create_reading))
        .route(
            "/journal/tarot/readings/{id}/",
            get(tarot::get_reading)
                .patch(tarot::update_reading)
                .delete(tarot::delete_reading),
        )
        .route("/journal/dagi-ai/", post(assistant::dagi))
        .route(
            "/journal/ai/conversations/",
            get(assistant::list_conversations).post(assistant::create_conversation),
        )
        .route(
            "/journal/ai/conversations/{id}/",
            get(assistant::get_conversation).delete(assistant::delete_conversation),
        )
        // Motherhood
        .route("/motherhood/routines/", get(motherhood::list_routines).post(motherhood::create_routine))
        .route(
            "/motherhood/routines/{id}/",
            get(motherhood::get_routine)
                .put(motherhood::update_routine)
                .patch(motherhood::update_routine)
                .delete(motherhood::delete_routine),
        )
        .route("/motherhood/routines/{id}/complete/", post(motherhood::complete_routine))
        .route("/motherhood/completions/", get(motherhood::list_completions))
        .route("/motherhood/resources/", get(motherhood::list_resources))
        .route("/motherhood/resources/{id}/", get(motherhood::get_resource))
        .route("/motherhood/journal/", get(motherhood::list_journal).post(motherhood::create_journal))
        .route(
            "/motherhood/journal/{id}/",
            get(motherhood::get_journal)
                .put(motherhood::update_journal)
                .patch(motherhood::update_journal)
                .delete(motherhood::delete_journal),
        )
        .route("/motherhood/support-groups/", get(motherhood::list_support_groups))
        .route("/motherhood/support-groups/{id}/", get(motherhood::get_support_group))
        // Notifications
        .route("/notifications/", get(notifications::list_notifications))
        .route("/notifications/create/", post(notifications::create_notification))
        .route("/notifications/mark-read/", patch(notifications::mark_read))
        .route("/notifications/stats/", get(notifications::stats))
        .route(
            "/notifications/preferences/",
            get(notifications::get_preferences)
                .put(notifications::update_preferences)
                .patch(notifications::update_preferences),
        )
        .route("/notifications/templates/", get(notifications::list_templates))
        .route("/notifications/{id}/", get(notifications::get_notification))
        // Wellness
        .route("/wellness/onboarding/", post(wellness::onboarding))
        .route("/wellness/profile/", get(wellness::get_profile).put(wellness::update_profile))
        .route("/wellness/wisdom/", get(wellness::wisdom))
        .route("/wellness/rituals/", get(wellness::personalized_rituals))
        .route("/wellness/rituals/track/", post(wellness::track_ritual))
        .route("/wellness/rituals/history/", get(wellness::ritual_history))
        .route("/wellness/mindfulness/", get(wellness::list_mindfulness))
        .route("/wellness/mindfulness/sessions/", get(wellness::list_sessions))
        .route("/wellness/mindfulness/{id}/sessions/", post(wellness::start_session))
        // Analytics
        .route("/analytics/mood/", get(analytics::mood))
        .route("/analytics/tasks/", get(analytics::tasks))
        .route("/analytics/journal/", get(analytics::journal))
        .route("/analytics/insights/", get(analytics::insights))
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_auth));

    let community_routes = Router::new()
        .route("/community/posts/", get(community::list_posts).post(community::create_post))
        .route("/community/posts/{id}/", get(community::get_post))
        .route(
            "/community/posts/{id}/comments/",
            get(community::list_comments).post(community::create_comment),
        )
        .route("/community/posts/{id}/reactions/", post(community::react))
        .route("/community/posts/{id}/reactions/list/", get(community::list_reactions))
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), resolve_identity));

    let api = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(community_routes)
        .with_state(state);

    Router::new().nest("/api", api)
}

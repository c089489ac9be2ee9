use std::collections::HashSet;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use rand::{Rng, seq::IndexedRandom};
use tracing::debug;
use uuid::Uuid;

use herspace_types::api::{
    Claims, EffectivenessContext, LanguageQuery, LocalizedActivity, OnboardingResponse,
    PersonalizedRituals, ProfileInput, RitualHistory, RitualHistoryStats, StartSession,
    TrackRitualRequest, TrackRitualResponse, UserContext, WisdomQuery,
};
use herspace_types::enums::{EmotionalTone, EnergyLevel, Language, LifePhase, SupportStyle};
use herspace_types::models::{
    MindfulnessActivity, MindfulnessSession, Ritual, RitualUsage, UserProfile, WisdomMessage,
};

use crate::auth::{AppState, blocking};
use crate::error::ApiError;
use crate::extract::{JsonBody, QueryParams};

const HIGH_RATING: u8 = 4;
const LOW_RATING: u8 = 2;

// -- Profile --

fn empty_profile() -> UserProfile {
    let now = Utc::now();
    UserProfile {
        current_mood_context: None,
        preferred_support_style: None,
        life_roles: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

fn merge_profile(profile: &mut UserProfile, input: ProfileInput) {
    if input.current_mood_context.is_some() {
        profile.current_mood_context = input.current_mood_context;
    }
    if input.preferred_support_style.is_some() {
        profile.preferred_support_style = input.preferred_support_style;
    }
    if let Some(roles) = input.life_roles {
        profile.life_roles = roles;
    }
    profile.updated_at = Utc::now();
}

async fn save_profile(state: &AppState, user_id: Uuid, input: ProfileInput) -> Result<UserProfile, ApiError> {
    blocking(state, move |db| {
        let mut profile = db.get_profile(user_id)?.unwrap_or_else(empty_profile);
        merge_profile(&mut profile, input);
        db.upsert_profile(user_id, &profile)?;
        Ok(profile)
    })
    .await
}

pub async fn onboarding(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    JsonBody(req): JsonBody<ProfileInput>,
) -> Result<Json<OnboardingResponse>, ApiError> {
    let profile = save_profile(&state, claims.sub, req).await?;
    Ok(Json(OnboardingResponse {
        message: "Onboarding data saved.".into(),
        profile,
    }))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UserProfile>, ApiError> {
    let user = claims.sub;
    let profile = blocking(&state, move |db| {
        if let Some(profile) = db.get_profile(user)? {
            return Ok(profile);
        }
        let profile = empty_profile();
        db.upsert_profile(user, &profile)?;
        Ok(profile)
    })
    .await?;
    Ok(Json(profile))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    JsonBody(req): JsonBody<ProfileInput>,
) -> Result<Json<UserProfile>, ApiError> {
    Ok(Json(save_profile(&state, claims.sub, req).await?))
}

// -- Wisdom --

pub async fn wisdom(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    QueryParams(query): QueryParams<WisdomQuery>,
) -> Result<Json<WisdomMessage>, ApiError> {
    let mood = query.mood_context.unwrap_or(LifePhase::Any);
    let style = query.support_style.unwrap_or(SupportStyle::Any);
    let energy = query.energy_level.unwrap_or(EnergyLevel::Any);

    let message = blocking(&state, move |db| {
        let Some(message) = db.random_wisdom(mood, style, energy)? else {
            return Ok(None);
        };
        db.record_wisdom_delivery(claims.sub, message.id, Utc::now())?;
        Ok(Some(message))
    })
    .await?
    .ok_or(ApiError::NotFound)?;
    Ok(Json(message))
}

// -- Rituals --

fn sample<R: Rng + ?Sized>(pool: &[&Ritual], amount: usize, rng: &mut R) -> Vec<Ritual> {
    pool.choose_multiple(rng, amount).map(|r| (*r).clone()).collect()
}

/// Picks rituals for a user from the active catalogue, steering by their
/// profile and how they rated rituals before. Without a profile only
/// beginner rituals are offered.
pub fn personalize<R: Rng + ?Sized>(
    profile: Option<&UserProfile>,
    active: &[Ritual],
    usages: &[RitualUsage],
    rng: &mut R,
) -> PersonalizedRituals {
    let Some(profile) = profile else {
        let beginners: Vec<&Ritual> = active.iter().filter(|r| r.is_for_beginners).collect();
        return PersonalizedRituals {
            message: "Welcome! Here are some beginner-friendly rituals".into(),
            user_context: None,
            effectiveness_context: None,
            rituals: sample(&beginners, 3, rng),
        };
    };

    let rated = |keep: fn(u8) -> bool| -> Vec<Uuid> {
        usages
            .iter()
            .filter(|u| u.effectiveness_rating.is_some_and(keep))
            .map(|u| u.ritual)
            .collect()
    };
    let highly_rated = rated(|r| r >= HIGH_RATING);
    let high: HashSet<Uuid> = highly_rated.iter().copied().collect();
    let low: HashSet<Uuid> = rated(|r| r <= LOW_RATING).into_iter().collect();

    let phase = profile.current_mood_context;
    let tone = profile.preferred_support_style.map(SupportStyle::ritual_tone);
    let matches: Vec<&Ritual> = active
        .iter()
        .filter(|r| phase.is_none_or(|p| r.for_life_phase == p || r.for_life_phase == LifePhase::Any))
        .filter(|r| tone.is_none_or(|t| r.emotional_tone == t || r.emotional_tone == EmotionalTone::Gentle))
        .collect();

    let favourites: Vec<&Ritual> = matches.iter().copied().filter(|r| high.contains(&r.id)).collect();
    let rituals = if favourites.is_empty() {
        let fresh: Vec<&Ritual> = matches.iter().copied().filter(|r| !low.contains(&r.id)).collect();
        sample(&fresh, 5, rng)
    } else {
        let others: Vec<&Ritual> = matches
            .iter()
            .copied()
            .filter(|r| !high.contains(&r.id) && !low.contains(&r.id))
            .collect();
        let mut picked = sample(&favourites, 3, rng);
        picked.extend(sample(&others, 2, rng));
        picked
    };

    if rituals.is_empty() {
        let gentle: Vec<&Ritual> = active.iter().filter(|r| !low.contains(&r.id)).collect();
        return PersonalizedRituals {
            message: "Here are some gentle rituals for you".into(),
            user_context: None,
            effectiveness_context: None,
            rituals: sample(&gentle, 3, rng),
        };
    }

    PersonalizedRituals {
        message: "Personalized rituals for you".into(),
        user_context: Some(UserContext {
            mood_context: profile.current_mood_context,
            support_style: profile.preferred_support_style,
        }),
        effectiveness_context: Some(EffectivenessContext {
            total_rituals_tried: usages.len() as u32,
            highly_rated_count: highly_rated.len() as u32,
            recommendation_basis: if highly_rated.is_empty() {
                "profile_matching".into()
            } else {
                "effectiveness_history".into()
            },
        }),
        rituals,
    }
}

pub async fn personalized_rituals(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<PersonalizedRituals>, ApiError> {
    let user = claims.sub;
    let (profile, active, usages) = blocking(&state, move |db| {
        Ok((db.get_profile(user)?, db.list_rituals(None, None)?, db.list_ritual_usages(user)?))
    })
    .await?;

    let picks = personalize(profile.as_ref(), &active, &usages, &mut rand::rng());
    debug!("recommending {} rituals to {}", picks.rituals.len(), claims.username);
    Ok(Json(picks))
}

pub async fn track_ritual(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    JsonBody(req): JsonBody<TrackRitualRequest>,
) -> Result<Json<TrackRitualResponse>, ApiError> {
    if let Some(rating) = req.effectiveness_rating {
        if !(1..=5).contains(&rating) {
            return Err(ApiError::field("effectiveness_rating", "Rating must be between 1 and 5."));
        }
    }

    let user = claims.sub;
    let usage = blocking(&state, move |db| {
        let Some(ritual) = db.get_ritual(req.ritual)?.filter(|r| r.is_active) else {
            return Ok(None);
        };
        let usage = RitualUsage {
            id: Uuid::new_v4(),
            ritual: ritual.id,
            ritual_title: ritual.title,
            used_at: Utc::now(),
            was_helpful: req.was_helpful,
            effectiveness_rating: req.effectiveness_rating,
            mood_before: req.mood_before,
            mood_after: req.mood_after,
            notes: req.notes,
        };
        db.insert_ritual_usage(user, &usage)?;
        Ok(Some(usage))
    })
    .await?
    .ok_or(ApiError::NotFound)?;

    Ok(Json(TrackRitualResponse {
        message: "Ritual usage tracked successfully.".into(),
        usage,
    }))
}

pub fn history_stats(usages: &[RitualUsage]) -> RitualHistoryStats {
    let ratings: Vec<f64> = usages
        .iter()
        .filter_map(|u| u.effectiveness_rating)
        .map(f64::from)
        .collect();
    let average_rating = (!ratings.is_empty())
        .then(|| ratings.iter().sum::<f64>() / ratings.len() as f64)
        .map(|avg| (avg * 10.0).round() / 10.0);

    RitualHistoryStats {
        total_rituals_used: usages.len() as u32,
        helpful_rituals: usages.iter().filter(|u| u.was_helpful == Some(true)).count() as u32,
        average_rating,
    }
}

pub async fn ritual_history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<RitualHistory>, ApiError> {
    let history = blocking(&state, move |db| db.list_ritual_usages(claims.sub)).await?;
    let stats = history_stats(&history);
    Ok(Json(RitualHistory { history, stats }))
}

// -- Mindfulness --

fn pick(lang: Language, en: &str, ka: &str) -> String {
    match lang {
        Language::Ka if !ka.trim().is_empty() => ka.to_string(),
        _ => en.to_string(),
    }
}

/// Renders an activity in `lang`, falling back to English per field.
pub fn localize(activity: &MindfulnessActivity, lang: Language) -> LocalizedActivity {
    LocalizedActivity {
        id: activity.id,
        title: pick(lang, &activity.title, &activity.title_ka),
        description: pick(lang, &activity.description, &activity.description_ka),
        short_description: pick(lang, &activity.short_description, &activity.short_description_ka),
        icon: activity.icon.clone(),
        duration_minutes: activity.duration_minutes,
        audio_url: activity.audio_url.clone(),
        category: activity.category,
        difficulty: activity.difficulty,
        created_at: activity.created_at,
        updated_at: activity.updated_at,
    }
}

pub async fn list_mindfulness(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<LanguageQuery>,
) -> Result<Json<Vec<LocalizedActivity>>, ApiError> {
    let lang = query.lang.unwrap_or_default();
    let activities = blocking(&state, |db| db.list_activities()).await?;
    Ok(Json(activities.iter().map(|a| localize(a, lang)).collect()))
}

pub async fn start_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    body: Result<JsonBody<StartSession>, ApiError>,
) -> Result<(StatusCode, Json<MindfulnessSession>), ApiError> {
    // an empty body starts a session with nothing filled in
    let req = body.map(|JsonBody(req)| req).unwrap_or_default();

    let user = claims.sub;
    let session = blocking(&state, move |db| {
        let Some(activity) = db.get_activity(id)? else {
            return Ok(None);
        };
        let now = Utc::now();
        let session = MindfulnessSession {
            id: Uuid::new_v4(),
            activity: activity.id,
            activity_title: activity.title,
            started_at: now,
            duration_minutes: req.duration_minutes,
            mood_before: req.mood_before,
            mood_after: req.mood_after,
            notes: req.notes,
            created_at: now,
        };
        db.insert_session(user, &session)?;
        Ok(Some(session))
    })
    .await?
    .ok_or(ApiError::NotFound)?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn list_sessions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<MindfulnessSession>>, ApiError> {
    let sessions = blocking(&state, move |db| db.list_sessions(claims.sub)).await?;
    Ok(Json(sessions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use herspace_types::enums::{Difficulty, MindfulnessCategory, RitualType};
    use rand::{SeedableRng, rngs::StdRng};

    fn ritual(title: &str, phase: LifePhase, tone: EmotionalTone, beginner: bool) -> Ritual {
        Ritual {
            id: Uuid::new_v4(),
            title: title.into(),
            description: String::new(),
            ritual_type: RitualType::Breathing,
            content: "breathe".into(),
            for_life_phase: phase,
            emotional_tone: tone,
            duration_minutes: 5,
            is_for_beginners: beginner,
            tags: Vec::new(),
            is_active: true,
            language: Language::En,
            created_at: Utc::now(),
        }
    }

    fn usage(ritual: &Ritual, rating: Option<u8>, helpful: Option<bool>) -> RitualUsage {
        RitualUsage {
            id: Uuid::new_v4(),
            ritual: ritual.id,
            ritual_title: ritual.title.clone(),
            used_at: Utc::now(),
            was_helpful: helpful,
            effectiveness_rating: rating,
            mood_before: None,
            mood_after: None,
            notes: None,
        }
    }

    fn profile(phase: Option<LifePhase>, style: Option<SupportStyle>) -> UserProfile {
        UserProfile {
            current_mood_context: phase,
            preferred_support_style: style,
            ..empty_profile()
        }
    }

    #[test]
    fn no_profile_gets_beginner_rituals() {
        let catalogue = vec![
            ritual("a", LifePhase::Any, EmotionalTone::Gentle, true),
            ritual("b", LifePhase::Any, EmotionalTone::Gentle, false),
            ritual("c", LifePhase::Healing, EmotionalTone::Healing, true),
        ];
        let picks = personalize(None, &catalogue, &[], &mut StdRng::seed_from_u64(1));
        assert_eq!(picks.rituals.len(), 2);
        assert!(picks.rituals.iter().all(|r| r.is_for_beginners));
        assert!(picks.user_context.is_none());
    }

    #[test]
    fn profile_filters_phase_and_tone() {
        let catalogue = vec![
            ritual("match", LifePhase::Motherhood, EmotionalTone::Empowering, false),
            ritual("any-gentle", LifePhase::Any, EmotionalTone::Gentle, false),
            ritual("wrong-phase", LifePhase::Healing, EmotionalTone::Empowering, false),
            ritual("wrong-tone", LifePhase::Motherhood, EmotionalTone::Grounding, false),
        ];
        let p = profile(Some(LifePhase::Motherhood), Some(SupportStyle::Empowering));
        let picks = personalize(Some(&p), &catalogue, &[], &mut StdRng::seed_from_u64(2));

        let mut titles: Vec<_> = picks.rituals.iter().map(|r| r.title.as_str()).collect();
        titles.sort();
        assert_eq!(titles, ["any-gentle", "match"]);
        let ctx = picks.effectiveness_context.unwrap();
        assert_eq!(ctx.recommendation_basis, "profile_matching");
    }

    #[test]
    fn favourites_lead_and_low_rated_are_dropped() {
        let loved = ritual("loved", LifePhase::Any, EmotionalTone::Gentle, false);
        let disliked = ritual("disliked", LifePhase::Any, EmotionalTone::Gentle, false);
        let fresh = ritual("fresh", LifePhase::Any, EmotionalTone::Gentle, false);
        let catalogue = vec![loved.clone(), disliked.clone(), fresh.clone()];
        let usages = vec![usage(&loved, Some(5), Some(true)), usage(&disliked, Some(1), Some(false))];

        let p = profile(Some(LifePhase::Growth), None);
        let picks = personalize(Some(&p), &catalogue, &usages, &mut StdRng::seed_from_u64(3));

        assert_eq!(picks.rituals[0].id, loved.id);
        assert!(picks.rituals.iter().any(|r| r.id == fresh.id));
        assert!(picks.rituals.iter().all(|r| r.id != disliked.id));
        let ctx = picks.effectiveness_context.unwrap();
        assert_eq!(ctx.total_rituals_tried, 2);
        assert_eq!(ctx.highly_rated_count, 1);
        assert_eq!(ctx.recommendation_basis, "effectiveness_history");
    }

    #[test]
    fn nothing_matching_falls_back_to_gentle_set() {
        let catalogue = vec![ritual("healing", LifePhase::Healing, EmotionalTone::Uplifting, false)];
        let p = profile(Some(LifePhase::CareerFocus), Some(SupportStyle::Practical));
        let picks = personalize(Some(&p), &catalogue, &[], &mut StdRng::seed_from_u64(4));
        assert_eq!(picks.message, "Here are some gentle rituals for you");
        assert_eq!(picks.rituals.len(), 1);
    }

    #[test]
    fn history_average_is_rounded() {
        let r = ritual("r", LifePhase::Any, EmotionalTone::Gentle, true);
        let usages = vec![
            usage(&r, Some(5), Some(true)),
            usage(&r, Some(4), None),
            usage(&r, Some(4), Some(false)),
            usage(&r, None, Some(true)),
        ];
        let stats = history_stats(&usages);
        assert_eq!(stats.total_rituals_used, 4);
        assert_eq!(stats.helpful_rituals, 2);
        assert_eq!(stats.average_rating, Some(4.3));
        assert_eq!(history_stats(&[]).average_rating, None);
    }

    #[test]
    fn georgian_copy_falls_back_to_english() {
        let now = Utc::now();
        let activity = MindfulnessActivity {
            id: Uuid::new_v4(),
            title: "Breath".into(),
            title_ka: "სუნთქვა".into(),
            description: "Slow breathing".into(),
            description_ka: "  ".into(),
            short_description: "Breathe".into(),
            short_description_ka: String::new(),
            icon: "wind".into(),
            duration_minutes: 5,
            audio_url: None,
            category: MindfulnessCategory::Breathing,
            difficulty: Difficulty::Beginner,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let ka = localize(&activity, Language::Ka);
        assert_eq!(ka.title, "სუნთქვა");
        assert_eq!(ka.description, "Slow breathing");
        assert_eq!(localize(&activity, Language::En).title, "Breath");
    }
}

//! Closed choice sets shared by the wire format and the database.
//!
//! Every enum serializes as `snake_case` both in JSON (serde) and in SQLite
//! TEXT columns (strum), so a value read from a row always round-trips to
//! the same string the client sent.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};

macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash,
            Serialize, Deserialize, AsRefStr, EnumString, EnumIter,
        )]
        #[serde(rename_all = "snake_case")]
        #[strum(serialize_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }
    };
}

// -- Auth --

wire_enum!(TokenType { Access, Refresh });

// -- Journal --

wire_enum!(
    /// Daily mood recorded by a check-in.
    Mood { Happy, Sad, Anxious, Calm }
);

impl Mood {
    /// Score used by mood analytics; higher is brighter.
    pub fn score(self) -> u32 {
        match self {
            Mood::Happy => 4,
            Mood::Calm => 3,
            Mood::Anxious => 2,
            Mood::Sad => 1,
        }
    }
}

wire_enum!(RitualType { Affirmation, Prompt, Meditation, Breathing, Movement });

wire_enum!(
    /// Life phase a ritual is written for. Also used as the "mood context"
    /// of a wellness profile and of wisdom messages.
    LifePhase { Any, Transition, Motherhood, CareerFocus, Healing, Growth }
);

wire_enum!(EmotionalTone { Gentle, Empowering, Grounding, Healing, Uplifting });

wire_enum!(Language { En, Ka });

impl Default for Language {
    fn default() -> Self {
        Language::En
    }
}

// -- Tarot --

wire_enum!(Suit { Major, Cups, Swords, Pentacles, Wands });

wire_enum!(ReadingType { Single, ThreeCard, FiveCard, CelticCross, Custom });

impl ReadingType {
    pub fn for_card_count(count: usize) -> Self {
        match count {
            1 => ReadingType::Single,
            3 => ReadingType::ThreeCard,
            5 => ReadingType::FiveCard,
            10 => ReadingType::CelticCross,
            _ => ReadingType::Custom,
        }
    }
}

wire_enum!(ConversationType { General, Tarot });

// -- Motherhood --

wire_enum!(RoutineType { Feeding, Sleep, Play, Hygiene, Medical, Other });

wire_enum!(ResourceType { Article, Video, Podcast, Book, App, Community, Professional });

wire_enum!(ResourceCategory {
    Pregnancy,
    Newborn,
    Toddler,
    Preschool,
    SchoolAge,
    Teen,
    SelfCare,
    Relationships,
    MentalHealth,
    WorkLife,
});

wire_enum!(MotherhoodMood {
    Overwhelmed,
    Joyful,
    Exhausted,
    Grateful,
    Frustrated,
    Proud,
    Anxious,
    Peaceful,
});

wire_enum!(GroupType { Pregnancy, Newborn, SingleMom, WorkingMom, MentalHealth, General });

// -- Community --

wire_enum!(PostType { Support, Celebration, Advice, Story, Question, Gratitude });

wire_enum!(ReactionType { Heart, Support, Prayer, Celebration, Hug });

wire_enum!(
    /// Outcome of posting a reaction.
    ReactionAction { Added, Removed, Changed }
);

// -- Notifications --

wire_enum!(NotificationType {
    MoodReminder,
    TaskReminder,
    JournalReminder,
    CommunityPost,
    CommentReply,
    ReactionReceived,
    InsightReady,
    RitualSuggestion,
    Custom,
});

wire_enum!(Priority { Low, Medium, High });

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

wire_enum!(TemplateType {
    MoodReminder,
    TaskReminder,
    JournalReminder,
    Welcome,
    Milestone,
    Insight,
    RitualSuggestion,
});

// -- Wellness --

wire_enum!(SupportStyle { Any, Gentle, Empowering, Practical, Spiritual });

impl SupportStyle {
    /// Ritual tone that best matches a preferred support style.
    pub fn ritual_tone(self) -> EmotionalTone {
        match self {
            SupportStyle::Empowering => EmotionalTone::Empowering,
            SupportStyle::Practical => EmotionalTone::Grounding,
            SupportStyle::Spiritual => EmotionalTone::Healing,
            SupportStyle::Any | SupportStyle::Gentle => EmotionalTone::Gentle,
        }
    }
}

wire_enum!(EnergyLevel { Any, Low, Moderate, High });

wire_enum!(MindfulnessCategory { Breathing, Meditation, Gratitude, BodyScan, Movement });

wire_enum!(Difficulty { Beginner, Intermediate, Advanced });

// -- Analytics --

wire_enum!(InsightType { MoodPattern, TaskCompletion, JournalFrequency });

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn db_and_json_spellings_agree() {
        for category in ResourceCategory::iter() {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_ref()));
        }
        assert_eq!(LifePhase::CareerFocus.as_ref(), "career_focus");
        assert_eq!(GroupType::from_str("single_mom").unwrap(), GroupType::SingleMom);
    }

    #[test]
    fn unknown_values_are_rejected() {
        assert!(Mood::from_str("ecstatic").is_err());
        assert!(serde_json::from_str::<ReactionType>("\"like\"").is_err());
    }

    #[test]
    fn reading_type_follows_card_count() {
        assert_eq!(ReadingType::for_card_count(1), ReadingType::Single);
        assert_eq!(ReadingType::for_card_count(3), ReadingType::ThreeCard);
        assert_eq!(ReadingType::for_card_count(10), ReadingType::CelticCross);
        assert_eq!(ReadingType::for_card_count(7), ReadingType::Custom);
    }

    #[test]
    fn practical_support_maps_to_grounding() {
        assert_eq!(SupportStyle::Practical.ritual_tone(), EmotionalTone::Grounding);
        assert_eq!(SupportStyle::Any.ritual_tone(), EmotionalTone::Gentle);
    }
}

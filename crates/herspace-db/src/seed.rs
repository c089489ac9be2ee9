//! Static content the service ships with: the tarot deck, starter rituals,
//! motherhood resources and groups, notification templates, wisdom messages
//! and mindfulness activities.
//!
//! Each table is only seeded while it is empty, so running this on every
//! start is harmless and never overwrites edits made through the API.

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use herspace_types::enums::*;
use herspace_types::models::{
    MindfulnessActivity, MotherhoodResource, NotificationTemplate, Ritual, SupportGroup, TarotCard,
    WisdomMessage,
};

use crate::Database;

type CardSeed = (&'static str, Suit, &'static str, &'static [&'static str], &'static [&'static str]);

const DECK: &[CardSeed] = &[
    ("The Fool", Suit::Major, "New beginnings, innocence, spontaneity, free spirit",
        &["New beginnings", "Innocence", "Spontaneity", "Free spirit", "Adventure"],
        &["Recklessness", "Taken advantage of", "Inconsideration", "Foolish behavior"]),
    ("The Magician", Suit::Major, "Manifestation, resourcefulness, power, inspired action",
        &["Manifestation", "Resourcefulness", "Power", "Inspired action", "Willpower"],
        &["Manipulation", "Poor planning", "Untapped talents", "Lack of focus"]),
    ("The High Priestess", Suit::Major, "Intuition, sacred knowledge, divine feminine, subconscious mind",
        &["Intuition", "Sacred knowledge", "Divine feminine", "Subconscious mind", "Mystery"],
        &["Secrets", "Disconnected from intuition", "Withdrawal", "Silence"]),
    ("The Empress", Suit::Major, "Femininity, beauty, nature, abundance, mother figure",
        &["Femininity", "Beauty", "Nature", "Abundance", "Mother figure", "Nurturing"],
        &["Creative block", "Dependence on others", "Smothering", "Stagnation"]),
    ("The Emperor", Suit::Major, "Authority, establishment, structure, father figure",
        &["Authority", "Establishment", "Structure", "Father figure", "Stability"],
        &["Domination", "Excessive control", "Lack of discipline", "Inflexibility"]),
    ("The Lovers", Suit::Major, "Love, harmony, relationships, values alignment, choices",
        &["Love", "Harmony", "Relationships", "Values alignment", "Choices"],
        &["Self-love", "Disharmony", "Imbalance", "Misalignment of values"]),
    ("The Chariot", Suit::Major, "Control, willpower, success, determination, direction",
        &["Control", "Willpower", "Success", "Determination", "Direction"],
        &["Self-discipline", "Lack of control", "Lack of direction", "Aggression"]),
    ("Strength", Suit::Major, "Strength, courage, persuasion, influence, compassion",
        &["Strength", "Courage", "Persuasion", "Influence", "Compassion"],
        &["Self-doubt", "Low energy", "Raw emotion", "Lack of confidence"]),
    ("The Hermit", Suit::Major, "Soul searching, introspection, inner guidance, solitude",
        &["Soul searching", "Introspection", "Inner guidance", "Solitude"],
        &["Isolation", "Loneliness", "Withdrawal", "Paranoia"]),
    ("Wheel of Fortune", Suit::Major, "Good luck, karma, life cycles, destiny, turning point",
        &["Good luck", "Karma", "Life cycles", "Destiny", "Turning point"],
        &["Bad luck", "Lack of control", "Clinging to control", "Delays"]),
    ("Ace of Cups", Suit::Cups, "Love, new relationships, compassion, creativity",
        &["Love", "New relationships", "Compassion", "Creativity", "Emotional fulfillment"],
        &["Self-love", "Intuition", "Repressed emotions", "Emotional withdrawal"]),
    ("Two of Cups", Suit::Cups, "Unified love, partnership, mutual attraction, connection",
        &["Unified love", "Partnership", "Mutual attraction", "Connection"],
        &["Self-love", "Break-ups", "Disharmony", "Distrust"]),
    ("Three of Cups", Suit::Cups, "Celebration, friendship, creativity, collaborations",
        &["Celebration", "Friendship", "Creativity", "Collaborations"],
        &["Independence", "Private celebration", "Gossip", "Isolation"]),
    ("Ace of Swords", Suit::Swords, "Breakthroughs, new ideas, mental clarity, success",
        &["Breakthroughs", "New ideas", "Mental clarity", "Success"],
        &["Inner clarity", "Re-thinking an idea", "Clouded judgment"]),
    ("Two of Swords", Suit::Swords, "Difficult decisions, weighing up options, avoidance",
        &["Difficult decisions", "Weighing up options", "Avoidance", "Stalemate"],
        &["Inner turmoil", "Indecision", "Confusion", "Information overload"]),
    ("Ace of Pentacles", Suit::Pentacles, "New financial opportunity, manifestation, abundance",
        &["New financial opportunity", "Manifestation", "Abundance", "Prosperity"],
        &["Lost opportunity", "Missed chance", "Bad investment"]),
    ("Two of Pentacles", Suit::Pentacles, "Multiple priorities, time management, prioritization",
        &["Multiple priorities", "Time management", "Prioritization", "Adaptability"],
        &["Over-committed", "Disorganisation", "Reprioritisation"]),
    ("Ace of Wands", Suit::Wands, "Inspiration, new opportunities, growth, potential",
        &["Inspiration", "New opportunities", "Growth", "Potential"],
        &["An emerging idea", "Lack of direction", "Distractions", "Delays"]),
    ("Two of Wands", Suit::Wands, "Future planning, progress, decisions, discovery",
        &["Future planning", "Progress", "Decisions", "Discovery"],
        &["Personal goals", "Inner alignment", "Fear of unknown", "Lack of planning"]),
];

struct RitualSeed {
    title: &'static str,
    description: &'static str,
    ritual_type: RitualType,
    content: &'static str,
    phase: LifePhase,
    tone: EmotionalTone,
    minutes: u32,
    tags: &'static [&'static str],
    language: Language,
}

const RITUALS: &[RitualSeed] = &[
    RitualSeed {
        title: "Morning Gratitude",
        description: "Start your day with gratitude and positive energy",
        ritual_type: RitualType::Affirmation,
        content: "I am grateful for this new day and all the opportunities it brings.",
        phase: LifePhase::Any,
        tone: EmotionalTone::Gentle,
        minutes: 5,
        tags: &["morning", "gratitude"],
        language: Language::En,
    },
    RitualSeed {
        title: "დილის მადლიერება",
        description: "დაიწყეთ დღე მადლიერებით და დადებითი ენერგიით",
        ritual_type: RitualType::Affirmation,
        content: "მე ვარ მადლიერი ამ ახალი დღისთვის და ყველა შესაძლებლობისთვის, რასაც ის მოაქვს.",
        phase: LifePhase::Any,
        tone: EmotionalTone::Gentle,
        minutes: 5,
        tags: &["morning", "gratitude"],
        language: Language::Ka,
    },
    RitualSeed {
        title: "Evening Reflection",
        description: "Reflect on your day and find moments of gratitude",
        ritual_type: RitualType::Prompt,
        content: "What were three things that brought you joy today?",
        phase: LifePhase::Any,
        tone: EmotionalTone::Gentle,
        minutes: 10,
        tags: &["evening", "reflection"],
        language: Language::En,
    },
    RitualSeed {
        title: "საღამოს ასახვა",
        description: "დაფიქრდით დღეზე და იპოვეთ მადლიერების მომენტები",
        ritual_type: RitualType::Prompt,
        content: "რა იყო სამი რამ, რაც დღეს სიამოვნება მოგაგინათ?",
        phase: LifePhase::Any,
        tone: EmotionalTone::Gentle,
        minutes: 10,
        tags: &["evening", "reflection"],
        language: Language::Ka,
    },
    RitualSeed {
        title: "Breath Awareness",
        description: "A simple meditation to center yourself",
        ritual_type: RitualType::Meditation,
        content: "Focus on your breath. Inhale for 4 counts, hold for 4, exhale for 6.",
        phase: LifePhase::Transition,
        tone: EmotionalTone::Grounding,
        minutes: 7,
        tags: &["breathing", "meditation"],
        language: Language::En,
    },
    RitualSeed {
        title: "სუნთქვის ცნობიერება",
        description: "მარტივი მედიტაცია თავის ცენტრირებისთვის",
        ritual_type: RitualType::Meditation,
        content: "ფოკუსირდით თქვენს სუნთქვაზე. ჩაისუნთქეთ 4-ჯერ, დაიჭირეთ 4-ზე, ამოისუნთქეთ 6-ზე.",
        phase: LifePhase::Transition,
        tone: EmotionalTone::Grounding,
        minutes: 7,
        tags: &["breathing", "meditation"],
        language: Language::Ka,
    },
    RitualSeed {
        title: "Self-Love Affirmation",
        description: "Boost your self-esteem with positive affirmations",
        ritual_type: RitualType::Affirmation,
        content: "I am enough. I am worthy of love and respect.",
        phase: LifePhase::Healing,
        tone: EmotionalTone::Empowering,
        minutes: 5,
        tags: &["self-love", "affirmations"],
        language: Language::En,
    },
    RitualSeed {
        title: "თვით-სიყვარულის აფირმაცია",
        description: "გაზარდეთ თქვენი თვითშეფასება დადებითი აფირმაციებით",
        ritual_type: RitualType::Affirmation,
        content: "მე საკმარისად კარგი ვარ. მე ვიმსახურებ სიყვარულს და პატივისცემას.",
        phase: LifePhase::Healing,
        tone: EmotionalTone::Empowering,
        minutes: 5,
        tags: &["self-love", "affirmations"],
        language: Language::Ka,
    },
    RitualSeed {
        title: "Motherhood Moments",
        description: "Reflect on your motherhood journey",
        ritual_type: RitualType::Prompt,
        content: "What is one moment today that reminded you of the beauty of motherhood?",
        phase: LifePhase::Motherhood,
        tone: EmotionalTone::Gentle,
        minutes: 8,
        tags: &["motherhood", "reflection", "gratitude"],
        language: Language::En,
    },
    RitualSeed {
        title: "დედობის მომენტები",
        description: "დაფიქრდით თქვენს დედობის გზაზე",
        ritual_type: RitualType::Prompt,
        content: "რომელი იყო დღის ის მომენტი, რომელმაც შემოგახსენათ დედობის სილამაზე?",
        phase: LifePhase::Motherhood,
        tone: EmotionalTone::Gentle,
        minutes: 8,
        tags: &["motherhood", "reflection", "gratitude"],
        language: Language::Ka,
    },
    RitualSeed {
        title: "Self-Care for Moms",
        description: "A quick self-care reminder for busy moms",
        ritual_type: RitualType::Affirmation,
        content: "I honor my needs because I deserve care too. Taking time for myself makes me a better mother.",
        phase: LifePhase::Motherhood,
        tone: EmotionalTone::Healing,
        minutes: 5,
        tags: &["motherhood", "self-care", "affirmation"],
        language: Language::En,
    },
    RitualSeed {
        title: "დედების თვითზრუნვა",
        description: "სწრაფი შეხსენება დაკავებული დედებისთვის",
        ritual_type: RitualType::Affirmation,
        content: "მე ვცემ უპირატესობას ჩემს საჭიროებებს, რადგან მეც ვიმსახურებ ზრუნვას. ჩემთვის დროის გამოყოფა უკეთეს დედად ხდის.",
        phase: LifePhase::Motherhood,
        tone: EmotionalTone::Healing,
        minutes: 5,
        tags: &["motherhood", "self-care", "affirmation"],
        language: Language::Ka,
    },
];

const RESOURCES: &[(&str, ResourceType, ResourceCategory, &str, bool)] = &[
    ("The First 40 Days: A Guide to New Motherhood", ResourceType::Book, ResourceCategory::Newborn, "Author 1", true),
    ("Gentle Sleep Training Methods", ResourceType::Article, ResourceCategory::Toddler, "Author 2", false),
    ("Nutrition for Nursing Mothers", ResourceType::Article, ResourceCategory::Newborn, "Author 3", false),
    ("Balancing Work and Motherhood", ResourceType::Podcast, ResourceCategory::WorkLife, "Author 4", true),
    ("Postpartum Mental Health Resources", ResourceType::Professional, ResourceCategory::MentalHealth, "Author 5", true),
    ("Toddler Discipline That Works", ResourceType::Video, ResourceCategory::Toddler, "Author 6", false),
    ("Self-Care for Busy Moms", ResourceType::App, ResourceCategory::SelfCare, "Author 7", false),
    ("Building Strong Family Bonds", ResourceType::Community, ResourceCategory::Relationships, "Author 8", false),
];

const GROUPS: &[(&str, GroupType, bool, u32)] = &[
    ("New Moms Support Circle", GroupType::Newborn, false, 40),
    ("Working Mothers Network", GroupType::WorkingMom, false, 50),
    ("Single Moms United", GroupType::SingleMom, true, 30),
    ("Postpartum Support Group", GroupType::MentalHealth, true, 20),
    ("Mindful Parenting Community", GroupType::General, false, 50),
];

const TEMPLATES: &[(TemplateType, &str, &str)] = &[
    (TemplateType::MoodReminder, "How are you feeling, {username}?", "Take a moment to check in with yourself today."),
    (TemplateType::TaskReminder, "Your daily tasks are waiting", "Body, work and soul: pick one small step for each."),
    (TemplateType::JournalReminder, "A few words for yourself", "Your journal is here whenever you are ready to write."),
    (TemplateType::Welcome, "Welcome to HerSpace, {username}", "This is a gentle space for you. Start with a mood check-in."),
    (TemplateType::Milestone, "You reached a milestone", "{count} days of showing up for yourself. Be proud."),
    (TemplateType::Insight, "New insights are ready", "See how your week has been in your analytics."),
    (TemplateType::RitualSuggestion, "A ritual for today", "Try \"{ritual}\" when you have {minutes} quiet minutes."),
];

const WISDOM: &[(&str, &str, &str, LifePhase, SupportStyle, EnergyLevel)] = &[
    ("You are enough", "You do not have to earn rest. You are enough as you are today.",
        "I am enough.", LifePhase::Any, SupportStyle::Any, EnergyLevel::Any),
    ("Small steps count", "On low days, one small act of care is a whole victory.",
        "Every small step is progress.", LifePhase::Any, SupportStyle::Gentle, EnergyLevel::Low),
    ("Your strength is real", "You have already survived every hard day so far. Trust that strength.",
        "I am strong and capable.", LifePhase::Healing, SupportStyle::Empowering, EnergyLevel::Any),
    ("Seasons change", "Transitions feel unsteady because you are growing. Let the ground shift.",
        "I welcome what is changing.", LifePhase::Transition, SupportStyle::Spiritual, EnergyLevel::Any),
    ("Good enough parenting", "Your child needs a present mother, not a perfect one.",
        "I am the mother my child needs.", LifePhase::Motherhood, SupportStyle::Gentle, EnergyLevel::Any),
    ("Plan the next hour", "When everything feels big, decide only what the next hour holds.",
        "I can handle the next hour.", LifePhase::CareerFocus, SupportStyle::Practical, EnergyLevel::Moderate),
    ("Use the spark", "Your energy is high today. Point it at the thing you keep postponing.",
        "I act on my ideas.", LifePhase::Growth, SupportStyle::Empowering, EnergyLevel::High),
];

struct ActivitySeed {
    title: &'static str,
    title_ka: &'static str,
    description: &'static str,
    short_description: &'static str,
    icon: &'static str,
    minutes: u32,
    category: MindfulnessCategory,
    difficulty: Difficulty,
}

const ACTIVITIES: &[ActivitySeed] = &[
    ActivitySeed {
        title: "Breath Awareness",
        title_ka: "სუნთქვის ცნობიერება",
        description: "Sit comfortably and follow your breath in and out without changing it.",
        short_description: "Gentle breath focus",
        icon: "🌬️",
        minutes: 5,
        category: MindfulnessCategory::Breathing,
        difficulty: Difficulty::Beginner,
    },
    ActivitySeed {
        title: "Body Scan",
        title_ka: "",
        description: "Move your attention slowly from your toes to the top of your head, releasing tension.",
        short_description: "Release tension head to toe",
        icon: "🧘",
        minutes: 10,
        category: MindfulnessCategory::BodyScan,
        difficulty: Difficulty::Beginner,
    },
    ActivitySeed {
        title: "Gratitude Pause",
        title_ka: "მადლიერება",
        description: "Name three things you are grateful for and notice how each one feels.",
        short_description: "Three things to be grateful for",
        icon: "🙏",
        minutes: 3,
        category: MindfulnessCategory::Gratitude,
        difficulty: Difficulty::Beginner,
    },
    ActivitySeed {
        title: "Loving-Kindness Meditation",
        title_ka: "",
        description: "Offer kind wishes to yourself, someone you love, and then to everyone.",
        short_description: "Kind wishes for yourself and others",
        icon: "💗",
        minutes: 15,
        category: MindfulnessCategory::Meditation,
        difficulty: Difficulty::Intermediate,
    },
    ActivitySeed {
        title: "Mindful Stretch",
        title_ka: "",
        description: "Slow stretches for neck, shoulders and back, moving with each breath.",
        short_description: "Unwind with slow movement",
        icon: "🌿",
        minutes: 8,
        category: MindfulnessCategory::Movement,
        difficulty: Difficulty::Beginner,
    },
];

impl Database {
    fn table_is_empty(&self, table: &str) -> Result<bool> {
        self.with_conn(|conn| {
            // `table` is always one of our literals, never user input
            let sql = format!("SELECT NOT EXISTS(SELECT 1 FROM {})", table);
            Ok(conn.query_row(&sql, [], |row| row.get(0))?)
        })
    }
}

/// Seeds every static table that is still empty. Returns the number of rows
/// written.
pub fn seed_static_content(db: &Database, now: DateTime<Utc>) -> Result<usize> {
    let mut written = 0;

    if db.table_is_empty("tarot_cards")? {
        for &(name, suit, description, upright, reversed) in DECK {
            let card = TarotCard {
                id: Uuid::new_v4(),
                name: name.into(),
                description: description.into(),
                is_major_arcana: suit == Suit::Major,
                suit,
                upright_meanings: owned(upright),
                reversed_meanings: owned(reversed),
            };
            written += usize::from(db.insert_tarot_card(&card)?);
        }
    }

    if db.table_is_empty("rituals")? {
        for seed in RITUALS {
            db.insert_ritual(&Ritual {
                id: Uuid::new_v4(),
                title: seed.title.into(),
                description: seed.description.into(),
                ritual_type: seed.ritual_type,
                content: seed.content.into(),
                for_life_phase: seed.phase,
                emotional_tone: seed.tone,
                duration_minutes: seed.minutes,
                is_for_beginners: true,
                tags: owned(seed.tags),
                is_active: true,
                language: seed.language,
                created_at: now,
            })?;
            written += 1;
        }
    }

    if db.table_is_empty("motherhood_resources")? {
        for &(title, resource_type, category, author, is_featured) in RESOURCES {
            let slug = title.to_lowercase().replace(' ', "-");
            let resource = MotherhoodResource {
                id: Uuid::new_v4(),
                title: title.into(),
                resource_type,
                category,
                description: format!("A comprehensive guide about {}", title.to_lowercase()),
                url: Some(format!("https://example.com/resources/{slug}")),
                author: author.into(),
                is_featured,
                is_active: true,
                created_at: now,
            };
            written += usize::from(db.insert_resource(&resource)?);
        }
    }

    if db.table_is_empty("support_groups")? {
        for &(name, group_type, is_private, max_members) in GROUPS {
            let group = SupportGroup {
                id: Uuid::new_v4(),
                name: name.into(),
                group_type,
                description: format!("A supportive community for {}", name.to_lowercase()),
                is_private,
                max_members,
                current_members: 0,
                is_active: true,
                created_at: now,
            };
            written += usize::from(db.insert_support_group(&group)?);
        }
    }

    if db.table_is_empty("notification_templates")? {
        for &(template_type, title, message) in TEMPLATES {
            let template = NotificationTemplate {
                id: Uuid::new_v4(),
                template_type,
                title_template: title.into(),
                message_template: message.into(),
                is_active: true,
                created_at: now,
            };
            written += usize::from(db.insert_template(&template)?);
        }
    }

    if db.table_is_empty("wisdom_messages")? {
        for &(title, message, affirmation, mood, style, energy) in WISDOM {
            let wisdom = WisdomMessage {
                id: Uuid::new_v4(),
                title: title.into(),
                message: message.into(),
                affirmation: affirmation.into(),
                for_mood_context: mood,
                for_support_style: style,
                for_energy_level: energy,
                tags: Vec::new(),
                is_active: true,
                created_at: now,
            };
            written += usize::from(db.insert_wisdom(&wisdom)?);
        }
    }

    if db.table_is_empty("mindfulness_activities")? {
        for seed in ACTIVITIES {
            let activity = MindfulnessActivity {
                id: Uuid::new_v4(),
                title: seed.title.into(),
                title_ka: seed.title_ka.into(),
                description: seed.description.into(),
                description_ka: String::new(),
                short_description: seed.short_description.into(),
                short_description_ka: String::new(),
                icon: seed.icon.into(),
                duration_minutes: seed.minutes,
                audio_url: None,
                category: seed.category,
                difficulty: seed.difficulty,
                is_active: true,
                created_at: now,
                updated_at: now,
            };
            written += usize::from(db.insert_activity(&activity)?);
        }
    }

    info!("Seeded {} static rows", written);
    Ok(written)
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use herspace_types::enums::{Language, Suit};

    use super::*;

    #[test]
    fn seeding_twice_writes_nothing_new() {
        let db = Database::open_in_memory().unwrap();
        let first = seed_static_content(&db, Utc::now()).unwrap();
        assert!(first > 0);
        assert_eq!(seed_static_content(&db, Utc::now()).unwrap(), 0);
    }

    #[test]
    fn deck_has_major_and_minor_cards() {
        let db = Database::open_in_memory().unwrap();
        seed_static_content(&db, Utc::now()).unwrap();

        let deck = db.list_tarot_cards(None).unwrap();
        assert_eq!(deck.len(), DECK.len());
        assert!(deck[0].is_major_arcana);
        assert!(deck.iter().all(|c| !c.upright_meanings.is_empty() && !c.reversed_meanings.is_empty()));
        assert_eq!(db.list_tarot_cards(Some(Suit::Wands)).unwrap().len(), 2);
    }

    #[test]
    fn rituals_come_in_both_languages() {
        let db = Database::open_in_memory().unwrap();
        seed_static_content(&db, Utc::now()).unwrap();

        let en = db.list_rituals(Some(Language::En), None).unwrap();
        let ka = db.list_rituals(Some(Language::Ka), None).unwrap();
        assert_eq!(en.len(), ka.len());
        assert!(!en.is_empty());
    }
}

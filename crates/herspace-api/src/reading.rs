//! Card drawing, prompt building and the offline interpretation used when
//! the chat endpoint cannot be reached.
//!
//! Nothing here touches the database or the network; the handlers in
//! `tarot` and `assistant` load the deck, call into these helpers and
//! persist the result.

use std::fmt::Write as _;

use rand::{Rng, seq::IndexedRandom};

use herspace_types::enums::ReadingType;
use herspace_types::models::{DrawnCard, TarotCard};

pub const DEFAULT_CARD_COUNT: usize = 3;
pub const MAX_CARD_COUNT: usize = 10;
const REVERSED_PROBABILITY: f64 = 0.2;

pub const READER_SYSTEM_PROMPT: &str = "You are Dagi, a warm and insightful tarot reader. \
Interpret the cards for the person's question with compassion. Speak to each card in its \
position, note reversed cards, and close with gentle, practical encouragement. \
Keep the reading under 250 words.";

pub const COMPANION_SYSTEM_PROMPT: &str = "You are Dagi, a supportive companion for women \
navigating motherhood, work and personal growth. Answer with empathy, keep advice practical, \
and suggest a small self-care step when it fits. Never give medical diagnoses.";

pub const COMPANION_FALLBACK: &str = "I'm here with you. I can't reach my thoughts fully right \
now, but I want you to know that what you're feeling matters. Take a slow breath, be gentle \
with yourself, and try asking me again in a little while. If you'd like, ask me for a tarot \
reading and I'll draw some cards for you.";

const CLOSING: &str = "Take what resonates, leave what doesn't, and trust your own intuition.";

const THREE_CARD_POSITIONS: [&str; 3] = ["Past", "Present", "Future"];
const CELTIC_CROSS_POSITIONS: [&str; 10] = [
    "Present",
    "Challenge",
    "Foundation",
    "Recent past",
    "Possible outcome",
    "Near future",
    "Self",
    "Environment",
    "Hopes and fears",
    "Outcome",
];

const NUMBER_WORDS: [(&str, usize); 11] = [
    ("single", 1),
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
];

/// A drawn card together with the deck entry it came from.
#[derive(Debug, Clone)]
pub struct Spread<'a> {
    pub card: &'a TarotCard,
    pub drawn: DrawnCard,
}

/// Requested count, defaulted and clamped to `1..=MAX_CARD_COUNT` and to
/// the number of cards available. Returns 0 only for an empty deck.
pub fn clamp_card_count(requested: Option<usize>, deck_size: usize) -> usize {
    requested
        .unwrap_or(DEFAULT_CARD_COUNT)
        .clamp(1, MAX_CARD_COUNT)
        .min(deck_size)
}

/// Draws `count` distinct cards. Each lands reversed with probability 0.2.
pub fn draw<'a, R: Rng + ?Sized>(deck: &'a [TarotCard], count: usize, rng: &mut R) -> Vec<Spread<'a>> {
    let picked: Vec<&TarotCard> = deck.choose_multiple(rng, count).collect();
    picked
        .into_iter()
        .enumerate()
        .map(|(position, card)| Spread {
            card,
            drawn: DrawnCard {
                id: card.id,
                name: card.name.clone(),
                suit: card.suit,
                reversed: rng.random_bool(REVERSED_PROBABILITY),
                position,
            },
        })
        .collect()
}

/// Human label for a slot, e.g. "Past" in a three-card spread.
pub fn position_label(reading_type: ReadingType, position: usize) -> String {
    let named = match reading_type {
        ReadingType::ThreeCard => THREE_CARD_POSITIONS.get(position),
        ReadingType::CelticCross => CELTIC_CROSS_POSITIONS.get(position),
        _ => None,
    };
    match named {
        Some(name) => (*name).to_string(),
        None => format!("Card {}", position + 1),
    }
}

fn orientation(drawn: &DrawnCard) -> &'static str {
    if drawn.reversed { "reversed" } else { "upright" }
}

fn meanings<'a>(spread: &'a Spread<'_>) -> &'a [String] {
    if spread.drawn.reversed {
        &spread.card.reversed_meanings
    } else {
        &spread.card.upright_meanings
    }
}

pub fn build_prompt(question: &str, spread: &[Spread<'_>]) -> String {
    let reading_type = ReadingType::for_card_count(spread.len());
    let mut prompt = format!("Question: {}\n\nCards drawn:\n", question.trim());
    for s in spread {
        let _ = writeln!(
            prompt,
            "- {}: {} ({}). Traditional meanings: {}",
            position_label(reading_type, s.drawn.position),
            s.card.name,
            orientation(&s.drawn),
            meanings(s).join(", "),
        );
    }
    prompt.push_str("\nPlease give a thoughtful interpretation of this spread.");
    prompt
}

/// Interpretation assembled from the cards' own meaning lists.
/// Never empty, even for a card with no meanings or description.
pub fn fallback_interpretation(question: &str, spread: &[Spread<'_>]) -> String {
    let reading_type = ReadingType::for_card_count(spread.len());
    let question = question.trim();
    let mut text = if question.is_empty() {
        String::from("Here is what the cards reflect for you.\n\n")
    } else {
        format!("Here is what the cards reflect about \"{question}\".\n\n")
    };

    for s in spread {
        let list = meanings(s);
        let meaning = if !list.is_empty() {
            list.iter().take(3).cloned().collect::<Vec<_>>().join(", ")
        } else if !s.card.description.trim().is_empty() {
            s.card.description.trim().to_string()
        } else {
            String::from("a moment for quiet reflection")
        };
        let _ = writeln!(
            text,
            "{}: {} ({}) speaks of {}.",
            position_label(reading_type, s.drawn.position),
            s.card.name,
            orientation(&s.drawn),
            meaning,
        );
    }

    text.push('\n');
    text.push_str(CLOSING);
    text
}

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphabetic()).filter(|w| !w.is_empty())
}

/// Card count requested by a free-text message, or `None` when the message
/// is not asking for tarot at all.
pub fn parse_tarot_request(message: &str) -> Option<usize> {
    let lower = message.to_lowercase();
    if !words(&lower).any(|w| matches!(w, "tarot" | "card" | "cards")) {
        return None;
    }

    let digits: String = lower
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    if !digits.is_empty() {
        let significant = digits.trim_start_matches('0');
        // Longer runs are past the cap and may overflow usize
        let n = if significant.len() > 2 {
            MAX_CARD_COUNT
        } else {
            significant.parse::<usize>().unwrap_or(0)
        };
        return Some(n.clamp(1, MAX_CARD_COUNT));
    }

    let from_word = words(&lower).find_map(|word| NUMBER_WORDS.iter().find(|(w, _)| *w == word).map(|(_, n)| *n));
    Some(from_word.unwrap_or(DEFAULT_CARD_COUNT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use herspace_types::enums::Suit;
    use rand::{SeedableRng, rngs::StdRng};
    use std::collections::HashSet;
    use uuid::Uuid;

    fn card(name: &str, upright: &[&str], reversed: &[&str]) -> TarotCard {
        TarotCard {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            is_major_arcana: true,
            suit: Suit::Major,
            upright_meanings: upright.iter().map(|s| s.to_string()).collect(),
            reversed_meanings: reversed.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn deck(n: usize) -> Vec<TarotCard> {
        (0..n).map(|i| card(&format!("Card {i}"), &["hope"], &["doubt"])).collect()
    }

    #[test]
    fn card_count_defaults_and_clamps() {
        assert_eq!(clamp_card_count(None, 19), 3);
        assert_eq!(clamp_card_count(Some(0), 19), 1);
        assert_eq!(clamp_card_count(Some(42), 19), 10);
        assert_eq!(clamp_card_count(Some(5), 2), 2);
        assert_eq!(clamp_card_count(None, 0), 0);
    }

    #[test]
    fn draws_are_distinct_and_positioned() {
        let deck = deck(19);
        let mut rng = StdRng::seed_from_u64(7);
        let spread = draw(&deck, 10, &mut rng);

        assert_eq!(spread.len(), 10);
        let ids: HashSet<_> = spread.iter().map(|s| s.drawn.id).collect();
        assert_eq!(ids.len(), 10);
        let positions: Vec<_> = spread.iter().map(|s| s.drawn.position).collect();
        assert_eq!(positions, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn reversals_are_a_minority() {
        let deck = deck(10);
        let mut rng = StdRng::seed_from_u64(99);
        let mut reversed = 0;
        let mut total = 0;
        for _ in 0..500 {
            for s in draw(&deck, 10, &mut rng) {
                total += 1;
                if s.drawn.reversed {
                    reversed += 1;
                }
            }
        }
        let ratio = reversed as f64 / total as f64;
        assert!((0.15..0.25).contains(&ratio), "ratio was {ratio}");
    }

    #[test]
    fn three_card_positions_are_named() {
        assert_eq!(position_label(ReadingType::ThreeCard, 0), "Past");
        assert_eq!(position_label(ReadingType::ThreeCard, 2), "Future");
        assert_eq!(position_label(ReadingType::Custom, 3), "Card 4");
    }

    #[test]
    fn fallback_uses_orientation_meanings() {
        let deck = vec![card("The Star", &["hope", "renewal"], &["despair"])];
        let mut spread = draw(&deck, 1, &mut StdRng::seed_from_u64(1));

        spread[0].drawn.reversed = false;
        let text = fallback_interpretation("Will I find rest?", &spread);
        assert!(text.contains("The Star (upright) speaks of hope, renewal."));
        assert!(text.contains("Will I find rest?"));

        spread[0].drawn.reversed = true;
        let text = fallback_interpretation("", &spread);
        assert!(text.contains("speaks of despair"));
    }

    #[test]
    fn fallback_is_never_empty() {
        let deck = vec![card("Blank", &[], &[])];
        let spread = draw(&deck, 1, &mut StdRng::seed_from_u64(3));
        let text = fallback_interpretation("   ", &spread);
        assert!(text.contains("quiet reflection"));
        assert!(!fallback_interpretation("q", &[]).is_empty());
    }

    #[test]
    fn prompt_lists_every_card() {
        let deck = deck(5);
        let spread = draw(&deck, 3, &mut StdRng::seed_from_u64(5));
        let prompt = build_prompt("What next?", &spread);
        assert!(prompt.starts_with("Question: What next?"));
        assert!(prompt.contains("- Past: "));
        assert!(prompt.contains("- Future: "));
    }

    #[test]
    fn tarot_requests_are_detected() {
        assert_eq!(parse_tarot_request("How do I sleep better?"), None);
        assert_eq!(parse_tarot_request("Pull a tarot spread for me"), Some(3));
        assert_eq!(parse_tarot_request("Draw 5 cards please"), Some(5));
        assert_eq!(parse_tarot_request("a single card for today"), Some(1));
        assert_eq!(parse_tarot_request("Give me seven Tarot cards"), Some(7));
        assert_eq!(parse_tarot_request("draw 25 cards"), Some(10));
        assert_eq!(parse_tarot_request("draw 99999999999999999999999 tarot cards"), Some(10));
        assert_eq!(parse_tarot_request("draw 0 cards"), Some(1));
        assert_eq!(parse_tarot_request("draw 007 cards"), Some(7));
    }

    #[test]
    fn keywords_must_be_whole_words() {
        assert_eq!(parse_tarot_request("I've been doing cardio every morning"), None);
        assert_eq!(parse_tarot_request("Should I discard my old plans?"), None);
        assert_eq!(parse_tarot_request("my favourite cardigan is gone"), None);
        assert_eq!(parse_tarot_request("what do the cards say?"), Some(3));
        assert_eq!(parse_tarot_request("Tarot, please!"), Some(3));
    }

    #[test]
    fn number_words_must_be_whole_words() {
        // "someone" contains "one" but is not a count
        assert_eq!(parse_tarot_request("someone said tarot helps"), Some(3));
    }
}

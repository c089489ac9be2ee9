use anyhow::Result;
use rusqlite::{OptionalExtension, Row};
use uuid::Uuid;

use herspace_types::enums::Suit;
use herspace_types::models::{AiConversation, TarotCard, TarotReading};

use super::{enum_col, json_col, uuid_col};
use crate::Database;

const CARD_COLUMNS: &str =
    "id, name, description, is_major_arcana, suit, upright_meanings, reversed_meanings";
const READING_COLUMNS: &str = "id, question, reading_type, cards, interpretation, created_at";
const CONVERSATION_COLUMNS: &str = "id, message, response, conversation_type, created_at";

impl Database {
    // -- Cards --

    /// Inserts a card unless one with the same name exists. Returns whether
    /// a row was written.
    pub fn insert_tarot_card(&self, card: &TarotCard) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO tarot_cards
                    (id, name, description, is_major_arcana, suit, upright_meanings, reversed_meanings)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    card.id.to_string(),
                    card.name,
                    card.description,
                    card.is_major_arcana,
                    card.suit.as_ref(),
                    serde_json::to_string(&card.upright_meanings)?,
                    serde_json::to_string(&card.reversed_meanings)?,
                ],
            )?;
            Ok(inserted > 0)
        })
    }

    /// The deck, major arcana first, optionally limited to one suit.
    pub fn list_tarot_cards(&self, suit: Option<Suit>) -> Result<Vec<TarotCard>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {CARD_COLUMNS} FROM tarot_cards
                 WHERE (?1 IS NULL OR suit = ?1)
                 ORDER BY is_major_arcana DESC, rowid"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([suit.as_ref().map(AsRef::<str>::as_ref)], card_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Readings --

    pub fn insert_tarot_reading(&self, user_id: Uuid, reading: &TarotReading) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tarot_readings (id, user_id, question, reading_type, cards, interpretation, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    reading.id.to_string(),
                    user_id.to_string(),
                    reading.question,
                    reading.reading_type.as_ref(),
                    serde_json::to_string(&reading.cards)?,
                    reading.interpretation,
                    reading.created_at,
                ],
            )?;
            Ok(())
        })
    }

    pub fn list_tarot_readings(&self, user_id: Uuid) -> Result<Vec<TarotReading>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {READING_COLUMNS} FROM tarot_readings WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id.to_string()], reading_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_tarot_reading(&self, user_id: Uuid, id: Uuid) -> Result<Option<TarotReading>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {READING_COLUMNS} FROM tarot_readings WHERE id = ?1 AND user_id = ?2");
            let row = conn
                .query_row(&sql, [id.to_string(), user_id.to_string()], reading_from_row)
                .optional()?;
            Ok(row)
        })
    }

    pub fn update_tarot_question(&self, user_id: Uuid, id: Uuid, question: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE tarot_readings SET question = ?1 WHERE id = ?2 AND user_id = ?3",
                rusqlite::params![question, id.to_string(), user_id.to_string()],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn delete_tarot_reading(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        self.delete_owned("tarot_readings", user_id, id)
    }

    // -- Conversations --

    pub fn insert_conversation(&self, user_id: Uuid, conversation: &AiConversation) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO ai_conversations (id, user_id, message, response, conversation_type, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    conversation.id.to_string(),
                    user_id.to_string(),
                    conversation.message,
                    conversation.response,
                    conversation.conversation_type.as_ref(),
                    conversation.created_at,
                ],
            )?;
            Ok(())
        })
    }

    pub fn list_conversations(&self, user_id: Uuid) -> Result<Vec<AiConversation>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {CONVERSATION_COLUMNS} FROM ai_conversations WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id.to_string()], conversation_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_conversation(&self, user_id: Uuid, id: Uuid) -> Result<Option<AiConversation>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {CONVERSATION_COLUMNS} FROM ai_conversations WHERE id = ?1 AND user_id = ?2"
            );
            let row = conn
                .query_row(&sql, [id.to_string(), user_id.to_string()], conversation_from_row)
                .optional()?;
            Ok(row)
        })
    }

    pub fn delete_conversation(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        self.delete_owned("ai_conversations", user_id, id)
    }
}

fn card_from_row(row: &Row) -> rusqlite::Result<TarotCard> {
    Ok(TarotCard {
        id: uuid_col(row, 0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        is_major_arcana: row.get(3)?,
        suit: enum_col(row, 4)?,
        upright_meanings: json_col(row, 5)?,
        reversed_meanings: json_col(row, 6)?,
    })
}

fn reading_from_row(row: &Row) -> rusqlite::Result<TarotReading> {
    Ok(TarotReading {
        id: uuid_col(row, 0)?,
        question: row.get(1)?,
        reading_type: enum_col(row, 2)?,
        cards: json_col(row, 3)?,
        interpretation: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn conversation_from_row(row: &Row) -> rusqlite::Result<AiConversation> {
    Ok(AiConversation {
        id: uuid_col(row, 0)?,
        message: row.get(1)?,
        response: row.get(2)?,
        conversation_type: enum_col(row, 3)?,
        created_at: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use herspace_types::enums::{ReadingType, Suit};
    use herspace_types::models::{DrawnCard, TarotCard, TarotReading};

    use super::super::testutil::{add_user, db_with_user};

    fn card(name: &str, suit: Suit) -> TarotCard {
        TarotCard {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            is_major_arcana: suit == Suit::Major,
            suit,
            upright_meanings: vec!["Clarity".into()],
            reversed_meanings: vec!["Confusion".into()],
        }
    }

    #[test]
    fn card_names_are_unique() {
        let db = crate::Database::open_in_memory().unwrap();
        assert!(db.insert_tarot_card(&card("The Star", Suit::Major)).unwrap());
        assert!(!db.insert_tarot_card(&card("The Star", Suit::Major)).unwrap());
        db.insert_tarot_card(&card("Ace of Cups", Suit::Cups)).unwrap();

        assert_eq!(db.list_tarot_cards(None).unwrap().len(), 2);
        let cups = db.list_tarot_cards(Some(Suit::Cups)).unwrap();
        assert_eq!(cups.len(), 1);
        assert_eq!(cups[0].reversed_meanings, vec!["Confusion".to_string()]);
    }

    #[test]
    fn reading_keeps_drawn_cards() {
        let (db, user) = db_with_user("alice");
        let other = add_user(&db, "bob");
        let drawn = DrawnCard {
            id: Uuid::new_v4(),
            name: "The Star".into(),
            suit: Suit::Major,
            reversed: true,
            position: 0,
        };
        let reading = TarotReading {
            id: Uuid::new_v4(),
            question: "What now?".into(),
            reading_type: ReadingType::Single,
            cards: vec![drawn.clone()],
            interpretation: "Hope".into(),
            created_at: Utc::now(),
        };
        db.insert_tarot_reading(user, &reading).unwrap();

        let stored = db.get_tarot_reading(user, reading.id).unwrap().unwrap();
        assert_eq!(stored.cards, vec![drawn]);
        assert!(db.get_tarot_reading(other, reading.id).unwrap().is_none());

        assert!(db.update_tarot_question(user, reading.id, "And then?").unwrap());
        assert_eq!(db.list_tarot_readings(user).unwrap()[0].question, "And then?");
    }
}

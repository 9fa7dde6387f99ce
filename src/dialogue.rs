//! Conversation state machine for multi-turn dialogues.
//!
//! One user has at most one active `Conversation`. Each incoming message
//! advances it by exactly one transition; a `None` next state is terminal
//! and the dispatcher drops the entry.

use crate::error::Error;
use crate::extract;
use crate::store::{RecordKind, Store};

/// Active dialogue state for one user, with its pending data inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversation {
    AwaitingEmailText,
    AwaitingEmailConfirm { emails: Vec<String> },
    AwaitingPhoneText,
    AwaitingPhoneConfirm { phones: Vec<String> },
    AwaitingPassword,
}

impl Conversation {
    /// Prompt sent when the dialogue is entered.
    pub fn entry_prompt(&self) -> &'static str {
        match self {
            Conversation::AwaitingEmailText | Conversation::AwaitingEmailConfirm { .. } => {
                "Введите текст для поиска email адресов: "
            }
            Conversation::AwaitingPhoneText | Conversation::AwaitingPhoneConfirm { .. } => {
                "Введите текст для поиска телефонных номеров: "
            }
            Conversation::AwaitingPassword => "Введите пароль для проверки сложности: ",
        }
    }
}

/// The affirmative confirmation token, compared case-insensitively.
const AFFIRMATIVE: &str = "да";

fn is_affirmative(text: &str) -> bool {
    text.trim().to_lowercase() == AFFIRMATIVE
}

fn numbered(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Advance `conv` with the user's `text`.
///
/// Returns the replies to send, in order, and the next state (`None` when
/// the dialogue terminated). Store failures never escape; they become an
/// error reply and terminate the conversation.
pub async fn advance(
    conv: Conversation,
    text: &str,
    store: &dyn Store,
) -> (Vec<String>, Option<Conversation>) {
    match conv {
        Conversation::AwaitingEmailText => {
            tracing::debug!("Searching for emails in user text");
            let emails = extract::find_emails(text);
            if emails.is_empty() {
                return (vec!["Email адреса не найдены".to_string()], None);
            }
            let replies = vec![
                numbered(&emails),
                "Хотите сохранить найденные email адреса в базе данных? (Да/Нет)".to_string(),
            ];
            (replies, Some(Conversation::AwaitingEmailConfirm { emails }))
        }

        Conversation::AwaitingEmailConfirm { emails } => {
            if !is_affirmative(text) {
                return (
                    vec!["Email адреса не были сохранены в базе данных.".to_string()],
                    None,
                );
            }
            let reply = match store.save(RecordKind::Email, &emails).await {
                Ok(()) => "Email адреса успешно сохранены в базе данных.".to_string(),
                Err(e) => report_failure(&e),
            };
            (vec![reply], None)
        }

        Conversation::AwaitingPhoneText => {
            tracing::debug!("Searching for phone numbers in user text");
            let phones = extract::find_phone_numbers(text);
            if phones.is_empty() {
                return (vec!["Телефонные номера не найдены".to_string()], None);
            }
            let replies = vec![
                numbered(&phones),
                "Хотите сохранить найденные номера телефонов в базе данных? (Да/Нет)".to_string(),
            ];
            (replies, Some(Conversation::AwaitingPhoneConfirm { phones }))
        }

        Conversation::AwaitingPhoneConfirm { phones } => {
            if !is_affirmative(text) {
                return (
                    vec!["Номера телефонов не были сохранены в базе данных.".to_string()],
                    None,
                );
            }
            let reply = match store.save(RecordKind::Phone, &phones).await {
                Ok(()) => "Номера телефонов успешно сохранены в базе данных.".to_string(),
                Err(e) => report_failure(&e),
            };
            (vec![reply], None)
        }

        Conversation::AwaitingPassword => {
            let reply = if extract::is_strong_password(text) {
                tracing::debug!("Password is strong");
                "Пароль сложный"
            } else {
                tracing::debug!("Password is weak");
                "Пароль простой"
            };
            (vec![reply.to_string()], None)
        }
    }
}

fn report_failure(e: &Error) -> String {
    tracing::error!("Dialogue store call failed: {}", e);
    format!("An error occurred: {}", e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::store::{RecordKind, Store, StoredRecord};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingStore {
        saved: Mutex<Vec<(RecordKind, Vec<String>)>>,
        fail: bool,
    }

    #[async_trait]
    impl Store for RecordingStore {
        async fn list(&self, _kind: RecordKind) -> Result<Vec<StoredRecord>> {
            Ok(Vec::new())
        }

        async fn save(&self, kind: RecordKind, values: &[String]) -> Result<()> {
            if self.fail {
                return Err(Error::Store("connection refused".to_string()));
            }
            self.saved.lock().unwrap().push((kind, values.to_vec()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn email_dialogue_without_matches_terminates_immediately() {
        let store = RecordingStore::default();
        let (replies, next) =
            advance(Conversation::AwaitingEmailText, "no addresses here", &store).await;
        assert_eq!(replies, vec!["Email адреса не найдены"]);
        assert!(next.is_none());
    }

    #[tokio::test]
    async fn email_dialogue_lists_matches_and_asks_for_confirmation() {
        let store = RecordingStore::default();
        let (replies, next) = advance(
            Conversation::AwaitingEmailText,
            "contact a@b.com or c@d.org",
            &store,
        )
        .await;
        assert_eq!(replies[0], "1. a@b.com\n2. c@d.org");
        assert!(replies[1].contains("(Да/Нет)"));
        assert_eq!(
            next,
            Some(Conversation::AwaitingEmailConfirm {
                emails: vec!["a@b.com".to_string(), "c@d.org".to_string()],
            })
        );
    }

    #[tokio::test]
    async fn affirmative_confirmation_saves_all_emails() {
        let store = RecordingStore::default();
        let emails = vec!["a@b.com".to_string(), "c@d.org".to_string()];
        let (replies, next) = advance(
            Conversation::AwaitingEmailConfirm { emails: emails.clone() },
            "Да",
            &store,
        )
        .await;
        assert_eq!(replies, vec!["Email адреса успешно сохранены в базе данных."]);
        assert!(next.is_none());
        assert_eq!(
            store.saved.lock().unwrap().as_slice(),
            &[(RecordKind::Email, emails)]
        );
    }

    #[tokio::test]
    async fn non_affirmative_confirmation_saves_nothing() {
        let store = RecordingStore::default();
        let (replies, next) = advance(
            Conversation::AwaitingEmailConfirm {
                emails: vec!["a@b.com".to_string()],
            },
            "нет",
            &store,
        )
        .await;
        assert_eq!(replies, vec!["Email адреса не были сохранены в базе данных."]);
        assert!(next.is_none());
        assert!(store.saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn store_failure_on_confirmation_becomes_one_error_reply() {
        let store = RecordingStore {
            fail: true,
            ..Default::default()
        };
        let (replies, next) = advance(
            Conversation::AwaitingEmailConfirm {
                emails: vec!["a@b.com".to_string()],
            },
            "да",
            &store,
        )
        .await;
        assert_eq!(replies.len(), 1);
        assert!(replies[0].starts_with("An error occurred:"));
        assert!(next.is_none());
    }

    #[tokio::test]
    async fn phone_dialogue_round_trip() {
        let store = RecordingStore::default();
        let (replies, next) =
            advance(Conversation::AwaitingPhoneText, "+7 912 345 67 89", &store).await;
        assert_eq!(replies[0], "1. 912 345 67 89");
        let next = next.expect("confirmation state");

        let (replies, next) = advance(next, "ДА", &store).await;
        assert_eq!(replies, vec!["Номера телефонов успешно сохранены в базе данных."]);
        assert!(next.is_none());
        assert_eq!(
            store.saved.lock().unwrap().as_slice(),
            &[(RecordKind::Phone, vec!["912 345 67 89".to_string()])]
        );
    }

    #[tokio::test]
    async fn phone_dialogue_without_matches_terminates_immediately() {
        let store = RecordingStore::default();
        let (replies, next) =
            advance(Conversation::AwaitingPhoneText, "just words", &store).await;
        assert_eq!(replies, vec!["Телефонные номера не найдены"]);
        assert!(next.is_none());
    }

    #[tokio::test]
    async fn password_dialogue_is_single_step() {
        let store = RecordingStore::default();
        let (replies, next) =
            advance(Conversation::AwaitingPassword, "Abc12345!", &store).await;
        assert_eq!(replies, vec!["Пароль сложный"]);
        assert!(next.is_none());

        let (replies, next) =
            advance(Conversation::AwaitingPassword, "abcdefgh", &store).await;
        assert_eq!(replies, vec!["Пароль простой"]);
        assert!(next.is_none());
        assert!(store.saved.lock().unwrap().is_empty());
    }
}

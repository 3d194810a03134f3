//! # Bot Flow Tests
//!
//! End-to-end tests of the contact gate and the menu dispatcher, driven
//! through `handle_inbound` with an in-memory session store and a
//! recording contact store.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::types::ChatId;

use echo_pool_bot::bot::{handle_inbound, Inbound, InboundKind, Keyboard, Reply};
use echo_pool_bot::contact::{ContactRecord, ContactShare};
use echo_pool_bot::dialogue::{MenuView, SessionDialogue, SessionState};
use echo_pool_bot::errors::StoreError;
use echo_pool_bot::localization::t_lang;
use echo_pool_bot::menu::MenuConfig;
use echo_pool_bot::store::ContactStore;

const USER_ID: u64 = 1001;

/// Contact store that records appends and can be switched to failing
#[derive(Default)]
struct RecordingStore {
    records: Mutex<Vec<ContactRecord>>,
    failing: AtomicBool,
}

impl RecordingStore {
    fn appended(&self) -> Vec<ContactRecord> {
        self.records.lock().unwrap().clone()
    }

    fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl ContactStore for RecordingStore {
    async fn append(&self, record: &ContactRecord) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected {
                status: 500,
                body: "internal error".to_string(),
            });
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

struct Harness {
    dialogue: SessionDialogue,
    store: RecordingStore,
    menu: MenuConfig,
}

impl Harness {
    fn new() -> Self {
        Self {
            dialogue: SessionDialogue::new(InMemStorage::new(), ChatId(USER_ID as i64)),
            store: RecordingStore::default(),
            menu: MenuConfig::venue_default().expect("built-in menu is valid"),
        }
    }

    async fn send(&self, kind: InboundKind) -> Result<Vec<Reply>> {
        let inbound = Inbound {
            sender_id: USER_ID,
            language_code: Some("en".to_string()),
            kind,
        };
        handle_inbound(&inbound, &self.dialogue, &self.store, &self.menu).await
    }

    async fn text(&self, text: &str) -> Result<Vec<Reply>> {
        self.send(InboundKind::Text(text.to_string())).await
    }

    async fn state(&self) -> Result<SessionState> {
        Ok(self.dialogue.get_or_default().await?)
    }

    async fn verify(&self) -> Result<()> {
        self.send(InboundKind::Start).await?;
        self.send(InboundKind::Contact(own_contact())).await?;
        assert!(self.state().await?.is_verified());
        Ok(())
    }
}

fn own_contact() -> ContactShare {
    ContactShare {
        phone_number: "380501112233".to_string(),
        user_id: Some(USER_ID),
        first_name: "Taras".to_string(),
        last_name: Some("Shevchuk".to_string()),
        username: Some("taras_s".to_string()),
    }
}

fn is_contact_prompt(replies: &[Reply]) -> bool {
    replies.len() == 1
        && replies[0].keyboard == Some(Keyboard::ContactRequest)
        && replies[0].text == t_lang("contact-prompt", Some("en"))
}

#[tokio::test]
async fn test_start_prompts_for_contact() -> Result<()> {
    let harness = Harness::new();
    let replies = harness.send(InboundKind::Start).await?;

    assert_eq!(replies.len(), 2);
    assert!(replies[0].text.contains("Echo & Pool"));
    assert_eq!(replies[1].keyboard, Some(Keyboard::ContactRequest));
    assert_eq!(harness.state().await?, SessionState::AwaitingContact);
    Ok(())
}

#[tokio::test]
async fn test_menu_unreachable_before_contact() -> Result<()> {
    let harness = Harness::new();
    harness.send(InboundKind::Start).await?;

    let menu_label = harness.menu.entries[0].label.clone();
    for text in [menu_label.as_str(), harness.menu.back_label.as_str(), "hello"] {
        let replies = harness.text(text).await?;
        assert!(is_contact_prompt(&replies), "expected contact prompt for {text:?}");
    }

    let replies = harness.send(InboundKind::Other).await?;
    assert!(is_contact_prompt(&replies));

    assert!(harness.store.appended().is_empty());
    assert_eq!(harness.state().await?, SessionState::AwaitingContact);
    Ok(())
}

#[tokio::test]
async fn test_unknown_chat_is_gated_without_start() -> Result<()> {
    let harness = Harness::new();
    let replies = harness.text("🍽 Menu").await?;
    assert!(is_contact_prompt(&replies));
    Ok(())
}

#[tokio::test]
async fn test_own_contact_opens_menu() -> Result<()> {
    let harness = Harness::new();
    harness.send(InboundKind::Start).await?;

    let replies = harness.send(InboundKind::Contact(own_contact())).await?;
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].keyboard, Some(Keyboard::MainMenu));
    assert!(replies[0].text.contains("Taras"));

    let appended = harness.store.appended();
    assert_eq!(appended.len(), 1);
    assert_eq!(appended[0].user_id, USER_ID);
    assert_eq!(appended[0].phone_number, "+380501112233");
    assert_eq!(appended[0].username, "taras_s");
    assert_eq!(
        harness.state().await?,
        SessionState::Verified {
            view: MenuView::Main
        }
    );
    Ok(())
}

#[tokio::test]
async fn test_foreign_contact_is_rejected() -> Result<()> {
    let harness = Harness::new();
    harness.send(InboundKind::Start).await?;

    let foreign = ContactShare {
        user_id: Some(USER_ID + 1),
        ..own_contact()
    };
    let replies = harness.send(InboundKind::Contact(foreign)).await?;
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].keyboard, Some(Keyboard::ContactRequest));
    assert_eq!(replies[0].text, t_lang("contact-not-own", Some("en")));

    let address_book = ContactShare {
        user_id: None,
        ..own_contact()
    };
    harness.send(InboundKind::Contact(address_book)).await?;

    assert!(harness.store.appended().is_empty());
    assert_eq!(harness.state().await?, SessionState::AwaitingContact);
    Ok(())
}

#[tokio::test]
async fn test_store_failure_allows_retry() -> Result<()> {
    let harness = Harness::new();
    harness.send(InboundKind::Start).await?;
    harness.store.set_failing(true);

    let replies = harness.send(InboundKind::Contact(own_contact())).await?;
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].text, t_lang("contact-store-error", Some("en")));
    assert_eq!(replies[0].keyboard, Some(Keyboard::ContactRequest));
    assert_eq!(harness.state().await?, SessionState::AwaitingContact);

    harness.store.set_failing(false);
    harness.send(InboundKind::Contact(own_contact())).await?;
    assert_eq!(harness.store.appended().len(), 1);
    assert!(harness.state().await?.is_verified());
    Ok(())
}

#[tokio::test]
async fn test_every_entry_replies_with_configured_content() -> Result<()> {
    let harness = Harness::new();
    harness.verify().await?;

    for entry in harness.menu.entries.clone() {
        let replies = harness.text(&entry.label).await?;
        assert_eq!(replies.len(), 2, "entry {}", entry.label);
        assert_eq!(replies[0].text, entry.reply);
        assert_eq!(replies[0].link, entry.link);
        assert_eq!(replies[0].keyboard, None);
        assert_eq!(replies[1].keyboard, Some(Keyboard::BackOnly));
        assert!(replies[1].text.contains(&harness.menu.back_label));
        assert_eq!(
            harness.state().await?,
            SessionState::Verified {
                view: MenuView::Section {
                    label: entry.label.clone()
                }
            }
        );
    }

    assert_eq!(harness.store.appended().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_unknown_label_falls_back_without_store_call() -> Result<()> {
    let harness = Harness::new();
    harness.verify().await?;

    let replies = harness.text("Do you have a terrace?").await?;
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].text, t_lang("menu-fallback", Some("en")));
    assert_eq!(replies[0].keyboard, Some(Keyboard::MainMenu));
    assert_eq!(harness.store.appended().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_menu_then_back_scenario() -> Result<()> {
    let harness = Harness::new();
    let menu_label = harness.menu.entries[0].label.clone();

    // Unverified: the label only earns a contact prompt
    harness.send(InboundKind::Start).await?;
    assert!(is_contact_prompt(&harness.text(&menu_label).await?));
    assert!(harness.store.appended().is_empty());

    // Verified: configured text and link, then a back-only keyboard
    harness.send(InboundKind::Contact(own_contact())).await?;
    let replies = harness.text(&menu_label).await?;
    assert_eq!(replies[0].text, harness.menu.entries[0].reply);
    assert!(replies[0].link.is_some());
    assert_eq!(replies[1].keyboard, Some(Keyboard::BackOnly));

    // Back: main menu again
    let back_label = harness.menu.back_label.clone();
    let replies = harness.text(&back_label).await?;
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].keyboard, Some(Keyboard::MainMenu));
    assert_eq!(replies[0].text, t_lang("main-menu-prompt", Some("en")));
    assert_eq!(
        harness.state().await?,
        SessionState::Verified {
            view: MenuView::Main
        }
    );
    Ok(())
}

#[tokio::test]
async fn test_start_resets_verified_session() -> Result<()> {
    let harness = Harness::new();
    harness.verify().await?;

    harness.send(InboundKind::Start).await?;
    assert_eq!(harness.state().await?, SessionState::AwaitingContact);

    let menu_label = harness.menu.entries[1].label.clone();
    assert!(is_contact_prompt(&harness.text(&menu_label).await?));
    Ok(())
}

#[tokio::test]
async fn test_repeated_share_appends_history() -> Result<()> {
    let harness = Harness::new();
    harness.verify().await?;
    harness.send(InboundKind::Contact(own_contact())).await?;

    let appended = harness.store.appended();
    assert_eq!(appended.len(), 2);
    assert_eq!(appended[0].phone_number, appended[1].phone_number);
    Ok(())
}

#[tokio::test]
async fn test_sessions_are_isolated_per_chat() -> Result<()> {
    let storage = InMemStorage::<SessionState>::new();
    let store = RecordingStore::default();
    let menu = MenuConfig::venue_default()?;

    let verified = SessionDialogue::new(storage.clone(), ChatId(1));
    let other = SessionDialogue::new(storage, ChatId(2));

    let contact = Inbound {
        sender_id: 1,
        language_code: None,
        kind: InboundKind::Contact(ContactShare {
            user_id: Some(1),
            ..own_contact()
        }),
    };
    handle_inbound(&contact, &verified, &store, &menu).await?;

    let label = Inbound {
        sender_id: 2,
        language_code: None,
        kind: InboundKind::Text(menu.entries[0].label.clone()),
    };
    let replies = handle_inbound(&label, &other, &store, &menu).await?;
    assert_eq!(replies[0].keyboard, Some(Keyboard::ContactRequest));
    assert!(verified.get_or_default().await?.is_verified());
    Ok(())
}

#[tokio::test]
async fn test_replies_follow_user_language() -> Result<()> {
    let harness = Harness::new();
    let inbound = Inbound {
        sender_id: USER_ID,
        language_code: Some("uk-UA".to_string()),
        kind: InboundKind::Text("привіт".to_string()),
    };
    let replies = handle_inbound(&inbound, &harness.dialogue, &harness.store, &harness.menu).await?;
    assert_eq!(replies[0].text, t_lang("contact-prompt", Some("uk")));
    assert_ne!(replies[0].text, t_lang("contact-prompt", Some("en")));
    Ok(())
}

#[tokio::test]
async fn test_failed_repeat_share_keeps_main_menu() -> Result<()> {
    let harness = Harness::new();
    harness.verify().await?;

    let foreign = ContactShare {
        user_id: Some(USER_ID + 1),
        ..own_contact()
    };
    let replies = harness.send(InboundKind::Contact(foreign)).await?;
    assert_eq!(replies[0].text, t_lang("contact-not-own", Some("en")));
    assert_eq!(replies[0].keyboard, Some(Keyboard::MainMenu));

    harness.store.set_failing(true);
    let replies = harness.send(InboundKind::Contact(own_contact())).await?;
    assert_eq!(replies[0].text, t_lang("contact-store-error", Some("en")));
    assert_eq!(replies[0].keyboard, Some(Keyboard::MainMenu));

    assert!(harness.state().await?.is_verified());
    assert_eq!(harness.store.appended().len(), 1);
    Ok(())
}

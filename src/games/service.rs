use std::sync::Arc;

use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::games::dto::GameInput;
use crate::games::error::GameError;
use crate::games::score::{play_score, Status};
use crate::games::store::{GamePatch, GameRecord, GameStore};

/// Per-owner CRUD over backlog entries. Ownership is enforced on every
/// lookup and the play score is recomputed on every write, so no record
/// persists with a stale score.
#[derive(Clone)]
pub struct GameService {
    store: Arc<dyn GameStore>,
}

/// Fields that survived validation; score not yet attached.
struct ValidGame {
    title: String,
    genre: String,
    hours: f64,
    status: Status,
    priority: i32,
}

fn validate(input: GameInput) -> Result<ValidGame, GameError> {
    let title = input
        .title
        .ok_or_else(|| missing("title"))?
        .trim()
        .to_string();
    if title.is_empty() {
        return Err(GameError::Validation("title must be non-empty".into()));
    }
    // Free-form server-side; only the form constrains it to a known list.
    let genre = input.genre.ok_or_else(|| missing("genre"))?;
    let hours = input.hours.ok_or_else(|| missing("hours"))?;
    let status: Status = input.status.ok_or_else(|| missing("status"))?.parse()?;
    let priority = input.priority.ok_or_else(|| missing("priority"))?;
    Ok(ValidGame {
        title,
        genre,
        hours,
        status,
        priority,
    })
}

fn missing(field: &str) -> GameError {
    GameError::Validation(format!("missing field `{}`", field))
}

impl GameService {
    pub fn new(store: Arc<dyn GameStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, owner: Uuid) -> Result<Vec<GameRecord>, GameError> {
        self.store.list_by_owner(owner).await
    }

    pub async fn create(&self, owner: Uuid, input: GameInput) -> Result<GameRecord, GameError> {
        let game = validate(input)?;
        let record = GameRecord {
            id: Uuid::new_v4(),
            user_id: owner,
            play_score: play_score(game.status, game.hours, game.priority),
            created_at: OffsetDateTime::now_utc(),
            title: game.title,
            genre: game.genre,
            hours: game.hours,
            status: game.status,
            priority: game.priority,
        };
        let stored = self.store.insert(record).await?;
        debug!(game_id = %stored.id, owner = %owner, play_score = stored.play_score, "game created");
        Ok(stored)
    }

    /// Full-record replacement. The score is recomputed from the incoming
    /// values; `id`, `user_id` and `created_at` are preserved as stored.
    pub async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        input: GameInput,
    ) -> Result<GameRecord, GameError> {
        let game = validate(input)?;
        let patch = GamePatch {
            play_score: play_score(game.status, game.hours, game.priority),
            title: game.title,
            genre: game.genre,
            hours: game.hours,
            status: game.status,
            priority: game.priority,
        };
        let updated = self
            .store
            .replace(id, owner, patch)
            .await?
            .ok_or(GameError::NotFound)?;
        debug!(game_id = %id, owner = %owner, play_score = updated.play_score, "game updated");
        Ok(updated)
    }

    pub async fn delete(&self, owner: Uuid, id: Uuid) -> Result<(), GameError> {
        if self.store.delete(id, owner).await? {
            debug!(game_id = %id, owner = %owner, "game deleted");
            Ok(())
        } else {
            Err(GameError::NotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::store::MemoryGameStore;

    fn service() -> GameService {
        GameService::new(Arc::new(MemoryGameStore::new()))
    }

    fn input(title: &str, hours: f64, status: &str, priority: i32) -> GameInput {
        GameInput {
            title: Some(title.into()),
            genre: Some("RPG".into()),
            hours: Some(hours),
            status: Some(status.into()),
            priority: Some(priority),
        }
    }

    #[tokio::test]
    async fn create_then_list_shows_one_record_with_derived_score() {
        let svc = service();
        let owner = Uuid::new_v4();

        let created = svc
            .create(owner, input("Elden Ring", 80.0, "Not Started", 5))
            .await
            .unwrap();

        let listed = svc.list(owner).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, created.id);
        assert_eq!(
            listed[0].play_score,
            play_score(Status::NotStarted, 80.0, 5)
        );
        assert_eq!(listed[0].user_id, owner);
    }

    #[tokio::test]
    async fn list_is_scoped_to_the_owner() {
        let svc = service();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        svc.create(alice, input("Celeste", 12.0, "In Progress", 4))
            .await
            .unwrap();
        svc.create(bob, input("Factorio", 300.0, "In Progress", 3))
            .await
            .unwrap();

        let for_alice = svc.list(alice).await.unwrap();
        assert_eq!(for_alice.len(), 1);
        assert_eq!(for_alice[0].title, "Celeste");
    }

    #[tokio::test]
    async fn update_recomputes_score_and_preserves_identity() {
        let svc = service();
        let owner = Uuid::new_v4();
        let created = svc
            .create(owner, input("Hades", 30.0, "Not Started", 2))
            .await
            .unwrap();

        let updated = svc
            .update(owner, created.id, input("Hades", 30.0, "In Progress", 5))
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.user_id, owner);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.status, Status::InProgress);
        assert_eq!(updated.play_score, play_score(Status::InProgress, 30.0, 5));
        assert_ne!(updated.play_score, created.play_score);
    }

    #[tokio::test]
    async fn update_with_unchanged_fields_keeps_score() {
        let svc = service();
        let owner = Uuid::new_v4();
        let created = svc
            .create(owner, input("Outer Wilds", 20.0, "Completed", 3))
            .await
            .unwrap();

        let updated = svc
            .update(owner, created.id, input("Outer Wilds", 20.0, "Completed", 3))
            .await
            .unwrap();

        assert_eq!(updated.play_score, created.play_score);
    }

    #[tokio::test]
    async fn update_by_another_owner_is_not_found_and_mutates_nothing() {
        let svc = service();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let created = svc
            .create(alice, input("Sekiro", 50.0, "In Progress", 5))
            .await
            .unwrap();

        let err = svc
            .update(bob, created.id, input("Stolen", 1.0, "Completed", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::NotFound));

        let for_alice = svc.list(alice).await.unwrap();
        assert_eq!(for_alice.len(), 1);
        assert_eq!(for_alice[0].title, "Sekiro");
        assert_eq!(for_alice[0].status, Status::InProgress);
        assert_eq!(for_alice[0].play_score, created.play_score);
    }

    #[tokio::test]
    async fn delete_by_another_owner_is_not_found() {
        let svc = service();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let created = svc
            .create(alice, input("Tunic", 15.0, "Not Started", 2))
            .await
            .unwrap();

        let err = svc.delete(bob, created.id).await.unwrap_err();
        assert!(matches!(err, GameError::NotFound));
        assert_eq!(svc.list(alice).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn second_delete_is_not_found() {
        let svc = service();
        let owner = Uuid::new_v4();
        let created = svc
            .create(owner, input("Journey", 3.0, "Completed", 1))
            .await
            .unwrap();

        svc.delete(owner, created.id).await.unwrap();
        let err = svc.delete(owner, created.id).await.unwrap_err();
        assert!(matches!(err, GameError::NotFound));
        assert!(svc.list(owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_missing_and_empty_fields() {
        let svc = service();
        let owner = Uuid::new_v4();

        let mut no_title = input("x", 10.0, "Completed", 1);
        no_title.title = None;
        assert!(matches!(
            svc.create(owner, no_title).await.unwrap_err(),
            GameError::Validation(_)
        ));

        let blank_title = input("   ", 10.0, "Completed", 1);
        assert!(matches!(
            svc.create(owner, blank_title).await.unwrap_err(),
            GameError::Validation(_)
        ));

        let mut no_hours = input("x", 10.0, "Completed", 1);
        no_hours.hours = None;
        assert!(matches!(
            svc.create(owner, no_hours).await.unwrap_err(),
            GameError::Validation(_)
        ));

        // Nothing persisted by any of the rejected inputs.
        assert!(svc.list(owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_unknown_status() {
        let svc = service();
        let owner = Uuid::new_v4();
        let err = svc
            .create(owner, input("x", 10.0, "Paused", 3))
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::Validation(_)));
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_store_error() {
        let store = Arc::new(MemoryGameStore::new());
        let svc = GameService::new(store.clone());
        let owner = Uuid::new_v4();

        store.set_unavailable();
        let err = svc.list(owner).await.unwrap_err();
        assert!(matches!(err, GameError::Store(_)));
        let err = svc
            .create(owner, input("x", 10.0, "Completed", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::Store(_)));
    }
}

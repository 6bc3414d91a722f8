use tracing::{info, warn};
use tycoon_api::{AuthoritativeService, CreateUserRequest};
use tycoon_core::{ExternalIdentity, PlayerProfile, ProgressSource, UserProgress};
use tycoon_store::{LocalProgressStore, ProgressField};

/// Map a signed-in identity onto its player progress.
///
/// The backend creates the record on first sight. When it cannot be reached
/// the totals come from the local store and are marked provisional. An
/// identity without an id, or without both a display name and an email, is
/// an error.
pub async fn resolve_user<S>(
    service: &S,
    store: &LocalProgressStore,
    identity: &ExternalIdentity,
) -> anyhow::Result<PlayerProfile>
where
    S: AuthoritativeService,
{
    identity.validate()?;

    let username = identity.username();
    let request = CreateUserRequest {
        id: identity.id.clone(),
        username: Some(username.clone()),
        email: identity.email.clone(),
    };

    let (totals, source) = match service.create_or_get_user(&request).await {
        Ok(record) => {
            let totals = record.totals();
            if let Err(e) = store.write_totals(totals).await {
                warn!(?e, user_id = %identity.id, "failed to mirror backend totals locally");
            }
            (totals, ProgressSource::Authoritative)
        }
        Err(err) => {
            warn!(%err, user_id = %identity.id, "backend unavailable; using local progress");
            (store.read_totals().await?, ProgressSource::Provisional)
        }
    };

    let mut progress = UserProgress::new(identity.id.clone());
    progress.apply_totals(totals, source);
    progress.pizzas_sold = store.get(ProgressField::PizzasSold).await?;
    progress.days_played = store.get(ProgressField::DaysPlayed).await?;

    info!(
        user_id = %identity.id,
        username = %username,
        balance = progress.balance,
        level = progress.level,
        authoritative = source.is_authoritative(),
        "player resolved"
    );

    Ok(PlayerProfile {
        identity: identity.clone(),
        username,
        progress,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use tycoon_core::{ExternalIdentity, ProgressSource, ProgressTotals};
    use tycoon_store::{LocalProgressStore, ProgressField};

    use super::resolve_user;
    use crate::test_support::{StubService, record};

    fn identity(id: &str) -> ExternalIdentity {
        ExternalIdentity {
            id: id.to_owned(),
            email: Some("mario@pizza.test".to_owned()),
            ..ExternalIdentity::default()
        }
    }

    #[tokio::test]
    async fn new_player_gets_starting_totals_from_backend() {
        let service = StubService::online();
        let store = LocalProgressStore::memory("test");

        let profile = resolve_user(&service, &store, &identity("u1")).await.unwrap();

        assert_eq!(profile.username, "mario");
        assert_eq!(profile.progress.totals(), ProgressTotals::default());
        assert_eq!(profile.progress.source, ProgressSource::Authoritative);
        assert_eq!(service.player("u1").unwrap().username.as_deref(), Some("mario"));
    }

    #[tokio::test]
    async fn resolving_twice_does_not_duplicate_the_player() {
        let service = StubService::online();
        let store = LocalProgressStore::memory("test");

        let first = resolve_user(&service, &store, &identity("u1")).await.unwrap();
        let second = resolve_user(&service, &store, &identity("u1")).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(service.player_count(), 1);
        assert_eq!(service.create_calls.load(Ordering::SeqCst), 2);
        assert_eq!(service.finish_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn existing_backend_totals_are_mirrored_locally() {
        let service = StubService::online();
        service.seed(record("u1", 740, 30, 4));
        let store = LocalProgressStore::memory("test");
        store.set(ProgressField::PizzasSold, 12).await.unwrap();

        let profile = resolve_user(&service, &store, &identity("u1")).await.unwrap();

        assert_eq!(profile.progress.balance, 740);
        assert_eq!(profile.progress.pizzas_sold, 12);
        assert_eq!(
            store.read_totals().await.unwrap(),
            ProgressTotals { balance: 740, xp: 30, level: 4 }
        );
    }

    #[tokio::test]
    async fn offline_resolution_uses_local_totals() {
        let service = StubService::offline();
        let store = LocalProgressStore::memory("test");
        store
            .write_totals(ProgressTotals { balance: 250, xp: 60, level: 2 })
            .await
            .unwrap();

        let profile = resolve_user(&service, &store, &identity("u1")).await.unwrap();

        assert_eq!(profile.progress.source, ProgressSource::Provisional);
        assert_eq!(profile.progress.balance, 250);
        assert_eq!(profile.progress.level, 2);
    }

    #[tokio::test]
    async fn invalid_identity_is_surfaced() {
        let service = StubService::online();
        let store = LocalProgressStore::memory("test");

        let missing_id = ExternalIdentity {
            id: String::new(),
            display_name: Some("Chef".to_owned()),
            ..ExternalIdentity::default()
        };
        assert!(resolve_user(&service, &store, &missing_id).await.is_err());
        assert_eq!(service.create_calls.load(Ordering::SeqCst), 0);
    }
}

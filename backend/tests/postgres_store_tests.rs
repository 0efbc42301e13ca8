//! PostgreSQL store tests
//!
//! Need a disposable database: `TEST_DATABASE_URL=... cargo test -- --ignored`

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use rand::{distributions::Alphanumeric, Rng};
    use sqlx::PgPool;

    use fittrme_backend::db;
    use fittrme_backend::models::{NewUser, SaveWeightRequest};
    use fittrme_backend::store::{CredentialStore, PgStore, StoreError, UniqueField, WeightStore};

    /// Helper to create a migrated test database pool
    async fn setup_test_db() -> PgPool {
        let database_url = std::env::var("TEST_DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/fittrme_test".to_string());

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(1)
            .connect(&database_url)
            .await
            .expect("Failed to connect to test database");

        db::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        pool
    }

    fn unique_user() -> NewUser {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(10)
            .map(char::from)
            .collect::<String>()
            .to_lowercase();

        NewUser {
            username: format!("user_{}", suffix),
            email: format!("{}@example.com", suffix),
            password_hash: "$2b$04$placeholderplaceholderplaceholderplaceholderpla".to_string(),
        }
    }

    #[tokio::test]
    #[ignore]
    async fn test_unique_constraints_map_to_conflicts() {
        let store = PgStore::new(setup_test_db().await);
        let user = unique_user();
        store.insert_user(user.clone()).await.unwrap();

        let same_email = NewUser {
            username: format!("{}_x", user.username),
            ..user.clone()
        };
        let err = store.insert_user(same_email).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(UniqueField::Email)));

        let same_username = NewUser {
            email: format!("x_{}", user.email),
            ..user
        };
        let err = store.insert_user(same_username).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(UniqueField::Username)));
    }

    #[tokio::test]
    #[ignore]
    async fn test_refresh_token_lifecycle() {
        let store = PgStore::new(setup_test_db().await);
        let user = store.insert_user(unique_user()).await.unwrap();
        let expires_at = Utc::now() + Duration::days(30);

        let first = store
            .insert_refresh_token(user.user_id, &format!("hash-a-{}", user.user_id), expires_at)
            .await
            .unwrap();
        store
            .insert_refresh_token(user.user_id, &format!("hash-b-{}", user.user_id), expires_at)
            .await
            .unwrap();

        let found = store
            .find_refresh_token_by_hash(&first.token_hash)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, first.id);
        assert!(!found.revoked);

        // conditional revoke succeeds once
        assert!(store.revoke_refresh_token(first.id).await.unwrap());
        assert!(!store.revoke_refresh_token(first.id).await.unwrap());

        assert_eq!(
            store
                .count_active_refresh_tokens(user.user_id, Utc::now())
                .await
                .unwrap(),
            1
        );
        assert_eq!(store.revoke_user_refresh_tokens(user.user_id).await.unwrap(), 1);
        assert_eq!(store.revoke_user_refresh_tokens(user.user_id).await.unwrap(), 0);
    }

    #[tokio::test]
    #[ignore]
    async fn test_weight_upsert() {
        let store = PgStore::new(setup_test_db().await);
        let user = store.insert_user(unique_user()).await.unwrap();

        assert!(store.latest_weight(user.user_id).await.unwrap().is_none());

        let input = SaveWeightRequest {
            current_weight: 82.0,
            target_weight: 76.0,
            height: 178.0,
        };
        store.upsert_weight(user.user_id, input).await.unwrap();
        store
            .upsert_weight(
                user.user_id,
                SaveWeightRequest {
                    current_weight: 81.0,
                    ..input
                },
            )
            .await
            .unwrap();

        let latest = store.latest_weight(user.user_id).await.unwrap().unwrap();
        assert_eq!(latest.current_weight, 81.0);
    }

    #[tokio::test]
    #[ignore]
    async fn test_ping() {
        let store = PgStore::new(setup_test_db().await);
        store.ping().await.unwrap();
    }
}

#[cfg(test)]
mod tests {
    use crate::commands::auth::{login_internal, register_internal};
    use crate::commands::consultation::{consultations_for_user, create_consultation_internal};
    use crate::commands::crop::{add_crop_internal, crops_for_user};
    use crate::commands::dashboard::{detection_history_internal, stats_internal};
    use crate::commands::detect::record_detection;
    use crate::commands::treatment::{add_treatment_internal, treatments_for_crop};
    use crate::db::{self, CropStatus, DbPool, Effectiveness, TreatmentType};
    use crate::error::AppError;
    use crate::session::{SessionStore, SessionUser};
    use crate::upload::store_upload;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use std::str::FromStr;

    async fn setup_test_db() -> DbPool {
        // A single connection keeps every query on the same in-memory database.
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await
            .expect("Failed to create pool");
        db::init_database(&pool)
            .await
            .expect("Failed to create schema");
        pool
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let pool = setup_test_db().await;

        let user_id = register_internal(&pool, "alice", "a@x.com", "p", Some("Pune"))
            .await
            .unwrap();
        assert!(user_id > 0);

        let user = login_internal(&pool, "alice", "p").await.unwrap();
        assert_eq!(user.id, user_id);
        assert_eq!(user.location.as_deref(), Some("Pune"));

        let wrong = login_internal(&pool, "alice", "wrong").await;
        assert!(matches!(wrong, Err(AppError::InvalidCredentials)));

        let unknown = login_internal(&pool, "bob", "p").await;
        assert!(matches!(unknown, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_duplicate_registration_rejected() {
        let pool = setup_test_db().await;

        register_internal(&pool, "alice", "a@x.com", "p", None)
            .await
            .unwrap();

        let dup_name = register_internal(&pool, "alice", "other@x.com", "p", None).await;
        assert!(matches!(dup_name, Err(AppError::DuplicateUsername)));

        let dup_email = register_internal(&pool, "alice2", "a@x.com", "p", None).await;
        assert!(matches!(dup_email, Err(AppError::DuplicateEmail)));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = 'alice'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_registration() {
        let pool = setup_test_db().await;

        // No check-then-act: both inserts race and the unique constraint
        // decides, so exactly one succeeds.
        let (a, b) = tokio::join!(
            register_internal(&pool, "carol", "c1@x.com", "p", None),
            register_internal(&pool, "carol", "c2@x.com", "p", None),
        );

        let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        for r in [a, b] {
            if let Err(e) = r {
                assert!(matches!(e, AppError::DuplicateUsername));
            }
        }

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = 'carol'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_detection_stats_aggregation() {
        let pool = setup_test_db().await;
        let user_id = register_internal(&pool, "alice", "a@x.com", "p", None)
            .await
            .unwrap();

        add_crop_internal(
            &pool,
            user_id,
            "tomato",
            Some("field A"),
            None,
            CropStatus::Healthy,
        )
        .await
        .unwrap();
        add_crop_internal(&pool, user_id, "potato", None, None, CropStatus::Infected)
            .await
            .unwrap();

        for label in ["Tomato___Late_blight", "Tomato___Late_blight", "Tomato___healthy"] {
            record_detection(&pool, user_id, None, "img.jpg", label, 91.5, None)
                .await
                .unwrap();
        }

        let stats = stats_internal(&pool, user_id).await.unwrap();
        assert_eq!(stats.total_detections, 3);
        assert_eq!(stats.total_crops, 2);
        assert_eq!(stats.disease_distribution["Tomato___Late_blight"], 2);
        assert_eq!(stats.disease_distribution["Tomato___healthy"], 1);

        let distributed: i64 = stats.disease_distribution.values().sum();
        assert_eq!(distributed, stats.total_detections);

        // Another user's rows are invisible.
        let other_id = register_internal(&pool, "bob", "b@x.com", "p", None)
            .await
            .unwrap();
        let other_stats = stats_internal(&pool, other_id).await.unwrap();
        assert_eq!(other_stats.total_detections, 0);
        assert_eq!(other_stats.total_crops, 0);
        assert!(other_stats.disease_distribution.is_empty());
    }

    #[tokio::test]
    async fn test_detection_history_newest_first() {
        let pool = setup_test_db().await;
        let user_id = register_internal(&pool, "alice", "a@x.com", "p", None)
            .await
            .unwrap();

        let first = record_detection(
            &pool,
            user_id,
            None,
            "100_ab_one.jpg",
            "Tomato___Early_blight",
            77.0,
            None,
        )
        .await
        .unwrap();
        let second = record_detection(
            &pool,
            user_id,
            None,
            "101_cd_two.jpg",
            "Tomato___healthy",
            99.0,
            Some("looks fine"),
        )
        .await
        .unwrap();

        let history = detection_history_internal(&pool, user_id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, second);
        assert_eq!(history[1].id, first);
        assert_eq!(history[0].image_url, "/static/uploads/101_cd_two.jpg");
        assert!((history[0].confidence - 99.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_detection_requires_valid_user() {
        let pool = setup_test_db().await;

        // Foreign keys are on: a detection cannot reference a missing user.
        let result = record_detection(&pool, 999, None, "x.jpg", "label", 10.0, None).await;
        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[tokio::test]
    async fn test_treatment_lifecycle() {
        let pool = setup_test_db().await;
        let user_id = register_internal(&pool, "alice", "a@x.com", "p", None)
            .await
            .unwrap();
        let crop_id = add_crop_internal(&pool, user_id, "tomato", None, None, CropStatus::Healthy)
            .await
            .unwrap();

        let treatment_id = add_treatment_internal(
            &pool,
            crop_id,
            Some("Tomato___Late_blight"),
            TreatmentType::Chemical,
            Some("Copper oxychloride spray"),
            Some(Effectiveness::PartiallyEffective),
            None,
        )
        .await
        .unwrap();
        assert!(treatment_id > 0);

        let treatments = treatments_for_crop(&pool, crop_id).await.unwrap();
        assert_eq!(treatments.len(), 1);
        assert_eq!(treatments[0].treatment_type.as_deref(), Some("chemical"));
        assert_eq!(
            treatments[0].effectiveness.as_deref(),
            Some("partially_effective")
        );

        let crops = crops_for_user(&pool, user_id).await.unwrap();
        assert_eq!(crops.len(), 1);
        assert_eq!(crops[0].status, "healthy");
    }

    #[tokio::test]
    async fn test_consultation_with_and_without_user() {
        let pool = setup_test_db().await;
        let user_id = register_internal(&pool, "alice", "a@x.com", "p", None)
            .await
            .unwrap();

        create_consultation_internal(
            &pool,
            None,
            "Guest Farmer",
            "guest@x.com",
            Some("555-0101"),
            Some("tomato"),
            "My leaves have spots",
        )
        .await
        .unwrap();

        create_consultation_internal(
            &pool,
            Some(user_id),
            "Alice",
            "a@x.com",
            None,
            None,
            "Follow-up on last detection",
        )
        .await
        .unwrap();

        let mine = consultations_for_user(&pool, user_id).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].name, "Alice");
        assert_eq!(mine[0].status, "pending");

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM consultations")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(total, 2);
    }

    #[test]
    fn test_session_store_lifecycle() {
        let store = SessionStore::new();
        let token = store.create(SessionUser {
            user_id: 7,
            username: "alice".to_string(),
        });

        let user = store.get(&token).unwrap();
        assert_eq!(user.user_id, 7);

        store.remove(&token);
        assert!(store.get(&token).is_none());
        // Removing again is a no-op.
        store.remove(&token);
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_store_upload_rejects_before_writing() {
        let dir = std::env::temp_dir().join(format!("cropguard-test-{}", uuid::Uuid::new_v4()));

        let oversize = store_upload(&dir, "leaf.jpg", &[0u8; 64], 16);
        assert!(matches!(oversize, Err(AppError::PayloadTooLarge(16))));
        // The cap fires before any filesystem work.
        assert!(!dir.exists());

        let unnamed = store_upload(&dir, "  ", b"data", 1024);
        assert!(matches!(unnamed, Err(AppError::InvalidUpload(_))));
        assert!(!dir.exists());

        let empty = store_upload(&dir, "leaf.jpg", &[], 1024);
        assert!(matches!(empty, Err(AppError::InvalidUpload(_))));
        assert!(!dir.exists());
    }

    #[test]
    fn test_store_upload_writes_and_renames() {
        let dir = std::env::temp_dir().join(format!("cropguard-test-{}", uuid::Uuid::new_v4()));

        let stored = store_upload(&dir, "../sneaky/leaf photo.jpg", b"jpegdata", 1024).unwrap();
        assert!(stored.ends_with("_leafphoto.jpg"));
        assert!(!stored.contains("/"));

        let content = std::fs::read(dir.join(&stored)).unwrap();
        assert_eq!(content, b"jpegdata");

        // No temporary files survive a successful store.
        let leftovers: Vec<_> = std::fs::read_dir(&dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }
}

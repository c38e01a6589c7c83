#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use uuid::Uuid;

    use crate::database::entity::post::PostKind;
    use crate::database::entity::{post, user};
    use crate::database::postgres::{PostgresPostRepository, PostgresUserRepository};
    use gflab_core::ports::{PostRepository, UserRepository};

    fn user_model(email: &str, name: &str) -> user::Model {
        let now = chrono::Utc::now();
        user::Model {
            id: Uuid::new_v4(),
            email: email.to_owned(),
            name: name.to_owned(),
            picture: None,
            password_hash: "hash".to_owned(),
            is_admin: false,
            is_active: true,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn find_user_by_email_maps_to_domain() {
        let model = user_model("jane@x.com", "Jane Park");
        let expected_id = model.id;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model]])
            .into_connection();

        let repo = PostgresUserRepository::new(db);
        let found = repo.find_by_email("jane@x.com").await.unwrap();

        assert!(found.is_some());
        let found = found.unwrap();
        assert_eq!(found.id, expected_id);
        assert_eq!(found.name, "Jane Park");
    }

    #[tokio::test]
    async fn find_post_by_id_maps_kind_and_counters() {
        let now = chrono::Utc::now();
        let post_id = Uuid::new_v4();
        let model = post::Model {
            id: post_id,
            post_type: PostKind::Request,
            title: "Need a projector".to_owned(),
            content: "Anyone?".to_owned(),
            author_id: Uuid::new_v4(),
            author_email: "author@lab.org".to_owned(),
            author_name: "Author".to_owned(),
            is_pinned: false,
            is_resolved: true,
            view_count: 42,
            image_url: None,
            created_at: now.into(),
            updated_at: now.into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let found = repo.find(post_id).await.unwrap().unwrap();

        assert_eq!(found.post_type, gflab_core::domain::PostType::Request);
        assert!(found.is_resolved);
        assert_eq!(found.view_count, 42);
    }

    #[tokio::test]
    async fn record_view_reports_whether_a_row_was_touched() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        assert!(repo.record_view(Uuid::new_v4()).await.unwrap());
        assert!(!repo.record_view(Uuid::new_v4()).await.unwrap());
    }
}

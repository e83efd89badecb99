#[cfg(test)]
mod tests {
    use fleur::catalog::{seed::seed_catalog, Catalog};
    use fleur::config::DatabaseConfig;
    use fleur::db::service::DbService;
    use fleur::db::{get_connection, DbPool};

    // In-memory database just for tests
    fn test_pool() -> DbPool {
        get_connection(&DatabaseConfig {
            path: ":memory:".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_session_lifecycle() {
        let pool = test_pool();
        let conn = pool.lock().unwrap();

        // 1. Insert Session
        let session = DbService::insert_session(&conn, "Scent advice").unwrap();
        assert_eq!(session.name, "Scent advice");

        // 2. Get Session
        let fetched = DbService::get_session(&conn, session.id).unwrap().unwrap();
        assert_eq!(fetched.id, session.id);

        // 3. List Sessions
        let list = DbService::list_sessions(&conn, 10, 0).unwrap();
        assert_eq!(list.len(), 1);

        // 4. Delete Session
        DbService::delete_session(&conn, session.id).unwrap();
        let deleted = DbService::get_session(&conn, session.id).unwrap();
        assert!(deleted.is_none());
    }

    #[test]
    fn test_message_lifecycle() {
        let pool = test_pool();
        let conn = pool.lock().unwrap();
        let session = DbService::insert_session(&conn, "Transcript test").unwrap();

        let msg1 = DbService::insert_message(&conn, session.id, "user", "Hello!", None, None).unwrap();
        let msg2 =
            DbService::insert_message(&conn, session.id, "assistant", "Welcome to Fleur.", Some("openai"), Some(42))
                .unwrap();

        assert_eq!(msg1.role, "user");
        assert_eq!(msg1.session_id, session.id);
        assert_eq!(msg2.model.as_deref(), Some("openai"));
        assert_eq!(msg2.token_count, Some(42));

        let history = DbService::get_messages(&conn, session.id, 10, 0).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, "user");
        assert_eq!(history[1].role, "assistant");

        // Deleting the session removes its transcript too
        DbService::delete_session(&conn, session.id).unwrap();
        let empty_history = DbService::get_messages(&conn, session.id, 10, 0).unwrap();
        assert_eq!(empty_history.len(), 0);
    }

    #[test]
    fn test_catalog_seed_is_idempotent() {
        let pool = test_pool();

        {
            let conn = pool.lock().unwrap();
            let inserted = seed_catalog(&conn).unwrap();
            assert!(inserted > 0);

            let again = seed_catalog(&conn).unwrap();
            assert_eq!(again, 0);
        }

        let catalog = Catalog::new(pool);
        let products = catalog.list_all().unwrap();
        assert_eq!(products.len(), 17);
    }

    #[test]
    fn test_find_by_name_is_case_insensitive() {
        let pool = test_pool();
        {
            let conn = pool.lock().unwrap();
            seed_catalog(&conn).unwrap();
        }

        let catalog = Catalog::new(pool);

        let product = catalog.find_by_name("OCEAN SECRETS").unwrap().unwrap();
        assert_eq!(product.name, "Ocean Secrets");
        assert_eq!(product.price, 300.0);

        let padded = catalog.find_by_name("  ocean secrets  ").unwrap().unwrap();
        assert_eq!(padded.id, product.id);

        assert!(catalog.find_by_name("No Such Scent").unwrap().is_none());
    }

    #[test]
    fn test_top_rated_orders_by_rating() {
        let pool = test_pool();
        {
            let conn = pool.lock().unwrap();
            seed_catalog(&conn).unwrap();
        }

        let catalog = Catalog::new(pool);
        let top = catalog.top_rated(5).unwrap();
        assert_eq!(top.len(), 5);
        for pair in top.windows(2) {
            assert!(pair[0].rating >= pair[1].rating);
        }
    }
}

use sqlx::PgPool;

/// Every `id` column is a bigint.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_all_pks_are_bigint(pool: PgPool) {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT table_name, data_type
         FROM information_schema.columns
         WHERE column_name = 'id'
           AND table_schema = 'public'
           AND table_name != '_sqlx_migrations'
         ORDER BY table_name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert_eq!(rows.len(), 4, "expected users, user_sessions, guest_types, guests");
    for (table, data_type) in &rows {
        assert_eq!(data_type, "bigint", "Table {table}.id should be bigint");
    }
}

/// Every table carries `created_at` / `updated_at` as timestamptz, and a
/// trigger keeps `updated_at` current.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_all_tables_have_timestamps_and_trigger(pool: PgPool) {
    let tables: Vec<(String,)> = sqlx::query_as(
        "SELECT table_name
         FROM information_schema.tables
         WHERE table_schema = 'public'
           AND table_type = 'BASE TABLE'
           AND table_name != '_sqlx_migrations'
         ORDER BY table_name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    for (table,) in &tables {
        for col in ["created_at", "updated_at"] {
            let data_type: Option<String> = sqlx::query_scalar(
                "SELECT data_type
                 FROM information_schema.columns
                 WHERE table_schema = 'public' AND table_name = $1 AND column_name = $2",
            )
            .bind(table)
            .bind(col)
            .fetch_optional(&pool)
            .await
            .unwrap();

            let data_type = data_type.unwrap_or_else(|| panic!("Table {table} is missing {col}"));
            assert_eq!(data_type, "timestamp with time zone", "{table}.{col}");
        }

        let has_trigger: bool = sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT 1 FROM information_schema.triggers
                WHERE event_object_table = $1 AND trigger_name = 'set_updated_at'
            )",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert!(has_trigger, "Table {table} is missing the set_updated_at trigger");
    }
}

/// TEXT is used for strings; lengths are enforced by CHECK constraints.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_no_varchar_columns(pool: PgPool) {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT table_name, column_name
         FROM information_schema.columns
         WHERE table_schema = 'public'
           AND data_type = 'character varying'
           AND table_name != '_sqlx_migrations'",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(rows.is_empty(), "Found VARCHAR columns: {rows:?}");
}

/// Every foreign key column has an index.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_all_fks_have_indexes(pool: PgPool) {
    let fk_columns: Vec<(String, String)> = sqlx::query_as(
        "SELECT DISTINCT tc.table_name, kcu.column_name
         FROM information_schema.table_constraints tc
         JOIN information_schema.key_column_usage kcu
             ON tc.constraint_name = kcu.constraint_name
             AND tc.table_schema = kcu.table_schema
         WHERE tc.constraint_type = 'FOREIGN KEY'
           AND tc.table_schema = 'public'
         ORDER BY tc.table_name, kcu.column_name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(!fk_columns.is_empty());
    for (table, column) in &fk_columns {
        let has_index: bool = sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT 1 FROM pg_indexes
                WHERE schemaname = 'public'
                  AND tablename = $1
                  AND indexdef LIKE '%(' || $2 || '%'
            )",
        )
        .bind(table)
        .bind(column)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert!(has_index, "FK column {table}.{column} has no index");
    }
}

/// Guests cannot be stored with an empty stay or an over-long comment, even
/// when the application checks are bypassed.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_guest_check_constraints(pool: PgPool) {
    let user_id: i64 = sqlx::query_scalar(
        "INSERT INTO users (username, email, password_hash) VALUES ('u_check', 'u@x.io', 'h')
         RETURNING id",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    let type_id: i64 =
        sqlx::query_scalar("INSERT INTO guest_types (name) VALUES ('Checker') RETURNING id")
            .fetch_one(&pool)
            .await
            .unwrap();

    let insert = "INSERT INTO guests (guest_type_id, inviter_id, coming_date, coming_time, stay_time, comment)
                  VALUES ($1, $2, DATE '2099-01-01', TIME '10:00', $3::TIME, $4)";

    let zero_stay = sqlx::query(insert)
        .bind(type_id)
        .bind(user_id)
        .bind("00:00:00")
        .bind(None::<String>)
        .execute(&pool)
        .await;
    assert!(zero_stay.is_err());

    let long_comment = sqlx::query(insert)
        .bind(type_id)
        .bind(user_id)
        .bind("01:00:00")
        .bind("x".repeat(257))
        .execute(&pool)
        .await;
    assert!(long_comment.is_err());
}

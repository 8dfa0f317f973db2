//! Facade behaviour against the in-memory gateway.

use movielens_db::{DbError, MemoryGateway, MovieSchema, ProcParam};
use movielens_model::{
    CreateGenreRequest, CreateLinkRequest, CreateRatingRequest, DbValue, Procedure, ResultRow,
};
use rust_decimal::Decimal;

fn schema_with(gateway: MemoryGateway) -> MovieSchema<MemoryGateway> {
    MovieSchema::new("t2project", gateway).expect("valid schema")
}

#[tokio::test]
async fn creation_calls_carry_positional_params() {
    let schema = schema_with(MemoryGateway::new());
    let link = CreateLinkRequest {
        movie_id: 1,
        imdb_id: Some("tt0114709".to_string()),
        tmdb_id: Some(862),
    };
    let outcome = schema.link_create(&link).await.expect("link");
    assert_eq!(outcome.row_count, 0);
    assert!(outcome.rows.is_empty());

    let calls = schema.gateway().calls();
    assert_eq!(calls.len(), 1);
    let call = &calls[0];
    assert_eq!(call.qualified_name(), "t2project.ADD_LINK");
    assert!(!call.expect_rows);
    assert!(call.lowercase_keys);
    assert_eq!(
        call.params,
        vec![
            ProcParam::Int(Some(1)),
            ProcParam::text("tt0114709"),
            ProcParam::Int(Some(862))
        ]
    );
}

#[tokio::test]
async fn listing_returns_lowercased_rows() {
    let row = ResultRow::new()
        .with("ID", 18_i64)
        .with("NAME", "Drama");
    let schema = schema_with(MemoryGateway::new().with_rows(Procedure::GetGenres, vec![row]));

    let outcome = schema.genre_listing().await.expect("genres");
    assert_eq!(outcome.row_count, 1);
    let first = &outcome.rows[0];
    assert_eq!(first.get("id"), Some(&DbValue::Int(18)));
    assert_eq!(first.get("name").and_then(DbValue::as_str), Some("Drama"));
}

#[tokio::test]
async fn average_rating_passes_genre_text() {
    let row = ResultRow::new()
        .with("title", "Heat")
        .with("average_rating", Decimal::new(412, 2));
    let schema = schema_with(
        MemoryGateway::new().with_rows(Procedure::GetAverageRatingByGenre, vec![row]),
    );

    let outcome = schema.average_rating_by_genre("Drama").await.expect("query");
    assert_eq!(outcome.row_count, 1);
    let calls = schema.gateway().calls_to(Procedure::GetAverageRatingByGenre);
    assert_eq!(calls[0].params, vec![ProcParam::text("Drama")]);
    assert!(calls[0].expect_rows);
}

#[tokio::test]
async fn failing_procedure_surfaces_error() {
    let schema = schema_with(MemoryGateway::new().failing(Procedure::AddRating));
    let rating = CreateRatingRequest {
        user_id: 1,
        movie_id: 31,
        rating: 2.5,
        timestamp: 1_260_759_144,
    };
    let error = schema.rating_create(&rating).await.unwrap_err();
    assert!(matches!(error, DbError::Rejected { .. }));

    let genre = CreateGenreRequest {
        id: 18,
        name: "Drama".to_string(),
    };
    assert!(schema.genre_create(&genre).await.is_ok());
    assert_eq!(schema.gateway().calls().len(), 2);
}

#[tokio::test]
async fn close_rejects_later_calls() {
    let schema = schema_with(MemoryGateway::new());
    schema.execute("CREATE INDEX IDX_MOVIES_TITLE ON MOVIES(TITLE)").await.expect("ddl");
    schema.close().await;
    assert!(schema.gateway().is_closed());
    assert!(schema.movie_listing().await.is_err());
    assert_eq!(
        schema.gateway().statements(),
        vec![(
            "t2project".to_string(),
            "CREATE INDEX IDX_MOVIES_TITLE ON MOVIES(TITLE)".to_string()
        )]
    );
}

//! End-to-end load runs against the in-memory gateway.

use std::fs;
use std::path::Path;

use movielens_cli::pipeline::{LoadOptions, RowErrorKind, run_load};
use movielens_db::{MemoryGateway, MovieSchema, ProcParam};
use movielens_model::Procedure;

const MOVIE_HEADER: &str = "id,imdb_id,title,original_title,overview,release_date,budget,\
revenue,runtime,adult,popularity,vote_average,vote_count,status,tagline,original_language,\
belongs_to_collection,homepage,poster_path,production_companies,production_countries,\
spoken_languages,video,genres";

fn movie_row(id: &str, title: &str, genres: &str) -> String {
    format!("{id},,{title}{}\"{genres}\"", ",".repeat(21))
}

fn write_fixture(dir: &Path) {
    fs::write(
        dir.join("links.csv"),
        "movieId,imdbId,tmdbId\n1,0114709,862\n2,113497,8844\n3,tt0113228,15602\n",
    )
    .expect("write links");

    let movies = [
        MOVIE_HEADER.to_string(),
        movie_row("862", "Toy Story", "[{'id': 18, 'name': 'Drama'}]"),
        movie_row("8844", "Jumanji", "[{'id': 18, 'name': 'Drama'}]"),
        movie_row("15602", "Grumpier Old Men", "[]"),
    ]
    .join("\n");
    fs::write(dir.join("movies_metadata.csv"), movies + "\n").expect("write movies");

    fs::write(
        dir.join("ratings.csv"),
        "userId,movieId,rating,timestamp\n\
         1,1,4.0,1260759144\n\
         1,2,3.5,1260759179\n\
         2,1,5.0,1260759182\n\
         2,3,,1260759185\n\
         3,2,2.0,1260759205\n",
    )
    .expect("write ratings");
}

fn schema(gateway: MemoryGateway) -> MovieSchema<MemoryGateway> {
    MovieSchema::new("t2project", gateway).expect("schema")
}

#[tokio::test]
async fn loads_documented_fixture() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_fixture(dir.path());
    let schema = schema(MemoryGateway::new());

    let report = run_load(&schema, &LoadOptions::test_scale(dir.path())).await;

    assert_eq!(report.links.persisted, 3);
    assert_eq!(report.movies.persisted, 3);
    assert_eq!(report.genres.persisted, 1);
    assert_eq!(report.movie_genres.persisted, 2);
    assert_eq!(report.ratings.persisted, 4);
    assert_eq!(report.ratings.rows_read, 5);
    assert_eq!(report.ratings.skipped(), 1);
    assert_eq!(report.total_persisted(), 13);
    assert_eq!(report.total_errors(), 1);

    let gateway = schema.gateway();
    assert_eq!(gateway.calls_to(Procedure::AddLink).len(), 3);
    assert_eq!(gateway.calls_to(Procedure::AddGenre).len(), 1);
    assert_eq!(gateway.calls_to(Procedure::AddMovieGenre).len(), 2);
}

#[tokio::test]
async fn stages_run_in_fixed_order() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_fixture(dir.path());
    let schema = schema(MemoryGateway::new());

    run_load(&schema, &LoadOptions::full_scale(dir.path())).await;

    let mut phases: Vec<Procedure> = schema
        .gateway()
        .calls()
        .iter()
        .map(|call| call.procedure)
        .collect();
    phases.dedup();
    assert_eq!(
        phases,
        vec![
            Procedure::AddLink,
            Procedure::AddMovie,
            Procedure::AddGenre,
            Procedure::AddMovieGenre,
            Procedure::AddRating,
        ]
    );
}

#[tokio::test]
async fn link_ids_are_padded_before_persisting() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_fixture(dir.path());
    let schema = schema(MemoryGateway::new());

    run_load(&schema, &LoadOptions::test_scale(dir.path())).await;

    let links = schema.gateway().calls_to(Procedure::AddLink);
    assert_eq!(links[1].params[1], ProcParam::text("tt0113497"));
    assert_eq!(links[2].params[1], ProcParam::text("tt0113228"));
    assert_eq!(links[0].params[2], ProcParam::Int(Some(862)));
}

#[tokio::test]
async fn database_failures_do_not_stop_the_stage() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_fixture(dir.path());
    let schema = schema(MemoryGateway::new().failing(Procedure::AddRating));

    let report = run_load(&schema, &LoadOptions::test_scale(dir.path())).await;

    assert_eq!(report.ratings.persisted, 0);
    assert_eq!(report.ratings.failed(), 4);
    assert_eq!(report.ratings.skipped(), 1);
    assert!(
        report
            .ratings
            .errors
            .iter()
            .any(|error| matches!(error.kind, RowErrorKind::Database(_)))
    );
    assert_eq!(report.movies.persisted, 3);
}

#[tokio::test]
async fn missing_sources_fail_only_their_stage() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_fixture(dir.path());
    fs::remove_file(dir.path().join("links.csv")).expect("remove links");
    fs::remove_file(dir.path().join("movies_metadata.csv")).expect("remove movies");
    let schema = schema(MemoryGateway::new());

    let report = run_load(&schema, &LoadOptions::test_scale(dir.path())).await;

    assert!(report.links.failure.is_some());
    assert!(report.movies.failure.is_some());
    assert_eq!(report.genres.rows_read, 0);
    assert_eq!(report.movie_genres.rows_read, 0);
    assert!(report.ratings.failure.is_none());
    assert_eq!(report.ratings.persisted, 4);
}

#[tokio::test]
async fn limits_truncate_each_source() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_fixture(dir.path());
    let schema = schema(MemoryGateway::new());
    let options = LoadOptions {
        link_limit: Some(1),
        movie_limit: Some(1),
        rating_limit: Some(2),
        ..LoadOptions::full_scale(dir.path())
    };

    let report = run_load(&schema, &options).await;

    assert_eq!(report.links.rows_read, 1);
    assert_eq!(report.movies.rows_read, 1);
    assert_eq!(report.movie_genres.persisted, 1);
    assert_eq!(report.ratings.rows_read, 2);
    assert_eq!(report.ratings.persisted, 2);
}

#[tokio::test]
async fn genres_of_unusable_movies_are_still_collected() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_fixture(dir.path());
    let movies = [
        MOVIE_HEADER.to_string(),
        movie_row("1997-08-20", "Broken Row", "[{'id': 35, 'name': 'Comedy'}]"),
    ]
    .join("\n");
    fs::write(dir.path().join("movies_metadata.csv"), movies + "\n").expect("write movies");
    let schema = schema(MemoryGateway::new());

    let report = run_load(&schema, &LoadOptions::test_scale(dir.path())).await;

    assert_eq!(report.movies.skipped(), 1);
    assert_eq!(report.genres.persisted, 1);
    assert_eq!(report.movie_genres.skipped(), 1);
    assert_eq!(report.movie_genres.persisted, 0);
}

#[tokio::test]
async fn deeply_nested_genres_cell_loses_only_its_genres() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_fixture(dir.path());
    let nested = "[".repeat(200_000);
    let movies = [
        MOVIE_HEADER.to_string(),
        movie_row("862", "Toy Story", &nested),
        movie_row("8844", "Jumanji", "[{'id': 18, 'name': 'Drama'}]"),
    ]
    .join("\n");
    fs::write(dir.path().join("movies_metadata.csv"), movies + "\n").expect("write movies");
    let schema = schema(MemoryGateway::new());

    let report = run_load(&schema, &LoadOptions::test_scale(dir.path())).await;

    assert_eq!(report.movies.persisted, 2);
    assert_eq!(report.genres.persisted, 1);
    assert_eq!(report.movie_genres.persisted, 1);
    assert_eq!(report.ratings.persisted, 4);
}

//! Tests for row cleaning rules.

use chrono::NaiveDate;

use movielens_ingest::{LinkRecord, MovieRecord, RatingRecord};
use movielens_transform::{
    SkipReason, clean_link, clean_movie, clean_movie_genre, clean_rating, movie_genres,
};

fn cell(value: &str) -> Option<String> {
    Some(value.to_string())
}

fn rating(user: &str, movie: &str, rating: Option<&str>, timestamp: Option<&str>) -> RatingRecord {
    RatingRecord {
        user_id: cell(user),
        movie_id: cell(movie),
        rating: rating.map(str::to_string),
        timestamp: timestamp.map(str::to_string),
    }
}

#[test]
fn link_without_prefix_is_padded() {
    let record = LinkRecord {
        movie_id: cell("1"),
        imdb_id: cell("114709"),
        tmdb_id: cell("862"),
    };
    let request = clean_link(&record).expect("link");
    assert_eq!(request.movie_id, 1);
    assert_eq!(request.imdb_id.as_deref(), Some("tt0114709"));
    assert_eq!(request.tmdb_id, Some(862));
}

#[test]
fn link_with_prefix_is_unchanged() {
    let record = LinkRecord {
        movie_id: cell("2"),
        imdb_id: cell("tt0113497"),
        tmdb_id: cell("8844.0"),
    };
    let request = clean_link(&record).expect("link");
    assert_eq!(request.imdb_id.as_deref(), Some("tt0113497"));
    assert_eq!(request.tmdb_id, Some(8844));
}

#[test]
fn link_without_movie_id_is_skipped() {
    let record = LinkRecord {
        movie_id: None,
        imdb_id: cell("114709"),
        tmdb_id: cell("862"),
    };
    assert_eq!(
        clean_link(&record),
        Err(SkipReason::MissingField("movieId"))
    );
    let zero = LinkRecord {
        movie_id: cell("0"),
        ..record
    };
    assert_eq!(clean_link(&zero), Err(SkipReason::MissingField("movieId")));
}

#[test]
fn rating_requires_all_fields() {
    assert!(clean_rating(&rating("1", "31", Some("2.5"), Some("1260759144"))).is_ok());
    assert_eq!(
        clean_rating(&rating("1", "31", Some("2.5"), None)),
        Err(SkipReason::MissingField("timestamp"))
    );
    assert_eq!(
        clean_rating(&rating("1", "31", None, Some("1260759144"))),
        Err(SkipReason::MissingField("rating"))
    );
    assert_eq!(
        clean_rating(&rating("0", "31", Some("2.5"), Some("1260759144"))),
        Err(SkipReason::MissingField("userId"))
    );
}

#[test]
fn zero_rating_is_kept() {
    let request = clean_rating(&rating("1", "31", Some("0"), Some("1260759144"))).expect("rating");
    assert_eq!(request.rating, 0.0);
}

#[test]
fn movie_fields_are_typed() {
    let record = MovieRecord {
        id: cell("862"),
        imdb_id: cell("tt0114709"),
        title: cell("Toy Story"),
        release_date: cell("1995-10-30"),
        budget: cell("30000000"),
        runtime: cell("81.0"),
        adult: cell("False"),
        video: cell("True"),
        vote_count: cell("5415.0"),
        genres: cell("[{'id': 16, 'name': 'Animation'}, {'id': 35, 'name': 'Comedy'}]"),
        ..MovieRecord::default()
    };
    let movie = clean_movie(&record).expect("movie");
    assert_eq!(movie.id, 862);
    assert_eq!(movie.title.as_deref(), Some("Toy Story"));
    assert_eq!(movie.release_date, NaiveDate::from_ymd_opt(1995, 10, 30));
    assert_eq!(movie.budget, Some(30_000_000));
    assert_eq!(movie.runtime, Some(81.0));
    assert!(!movie.adult);
    assert!(movie.video);
    assert_eq!(movie.vote_count, Some(5415));
    assert_eq!(movie.tagline, None);
    assert_eq!(
        movie_genres(&record),
        vec![(16, "Animation".to_string()), (35, "Comedy".to_string())]
    );
}

#[test]
fn movie_with_garbage_id_is_skipped() {
    let record = MovieRecord {
        id: cell("1997-08-20"),
        ..MovieRecord::default()
    };
    assert_eq!(clean_movie(&record), Err(SkipReason::MissingField("id")));
}

#[test]
fn movie_genre_needs_both_ids() {
    assert!(clean_movie_genre(Some(862), 16).is_ok());
    assert_eq!(
        clean_movie_genre(None, 16),
        Err(SkipReason::MissingField("movie_id"))
    );
    assert_eq!(
        clean_movie_genre(Some(862), 0),
        Err(SkipReason::MissingField("genre_id"))
    );
}

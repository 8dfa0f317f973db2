//! Statically typed raw records, one per CSV source.
//!
//! Raw records keep every cell as text (or `None` for NA tokens); typing and
//! cleaning happen in `movielens-transform`.

/// A record type that can be populated from a CSV row.
pub trait SourceRecord: Sized {
    /// File name inside the data directory.
    const FILE_NAME: &'static str;
    /// Header names this record reads, in field order.
    const COLUMNS: &'static [&'static str];

    /// Build the record from cells ordered as [`Self::COLUMNS`].
    fn from_cells(cells: Vec<Option<String>>) -> Self;
}

/// Row of `links.csv`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkRecord {
    pub movie_id: Option<String>,
    pub imdb_id: Option<String>,
    pub tmdb_id: Option<String>,
}

impl SourceRecord for LinkRecord {
    const FILE_NAME: &'static str = "links.csv";
    const COLUMNS: &'static [&'static str] = &["movieId", "imdbId", "tmdbId"];

    fn from_cells(cells: Vec<Option<String>>) -> Self {
        let mut cells = cells.into_iter();
        let mut next = || cells.next().flatten();
        Self {
            movie_id: next(),
            imdb_id: next(),
            tmdb_id: next(),
        }
    }
}

/// Row of `ratings.csv`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RatingRecord {
    pub user_id: Option<String>,
    pub movie_id: Option<String>,
    pub rating: Option<String>,
    pub timestamp: Option<String>,
}

impl SourceRecord for RatingRecord {
    const FILE_NAME: &'static str = "ratings.csv";
    const COLUMNS: &'static [&'static str] = &["userId", "movieId", "rating", "timestamp"];

    fn from_cells(cells: Vec<Option<String>>) -> Self {
        let mut cells = cells.into_iter();
        let mut next = || cells.next().flatten();
        Self {
            user_id: next(),
            movie_id: next(),
            rating: next(),
            timestamp: next(),
        }
    }
}

/// Row of `movies_metadata.csv`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieRecord {
    pub id: Option<String>,
    pub imdb_id: Option<String>,
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub budget: Option<String>,
    pub revenue: Option<String>,
    pub runtime: Option<String>,
    pub adult: Option<String>,
    pub popularity: Option<String>,
    pub vote_average: Option<String>,
    pub vote_count: Option<String>,
    pub status: Option<String>,
    pub tagline: Option<String>,
    pub original_language: Option<String>,
    pub belongs_to_collection: Option<String>,
    pub homepage: Option<String>,
    pub poster_path: Option<String>,
    pub production_companies: Option<String>,
    pub production_countries: Option<String>,
    pub spoken_languages: Option<String>,
    pub video: Option<String>,
    /// Serialized list of `{'id': .., 'name': ..}` objects.
    pub genres: Option<String>,
}

impl SourceRecord for MovieRecord {
    const FILE_NAME: &'static str = "movies_metadata.csv";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "imdb_id",
        "title",
        "original_title",
        "overview",
        "release_date",
        "budget",
        "revenue",
        "runtime",
        "adult",
        "popularity",
        "vote_average",
        "vote_count",
        "status",
        "tagline",
        "original_language",
        "belongs_to_collection",
        "homepage",
        "poster_path",
        "production_companies",
        "production_countries",
        "spoken_languages",
        "video",
        "genres",
    ];

    fn from_cells(cells: Vec<Option<String>>) -> Self {
        let mut cells = cells.into_iter();
        let mut next = || cells.next().flatten();
        Self {
            id: next(),
            imdb_id: next(),
            title: next(),
            original_title: next(),
            overview: next(),
            release_date: next(),
            budget: next(),
            revenue: next(),
            runtime: next(),
            adult: next(),
            popularity: next(),
            vote_average: next(),
            vote_count: next(),
            status: next(),
            tagline: next(),
            original_language: next(),
            belongs_to_collection: next(),
            homepage: next(),
            poster_path: next(),
            production_companies: next(),
            production_countries: next(),
            spoken_languages: next(),
            video: next(),
            genres: next(),
        }
    }
}

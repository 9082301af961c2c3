use serde::{Deserialize, Serialize};

/// Column names of the three source tables.
pub mod columns {
    pub const TCONST: &str = "tconst";
    pub const PRIMARY_TITLE: &str = "primary_title";
    pub const ORIGINAL_TITLE: &str = "original_title";
    pub const START_YEAR: &str = "start_year";
    pub const RUNTIME_MINUTES: &str = "runtime_minutes";
    pub const GENRES: &str = "genres";

    pub const TITLE: &str = "title";
    pub const STUDIO: &str = "studio";
    pub const DOMESTIC_GROSS: &str = "domestic_gross";
    pub const FOREIGN_GROSS: &str = "foreign_gross";
    pub const YEAR: &str = "year";

    pub const AVERAGE_RATING: &str = "averagerating";
    pub const NUM_VOTES: &str = "numvotes";

    pub const N_MOVIES: &str = "n_movies";
    pub const N_STUDIO: &str = "n_studio";
    pub const TOTAL_DOMESTIC_GROSS: &str = "total_domestic_gross";
    pub const TOTAL_FOREIGN_GROSS: &str = "total_foreign_gross";
}

/// The three source tables of the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    TitleBasics,
    MovieGross,
    TitleRatings,
}

impl TableKind {
    pub const ALL: [TableKind; 3] = [
        TableKind::TitleBasics,
        TableKind::MovieGross,
        TableKind::TitleRatings,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::TitleBasics => "title basics",
            Self::MovieGross => "movie gross",
            Self::TitleRatings => "title ratings",
        }
    }

    /// Columns every downstream query relies on.
    pub fn required_columns(&self) -> &'static [&'static str] {
        use columns::*;
        match self {
            Self::TitleBasics => &[TCONST, PRIMARY_TITLE, START_YEAR, RUNTIME_MINUTES, GENRES],
            Self::MovieGross => &[TITLE, STUDIO, DOMESTIC_GROSS, FOREIGN_GROSS, YEAR],
            Self::TitleRatings => &[TCONST, AVERAGE_RATING, NUM_VOTES],
        }
    }
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub dtype: String,
    pub null_count: usize,
    pub null_percentage: f64,
    pub unique_count: usize,
    /// Mean of the non-null values, numeric columns only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableProfile {
    pub table: TableKind,
    pub shape: (usize, usize),
    pub column_profiles: Vec<ColumnProfile>,
    pub duplicate_count: usize,
}

impl TableProfile {
    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.column_profiles.iter().find(|c| c.name == name)
    }

    pub fn total_nulls(&self) -> usize {
        self.column_profiles.iter().map(|c| c.null_count).sum()
    }
}

/// What cleaning did to one table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleaningReport {
    pub rows_before: usize,
    pub rows_after: usize,
    pub rows_dropped: usize,
    /// Fill value per imputed column, in plan order.
    pub fill_values: Vec<FillValue>,
    /// Human-readable log of every action taken.
    pub actions: Vec<String>,
}

/// A cleaning report tagged with the table it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableCleaning {
    pub table: TableKind,
    #[serde(flatten)]
    pub report: CleaningReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillValue {
    pub column: String,
    pub method: String,
    pub value: FillScalar,
    pub filled: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FillScalar {
    Number(f64),
    Text(String),
}

/// One equal-width bucket of a histogram. `upper` is exclusive except for
/// the last bin, which also holds the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Row counts around the three-way join.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinSummary {
    pub basics_rows: usize,
    pub gross_rows: usize,
    pub ratings_rows: usize,
    pub title_matched_rows: usize,
    pub unmatched_gross_rows: usize,
    pub catalog_rows: usize,
}

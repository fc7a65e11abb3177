use ::scraper::error::SelectorErrorKind;

/// All errors that can occur while scraping, reconciling or persisting league data.
#[derive(thiserror::Error, Debug)]
pub enum LeagueError {
    /// HTTP request failed (network, DNS, TLS, etc.).
    #[error("http request failed for {url}: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build http client: {0}")]
    ClientBuild(reqwest::Error),

    /// Server returned a non-success HTTP status code.
    #[error("unexpected status {status} for {url}")]
    UnexpectedStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    /// Failed to read the response body as text.
    #[error("failed to read response body from {url}: {source}")]
    ResponseBody {
        url: String,
        source: reqwest::Error,
    },

    /// A CSS selector string could not be parsed.
    #[error("invalid CSS selector: {0}")]
    Selector(String),

    /// An expected HTML element was not found on the page.
    #[error("expected element not found: {context}")]
    ElementNotFound { context: &'static str },

    /// Login completed but the session cookie was never issued.
    #[error("session cookie {cookie} not found after login")]
    MissingSession { cookie: &'static str },

    /// No Fantasy Surfer credentials were configured.
    #[error("fantasy surfer credentials are not configured")]
    MissingCredentials,

    /// The datastore rejected a query or write.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// An environment variable held an unusable value.
    #[error("invalid configuration for {key}: {message}")]
    Config { key: &'static str, message: String },
}

impl LeagueError {
    /// Whether this error means no authenticated fetch can succeed.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            LeagueError::MissingSession { .. } | LeagueError::MissingCredentials
        )
    }
}

impl<'a> From<SelectorErrorKind<'a>> for LeagueError {
    fn from(err: SelectorErrorKind<'a>) -> Self {
        LeagueError::Selector(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LeagueError>;

/// A reconstructed roster that does not have the shape its site requires.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    #[error("invalid roster structure: A({a}/2), B({b}/4), C({c}/2)")]
    TierCounts { a: usize, b: usize, c: usize },

    #[error("no power surfer found in roster")]
    MissingPowerSurfer,

    #[error("expected one power surfer, found {found}")]
    MultiplePowerSurfers { found: usize },

    #[error("no valid surfers found in roster")]
    NoResolvedSurfers,
}

//! Categorized YouTube errors.
//!
//! Any failure coming back from an upload or metadata call can be turned into a
//! [`YouTubeError`] with [`classify`]. Classification first looks for a
//! structured HTTP status in the cause chain ([`ApiError`]) and only falls back
//! to keyword matching on the error text when no status is available.

use std::error::Error as StdError;
use std::fmt;

/// Boxed cause kept inside a [`YouTubeError`].
pub type Cause = Box<dyn StdError + Send + Sync + 'static>;

/// Category of a YouTube-related failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Authentication or permission issue
    Auth,
    /// Rate limit or quota exceeded
    RateLimit,
    /// Network connectivity problem
    Network,
    /// Malformed or invalid request
    InvalidRequest,
    /// YouTube server-side issue (5xx)
    ServerError,
    /// Language/locale setting failure
    Language,
    /// Video upload failure
    Upload,
    /// Anything that doesn't fit the other categories
    Unknown,
    /// Failure originating inside this application
    Internal,
}

impl ErrorKind {
    /// Stable snake_case name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Auth => "auth",
            ErrorKind::RateLimit => "rate_limit",
            ErrorKind::Network => "network",
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::ServerError => "server_error",
            ErrorKind::Language => "language_error",
            ErrorKind::Upload => "upload_error",
            ErrorKind::Unknown => "unknown",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified failure from a YouTube operation.
#[derive(Debug)]
pub struct YouTubeError {
    kind: ErrorKind,
    message: String,
    retryable: bool,
    cause: Option<Cause>,
    video_id: Option<String>,
    language: Option<String>,
}

impl YouTubeError {
    fn new(kind: ErrorKind, message: impl Into<String>, retryable: bool, cause: Option<Cause>) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
            cause,
            video_id: None,
            language: None,
        }
    }

    /// Failure to set a locale on the outbound record. Never retryable.
    pub fn language(language: &str, cause: Option<Cause>) -> Self {
        Self {
            language: Some(language.to_string()),
            ..Self::new(
                ErrorKind::Language,
                format!("Failed to set language to '{}'", language),
                false,
                cause,
            )
        }
    }

    /// Failure to upload a video. Always retryable.
    pub fn upload(video_id: &str, cause: Option<Cause>) -> Self {
        Self {
            video_id: Some(video_id.to_string()),
            ..Self::new(ErrorKind::Upload, "Video upload failed", true, cause)
        }
    }

    /// Category of the failure.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Human-readable description, without the cause.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether retrying the operation may succeed.
    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    /// The wrapped original error, if any.
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Video the failure relates to, when known.
    pub fn video_id(&self) -> Option<&str> {
        self.video_id.as_deref()
    }

    /// Locale code the failure relates to, when known.
    pub fn language_code(&self) -> Option<&str> {
        self.language.as_deref()
    }
}

impl fmt::Display for YouTubeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            Some(cause) => write!(
                f,
                "YouTube error [{}]: {} (original: {})",
                self.kind, self.message, cause
            ),
            None => write!(f, "YouTube error [{}]: {}", self.kind, self.message),
        }
    }
}

impl StdError for YouTubeError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn StdError + 'static))
    }
}

/// Error carrying an HTTP status from the YouTube API client.
///
/// Upstream callers wrap API responses in this type so [`classify`] can use the
/// status code instead of guessing from the message text.
#[derive(Debug, Clone, thiserror::Error)]
#[error("YouTube API returned {status}: {body}")]
pub struct ApiError {
    pub status: u16,
    pub body: String,
}

impl ApiError {
    /// Error for an API response with the given status and body.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Outcome attached to a matching classification rule.
#[derive(Debug, Clone, Copy)]
struct Classification {
    kind: ErrorKind,
    message: &'static str,
    retryable: bool,
}

const AUTH: Classification = Classification {
    kind: ErrorKind::Auth,
    message: "Authentication failed or insufficient permissions",
    retryable: false,
};

const RATE_LIMIT: Classification = Classification {
    kind: ErrorKind::RateLimit,
    message: "Rate limit exceeded or quota exceeded",
    retryable: true,
};

const NETWORK: Classification = Classification {
    kind: ErrorKind::Network,
    message: "Network connectivity issue",
    retryable: true,
};

const INVALID_REQUEST: Classification = Classification {
    kind: ErrorKind::InvalidRequest,
    message: "Invalid request or malformed data",
    retryable: false,
};

const SERVER_ERROR: Classification = Classification {
    kind: ErrorKind::ServerError,
    message: "YouTube server error",
    retryable: true,
};

const LANGUAGE: Classification = Classification {
    kind: ErrorKind::Language,
    message: "Language setting error",
    retryable: false,
};

const UPLOAD: Classification = Classification {
    kind: ErrorKind::Upload,
    message: "Video upload error",
    retryable: true,
};

const UNKNOWN: Classification = Classification {
    kind: ErrorKind::Unknown,
    message: "Unknown error occurred",
    retryable: false,
};

/// Status-code rule: the outcome applies when `matches` accepts the status.
struct StatusRule {
    matches: fn(u16) -> bool,
    outcome: Classification,
}

/// Keyword rule: the outcome applies when the text contains any keyword.
struct KeywordRule {
    keywords: &'static [&'static str],
    outcome: Classification,
}

/// Evaluated in order. 403 is absent: YouTube uses it for both permission and
/// quota failures, so the text decides.
const STATUS_RULES: &[StatusRule] = &[
    StatusRule {
        matches: |status| status == 401,
        outcome: AUTH,
    },
    StatusRule {
        matches: |status| status == 429,
        outcome: RATE_LIMIT,
    },
    StatusRule {
        matches: |status| (500..600).contains(&status),
        outcome: SERVER_ERROR,
    },
    StatusRule {
        matches: |status| (400..500).contains(&status) && status != 403,
        outcome: INVALID_REQUEST,
    },
];

/// Evaluated in order over the lowercased error text; first match wins.
const KEYWORD_RULES: &[KeywordRule] = &[
    KeywordRule {
        keywords: &["authentication", "unauthorized"],
        outcome: AUTH,
    },
    KeywordRule {
        keywords: &["rate limit", "quota"],
        outcome: RATE_LIMIT,
    },
    KeywordRule {
        keywords: &["network", "timeout", "connection"],
        outcome: NETWORK,
    },
    KeywordRule {
        keywords: &["invalid", "bad request"],
        outcome: INVALID_REQUEST,
    },
    KeywordRule {
        keywords: &["server error", "internal server"],
        outcome: SERVER_ERROR,
    },
    KeywordRule {
        keywords: &["language", "locale"],
        outcome: LANGUAGE,
    },
    KeywordRule {
        keywords: &["upload", "video"],
        outcome: UPLOAD,
    },
];

/// Inspect an error and produce a categorized [`YouTubeError`].
///
/// Returns `None` when there is no error to classify.
pub fn classify<E>(err: Option<E>) -> Option<YouTubeError>
where
    E: Into<Cause>,
{
    let cause: Cause = err?.into();

    let classification = classify_by_status(&*cause)
        .unwrap_or_else(|| classify_by_message(&chain_text(&*cause)));

    Some(YouTubeError::new(
        classification.kind,
        classification.message,
        classification.retryable,
        Some(cause),
    ))
}

fn classify_by_status(err: &(dyn StdError + 'static)) -> Option<Classification> {
    let status = causes(err).find_map(|e| e.downcast_ref::<ApiError>().map(|api| api.status))?;

    STATUS_RULES
        .iter()
        .find(|rule| (rule.matches)(status))
        .map(|rule| rule.outcome)
}

fn classify_by_message(text: &str) -> Classification {
    let text = text.to_lowercase();

    KEYWORD_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|keyword| text.contains(keyword)))
        .map(|rule| rule.outcome)
        .unwrap_or(UNKNOWN)
}

fn causes<'a>(err: &'a (dyn StdError + 'static)) -> impl Iterator<Item = &'a (dyn StdError + 'static)> {
    std::iter::successors(Some(err), |&e| e.source())
}

/// The whole cause chain joined with ": ", so wrapped context is matched too.
fn chain_text(err: &(dyn StdError + 'static)) -> String {
    causes(err)
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(": ")
}

//! Video metadata documents.
//!
//! A [`Video`] is stored as one YAML document per video with lower camel case
//! keys. Every field defaults when missing so documents written before a field
//! existed still load.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Format of [`Video::date`].
pub const PUBLISH_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Sponsorship details for a video.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Sponsorship {
    pub amount: String,
    /// Comma-separated contact emails
    pub emails: String,
    /// Why the sponsorship is blocked, empty when it isn't
    pub blocked: String,
}

impl Sponsorship {
    /// Contact emails split on commas, trimmed, empties dropped.
    pub fn email_list(&self) -> Vec<&str> {
        self.emails
            .split(',')
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .collect()
    }

    pub fn is_blocked(&self) -> bool {
        !self.blocked.trim().is_empty()
    }
}

/// A video moving through production and publishing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Video {
    // Identity
    pub name: String,
    pub category: String,
    pub path: String,
    pub index: i32,

    // Initial details
    pub project_name: String,
    #[serde(rename = "projectURL")]
    pub project_url: String,
    pub sponsorship: Sponsorship,
    /// Publish date, `YYYY-MM-DDTHH:MM`
    pub date: String,
    pub delayed: bool,
    pub gist: String,

    // Work progress
    pub code: bool,
    pub head: bool,
    pub screen: bool,
    pub related_videos: String,
    pub thumbnails: bool,
    pub diagrams: bool,
    pub screenshots: bool,
    pub location: String,
    pub tagline: String,
    pub tagline_ideas: String,
    pub other_logos: String,

    // Definition
    pub title: String,
    pub description: String,
    pub tags: String,
    pub description_tags: String,
    pub tweet: String,
    pub animations: String,

    // Post-production
    pub thumbnail: String,
    pub members: String,
    pub request_edit: bool,
    pub timecodes: String,
    pub movie: bool,
    pub slides: bool,

    // Publishing
    /// Path of the video file to upload
    pub upload_video: String,
    /// YouTube video ID once uploaded
    pub video_id: String,
    pub hugo_path: String,

    // Post-publish
    pub dot_posted: bool,
    pub blue_sky_posted: bool,
    pub linked_in_posted: bool,
    pub slack_posted: bool,
    pub you_tube_highlight: bool,
    pub you_tube_comment: bool,
    pub you_tube_comment_reply: bool,
    pub gde: bool,
    pub repo: String,
    pub notified_sponsors: bool,

    // Locale
    /// Requested display/subtitle language, empty for "use the default"
    pub language: String,
    /// Requested spoken-audio language, empty for "use the default"
    pub audio_language: String,
    /// Language actually sent to YouTube after fallback
    pub applied_language: String,
    /// Audio language actually sent to YouTube after fallback
    pub applied_audio_language: String,
}

impl Video {
    /// The requested language, or `default` when none is set.
    pub fn language_or<'a>(&'a self, default: &'a str) -> &'a str {
        non_empty_or(&self.language, default)
    }

    /// The requested audio language, or `default` when none is set.
    pub fn audio_language_or<'a>(&'a self, default: &'a str) -> &'a str {
        non_empty_or(&self.audio_language, default)
    }

    /// Whether the applied language differs from the one requested.
    ///
    /// False until locales have been applied at least once.
    pub fn language_fell_back(&self) -> bool {
        !self.applied_language.is_empty() && self.applied_language != self.language
    }

    /// Whether the applied audio language differs from the one requested.
    pub fn audio_language_fell_back(&self) -> bool {
        !self.applied_audio_language.is_empty()
            && self.applied_audio_language != self.audio_language
    }

    /// Parsed publish date, `None` when unset or malformed.
    pub fn publish_date(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(self.date.trim(), PUBLISH_DATE_FORMAT).ok()
    }

    /// Comma-separated tags as a list.
    pub fn tag_list(&self) -> Vec<String> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect()
    }
}

fn non_empty_or<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() {
        default
    } else {
        value
    }
}

/// Index entry: the part of a [`Video`] needed to list and locate it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VideoIndex {
    pub name: String,
    pub category: String,
}

impl From<&Video> for VideoIndex {
    fn from(video: &Video) -> Self {
        Self {
            name: video.name.clone(),
            category: video.category.clone(),
        }
    }
}

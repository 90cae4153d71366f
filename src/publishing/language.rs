//! Locale validation and fallback for outbound YouTube metadata.
//!
//! [`LanguageHandler::validate_and_set_language`] decides which display and
//! audio locale a video is published with, writes them onto the outbound
//! record, and remembers them on the video. Locale problems never abort
//! publishing: they fall back to the default, get logged, and show up in
//! [`YouTubeMetrics`].

use crate::i18n::LanguageRegistry;
use crate::publishing::errors::YouTubeError;
use crate::publishing::logging::{log_language_setting, log_youtube_error};
use crate::publishing::metrics::YouTubeMetrics;
use crate::storage::Video;
use tracing::warn;

/// Something locale values can be written onto.
pub trait LocaleTarget {
    /// Set the display and audio locale.
    fn set_locales(&mut self, language: &str, audio_language: &str) -> Result<(), YouTubeError>;
}

/// Snippet part of a YouTube video resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoSnippet {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub default_language: String,
    pub default_audio_language: String,
}

impl LocaleTarget for VideoSnippet {
    fn set_locales(&mut self, language: &str, audio_language: &str) -> Result<(), YouTubeError> {
        self.default_language = language.to_string();
        self.default_audio_language = audio_language.to_string();
        Ok(())
    }
}

/// Outbound video resource sent to YouTube on upload or update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadRequest {
    pub snippet: Option<VideoSnippet>,
}

impl UploadRequest {
    /// Request carrying the video's title, description and tags.
    pub fn from_video(video: &Video) -> Self {
        Self {
            snippet: Some(VideoSnippet {
                title: video.title.clone(),
                description: video.description.clone(),
                tags: video.tag_list(),
                ..Default::default()
            }),
        }
    }
}

impl LocaleTarget for UploadRequest {
    /// Creates the snippet if it is missing.
    fn set_locales(&mut self, language: &str, audio_language: &str) -> Result<(), YouTubeError> {
        self.snippet
            .get_or_insert_with(VideoSnippet::default)
            .set_locales(language, audio_language)
    }
}

/// How the resolved locales ended up on the outbound record.
#[derive(Debug)]
pub enum ApplyStatus {
    /// The resolved locales were applied.
    Applied,
    /// Applying the resolved locales failed; the default was applied instead.
    AppliedDefault,
    /// Neither the resolved locales nor the default could be applied.
    Failed(YouTubeError),
}

/// Result of [`LanguageHandler::validate_and_set_language`].
///
/// There is no error variant: a locale problem never fails the caller.
#[derive(Debug)]
pub struct AppliedLanguages {
    /// Display locale after fallback
    pub language: String,
    /// Audio locale after fallback
    pub audio_language: String,
    pub status: ApplyStatus,
}

/// Resolves, validates and applies video locales.
#[derive(Debug, Clone, Copy)]
pub struct LanguageHandler<'a> {
    metrics: &'a YouTubeMetrics,
    registry: &'a LanguageRegistry,
}

impl LanguageHandler<'static> {
    /// Handler using the process-wide metrics and registry.
    pub fn global() -> Self {
        Self::new(YouTubeMetrics::global(), LanguageRegistry::get())
    }
}

impl<'a> LanguageHandler<'a> {
    /// Handler recording into `metrics` and validating against `registry`.
    pub fn new(metrics: &'a YouTubeMetrics, registry: &'a LanguageRegistry) -> Self {
        Self { metrics, registry }
    }

    /// Validate the video's locales and apply them to `target`.
    ///
    /// Empty or unsupported locales fall back to `default_language`. If the
    /// target rejects the values, the default is tried for both fields. The
    /// resolved values are always written to the video's applied-locale fields,
    /// whatever happened on the target.
    ///
    /// A missing video uses the default for both locales. A missing target counts
    /// as a failed apply.
    pub fn validate_and_set_language<T>(
        &self,
        target: Option<&mut T>,
        video: Option<&mut Video>,
        default_language: &str,
    ) -> AppliedLanguages
    where
        T: LocaleTarget + ?Sized,
    {
        let (language, audio_language) =
            self.resolve_with_fallback(video.as_deref(), default_language);

        let status = self.apply(target, &language, &audio_language, default_language);

        if let Some(video) = video {
            video.applied_language = language.clone();
            video.applied_audio_language = audio_language.clone();
        }

        AppliedLanguages {
            language,
            audio_language,
            status,
        }
    }

    /// Resolve the display and audio locale without touching any outbound record.
    ///
    /// Counts one validation, and one fallback per field that was unsupported.
    /// An empty field takes the default, which is then checked like any other
    /// value, so a supported default never counts as a fallback.
    pub fn resolve_with_fallback(
        &self,
        video: Option<&Video>,
        default_language: &str,
    ) -> (String, String) {
        let (language, audio_language) = match video {
            Some(video) => (
                video.language_or(default_language),
                video.audio_language_or(default_language),
            ),
            None => (default_language, default_language),
        };

        self.metrics.record_language_validation();

        let language = self.validated_or_default(language, default_language, "language");
        let audio_language =
            self.validated_or_default(audio_language, default_language, "audio language");

        (language, audio_language)
    }

    /// Check a single locale code against the registry.
    pub fn validate_language_code(&self, code: &str) -> Result<(), YouTubeError> {
        if self.registry.is_valid(code) {
            Ok(())
        } else {
            Err(YouTubeError::language(code, None))
        }
    }

    fn validated_or_default(&self, code: &str, default_language: &str, field: &str) -> String {
        if self.registry.is_valid(code) {
            return code.to_string();
        }

        warn!(
            component = "youtube",
            field,
            "Invalid {} code '{}', falling back to default '{}'",
            field,
            code,
            default_language
        );
        self.metrics.record_language_fallback();
        default_language.to_string()
    }

    fn apply<T>(
        &self,
        mut target: Option<&mut T>,
        language: &str,
        audio_language: &str,
        default_language: &str,
    ) -> ApplyStatus
    where
        T: LocaleTarget + ?Sized,
    {
        let err = match set_locales(target.as_deref_mut(), language, audio_language) {
            Ok(()) => {
                log_language_setting(language, true, false, None);
                self.metrics.record_language_set_success();
                return ApplyStatus::Applied;
            }
            Err(err) => err,
        };

        log_language_setting(language, false, true, Some(&err));
        self.metrics.record_language_set_failure();

        match set_locales(target, default_language, default_language) {
            Ok(()) => {
                log_language_setting(default_language, true, true, None);
                self.metrics.record_language_set_success();
                ApplyStatus::AppliedDefault
            }
            Err(fallback_err) => {
                let err = YouTubeError::language(default_language, Some(Box::new(fallback_err)));
                log_youtube_error(&err, "Failed to set fallback language");
                self.metrics.record_language_set_failure();
                ApplyStatus::Failed(err)
            }
        }
    }
}

fn set_locales<T>(target: Option<&mut T>, language: &str, audio_language: &str) -> Result<(), YouTubeError>
where
    T: LocaleTarget + ?Sized,
{
    match target {
        Some(target) => target.set_locales(language, audio_language),
        None => Err(YouTubeError::language(language, Some("no outbound video to update".into()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::LanguageConfig;
    use crate::publishing::errors::ErrorKind;
    use proptest::prelude::*;

    // ==================== Helpers ====================

    fn video(language: &str, audio_language: &str) -> Video {
        Video {
            name: "Test Video".to_string(),
            language: language.to_string(),
            audio_language: audio_language.to_string(),
            ..Default::default()
        }
    }

    fn applied(request: &UploadRequest) -> (&str, &str) {
        let snippet = request.snippet.as_ref().expect("snippet should exist");
        (&snippet.default_language, &snippet.default_audio_language)
    }

    /// Target that rejects every locale except the ones it is told to accept.
    struct PickyTarget {
        accepts: Vec<&'static str>,
        calls: Vec<(String, String)>,
    }

    impl PickyTarget {
        fn accepting(accepts: &[&'static str]) -> Self {
            Self {
                accepts: accepts.to_vec(),
                calls: Vec::new(),
            }
        }
    }

    impl LocaleTarget for PickyTarget {
        fn set_locales(&mut self, language: &str, audio_language: &str) -> Result<(), YouTubeError> {
            self.calls
                .push((language.to_string(), audio_language.to_string()));
            let accepted = |code: &str| self.accepts.iter().any(|accepted| *accepted == code);
            if accepted(language) && accepted(audio_language) {
                Ok(())
            } else {
                Err(YouTubeError::language(language, Some("rejected by API".into())))
            }
        }
    }

    // ==================== validate_and_set_language Tests ====================

    #[test]
    fn test_validate_and_set_language_cases() {
        let cases = [
            ("Valid language codes", "en", "en", "en", "en", "en"),
            ("Empty language codes with fallback", "", "", "fr", "fr", "fr"),
            ("Invalid language codes with fallback", "invalid", "invalid", "es", "es", "es"),
            ("Mixed valid and invalid", "en", "invalid", "fr", "en", "fr"),
        ];

        for (name, language, audio_language, default, expected, expected_audio) in cases {
            let metrics = YouTubeMetrics::new();
            let handler = LanguageHandler::new(&metrics, LanguageRegistry::get());
            let mut request = UploadRequest {
                snippet: Some(VideoSnippet::default()),
            };
            let mut video = video(language, audio_language);

            let result = handler.validate_and_set_language(Some(&mut request), Some(&mut video), default);

            assert!(matches!(result.status, ApplyStatus::Applied), "{}", name);
            assert_eq!(applied(&request), (expected, expected_audio), "{}", name);
            assert_eq!(video.applied_language, expected, "{}", name);
            assert_eq!(video.applied_audio_language, expected_audio, "{}", name);
            assert_eq!(result.language, expected, "{}", name);
            assert_eq!(result.audio_language, expected_audio, "{}", name);
        }
    }

    #[test]
    fn test_invalid_language_with_empty_audio() {
        let metrics = YouTubeMetrics::new();
        let handler = LanguageHandler::new(&metrics, LanguageRegistry::get());
        let mut request = UploadRequest::default();
        let mut video = video("invalid", "");

        handler.validate_and_set_language(Some(&mut request), Some(&mut video), "en");

        assert_eq!(video.applied_language, "en");
        assert_eq!(video.applied_audio_language, "en");
        // Only the invalid code counts; the empty audio field is a plain substitution
        assert_eq!(metrics.language_fallback(), 1);
        assert_eq!(metrics.language_validation(), 1);
        assert_eq!(metrics.language_set_success(), 1);
        assert_eq!(metrics.language_set_failure(), 0);
    }

    #[test]
    fn test_metrics_for_valid_languages() {
        let metrics = YouTubeMetrics::new();
        let handler = LanguageHandler::new(&metrics, LanguageRegistry::get());
        let mut request = UploadRequest::default();

        handler.validate_and_set_language(Some(&mut request), Some(&mut video("en", "en")), "en");

        assert_eq!(metrics.language_validation(), 1);
        assert_eq!(metrics.language_set_success(), 1);
        assert_eq!(metrics.language_set_failure(), 0);
        assert_eq!(metrics.language_fallback(), 0);
    }

    #[test]
    fn test_metrics_for_invalid_languages() {
        let metrics = YouTubeMetrics::new();
        let handler = LanguageHandler::new(&metrics, LanguageRegistry::get());
        let mut request = UploadRequest::default();

        handler.validate_and_set_language(
            Some(&mut request),
            Some(&mut video("invalid", "invalid")),
            "en",
        );

        assert_eq!(metrics.language_validation(), 1);
        assert_eq!(metrics.language_set_success(), 1);
        assert_eq!(metrics.language_set_failure(), 0);
        // Both language and audio language fell back
        assert_eq!(metrics.language_fallback(), 2);
    }

    #[test]
    fn test_missing_snippet_is_created() {
        let metrics = YouTubeMetrics::new();
        let handler = LanguageHandler::new(&metrics, LanguageRegistry::get());
        let mut request = UploadRequest::default();

        let result =
            handler.validate_and_set_language(Some(&mut request), Some(&mut video("en", "en")), "en");

        assert!(matches!(result.status, ApplyStatus::Applied));
        assert_eq!(applied(&request), ("en", "en"));
    }

    #[test]
    fn test_snippet_fields_are_kept() {
        let metrics = YouTubeMetrics::new();
        let handler = LanguageHandler::new(&metrics, LanguageRegistry::get());
        let mut video = Video {
            title: "Title".to_string(),
            tags: "a, b".to_string(),
            language: "de".to_string(),
            ..Default::default()
        };
        let mut request = UploadRequest::from_video(&video);

        handler.validate_and_set_language(Some(&mut request), Some(&mut video), "en");

        let snippet = request.snippet.expect("snippet should exist");
        assert_eq!(snippet.title, "Title");
        assert_eq!(snippet.tags, vec!["a", "b"]);
        assert_eq!(snippet.default_language, "de");
        assert_eq!(snippet.default_audio_language, "en");
    }

    #[test]
    fn test_missing_video_uses_default() {
        let metrics = YouTubeMetrics::new();
        let handler = LanguageHandler::new(&metrics, LanguageRegistry::get());
        let mut request = UploadRequest::default();

        let result = handler.validate_and_set_language(Some(&mut request), None, "en");

        assert!(matches!(result.status, ApplyStatus::Applied));
        assert_eq!(result.language, "en");
        assert_eq!(result.audio_language, "en");
        assert_eq!(applied(&request), ("en", "en"));
        assert_eq!(metrics.language_fallback(), 0);
    }

    #[test]
    fn test_empty_video() {
        let metrics = YouTubeMetrics::new();
        let handler = LanguageHandler::new(&metrics, LanguageRegistry::get());
        let mut request = UploadRequest::default();
        let mut video = Video::default();

        let result = handler.validate_and_set_language(Some(&mut request), Some(&mut video), "en");

        assert!(matches!(result.status, ApplyStatus::Applied));
        assert_eq!(video.applied_language, "en");
        assert_eq!(video.applied_audio_language, "en");
    }

    #[test]
    fn test_missing_target_never_fails() {
        let metrics = YouTubeMetrics::new();
        let handler = LanguageHandler::new(&metrics, LanguageRegistry::get());
        let mut video = video("es", "invalid");

        let result =
            handler.validate_and_set_language(None::<&mut UploadRequest>, Some(&mut video), "en");

        match result.status {
            ApplyStatus::Failed(err) => {
                assert_eq!(err.kind(), ErrorKind::Language);
                assert_eq!(err.language_code(), Some("en"));
                assert!(!err.is_retryable());
            }
            other => panic!("expected Failed, got {:?}", other),
        }
        // Both the first attempt and the default attempt failed
        assert_eq!(metrics.language_set_failure(), 2);
        assert_eq!(metrics.language_set_success(), 0);
        // Applied fields are still written
        assert_eq!(video.applied_language, "es");
        assert_eq!(video.applied_audio_language, "en");
    }

    #[test]
    fn test_missing_target_and_video() {
        let metrics = YouTubeMetrics::new();
        let handler = LanguageHandler::new(&metrics, LanguageRegistry::get());

        let result = handler.validate_and_set_language(None::<&mut UploadRequest>, None, "en");

        assert!(matches!(result.status, ApplyStatus::Failed(_)));
        assert_eq!(result.language, "en");
        assert_eq!(metrics.language_validation(), 1);
    }

    #[test]
    fn test_rejected_locale_falls_back_to_default() {
        let metrics = YouTubeMetrics::new();
        let handler = LanguageHandler::new(&metrics, LanguageRegistry::get());
        let mut target = PickyTarget::accepting(&["en"]);
        let mut video = video("es", "fr");

        let result = handler.validate_and_set_language(Some(&mut target), Some(&mut video), "en");

        assert!(matches!(result.status, ApplyStatus::AppliedDefault));
        assert_eq!(
            target.calls,
            vec![
                ("es".to_string(), "fr".to_string()),
                ("en".to_string(), "en".to_string()),
            ]
        );
        assert_eq!(metrics.language_set_failure(), 1);
        assert_eq!(metrics.language_set_success(), 1);
        // Registry-valid values are what gets recorded, not the default that was applied
        assert_eq!(video.applied_language, "es");
        assert_eq!(video.applied_audio_language, "fr");
    }

    #[test]
    fn test_rejected_default_is_reported() {
        let metrics = YouTubeMetrics::new();
        let handler = LanguageHandler::new(&metrics, LanguageRegistry::get());
        let mut target = PickyTarget::accepting(&[]);

        let result = handler.validate_and_set_language(Some(&mut target), Some(&mut video("es", "es")), "en");

        match result.status {
            ApplyStatus::Failed(err) => {
                assert_eq!(err.kind(), ErrorKind::Language);
                assert!(err.to_string().contains("rejected by API"));
            }
            other => panic!("expected Failed, got {:?}", other),
        }
        assert_eq!(target.calls.len(), 2);
        assert_eq!(metrics.language_set_failure(), 2);
        assert_eq!(metrics.language_set_success(), 0);
    }

    #[test]
    fn test_dyn_target() {
        let metrics = YouTubeMetrics::new();
        let handler = LanguageHandler::new(&metrics, LanguageRegistry::get());
        let mut snippet = VideoSnippet::default();
        let target: &mut dyn LocaleTarget = &mut snippet;

        let result = handler.validate_and_set_language(Some(target), None, "de");

        assert!(matches!(result.status, ApplyStatus::Applied));
        assert_eq!(snippet.default_language, "de");
    }

    #[test]
    fn test_empty_default_with_invalid_locale() {
        let metrics = YouTubeMetrics::new();
        let handler = LanguageHandler::new(&metrics, LanguageRegistry::get());
        let mut request = UploadRequest::default();
        let mut video = video("invalid", "");

        handler.validate_and_set_language(Some(&mut request), Some(&mut video), "");

        // No fallback beyond the supplied default
        assert_eq!(video.applied_language, "");
        assert_eq!(video.applied_audio_language, "");
        // "invalid" fell back, and the empty audio substitution ("") is not in the registry either
        assert_eq!(metrics.language_fallback(), 2);
    }

    // ==================== resolve_with_fallback Tests ====================

    #[test]
    fn test_resolve_with_fallback_cases() {
        let cases = [
            ("en", "en", "fr", "en", "en"),
            ("", "", "es", "es", "es"),
            ("invalid", "invalid", "de", "de", "de"),
            ("en", "invalid", "fr", "en", "fr"),
        ];

        for (language, audio_language, default, expected, expected_audio) in cases {
            let metrics = YouTubeMetrics::new();
            let handler = LanguageHandler::new(&metrics, LanguageRegistry::get());

            let resolved = handler.resolve_with_fallback(Some(&video(language, audio_language)), default);

            assert_eq!(resolved, (expected.to_string(), expected_audio.to_string()));
            assert_eq!(metrics.language_set_total(), 0);
        }
    }

    #[test]
    fn test_resolve_with_fallback_does_not_touch_video() {
        let metrics = YouTubeMetrics::new();
        let handler = LanguageHandler::new(&metrics, LanguageRegistry::get());
        let video = video("invalid", "es");

        handler.resolve_with_fallback(Some(&video), "en");

        assert_eq!(video.applied_language, "");
        assert_eq!(video.applied_audio_language, "");
        assert_eq!(metrics.language_fallback(), 1);
    }

    #[test]
    fn test_custom_registry() {
        let metrics = YouTubeMetrics::new();
        let registry = LanguageRegistry::with_languages(vec![LanguageConfig {
            code: "en",
            name: "English",
            native_name: "English",
        }]);
        let handler = LanguageHandler::new(&metrics, &registry);

        let resolved = handler.resolve_with_fallback(Some(&video("es", "en")), "en");
        assert_eq!(resolved, ("en".to_string(), "en".to_string()));
    }

    // ==================== validate_language_code Tests ====================

    #[test]
    fn test_validate_language_code() {
        let metrics = YouTubeMetrics::new();
        let handler = LanguageHandler::new(&metrics, LanguageRegistry::get());

        assert!(handler.validate_language_code("en").is_ok());
        assert!(handler.validate_language_code("es").is_ok());
        assert!(handler.validate_language_code("fr").is_ok());
        assert!(handler.validate_language_code("invalid").is_err());
        assert!(handler.validate_language_code("").is_err());
        assert!(handler.validate_language_code("english").is_err());

        let err = handler
            .validate_language_code("xx")
            .expect_err("Unknown code should fail");
        assert_eq!(err.language_code(), Some("xx"));
    }

    // ==================== Property Tests ====================

    fn any_locale() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(String::new()),
            Just("en".to_string()),
            Just("es".to_string()),
            Just("ja".to_string()),
            "[a-z]{2,8}",
            ".{0,6}",
        ]
    }

    proptest! {
        #[test]
        fn prop_fallback_totality(
            language in any_locale(),
            audio_language in any_locale(),
            default in prop_oneof![Just("en"), Just("fr"), Just("ko")],
        ) {
            let metrics = YouTubeMetrics::new();
            let registry = LanguageRegistry::get();
            let handler = LanguageHandler::new(&metrics, registry);
            let mut request = UploadRequest::default();
            let mut video = video(&language, &audio_language);

            let result = handler.validate_and_set_language(Some(&mut request), Some(&mut video), default);

            let expected = |requested: &str| {
                if requested.is_empty() || !registry.is_valid(requested) {
                    default.to_string()
                } else {
                    requested.to_string()
                }
            };
            let expected_fallbacks = [&language, &audio_language]
                .iter()
                .filter(|code| !code.is_empty() && !registry.is_valid(code))
                .count() as u64;

            prop_assert!(matches!(result.status, ApplyStatus::Applied));
            prop_assert_eq!(&video.applied_language, &expected(&language));
            prop_assert_eq!(&video.applied_audio_language, &expected(&audio_language));
            prop_assert!(registry.is_valid(&video.applied_language));
            prop_assert!(registry.is_valid(&video.applied_audio_language));
            prop_assert_eq!(metrics.language_fallback(), expected_fallbacks);
            prop_assert_eq!(metrics.language_validation(), 1);
        }
    }
}

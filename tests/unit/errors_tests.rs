/*!
 * Tests for error types and their user-facing messages
 */

use subtitle_translator::errors::{AppError, ProviderError, ProviderErrorKind, SubtitleError, TranslationError};

#[test]
fn test_providerError_kind_shouldClassifyEachVariant() {
    assert_eq!(ProviderError::ConnectionError("refused".into()).kind(), ProviderErrorKind::Connectivity);
    assert_eq!(ProviderError::AuthenticationError("bad key".into()).kind(), ProviderErrorKind::Authentication);
    assert_eq!(ProviderError::Timeout("60s".into()).kind(), ProviderErrorKind::Timeout);
    assert_eq!(
        ProviderError::ApiError { status_code: 403, message: "forbidden".into() }.kind(),
        ProviderErrorKind::Authentication
    );
    assert_eq!(
        ProviderError::ApiError { status_code: 500, message: "boom".into() }.kind(),
        ProviderErrorKind::Generic
    );
    assert_eq!(ProviderError::RateLimitExceeded("slow down".into()).kind(), ProviderErrorKind::Generic);
}

#[test]
fn test_providerTestError_shouldUseClassifiedMessage() {
    let connectivity = TranslationError::ProviderTest(ProviderError::ConnectionError("refused".into()));
    assert_eq!(
        connectivity.to_string(),
        "Test failed: Could not connect to the API Base URL. Check the URL and network connection."
    );

    let auth = TranslationError::ProviderTest(ProviderError::AuthenticationError("401".into()));
    assert_eq!(
        auth.to_string(),
        "Test failed: Unauthorized. Check if the API Base URL and API Key are correct."
    );

    let timeout = TranslationError::ProviderTest(ProviderError::Timeout("after 60s".into()));
    assert_eq!(
        timeout.to_string(),
        "Test failed: API call timed out. The server might be slow or unreachable. (Request timed out: after 60s)"
    );

    let generic = TranslationError::ProviderTest(ProviderError::ParseError("no choices".into()));
    assert_eq!(generic.to_string(), "Test failed: Failed to parse API response: no choices");
}

#[test]
fn test_translationError_display_shouldMatchUserMessages() {
    let precondition = TranslationError::Precondition("No subtitles loaded.".into());
    assert_eq!(precondition.to_string(), "No subtitles loaded.");

    let critical = TranslationError::CriticalRun("worker vanished".into());
    assert_eq!(critical.to_string(), "A critical error occurred: worker vanished");

    let segment = TranslationError::Segment {
        index: 0,
        source: ProviderError::ApiError { status_code: 502, message: "bad gateway".into() },
    };
    assert_eq!(segment.to_string(), "Segment 1 failed: API responded with error: 502 - bad gateway");
}

#[test]
fn test_appError_fromSubtitleError_shouldWrap() {
    let error: AppError = SubtitleError::UnsupportedFormat("x.vtt".into()).into();
    assert_eq!(error.to_string(), "Subtitle error: Unsupported file format: x.vtt");

    let download = AppError::Download("nothing translated".into());
    assert_eq!(download.to_string(), "Error creating download: nothing translated");
}

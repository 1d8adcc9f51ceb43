//! Clip schema and validation
//!
//! `NewClip` is the untrusted request payload; [`NewClip::validate`] turns it
//! into an immutable [`Clip`] or reports every failing field at once. The
//! storage layer never sees an unvalidated record.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Raw clip payload as received from the client.
///
/// Every field is optional at the serde level so that a missing required
/// field surfaces as a validation error naming the field, not a
/// deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewClip {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub anime: Option<String>,
    #[serde(default)]
    pub episode: Option<String>,
    #[serde(default)]
    pub start_time: Option<f64>,
    #[serde(default)]
    pub end_time: Option<f64>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Validated clip record, ready for persistence.
///
/// Unset optional fields are omitted from the serialized form rather than
/// written as nulls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clip {
    pub title: String,
    pub anime: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,
    pub video_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// One or more field-level validation failures
#[derive(Debug, Error)]
#[error("{}", format_violations(.violations))]
pub struct ValidationError {
    violations: Vec<(&'static str, String)>,
}

impl ValidationError {
    /// The failing fields with their reasons, in declaration order.
    pub fn violations(&self) -> &[(&'static str, String)] {
        &self.violations
    }
}

fn format_violations(violations: &[(&'static str, String)]) -> String {
    violations
        .iter()
        .map(|(field, reason)| format!("{field}: {reason}"))
        .collect::<Vec<_>>()
        .join("; ")
}

impl NewClip {
    /// Validate the raw payload, collecting all violations instead of
    /// stopping at the first.
    pub fn validate(self) -> Result<Clip, ValidationError> {
        let mut violations = Vec::new();

        let title = require("title", self.title, &mut violations);
        let anime = require("anime", self.anime, &mut violations);
        let video_url = require("video_url", self.video_url, &mut violations);

        for (field, value) in [("start_time", self.start_time), ("end_time", self.end_time)] {
            if let Some(seconds) = value {
                // `!(x >= 0.0)` also catches NaN
                if !(seconds >= 0.0) {
                    violations.push((field, format!("must be >= 0, got {seconds}")));
                }
            }
        }

        if !video_url.is_empty()
            && let Err(reason) = check_http_url(&video_url)
        {
            violations.push(("video_url", reason));
        }
        if let Some(thumbnail_url) = &self.thumbnail_url
            && let Err(reason) = check_http_url(thumbnail_url)
        {
            violations.push(("thumbnail_url", reason));
        }

        if !violations.is_empty() {
            return Err(ValidationError { violations });
        }

        Ok(Clip {
            title,
            anime,
            episode: self.episode,
            start_time: self.start_time,
            end_time: self.end_time,
            video_url,
            thumbnail_url: self.thumbnail_url,
            notes: self.notes,
        })
    }
}

/// Unwrap a required text field, recording a violation when it is missing or
/// blank. Returns an empty placeholder on failure; the caller never builds a
/// `Clip` once a violation is recorded.
fn require(
    field: &'static str,
    value: Option<String>,
    violations: &mut Vec<(&'static str, String)>,
) -> String {
    match value {
        Some(text) if !text.trim().is_empty() => text,
        Some(_) => {
            violations.push((field, "must not be empty".to_string()));
            String::new()
        }
        None => {
            violations.push((field, "field required".to_string()));
            String::new()
        }
    }
}

fn check_http_url(raw: &str) -> Result<(), String> {
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        Ok(url) => Err(format!("unsupported URL scheme '{}'", url.scheme())),
        Err(err) => Err(format!("not a valid URL: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> NewClip {
        NewClip {
            title: Some("Op1".to_string()),
            anime: Some("Naruto".to_string()),
            video_url: Some("https://example.com/a.mp4".to_string()),
            ..NewClip::default()
        }
    }

    #[test]
    fn test_minimal_payload_is_valid() {
        let clip = minimal().validate().expect("minimal payload should pass");
        assert_eq!(clip.title, "Op1");
        assert_eq!(clip.anime, "Naruto");
        assert_eq!(clip.video_url, "https://example.com/a.mp4");
        assert!(clip.episode.is_none());
        assert!(clip.start_time.is_none());
    }

    #[test]
    fn test_optional_fields_are_preserved() {
        let clip = NewClip {
            episode: Some("12".to_string()),
            start_time: Some(30.0),
            end_time: Some(45.5),
            thumbnail_url: Some("https://example.com/t.jpg".to_string()),
            notes: Some("great scene".to_string()),
            ..minimal()
        }
        .validate()
        .expect("fully populated payload should pass");
        assert_eq!(clip.episode.as_deref(), Some("12"));
        assert_eq!(clip.start_time, Some(30.0));
        assert_eq!(clip.end_time, Some(45.5));
        assert_eq!(clip.notes.as_deref(), Some("great scene"));
    }

    #[test]
    fn test_empty_title_rejected() {
        let err = NewClip {
            title: Some("".to_string()),
            ..minimal()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.violations().len(), 1);
        assert_eq!(err.violations()[0].0, "title");
    }

    #[test]
    fn test_missing_required_fields_named() {
        let err = NewClip::default().validate().unwrap_err();
        let fields: Vec<_> = err.violations().iter().map(|(f, _)| *f).collect();
        assert_eq!(fields, vec!["title", "anime", "video_url"]);
        assert!(err.to_string().contains("video_url: field required"));
    }

    #[test]
    fn test_negative_times_rejected() {
        let err = NewClip {
            start_time: Some(-1.0),
            end_time: Some(-0.5),
            ..minimal()
        }
        .validate()
        .unwrap_err();
        let fields: Vec<_> = err.violations().iter().map(|(f, _)| *f).collect();
        assert_eq!(fields, vec!["start_time", "end_time"]);
    }

    #[test]
    fn test_zero_time_allowed() {
        let clip = NewClip {
            start_time: Some(0.0),
            ..minimal()
        }
        .validate()
        .expect("zero is a valid start time");
        assert_eq!(clip.start_time, Some(0.0));
    }

    #[test]
    fn test_end_before_start_is_not_an_error() {
        // ordering between start_time and end_time is deliberately unchecked
        NewClip {
            start_time: Some(100.0),
            end_time: Some(10.0),
            ..minimal()
        }
        .validate()
        .expect("time ordering is unconstrained");
    }

    #[test]
    fn test_unparseable_video_url_rejected() {
        let err = NewClip {
            video_url: Some("not a url".to_string()),
            ..minimal()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.violations()[0].0, "video_url");
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        let err = NewClip {
            video_url: Some("ftp://example.com/a.mp4".to_string()),
            ..minimal()
        }
        .validate()
        .unwrap_err();
        assert!(err.violations()[0].1.contains("scheme"));
    }

    #[test]
    fn test_bad_thumbnail_url_rejected() {
        let err = NewClip {
            thumbnail_url: Some("nope".to_string()),
            ..minimal()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.violations()[0].0, "thumbnail_url");
    }

    #[test]
    fn test_violations_are_collected_not_fail_fast() {
        let err = NewClip {
            title: Some("  ".to_string()),
            start_time: Some(-3.0),
            video_url: Some("bogus".to_string()),
            ..minimal()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.violations().len(), 3);
    }

    #[test]
    fn test_unset_optionals_omitted_from_json() {
        let clip = minimal().validate().unwrap();
        let json = serde_json::to_value(&clip).unwrap();
        let object = json.as_object().unwrap();
        assert!(object.contains_key("title"));
        assert!(!object.contains_key("episode"));
        assert!(!object.contains_key("start_time"));
        assert!(!object.contains_key("notes"));
    }
}

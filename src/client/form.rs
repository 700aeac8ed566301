//! Input handling for the "new video" form.

use thiserror::Error;

use crate::models::CreateVideoRequest;

pub const TITLE_MIN_CHARS: usize = 3;
pub const TITLE_MAX_CHARS: usize = 200;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DurationError {
    #[error("Duration is required")]
    Empty,
    #[error("Duration can only contain numbers and colons (:)")]
    InvalidCharacters,
    #[error("Invalid duration format")]
    InvalidNumber,
    #[error("Invalid MM:SS format (seconds must be 0-59)")]
    InvalidMinutesSeconds,
    #[error("Invalid HH:MM:SS format (minutes and seconds must be 0-59)")]
    InvalidHoursMinutesSeconds,
    #[error("Use MM:SS or HH:MM:SS format")]
    WrongShape,
    #[error("Duration must be greater than 0")]
    Zero,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Title is required")]
    TitleMissing,
    #[error("Title must be at least 3 characters long")]
    TitleTooShort,
    #[error("Title cannot exceed 200 characters")]
    TitleTooLong,
    #[error(transparent)]
    Duration(#[from] DurationError),
    #[error("Views cannot be negative")]
    NegativeViews,
}

/// Parses `MM:SS` or `HH:MM:SS` into seconds.
pub fn parse_duration(input: &str) -> Result<u32, DurationError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(DurationError::Empty);
    }
    if !input.chars().all(|c| c.is_ascii_digit() || c == ':' || c.is_whitespace()) {
        return Err(DurationError::InvalidCharacters);
    }

    let parts = input
        .split(':')
        .map(|part| part.trim().parse::<u32>().map_err(|_| DurationError::InvalidNumber))
        .collect::<Result<Vec<u32>, _>>()?;

    let total = match parts.as_slice() {
        [minutes, seconds] => {
            if *seconds >= 60 {
                return Err(DurationError::InvalidMinutesSeconds);
            }
            minutes
                .checked_mul(60)
                .and_then(|m| m.checked_add(*seconds))
                .ok_or(DurationError::InvalidNumber)?
        }
        [hours, minutes, seconds] => {
            if *minutes >= 60 || *seconds >= 60 {
                return Err(DurationError::InvalidHoursMinutesSeconds);
            }
            hours
                .checked_mul(3600)
                .and_then(|h| h.checked_add(minutes * 60 + seconds))
                .ok_or(DurationError::InvalidNumber)?
        }
        _ => return Err(DurationError::WrongShape),
    };

    if total == 0 {
        return Err(DurationError::Zero);
    }
    Ok(total)
}

/// `H:MM:SS` when there is at least an hour, otherwise `M:SS`.
pub fn format_duration(seconds: u32) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewVideoForm {
    pub title: String,
    pub duration_input: String,
    pub views: i64,
    pub tag_ids: Vec<String>,
}

impl NewVideoForm {
    pub fn validate(&self) -> Result<CreateVideoRequest, FormError> {
        let title = self.title.trim();
        let title_chars = title.chars().count();
        if title_chars == 0 {
            return Err(FormError::TitleMissing);
        }
        if title_chars < TITLE_MIN_CHARS {
            return Err(FormError::TitleTooShort);
        }
        if title_chars > TITLE_MAX_CHARS {
            return Err(FormError::TitleTooLong);
        }

        let duration = parse_duration(&self.duration_input)?;

        if self.views < 0 {
            return Err(FormError::NegativeViews);
        }

        Ok(CreateVideoRequest {
            title: title.to_string(),
            duration: i64::from(duration),
            views: self.views,
            tag_ids: if self.tag_ids.is_empty() {
                None
            } else {
                Some(self.tag_ids.clone())
            },
        })
    }
}

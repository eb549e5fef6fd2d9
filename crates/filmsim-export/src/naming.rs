//! Download file names.
//!
//! Downloads are named `fujifilm-{recipe_id}-{unix_millis}.jpg`, so
//! repeated exports of the same recipe do not collide.

use web_time::{SystemTime, UNIX_EPOCH};

/// File name for a JPEG download of `recipe_id` taken at
/// `timestamp_millis` (milliseconds since the Unix epoch).
#[must_use]
pub fn download_filename(recipe_id: &str, timestamp_millis: u64) -> String {
    format!("fujifilm-{recipe_id}-{timestamp_millis}.jpg")
}

/// Current time in milliseconds since the Unix epoch.
///
/// Returns 0 if the system clock is set before 1970.
#[must_use]
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// [`download_filename`] stamped with the current time.
#[must_use]
pub fn download_filename_now(recipe_id: &str) -> String {
    download_filename(recipe_id, unix_millis())
}

// Rotoguru game-log loading: one CSV file per calendar day.

use std::path::{Path, PathBuf};

use chrono::{Days, NaiveDate};
use tracing::info;

use crate::frame::{Frame, FrameError};

/// The training frame (prior days, concatenated) plus the optional
/// validation frame for the reference date itself.
#[derive(Debug, Clone)]
pub struct GameLogs {
    pub train: Frame,
    pub valid: Option<Frame>,
}

/// Path of the game log for one calendar day.
pub fn log_path(data_dir: &Path, date: NaiveDate) -> PathBuf {
    data_dir.join(format!("rotoguru-{}.csv", date.format("%Y-%m-%d")))
}

/// Load the validation log for `game_date` (when `validation` is set) and
/// the logs for the `training_days` preceding days, concatenated into one
/// training frame. Any missing or malformed file fails the whole load; the
/// training files must share one header schema.
pub fn load_game_logs(
    data_dir: &Path,
    game_date: NaiveDate,
    training_days: u32,
    validation: bool,
) -> Result<GameLogs, FrameError> {
    let valid = if validation {
        Some(Frame::from_path(&log_path(data_dir, game_date))?)
    } else {
        None
    };

    let mut train = Frame::new();
    for day_back in 1..=training_days {
        let day = game_date - Days::new(u64::from(day_back));
        let path = log_path(data_dir, day);
        let frame = Frame::from_path(&path)?;
        if day_back == 1 {
            train = frame;
        } else if frame.column_names() != train.column_names() {
            return Err(FrameError::SchemaMismatch {
                path: path.display().to_string(),
                expected: train.column_names().to_vec(),
                found: frame.column_names().to_vec(),
            });
        } else {
            train.append(frame);
        }
    }

    info!(
        rows = train.n_rows(),
        days = training_days,
        game_date = %game_date,
        "training frame assembled"
    );
    Ok(GameLogs { train, valid })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

// SPDX-License-Identifier: MIT OR Apache-2.0
//! CRUD facade over [`Sequence`] enforcing name and capacity rules.
//!
//! The registry only touches the persistent model. It never sees the
//! engine's runtime state.

use crate::error::{ModelError, Result};
use crate::sequence::Sequence;
use crate::track::TrackId;

/// Maximum track name length in characters
pub const MAX_TRACK_NAME_LEN: usize = 64;

fn validate_name(seq: &Sequence, name: &str, exclude: Option<TrackId>) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ModelError::EmptyName);
    }
    let len = trimmed.chars().count();
    if len > MAX_TRACK_NAME_LEN {
        return Err(ModelError::NameTooLong {
            len,
            max: MAX_TRACK_NAME_LEN,
        });
    }
    let taken = seq
        .tracks()
        .iter()
        .any(|t| Some(t.id) != exclude && t.name == trimmed);
    if taken {
        return Err(ModelError::DuplicateName(trimmed.to_owned()));
    }
    Ok(trimmed.to_owned())
}

/// Add a track with a validated name, or a generated unique one.
pub fn add_track(seq: &mut Sequence, name: Option<&str>) -> Result<TrackId> {
    match name {
        Some(name) => {
            let name = validate_name(seq, name, None)?;
            seq.add_track(Some(&name))
        }
        None => {
            // Auto-names can collide after removals; bump until unique
            let mut n = seq.track_count() + 1;
            loop {
                let candidate = format!("Track {n}");
                if validate_name(seq, &candidate, None).is_ok() {
                    return seq.add_track(Some(&candidate));
                }
                n += 1;
            }
        }
    }
}

/// Rename a track with full name validation.
pub fn rename_track(seq: &mut Sequence, id: TrackId, name: &str) -> Result<()> {
    let name = validate_name(seq, name, Some(id))?;
    let Some(track) = seq.track_mut(id) else {
        return Err(ModelError::TrackNotFound(id));
    };
    track.rename(&name)
}

/// Remove a track by id.
pub fn remove_track(seq: &mut Sequence, id: TrackId) -> Result<()> {
    seq.remove_track(id).map(|_| ())
}

//! Ordering policies and track filtering.
//!
//! Everything here is pure: a policy maps a track sequence to the sequence
//! the destination playlist should end up with.

use std::{cmp::Reverse, collections::HashMap};

use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::types::Track;

/// Which entries survive `FILTER_VALID`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackFilter {
    /// Playable reference and track id.
    Playable,
    /// Playable, and part of an album (needed for album grouping).
    Album,
}

impl TrackFilter {
    pub fn accepts(&self, track: &Track) -> bool {
        let playable = track.uri.is_some() && track.id.is_some();
        match self {
            TrackFilter::Playable => playable,
            TrackFilter::Album => playable && track.album_id.is_some(),
        }
    }

    /// Drops rejected entries, keeping the survivors in their original order.
    pub fn apply(&self, tracks: Vec<Track>) -> Vec<Track> {
        tracks.into_iter().filter(|t| self.accepts(t)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderingPolicy {
    /// Albums newest first, tracks in album order.
    ReleaseDate,
    /// Uniform random permutation; a seed makes it reproducible.
    Shuffle { seed: Option<u64> },
    /// Source order as-is.
    Identity,
}

impl OrderingPolicy {
    pub fn apply(&self, tracks: Vec<Track>) -> Vec<Track> {
        match self {
            OrderingPolicy::ReleaseDate => group_by_album_newest_first(tracks),
            OrderingPolicy::Shuffle { seed: Some(seed) } => {
                shuffle_with(tracks, &mut StdRng::seed_from_u64(*seed))
            }
            OrderingPolicy::Shuffle { seed: None } => shuffle_with(tracks, &mut rand::rng()),
            OrderingPolicy::Identity => tracks,
        }
    }
}

/// Groups tracks by album, orders groups by release date descending and the
/// tracks of each group by track number.
///
/// Groups with equal release dates keep the order in which their first track
/// appeared. Albums without a known release date go last. Tracks without an
/// album id each form their own group.
pub fn group_by_album_newest_first(tracks: Vec<Track>) -> Vec<Track> {
    let mut groups: Vec<(Option<String>, Vec<Track>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for track in tracks {
        let slot = track.album_id.as_ref().and_then(|id| index.get(id).copied());
        match slot {
            Some(slot) => groups[slot].1.push(track),
            None => {
                if let Some(album_id) = &track.album_id {
                    index.insert(album_id.clone(), groups.len());
                }
                groups.push((track.album_id.clone(), vec![track]));
            }
        }
    }

    // Stable sorts: ties keep first-encountered order.
    groups.sort_by_key(|(_, members)| Reverse(members[0].release_date));
    for (_, members) in groups.iter_mut() {
        members.sort_by_key(|t| t.track_number);
    }

    groups.into_iter().flat_map(|(_, members)| members).collect()
}

/// Fisher-Yates shuffle driven by `rng`.
pub fn shuffle_with<R: Rng + ?Sized>(mut tracks: Vec<Track>, rng: &mut R) -> Vec<Track> {
    tracks.shuffle(rng);
    tracks
}

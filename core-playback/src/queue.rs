//! Play queue: the playlist plus the current selection.

use core_catalog::Song;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::types::{QueueSnapshot, RepeatMode};

/// What to do when the current song reaches its natural end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndOfTrack {
    /// Seek back to zero and play the same song again.
    RestartCurrent,
    /// Behave like a skip to the next song.
    Advance,
    /// Leave the player paused at the end.
    Hold,
}

/// Ordered playlist with an optional current index.
///
/// The index, when set, always points into `songs`.
#[derive(Debug, Clone, Default)]
pub struct PlayQueue {
    songs: Vec<Song>,
    current: Option<usize>,
}

impl PlayQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_song(&self) -> Option<&Song> {
        self.current.and_then(|index| self.songs.get(index))
    }

    pub fn get(&self, index: usize) -> Option<&Song> {
        self.songs.get(index)
    }

    /// Select the first song whose id matches, appending it when absent.
    /// Returns the selected index.
    pub fn select_or_append(&mut self, song: &Song) -> usize {
        let index = match self.songs.iter().position(|s| s.id == song.id) {
            Some(index) => index,
            None => {
                self.songs.push(song.clone());
                self.songs.len() - 1
            }
        };
        self.current = Some(index);
        index
    }

    /// Replace the playlist wholesale.
    ///
    /// The current index is kept only while it is still in range. Returns
    /// whether it was kept.
    pub fn replace(&mut self, songs: Vec<Song>) -> bool {
        self.songs = songs;
        if matches!(self.current, Some(index) if index >= self.songs.len()) {
            self.current = None;
        }
        self.current.is_some()
    }

    pub fn clear_selection(&mut self) {
        self.current = None;
    }

    /// Index a forward skip moves to, `None` on an empty playlist.
    ///
    /// Sequential order wraps to the start; with no selection it starts at 0.
    /// Shuffle draws uniformly from every index except the current one, or
    /// falls back to 0 when there is no other index.
    pub fn next_index<R: Rng + ?Sized>(&self, shuffle: bool, rng: &mut R) -> Option<usize> {
        let len = self.songs.len();
        if len == 0 {
            return None;
        }

        if shuffle {
            let candidates: Vec<usize> = (0..len).filter(|&i| Some(i) != self.current).collect();
            return Some(candidates.choose(rng).copied().unwrap_or(0));
        }

        Some(match self.current {
            Some(index) => (index + 1) % len,
            None => 0,
        })
    }

    /// Index a backward skip moves to, `None` on an empty playlist.
    ///
    /// Wraps from the first song (or no selection) to the last.
    pub fn previous_index(&self) -> Option<usize> {
        let len = self.songs.len();
        if len == 0 {
            return None;
        }

        Some(match self.current {
            Some(index) if index > 0 => index - 1,
            _ => len - 1,
        })
    }

    pub fn is_last(&self) -> bool {
        matches!(self.current, Some(index) if index + 1 == self.songs.len())
    }

    /// Apply the repeat policy to a natural end of the current song.
    pub fn end_of_track(&self, mode: RepeatMode) -> EndOfTrack {
        match mode {
            RepeatMode::One => EndOfTrack::RestartCurrent,
            RepeatMode::All => EndOfTrack::Advance,
            RepeatMode::Off if self.is_last() => EndOfTrack::Hold,
            RepeatMode::Off => EndOfTrack::Advance,
        }
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            songs: self.songs.clone(),
            current_index: self.current,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn songs(ids: &[&str]) -> Vec<Song> {
        ids.iter()
            .map(|id| Song::new(*id, format!("Song {}", id), "Artist", 180))
            .collect()
    }

    fn queue_at(ids: &[&str], current: Option<usize>) -> PlayQueue {
        let mut queue = PlayQueue::new();
        queue.replace(songs(ids));
        if let Some(index) = current {
            let song = queue.get(index).cloned().unwrap();
            queue.select_or_append(&song);
        }
        queue
    }

    #[test]
    fn test_select_existing_song() {
        let mut queue = queue_at(&["a", "b", "c"], None);

        let index = queue.select_or_append(&Song::new("b", "", "", 0));

        assert_eq!(index, 1);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.current_song().map(|s| s.id.as_str()), Some("b"));
    }

    #[test]
    fn test_select_unknown_song_appends() {
        let mut queue = queue_at(&["a", "b"], Some(0));

        let index = queue.select_or_append(&Song::new("z", "Zed", "", 0));

        assert_eq!(index, 2);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.current_index(), Some(2));
    }

    #[test]
    fn test_duplicate_ids_resolve_to_first_match() {
        let mut queue = queue_at(&["a", "b", "a"], None);

        assert_eq!(queue.select_or_append(&Song::new("a", "", "", 0)), 0);
    }

    #[test]
    fn test_sequential_next_visits_every_song_once_per_cycle() {
        let mut queue = queue_at(&["a", "b", "c", "d"], Some(0));
        let mut rng = StdRng::seed_from_u64(1);
        let mut visited = Vec::new();

        for _ in 0..4 {
            let next = queue.next_index(false, &mut rng).unwrap();
            visited.push(next);
            let song = queue.get(next).cloned().unwrap();
            queue.select_or_append(&song);
        }

        assert_eq!(visited, vec![1, 2, 3, 0]);
    }

    #[test]
    fn test_next_without_selection_starts_at_zero() {
        let queue = queue_at(&["a", "b"], None);
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(queue.next_index(false, &mut rng), Some(0));
    }

    #[test]
    fn test_empty_queue_has_no_neighbours() {
        let queue = PlayQueue::new();
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(queue.next_index(true, &mut rng), None);
        assert_eq!(queue.next_index(false, &mut rng), None);
        assert_eq!(queue.previous_index(), None);
    }

    #[test]
    fn test_shuffle_never_repeats_current() {
        let queue = queue_at(&["a", "b", "c", "d", "e"], Some(2));
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..200 {
            let next = queue.next_index(true, &mut rng).unwrap();
            assert_ne!(next, 2);
            assert!(next < 5);
        }
    }

    #[test]
    fn test_shuffle_with_single_song_selects_zero() {
        let queue = queue_at(&["only"], Some(0));
        let mut rng = StdRng::seed_from_u64(3);

        assert_eq!(queue.next_index(true, &mut rng), Some(0));
    }

    #[test]
    fn test_previous_wraps_to_last() {
        assert_eq!(queue_at(&["a", "b", "c"], Some(0)).previous_index(), Some(2));
        assert_eq!(queue_at(&["a", "b", "c"], Some(2)).previous_index(), Some(1));
        assert_eq!(queue_at(&["a", "b", "c"], None).previous_index(), Some(2));
    }

    #[test]
    fn test_replace_keeps_index_in_range() {
        let mut queue = queue_at(&["a", "b", "c"], Some(1));
        assert!(queue.replace(songs(&["x", "y"])));
        assert_eq!(queue.current_index(), Some(1));

        let mut queue = queue_at(&["a", "b", "c"], Some(2));
        assert!(!queue.replace(songs(&["x", "y"])));
        assert_eq!(queue.current_index(), None);

        assert!(!queue.replace(Vec::new()));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_end_of_track_policy() {
        let middle = queue_at(&["a", "b", "c"], Some(1));
        let last = queue_at(&["a", "b", "c"], Some(2));

        assert_eq!(middle.end_of_track(RepeatMode::One), EndOfTrack::RestartCurrent);
        assert_eq!(last.end_of_track(RepeatMode::One), EndOfTrack::RestartCurrent);
        assert_eq!(middle.end_of_track(RepeatMode::All), EndOfTrack::Advance);
        assert_eq!(last.end_of_track(RepeatMode::All), EndOfTrack::Advance);
        assert_eq!(middle.end_of_track(RepeatMode::Off), EndOfTrack::Advance);
        assert_eq!(last.end_of_track(RepeatMode::Off), EndOfTrack::Hold);
    }

    #[test]
    fn test_snapshot_reflects_selection() {
        let queue = queue_at(&["a", "b"], Some(1));
        let snapshot = queue.snapshot();

        assert_eq!(snapshot.songs.len(), 2);
        assert_eq!(snapshot.current_song().map(|s| s.id.as_str()), Some("b"));
    }
}

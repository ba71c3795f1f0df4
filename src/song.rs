use log::{debug, trace};

use crate::error::{
    AlreadyAttached, EotOutOfOrder, FormatConflict, LibResult, NoSuchEvent, NoSuchTrack, Result,
    SeekPastEnd,
};
use crate::event::Event;
use crate::tempo::TempoMap;
use crate::track::Track;

/// Default PPQN a freshly constructed song carries until a loader or caller
/// overrides it with [`Song::set_ppqn`].
const DEFAULT_PPQN: u16 = 120;

/// SMPTE-style division (`frames_per_second`, `subframe_resolution`),
/// carried alongside `ppqn` purely for loader/saver round-trip fidelity.
/// The core's pulses↔seconds algorithms always use `ppqn` (§6).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmpteDivision {
    pub frames_per_second: i8,
    pub subframe_resolution: u8,
}

/// A Standard MIDI File song: header fields, an ordered set of tracks, the
/// tempo map derived from them, and the multi-track playback cursor's
/// shared state (`last_seek_position`).
///
/// # Boundary contract for a conforming loader/saver
///
/// This crate models the in-memory song and does not read or write `.mid`
/// files itself (out of scope, spec.md §1); that leaves a contract a
/// loader/saver built on top of it must respect to keep the invariants in
/// the module docs intact:
///
/// - A loader constructs an empty `Song`, then for each SMF track chunk
///   constructs a `Track` with [`add_track`](Song::add_track), appends its
///   parsed events **in file order** via
///   [`add_event_delta_pulses`](TrackHandle::add_event_delta_pulses) (never
///   `add_event_pulses`, since the loader only has each event's delta until
///   it accumulates them), and only then moves on to the next chunk.
/// - The loader normalizes every event buffer before handing it to an
///   `Event` constructor: the first byte is always an explicit status byte
///   (no running status), and a sysex buffer excludes the SMF
///   variable-length length prefix that precedes it on disk.
/// - A saver may assume the invariants in this crate hold; before writing a
///   track whose last event is not EOT, it must synthesize one with
///   `delta_time_pulses = 0` (this crate does not do that for you, since not
///   every track need end in an EOT while still being edited in memory).
/// - SMPTE-framed division (`frames_per_second`, `subframe_resolution`) is
///   carried on `Song` purely for loader/saver round-trip fidelity; the
///   pulses↔seconds conversions in this crate always use `ppqn`.
#[derive(Debug, Clone)]
pub struct Song {
    format: u8,
    ppqn: u16,
    smpte: Option<SmpteDivision>,
    tracks: Vec<Track>,
    tempo_map: TempoMap,
    last_seek_position: Option<f64>,
}

impl Song {
    pub fn new() -> Song {
        Song {
            format: 0,
            ppqn: DEFAULT_PPQN,
            smpte: None,
            tracks: Vec::new(),
            tempo_map: TempoMap::new(),
            last_seek_position: None,
        }
    }

    pub fn format(&self) -> u8 {
        self.format
    }

    pub fn ppqn(&self) -> u16 {
        self.ppqn
    }

    pub fn smpte_division(&self) -> Option<SmpteDivision> {
        self.smpte
    }

    pub fn set_smpte_division(&mut self, division: SmpteDivision) {
        self.smpte = Some(division);
    }

    pub fn number_of_tracks(&self) -> usize {
        self.tracks.len()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn tempo_map(&self) -> &TempoMap {
        &self.tempo_map
    }

    pub fn last_seek_position(&self) -> Option<f64> {
        self.last_seek_position
    }

    pub fn track(&self, track_number: u32) -> Result<&Track> {
        let idx = self.track_index(track_number)?;
        Ok(&self.tracks[idx])
    }

    /// Borrow-scoped handle for mutating one track. Mutation crosses into
    /// `Song` because adding or removing a tempo-bearing event can force a
    /// tempo-map rebuild that touches every other track.
    pub fn track_mut(&mut self, track_number: u32) -> Result<TrackHandle<'_>> {
        self.track_index(track_number)?;
        Ok(TrackHandle {
            song: self,
            track_number,
        })
    }

    pub fn set_format(&mut self, format: u8) -> Result<()> {
        if format == 0 && self.tracks.len() > 1 {
            return FormatConflict {
                site: site!(),
                number_of_tracks: self.tracks.len(),
            }
            .fail()
            .map_err(Into::into);
        }
        self.format = format;
        debug!("song: format set to {}", format);
        Ok(())
    }

    /// Unconditionally accepted; rebuilds the tempo map and recomputes
    /// every event's `time_seconds` since the pulse scale changed (§9).
    pub fn set_ppqn(&mut self, ppqn: u16) -> Result<()> {
        debug_assert!(ppqn > 0);
        self.ppqn = ppqn;
        debug!("song: ppqn changed to {}, rebuilding tempo map", ppqn);
        self.rebuild_tempo_map();
        Ok(())
    }

    pub fn add_track(&mut self) -> u32 {
        let mut track = Track::new();
        let track_number = self.tracks.len() as u32 + 1;
        track.set_track_number(Some(track_number));
        self.tracks.push(track);
        if self.tracks.len() > 1 && self.format == 0 {
            self.format = 1;
            debug!("song: second track added, format promoted to 1");
        }
        track_number
    }

    /// Detaches and returns the track, renumbering survivors densely from 1
    /// and updating the cached `track_number` on every event of every
    /// surviving track (§4.5).
    pub fn remove_track(&mut self, track_number: u32) -> Result<Track> {
        let idx = self.track_index(track_number)?;
        let mut removed = self.tracks.remove(idx);
        removed.set_track_number(None);
        for (i, t) in self.tracks.iter_mut().enumerate() {
            let renumbered = i as u32 + 1;
            t.set_track_number(Some(renumbered));
            for event in t.events_mut() {
                event.track_number = Some(renumbered);
            }
        }
        debug!(
            "song: removed track {}, {} tracks remain",
            track_number,
            self.tracks.len()
        );
        Ok(removed)
    }

    // --- Playback cursor (§4.6) ---------------------------------------

    pub fn rewind(&mut self) {
        for track in self.tracks.iter_mut() {
            track.rewind();
        }
        self.last_seek_position = Some(0.0);
        trace!("song: cursor rewound");
    }

    /// The attached track whose `next_event_number` is not exhausted and
    /// whose `time_of_next_event` is minimal; ties go to the lower track
    /// number because tracks are scanned in ascending order.
    pub fn find_next_track(&self) -> Option<u32> {
        self.tracks
            .iter()
            .filter(|t| t.next_event_number().is_some())
            .min_by_key(|t| (t.time_of_next_event().unwrap(), t.track_number().unwrap()))
            .and_then(Track::track_number)
    }

    pub fn get_next_event(&mut self) -> Option<Event> {
        let track_number = self.find_next_track()?;
        let idx = (track_number - 1) as usize;
        let event = self.tracks[idx].get_next_event();
        self.last_seek_position = None;
        event
    }

    pub fn peek_next_event(&self) -> Option<Event> {
        let track_number = self.find_next_track()?;
        self.tracks[(track_number - 1) as usize].peek_next_event().cloned()
    }

    pub fn skip_next_event(&mut self) {
        self.get_next_event();
    }

    /// Rewinds, then advances until the peeked event is `target`
    /// (identified by track number and event number). Undefined if
    /// `target` is not attached to this song.
    pub fn seek_to_event(&mut self, target: &Event) -> Result<()> {
        self.rewind();
        loop {
            match self.peek_next_event() {
                Some(e)
                    if e.track_number() == target.track_number()
                        && e.event_number() == target.event_number() =>
                {
                    self.last_seek_position = e.time_seconds();
                    return Ok(());
                }
                Some(_) => self.skip_next_event(),
                None => {
                    return SeekPastEnd {
                        site: site!(),
                        target: "event".to_string(),
                    }
                    .fail()
                    .map_err(Into::into);
                }
            }
        }
    }

    pub fn seek_to_seconds(&mut self, seconds: f64) -> Result<()> {
        if self.last_seek_position == Some(seconds) {
            return Ok(());
        }
        self.rewind();
        loop {
            match self.peek_next_event() {
                Some(e) if e.time_seconds().unwrap() < seconds => self.skip_next_event(),
                Some(_) => break,
                None => {
                    return SeekPastEnd {
                        site: site!(),
                        target: format!("{} seconds", seconds),
                    }
                    .fail()
                    .map_err(Into::into);
                }
            }
        }
        self.last_seek_position = Some(seconds);
        Ok(())
    }

    pub fn seek_to_pulses(&mut self, pulses: i64) -> Result<()> {
        self.rewind();
        loop {
            match self.peek_next_event() {
                Some(e) if e.time_pulses().unwrap() < pulses => self.skip_next_event(),
                Some(e) => {
                    self.last_seek_position = e.time_seconds();
                    break;
                }
                None => {
                    return SeekPastEnd {
                        site: site!(),
                        target: format!("{} pulses", pulses),
                    }
                    .fail()
                    .map_err(Into::into);
                }
            }
        }
        Ok(())
    }

    pub fn get_length_pulses(&self) -> i64 {
        self.tracks
            .iter()
            .filter_map(Track::get_last_event)
            .filter_map(Event::time_pulses)
            .max()
            .unwrap_or(0)
    }

    pub fn get_length_seconds(&self) -> f64 {
        self.tracks
            .iter()
            .filter_map(Track::get_last_event)
            .filter_map(Event::time_seconds)
            .fold(0.0, f64::max)
    }

    // --- internals -----------------------------------------------------

    fn track_index(&self, track_number: u32) -> LibResult<usize> {
        track_number
            .checked_sub(1)
            .filter(|&i| (i as usize) < self.tracks.len())
            .map(|i| i as usize)
            .ok_or_else(|| {
                NoSuchTrack {
                    site: site!(),
                    track_number,
                }
                .build()
            })
    }

    fn is_globally_last_pulses(&self, track_idx: usize, pulses: i64) -> bool {
        self.tracks.iter().enumerate().all(|(i, t)| {
            i == track_idx
                || t.get_last_event()
                    .map_or(true, |e| e.time_pulses().unwrap() <= pulses)
        })
    }

    /// Single append/insert path shared by every add operation (§4.3).
    /// Returns the new event's 1-based `event_number`.
    fn insert_event(&mut self, track_idx: usize, mut event: Event, pulses: i64) -> u32 {
        let track_number = self.tracks[track_idx].track_number().unwrap();

        // EOT policy: an event added past the current trailing EOT absorbs it.
        {
            let events = self.tracks[track_idx].events_mut();
            let drop_eot = matches!(
                events.last(),
                Some(last) if last.is_eot() && last.time_pulses().unwrap() <= pulses
            );
            if drop_eot {
                events.pop();
                trace!("track {}: absorbed trailing EOT at pulses {}", track_number, pulses);
            }
        }

        let events = self.tracks[track_idx].events_mut();
        let last_pulses = events.last().and_then(Event::time_pulses).unwrap_or(0);
        event.time_pulses = Some(pulses);
        event.track_number = Some(track_number);

        let event_number = if pulses >= last_pulses {
            event.delta_time_pulses = Some(pulses - last_pulses);
            events.push(event);
            let number = events.len() as u32;
            events.last_mut().unwrap().event_number = Some(number);
            trace!("track {}: appended event {} at pulses {}", track_number, number, pulses);
            number
        } else {
            // Out-of-order insert: tag with a tie-break key one past the
            // current length so it sorts after every pre-existing event
            // sharing its pulses, preserving their relative order (§9).
            let tie_break = events.len() as u32 + 1;
            event.event_number = Some(tie_break);
            event.delta_time_pulses = None;
            events.push(event);
            events.sort_by(|a, b| {
                a.time_pulses
                    .unwrap()
                    .cmp(&b.time_pulses.unwrap())
                    .then(a.event_number.unwrap().cmp(&b.event_number.unwrap()))
            });
            let new_index = events
                .iter()
                .position(|e| e.event_number == Some(tie_break))
                .unwrap();
            for (i, e) in events.iter_mut().enumerate() {
                e.event_number = Some(i as u32 + 1);
            }
            let pulses_seq: Vec<i64> = events.iter().map(|e| e.time_pulses.unwrap()).collect();
            for (i, e) in events.iter_mut().enumerate() {
                e.delta_time_pulses = Some(if i == 0 {
                    pulses_seq[0]
                } else {
                    pulses_seq[i] - pulses_seq[i - 1]
                });
            }
            debug!(
                "track {}: out-of-order insert at pulses {}, track resorted",
                track_number, pulses
            );
            new_index as u32 + 1
        };

        event_number
    }

    fn after_event_added(&mut self, track_idx: usize, event_number: u32, pulses: i64) {
        let is_tempo_evt = self.tracks[track_idx]
            .get_event_by_number(event_number)
            .unwrap()
            .is_tempo_map_event();

        let mut rebuilt = false;
        if is_tempo_evt {
            if self.is_globally_last_pulses(track_idx, pulses)
                && self.tracks[track_idx].events_len() as u32 == event_number
            {
                let ppqn = self.ppqn;
                let buf = self.tracks[track_idx]
                    .get_event_by_number(event_number)
                    .unwrap()
                    .buffer()
                    .to_vec();
                self.tempo_map.observe_event(&buf, pulses, ppqn);
                trace!("song: tempo map extended at pulses {}", pulses);
            } else {
                debug!("song: tempo event inserted out of order, rebuilding tempo map");
                self.rebuild_tempo_map();
                rebuilt = true;
            }
        }

        if !rebuilt {
            let ppqn = self.ppqn;
            let seconds = self.tempo_map.pulses_to_seconds(pulses, ppqn);
            self.tracks[track_idx].events_mut()[(event_number - 1) as usize].time_seconds =
                Some(seconds);
        }
    }

    fn add_event_at_pulses(&mut self, track_number: u32, event: Event, pulses: i64) -> LibResult<u32> {
        if event.is_attached() {
            return AlreadyAttached { site: site!() }.fail();
        }
        debug_assert!(pulses >= 0);
        let idx = self.track_index(track_number)?;
        let event_number = self.insert_event(idx, event, pulses);
        self.after_event_added(idx, event_number, pulses);
        Ok(event_number)
    }

    fn add_event_at_delta_pulses(&mut self, track_number: u32, event: Event, delta: i64) -> LibResult<u32> {
        debug_assert!(delta >= 0);
        let idx = self.track_index(track_number)?;
        let last_pulses = self.tracks[idx]
            .get_last_event()
            .and_then(Event::time_pulses)
            .unwrap_or(0);
        self.add_event_at_pulses(track_number, event, last_pulses + delta)
    }

    fn add_event_at_seconds(&mut self, track_number: u32, event: Event, seconds: f64) -> LibResult<u32> {
        let pulses = self.tempo_map.seconds_to_pulses(seconds, self.ppqn);
        self.add_event_at_pulses(track_number, event, pulses)
    }

    fn add_eot_at_delta_pulses(&mut self, track_number: u32, delta: i64) -> LibResult<u32> {
        self.add_event_at_delta_pulses(track_number, Event::eot(), delta)
    }

    fn add_eot_at_pulses(&mut self, track_number: u32, pulses: i64) -> LibResult<u32> {
        let idx = self.track_index(track_number)?;
        if let Some(last_pulses) = self.tracks[idx].get_last_event().and_then(Event::time_pulses) {
            if pulses < last_pulses {
                return EotOutOfOrder {
                    site: site!(),
                    requested: format!("{} pulses", pulses),
                }
                .fail();
            }
        }
        self.add_event_at_pulses(track_number, Event::eot(), pulses)
    }

    fn add_eot_at_seconds(&mut self, track_number: u32, seconds: f64) -> LibResult<u32> {
        let pulses = self.tempo_map.seconds_to_pulses(seconds, self.ppqn);
        self.add_eot_at_pulses(track_number, pulses)
    }

    fn remove_event_numbered(&mut self, track_number: u32, event_number: u32) -> LibResult<Event> {
        let idx = self.track_index(track_number)?;
        let len = self.tracks[idx].events_len();
        if event_number == 0 || event_number as usize > len {
            return NoSuchEvent {
                site: site!(),
                event_number,
            }
            .fail();
        }

        let was_track_last = event_number as usize == len;
        let removed_pulses = self.tracks[idx]
            .get_event_by_number(event_number)
            .unwrap()
            .time_pulses()
            .unwrap();
        let was_globally_last = was_track_last && self.is_globally_last_pulses(idx, removed_pulses);

        let events = self.tracks[idx].events_mut();
        let pos = (event_number - 1) as usize;
        let mut removed = events.remove(pos);
        let removed_delta = removed.delta_time_pulses.unwrap_or(0);
        if let Some(following) = events.get_mut(pos) {
            following.delta_time_pulses = Some(following.delta_time_pulses.unwrap_or(0) + removed_delta);
        }
        for (i, e) in events.iter_mut().enumerate().skip(pos) {
            e.event_number = Some(i as u32 + 1);
        }

        let is_tempo_evt = removed.is_tempo_map_event();
        removed.event_number = None;
        removed.delta_time_pulses = None;
        removed.time_pulses = None;
        removed.time_seconds = None;
        removed.track_number = None;

        if is_tempo_evt {
            if was_globally_last {
                self.tempo_map.drop_last_point_if_pulses(removed_pulses);
                debug!("song: dropped tempo point at pulses {} after trailing removal", removed_pulses);
            } else {
                debug!("song: removed interior tempo event, rebuilding tempo map");
                self.rebuild_tempo_map();
            }
        }

        trace!("track {}: removed event {}", track_number, event_number);
        Ok(removed)
    }

    /// Collects `(track_index, event_number)` for every attached event,
    /// ordered chronologically with ties broken by ascending track index —
    /// the merge both the tempo map rebuild and, conceptually, the cursor
    /// rely on (§4.4, §4.6).
    fn global_event_order(&self) -> Vec<(usize, u32)> {
        let mut all: Vec<(usize, u32, i64)> = Vec::new();
        for (ti, track) in self.tracks.iter().enumerate() {
            for event in track.events() {
                all.push((ti, event.event_number.unwrap(), event.time_pulses.unwrap()));
            }
        }
        all.sort_by(|a, b| a.2.cmp(&b.2).then(a.0.cmp(&b.0)).then(a.1.cmp(&b.1)));
        all.into_iter().map(|(ti, en, _)| (ti, en)).collect()
    }

    fn rebuild_tempo_map(&mut self) {
        self.tempo_map.reset();
        let ppqn = self.ppqn;
        for (ti, en) in self.global_event_order() {
            let (is_tempo_evt, buf, pulses) = {
                let event = self.tracks[ti].get_event_by_number(en).unwrap();
                (event.is_tempo_map_event(), event.buffer().to_vec(), event.time_pulses().unwrap())
            };
            if is_tempo_evt {
                self.tempo_map.observe_event(&buf, pulses, ppqn);
            }
        }
        for track in self.tracks.iter_mut() {
            for event in track.events_mut() {
                let pulses = event.time_pulses.unwrap();
                event.time_seconds = Some(self.tempo_map.pulses_to_seconds(pulses, ppqn));
            }
        }
        debug!("song: tempo map rebuilt with {} points", self.tempo_map.len());
    }
}

impl Default for Song {
    fn default() -> Song {
        Song::new()
    }
}

/// Borrow-scoped access to one track's mutating operations, obtained from
/// [`Song::track_mut`]. Named after the operations spec'd on `Track`, but
/// implemented against `Song` because tempo-bearing edits can ripple across
/// every other track.
pub struct TrackHandle<'a> {
    song: &'a mut Song,
    track_number: u32,
}

impl<'a> TrackHandle<'a> {
    fn track(&self) -> &Track {
        &self.song.tracks[(self.track_number - 1) as usize]
    }

    pub fn track_number(&self) -> u32 {
        self.track_number
    }

    pub fn events(&self) -> &[Event] {
        self.track().events()
    }

    pub fn events_len(&self) -> usize {
        self.track().events_len()
    }

    pub fn is_empty(&self) -> bool {
        self.track().is_empty()
    }

    pub fn get_event_by_number(&self, event_number: u32) -> Option<&Event> {
        self.track().get_event_by_number(event_number)
    }

    pub fn get_last_event(&self) -> Option<&Event> {
        self.track().get_last_event()
    }

    /// This track's own navigation cursor (§4.3), independent of every other
    /// track's — unlike [`Song::peek_next_event`], it never merges across
    /// tracks.
    pub fn peek_next_event(&self) -> Option<&Event> {
        self.track().peek_next_event()
    }

    /// Returns the event at this track's cursor and advances it, independent
    /// of every other track's — unlike [`Song::get_next_event`], it never
    /// merges across tracks.
    pub fn get_next_event(&mut self) -> Option<Event> {
        self.song.tracks[(self.track_number - 1) as usize].get_next_event()
    }

    pub fn add_event_pulses(&mut self, event: Event, pulses: i64) -> Result<u32> {
        Ok(self.song.add_event_at_pulses(self.track_number, event, pulses)?)
    }

    pub fn add_event_delta_pulses(&mut self, event: Event, delta: i64) -> Result<u32> {
        Ok(self.song.add_event_at_delta_pulses(self.track_number, event, delta)?)
    }

    pub fn add_event_seconds(&mut self, event: Event, seconds: f64) -> Result<u32> {
        Ok(self.song.add_event_at_seconds(self.track_number, event, seconds)?)
    }

    pub fn add_eot_delta_pulses(&mut self, delta: i64) -> Result<u32> {
        Ok(self.song.add_eot_at_delta_pulses(self.track_number, delta)?)
    }

    pub fn add_eot_pulses(&mut self, pulses: i64) -> Result<u32> {
        Ok(self.song.add_eot_at_pulses(self.track_number, pulses)?)
    }

    pub fn add_eot_seconds(&mut self, seconds: f64) -> Result<u32> {
        Ok(self.song.add_eot_at_seconds(self.track_number, seconds)?)
    }

    pub fn remove_event(&mut self, event_number: u32) -> Result<Event> {
        Ok(self.song.remove_event_numbered(self.track_number, event_number)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;

    #[test]
    fn s1_construct_empty() {
        let mut song = Song::new();
        assert_eq!(song.format(), 0);
        assert_eq!(song.ppqn(), 120);
        assert_eq!(song.number_of_tracks(), 0);
        assert_eq!(song.get_length_pulses(), 0);
        assert_eq!(song.get_length_seconds(), 0.0);
        song.rewind();
        assert_eq!(song.get_next_event(), None);
    }

    #[test]
    fn s2_two_track_promotion() {
        let mut song = Song::new();
        song.add_track();
        song.add_track();
        assert_eq!(song.format(), 1);
        let err = song.set_format(0).unwrap_err();
        assert!(format!("{}", err).contains("format"));
    }

    #[test]
    fn s3_default_tempo() {
        let mut song = Song::new();
        song.set_ppqn(96).unwrap();
        song.add_track();
        let note_on = Event::new_from_three_bytes(0x90, 0x3C, 0x7F).unwrap();
        let number = song
            .track_mut(1)
            .unwrap()
            .add_event_pulses(note_on, 96)
            .unwrap();
        let event = song.track(1).unwrap().get_event_by_number(number).unwrap();
        assert!((event.time_seconds().unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn s4_tempo_change_mid_song() {
        let mut song = Song::new();
        song.set_ppqn(96).unwrap();
        song.add_track();
        {
            let mut track = song.track_mut(1).unwrap();
            let tempo = Event::from_bytes(&[0xFF, 0x51, 0x03, 0x0F, 0x42, 0x40]);
            track.add_event_pulses(tempo, 0).unwrap();
            let note_on = Event::new_from_three_bytes(0x90, 0x3C, 0x7F).unwrap();
            track.add_event_pulses(note_on, 192).unwrap();
        }
        let note = song.track(1).unwrap().get_event_by_number(2).unwrap();
        assert!((note.time_seconds().unwrap() - 2.0).abs() < 1e-9);

        let second_tempo = Event::from_bytes(&[0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20]);
        song.track_mut(1)
            .unwrap()
            .add_event_pulses(second_tempo, 96)
            .unwrap();
        let note = song.track(1).unwrap().get_event_by_number(3).unwrap();
        assert!((note.time_seconds().unwrap() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn s5_out_of_order_insert() {
        let mut song = Song::new();
        song.add_track();
        let mut track = song.track_mut(1).unwrap();
        track
            .add_event_pulses(Event::new_from_one_byte(0x90).unwrap(), 10)
            .unwrap();
        track
            .add_event_pulses(Event::new_from_one_byte(0x90).unwrap(), 30)
            .unwrap();
        track
            .add_event_pulses(Event::new_from_one_byte(0x90).unwrap(), 20)
            .unwrap();

        let pulses: Vec<i64> = track.events().iter().map(|e| e.time_pulses().unwrap()).collect();
        let deltas: Vec<i64> = track
            .events()
            .iter()
            .map(|e| e.delta_time_pulses().unwrap())
            .collect();
        let numbers: Vec<u32> = track.events().iter().map(|e| e.event_number().unwrap()).collect();
        assert_eq!(pulses, vec![10, 20, 30]);
        assert_eq!(deltas, vec![10, 10, 10]);
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn s6_eot_auto_removal() {
        let mut song = Song::new();
        song.add_track();
        let mut track = song.track_mut(1).unwrap();
        track.add_eot_pulses(100).unwrap();
        track
            .add_event_pulses(Event::new_from_one_byte(0x90).unwrap(), 200)
            .unwrap();
        assert_eq!(track.events_len(), 1);
        let last = track.get_last_event().unwrap();
        assert!(!last.is_eot());
        assert_eq!(last.time_pulses(), Some(200));
    }

    #[test]
    fn s7_seek_idempotence() {
        let mut song = Song::new();
        song.add_track();
        {
            let mut track = song.track_mut(1).unwrap();
            track
                .add_event_pulses(Event::new_from_one_byte(0x90).unwrap(), 0)
                .unwrap();
            // One quarter note at the default 120 BPM tempo lands exactly
            // on 0.5 seconds.
            track
                .add_event_pulses(Event::new_from_one_byte(0x90).unwrap(), 120)
                .unwrap();
        }
        song.seek_to_seconds(0.5).unwrap();
        let before = song.last_seek_position();
        song.seek_to_seconds(0.5).unwrap();
        assert_eq!(song.last_seek_position(), before);

        song.get_next_event();
        assert_eq!(song.last_seek_position(), None);
    }

    #[test]
    fn s8_three_byte_constructor_rejects_bad_status() {
        assert!(Event::new_from_three_bytes(0x40, 0x3C, 0x7F).is_err());
        assert!(Event::new_from_three_bytes(0x90, 0x80, 0x7F).is_err());
    }

    #[test]
    fn removing_then_readding_restores_deltas() {
        let mut song = Song::new();
        song.add_track();
        {
            let mut track = song.track_mut(1).unwrap();
            track
                .add_event_pulses(Event::new_from_one_byte(0x90).unwrap(), 0)
                .unwrap();
            track
                .add_event_pulses(Event::new_from_one_byte(0x90).unwrap(), 10)
                .unwrap();
            track
                .add_event_pulses(Event::new_from_one_byte(0x90).unwrap(), 20)
                .unwrap();
        }
        song.track_mut(1).unwrap().remove_event(2).unwrap();
        let track = song.track(1).unwrap();
        let pulses: Vec<i64> = track.events().iter().map(|e| e.time_pulses().unwrap()).collect();
        let deltas: Vec<i64> = track
            .events()
            .iter()
            .map(|e| e.delta_time_pulses().unwrap())
            .collect();
        assert_eq!(pulses, vec![0, 20]);
        assert_eq!(deltas, vec![0, 20]);
    }
}

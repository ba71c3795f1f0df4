use crate::event::Event;

/// An ordered sequence of events belonging to one song.
///
/// A `Track` has no mutating API of its own: every add/remove operation
/// crosses into the owning [`Song`](crate::song::Song), because adding or
/// removing a tempo-bearing event can force a tempo-map rebuild that
/// touches every other track. A detached `Track` (not yet added to a song)
/// is therefore always empty; events can only be created once
/// [`Song::add_track`](crate::song::Song::add_track) has attached it.
#[derive(Debug, Clone)]
pub struct Track {
    track_number: Option<u32>,
    events: Vec<Event>,
    next_event_number: Option<u32>,
    time_of_next_event: Option<i64>,
}

impl Track {
    pub(crate) fn new() -> Track {
        Track {
            track_number: None,
            events: Vec::new(),
            next_event_number: None,
            time_of_next_event: None,
        }
    }

    /// 1-based track number, or `None` if not (yet) attached to a song.
    pub fn track_number(&self) -> Option<u32> {
        self.track_number
    }

    pub fn is_attached(&self) -> bool {
        self.track_number.is_some()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn events_len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// O(1) lookup by 1-based position.
    pub fn get_event_by_number(&self, event_number: u32) -> Option<&Event> {
        event_number
            .checked_sub(1)
            .and_then(|idx| self.events.get(idx as usize))
    }

    pub fn get_last_event(&self) -> Option<&Event> {
        self.events.last()
    }

    /// Cursor position: 1-based index of the next event [`get_next_event`](Track::get_next_event)
    /// would return, or `None` when the cursor is exhausted.
    pub fn next_event_number(&self) -> Option<u32> {
        self.next_event_number
    }

    /// Pulses coordinate of the event at `next_event_number`, cached so
    /// [`find_next_track`](crate::song::Song::find_next_track) can compare
    /// tracks without dereferencing into each one's event list.
    pub fn time_of_next_event(&self) -> Option<i64> {
        self.time_of_next_event
    }

    pub(crate) fn set_track_number(&mut self, track_number: Option<u32>) {
        self.track_number = track_number;
    }

    pub(crate) fn events_mut(&mut self) -> &mut Vec<Event> {
        &mut self.events
    }

    pub(crate) fn rewind(&mut self) {
        match self.events.first() {
            Some(first) => {
                self.next_event_number = Some(1);
                self.time_of_next_event = first.time_pulses;
            }
            None => {
                self.next_event_number = None;
                self.time_of_next_event = None;
            }
        }
    }

    /// The event at [`next_event_number`](Track::next_event_number), without
    /// advancing. `None` once the cursor is exhausted (§4.3 Navigation).
    pub fn peek_next_event(&self) -> Option<&Event> {
        self.next_event_number
            .and_then(|n| self.get_event_by_number(n))
    }

    /// Returns the event at [`next_event_number`](Track::next_event_number)
    /// and advances this track's own cursor past it, independent of any
    /// other track — the single-track counterpart to
    /// [`Song::get_next_event`](crate::song::Song::get_next_event)'s
    /// multi-track merge (§4.3 Navigation).
    pub fn get_next_event(&mut self) -> Option<Event> {
        let event = self.peek_next_event().cloned();
        self.advance_cursor();
        event
    }

    pub(crate) fn advance_cursor(&mut self) {
        let current = match self.next_event_number {
            Some(n) => n,
            None => return,
        };
        match self.get_event_by_number(current + 1) {
            Some(next) => {
                self.next_event_number = Some(current + 1);
                self.time_of_next_event = next.time_pulses;
            }
            None => {
                self.next_event_number = None;
                self.time_of_next_event = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_track_is_detached_and_empty() {
        let t = Track::new();
        assert!(!t.is_attached());
        assert!(t.is_empty());
        assert_eq!(t.get_last_event(), None);
    }

    #[test]
    fn rewind_on_empty_track_sets_sentinel() {
        let mut t = Track::new();
        t.rewind();
        assert_eq!(t.next_event_number(), None);
        assert_eq!(t.time_of_next_event(), None);
    }

    #[test]
    fn get_event_by_number_is_one_based() {
        let mut t = Track::new();
        let mut e0 = Event::from_bytes(&[0x90, 0x3C, 0x7F]);
        e0.event_number = Some(1);
        e0.time_pulses = Some(10);
        t.events_mut().push(e0);
        assert!(t.get_event_by_number(0).is_none());
        assert_eq!(t.get_event_by_number(1).unwrap().time_pulses(), Some(10));
        assert!(t.get_event_by_number(2).is_none());
    }

    fn push_event(t: &mut Track, pulses: i64, number: u32) {
        let mut e = Event::from_bytes(&[0x90, 0x3C, 0x7F]);
        e.event_number = Some(number);
        e.time_pulses = Some(pulses);
        t.events_mut().push(e);
    }

    #[test]
    fn single_track_navigation_advances_independently_of_a_merge_cursor() {
        let mut t = Track::new();
        push_event(&mut t, 0, 1);
        push_event(&mut t, 10, 2);
        t.rewind();

        assert_eq!(t.peek_next_event().unwrap().time_pulses(), Some(0));
        assert_eq!(t.peek_next_event().unwrap().time_pulses(), Some(0));

        let first = t.get_next_event().unwrap();
        assert_eq!(first.time_pulses(), Some(0));
        assert_eq!(t.peek_next_event().unwrap().time_pulses(), Some(10));

        let second = t.get_next_event().unwrap();
        assert_eq!(second.time_pulses(), Some(10));

        assert_eq!(t.peek_next_event(), None);
        assert_eq!(t.get_next_event(), None);
        assert_eq!(t.next_event_number(), None);
    }
}

use crate::error::{InvalidDataByte, InvalidStatus, LibResult};
use crate::status;

/// A single normalized MIDI message, plus the timing coordinates it carries
/// once attached to a [`Track`](crate::track::Track).
///
/// A freshly constructed `Event` is detached: all four time fields are
/// `None` and [`track_number`](Event::track_number) is `None`. Attachment
/// happens only through [`Song`](crate::song::Song)'s add operations, which
/// fill in `event_number`, `delta_time_pulses`, `time_pulses`,
/// `time_seconds`, and `track_number` together.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    buf: Vec<u8>,
    pub(crate) event_number: Option<u32>,
    pub(crate) delta_time_pulses: Option<i64>,
    pub(crate) time_pulses: Option<i64>,
    pub(crate) time_seconds: Option<f64>,
    pub(crate) track_number: Option<u32>,
}

impl Event {
    fn detached(buf: Vec<u8>) -> Event {
        Event {
            buf,
            event_number: None,
            delta_time_pulses: None,
            time_pulses: None,
            time_seconds: None,
            track_number: None,
        }
    }

    /// An empty event with no payload bytes. The caller fills
    /// [`buffer_mut`](Event::buffer_mut) before attaching it.
    pub fn new() -> Event {
        Event::detached(Vec::new())
    }

    /// Copies `bytes` into a new detached event. No validation is performed;
    /// use the `new_from_*_bytes` constructors when the caller wants status
    /// byte validation.
    pub fn from_bytes(bytes: &[u8]) -> Event {
        Event::detached(bytes.to_vec())
    }

    /// Builds a one-byte event. `status` must be a status byte (`>= 0x80`).
    pub fn new_from_one_byte(status: u8) -> LibResult<Event> {
        check_status(status)?;
        Ok(Event::detached(vec![status]))
    }

    /// Builds a two-byte event. `data` must not itself be a status byte.
    pub fn new_from_two_bytes(status: u8, data: u8) -> LibResult<Event> {
        check_status(status)?;
        check_data(data)?;
        Ok(Event::detached(vec![status, data]))
    }

    /// Builds a three-byte event. Neither `data1` nor `data2` may be a
    /// status byte.
    pub fn new_from_three_bytes(status: u8, data1: u8, data2: u8) -> LibResult<Event> {
        check_status(status)?;
        check_data(data1)?;
        check_data(data2)?;
        Ok(Event::detached(vec![status, data1, data2]))
    }

    /// The raw message bytes: status byte first, no running status, no SMF
    /// variable-length sysex length prefix.
    pub fn buffer(&self) -> &[u8] {
        &self.buf
    }

    /// Mutable access to the payload, for the caller-filled construction
    /// variant. Only meaningful before the event is attached.
    pub fn buffer_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }

    /// `true` once this event has been attached to a track by one of
    /// `Song`'s add operations.
    pub fn is_attached(&self) -> bool {
        self.event_number.is_some()
    }

    /// 1-based position within its track, or `None` if detached.
    pub fn event_number(&self) -> Option<u32> {
        self.event_number
    }

    pub fn delta_time_pulses(&self) -> Option<i64> {
        self.delta_time_pulses
    }

    pub fn time_pulses(&self) -> Option<i64> {
        self.time_pulses
    }

    pub fn time_seconds(&self) -> Option<f64> {
        self.time_seconds
    }

    /// Cached copy of the owning track's number. Kept in sync by
    /// [`Song::remove_track`](crate::song::Song::remove_track) renumbering.
    pub fn track_number(&self) -> Option<u32> {
        self.track_number
    }

    pub fn is_sysex(&self) -> bool {
        status::is_sysex(&self.buf)
    }

    pub fn is_metadata(&self) -> bool {
        status::is_metadata(&self.buf)
    }

    pub fn is_eot(&self) -> bool {
        status::is_eot(&self.buf)
    }

    pub fn is_tempo_change(&self) -> bool {
        status::is_tempo_change(&self.buf)
    }

    pub fn is_time_signature(&self) -> bool {
        status::is_time_signature(&self.buf)
    }

    pub(crate) fn is_tempo_map_event(&self) -> bool {
        status::is_tempo_map_event(&self.buf)
    }

    pub(crate) fn eot() -> Event {
        Event::detached(vec![status::META_EVENT, 0x2F, 0x00])
    }
}

impl Default for Event {
    fn default() -> Event {
        Event::new()
    }
}

fn check_status(b: u8) -> LibResult<()> {
    if !status::is_status_byte(b) {
        return InvalidStatus {
            site: site!(),
            byte: b as i32,
        }
        .fail();
    }
    Ok(())
}

fn check_data(b: u8) -> LibResult<()> {
    if status::is_status_byte(b) {
        return InvalidDataByte {
            site: site!(),
            byte: b as i32,
        }
        .fail();
    }
    Ok(())
}

/*!
An in-memory model of a Standard MIDI File song: tracks, events, the tempo
map that converts between pulses and seconds, and a multi-track playback
cursor.

This crate does not read or write `.mid` files, decode events into
human-readable text, or drive real-time playback — it models the song and
leaves those concerns to the loader, saver, and sequencer built on top of
it. See [`song`] for the boundary contract a conforming loader/saver must
respect.
!*/

#[macro_use]
mod error;

pub mod event;
pub mod song;
pub mod status;
pub mod tempo;
pub mod track;

pub use error::{Error, Result};
pub use event::Event;
pub use song::{SmpteDivision, Song, TrackHandle};
pub use tempo::{TempoMap, TempoPoint};
pub use track::Track;

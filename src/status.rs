/*!
Pure predicates over a MIDI status byte or a normalized event buffer.

These are the only place in the crate that interprets MIDI bytes; everything
above this module works in terms of these classifications plus the pulses
and seconds timeline, never in terms of full channel-voice message
semantics (no-goal: "no interpretation of MIDI semantics beyond
distinguishing status classes and the two tempo-bearing metaevents").
!*/

/// `0xFF`: marks a metaevent in the in-memory buffer format (file-format
/// escaping of `0xFF` as a System Reset realtime message is a loader/saver
/// concern, out of scope here).
pub(crate) const META_EVENT: u8 = 0xFF;

/// `0x2F`: End-of-Track meta type byte.
pub(crate) const META_TYPE_EOT: u8 = 0x2F;

/// `0x51`: Set Tempo meta type byte.
pub(crate) const META_TYPE_TEMPO: u8 = 0x51;

/// `0x58`: Time Signature meta type byte.
pub(crate) const META_TYPE_TIME_SIGNATURE: u8 = 0x58;

/// Returns `true` if `b` is a status byte (as opposed to a data byte).
pub fn is_status_byte(b: u8) -> bool {
    b >= 0x80
}

/// Returns `true` if `b` is a System Realtime status (`0xF8..=0xFF`).
pub fn is_realtime_status(b: u8) -> bool {
    (0xF8..=0xFF).contains(&b)
}

/// Returns `true` if `b` is a System Common status (`0xF1..=0xF7`). Note
/// that `0xFF` is a metaevent marker in-memory, not a System Common status;
/// callers should check [`is_metadata`] first.
pub fn is_common_status(b: u8) -> bool {
    (0xF1..=0xF7).contains(&b)
}

/// Returns `true` if the event buffer is a SysEx message (`F0` or `F7`
/// form). The SMF length prefix is never present in the in-memory buffer.
pub fn is_sysex(buf: &[u8]) -> bool {
    matches!(buf.first(), Some(0xF0) | Some(0xF7))
}

/// Returns `true` if the event buffer is a metaevent (`FF <type> ...`).
pub fn is_metadata(buf: &[u8]) -> bool {
    buf.first() == Some(&META_EVENT) && buf.len() >= 2
}

/// Returns `true` if the event buffer is an End-of-Track metaevent
/// (`FF 2F 00`).
pub fn is_eot(buf: &[u8]) -> bool {
    is_metadata(buf) && buf[1] == META_TYPE_EOT
}

/// Returns `true` if the event buffer is a Set Tempo metaevent
/// (`FF 51 03 tttttt`).
pub fn is_tempo_change(buf: &[u8]) -> bool {
    is_metadata(buf) && buf[1] == META_TYPE_TEMPO
}

/// Returns `true` if the event buffer is a Time Signature metaevent
/// (`FF 58 04 nn dd cc bb`).
pub fn is_time_signature(buf: &[u8]) -> bool {
    is_metadata(buf) && buf[1] == META_TYPE_TIME_SIGNATURE
}

/// Returns `true` if the event buffer is either a tempo change or a time
/// signature change — the two metaevents the tempo map observes.
pub fn is_tempo_map_event(buf: &[u8]) -> bool {
    is_tempo_change(buf) || is_time_signature(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_byte_classification() {
        assert!(!is_status_byte(0x00));
        assert!(!is_status_byte(0x7F));
        assert!(is_status_byte(0x80));
        assert!(is_status_byte(0xFF));
    }

    #[test]
    fn realtime_and_common() {
        assert!(is_realtime_status(0xF8));
        assert!(is_realtime_status(0xFF));
        assert!(!is_realtime_status(0xF7));

        assert!(is_common_status(0xF1));
        assert!(is_common_status(0xF7));
        assert!(!is_common_status(0xF8));
    }

    #[test]
    fn sysex_classification() {
        assert!(is_sysex(&[0xF0, 0x41, 0xF7]));
        assert!(is_sysex(&[0xF7, 0x41]));
        assert!(!is_sysex(&[0x90, 0x40, 0x7F]));
    }

    #[test]
    fn metadata_and_eot() {
        assert!(is_metadata(&[0xFF, 0x2F, 0x00]));
        assert!(!is_metadata(&[0xFF]));
        assert!(!is_metadata(&[0x90, 0x40, 0x7F]));

        assert!(is_eot(&[0xFF, 0x2F, 0x00]));
        assert!(!is_eot(&[0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20]));
    }

    #[test]
    fn tempo_and_time_signature() {
        let tempo = [0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20];
        let time_sig = [0xFF, 0x58, 0x04, 0x04, 0x02, 0x18, 0x08];
        assert!(is_tempo_change(&tempo));
        assert!(!is_time_signature(&tempo));
        assert!(is_time_signature(&time_sig));
        assert!(!is_tempo_change(&time_sig));
        assert!(is_tempo_map_event(&tempo));
        assert!(is_tempo_map_event(&time_sig));
        assert!(!is_tempo_map_event(&[0x90, 0x40, 0x7F]));
    }
}

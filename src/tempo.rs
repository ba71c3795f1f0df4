use crate::status;

/// Default tempo and time signature assumed wherever the song has no
/// tempo-change or time-signature metaevent at pulses 0 (§4.4).
const DEFAULT_MICROSECONDS_PER_QUARTER: u32 = 500_000;
const DEFAULT_NUMERATOR: u8 = 4;
const DEFAULT_DENOMINATOR: u8 = 4;
const DEFAULT_CLOCKS_PER_CLICK: u8 = 8;
const DEFAULT_NOTES_PER_NOTE: u8 = 8;

/// One point on the tempo map: the tempo and time signature in effect from
/// `time_pulses`/`time_seconds` until the next point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoPoint {
    pub time_pulses: i64,
    pub time_seconds: f64,
    pub microseconds_per_quarter_note: u32,
    pub numerator: u8,
    pub denominator: u8,
    pub clocks_per_click: u8,
    pub notes_per_note: u8,
}

impl TempoPoint {
    fn default_at_origin() -> TempoPoint {
        TempoPoint {
            time_pulses: 0,
            time_seconds: 0.0,
            microseconds_per_quarter_note: DEFAULT_MICROSECONDS_PER_QUARTER,
            numerator: DEFAULT_NUMERATOR,
            denominator: DEFAULT_DENOMINATOR,
            clocks_per_click: DEFAULT_CLOCKS_PER_CLICK,
            notes_per_note: DEFAULT_NOTES_PER_NOTE,
        }
    }

    /// Builds the point that would be in effect after observing `buf` (a
    /// tempo-change and/or time-signature metaevent) at `(pulses, seconds)`,
    /// inheriting every field `buf` doesn't touch from `prev`.
    fn derive(prev: &TempoPoint, buf: &[u8], pulses: i64, seconds: f64) -> TempoPoint {
        let mut point = *prev;
        point.time_pulses = pulses;
        point.time_seconds = seconds;
        if status::is_tempo_change(buf) && buf.len() >= 6 {
            point.microseconds_per_quarter_note =
                u32::from(buf[3]) << 16 | u32::from(buf[4]) << 8 | u32::from(buf[5]);
        }
        if status::is_time_signature(buf) && buf.len() >= 7 {
            point.numerator = buf[3];
            point.denominator = 1u8.checked_shl(u32::from(buf[4])).unwrap_or(0);
            point.clocks_per_click = buf[5];
            point.notes_per_note = buf[6];
        }
        point
    }
}

/// Ordered sequence of tempo points, maintained so pulses↔seconds
/// conversion is a binary search on whichever axis the caller has.
#[derive(Debug, Clone)]
pub struct TempoMap {
    points: Vec<TempoPoint>,
}

impl TempoMap {
    pub(crate) fn new() -> TempoMap {
        TempoMap {
            points: vec![TempoPoint::default_at_origin()],
        }
    }

    pub(crate) fn reset(&mut self) {
        self.points.clear();
        self.points.push(TempoPoint::default_at_origin());
    }

    /// Folds one tempo/time-signature metaevent into the map: merges into
    /// the last point if it shares its pulses coordinate (last-wins within
    /// a pulse, since callers observe events in chronological,
    /// event_number-ordered sequence), otherwise appends a new point. This
    /// is both the O(1) incremental path (called once per add, at the
    /// song's current tail) and the per-step operation of a full rebuild.
    pub(crate) fn observe_event(&mut self, buf: &[u8], pulses: i64, ppqn: u16) {
        let seconds = self.pulses_to_seconds(pulses, ppqn);
        let prev = *self.points.last().expect("tempo map is never empty");
        let point = TempoPoint::derive(&prev, buf, pulses, seconds);
        if prev.time_pulses == pulses {
            *self.points.last_mut().unwrap() = point;
        } else {
            self.points.push(point);
        }
    }

    /// Drops the last point if it sits exactly at `pulses`, used when the
    /// event that produced it was removed from the song while still being
    /// the globally-last event. The synthetic origin point is never
    /// dropped.
    pub(crate) fn drop_last_point_if_pulses(&mut self, pulses: i64) {
        if self.points.len() > 1 && self.points.last().unwrap().time_pulses == pulses {
            self.points.pop();
        }
    }

    fn point_before_or_at_pulses(&self, pulses: i64) -> &TempoPoint {
        let idx = self.points.partition_point(|p| p.time_pulses <= pulses);
        &self.points[idx.max(1) - 1]
    }

    fn point_before_or_at_seconds(&self, seconds: f64) -> &TempoPoint {
        let idx = self
            .points
            .partition_point(|p| p.time_seconds <= seconds);
        &self.points[idx.max(1) - 1]
    }

    fn seconds_per_pulse(point: &TempoPoint, ppqn: u16) -> f64 {
        f64::from(point.microseconds_per_quarter_note) / (1_000_000.0 * f64::from(ppqn))
    }

    pub fn pulses_to_seconds(&self, pulses: i64, ppqn: u16) -> f64 {
        let t = self.point_before_or_at_pulses(pulses);
        t.time_seconds + (pulses - t.time_pulses) as f64 * Self::seconds_per_pulse(t, ppqn)
    }

    pub fn seconds_to_pulses(&self, seconds: f64, ppqn: u16) -> i64 {
        let t = self.point_before_or_at_seconds(seconds);
        let per_pulse = Self::seconds_per_pulse(t, ppqn);
        t.time_pulses + ((seconds - t.time_seconds) / per_pulse).round() as i64
    }

    pub fn tempo_at_pulses(&self, pulses: i64) -> &TempoPoint {
        self.point_before_or_at_pulses(pulses)
    }

    pub fn tempo_at_seconds(&self, seconds: f64) -> &TempoPoint {
        self.point_before_or_at_seconds(seconds)
    }

    /// 1-based lookup, mirroring `Track::get_event_by_number`.
    pub fn tempo_by_number(&self, number: u32) -> Option<&TempoPoint> {
        number
            .checked_sub(1)
            .and_then(|idx| self.points.get(idx as usize))
    }

    pub fn last_tempo(&self) -> &TempoPoint {
        self.points.last().expect("tempo map is never empty")
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Default for TempoMap {
    fn default() -> TempoMap {
        TempoMap::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_map_is_120_bpm_common_time() {
        let map = TempoMap::new();
        let t = map.last_tempo();
        assert_eq!(t.microseconds_per_quarter_note, 500_000);
        assert_eq!(t.numerator, 4);
        assert_eq!(t.denominator, 4);
    }

    #[test]
    fn pulses_to_seconds_at_default_tempo() {
        let map = TempoMap::new();
        assert!((map.pulses_to_seconds(96, 96) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn observe_tempo_change_then_convert() {
        let mut map = TempoMap::new();
        // 60 BPM (1,000,000 us/quarter) effective at pulses 0.
        map.observe_event(&[0xFF, 0x51, 0x03, 0x0F, 0x42, 0x40], 0, 96);
        assert!((map.pulses_to_seconds(192, 96) - 2.0).abs() < 1e-9);

        // 120 BPM from pulses 96 onward.
        map.observe_event(&[0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20], 96, 96);
        assert!((map.pulses_to_seconds(192, 96) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn coincident_tempo_and_time_signature_merge() {
        let mut map = TempoMap::new();
        map.observe_event(&[0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20], 0, 96);
        map.observe_event(&[0xFF, 0x58, 0x04, 0x03, 0x03, 0x18, 0x08], 0, 96);
        assert_eq!(map.len(), 1);
        let t = map.last_tempo();
        assert_eq!(t.microseconds_per_quarter_note, 500_000);
        assert_eq!(t.numerator, 3);
        assert_eq!(t.denominator, 8);
    }

    #[test]
    fn seconds_to_pulses_round_trips() {
        let mut map = TempoMap::new();
        map.observe_event(&[0xFF, 0x51, 0x03, 0x0F, 0x42, 0x40], 0, 96);
        let seconds = map.pulses_to_seconds(192, 96);
        assert_eq!(map.seconds_to_pulses(seconds, 96), 192);
    }
}

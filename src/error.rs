use snafu::Snafu;

/// The public Error type for this crate.
#[derive(Debug, Snafu)]
pub struct Error(LibError);

/// The public Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

impl From<LibError> for Error {
    fn from(err: LibError) -> Error {
        Error(err)
    }
}

/// The internal Result type for this crate.
pub(crate) type LibResult<T> = std::result::Result<T, LibError>;

/// The internal Error type for this crate. One variant per error kind named
/// in the error handling design: allocation failure, malformed event
/// construction, header/format conflicts, out-of-order EOT placement,
/// seeking past the end of the song, and attachment-contract violations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub(crate) enum LibError {
    #[snafu(display("{}: allocation failed", site))]
    OutOfMemory { site: String },

    #[snafu(display(
        "{}: invalid status byte {:#04X}, the first byte of an event must be >= 0x80",
        site,
        byte
    ))]
    InvalidStatus { site: String, byte: i32 },

    #[snafu(display(
        "{}: invalid data byte {:#04X}, bytes after the first must be < 0x80",
        site,
        byte
    ))]
    InvalidDataByte { site: String, byte: i32 },

    #[snafu(display(
        "{}: cannot set format to 0 while the song has {} tracks",
        site,
        number_of_tracks
    ))]
    FormatConflict { site: String, number_of_tracks: usize },

    #[snafu(display(
        "{}: cannot add End-of-Track at {}, which precedes the current last event",
        site,
        requested
    ))]
    EotOutOfOrder { site: String, requested: String },

    #[snafu(display("{}: seek target {} is past the end of the song", site, target))]
    SeekPastEnd { site: String, target: String },

    #[snafu(display("{}: event is already attached to a track", site))]
    AlreadyAttached { site: String },

    #[snafu(display("{}: no track numbered {}", site, track_number))]
    NoSuchTrack { site: String, track_number: u32 },

    #[snafu(display("{}: no event numbered {}", site, event_number))]
    NoSuchEvent { site: String, event_number: u32 },
}

macro_rules! site {
    () => {
        format!("{}:{}", file!(), line!())
    };
}

#[test]
fn site_test() {
    let line = line!() + 1;
    let site = site!();
    assert!(site.contains("error.rs"));
    assert!(site.contains(format!("{}", line).as_str()));
}

#[test]
fn format_conflict_display() {
    let err = FormatConflict {
        site: site!(),
        number_of_tracks: 3usize,
    }
    .build();
    let message = format!("{}", err);
    assert!(message.contains("3 tracks"));
}

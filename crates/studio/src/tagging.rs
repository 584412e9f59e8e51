//! ID3 tagging and duration measurement for episode audio.
//!
//! Tags are written as ID3v2.4 in front of the audio frames. Any ID3v2 tags
//! already at the start of the stream are dropped first so repeated downloads
//! never stack tags; the audio frames after them are copied unchanged.

use std::io::Cursor;

use chrono::{DateTime, Datelike, Utc};
use id3::frame::Comment;
use id3::{Tag, TagLike, Timestamp, Version};
use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::{Result, StudioError};

/// Size of an ID3v2 header or footer.
const ID3V2_HEADER_LEN: usize = 10;

/// Footer-present flag in the ID3v2 header.
const ID3V2_FOOTER_FLAG: u8 = 0x10;

/// Metadata written into a downloaded episode.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeTags {
    pub title: String,
    pub episode_number: i64,
    pub description: Option<String>,
    /// Used as artist and album.
    pub show_name: String,
    pub duration_secs: Option<i64>,
    /// Written as the recording date (TDRC).
    pub recorded_at: DateTime<Utc>,
}

/// Prepend an ID3v2.4 tag to `audio`, replacing any leading ID3v2 tags.
pub fn tag_audio(audio: &[u8], tags: &EpisodeTags) -> Result<Vec<u8>> {
    let frames = strip_leading_id3(audio);

    let mut tag = Tag::new();
    tag.set_title(tags.title.as_str());
    tag.set_artist(tags.show_name.as_str());
    tag.set_album(tags.show_name.as_str());
    tag.set_album_artist(tags.show_name.as_str());
    tag.set_genre("Podcast");
    if let Ok(track) = u32::try_from(tags.episode_number) {
        tag.set_track(track);
    }
    tag.set_date_recorded(Timestamp {
        year: tags.recorded_at.year(),
        month: u8::try_from(tags.recorded_at.month()).ok(),
        day: u8::try_from(tags.recorded_at.day()).ok(),
        hour: None,
        minute: None,
        second: None,
    });
    if let Some(secs) = tags.duration_secs.filter(|secs| *secs > 0) {
        if let Ok(millis) = u32::try_from(secs.saturating_mul(1000)) {
            tag.set_duration(millis);
        }
    }
    if let Some(description) = tags.description.as_deref().filter(|d| !d.trim().is_empty()) {
        tag.add_frame(Comment {
            lang: "spa".to_string(),
            description: String::new(),
            text: description.to_string(),
        });
    }

    let mut out = Vec::with_capacity(frames.len() + 1024);
    tag.write_to(&mut out, Version::Id3v24)
        .map_err(|e| StudioError::Internal(format!("failed to write ID3 tag: {}", e)))?;
    out.extend_from_slice(frames);
    Ok(out)
}

/// Slice of `audio` after every leading ID3v2 tag.
pub fn strip_leading_id3(audio: &[u8]) -> &[u8] {
    let mut rest = audio;
    while let Some(len) = id3v2_tag_len(rest) {
        if len > rest.len() {
            // Truncated tag; leave the bytes alone rather than guess.
            break;
        }
        rest = &rest[len..];
    }
    rest
}

/// Total length of an ID3v2 tag at the start of `bytes`, header included.
fn id3v2_tag_len(bytes: &[u8]) -> Option<usize> {
    if bytes.len() < ID3V2_HEADER_LEN || &bytes[..3] != b"ID3" {
        return None;
    }

    // Body size is a 28-bit syncsafe integer; each byte must have its top bit clear.
    let size_bytes = &bytes[6..10];
    if size_bytes.iter().any(|b| b & 0x80 != 0) {
        return None;
    }
    let body = size_bytes
        .iter()
        .fold(0usize, |acc, b| (acc << 7) | usize::from(*b));

    let footer = if bytes[5] & ID3V2_FOOTER_FLAG != 0 {
        ID3V2_HEADER_LEN
    } else {
        0
    };
    Some(ID3V2_HEADER_LEN + body + footer)
}

/// Measure the playing time of an MP3 stream, rounded to whole seconds.
///
/// Packet durations are summed over the whole stream. A Xing/Info frame count
/// only describes the first chunk of a concatenated stream, so it is ignored.
/// Returns `None` when the bytes are not a decodable stream.
pub fn measure_duration_secs(audio: &[u8]) -> Option<i64> {
    let source = Cursor::new(audio.to_vec());
    let stream = MediaSourceStream::new(Box::new(source), Default::default());

    let mut hint = Hint::new();
    hint.with_extension("mp3");

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            stream,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .ok()?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)?;
    let track_id = track.id;
    let time_base = track.codec_params.time_base;
    let sample_rate = track.codec_params.sample_rate;

    let mut frames = 0u64;
    while let Ok(packet) = format.next_packet() {
        if packet.track_id() == track_id {
            frames += packet.dur();
        }
    }
    if frames == 0 {
        return None;
    }

    let seconds = match (time_base, sample_rate) {
        (Some(time_base), _) => {
            let time = time_base.calc_time(frames);
            time.seconds as f64 + time.frac
        }
        (None, Some(rate)) if rate > 0 => frames as f64 / f64::from(rate),
        _ => return None,
    };

    Some(seconds.round() as i64)
}

use std::fs::File;
use std::path::Path;

use symphonia::core::codecs::{
    CodecType, CODEC_TYPE_PCM_ALAW, CODEC_TYPE_PCM_F32BE, CODEC_TYPE_PCM_F32LE,
    CODEC_TYPE_PCM_F64BE, CODEC_TYPE_PCM_F64LE, CODEC_TYPE_PCM_MULAW, CODEC_TYPE_PCM_S16BE,
    CODEC_TYPE_PCM_S16LE, CODEC_TYPE_PCM_S24BE, CODEC_TYPE_PCM_S24LE, CODEC_TYPE_PCM_S32BE,
    CODEC_TYPE_PCM_S32LE, CODEC_TYPE_PCM_S8, CODEC_TYPE_PCM_U16BE, CODEC_TYPE_PCM_U16LE,
    CODEC_TYPE_PCM_U24BE, CODEC_TYPE_PCM_U24LE, CODEC_TYPE_PCM_U32BE, CODEC_TYPE_PCM_U32LE,
    CODEC_TYPE_PCM_U8,
};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// File extension every catalog entry carries; song identities are the file
/// stems without it.
pub const SONG_EXTENSION: &str = "wav";

/// Everything a playback device needs to interpret the raw byte stream.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioFormat {
    pub encoding: String,
    pub sample_rate: f32,
    pub sample_bits: u16,
    pub channels: u16,
    pub frame_size: u16,
    pub frame_rate: f32,
    pub big_endian: bool,
}

/// The metadata needed to begin delivering one audio item: identity, where
/// its bytes live, and how they are encoded.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamableSong {
    pub name: String,
    pub path: String,
    pub format: AudioFormat,
}

impl AudioFormat {
    /// Derives the format descriptor by probing the container headers of the
    /// file at `path`. Fails when the file is absent or not decodable audio.
    pub fn probe(path: &Path) -> crate::Result<AudioFormat> {
        let file = File::open(path)?;
        let source = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(extension);
        }

        let probed = symphonia::default::get_probe().format(
            &hint,
            source,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )?;

        let track = probed
            .format
            .default_track()
            .ok_or("no audio track in file")?;
        let params = &track.codec_params;

        let sample_rate = params.sample_rate.ok_or("missing sample rate")? as f32;
        let sample_bits = params.bits_per_sample.ok_or("missing bit depth")? as u16;
        let channels = params.channels.ok_or("missing channel layout")?.count() as u16;

        Ok(AudioFormat {
            encoding: encoding_name(params.codec)?.to_string(),
            sample_rate,
            sample_bits,
            channels,
            frame_size: channels * sample_bits.div_ceil(8),
            frame_rate: sample_rate,
            big_endian: is_big_endian(params.codec),
        })
    }
}

fn encoding_name(codec: CodecType) -> crate::Result<&'static str> {
    match codec {
        CODEC_TYPE_PCM_S8 | CODEC_TYPE_PCM_S16LE | CODEC_TYPE_PCM_S16BE | CODEC_TYPE_PCM_S24LE
        | CODEC_TYPE_PCM_S24BE | CODEC_TYPE_PCM_S32LE | CODEC_TYPE_PCM_S32BE => Ok("PCM_SIGNED"),
        CODEC_TYPE_PCM_U8 | CODEC_TYPE_PCM_U16LE | CODEC_TYPE_PCM_U16BE | CODEC_TYPE_PCM_U24LE
        | CODEC_TYPE_PCM_U24BE | CODEC_TYPE_PCM_U32LE | CODEC_TYPE_PCM_U32BE => {
            Ok("PCM_UNSIGNED")
        }
        CODEC_TYPE_PCM_F32LE | CODEC_TYPE_PCM_F32BE | CODEC_TYPE_PCM_F64LE
        | CODEC_TYPE_PCM_F64BE => Ok("PCM_FLOAT"),
        CODEC_TYPE_PCM_MULAW => Ok("ULAW"),
        CODEC_TYPE_PCM_ALAW => Ok("ALAW"),
        other => Err(format!("unsupported audio codec: {:?}", other).into()),
    }
}

fn is_big_endian(codec: CodecType) -> bool {
    matches!(
        codec,
        CODEC_TYPE_PCM_S16BE
            | CODEC_TYPE_PCM_S24BE
            | CODEC_TYPE_PCM_S32BE
            | CODEC_TYPE_PCM_U16BE
            | CODEC_TYPE_PCM_U24BE
            | CODEC_TYPE_PCM_U32BE
            | CODEC_TYPE_PCM_F32BE
            | CODEC_TYPE_PCM_F64BE
    )
}

#[cfg(test)]
pub(crate) mod testing {
    /// Builds the bytes of a minimal 16-bit PCM WAV file.
    pub(crate) fn wav_bytes(sample_rate: u32, channels: u16, samples: &[i16]) -> Vec<u8> {
        let data_len = (samples.len() * 2) as u32;
        let byte_rate = sample_rate * u32::from(channels) * 2;
        let block_align = channels * 2;

        let mut out = Vec::with_capacity(44 + data_len as usize);
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(36 + data_len).to_le_bytes());
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes()); // PCM
        out.extend_from_slice(&channels.to_le_bytes());
        out.extend_from_slice(&sample_rate.to_le_bytes());
        out.extend_from_slice(&byte_rate.to_le_bytes());
        out.extend_from_slice(&block_align.to_le_bytes());
        out.extend_from_slice(&16u16.to_le_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&data_len.to_le_bytes());
        for sample in samples {
            out.extend_from_slice(&sample.to_le_bytes());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::testing::wav_bytes;
    use super::*;

    #[test]
    fn probe_mono_pcm_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        std::fs::write(&path, wav_bytes(44_100, 1, &[0, 128, -128, 512])).unwrap();

        let format = AudioFormat::probe(&path).unwrap();

        assert_eq!(format.encoding, "PCM_SIGNED");
        assert_eq!(format.sample_rate, 44_100.0);
        assert_eq!(format.sample_bits, 16);
        assert_eq!(format.channels, 1);
        assert_eq!(format.frame_size, 2);
        assert_eq!(format.frame_rate, 44_100.0);
        assert!(!format.big_endian);
    }

    #[test]
    fn probe_stereo_pcm_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        std::fs::write(&path, wav_bytes(22_050, 2, &[1, 2, 3, 4])).unwrap();

        let format = AudioFormat::probe(&path).unwrap();

        assert_eq!(format.channels, 2);
        assert_eq!(format.frame_size, 4);
        assert_eq!(format.sample_rate, 22_050.0);
    }

    #[test]
    fn probe_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AudioFormat::probe(&dir.path().join("nope.wav")).is_err());
    }

    #[test]
    fn probe_non_audio_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.wav");
        std::fs::write(&path, b"this is not audio").unwrap();

        assert!(AudioFormat::probe(&path).is_err());
    }
}

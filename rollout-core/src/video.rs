//! Frame capture and video output of episodes.
use crate::error::VideoError;
use ndarray::{Array3, ArrayD, Ix3};
use std::path::{Path, PathBuf};

/// Rendered frames of one episode.
///
/// Frames are `(H, W, C)` images with 3 (RGB) or 4 (RGBA) channels, all of
/// the same size as the first one.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    frames: Vec<Array3<u8>>,
}

impl FrameBuffer {
    /// Constructs an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a frame if it is a well-formed image.
    pub fn push(&mut self, frame: ArrayD<u8>) -> Result<(), VideoError> {
        let shape = frame.shape().to_vec();
        let frame = frame
            .into_dimensionality::<Ix3>()
            .map_err(|_| VideoError::MalformedFrame(format!("shape {:?}", shape)))?;
        let (h, w, c) = frame.dim();
        if h == 0 || w == 0 || !(c == 3 || c == 4) {
            return Err(VideoError::MalformedFrame(format!("shape {:?}", shape)));
        }
        if let Some(first) = self.frames.first() {
            if first.dim() != frame.dim() {
                return Err(VideoError::MalformedFrame(format!(
                    "shape {:?} differs from first frame {:?}",
                    shape,
                    first.dim()
                )));
            }
        }
        self.frames.push(frame);
        Ok(())
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// `true` if no frame was captured.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Iterates over the frames.
    pub fn iter(&self) -> std::slice::Iter<Array3<u8>> {
        self.frames.iter()
    }

    /// Drops all frames.
    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

/// Encodes frames into a video file.
pub trait VideoWriter {
    /// Writes `frames` to `path` at `fps` frames per second.
    fn write(&self, path: &Path, frames: &FrameBuffer, fps: u32) -> Result<(), VideoError>;
}

/// Returns the video backend compiled into the crate, if any.
pub fn default_video_writer() -> Option<Box<dyn VideoWriter>> {
    #[cfg(feature = "image")]
    {
        Some(Box::new(GifWriter))
    }
    #[cfg(not(feature = "image"))]
    {
        None
    }
}

/// Writes `frames` with `writer`, creating missing parent directories.
pub fn write_video(
    writer: &dyn VideoWriter,
    path: &Path,
    frames: &FrameBuffer,
    fps: u32,
) -> Result<(), VideoError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }
    writer.write(path, frames, fps)
}

/// Substitutes the episode index into a path template.
///
/// The first placeholder of the form `{}`, `{:d}`, `{:N}`, `{:0N}` or `{:0Nd}`
/// is replaced by `index`. With a width `N`, the index is zero-padded if the
/// `0` flag is given and space-padded otherwise. A template without a
/// placeholder gets `_{index}` appended to its file stem.
pub fn episode_path(template: &str, index: usize) -> PathBuf {
    if let Some(start) = template.find('{') {
        if let Some(len) = template[start..].find('}') {
            let spec = &template[start + 1..start + len];
            if let Some(formatted) = format_index(spec, index) {
                let mut s = template[..start].to_string();
                s.push_str(&formatted);
                s.push_str(&template[start + len + 1..]);
                return PathBuf::from(s);
            }
        }
    }

    let path = Path::new(template);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, index, ext.to_string_lossy()),
        None => format!("{}_{}", stem, index),
    };
    path.with_file_name(name)
}

/// Formats `index` by the part of a placeholder between the braces.
fn format_index(spec: &str, index: usize) -> Option<String> {
    if spec.is_empty() {
        return Some(index.to_string());
    }
    let spec = spec.strip_prefix(':')?;
    let spec = spec.strip_suffix('d').unwrap_or(spec);
    let (zero, digits) = match spec.strip_prefix('0') {
        Some(rest) => (true, rest),
        None => (false, spec),
    };
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let width = if digits.is_empty() {
        0
    } else {
        digits.parse::<usize>().ok()?
    };
    Some(if zero {
        format!("{:0width$}", index, width = width)
    } else {
        format!("{:>width$}", index, width = width)
    })
}

#[cfg(feature = "image")]
pub use gif::GifWriter;

#[cfg(feature = "image")]
mod gif {
    use super::{FrameBuffer, VideoWriter};
    use crate::error::VideoError;
    use image::{codecs::gif::GifEncoder, Delay, Frame, RgbaImage};
    use std::{fs::File, io::BufWriter, path::Path};

    /// Writes animated GIF files.
    pub struct GifWriter;

    impl VideoWriter for GifWriter {
        fn write(&self, path: &Path, frames: &FrameBuffer, fps: u32) -> Result<(), VideoError> {
            let delay = Delay::from_numer_denom_ms(1000, fps.max(1));
            let mut images = Vec::with_capacity(frames.len());
            for frame in frames.iter() {
                let (h, w, c) = frame.dim();
                let rgba: Vec<u8> = match c {
                    4 => frame.iter().cloned().collect(),
                    _ => frame
                        .outer_iter()
                        .flat_map(|row| {
                            row.outer_iter()
                                .flat_map(|px| vec![px[0], px[1], px[2], 255])
                                .collect::<Vec<_>>()
                        })
                        .collect(),
                };
                let img = RgbaImage::from_raw(w as u32, h as u32, rgba)
                    .ok_or_else(|| VideoError::MalformedFrame(format!("{:?}", (h, w, c))))?;
                images.push(Frame::from_parts(img, 0, 0, delay));
            }

            let res = {
                let file = BufWriter::new(File::create(path)?);
                let mut encoder = GifEncoder::new(file);
                encoder.encode_frames(images.into_iter())
            };
            if let Err(e) = res {
                // No partial artifact
                let _ = std::fs::remove_file(path);
                return Err(VideoError::Encode(e.to_string()));
            }
            Ok(())
        }
    }
}

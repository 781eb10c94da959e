//! Parse a pair of IDX binary files (images + labels) as used by MNIST and
//! EMNIST into samples.
//!
//! # IDX3 image file layout
//! ```text
//! bytes  0-3:   magic 2051  (big-endian i32)
//! bytes  4-7:   N           (number of images, big-endian i32)
//! bytes  8-11:  rows        (image height in pixels, big-endian i32)
//! bytes 12-15:  cols        (image width in pixels, big-endian i32)
//! bytes 16..:   N * rows * cols bytes, uint8, each image stored column-major
//! ```
//!
//! # IDX1 label file layout
//! ```text
//! bytes  0-3:   magic 2049  (big-endian i32)
//! bytes  4-7:   N           (number of labels, big-endian i32)
//! bytes  8..:   N bytes, each a class index in [0, classes)
//! ```

use std::fs;
use std::io::{self, Cursor, Read};
use std::path::Path;

use byteorder::{BigEndian, ReadBytesExt};
use log::info;

use crate::data::sample::{normalize_pixel, Sample};
use crate::error::{NetworkError, Result};

pub const IMAGE_MAGIC: i32 = 2051;
pub const LABEL_MAGIC: i32 = 2049;

/// Parses in-memory image and label files.
///
/// Pixels are reordered to row-major before normalization. A short payload
/// surfaces as an `Io` error of kind `UnexpectedEof`.
pub fn parse_idx_pair(image_bytes: &[u8], label_bytes: &[u8], classes: usize) -> Result<Vec<Sample>> {
    let mut images = Cursor::new(image_bytes);
    let mut labels = Cursor::new(label_bytes);

    let image_magic = images.read_i32::<BigEndian>()?;
    if image_magic != IMAGE_MAGIC {
        return Err(NetworkError::Format(format!(
            "image file magic number is {}, expected {}",
            image_magic, IMAGE_MAGIC
        )));
    }
    let n_images = read_count(&mut images, "image count")?;
    let height = read_count(&mut images, "row count")?;
    let width = read_count(&mut images, "column count")?;

    let label_magic = labels.read_i32::<BigEndian>()?;
    if label_magic != LABEL_MAGIC {
        return Err(NetworkError::Format(format!(
            "label file magic number is {}, expected {}",
            label_magic, LABEL_MAGIC
        )));
    }
    let n_labels = read_count(&mut labels, "label count")?;

    if n_labels != n_images {
        return Err(NetworkError::Format(format!(
            "image file declares {} items but label file declares {}",
            n_images, n_labels
        )));
    }
    if height == 0 || width == 0 {
        return Err(NetworkError::Format(format!(
            "image dimensions must be non-zero, got {}x{}",
            height, width
        )));
    }

    let n_pixels = height.checked_mul(width).ok_or_else(|| {
        NetworkError::Format(format!("image dimensions {}x{} overflow", height, width))
    })?;
    let payload = n_images.checked_mul(n_pixels).ok_or_else(|| {
        NetworkError::Format(format!("{} images of {} pixels overflow", n_images, n_pixels))
    })?;
    let image_left = image_bytes.len() - images.position() as usize;
    let label_left = label_bytes.len() - labels.position() as usize;
    if payload > image_left || n_labels > label_left {
        return Err(NetworkError::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!(
                "header declares {} pixel bytes and {} labels but only {} and {} are present",
                payload, n_labels, image_left, label_left
            ),
        )));
    }

    let mut raw = vec![0u8; n_pixels];
    let mut samples = Vec::with_capacity(n_images.min(1 << 20));
    for i in 0..n_images {
        images.read_exact(&mut raw)?;
        let label = labels.read_u8()? as usize;

        let mut inputs = vec![0.0; n_pixels];
        for row in 0..height {
            for col in 0..width {
                inputs[row * width + col] = normalize_pixel(raw[col * height + row] as f64);
            }
        }

        let sample = Sample::from_label(inputs, label, classes).map_err(|e| match e {
            NetworkError::Format(msg) => NetworkError::Format(format!("item {}: {}", i, msg)),
            other => other,
        })?;
        samples.push(sample);
    }

    Ok(samples)
}

/// Reads and parses an image/label file pair.
pub fn load_idx_pair<P: AsRef<Path>, Q: AsRef<Path>>(
    images_path: P,
    labels_path: Q,
    classes: usize,
) -> Result<Vec<Sample>> {
    let images_path = images_path.as_ref();
    let image_bytes = fs::read(images_path)?;
    let label_bytes = fs::read(labels_path.as_ref())?;
    let samples = parse_idx_pair(&image_bytes, &label_bytes, classes)?;
    info!("loaded {} samples from {}", samples.len(), images_path.display());
    Ok(samples)
}

fn read_count<R: Read>(reader: &mut R, what: &str) -> Result<usize> {
    let value = reader.read_i32::<BigEndian>()?;
    usize::try_from(value)
        .map_err(|_| NetworkError::Format(format!("{} is negative ({})", what, value)))
}

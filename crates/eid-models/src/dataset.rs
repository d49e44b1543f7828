//! Dataset readers backing the built-in capabilities.
//!
//! Each reader implements [`ItemSource`]: one `load` call decodes one full
//! pass over its files into items, in a stable order. Decoding failures
//! surface as `io::Error` so the dispatcher's bounded read-retry applies.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use eid_core::source::ItemSource;
use eid_model::Item;

/// Bytes per CIFAR-10 record: one label byte plus a 32x32 RGB image.
const CIFAR_RECORD_LEN: usize = 1 + CIFAR_IMAGE_LEN;
const CIFAR_IMAGE_LEN: usize = 32 * 32 * 3;
const CIFAR_BATCH_FILE: &str = "data_batch_1.bin";

/// IDX magic numbers: unsigned-byte tensors of rank 3 (images) and 1 (labels).
const IDX_IMAGES_MAGIC: u32 = 0x0000_0803;
const IDX_LABELS_MAGIC: u32 = 0x0000_0801;
const IDX_IMAGES_FILE: &str = "t10k-images-idx3-ubyte";
const IDX_LABELS_FILE: &str = "t10k-labels-idx1-ubyte";

fn bad_data(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

/// Reader for CIFAR-10 binary batch files (fixed 3073-byte records).
pub struct CifarRecordSource {
    path: PathBuf,
}

impl CifarRecordSource {
    /// Read `data_batch_1.bin` under the given dataset directory.
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(CIFAR_BATCH_FILE),
        }
    }

    /// Read an explicit batch file.
    pub fn from_file(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ItemSource for CifarRecordSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&mut self) -> io::Result<Vec<Item>> {
        let bytes = fs::read(&self.path)?;
        if bytes.is_empty() || bytes.len() % CIFAR_RECORD_LEN != 0 {
            return Err(bad_data(format!(
                "{}: {} bytes is not a whole number of {CIFAR_RECORD_LEN}-byte records",
                self.path.display(),
                bytes.len()
            )));
        }

        Ok(bytes
            .chunks_exact(CIFAR_RECORD_LEN)
            .map(|record| Item::labeled(record[1..].to_vec(), record[0]))
            .collect())
    }
}

/// Reader for an IDX image/label file pair (MNIST layout).
pub struct IdxPairSource {
    images: PathBuf,
    labels: PathBuf,
}

impl IdxPairSource {
    /// Read the test-set pair under the given dataset directory.
    pub fn new(dir: &Path) -> Self {
        Self {
            images: dir.join(IDX_IMAGES_FILE),
            labels: dir.join(IDX_LABELS_FILE),
        }
    }

    /// Read an explicit file pair.
    pub fn from_files(images: PathBuf, labels: PathBuf) -> Self {
        Self { images, labels }
    }
}

impl ItemSource for IdxPairSource {
    fn describe(&self) -> String {
        format!("{} + {}", self.images.display(), self.labels.display())
    }

    fn load(&mut self) -> io::Result<Vec<Item>> {
        let image_bytes = fs::read(&self.images)?;
        let label_bytes = fs::read(&self.labels)?;

        if image_bytes.len() < 16 || read_be_u32(&image_bytes, 0)? != IDX_IMAGES_MAGIC {
            return Err(bad_data(format!(
                "{}: not an IDX image file",
                self.images.display()
            )));
        }
        if label_bytes.len() < 8 || read_be_u32(&label_bytes, 0)? != IDX_LABELS_MAGIC {
            return Err(bad_data(format!(
                "{}: not an IDX label file",
                self.labels.display()
            )));
        }

        let count = read_be_u32(&image_bytes, 4)? as usize;
        let rows = read_be_u32(&image_bytes, 8)? as usize;
        let cols = read_be_u32(&image_bytes, 12)? as usize;
        let label_count = read_be_u32(&label_bytes, 4)? as usize;

        if count != label_count {
            return Err(bad_data(format!(
                "image/label count mismatch: {count} images vs {label_count} labels"
            )));
        }

        let pixels = &image_bytes[16..];
        let labels = &label_bytes[8..];
        let image_len = rows * cols;
        if pixels.len() != count * image_len || labels.len() != count {
            return Err(bad_data(
                "IDX payload length disagrees with header".to_string(),
            ));
        }

        Ok(pixels
            .chunks_exact(image_len)
            .zip(labels)
            .map(|(image, label)| Item::labeled(image.to_vec(), *label))
            .collect())
    }
}

fn read_be_u32(bytes: &[u8], offset: usize) -> io::Result<u32> {
    let end = offset + 4;
    let slice = bytes
        .get(offset..end)
        .ok_or_else(|| bad_data("truncated IDX header".to_string()))?;
    Ok(u32::from_be_bytes(slice.try_into().expect("4-byte slice")))
}

/// Reader yielding every regular file in a directory as one unlabeled
/// item, in file-name order.
pub struct DirSource {
    dir: PathBuf,
}

impl DirSource {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }
}

impl ItemSource for DirSource {
    fn describe(&self) -> String {
        self.dir.display().to_string()
    }

    fn load(&mut self) -> io::Result<Vec<Item>> {
        let mut files: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        files.sort();

        files
            .into_iter()
            .map(|path| fs::read(&path).map(Item::new))
            .collect()
    }
}

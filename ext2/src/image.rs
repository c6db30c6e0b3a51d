use positioned_io2::ReadAt;
use std::fs::File;
use std::path::Path;

use crate::util::BytesExt;
use crate::{Ext2Error, Result};

/// A read-only view of a raw filesystem image with a known length.
///
/// Every read is checked against the length up front, so running off the
/// end of the image surfaces as [`Ext2Error::ImageTruncated`] instead of a
/// short read.
pub struct Image<R: ReadAt> {
    inner: R,
    len: u64,
}

impl Image<File> {
    pub fn open<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        Ok(Self::new(file, len))
    }
}

impl<R: ReadAt> Image<R> {
    pub fn new(inner: R, len: u64) -> Self {
        Self { inner, len }
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let len = buf.len();
        let truncated = || Ext2Error::ImageTruncated {
            offset,
            len,
            size: self.len,
        };

        let end = offset
            .checked_add(len as u64)
            .ok_or_else(truncated)?;
        if end > self.len {
            return Err(truncated());
        }

        self.inner.read_exact_at(offset, buf).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                truncated()
            } else {
                Ext2Error::Io(e)
            }
        })
    }

    pub fn read_vec_at(&self, offset: u64, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.read_exact_at(offset, &mut buf)?;
        Ok(buf)
    }

    pub fn read_pod_at<T: bytemuck::Pod>(&self, offset: u64) -> Result<T> {
        let buf = self.read_vec_at(offset, std::mem::size_of::<T>())?;
        buf.pod_at::<T>(0).ok_or(Ext2Error::ImageTruncated {
            offset,
            len: std::mem::size_of::<T>(),
            size: self.len,
        })
    }

    pub fn read_pod_vec<T: bytemuck::Pod>(&self, offset: u64, count: usize) -> Result<Vec<T>> {
        let size = std::mem::size_of::<T>();
        let len = size.checked_mul(count).ok_or(Ext2Error::ImageTruncated {
            offset,
            len: usize::MAX,
            size: self.len,
        })?;
        let buf = self.read_vec_at(offset, len)?;
        Ok(buf
            .chunks_exact(size)
            .map(bytemuck::pod_read_unaligned::<T>)
            .collect())
    }
}

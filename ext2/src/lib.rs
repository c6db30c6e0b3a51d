use positioned_io2::ReadAt;
use thiserror::Error;
use tracing::{debug, warn};

pub mod bitmap;
pub mod dir;
pub mod geometry;
pub mod group;
pub mod image;
pub mod indirect;
pub mod inode;
pub mod record;
pub mod structs;
mod util;

#[cfg(test)]
mod test_image;

pub use dir::{DirEntries, DirEntry};
pub use geometry::Geometry;
pub use group::GroupDescriptor;
pub use image::Image;
pub use inode::{FileType, InodeRecord};
pub use record::{IndirectRef, Record, RecordSink};

use crate::structs::Inode;
use crate::util::BytesExt;

#[derive(Error, Debug)]
pub enum Ext2Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image truncated: {len} bytes at offset {offset} do not fit in a {size} byte image")]
    ImageTruncated { offset: u64, len: usize, size: u64 },
    #[error("corrupt directory block {block} of inode {inode} at offset {offset}: {reason}")]
    CorruptDirectory {
        inode: u32,
        block: u32,
        offset: u32,
        reason: &'static str,
    },
    #[error("Invalid filesystem geometry: {0}")]
    InvalidGeometry(&'static str),
    #[error("Invalid block number: {0}")]
    InvalidBlock(u32),
}

pub type Result<T> = std::result::Result<T, Ext2Error>;

/// Read-only walker over the metadata of an ext2 image.
pub struct Ext2Reader<R: ReadAt> {
    image: Image<R>,
    geometry: Geometry,
    groups: Vec<GroupDescriptor>,
}

impl<R: ReadAt> Ext2Reader<R> {
    pub fn new(image: Image<R>) -> Result<Self> {
        let geometry = Geometry::read(&image)?;
        let groups = group::read_group_descriptors(&image, &geometry)?;

        Ok(Ext2Reader {
            image,
            geometry,
            groups,
        })
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn groups(&self) -> &[GroupDescriptor] {
        &self.groups
    }

    pub fn read_block(&self, block: u32) -> Result<Vec<u8>> {
        let offset = self.geometry.block_offset(block)?;
        self.image
            .read_vec_at(offset, self.geometry.block_size as usize)
    }

    /// Entries of directory data block `block`, owned by inode `parent`.
    pub fn dir_entries(&self, parent: u32, block: u32) -> Result<DirEntries> {
        Ok(DirEntries::new(parent, block, self.read_block(block)?))
    }

    /// Decoded allocated inodes of `group`, in slot order.
    pub fn inodes(&self, group: &GroupDescriptor) -> Result<Vec<InodeRecord>> {
        let inode_size = self.geometry.inode_size as usize;
        let offset = self.geometry.block_offset(group.inode_table)?;
        let table = self
            .image
            .read_vec_at(offset, group.inode_count as usize * inode_size)?;
        let first = group.first_inode(&self.geometry);

        Ok(table
            .chunks_exact(inode_size)
            .zip(first..)
            .filter_map(|(slot, number)| {
                let raw = slot.pod_at::<Inode>(0)?;
                InodeRecord::decode(number as u32, &raw)
            })
            .collect())
    }

    /// Emits every record of the image into `sink`.
    ///
    /// Order: superblock, groups, free blocks of every group, free inodes of
    /// every group, then each allocated inode followed by its directory
    /// entries and indirect pointers.
    pub fn scan<S: RecordSink>(&self, sink: &mut S) -> Result<()> {
        sink.record(Record::Superblock(self.geometry))?;
        for group in &self.groups {
            sink.record(Record::Group(*group))?;
        }

        for group in &self.groups {
            let bitmap = self.read_block(group.block_bitmap)?;
            let first = group.first_block(&self.geometry);
            for block in bitmap::free_entries(&bitmap, first, group.block_count) {
                sink.record(Record::FreeBlock(block))?;
            }
        }

        for group in &self.groups {
            let bitmap = self.read_block(group.inode_bitmap)?;
            let first = group.first_inode(&self.geometry);
            for inode in bitmap::free_entries(&bitmap, first, group.inode_count) {
                sink.record(Record::FreeInode(inode))?;
            }
        }

        for group in &self.groups {
            let inodes = self.inodes(group)?;
            debug!(group = group.index, allocated = inodes.len(), "scanning inode table");

            for inode in inodes {
                sink.record(Record::Inode(inode))?;
                match self.walk_blocks(&inode, sink) {
                    Ok(()) => {}
                    Err(err @ Ext2Error::ImageTruncated { .. }) => {
                        warn!(inode = inode.number, %err, "abandoning block walk");
                    }
                    Err(err) => return Err(err),
                }
            }
        }

        Ok(())
    }

    fn walk_blocks<S: RecordSink>(&self, inode: &InodeRecord, sink: &mut S) -> Result<()> {
        if inode.is_dir() {
            for &block in inode.direct_blocks().iter().filter(|&&b| b != 0) {
                self.emit_directory_block(inode.number, block, sink)?;
            }
        }

        if inode.has_inline_data() {
            return Ok(());
        }
        self.resolve_indirect(inode, sink)
    }

    pub(crate) fn emit_directory_block<S: RecordSink>(
        &self,
        parent: u32,
        block: u32,
        sink: &mut S,
    ) -> Result<()> {
        for entry in self.dir_entries(parent, block)? {
            match entry {
                Ok(entry) => sink.record(Record::DirEntry(entry))?,
                Err(err) => {
                    warn!(%err, "skipping rest of directory block");
                    break;
                }
            }
        }
        Ok(())
    }
}

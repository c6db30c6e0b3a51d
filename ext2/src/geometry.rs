use positioned_io2::ReadAt;
use tracing::{debug, warn};

use crate::image::Image;
use crate::structs::*;
use crate::util::BytesExt;
use crate::{Ext2Error, Result};

/// Filesystem-wide parameters decoded from the superblock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub block_size: u32,
    pub blocks_count: u32,
    pub inodes_count: u32,
    pub inode_size: u32,
    pub blocks_per_group: u32,
    pub inodes_per_group: u32,
    pub first_ino: u32,
}

impl Geometry {
    pub fn read<R: ReadAt>(image: &Image<R>) -> Result<Self> {
        let record = image.read_vec_at(SUPERBLOCK_OFFSET, SUPERBLOCK_SIZE)?;
        let sb = record
            .pod_at::<Superblock>(0)
            .ok_or(Ext2Error::ImageTruncated {
                offset: SUPERBLOCK_OFFSET,
                len: SUPERBLOCK_SIZE,
                size: image.len(),
            })?;
        Self::from_superblock(&sb)
    }

    pub fn from_superblock(sb: &Superblock) -> Result<Self> {
        if sb.s_magic != EXT2_SUPER_MAGIC {
            warn!(magic = sb.s_magic, "superblock magic is not 0xEF53");
        }

        if sb.s_log_block_size > EXT2_MAX_LOG_BLOCK_SIZE {
            return Err(Ext2Error::InvalidGeometry("block size above 64 KiB"));
        }
        if sb.s_blocks_per_group == 0 {
            return Err(Ext2Error::InvalidGeometry("zero blocks per group"));
        }
        if sb.s_inodes_per_group == 0 {
            return Err(Ext2Error::InvalidGeometry("zero inodes per group"));
        }

        let (inode_size, first_ino) = if sb.s_rev_level == EXT2_GOOD_OLD_REV {
            (EXT2_GOOD_OLD_INODE_SIZE, EXT2_GOOD_OLD_FIRST_INO)
        } else {
            (sb.s_inode_size as u32, sb.s_first_ino)
        };
        if inode_size < EXT2_GOOD_OLD_INODE_SIZE {
            return Err(Ext2Error::InvalidGeometry("inode size below 128 bytes"));
        }

        let geometry = Self {
            block_size: EXT2_MIN_BLOCK_SIZE << sb.s_log_block_size,
            blocks_count: sb.s_blocks_count,
            inodes_count: sb.s_inodes_count,
            inode_size,
            blocks_per_group: sb.s_blocks_per_group,
            inodes_per_group: sb.s_inodes_per_group,
            first_ino,
        };
        debug!(?geometry, groups = geometry.group_count(), "decoded superblock");
        Ok(geometry)
    }

    pub fn group_count(&self) -> u32 {
        self.blocks_count.div_ceil(self.blocks_per_group)
    }

    /// Number of 32-bit block pointers held by one indirect block.
    pub fn pointers_per_block(&self) -> u64 {
        self.block_size as u64 / 4
    }

    /// Byte offset of block `block`, counted from the superblock at 1024.
    pub fn block_offset(&self, block: u32) -> Result<u64> {
        let index = (block as u64)
            .checked_sub(1)
            .ok_or(Ext2Error::InvalidBlock(block))?;
        Ok(SUPERBLOCK_OFFSET + index * self.block_size as u64)
    }
}

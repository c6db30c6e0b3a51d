use positioned_io2::ReadAt;
use tracing::debug;

use crate::Result;
use crate::geometry::Geometry;
use crate::image::Image;
use crate::structs::BlockGroupDescriptor;

/// Block number of the group descriptor table: the block right after the superblock.
const GROUP_TABLE_BLOCK: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupDescriptor {
    pub index: u32,
    /// Blocks actually covered by this group; only the last one can be short.
    pub block_count: u32,
    pub inode_count: u32,
    pub free_blocks_count: u16,
    pub free_inodes_count: u16,
    pub block_bitmap: u32,
    pub inode_bitmap: u32,
    pub inode_table: u32,
}

impl GroupDescriptor {
    pub fn from_raw(geometry: &Geometry, index: u32, raw: &BlockGroupDescriptor) -> Self {
        let blocks_before = index as u64 * geometry.blocks_per_group as u64;
        let inodes_before = index as u64 * geometry.inodes_per_group as u64;

        Self {
            index,
            block_count: remaining(geometry.blocks_count, blocks_before, geometry.blocks_per_group),
            inode_count: remaining(geometry.inodes_count, inodes_before, geometry.inodes_per_group),
            free_blocks_count: raw.bg_free_blocks_count,
            free_inodes_count: raw.bg_free_inodes_count,
            block_bitmap: raw.bg_block_bitmap,
            inode_bitmap: raw.bg_inode_bitmap,
            inode_table: raw.bg_inode_table,
        }
    }

    /// Number of the first block tracked by this group's block bitmap.
    pub fn first_block(&self, geometry: &Geometry) -> u64 {
        self.index as u64 * geometry.blocks_per_group as u64 + 1
    }

    /// Number of the inode in slot 0 of this group's inode table.
    pub fn first_inode(&self, geometry: &Geometry) -> u64 {
        self.index as u64 * geometry.inodes_per_group as u64 + 1
    }
}

fn remaining(total: u32, before: u64, per_group: u32) -> u32 {
    (total as u64).saturating_sub(before).min(per_group as u64) as u32
}

pub fn read_group_descriptors<R: ReadAt>(
    image: &Image<R>,
    geometry: &Geometry,
) -> Result<Vec<GroupDescriptor>> {
    let group_count = geometry.group_count();
    let offset = geometry.block_offset(GROUP_TABLE_BLOCK)?;
    let raw = image.read_pod_vec::<BlockGroupDescriptor>(offset, group_count as usize)?;
    debug!(group_count, offset, "read group descriptor table");

    Ok(raw
        .iter()
        .zip(0..)
        .map(|(raw, index)| GroupDescriptor::from_raw(geometry, index, raw))
        .collect())
}

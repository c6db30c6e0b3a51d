//! In-memory image builder for unit tests.

use bytemuck::{Pod, Zeroable};
use positioned_io2::ReadAt;

use crate::image::Image;
use crate::structs::*;

pub struct MemImage(pub Vec<u8>);

impl MemImage {
    pub fn image(bytes: Vec<u8>) -> Image<MemImage> {
        let len = bytes.len() as u64;
        Image::new(MemImage(bytes), len)
    }
}

impl ReadAt for MemImage {
    fn read_at(&self, pos: u64, buf: &mut [u8]) -> std::io::Result<usize> {
        let start = pos.min(self.0.len() as u64) as usize;
        let n = buf.len().min(self.0.len() - start);
        buf[..n].copy_from_slice(&self.0[start..start + n]);
        Ok(n)
    }
}

/// A dynamic-revision superblock with 128-byte inodes and 1 KiB blocks.
pub fn superblock(blocks: u32, inodes: u32, blocks_per_group: u32, inodes_per_group: u32) -> Superblock {
    Superblock {
        s_inodes_count: inodes,
        s_blocks_count: blocks,
        s_blocks_per_group: blocks_per_group,
        s_inodes_per_group: inodes_per_group,
        s_magic: EXT2_SUPER_MAGIC,
        s_rev_level: 1,
        s_first_ino: EXT2_GOOD_OLD_FIRST_INO,
        s_inode_size: 128,
        ..Superblock::zeroed()
    }
}

pub fn inode(mode: u16, links: u16) -> Inode {
    Inode {
        i_mode: mode,
        i_links_count: links,
        ..Inode::zeroed()
    }
}

pub struct TestImage {
    bytes: Vec<u8>,
    block_size: usize,
}

impl TestImage {
    /// Room for blocks `1..=blocks`.
    pub fn new(block_size: usize, blocks: usize) -> Self {
        Self {
            bytes: vec![0u8; 1024 + blocks * block_size],
            block_size,
        }
    }

    fn block_offset(&self, block: u32) -> usize {
        1024 + (block as usize - 1) * self.block_size
    }

    pub fn put<T: Pod>(&mut self, offset: usize, value: &T) {
        let bytes = bytemuck::bytes_of(value);
        self.bytes[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    pub fn block_mut(&mut self, block: u32) -> &mut [u8] {
        let offset = self.block_offset(block);
        &mut self.bytes[offset..offset + self.block_size]
    }

    pub fn superblock(&mut self, mut sb: Superblock) {
        sb.s_log_block_size = (self.block_size / 1024).trailing_zeros();
        self.put(1024, &sb);
    }

    pub fn group(
        &mut self,
        index: usize,
        block_bitmap: u32,
        inode_bitmap: u32,
        inode_table: u32,
        free_blocks: u16,
        free_inodes: u16,
    ) {
        let desc = BlockGroupDescriptor {
            bg_block_bitmap: block_bitmap,
            bg_inode_bitmap: inode_bitmap,
            bg_inode_table: inode_table,
            bg_free_blocks_count: free_blocks,
            bg_free_inodes_count: free_inodes,
            ..BlockGroupDescriptor::zeroed()
        };
        let offset = self.block_offset(2) + index * std::mem::size_of::<BlockGroupDescriptor>();
        self.put(offset, &desc);
    }

    /// Writes `inode` into slot `slot` of a table of 128-byte records.
    pub fn inode(&mut self, table: u32, slot: usize, inode: &Inode) {
        let offset = self.block_offset(table) + slot * 128;
        self.put(offset, inode);
    }

    pub fn dir_entry(&mut self, block: u32, offset: usize, inode: u32, rec_len: u16, name: &[u8]) {
        let header = DirEntryHeader {
            inode,
            rec_len,
            name_len: name.len() as u8,
            file_type: 0,
        };
        let start = self.block_offset(block) + offset;
        self.put(start, &header);
        let name_start = start + DIR_ENTRY_HEADER_LEN;
        self.bytes[name_start..name_start + name.len()].copy_from_slice(name);
    }

    pub fn pointer(&mut self, block: u32, position: usize, value: u32) {
        let offset = self.block_offset(block) + position * 4;
        self.bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    pub fn into_image(self) -> Image<MemImage> {
        MemImage::image(self.bytes)
    }
}

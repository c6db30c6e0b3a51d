use positioned_io2::ReadAt;

use crate::inode::InodeRecord;
use crate::record::{IndirectRef, Record, RecordSink};
use crate::structs::{EXT2_DIND_BLOCK, EXT2_IND_BLOCK, EXT2_NDIR_BLOCKS, EXT2_TIND_BLOCK};
use crate::util::BytesExt;
use crate::{Ext2Reader, Result};

/// Logical index of the first block reached through the top-level pointer of `level`.
pub fn slot_base(level: u8, pointers_per_block: u64) -> u64 {
    let p = pointers_per_block;
    match level {
        1 => EXT2_NDIR_BLOCKS as u64,
        2 => EXT2_NDIR_BLOCKS as u64 + p,
        _ => EXT2_NDIR_BLOCKS as u64 + p + p * p,
    }
}

/// Logical blocks covered by each pointer stored in an indirect block of `level`.
pub fn span(level: u8, pointers_per_block: u64) -> u64 {
    pointers_per_block.pow(level as u32 - 1)
}

impl<R: ReadAt> Ext2Reader<R> {
    /// Reports every pointer reachable from slots 12, 13 and 14 of `inode`, depth first.
    pub(crate) fn resolve_indirect<S: RecordSink>(
        &self,
        inode: &InodeRecord,
        sink: &mut S,
    ) -> Result<()> {
        let p = self.geometry.pointers_per_block();
        for (slot, level) in [(EXT2_IND_BLOCK, 1), (EXT2_DIND_BLOCK, 2), (EXT2_TIND_BLOCK, 3)] {
            let block = inode.block[slot];
            if block != 0 {
                self.resolve_block(inode, level, block, slot_base(level, p), sink)?;
            }
        }
        Ok(())
    }

    fn resolve_block<S: RecordSink>(
        &self,
        inode: &InodeRecord,
        level: u8,
        block: u32,
        base: u64,
        sink: &mut S,
    ) -> Result<()> {
        let span = span(level, self.geometry.pointers_per_block());
        let data = self.read_block(block)?;

        for (position, pointer) in data.le_u32_words().enumerate() {
            if pointer == 0 {
                continue;
            }

            let logical_block = base + position as u64 * span;
            sink.record(Record::Indirect(IndirectRef {
                inode: inode.number,
                level,
                logical_block,
                indirect_block: block,
                block: pointer,
            }))?;

            if level > 1 {
                self.resolve_block(inode, level - 1, pointer, logical_block, sink)?;
            } else if inode.is_dir() {
                self.emit_directory_block(inode.number, pointer, sink)?;
            }
        }

        Ok(())
    }
}

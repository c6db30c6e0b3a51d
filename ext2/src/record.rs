use crate::dir::DirEntry;
use crate::geometry::Geometry;
use crate::group::GroupDescriptor;
use crate::inode::InodeRecord;

/// One pointer found while descending an inode's indirect block chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndirectRef {
    pub inode: u32,
    /// Level of the indirect block holding the pointer: 1, 2 or 3.
    pub level: u8,
    /// First logical block of the file reached through this pointer.
    pub logical_block: u64,
    pub indirect_block: u32,
    pub block: u32,
}

/// Everything the scanner reports, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Superblock(Geometry),
    Group(GroupDescriptor),
    FreeBlock(u64),
    FreeInode(u64),
    Inode(InodeRecord),
    DirEntry(DirEntry),
    Indirect(IndirectRef),
}

pub trait RecordSink {
    fn record(&mut self, record: Record) -> std::io::Result<()>;
}

impl RecordSink for Vec<Record> {
    fn record(&mut self, record: Record) -> std::io::Result<()> {
        self.push(record);
        Ok(())
    }
}

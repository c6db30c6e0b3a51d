pub trait BytesExt {
    /// Decodes a `T` starting at `offset`, or `None` if it would run past the end.
    fn pod_at<T: bytemuck::Pod>(&self, offset: usize) -> Option<T>;
    /// Splits the buffer into little-endian 32-bit words.
    fn le_u32_words(&self) -> impl Iterator<Item = u32> + '_;
}

impl BytesExt for [u8] {
    fn pod_at<T: bytemuck::Pod>(&self, offset: usize) -> Option<T> {
        let end = offset.checked_add(std::mem::size_of::<T>())?;
        self.get(offset..end).map(bytemuck::pod_read_unaligned::<T>)
    }

    fn le_u32_words(&self) -> impl Iterator<Item = u32> + '_ {
        self.chunks_exact(4)
            .map(|chunk| u32::from_le(bytemuck::pod_read_unaligned::<u32>(chunk)))
    }
}

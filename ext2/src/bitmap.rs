/// Yields the entry numbers of the clear bits in `bitmap`, least significant bit first.
///
/// Bit `k` of byte `j` stands for entry `first + 8 * j + k`. Only the first
/// `count` bits are valid; anything after them in the block is padding.
pub fn free_entries(bitmap: &[u8], first: u64, count: u32) -> impl Iterator<Item = u64> + '_ {
    let valid = (count as usize).min(bitmap.len() * 8);
    (0..valid)
        .filter(move |&bit| bitmap[bit / 8] & (1 << (bit % 8)) == 0)
        .map(move |bit| first + bit as u64)
}

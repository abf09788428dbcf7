/// Low pointer bits the map node layout reserves for its color flag.
pub const TAG_MASK: u64 = 0b11;

/// Split a tagged pointer field into `(clean_address, tag_bits)`.
pub fn split_tagged_ptr(raw: u64) -> (u64, u8) {
	(raw & !TAG_MASK, (raw & TAG_MASK) as u8)
}

/// Pack a clean address and tag bits into one pointer field.
pub fn join_tagged_ptr(address: u64, tag: u8) -> u64 {
	(address & !TAG_MASK) | (u64::from(tag) & TAG_MASK)
}

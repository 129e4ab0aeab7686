pub const NONCE_SIZE: usize = 16;

/// Derive the CTR initialization vector for a packet.
///
/// Bytes 0..8 hold the packet id widened to 64 bits, 8..12 the sending node,
/// 12..16 the starting block counter. All little-endian.
pub fn derive_nonce(packet_id: u32, from_node: u32) -> [u8; NONCE_SIZE] {
    let block_counter: u32 = 0;

    let mut nonce = [0u8; NONCE_SIZE];
    nonce[..8].copy_from_slice(&u64::from(packet_id).to_le_bytes());
    nonce[8..12].copy_from_slice(&from_node.to_le_bytes());
    nonce[12..].copy_from_slice(&block_counter.to_le_bytes());
    nonce
}

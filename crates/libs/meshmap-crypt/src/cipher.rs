use ctr::cipher::{KeyIvInit, StreamCipher};
use meshmap_proto::{Data, Message, PortNum};

use crate::key::ChannelKey;
use crate::nonce::derive_nonce;

// Counter runs big-endian over the whole 16-byte block; the derived nonce
// leaves the low word at zero so it only ever touches bytes 12..16.
type Aes128Ctr = ctr::Ctr128BE<aes::Aes128>;

/// Any reason a ciphertext could not be turned into a [`Data`].
///
/// Wrong key, truncated ciphertext and well-decrypted-but-malformed bytes are
/// indistinguishable under CTR, so they share one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecryptError {
    #[error("encrypted payload is undecodable")]
    Undecodable,
}

/// AES-128-CTR keyed with a channel PSK.
#[derive(Clone, Debug)]
pub struct ChannelCipher {
    key: ChannelKey,
}

impl ChannelCipher {
    pub fn new(key: &ChannelKey) -> Self {
        Self { key: key.clone() }
    }

    /// XOR the packet keystream into `buf` in place.
    pub fn apply(&self, packet_id: u32, from_node: u32, buf: &mut [u8]) {
        let nonce = derive_nonce(packet_id, from_node);
        let mut cipher = Aes128Ctr::new(self.key.as_bytes().into(), &nonce.into());
        cipher.apply_keystream(buf);
    }

    pub fn encrypt(&self, packet_id: u32, from_node: u32, plaintext: &[u8]) -> Vec<u8> {
        let mut out = plaintext.to_vec();
        self.apply(packet_id, from_node, &mut out);
        out
    }

    pub fn decrypt(&self, packet_id: u32, from_node: u32, ciphertext: &[u8]) -> Vec<u8> {
        // CTR is its own inverse.
        self.encrypt(packet_id, from_node, ciphertext)
    }

    /// Decrypt and parse the inner [`Data`] structure of a packet.
    pub fn decrypt_data(
        &self,
        packet_id: u32,
        from_node: u32,
        ciphertext: &[u8],
    ) -> Result<Data, DecryptError> {
        if ciphertext.is_empty() {
            return Err(DecryptError::Undecodable);
        }
        let plaintext = self.decrypt(packet_id, from_node, ciphertext);
        let data = Data::decode(plaintext.as_slice()).map_err(|_| DecryptError::Undecodable)?;
        // Unauthenticated CTR: garbage often parses as a Data with no portnum.
        if data.portnum == PortNum::UNKNOWN_APP {
            return Err(DecryptError::Undecodable);
        }
        Ok(data)
    }
}

/// One-shot form of [`ChannelCipher::decrypt_data`].
pub fn decrypt_data(
    key: &ChannelKey,
    packet_id: u32,
    from_node: u32,
    ciphertext: &[u8],
) -> Result<Data, DecryptError> {
    ChannelCipher::new(key).decrypt_data(packet_id, from_node, ciphertext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keystream_depends_on_packet_and_sender() {
        let cipher = ChannelCipher::new(&ChannelKey::default());
        let plaintext = [0u8; 32];
        let a = cipher.encrypt(1, 2, &plaintext);
        let b = cipher.encrypt(2, 2, &plaintext);
        let c = cipher.encrypt(1, 3, &plaintext);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), plaintext.len());
    }

    #[test]
    fn empty_ciphertext_is_undecodable() {
        assert_eq!(
            decrypt_data(&ChannelKey::default(), 1, 1, &[]),
            Err(DecryptError::Undecodable)
        );
    }

    #[test]
    fn zero_portnum_is_undecodable() {
        let cipher = ChannelCipher::new(&ChannelKey::default());
        let data = Data { portnum: 0, payload: vec![0x01, 0x02], ..Default::default() };
        let ciphertext = cipher.encrypt(5, 6, &data.encode_to_vec());
        assert_eq!(cipher.decrypt_data(5, 6, &ciphertext), Err(DecryptError::Undecodable));

        // decrypts to a lone want_response flag: valid protobuf, no portnum
        let ciphertext = cipher.encrypt(5, 6, &[0x18, 0x01]);
        assert_eq!(cipher.decrypt_data(5, 6, &ciphertext), Err(DecryptError::Undecodable));
    }

    #[test]
    fn data_roundtrip_through_channel_cipher() {
        let cipher = ChannelCipher::new(&ChannelKey::default());
        let data = Data { portnum: 67, payload: vec![0x10, 0x20, 0x30], ..Default::default() };
        let ciphertext = cipher.encrypt(77, 0x1122_3344, &data.encode_to_vec());
        assert_eq!(cipher.decrypt_data(77, 0x1122_3344, &ciphertext), Ok(data));
    }
}

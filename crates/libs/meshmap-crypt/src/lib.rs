//! # meshmap-crypt
//!
//! Channel encryption for mesh radio packets.
//!
//! Packets on a shared channel are encrypted with AES-CTR under the channel
//! pre-shared key. The IV is not transmitted; both ends derive it from the
//! packet id and the sending node:
//!
//! ```text
//! [packet_id as u64 LE : 8][from_node LE : 4][block counter = 0 : 4]
//! ```
//!
//! ## Example
//!
//! ```rust
//! use meshmap_crypt::{ChannelCipher, ChannelKey};
//!
//! let cipher = ChannelCipher::new(&ChannelKey::default());
//! let ciphertext = cipher.encrypt(0x1234, 0xdeadbeef, b"hello mesh");
//! assert_eq!(cipher.decrypt(0x1234, 0xdeadbeef, &ciphertext), b"hello mesh");
//! ```

pub mod cipher;
pub mod key;
pub mod nonce;

pub use cipher::{decrypt_data, ChannelCipher, DecryptError};
pub use key::{ChannelKey, KeyError, DEFAULT_CHANNEL_KEY_B64};
pub use nonce::{derive_nonce, NONCE_SIZE};

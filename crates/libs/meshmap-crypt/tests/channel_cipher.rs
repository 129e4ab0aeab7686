use meshmap_crypt::{decrypt_data, ChannelCipher, ChannelKey, DecryptError};
use meshmap_proto::{Data, Message, PortNum, User};

const PACKET_ID: u32 = 0x1234_5678;
const FROM_NODE: u32 = 0xdead_beef;

// NODEINFO_APP Data { User { long_name: "Test Node", short_name: "TN01" } }
// encrypted with the default channel key, as produced by OpenSSL aes-128-ctr.
const NODEINFO_CIPHERTEXT: [u8; 21] = [
    0xab, 0xa7, 0x29, 0x80, 0x94, 0x7d, 0x3d, 0x5b, 0xda, 0xa0, 0xb0, 0x4c, 0x38, 0xae, 0x96, 0x90,
    0xfe, 0x54, 0xc2, 0xd5, 0x89,
];

fn nodeinfo_data() -> Data {
    let user = User {
        long_name: "Test Node".into(),
        short_name: "TN01".into(),
        ..Default::default()
    };
    Data { portnum: PortNum::NODEINFO_APP, payload: user.encode_to_vec(), ..Default::default() }
}

#[test]
fn decrypts_reference_ciphertext_with_default_key() {
    let data = decrypt_data(&ChannelKey::default(), PACKET_ID, FROM_NODE, &NODEINFO_CIPHERTEXT)
        .expect("decrypt");
    assert_eq!(data.portnum, PortNum::NODEINFO_APP);
    let user = User::decode(data.payload.as_slice()).expect("user");
    assert_eq!(user.long_name, "Test Node");
    assert_eq!(user.short_name, "TN01");
}

#[test]
fn encrypt_matches_reference_ciphertext() {
    let cipher = ChannelCipher::new(&ChannelKey::default());
    let ciphertext = cipher.encrypt(PACKET_ID, FROM_NODE, &nodeinfo_data().encode_to_vec());
    assert_eq!(ciphertext, NODEINFO_CIPHERTEXT);
}

#[test]
fn encrypt_then_decrypt_recovers_plaintext() {
    let cipher = ChannelCipher::new(&ChannelKey::default());
    let plaintext: Vec<u8> = (0u8..=200).collect();
    let ciphertext = cipher.encrypt(99, 0x0bad_cafe, &plaintext);
    assert_ne!(ciphertext, plaintext);
    assert_eq!(cipher.decrypt(99, 0x0bad_cafe, &ciphertext), plaintext);
}

#[test]
fn wrong_key_never_yields_the_original_payload() {
    let wrong = ChannelKey::from_bytes([0x42; 16]);
    assert_eq!(
        decrypt_data(&wrong, PACKET_ID, FROM_NODE, &NODEINFO_CIPHERTEXT),
        Err(DecryptError::Undecodable)
    );
}

#[test]
fn corrupted_or_truncated_ciphertext_is_handled() {
    let key = ChannelKey::default();
    for len in 0..NODEINFO_CIPHERTEXT.len() {
        let result = decrypt_data(&key, PACKET_ID, FROM_NODE, &NODEINFO_CIPHERTEXT[..len]);
        assert_ne!(result.ok(), Some(nodeinfo_data()));
    }

    let mut corrupted = NODEINFO_CIPHERTEXT;
    // flips the Data.payload length prefix so it overruns the buffer
    corrupted[3] ^= 0x40;
    assert_eq!(
        decrypt_data(&key, PACKET_ID, FROM_NODE, &corrupted),
        Err(DecryptError::Undecodable)
    );
}

#[test]
fn nonce_mismatch_is_not_the_original_payload() {
    let key = ChannelKey::default();
    let result = decrypt_data(&key, PACKET_ID + 1, FROM_NODE, &NODEINFO_CIPHERTEXT);
    assert_ne!(result.ok(), Some(nodeinfo_data()));
}

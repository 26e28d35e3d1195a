#![no_main]
use libfuzzer_sys::fuzz_target;
use shield_kex::config::KeyExchangeConfig;
use shield_kex::exchange::{KeyShare, ServerDecision, ServerKeyExchange};
use shield_kex::groups::{GroupId, DUMMY_KEX};
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    let Ok(server) = ServerKeyExchange::new(&KeyExchangeConfig::default()) else {
        return;
    };

    // Input: repeated [group_hi, group_lo, len, key bytes...]
    let mut shares = Vec::new();
    let mut supported = Vec::new();
    let mut rest = data;
    while rest.len() >= 3 {
        let group = GroupId(u16::from_be_bytes([rest[0], rest[1]]));
        let len = (rest[2] as usize).min(rest.len() - 3);
        shares.push(KeyShare {
            group,
            key_exchange: rest[3..3 + len].to_vec(),
        });
        supported.push(group);
        rest = &rest[3 + len..];
    }

    let mut rng = Cursor::new(vec![0x24u8; 256]);
    if let Ok(ServerDecision::Accept { group, .. }) = server.respond(&shares, &supported, &mut rng) {
        assert_ne!(group, DUMMY_KEX, "Dummy group must never be accepted");
    }
});

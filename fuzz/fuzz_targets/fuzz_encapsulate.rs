#![no_main]
use libfuzzer_sys::fuzz_target;
use shield_kex::exchange::encapsulate_for_kem;
use shield_kex::groups::{registered_groups, resolve};
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // First byte picks the group, the rest is the peer key share
    let groups = registered_groups();
    let group = groups[data[0] as usize % groups.len()];
    let Some(scheme) = resolve(group) else {
        return;
    };
    let peer_key = &data[1..];

    // Arbitrary peer keys must never panic, only fail with an alert
    let mut rng = Cursor::new(vec![0x42u8; scheme.encapsulation_seed_size()]);
    if let Ok((ct, ss)) = encapsulate_for_kem(scheme, &mut rng, peer_key) {
        assert_eq!(peer_key.len(), scheme.public_key_size());
        assert_eq!(ct.len(), scheme.ciphertext_size());
        assert_eq!(ss.len(), scheme.shared_key_size());
    }
});

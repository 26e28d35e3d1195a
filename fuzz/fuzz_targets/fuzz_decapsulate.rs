#![no_main]
use libfuzzer_sys::fuzz_target;
use shield_kex::exchange::{decapsulate_for_kem, encapsulate_for_kem, generate_kem_key_pair};
use shield_kex::groups::{registered_groups, resolve};
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let groups = registered_groups();
    let group = groups[data[0] as usize % groups.len()];
    let Some(scheme) = resolve(group) else {
        return;
    };

    // Key pair from a seed derived from the input
    let mut seed = vec![data[1]; scheme.seed_size()];
    for (dst, src) in seed.iter_mut().zip(&data[2..]) {
        *dst ^= *src;
    }
    let Ok((pk, sk)) = generate_kem_key_pair(scheme, group, &mut Cursor::new(seed)) else {
        return;
    };

    // Arbitrary ciphertext must not panic
    let _ = decapsulate_for_kem(scheme, &sk, &data[2..]);

    // A genuine ciphertext must round-trip
    let mut rng = Cursor::new(vec![data[1]; scheme.encapsulation_seed_size()]);
    if let Ok((ct, ss)) = encapsulate_for_kem(scheme, &mut rng, pk.as_bytes()) {
        let recovered =
            decapsulate_for_kem(scheme, &sk, &ct).expect("Decapsulation of valid ciphertext must succeed");
        assert_eq!(ss, recovered, "Shared secret mismatch");
    }
});

#![no_main]

use libfuzzer_sys::fuzz_target;

use zpoly::IntPoly;
use zpoly_nmod::ModPoly;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    // Parsing may fail but must not panic; anything parsed must round trip.
    if let Ok(f) = text.parse::<IntPoly>() {
        assert_eq!(f.to_string().parse::<IntPoly>().unwrap(), f);
    }
    if let Ok(f) = text.parse::<ModPoly>() {
        assert_eq!(f.to_string().parse::<ModPoly>().unwrap(), f);
    }
});

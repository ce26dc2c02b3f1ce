#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Must not panic; a structurally valid GSTIN always has a check character.
        if gstinvoice::gst::validate_gstin_format(s).is_ok() {
            assert!(gstinvoice::gst::gstin_check_char(s).is_some());
        }
        let _ = gstinvoice::gst::validate_gstin_checksum(s);
    }
});

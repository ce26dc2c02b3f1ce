#![no_main]

use gstinvoice::gst::{VerificationSignals, evaluate_compliance};
use gstinvoice::{Classification, FlagKind};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (&str, &str, bool)| {
    let (vendor, billed, failed) = input;
    let signals = if failed {
        VerificationSignals::failed()
    } else {
        VerificationSignals::verified()
    };

    let outcome = evaluate_compliance(vendor, billed, &signals);
    match outcome.classification {
        Classification::Clean => assert!(outcome.flags.is_empty()),
        Classification::HasAnomalies => assert!(!outcome.flags.is_empty()),
        Classification::Pending => unreachable!("signals are never pending here"),
    }
    if outcome.flags.iter().any(|f| f.kind == FlagKind::FormatError) {
        assert!(outcome.flags.iter().all(|f| f.kind == FlagKind::FormatError));
    }
});

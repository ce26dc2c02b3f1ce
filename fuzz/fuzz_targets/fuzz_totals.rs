#![no_main]

use gstinvoice::{LineItemBuilder, compute_invoice_totals};
use libfuzzer_sys::fuzz_target;
use rust_decimal::Decimal;

fuzz_target!(|input: (Vec<(i64, i64, u16)>, i64)| {
    let (raw_lines, raw_discount) = input;
    let lines: Vec<_> = raw_lines
        .into_iter()
        .take(64)
        .map(|(qty, paise, bp)| {
            LineItemBuilder::new(qty, Decimal::new(paise, 2))
                .tax_rate(Decimal::new(bp.into(), 2))
                .build()
        })
        .collect();

    // Errors are fine; panics and negative totals are bugs.
    if let Ok(totals) = compute_invoice_totals(&lines, Decimal::new(raw_discount, 2)) {
        assert!(totals.grand_total >= Decimal::ZERO);
        assert!(totals.effective_discount <= totals.subtotal);
        assert_eq!(totals.grand_total.scale(), 2);
    }
});

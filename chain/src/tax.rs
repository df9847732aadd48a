use crate::currency::Currency;
use crate::types::Height;

/// Numerator and denominator of the siafund tax rate, 3.9%.
const TAX_NUMERATOR: u64 = 39;
const TAX_DENOMINATOR: u64 = 1000;

/// Siafund tax collected when a file contract with the given payout is
/// created at the given height.
///
/// The arithmetic representation changed at `hardfork_height`. The legacy
/// form divides before scaling and so truncates low digits; the current
/// form scales first and rounds the result down to a multiple of the
/// siafund count so the tax divides evenly among all siafunds. Committed
/// chain history depends on both forms byte for byte, which is why the
/// height is part of the signature.
pub fn tax(height: Height, payout: &Currency, hardfork_height: Height, siafund_count: u64) -> Currency {
    if height < hardfork_height {
        *payout / TAX_DENOMINATOR * TAX_NUMERATOR
    } else {
        let scaled = *payout * TAX_NUMERATOR / TAX_DENOMINATOR;
        scaled - (scaled % siafund_count)
    }
}

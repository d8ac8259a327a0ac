//! Fixed-point conversions between raw on-chain integers and decimals.

use crate::domain::{Decimal, U256};

/// Largest power of ten representable by [`Decimal`].
pub const MAX_DECIMALS: u32 = 28;

/// 2^48; two factors make the Q96 denominator without leaving Decimal range.
const TWO_POW_48: u64 = 1 << 48;

/// 10^decimals by repeated multiplication. `None` above [`MAX_DECIMALS`].
pub fn exponent_to_decimal(decimals: u32) -> Option<Decimal> {
    if decimals > MAX_DECIMALS {
        return None;
    }
    let ten = Decimal::from_u64(10);
    let mut result = Decimal::one();
    for _ in 0..decimals {
        result = result.checked_mul(ten)?;
    }
    Some(result)
}

/// Scale a raw token amount down by its decimals. Zero decimals pass through.
pub fn convert_token_to_decimal(amount: Decimal, decimals: u32) -> Option<Decimal> {
    if decimals == 0 {
        return Some(amount);
    }
    amount.checked_div(exponent_to_decimal(decimals)?)
}

/// `a / b`, or zero when `b` is zero.
pub fn safe_div(a: Decimal, b: Decimal) -> Decimal {
    if b.is_zero() {
        Decimal::zero()
    } else {
        a.checked_div(b).unwrap_or_default()
    }
}

/// `sqrtPriceX96 / 2^96` as a Decimal.
///
/// The integer part is at most 64 bits for a valid Q64.96 value and the
/// fractional part below 2^96, so both limbs fit the Decimal mantissa.
fn sqrt_price(sqrt_price_x96: U256) -> Option<Decimal> {
    let whole = Decimal::from_u256(sqrt_price_x96 >> 96)?;
    let frac_mask = (U256::from(1u8) << 96) - U256::from(1u8);
    let divisor = Decimal::from_u64(TWO_POW_48);
    let frac = Decimal::from_u256(sqrt_price_x96 & frac_mask)?
        .checked_div(divisor)?
        .checked_div(divisor)?;
    whole.checked_add(frac)
}

/// Convert a Q64.96 square-root price into `[price0, price1]`.
///
/// `price1 = (sqrtPriceX96^2 / 2^192) * 10^dec0 / 10^dec1` is token1 per token0
/// and `price0 = 1 / price1`. Returns `None` if an intermediate overflows.
pub fn sqrt_price_x96_to_token_prices(
    sqrt_price_x96: U256,
    decimals0: u32,
    decimals1: u32,
) -> Option<[Decimal; 2]> {
    let root = sqrt_price(sqrt_price_x96)?;
    let squared = root.checked_mul(root)?;
    let price1 = squared
        .checked_mul(exponent_to_decimal(decimals0)?)?
        .checked_div(exponent_to_decimal(decimals1)?)?;
    let price0 = safe_div(Decimal::one(), price1);
    Some([price0, price1])
}

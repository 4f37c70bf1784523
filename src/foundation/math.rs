/// `x * y / 255`, rounded to nearest.
pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

/// [`mul_div255_u16`] narrowed to a channel value; callers keep `x, y <= 255`.
pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Inverse of premultiplication for one channel: `c * 255 / a`, rounded, saturated.
pub(crate) fn div_alpha_u8(c: u8, a: u8) -> u8 {
    if a == 0 {
        return 0;
    }
    let v = (u32::from(c) * 255 + u32::from(a) / 2) / u32::from(a);
    v.min(255) as u8
}

use crate::assets::store::PreparedImage;
use crate::foundation::core::PlacementRect;
use crate::foundation::math::mul_div255_u8;

pub(crate) type PremulRgba8 = [u8; 4];

/// Premultiplied source-over: `out = src + dst * (1 - src.a)`.
pub(crate) fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    let sa = src[3];
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }

    let inv = 255u16 - u16::from(sa);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255_u8(u16::from(dst[i]), inv));
    }
    out
}

pub(crate) fn over_row_in_place(dst: &mut [u8], src: &[u8]) {
    debug_assert_eq!(dst.len(), src.len());
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
}

/// Draw `src` with its top-left corner at `rect`'s origin, source-over.
///
/// Only pixels inside `rect`, inside the destination, and inside `src` are touched.
pub(crate) fn draw_over(
    dst: &mut [u8],
    dst_width: u32,
    dst_height: u32,
    src: &PreparedImage,
    rect: PlacementRect,
) {
    let area = rect
        .intersect(PlacementRect::of_size(dst_width, dst_height))
        .intersect(rect.with_size_at_origin(src.width(), src.height()));
    if area.is_empty() {
        return;
    }

    let dst_stride = dst_width as usize * 4;
    let src_stride = src.width() as usize * 4;
    let row_bytes = area.width() as usize * 4;
    let src_px = src.rgba8_premul();

    for y in area.y0..area.y1 {
        let d0 = y as usize * dst_stride + area.x0 as usize * 4;
        let s0 = (y - rect.y0) as usize * src_stride + (area.x0 - rect.x0) as usize * 4;
        over_row_in_place(&mut dst[d0..d0 + row_bytes], &src_px[s0..s0 + row_bytes]);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;

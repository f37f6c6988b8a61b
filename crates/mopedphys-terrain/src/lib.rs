use mopedphys_core::types::Vec2;
use mopedphys_core::{GroundRay, RayHit, Scalar, SurfaceId, SurfaceMask};

/// Regular 1D ground profile for a side-scrolling world: one height sample per
/// column, linear interpolation between columns. Heights are world-space y.
#[derive(Clone, Debug)]
pub struct GroundProfile {
    pub cell: Scalar,
    pub heights: Vec<Scalar>,
    pub surface: SurfaceId,
    pub mask: SurfaceMask,
    pub min_y: Scalar,
    pub max_y: Scalar,
}

impl GroundProfile {
    pub fn from_heights(cell: Scalar, heights: Vec<Scalar>, surface: SurfaceId, mask: SurfaceMask) -> Self {
        assert!(cell > 0.0);
        assert!(heights.len() >= 2);
        let (mut min_y, mut max_y) = (f32::INFINITY, f32::NEG_INFINITY);
        for &h in &heights { min_y = min_y.min(h); max_y = max_y.max(h); }
        Self { cell, heights, surface, mask, min_y, max_y }
    }

    /// Flat ground at `y` spanning `columns * cell` world units.
    pub fn flat(cell: Scalar, columns: usize, y: Scalar, surface: SurfaceId, mask: SurfaceMask) -> Self {
        Self::from_heights(cell, vec![y; columns.max(2)], surface, mask)
    }

    /// Load a profile from the top row of a grayscale PNG: pixel value 0..255
    /// maps to 0..y_scale.
    #[cfg(feature = "image")]
    pub fn from_png_bytes(png: &[u8], cell: Scalar, y_scale: Scalar, surface: SurfaceId, mask: SurfaceMask) -> image::ImageResult<Self> {
        let img = image::load_from_memory(png)?.to_luma8();
        let (w, _h) = img.dimensions();
        let mut heights = Vec::with_capacity(w as usize);
        for x in 0..w {
            let v = img.get_pixel(x, 0).0[0] as f32 / 255.0;
            heights.push(v * y_scale);
        }
        Ok(Self::from_heights(cell, heights, surface, mask))
    }

    #[inline] fn h(&self, i: i32) -> Scalar { self.heights[i as usize] }

    /// Linear height at world x. X outside the profile clamps to the border
    /// column, same convention as the grid heightfield this is reduced from.
    pub fn sample_height(&self, x: Scalar) -> Scalar {
        let n = self.heights.len() as i32;
        let fx = (x / self.cell).clamp(0.0, (n - 1) as f32 - 1e-5);
        let x0 = fx.floor() as i32;
        let x1 = (x0 + 1).min(n - 1);
        let t = fx - x0 as f32;
        self.h(x0) * (1.0 - t) + self.h(x1) * t
    }

    /// Central-diff surface normal (unit, y-up) at world x.
    pub fn sample_normal(&self, x: Scalar) -> Vec2 {
        let h0 = self.sample_height((x - self.cell).max(0.0));
        let h1 = self.sample_height(x + self.cell);
        let ddx = (h1 - h0) / (2.0 * self.cell);
        Vec2::new(-ddx, 1.0).normalize_or_zero()
    }

    /// Signed clearance of a point above the surface.
    #[inline]
    fn clearance(&self, p: Vec2) -> Scalar {
        p.y - self.sample_height(p.x)
    }

    /// Ray vs. profile. Straight-down rays resolve analytically; everything
    /// else marches at half-cell resolution and bisects the crossing interval.
    /// An origin already below the surface reports a hit at distance zero.
    pub fn raycast(&self, origin: Vec2, dir: Vec2, max_dist: Scalar) -> Option<(Scalar, Vec2)> {
        let d = dir.normalize_or_zero();
        if d == Vec2::ZERO || max_dist <= 0.0 {
            return None;
        }

        if self.clearance(origin) <= 0.0 {
            return Some((0.0, origin));
        }

        // Fast path: vertical-down ray against the column under the origin.
        if d.x.abs() < 1.0e-6 && d.y < 0.0 {
            let ground_y = self.sample_height(origin.x);
            let dist = origin.y - ground_y;
            if dist <= max_dist {
                return Some((dist, Vec2::new(origin.x, ground_y)));
            }
            return None;
        }

        let step = (self.cell * 0.5).min(max_dist);
        let mut t_prev = 0.0_f32;
        let mut t = step;
        loop {
            let t_clamped = t.min(max_dist);
            let p = origin + d * t_clamped;
            if self.clearance(p) <= 0.0 {
                // bisect [t_prev, t_clamped]
                let (mut lo, mut hi) = (t_prev, t_clamped);
                for _ in 0..8 {
                    let mid = 0.5 * (lo + hi);
                    if self.clearance(origin + d * mid) <= 0.0 { hi = mid; } else { lo = mid; }
                }
                let pt = origin + d * hi;
                return Some((hi, Vec2::new(pt.x, self.sample_height(pt.x))));
            }
            if t_clamped >= max_dist { return None; }
            t_prev = t_clamped;
            t += step;
        }
    }
}

impl GroundRay for GroundProfile {
    fn cast(&self, origin: Vec2, dir: Vec2, max_dist: Scalar, mask: SurfaceMask) -> Option<RayHit> {
        if !mask.intersects(self.mask) {
            return None;
        }
        let (distance, point) = self.raycast(origin, dir, max_dist)?;
        Some(RayHit { distance, point, surface: self.surface })
    }
}

//! Vector norms and small vector helpers over coordinate slices.

#![forbid(unsafe_code)]

/// Sum of squares of `coords`.
///
/// # Examples
///
/// ```
/// use nhull::geometry::util::squared_norm;
///
/// assert_eq!(squared_norm(&[1.0, 2.0, 2.0]), 9.0);
/// ```
#[inline]
#[must_use]
pub fn squared_norm(coords: &[f64]) -> f64 {
    coords.iter().map(|&x| x * x).sum()
}

/// Euclidean norm of `coords`, scaled by the largest component to avoid
/// overflow and underflow.
///
/// # Examples
///
/// ```
/// use nhull::geometry::util::hypot;
///
/// assert_eq!(hypot(&[3.0, 4.0]), 5.0);
/// assert_eq!(hypot(&[1.0, 2.0, 2.0]), 3.0);
/// assert_eq!(hypot(&[1.0, 1.0, 1.0, 1.0]), 2.0);
/// ```
#[must_use]
pub fn hypot(coords: &[f64]) -> f64 {
    match coords {
        [] => 0.0,
        [a] => a.abs(),
        [a, b] => a.hypot(*b),
        _ => {
            let max_abs = coords.iter().fold(0.0_f64, |acc, &x| acc.max(x.abs()));
            if max_abs == 0.0 || !max_abs.is_finite() {
                return max_abs;
            }
            let scaled: f64 = coords
                .iter()
                .map(|&x| {
                    let s = x / max_abs;
                    s * s
                })
                .sum();
            max_abs * scaled.sqrt()
        }
    }
}

/// Dot product of two equal-length slices.
#[inline]
#[must_use]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(&x, &y)| x * y).sum()
}

/// Writes `a - b` into `out`.
#[inline]
pub fn subtract_into(a: &[f64], b: &[f64], out: &mut [f64]) {
    debug_assert_eq!(a.len(), b.len());
    debug_assert_eq!(a.len(), out.len());
    for ((o, &x), &y) in out.iter_mut().zip(a).zip(b) {
        *o = x - y;
    }
}

/// Scales `v` to unit length and returns its previous length.
///
/// A zero or non-finite vector is left unchanged and `None` is returned.
pub fn normalize_in_place(v: &mut [f64]) -> Option<f64> {
    let length = hypot(v);
    if length == 0.0 || !length.is_finite() {
        return None;
    }
    for x in v.iter_mut() {
        *x /= length;
    }
    Some(length)
}

/// Squared Euclidean distance between two points.
#[inline]
#[must_use]
pub fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

//! Monotone cubic interpolation for the sales line
//!
//! Tangents follow Steffen's method, so the curve never overshoots the
//! data between two points and preserves monotonic runs. Points must be
//! sorted by strictly increasing `x`.

fn sign(v: f64) -> f64 {
    if v < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Tangent at every point
pub fn tangents(points: &[(f64, f64)]) -> Vec<f64> {
    let n = points.len();
    if n < 2 {
        return vec![0.0; n];
    }

    let secant = |i: usize| {
        let (x0, y0) = points[i];
        let (x1, y1) = points[i + 1];
        let h = x1 - x0;
        if h == 0.0 {
            0.0
        } else {
            (y1 - y0) / h
        }
    };

    let mut m = vec![0.0; n];
    for i in 1..n - 1 {
        let h0 = points[i].0 - points[i - 1].0;
        let h1 = points[i + 1].0 - points[i].0;
        let s0 = secant(i - 1);
        let s1 = secant(i);
        let p = if h0 + h1 == 0.0 {
            0.0
        } else {
            (s0 * h1 + s1 * h0) / (h0 + h1)
        };
        let t = (sign(s0) + sign(s1)) * s0.abs().min(s1.abs()).min(0.5 * p.abs());
        m[i] = if t.is_finite() { t } else { 0.0 };
    }

    // Endpoints: one-sided three-point estimate
    if n == 2 {
        m[0] = secant(0);
        m[1] = secant(0);
    } else {
        m[0] = (3.0 * secant(0) - m[1]) / 2.0;
        m[n - 1] = (3.0 * secant(n - 2) - m[n - 2]) / 2.0;
    }
    m
}

/// Sample the curve; each segment contributes `steps` sub-segments.
/// Returns the input unchanged when fewer than two points are given.
pub fn sample(points: &[(f64, f64)], steps: usize) -> Vec<(f64, f64)> {
    if points.len() < 2 {
        return points.to_vec();
    }
    let steps = steps.max(1);
    let m = tangents(points);
    let mut out = Vec::with_capacity((points.len() - 1) * steps + 1);
    out.push(points[0]);

    for i in 0..points.len() - 1 {
        let (x0, y0) = points[i];
        let (x1, y1) = points[i + 1];
        let h = x1 - x0;
        for k in 1..=steps {
            let t = k as f64 / steps as f64;
            let t2 = t * t;
            let t3 = t2 * t;
            let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
            let h10 = t3 - 2.0 * t2 + t;
            let h01 = -2.0 * t3 + 3.0 * t2;
            let h11 = t3 - t2;
            let y = h00 * y0 + h10 * h * m[i] + h01 * y1 + h11 * h * m[i + 1];
            out.push((x0 + h * t, y));
        }
    }
    out
}

//! Row-major 3x3 matrix helpers

/// Row-major 3x3 matrix
pub type Mat3 = [f64; 9];

pub const IDENTITY: Mat3 = [
    1.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, //
    0.0, 0.0, 1.0,
];

/// Determinant magnitude below which a matrix has no usable inverse.
pub const SINGULAR_EPSILON: f64 = 1e-9;

/// First nine values of `values`, or `None` if there are fewer than nine.
pub fn from_slice(values: &[f64]) -> Option<Mat3> {
    values.get(..9)?.try_into().ok()
}

pub fn diagonal(values: [f64; 3]) -> Mat3 {
    [
        values[0], 0.0, 0.0, //
        0.0, values[1], 0.0, //
        0.0, 0.0, values[2],
    ]
}

pub fn multiply(left: &Mat3, right: &Mat3) -> Mat3 {
    let mut result = [0.0; 9];
    for row in 0..3 {
        for col in 0..3 {
            result[row * 3 + col] = (0..3).map(|k| left[row * 3 + k] * right[k * 3 + col]).sum();
        }
    }
    result
}

pub fn multiply_vector(matrix: &Mat3, vector: [f64; 3]) -> [f64; 3] {
    [
        matrix[0] * vector[0] + matrix[1] * vector[1] + matrix[2] * vector[2],
        matrix[3] * vector[0] + matrix[4] * vector[1] + matrix[5] * vector[2],
        matrix[6] * vector[0] + matrix[7] * vector[1] + matrix[8] * vector[2],
    ]
}

pub fn determinant(m: &Mat3) -> f64 {
    m[0] * (m[4] * m[8] - m[5] * m[7]) - m[1] * (m[3] * m[8] - m[5] * m[6])
        + m[2] * (m[3] * m[7] - m[4] * m[6])
}

/// Adjugate inverse; `None` when the matrix is singular.
pub fn invert(m: &Mat3) -> Option<Mat3> {
    let det = determinant(m);
    if det.abs() < SINGULAR_EPSILON || !det.is_finite() {
        return None;
    }
    let inv_det = 1.0 / det;
    let [a, b, c, d, e, f, g, h, i] = *m;
    Some([
        (e * i - f * h) * inv_det,
        (c * h - b * i) * inv_det,
        (b * f - c * e) * inv_det,
        (f * g - d * i) * inv_det,
        (a * i - c * g) * inv_det,
        (c * d - a * f) * inv_det,
        (d * h - e * g) * inv_det,
        (b * g - a * h) * inv_det,
        (a * e - b * d) * inv_det,
    ])
}

/// Element-wise `(1 - w) * a + w * b` with `w` clamped to [0, 1].
pub fn lerp(a: &Mat3, b: &Mat3, weight: f64) -> Mat3 {
    let w = weight.clamp(0.0, 1.0);
    std::array::from_fn(|index| (1.0 - w) * a[index] + w * b[index])
}

pub fn is_identity(matrix: &Mat3, epsilon: f64) -> bool {
    matrix
        .iter()
        .zip(IDENTITY.iter())
        .all(|(value, expected)| (value - expected).abs() <= epsilon)
}

pub fn to_rows(matrix: &Mat3) -> [[f64; 3]; 3] {
    [
        [matrix[0], matrix[1], matrix[2]],
        [matrix[3], matrix[4], matrix[5]],
        [matrix[6], matrix[7], matrix[8]],
    ]
}

pub fn from_rows(rows: &[[f64; 3]; 3]) -> Mat3 {
    std::array::from_fn(|index| rows[index / 3][index % 3])
}

//! EXIF LightSource codes used as calibration reference illuminants

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IlluminantInfo {
    pub code: i64,
    pub name: &'static str,
    /// Correlated color temperature in Kelvin; `None` for codes without one.
    pub cct: Option<f64>,
}

const fn entry(code: i64, name: &'static str, cct: Option<f64>) -> IlluminantInfo {
    IlluminantInfo { code, name, cct }
}

const ILLUMINANTS: &[IlluminantInfo] = &[
    entry(0, "Unknown", None),
    entry(1, "Daylight", Some(5500.0)),
    entry(2, "Fluorescent", Some(4200.0)),
    entry(3, "Tungsten", Some(2850.0)),
    entry(4, "Flash", Some(6000.0)),
    entry(9, "Fine Weather", Some(5500.0)),
    entry(10, "Cloudy", Some(6500.0)),
    entry(11, "Shade", Some(7500.0)),
    entry(12, "Daylight Fluorescent", Some(6500.0)),
    entry(13, "Day White Fluorescent", Some(7000.0)),
    entry(14, "Cool White Fluorescent", Some(4200.0)),
    entry(15, "White Fluorescent", Some(3500.0)),
    entry(16, "Warm White Fluorescent", Some(3000.0)),
    entry(17, "Standard Light A", Some(2856.0)),
    entry(18, "Standard Light B", Some(4874.0)),
    entry(19, "Standard Light C", Some(6774.0)),
    entry(20, "D55", Some(5500.0)),
    entry(21, "D65", Some(6504.0)),
    entry(22, "D75", Some(7500.0)),
    entry(23, "D50", Some(5003.0)),
    entry(24, "ISO Studio Tungsten", Some(3200.0)),
    entry(255, "Other", None),
];

pub const D65: i64 = 21;

pub fn lookup(code: i64) -> Option<&'static IlluminantInfo> {
    ILLUMINANTS.iter().find(|info| info.code == code)
}

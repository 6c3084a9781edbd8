//! Translate extraction from computed CSS transforms

use std::sync::OnceLock;

use regex::Regex;

use crate::geometry::Vec2;

fn matrix3d() -> &'static Regex {
    static MATRIX3D: OnceLock<Regex> = OnceLock::new();
    MATRIX3D.get_or_init(|| Regex::new(r"^matrix3d\((.+)\)$").expect("matrix3d pattern is valid"))
}

fn matrix2d() -> &'static Regex {
    static MATRIX: OnceLock<Regex> = OnceLock::new();
    MATRIX.get_or_init(|| Regex::new(r"^matrix\((.+)\)$").expect("matrix pattern is valid"))
}

/// Read the translation out of a computed `transform` value
///
/// `matrix3d` carries it in components 12/13, `matrix` in 4/5. Anything
/// else, `none` included, is no translation.
pub fn parse_translate(transform: &str) -> Vec2 {
    let transform = transform.trim();

    if let Some(caps) = matrix3d().captures(transform) {
        return components(&caps[1], 12, 13);
    }
    if let Some(caps) = matrix2d().captures(transform) {
        return components(&caps[1], 4, 5);
    }
    Vec2::ZERO
}

fn components(list: &str, x: usize, y: usize) -> Vec2 {
    let values: Vec<f64> = list
        .split(',')
        .map(|part| part.trim().parse::<f64>().unwrap_or(0.0))
        .collect();

    Vec2::new(
        values.get(x).copied().unwrap_or(0.0),
        values.get(y).copied().unwrap_or(0.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix() {
        assert_eq!(parse_translate("matrix(1, 0, 0, 1, 12.5, -40)"), Vec2::new(12.5, -40.0));
    }

    #[test]
    fn test_matrix3d() {
        let value = "matrix3d(1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1, 0, 0, -250, 0, 1)";
        assert_eq!(parse_translate(value), Vec2::new(0.0, -250.0));
    }

    #[test]
    fn test_none_and_garbage() {
        assert_eq!(parse_translate("none"), Vec2::ZERO);
        assert_eq!(parse_translate(""), Vec2::ZERO);
        assert_eq!(parse_translate("matrix(1, 0)"), Vec2::ZERO);
    }
}

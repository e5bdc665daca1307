//! Random color palettes for telling trajectories apart.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::color::Rgba;

/// Generate `count` random RGB triples with components in [0, 1).
///
/// A seed makes the palette reproducible across runs.
pub fn random_colors(count: usize, seed: Option<u64>) -> Vec<[f64; 3]> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    (0..count)
        .map(|_| [rng.gen::<f64>(), rng.gen::<f64>(), rng.gen::<f64>()])
        .collect()
}

/// [`random_colors`] converted to opaque 8-bit colors
pub fn random_palette(count: usize, seed: Option<u64>) -> Vec<Rgba> {
    random_colors(count, seed)
        .into_iter()
        .map(Rgba::from_unit_rgb)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_colors_count_and_range() {
        let colors = random_colors(25, None);
        assert_eq!(colors.len(), 25);
        for color in &colors {
            for component in color {
                assert!((0.0..1.0).contains(component));
            }
        }
        assert!(random_colors(0, None).is_empty());
    }

    #[test]
    fn test_seeded_colors_are_reproducible() {
        assert_eq!(random_colors(8, Some(7)), random_colors(8, Some(7)));
        assert_ne!(random_colors(8, Some(7)), random_colors(8, Some(8)));
    }

    #[test]
    fn test_random_palette_is_opaque() {
        let palette = random_palette(4, Some(1));
        assert_eq!(palette.len(), 4);
        assert!(palette.iter().all(|c| c.alpha() == 255));
    }
}

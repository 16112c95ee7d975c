use palette::{Hsl, IntoColor, Srgb};

/// Number of colours in the default overlay palette.
pub const DEFAULT_PALETTE_SIZE: usize = 10;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Srgb<u8>> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            rgb.into_format::<u8>()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Overlay palette: sample index → colour
// ---------------------------------------------------------------------------

/// Fixed-size palette assigning colours to samples by index. Indices past
/// the end wrap around instead of failing.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Srgb<u8>>,
    default_color: Srgb<u8>,
}

impl Default for Palette {
    fn default() -> Self {
        Palette::new(generate_palette(DEFAULT_PALETTE_SIZE))
    }
}

impl Palette {
    pub fn new(colors: Vec<Srgb<u8>>) -> Self {
        Palette {
            colors,
            default_color: Srgb::new(128, 128, 128),
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Colour of the sample at `index`, wrapping modulo the palette size.
    pub fn color_for(&self, index: usize) -> Srgb<u8> {
        if self.colors.is_empty() {
            return self.default_color;
        }
        self.colors[index % self.colors.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_distinct_colors() {
        let colors = generate_palette(6);
        assert_eq!(colors.len(), 6);
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn indices_wrap_around() {
        let palette = Palette::new(generate_palette(3));
        assert_eq!(palette.color_for(3), palette.color_for(0));
        assert_eq!(palette.color_for(7), palette.color_for(1));
    }

    #[test]
    fn empty_palette_uses_default() {
        let palette = Palette::new(Vec::new());
        assert_eq!(palette.color_for(5), Srgb::new(128, 128, 128));
    }
}

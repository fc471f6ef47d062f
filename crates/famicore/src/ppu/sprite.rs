//! Per-scanline sprite evaluation and pattern fetch.
//!
//! Dot 1 clears secondary OAM, dot 257 picks the first eight primary-OAM
//! entries that cover the next line, and dot 321 copies them into the active
//! set with both pattern planes fetched. Pixel output then only looks at the
//! active set.

use bitflags::bitflags;

use crate::memory::ppu as ppu_mem;

/// Sprites drawn per scanline.
pub const SPRITES_PER_LINE: usize = 8;
/// Marks an empty secondary-OAM slot.
pub const VOID_SPRITE: u8 = 64;

bitflags! {
    /// Sprite byte 2.
    ///
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// V H P . . . p p
    /// ```
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct SpriteAttributes: u8 {
        const PALETTE = 0b0000_0011;
        /// Drawn behind opaque background pixels.
        const BEHIND_BACKGROUND = 0b0010_0000;
        const FLIP_HORIZONTAL = 0b0100_0000;
        const FLIP_VERTICAL = 0b1000_0000;
    }
}

/// One OAM entry plus the pattern bytes fetched for the current line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sprite {
    /// Index in primary OAM, or [`VOID_SPRITE`].
    pub id: u8,
    pub x: u8,
    pub y: u8,
    pub tile: u8,
    pub attr: SpriteAttributes,
    pub data_l: u8,
    pub data_h: u8,
}

impl Sprite {
    pub const VOID: Sprite = Sprite {
        id: VOID_SPRITE,
        x: 0xFF,
        y: 0xFF,
        tile: 0xFF,
        attr: SpriteAttributes::all(),
        data_l: 0,
        data_h: 0,
    };

    pub fn is_void(&self) -> bool {
        self.id == VOID_SPRITE
    }

    /// 2-bit color at screen column `x`, or `None` outside the sprite.
    pub fn color_at(&self, x: usize) -> Option<u8> {
        let mut col = x.checked_sub(self.x as usize)?;
        if col >= 8 {
            return None;
        }
        if self.attr.contains(SpriteAttributes::FLIP_HORIZONTAL) {
            col ^= 7;
        }
        let shift = 7 - col;
        Some((((self.data_h >> shift) & 1) << 1) | ((self.data_l >> shift) & 1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteUnit {
    secondary: [Sprite; SPRITES_PER_LINE],
    active: [Sprite; SPRITES_PER_LINE],
}

impl Default for SpriteUnit {
    fn default() -> Self {
        Self {
            secondary: [Sprite::VOID; SPRITES_PER_LINE],
            active: [Sprite::VOID; SPRITES_PER_LINE],
        }
    }
}

impl SpriteUnit {
    pub fn clear_secondary(&mut self) {
        self.secondary = [Sprite::VOID; SPRITES_PER_LINE];
    }

    /// Copies the first eight sprites covering `line` into secondary OAM.
    ///
    /// Returns `true` when a ninth sprite also covers the line.
    pub fn evaluate(&mut self, oam: &[u8; ppu_mem::OAM_RAM_SIZE], line: i32, height: i32) -> bool {
        let mut found = 0;
        for (id, entry) in oam.chunks_exact(4).enumerate() {
            let row = line - entry[0] as i32;
            if !(0..height).contains(&row) {
                continue;
            }
            if found == SPRITES_PER_LINE {
                return true;
            }
            self.secondary[found] = Sprite {
                id: id as u8,
                y: entry[0],
                tile: entry[1],
                attr: SpriteAttributes::from_bits_retain(entry[2]),
                x: entry[3],
                data_l: 0,
                data_h: 0,
            };
            found += 1;
        }
        false
    }

    /// Moves secondary OAM into the active set, fetching both pattern planes
    /// through `fetch`.
    ///
    /// `pattern_table` selects the 8x8 table; 8x16 sprites take their table
    /// from bit 0 of the tile index.
    pub fn load(
        &mut self,
        line: i32,
        height: i32,
        pattern_table: u16,
        mut fetch: impl FnMut(u16) -> u8,
    ) {
        for (slot, sprite) in self.active.iter_mut().zip(self.secondary) {
            *slot = sprite;
            let tile = sprite.tile as u16;
            let mut addr = if height == 16 {
                (tile & 1) * 0x1000 + (tile & !1) * 16
            } else {
                pattern_table + tile * 16
            };
            let mut row = (line - sprite.y as i32).rem_euclid(height) as u16;
            if sprite.attr.contains(SpriteAttributes::FLIP_VERTICAL) {
                row ^= height as u16 - 1;
            }
            // Rows 8-15 of a tall sprite live in the next tile.
            addr += row + (row & 8);
            slot.data_l = fetch(addr);
            slot.data_h = fetch(addr + 8);
        }
    }

    /// Active sprites from highest to lowest priority.
    pub fn active(&self) -> impl DoubleEndedIterator<Item = &Sprite> {
        self.active.iter().filter(|s| !s.is_void())
    }

    pub fn secondary(&self) -> &[Sprite; SPRITES_PER_LINE] {
        &self.secondary
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::*;

    fn oam_with(sprites: &[(u8, u8, u8, u8)]) -> [u8; ppu_mem::OAM_RAM_SIZE] {
        let mut oam = [0xFF; ppu_mem::OAM_RAM_SIZE];
        for (i, &(y, tile, attr, x)) in sprites.iter().enumerate() {
            oam[i * 4..i * 4 + 4].copy_from_slice(&[y, tile, attr, x]);
        }
        oam
    }

    #[test]
    fn random_layouts_cap_at_eight_and_flag_overflow() {
        let mut rng = StdRng::seed_from_u64(0x5EED);
        for _ in 0..200 {
            let mut oam = [0u8; ppu_mem::OAM_RAM_SIZE];
            rng.fill(&mut oam[..]);
            let line = rng.random_range(0..240);
            let height = if rng.random_bool(0.5) { 16 } else { 8 };

            let covering: Vec<usize> = (0..64)
                .filter(|&i| (0..height).contains(&(line - oam[i * 4] as i32)))
                .collect();

            let mut unit = SpriteUnit::default();
            let overflow = unit.evaluate(&oam, line, height);
            let copied: Vec<usize> = unit
                .secondary()
                .iter()
                .filter(|s| !s.is_void())
                .map(|s| s.id as usize)
                .collect();

            assert_eq!(overflow, covering.len() > 8);
            assert_eq!(copied, covering.into_iter().take(8).collect::<Vec<_>>());
        }
    }

    #[test]
    fn exactly_eight_sprites_do_not_overflow() {
        let sprites: Vec<_> = (0..8).map(|i| (10u8, 0, 0, i * 8)).collect();
        let mut unit = SpriteUnit::default();
        assert!(!unit.evaluate(&oam_with(&sprites), 12, 8));

        let sprites: Vec<_> = (0..9).map(|i| (10u8, 0, 0, i * 8)).collect();
        let mut unit = SpriteUnit::default();
        assert!(unit.evaluate(&oam_with(&sprites), 12, 8));
        assert!(unit.secondary().iter().all(|s| !s.is_void()));
    }

    #[test]
    fn load_fetches_row_with_flips_and_tall_tiles() {
        let mut unit = SpriteUnit::default();
        // Tile 3 at y=20, flipped vertically; tile 5 (8x16) at y=20.
        let oam = oam_with(&[(20, 3, 0x80, 0), (20, 5, 0x00, 8)]);
        unit.evaluate(&oam, 21, 16);
        let mut fetched = Vec::new();
        unit.load(21, 16, 0, |addr| {
            fetched.push(addr);
            0
        });
        // 8x16: tile 3 -> table $1000, tile 2; row 1 flipped -> 14 -> second tile row 6.
        assert_eq!(fetched[0], 0x1000 + 2 * 16 + 16 + 6);
        // tile 5 -> table $1000, tile 4, row 1.
        assert_eq!(fetched[2], 0x1000 + 4 * 16 + 1);
        assert_eq!(fetched[3], fetched[2] + 8);

        let mut unit = SpriteUnit::default();
        unit.evaluate(&oam, 21, 8);
        let mut first = None;
        unit.load(21, 8, 0x1000, |addr| {
            first.get_or_insert(addr);
            0
        });
        // 8x8 flipped: row 1 -> 6.
        assert_eq!(first, Some(0x1000 + 3 * 16 + 6));
    }

    #[test]
    fn color_respects_horizontal_flip() {
        let mut sprite = Sprite {
            id: 0,
            x: 10,
            y: 0,
            tile: 0,
            attr: SpriteAttributes::empty(),
            data_l: 0b1000_0000,
            data_h: 0b0000_0001,
        };
        assert_eq!(sprite.color_at(9), None);
        assert_eq!(sprite.color_at(10), Some(1));
        assert_eq!(sprite.color_at(17), Some(2));
        assert_eq!(sprite.color_at(18), None);
        sprite.attr = SpriteAttributes::FLIP_HORIZONTAL;
        assert_eq!(sprite.color_at(10), Some(2));
        assert_eq!(sprite.color_at(17), Some(1));
    }
}

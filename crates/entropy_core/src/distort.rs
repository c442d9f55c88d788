/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - ENTROPY Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use rand::Rng;
use std::ops::RangeInclusive;

/// Distance given to authors outside the follow horizon, and to everyone when
/// the viewer is anonymous.
pub const MAX_DISTORTION_LEVEL: u8 = 5;

const MIN_DISTORTION_PROBABILITY: f64 = 0.01;

// Printable Basic Latin.
const LATIN_CHARS: RangeInclusive<u32> = 0x20..=0x7E;
// Block elements, geometric shapes, misc symbols, dingbats.
const SYMBOL_CHARS: RangeInclusive<u32> = 0x2580..=0x27BF;
const LATIN_SHARE: f64 = 0.7;

/// Per-character replacement probability at `distance`.
pub fn distortion_probability(distance: u8) -> f64 {
    if distance == 0 {
        return 0.0;
    }
    let p = f64::from(distance - 1) / (2.0 * f64::from(MAX_DISTORTION_LEVEL));
    p.clamp(MIN_DISTORTION_PROBABILITY, 1.0)
}

pub fn random_content_char<R: Rng + ?Sized>(rng: &mut R) -> char {
    let range = if rng.gen_bool(LATIN_SHARE) { LATIN_CHARS } else { SYMBOL_CHARS };
    char::from_u32(rng.gen_range(range)).unwrap_or('?')
}

/// Replaces each character of `content` with noise, independently, with the
/// probability for `distance`. Character count is preserved. Distance 0 is the identity.
pub fn distort_content<R: Rng + ?Sized>(content: &str, distance: u8, rng: &mut R) -> String {
    if distance == 0 {
        return content.to_string();
    }
    let p = distortion_probability(distance);
    content
        .chars()
        .map(|c| if rng.gen_bool(p) { random_content_char(rng) } else { c })
        .collect()
}

//! Piecewise-linear curves and their exact integration.
//!
//! A curve is a list of [`Anchor`]s with non-decreasing utilization and level.
//! Between two anchors the price is linear. Past the last anchor the final
//! segment's line is extended; when that segment has zero width the
//! continuation is flat at the final level.
//!
//! # Integration
//!
//! The area over `[a, b]` inside a segment from `(x0, y0)` to `(x1, y1)` is
//!
//! ```text
//! y0 * (b - a)  +  (y1 - y0) * ((b - x0)^2 - (a - x0)^2) / (2 * (x1 - x0))
//! ```
//!
//! a rectangle at the segment's reference height plus a triangle whose height
//! grows with the slope. Both terms are scaled by one extra [`WAD`] so the
//! running total is carried at `WAD^3`; the only division per segment is the
//! slope denominator, and the final average divides once more.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::error::{CurveError, Result};
use crate::math::{add, div, mul, mul_div, RoundingDirection, WAD};

/// A point at which the curve's value is explicitly defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    /// Utilization (WAD-scaled)
    pub utilization: U256,
    /// Price fraction at that utilization (WAD-scaled)
    pub level: U256,
}

impl Anchor {
    /// Create a new anchor
    pub const fn new(utilization: U256, level: U256) -> Self {
        Self { utilization, level }
    }
}

/// The linear piece between two consecutive anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// Left end of the piece
    pub start: Anchor,
    /// Right end of the piece
    pub end: Anchor,
}

impl Segment {
    /// Create a segment between two anchors
    pub const fn new(start: Anchor, end: Anchor) -> Self {
        Self { start, end }
    }

    /// Horizontal continuation of `anchor` to the right
    fn flat(anchor: Anchor) -> Self {
        Self {
            start: anchor,
            end: Anchor::new(anchor.utilization.saturating_add(WAD), anchor.level),
        }
    }

    /// Whether the segment has zero width
    pub fn is_degenerate(&self) -> bool {
        self.end.utilization <= self.start.utilization
    }

    fn width(&self) -> U256 {
        self.end.utilization - self.start.utilization
    }

    fn rise(&self) -> U256 {
        self.end.level - self.start.level
    }

    /// Value of the segment's line at `x` (`x >= start.utilization`).
    pub fn value_at(&self, x: U256, rounding: RoundingDirection) -> Result<U256> {
        if self.is_degenerate() {
            return Ok(self.end.level);
        }
        let offset = mul_div(x - self.start.utilization, self.rise(), self.width(), rounding)?;
        add(self.start.level, offset)
    }

    /// Area under the segment's line over `[a, b]`, scaled to `WAD^3`.
    ///
    /// Requires `start.utilization <= a <= b`. `b` may lie past the segment's
    /// end, in which case the line is extrapolated.
    pub fn area(&self, a: U256, b: U256, rounding: RoundingDirection) -> Result<U256> {
        if b <= a {
            return Ok(U256::ZERO);
        }

        let rectangle = mul(mul(self.start.level, b - a)?, WAD)?;
        if self.is_degenerate() || self.rise().is_zero() {
            return Ok(rectangle);
        }

        let far = b - self.start.utilization;
        let near = a - self.start.utilization;
        let squares = mul(far, far)? - mul(near, near)?;
        let triangle = div(
            mul(mul(self.rise(), squares)?, WAD)?,
            mul(U256::from(2), self.width())?,
            rounding,
        )?;

        add(rectangle, triangle)
    }
}

/// A validated piecewise-linear price curve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PiecewiseLinear<const N: usize> {
    anchors: [Anchor; N],
}

impl<const N: usize> PiecewiseLinear<N> {
    /// Build a curve from anchors.
    ///
    /// The first anchor must sit at zero utilization and the last at [`WAD`];
    /// utilizations and levels must be non-decreasing and every level must
    /// be at most [`WAD`].
    pub fn new(anchors: [Anchor; N]) -> Result<Self> {
        let (Some(first), Some(last)) = (anchors.first(), anchors.last()) else {
            return Err(CurveError::InvalidConfiguration(
                "curve needs at least one anchor".to_string(),
            ));
        };
        if !first.utilization.is_zero() {
            return Err(CurveError::InvalidConfiguration(
                "first anchor must be at zero utilization".to_string(),
            ));
        }
        if last.utilization != WAD {
            return Err(CurveError::InvalidConfiguration(
                "last anchor must be at full utilization".to_string(),
            ));
        }

        for pair in anchors.windows(2) {
            if pair[1].utilization < pair[0].utilization {
                return Err(CurveError::InvalidConfiguration(format!(
                    "anchor utilization {} precedes {}",
                    pair[1].utilization, pair[0].utilization
                )));
            }
            if pair[1].level < pair[0].level {
                return Err(CurveError::InvalidConfiguration(format!(
                    "anchor level {} is below preceding level {}",
                    pair[1].level, pair[0].level
                )));
            }
        }
        if let Some(anchor) = anchors.iter().find(|anchor| anchor.level > WAD) {
            return Err(CurveError::InvalidConfiguration(format!(
                "level {} exceeds 100%",
                anchor.level
            )));
        }

        Ok(Self { anchors })
    }

    /// Segments paired with the upper end of the range each one prices.
    ///
    /// The last entry covers everything from its start onward (`None`).
    fn pieces(&self) -> Vec<(Segment, Option<U256>)> {
        let mut pieces: Vec<(Segment, Option<U256>)> = self
            .anchors
            .windows(2)
            .map(|pair| Segment::new(pair[0], pair[1]))
            .filter(|segment| !segment.is_degenerate())
            .map(|segment| (segment, Some(segment.end.utilization)))
            .collect();

        let tail_is_open = self
            .anchors
            .windows(2)
            .last()
            .is_some_and(|pair| pair[1].utilization > pair[0].utilization);

        if tail_is_open {
            if let Some(last) = pieces.last_mut() {
                last.1 = None;
            }
        } else if let Some(anchor) = self.anchors.last() {
            pieces.push((Segment::flat(*anchor), None));
        }
        pieces
    }

    /// Price at utilization `x`.
    ///
    /// At a boundary between two segments the right-hand segment applies.
    pub fn value_at(&self, x: U256, rounding: RoundingDirection) -> Result<U256> {
        for (segment, upper) in self.pieces() {
            if x < segment.start.utilization {
                break;
            }
            if matches!(upper, Some(upper) if x >= upper) {
                continue;
            }
            return segment.value_at(x, rounding);
        }
        // Only reachable below the first non-degenerate segment, which starts at zero
        Ok(self.anchors.first().map_or(U256::ZERO, |anchor| anchor.level))
    }

    /// Area under the curve over `[from, to]`, scaled to `WAD^3`.
    pub fn area(&self, from: U256, to: U256, rounding: RoundingDirection) -> Result<U256> {
        let mut total = U256::ZERO;
        if to <= from {
            return Ok(total);
        }

        for (segment, upper) in self.pieces() {
            let lo = from.max(segment.start.utilization);
            let hi = upper.map_or(to, |upper| to.min(upper));
            if lo < hi {
                total = add(total, segment.area(lo, hi, rounding)?)?;
            }
        }
        Ok(total)
    }

    /// Average price over `[from, to]`, WAD-scaled.
    ///
    /// A zero-width interval returns the point price at `from`.
    pub fn average(&self, from: U256, to: U256, rounding: RoundingDirection) -> Result<U256> {
        if to <= from {
            return self.value_at(from, rounding);
        }
        let area = self.area(from, to, rounding)?;
        div(area, mul(to - from, WAD)?, rounding)
    }

    /// Share of the area over `[0, from]` that lies within `[to, from]`, WAD-scaled.
    ///
    /// The partial area rounds down and the total rounds up so the ratio
    /// never exceeds the exact value.
    pub fn area_share(&self, from: U256, to: U256) -> Result<U256> {
        if from <= to {
            return Ok(U256::ZERO);
        }
        let total = self.area(U256::ZERO, from, RoundingDirection::Up)?;
        if total.is_zero() {
            return Ok(U256::ZERO);
        }
        let partial = self.area(to, from, RoundingDirection::Down)?;
        mul_div(partial, WAD, total, RoundingDirection::Down)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::from_ppm;

    fn jump_curve() -> PiecewiseLinear<3> {
        // 0% -> 2%, 80% -> 10%, 100% -> 100%
        PiecewiseLinear::new([
            Anchor::new(U256::ZERO, from_ppm(20_000)),
            Anchor::new(from_ppm(800_000), from_ppm(100_000)),
            Anchor::new(WAD, WAD),
        ])
        .unwrap()
    }

    #[test]
    fn test_value_at_anchors() {
        let curve = jump_curve();
        assert_eq!(curve.value_at(U256::ZERO, RoundingDirection::Up).unwrap(), from_ppm(20_000));
        assert_eq!(
            curve.value_at(from_ppm(800_000), RoundingDirection::Up).unwrap(),
            from_ppm(100_000)
        );
        assert_eq!(curve.value_at(WAD, RoundingDirection::Up).unwrap(), WAD);
    }

    #[test]
    fn test_value_at_interpolates() {
        let curve = jump_curve();
        // Halfway up the first segment: 2% + 4% = 6%
        assert_eq!(
            curve.value_at(from_ppm(400_000), RoundingDirection::Down).unwrap(),
            from_ppm(60_000)
        );
        // Halfway up the steep segment: 10% + 45% = 55%
        assert_eq!(
            curve.value_at(from_ppm(900_000), RoundingDirection::Down).unwrap(),
            from_ppm(550_000)
        );
    }

    #[test]
    fn test_value_at_extrapolates_past_full() {
        let curve = jump_curve();
        // Steep segment slope is 4.5, so 110% prices at 145%
        assert_eq!(
            curve.value_at(from_ppm(1_100_000), RoundingDirection::Down).unwrap(),
            from_ppm(1_450_000)
        );
    }

    #[test]
    fn test_area_single_segment() {
        let curve = jump_curve();
        // Trapezoid over [0, 0.8]: (0.02 + 0.1) / 2 * 0.8 = 0.048
        let area = curve.area(U256::ZERO, from_ppm(800_000), RoundingDirection::Down).unwrap();
        assert_eq!(area, from_ppm(48_000) * WAD * WAD);
    }

    #[test]
    fn test_area_spanning_segments() {
        let curve = jump_curve();
        // 0.048 + (0.1 + 1.0) / 2 * 0.2 = 0.158
        let area = curve.area(U256::ZERO, WAD, RoundingDirection::Down).unwrap();
        assert_eq!(area, from_ppm(158_000) * WAD * WAD);
        assert_eq!(
            curve.average(U256::ZERO, WAD, RoundingDirection::Up).unwrap(),
            from_ppm(158_000)
        );
    }

    #[test]
    fn test_area_empty_interval() {
        let curve = jump_curve();
        let x = from_ppm(300_000);
        assert_eq!(curve.area(x, x, RoundingDirection::Up).unwrap(), U256::ZERO);
    }

    #[test]
    fn test_average_zero_width_is_point_price() {
        let curve = jump_curve();
        let x = from_ppm(900_000);
        assert_eq!(
            curve.average(x, x, RoundingDirection::Up).unwrap(),
            curve.value_at(x, RoundingDirection::Up).unwrap()
        );
    }

    #[test]
    fn test_degenerate_tail_is_flat() {
        // Kink at 100%: the curve jumps to the full level at the last anchor
        let curve = PiecewiseLinear::new([
            Anchor::new(U256::ZERO, U256::ZERO),
            Anchor::new(WAD, from_ppm(100_000)),
            Anchor::new(WAD, from_ppm(500_000)),
        ])
        .unwrap();

        assert_eq!(
            curve.value_at(from_ppm(500_000), RoundingDirection::Down).unwrap(),
            from_ppm(50_000)
        );
        assert_eq!(curve.value_at(WAD, RoundingDirection::Down).unwrap(), from_ppm(500_000));

        // Past 100% the continuation is flat at 50%
        let area = curve
            .area(WAD, from_ppm(1_200_000), RoundingDirection::Down)
            .unwrap();
        assert_eq!(area, from_ppm(100_000) * WAD * WAD);
    }

    #[test]
    fn test_degenerate_head_skipped() {
        // Zero-width first segment: pricing starts on the second piece
        let curve = PiecewiseLinear::new([
            Anchor::new(U256::ZERO, from_ppm(10_000)),
            Anchor::new(U256::ZERO, from_ppm(200_000)),
            Anchor::new(WAD, from_ppm(200_000)),
        ])
        .unwrap();

        assert_eq!(curve.value_at(U256::ZERO, RoundingDirection::Down).unwrap(), from_ppm(200_000));
        assert_eq!(
            curve.average(U256::ZERO, WAD, RoundingDirection::Up).unwrap(),
            from_ppm(200_000)
        );
    }

    #[test]
    fn test_area_share() {
        let curve = jump_curve();
        assert_eq!(curve.area_share(WAD, WAD).unwrap(), U256::ZERO);
        assert_eq!(curve.area_share(WAD, U256::ZERO).unwrap(), WAD);

        // [0.8, 1.0] holds 0.11 of 0.158
        let share = curve.area_share(WAD, from_ppm(800_000)).unwrap();
        let expected = from_ppm(110_000) * WAD / from_ppm(158_000);
        assert_eq!(share, expected);
    }

    #[test]
    fn test_area_share_zero_curve() {
        let curve = PiecewiseLinear::new([
            Anchor::new(U256::ZERO, U256::ZERO),
            Anchor::new(WAD, U256::ZERO),
        ])
        .unwrap();
        assert_eq!(curve.area_share(WAD, U256::ZERO).unwrap(), U256::ZERO);
    }

    #[test]
    fn test_rejects_unordered_anchors() {
        let result = PiecewiseLinear::new([
            Anchor::new(U256::ZERO, U256::ZERO),
            Anchor::new(from_ppm(600_000), from_ppm(10_000)),
            Anchor::new(from_ppm(500_000), from_ppm(20_000)),
            Anchor::new(WAD, WAD),
        ]);
        assert!(matches!(result, Err(CurveError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_rejects_decreasing_levels() {
        let result = PiecewiseLinear::new([
            Anchor::new(U256::ZERO, from_ppm(50_000)),
            Anchor::new(WAD, from_ppm(10_000)),
        ]);
        assert!(matches!(result, Err(CurveError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_rejects_level_above_full() {
        let result = PiecewiseLinear::new([
            Anchor::new(U256::ZERO, U256::ZERO),
            Anchor::new(WAD, WAD + U256::from(1)),
        ]);
        assert!(matches!(result, Err(CurveError::InvalidConfiguration(_))));
    }
}

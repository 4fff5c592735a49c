//! Кусочно-линейная кривая 0..1 (профиль смещения slide)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    pub time: f32,
    pub value: f32,
}

impl CurveKey {
    pub const fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

/// Доля пройденного смещения от normalized time анимации
///
/// Ключи отсортированы по `time`. Пустая кривая = identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplacementCurve {
    pub keys: Vec<CurveKey>,
}

impl Default for DisplacementCurve {
    /// Быстрый рывок в начале, дотягивание к концу
    fn default() -> Self {
        Self {
            keys: vec![
                CurveKey::new(0.0, 0.0),
                CurveKey::new(0.2, 0.45),
                CurveKey::new(0.6, 0.9),
                CurveKey::new(1.0, 1.0),
            ],
        }
    }
}

impl DisplacementCurve {
    pub fn linear() -> Self {
        Self {
            keys: vec![CurveKey::new(0.0, 0.0), CurveKey::new(1.0, 1.0)],
        }
    }

    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return t;
        };
        if t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        for pair in self.keys.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.time {
                let span = b.time - a.time;
                if span <= f32::EPSILON {
                    return b.value;
                }
                return a.value + (b.value - a.value) * (t - a.time) / span;
            }
        }

        last.value
    }
}

use serde::Deserialize;

/// Piecewise-linear remapping curve used to shape normalized heights.
///
/// Deserializes from a list of `[time, value]` pairs. Inputs outside the key
/// range clamp to the first/last value; an empty curve evaluates to zero.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(from = "Vec<[f32; 2]>")]
pub struct HeightCurve {
    keys: Vec<[f32; 2]>,
}

impl From<Vec<[f32; 2]>> for HeightCurve {
    fn from(keys: Vec<[f32; 2]>) -> Self {
        Self::new(keys)
    }
}

impl Default for HeightCurve {
    fn default() -> Self {
        Self::linear()
    }
}

impl HeightCurve {
    pub fn new(mut keys: Vec<[f32; 2]>) -> Self {
        keys.sort_by(|a, b| a[0].total_cmp(&b[0]));
        Self { keys }
    }

    /// Identity on [0, 1].
    pub fn linear() -> Self {
        Self::new(vec![[0.0, 0.0], [1.0, 1.0]])
    }

    pub fn keys(&self) -> &[[f32; 2]] {
        &self.keys
    }

    pub fn evaluate(&self, t: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return 0.0;
        };
        if t <= first[0] {
            return first[1];
        }
        if t >= last[0] {
            return last[1];
        }
        for pair in self.keys.windows(2) {
            let [t0, v0] = pair[0];
            let [t1, v1] = pair[1];
            if t <= t1 {
                if t1 == t0 {
                    return v1;
                }
                let f = (t - t0) / (t1 - t0);
                return v0 + (v1 - v0) * f;
            }
        }
        last[1]
    }
}

//! Spatial-domain transforms applied to quantized values.

use pixels_common::{verify_codomain, CodomainMapDef, ConfigError};

/// The transform of a context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CodomainMap {
    Identity,
    ReverseIntensity,
    ContrastStretching {
        x_start: i32,
        y_start: i32,
        x_end: i32,
        y_end: i32,
    },
    PlaneSlicing {
        plane_selected: u32,
        lower_limit: i32,
        upper_limit: i32,
        constant: bool,
    },
}

/// A codomain transform bound to its own sub-interval of [0, 255].
#[derive(Debug, Clone, PartialEq)]
pub struct CodomainMapContext {
    start: i32,
    end: i32,
    map: CodomainMap,
}

impl CodomainMapContext {
    pub fn identity(start: i32, end: i32) -> Self {
        Self {
            start,
            end,
            map: CodomainMap::Identity,
        }
    }

    /// Build a context from its persisted form.
    pub fn from_def(def: &CodomainMapDef, start: i32, end: i32) -> Result<Self, ConfigError> {
        verify_codomain(start, end)?;
        let map = match *def {
            CodomainMapDef::ReverseIntensity => CodomainMap::ReverseIntensity,
            CodomainMapDef::ContrastStretching {
                x_start,
                y_start,
                x_end,
                y_end,
            } => {
                let inside = |v: i32| (start..=end).contains(&v);
                if x_start > x_end || ![x_start, y_start, x_end, y_end].into_iter().all(inside) {
                    return Err(ConfigError::Settings(format!(
                        "contrast stretching points ({x_start}, {y_start}), ({x_end}, {y_end}) \
                         outside [{start}, {end}]"
                    )));
                }
                CodomainMap::ContrastStretching {
                    x_start,
                    y_start,
                    x_end,
                    y_end,
                }
            }
            CodomainMapDef::PlaneSlicing {
                plane_selected,
                lower_limit,
                upper_limit,
                constant,
            } => {
                if !(1..=8).contains(&plane_selected) {
                    return Err(ConfigError::Settings(format!(
                        "bit plane {plane_selected} not in 1..=8"
                    )));
                }
                if lower_limit > upper_limit || lower_limit < start || upper_limit > end {
                    return Err(ConfigError::Settings(format!(
                        "plane slicing limits [{lower_limit}, {upper_limit}] outside [{start}, {end}]"
                    )));
                }
                CodomainMap::PlaneSlicing {
                    plane_selected,
                    lower_limit,
                    upper_limit,
                    constant,
                }
            }
        };
        Ok(Self { start, end, map })
    }

    /// Persisted form, `None` for the identity.
    pub fn to_def(&self) -> Option<CodomainMapDef> {
        match self.map {
            CodomainMap::Identity => None,
            CodomainMap::ReverseIntensity => Some(CodomainMapDef::ReverseIntensity),
            CodomainMap::ContrastStretching {
                x_start,
                y_start,
                x_end,
                y_end,
            } => Some(CodomainMapDef::ContrastStretching {
                x_start,
                y_start,
                x_end,
                y_end,
            }),
            CodomainMap::PlaneSlicing {
                plane_selected,
                lower_limit,
                upper_limit,
                constant,
            } => Some(CodomainMapDef::PlaneSlicing {
                plane_selected,
                lower_limit,
                upper_limit,
                constant,
            }),
        }
    }

    pub fn map(&self) -> &CodomainMap {
        &self.map
    }

    pub fn is_identity(&self) -> bool {
        self.map == CodomainMap::Identity
    }

    pub fn kind(&self) -> &'static str {
        match self.to_def() {
            Some(def) => def.kind(),
            None => "identity",
        }
    }

    pub fn interval(&self) -> (i32, i32) {
        (self.start, self.end)
    }

    /// Move the context to a new sub-interval, pulling its parameters inside.
    pub fn set_codomain(&mut self, start: i32, end: i32) {
        self.start = start;
        self.end = end;
        let clamp = |v: i32| v.clamp(start, end);
        match &mut self.map {
            CodomainMap::Identity | CodomainMap::ReverseIntensity => {}
            CodomainMap::ContrastStretching {
                x_start,
                y_start,
                x_end,
                y_end,
            } => {
                *x_start = clamp(*x_start);
                *y_start = clamp(*y_start);
                *x_end = clamp(*x_end);
                *y_end = clamp(*y_end);
            }
            CodomainMap::PlaneSlicing {
                lower_limit,
                upper_limit,
                ..
            } => {
                *lower_limit = clamp(*lower_limit);
                *upper_limit = clamp(*upper_limit);
            }
        }
    }

    /// Transform `x`, result clamped to the context interval.
    #[inline]
    pub fn transform(&self, x: i32) -> i32 {
        let (s, e) = (self.start, self.end);
        let x = x.clamp(s, e);
        let y = match self.map {
            CodomainMap::Identity => x,
            CodomainMap::ReverseIntensity => e - (x - s),
            CodomainMap::ContrastStretching {
                x_start,
                y_start,
                x_end,
                y_end,
            } => {
                if x <= x_start {
                    segment(x, s, s, x_start, y_start)
                } else if x < x_end {
                    segment(x, x_start, y_start, x_end, y_end)
                } else {
                    segment(x, x_end, y_end, e, e)
                }
            }
            CodomainMap::PlaneSlicing {
                plane_selected,
                lower_limit,
                upper_limit,
                constant,
            } => {
                let previous = (1i32 << (plane_selected - 1)) - 1;
                let selected = (1i32 << plane_selected) - 1;
                if x < previous {
                    lower_limit
                } else if x > selected {
                    upper_limit
                } else if constant {
                    selected
                } else {
                    x
                }
            }
        };
        y.clamp(s, e)
    }
}

/// Linear interpolation of `x` on the segment `(x0, y0)`–`(x1, y1)`.
fn segment(x: i32, x0: i32, y0: i32, x1: i32, y1: i32) -> i32 {
    if x1 == x0 {
        return y1;
    }
    let slope = (y1 - y0) as f64 / (x1 - x0) as f64;
    (y0 as f64 + slope * (x - x0) as f64).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_intensity() {
        let ctx = CodomainMapContext::from_def(&CodomainMapDef::ReverseIntensity, 0, 255).unwrap();
        assert_eq!(ctx.transform(0), 255);
        assert_eq!(ctx.transform(255), 0);
        assert_eq!(ctx.transform(55), 200);
    }

    #[test]
    fn test_contrast_stretching() {
        let def = CodomainMapDef::ContrastStretching {
            x_start: 50,
            y_start: 10,
            x_end: 200,
            y_end: 245,
        };
        let ctx = CodomainMapContext::from_def(&def, 0, 255).unwrap();
        assert_eq!(ctx.transform(0), 0);
        assert_eq!(ctx.transform(50), 10);
        assert_eq!(ctx.transform(200), 245);
        assert_eq!(ctx.transform(255), 255);
        assert!(ctx.transform(125) > 125);
    }

    #[test]
    fn test_plane_slicing() {
        let def = CodomainMapDef::PlaneSlicing {
            plane_selected: 7,
            lower_limit: 0,
            upper_limit: 255,
            constant: true,
        };
        let ctx = CodomainMapContext::from_def(&def, 0, 255).unwrap();
        assert_eq!(ctx.transform(10), 0);
        assert_eq!(ctx.transform(100), 127);
        assert_eq!(ctx.transform(200), 255);
    }

    #[test]
    fn test_invalid_defs() {
        let def = CodomainMapDef::PlaneSlicing {
            plane_selected: 9,
            lower_limit: 0,
            upper_limit: 255,
            constant: false,
        };
        assert!(CodomainMapContext::from_def(&def, 0, 255).is_err());

        let def = CodomainMapDef::ContrastStretching {
            x_start: 200,
            y_start: 0,
            x_end: 100,
            y_end: 255,
        };
        assert!(CodomainMapContext::from_def(&def, 0, 255).is_err());
    }

    #[test]
    fn test_set_codomain_clamps_parameters() {
        let def = CodomainMapDef::ContrastStretching {
            x_start: 20,
            y_start: 10,
            x_end: 240,
            y_end: 250,
        };
        let mut ctx = CodomainMapContext::from_def(&def, 0, 255).unwrap();
        ctx.set_codomain(50, 200);
        assert_eq!(ctx.interval(), (50, 200));
        assert_eq!(
            ctx.to_def(),
            Some(CodomainMapDef::ContrastStretching {
                x_start: 50,
                y_start: 50,
                x_end: 200,
                y_end: 200,
            })
        );
    }
}

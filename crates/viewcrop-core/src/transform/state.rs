//! Transform state and its reducer.
//!
//! [`TransformState`] is a plain value. Every change goes through
//! [`reduce`], which takes the current state and an [`Action`] and returns
//! the next state, so the whole viewer can be driven and tested without a
//! rendering surface.

use serde::{Deserialize, Serialize};
use tracing::trace;

/// Smallest logical zoom accepted. Requests at or below zero clamp here.
pub const MIN_SCALE: f64 = 0.01;

/// Rotation constrained to multiples of 90 degrees (clockwise on screen).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Quadrant {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Quadrant {
    /// Advance by +90 degrees, wrapping at 360.
    pub fn next(self) -> Self {
        match self {
            Quadrant::Deg0 => Quadrant::Deg90,
            Quadrant::Deg90 => Quadrant::Deg180,
            Quadrant::Deg180 => Quadrant::Deg270,
            Quadrant::Deg270 => Quadrant::Deg0,
        }
    }

    pub fn degrees(self) -> u32 {
        match self {
            Quadrant::Deg0 => 0,
            Quadrant::Deg90 => 90,
            Quadrant::Deg180 => 180,
            Quadrant::Deg270 => 270,
        }
    }

    /// True for 90 and 270, where the output width and height trade places.
    #[inline]
    pub fn swaps_axes(self) -> bool {
        matches!(self, Quadrant::Deg90 | Quadrant::Deg270)
    }

    /// Exact `(cos, sin)` of the angle. Avoids the `6e-17` residue of
    /// `f64::cos(PI / 2)` so quadrant rotations stay pixel exact.
    #[inline]
    pub fn cos_sin(self) -> (f64, f64) {
        match self {
            Quadrant::Deg0 => (1.0, 0.0),
            Quadrant::Deg90 => (0.0, 1.0),
            Quadrant::Deg180 => (-1.0, 0.0),
            Quadrant::Deg270 => (0.0, -1.0),
        }
    }
}

/// Sign multiplier for one mirror axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Flip {
    #[default]
    Normal,
    Mirrored,
}

impl Flip {
    pub fn toggled(self) -> Self {
        match self {
            Flip::Normal => Flip::Mirrored,
            Flip::Mirrored => Flip::Normal,
        }
    }

    /// `+1.0` or `-1.0`.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Flip::Normal => 1.0,
            Flip::Mirrored => -1.0,
        }
    }
}

/// One of the four colour controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorParam {
    /// Percent, 100 = unchanged.
    Brightness,
    /// Percent, 100 = unchanged.
    Saturation,
    /// Percent, 100 = unchanged.
    Contrast,
    /// Degrees, 0 = unchanged.
    Hue,
}

impl ColorParam {
    pub const ALL: [ColorParam; 4] = [
        ColorParam::Brightness,
        ColorParam::Saturation,
        ColorParam::Contrast,
        ColorParam::Hue,
    ];

    /// Inclusive `(min, max)` accepted for this parameter.
    pub fn domain(self) -> (f64, f64) {
        match self {
            ColorParam::Brightness | ColorParam::Saturation | ColorParam::Contrast => (0.0, 200.0),
            ColorParam::Hue => (-180.0, 180.0),
        }
    }

    pub fn default_value(self) -> f64 {
        match self {
            ColorParam::Hue => 0.0,
            _ => 100.0,
        }
    }

    /// Clamp into the domain. NaN falls back to the default.
    pub fn clamp(self, value: f64) -> f64 {
        if value.is_nan() {
            return self.default_value();
        }
        let (min, max) = self.domain();
        value.clamp(min, max)
    }
}

/// Colour adjustments, independent of the geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorAdjustments {
    /// Brightness percent (0 to 200)
    pub brightness: f64,
    /// Saturation percent (0 to 200)
    pub saturation: f64,
    /// Contrast percent (0 to 200)
    pub contrast: f64,
    /// Hue rotation in degrees (-180 to 180)
    pub hue: f64,
}

impl Default for ColorAdjustments {
    fn default() -> Self {
        Self {
            brightness: 100.0,
            saturation: 100.0,
            contrast: 100.0,
            hue: 0.0,
        }
    }
}

impl ColorAdjustments {
    /// Check if all values are at their defaults
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    pub fn get(&self, param: ColorParam) -> f64 {
        match param {
            ColorParam::Brightness => self.brightness,
            ColorParam::Saturation => self.saturation,
            ColorParam::Contrast => self.contrast,
            ColorParam::Hue => self.hue,
        }
    }

    /// Set a parameter, silently clamping to its domain.
    pub fn with(mut self, param: ColorParam, value: f64) -> Self {
        let value = param.clamp(value);
        match param {
            ColorParam::Brightness => self.brightness = value,
            ColorParam::Saturation => self.saturation = value,
            ColorParam::Contrast => self.contrast = value,
            ColorParam::Hue => self.hue = value,
        }
        self
    }
}

/// Geometric and colour transform applied to the working bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformState {
    /// Logical zoom on top of the fit-to-container scale. Always > 0.
    pub scale: f64,
    pub rotation: Quadrant,
    pub flip_horizontal: Flip,
    pub flip_vertical: Flip,
    pub color: ColorAdjustments,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            rotation: Quadrant::Deg0,
            flip_horizontal: Flip::Normal,
            flip_vertical: Flip::Normal,
            color: ColorAdjustments::default(),
        }
    }
}

impl TransformState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when scale, rotation and both flips are at identity.
    pub fn is_geometry_identity(&self) -> bool {
        self.scale == 1.0
            && self.rotation == Quadrant::Deg0
            && self.flip_horizontal == Flip::Normal
            && self.flip_vertical == Flip::Normal
    }

    /// Same colour, identity geometry.
    pub fn with_identity_geometry(&self) -> Self {
        Self {
            color: self.color,
            ..Self::default()
        }
    }
}

/// A single state change requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Rotate by +90 degrees.
    Rotate,
    FlipHorizontal,
    FlipVertical,
    /// Set the logical zoom. Values <= 0 clamp to [`MIN_SCALE`].
    SetScale(f64),
    /// Multiply the logical zoom by the given step.
    ZoomIn(f64),
    /// Divide the logical zoom by the given step.
    ZoomOut(f64),
    /// Set a colour parameter, clamped to its domain.
    SetColor(ColorParam, f64),
    /// Identity geometry, colour kept.
    ResetGeometry,
    /// Default colour, geometry kept.
    ResetColor,
}

impl Action {
    /// Whether this action can move pixels on the surface. Only colour
    /// actions leave every pixel where it was.
    pub fn affects_geometry(&self) -> bool {
        !matches!(self, Action::SetColor(..) | Action::ResetColor)
    }
}

fn clamp_scale(current: f64, requested: f64) -> f64 {
    if requested.is_nan() || requested.is_infinite() {
        return current;
    }
    requested.max(MIN_SCALE)
}

/// Apply `action` to `state`, returning the next state.
pub fn reduce(state: TransformState, action: Action) -> TransformState {
    trace!(?action, "reduce transform state");
    let mut next = state;
    match action {
        Action::Rotate => next.rotation = state.rotation.next(),
        Action::FlipHorizontal => next.flip_horizontal = state.flip_horizontal.toggled(),
        Action::FlipVertical => next.flip_vertical = state.flip_vertical.toggled(),
        Action::SetScale(s) => next.scale = clamp_scale(state.scale, s),
        Action::ZoomIn(step) => {
            if step.is_finite() && step > 0.0 {
                next.scale = clamp_scale(state.scale, state.scale * step);
            }
        }
        Action::ZoomOut(step) => {
            if step.is_finite() && step > 0.0 {
                next.scale = clamp_scale(state.scale, state.scale / step);
            }
        }
        Action::SetColor(param, value) => next.color = state.color.with(param, value),
        Action::ResetGeometry => next = state.with_identity_geometry(),
        Action::ResetColor => next.color = ColorAdjustments::default(),
    }
    next
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn action_strategy() -> impl Strategy<Value = Action> {
        prop_oneof![
            Just(Action::Rotate),
            Just(Action::FlipHorizontal),
            Just(Action::FlipVertical),
            (-10.0f64..10.0).prop_map(Action::SetScale),
            (0.5f64..2.0).prop_map(Action::ZoomIn),
            (0.5f64..2.0).prop_map(Action::ZoomOut),
            (-500.0f64..500.0).prop_map(|v| Action::SetColor(ColorParam::Brightness, v)),
            (-500.0f64..500.0).prop_map(|v| Action::SetColor(ColorParam::Hue, v)),
            Just(Action::ResetGeometry),
        ]
    }

    proptest! {
        /// Property: Any action sequence keeps scale positive and colour in domain.
        #[test]
        fn prop_state_stays_valid(actions in prop::collection::vec(action_strategy(), 0..40)) {
            let state = actions.into_iter().fold(TransformState::new(), reduce);

            prop_assert!(state.scale > 0.0);
            for param in ColorParam::ALL {
                let (min, max) = param.domain();
                let v = state.color.get(param);
                prop_assert!(v >= min && v <= max, "{:?} = {} out of domain", param, v);
            }
        }

        /// Property: Four rotations return to the starting state.
        #[test]
        fn prop_rotation_four_cycle(actions in prop::collection::vec(action_strategy(), 0..10)) {
            let state = actions.into_iter().fold(TransformState::new(), reduce);
            let cycled = (0..4).fold(state, |s, _| reduce(s, Action::Rotate));
            prop_assert_eq!(cycled, state);
        }

        /// Property: Flipping twice is the identity on any state.
        #[test]
        fn prop_double_flip_identity(actions in prop::collection::vec(action_strategy(), 0..10)) {
            let state = actions.into_iter().fold(TransformState::new(), reduce);
            let h = reduce(reduce(state, Action::FlipHorizontal), Action::FlipHorizontal);
            let v = reduce(reduce(state, Action::FlipVertical), Action::FlipVertical);
            prop_assert_eq!(h, state);
            prop_assert_eq!(v, state);
        }
    }
}

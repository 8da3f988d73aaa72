// Shared state machine and caller-facing contract of every discrete filter
// Copyright © 2025 Hs293Go
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the "Software"),
// to deal in the Software without restriction, including without limitation
// the rights to use, copy, modify, merge, publish, distribute, sublicense,
// and/or sell copies of the Software, and to permit persons to whom the
// Software is furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included
// in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES
// OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT.
// IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
// DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT,
// TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE
// OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use num_traits::float::{FloatConst, FloatCore};
use num_traits::NumCast;

/// The scalar types accepted by the filters and the PID controller.
///
/// Blanket-implemented for every type satisfying the bounds, notably `f32` and `f64`.
pub trait Scalar: FloatCore + FloatConst {}

impl<T: FloatCore + FloatConst> Scalar for T {}

/// Converts an `f64` literal into `T`. Never fails for `f32`/`f64`; any other type that cannot
/// represent the literal receives NaN instead of panicking.
#[inline]
pub(crate) fn lit<T: Scalar>(value: f64) -> T {
    <T as NumCast>::from(value).unwrap_or_else(T::nan)
}

/// Errors raised when configuring a filter with parameters that cannot describe a filter.
///
/// A failing setter never modifies the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FilterConfigError {
    /// The natural frequency is negative, NaN or infinite.
    #[cfg_attr(
        feature = "std",
        error("Natural frequency must be finite and non-negative")
    )]
    InvalidNaturalFrequency,

    /// The damping ratio is negative, NaN or infinite.
    #[cfg_attr(feature = "std", error("Damping ratio must be finite and non-negative"))]
    InvalidDampingRatio,

    /// A transfer function coefficient is NaN or infinite.
    #[cfg_attr(feature = "std", error("Filter coefficients must be finite"))]
    InvalidCoefficient,

    /// The filter shape has no single tunable parameter to retune.
    #[cfg_attr(
        feature = "std",
        error("This filter shape cannot be retuned with a single parameter")
    )]
    UnsupportedRetune,
}

/// Lifecycle of a filter.
///
/// A filter is `Uninitialized` until the first call to [`Filter::init`] or [`Filter::step`];
/// [`Filter::reset`] sends it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// The output is meaningless; the next step initializes the filter from its target.
    #[default]
    Uninitialized,
    /// The output and history hold valid samples.
    Ready,
}

/// The target/output pair and lifecycle phase common to every filter.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FilterState<T> {
    input: T,
    output: T,
    phase: Phase,
}

impl<T: Scalar> Default for FilterState<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar> FilterState<T> {
    /// Creates a zeroed, uninitialized state.
    pub fn new() -> Self {
        Self {
            input: T::zero(),
            output: T::zero(),
            phase: Phase::Uninitialized,
        }
    }

    /// Last target value passed to `set`/`step`.
    pub fn input(&self) -> T {
        self.input
    }

    /// Last computed output.
    pub fn output(&self) -> T {
        self.output
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn set_input(&mut self, input: T) {
        self.input = input;
    }

    pub(crate) fn set_output(&mut self, output: T) {
        self.output = output;
    }

    pub(crate) fn mark_ready(&mut self) {
        self.phase = Phase::Ready;
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::new();
    }
}

/// The contract shared by every discrete filter.
///
/// A control loop owns one filter per channel and, once per tick, calls [`Filter::step`] with
/// the new target and the elapsed time step `dt`, then reads [`Filter::get`].
///
/// `dt` must be strictly positive. It is not validated: a zero or negative step yields
/// infinite or NaN outputs for shapes whose recurrence divides by it.
pub trait Filter<T: Scalar> {
    /// Stores a new target without computing anything.
    fn set(&mut self, target: T);

    /// Returns the last computed output. Has no side effect.
    fn get(&self) -> T;

    /// Forces a transient-free start from the stored target and marks the filter ready.
    fn init(&mut self);

    /// Equivalent to `set(target)` followed by `init()`.
    fn init_with(&mut self, target: T) {
        self.set(target);
        self.init();
    }

    /// Clears the target, output and history and returns to [`Phase::Uninitialized`].
    /// Coefficients and shape parameters are kept.
    fn reset(&mut self);

    /// Advances the filter by one time step towards `target`, returning the new output.
    ///
    /// An uninitialized filter is initialized from `target` first. If the recurrence
    /// denominator vanishes for this `dt`, the step is skipped and the output is held.
    fn step(&mut self, target: T, dt: T) -> T;

    /// Current lifecycle phase.
    fn phase(&self) -> Phase;

    /// Returns `true` once the filter has been initialized.
    fn is_initialized(&self) -> bool {
        self.phase() == Phase::Ready
    }
}

pub(crate) fn check_finite<T: Scalar>(values: &[T]) -> Result<(), FilterConfigError> {
    if values.iter().all(|it| it.is_finite()) {
        Ok(())
    } else {
        Err(FilterConfigError::InvalidCoefficient)
    }
}

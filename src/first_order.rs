// Single-pole bilinear recurrence and the shapes built on it
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

use crate::filter::{check_finite, lit, Filter, FilterConfigError, FilterState, Phase, Scalar};

/// Coefficients of the continuous transfer function `(c1·s + c2) / (c3·s + c4)`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FirstOrderCoefficients<T> {
    /// Numerator `s` coefficient.
    pub c1: T,
    /// Numerator constant.
    pub c2: T,
    /// Denominator `s` coefficient.
    pub c3: T,
    /// Denominator constant.
    pub c4: T,
}

impl<T: Scalar> FirstOrderCoefficients<T> {
    /// Constructs the coefficients of `(c1·s + c2) / (c3·s + c4)`.
    pub fn new(c1: T, c2: T, c3: T, c4: T) -> Self {
        Self { c1, c2, c3, c4 }
    }

    /// Lead-lag coefficients `(c1·s + 1) / (s + 1)`.
    pub fn lead(c1: T) -> Self {
        Self::new(c1, T::one(), T::one(), T::one())
    }

    /// Steady-state (DC) gain `c2 / c4`, or zero when the denominator constant vanishes.
    pub fn dc_gain(&self) -> T {
        if self.c4 == T::zero() {
            T::zero()
        } else {
            self.c2 / self.c4
        }
    }

    fn validate(&self) -> Result<(), FilterConfigError> {
        check_finite(&[self.c1, self.c2, self.c3, self.c4])
    }
}

/// The recurrence engine for first-order transfer functions discretized with the Tustin
/// transform. Holds a single sample of input history.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FirstOrderKernel<T> {
    coefficients: FirstOrderCoefficients<T>,
    previous_input: T,
}

impl<T: Scalar> FirstOrderKernel<T> {
    /// Creates a kernel with empty history.
    pub fn new(coefficients: FirstOrderCoefficients<T>) -> Self {
        Self {
            coefficients,
            previous_input: T::zero(),
        }
    }

    /// The continuous transfer function coefficients.
    pub fn coefficients(&self) -> &FirstOrderCoefficients<T> {
        &self.coefficients
    }

    /// Input sample retained from the previous step.
    pub fn previous_input(&self) -> T {
        self.previous_input
    }

    /// Computes the next output from `input` and `previous_output`, then shifts the history.
    ///
    /// Returns `None`, leaving the history untouched, when `2·c3 + dt·c4` is zero.
    pub fn advance(&mut self, input: T, previous_output: T, dt: T) -> Option<T> {
        let FirstOrderCoefficients { c1, c2, c3, c4 } = self.coefficients;
        let two = lit::<T>(2.0);

        let den = two * c3 + dt * c4;
        if den == T::zero() {
            trace_skip!("first-order step skipped: degenerate denominator");
            return None;
        }

        let ca = (two * c1 + dt * c2) / den;
        let cb = (dt * c2 - two * c1) / den;
        let cc = (two * c3 - dt * c4) / den;

        let output = ca * input + cb * self.previous_input + cc * previous_output;
        self.previous_input = input;
        Some(output)
    }

    fn prime(&mut self, input: T) {
        self.previous_input = input;
    }

    fn clear(&mut self) {
        self.previous_input = T::zero();
    }
}

/// The physical meaning assigned to a first-order kernel's coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FirstOrderShape {
    /// Arbitrary `(c1·s + c2) / (c3·s + c4)` supplied by the caller.
    General,
    /// `k / s`, integrated with the trapezoidal rule.
    Integrator,
    /// `k · s`.
    Derivator,
    /// First-order lag (low-pass) `a / (s + a)`.
    Lag,
    /// Washout (high-pass) `s / (s + a)`.
    Washout,
    /// `(c1·s + c2) / (c3·s + c4)`, initialized to its steady-state response.
    LeadLag,
}

impl FirstOrderShape {
    /// Maps the single tunable parameter of a shape onto transfer function coefficients.
    ///
    /// Returns `None` for shapes with more than one tunable coefficient.
    pub fn coefficients<T: Scalar>(self, parameter: T) -> Option<FirstOrderCoefficients<T>> {
        let (zero, one) = (T::zero(), T::one());
        let (c1, c2, c3, c4) = match self {
            FirstOrderShape::Integrator => (zero, parameter, one, zero),
            FirstOrderShape::Derivator => (parameter, zero, zero, one),
            FirstOrderShape::Lag => (zero, parameter, one, parameter),
            FirstOrderShape::Washout => (one, zero, one, parameter),
            FirstOrderShape::General | FirstOrderShape::LeadLag => return None,
        };
        Some(FirstOrderCoefficients::new(c1, c2, c3, c4))
    }

    /// Whether `init` pre-warms the output to the steady-state gain instead of snapping it to
    /// the target.
    pub fn warms_to_steady_state(self) -> bool {
        matches!(self, FirstOrderShape::LeadLag)
    }
}

/// A first-order discrete filter: a [`FirstOrderKernel`] tagged with a [`FirstOrderShape`].
///
/// # Example
///
/// ```rust
/// use tustin_control::filter::Filter;
/// use tustin_control::first_order::FirstOrderFilter;
///
/// // 1 s time constant
/// let mut lag = FirstOrderFilter::lag(1.0_f64).unwrap();
/// lag.init_with(0.0);
/// for _ in 0..50 {
///     lag.step(1.0, 0.1);
/// }
/// assert!((lag.get() - 1.0).abs() < 0.01);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FirstOrderFilter<T> {
    state: FilterState<T>,
    kernel: FirstOrderKernel<T>,
    shape: FirstOrderShape,
}

impl<T: Scalar> FirstOrderFilter<T> {
    fn from_parts(shape: FirstOrderShape, coefficients: FirstOrderCoefficients<T>) -> Self {
        Self {
            state: FilterState::new(),
            kernel: FirstOrderKernel::new(coefficients),
            shape,
        }
    }

    fn with_parameter(shape: FirstOrderShape, parameter: T) -> Result<Self, FilterConfigError> {
        let coefficients = shape
            .coefficients(parameter)
            .ok_or(FilterConfigError::UnsupportedRetune)?;
        coefficients.validate()?;
        Ok(Self::from_parts(shape, coefficients))
    }

    /// A filter realizing arbitrary `(c1·s + c2) / (c3·s + c4)`.
    pub fn general(coefficients: FirstOrderCoefficients<T>) -> Result<Self, FilterConfigError> {
        coefficients.validate()?;
        Ok(Self::from_parts(FirstOrderShape::General, coefficients))
    }

    /// Integrator `gain / s`.
    pub fn integrator(gain: T) -> Result<Self, FilterConfigError> {
        Self::with_parameter(FirstOrderShape::Integrator, gain)
    }

    /// Derivator `gain · s`.
    pub fn derivator(gain: T) -> Result<Self, FilterConfigError> {
        Self::with_parameter(FirstOrderShape::Derivator, gain)
    }

    /// First-order lag `corner / (s + corner)`, with `corner` in rad/s.
    pub fn lag(corner: T) -> Result<Self, FilterConfigError> {
        Self::with_parameter(FirstOrderShape::Lag, corner)
    }

    /// First-order lag with time constant `tau`, i.e. `corner = 1 / tau`.
    pub fn lag_from_time_constant(tau: T) -> Result<Self, FilterConfigError> {
        Self::lag(tau.recip())
    }

    /// Washout `s / (s + corner)`.
    pub fn washout(corner: T) -> Result<Self, FilterConfigError> {
        Self::with_parameter(FirstOrderShape::Washout, corner)
    }

    /// Lead-lag `(c1·s + c2) / (c3·s + c4)`. See [`FirstOrderCoefficients::lead`] for the
    /// `c2 = c3 = c4 = 1` default.
    pub fn lead_lag(coefficients: FirstOrderCoefficients<T>) -> Result<Self, FilterConfigError> {
        coefficients.validate()?;
        Ok(Self::from_parts(FirstOrderShape::LeadLag, coefficients))
    }

    /// The shape this filter realizes.
    pub fn shape(&self) -> FirstOrderShape {
        self.shape
    }

    /// The underlying recurrence.
    pub fn kernel(&self) -> &FirstOrderKernel<T> {
        &self.kernel
    }

    /// The continuous transfer function coefficients.
    pub fn coefficients(&self) -> &FirstOrderCoefficients<T> {
        self.kernel.coefficients()
    }

    /// Last target value.
    pub fn input(&self) -> T {
        self.state.input()
    }

    /// Replaces the transfer function coefficients. History is preserved.
    pub fn set_coefficients(
        &mut self,
        coefficients: FirstOrderCoefficients<T>,
    ) -> Result<(), FilterConfigError> {
        coefficients.validate()?;
        self.kernel.coefficients = coefficients;
        Ok(())
    }

    /// Re-derives the coefficients from a new gain or corner frequency, for shapes with a single
    /// tunable parameter.
    pub fn retune(&mut self, parameter: T) -> Result<(), FilterConfigError> {
        let coefficients = self
            .shape
            .coefficients(parameter)
            .ok_or(FilterConfigError::UnsupportedRetune)?;
        self.set_coefficients(coefficients)
    }

    /// Replaces the coefficients, then steps.
    pub fn step_with(
        &mut self,
        target: T,
        dt: T,
        coefficients: FirstOrderCoefficients<T>,
    ) -> Result<T, FilterConfigError> {
        self.set_coefficients(coefficients)?;
        Ok(self.step(target, dt))
    }
}

impl<T: Scalar> Filter<T> for FirstOrderFilter<T> {
    fn set(&mut self, target: T) {
        self.state.set_input(target);
    }

    fn get(&self) -> T {
        self.state.output()
    }

    fn init(&mut self) {
        let input = self.state.input();
        let output = if self.shape.warms_to_steady_state() {
            self.kernel.coefficients.dc_gain() * input
        } else {
            input
        };
        self.kernel.prime(input);
        self.state.set_output(output);
        self.state.mark_ready();
    }

    fn reset(&mut self) {
        self.state.clear();
        self.kernel.clear();
    }

    fn step(&mut self, target: T, dt: T) -> T {
        self.state.set_input(target);
        if self.state.phase() == Phase::Uninitialized {
            self.init();
        }

        if let Some(output) = self.kernel.advance(target, self.state.output(), dt) {
            self.state.set_output(output);
        }
        self.state.output()
    }

    fn phase(&self) -> Phase {
        self.state.phase()
    }
}

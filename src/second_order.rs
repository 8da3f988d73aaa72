// Two-pole bilinear recurrence and the shapes built on it
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

/// Natural frequency applied by the default constructors of the frequency-parametrized shapes.
pub const DEFAULT_NATURAL_FREQUENCY: f64 = 80.0;

/// Coefficients of the continuous transfer function
/// `(c1·s² + c2·s + c3) / (c4·s² + c5·s + c6)`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SecondOrderCoefficients<T> {
    /// Numerator `s²` coefficient.
    pub c1: T,
    /// Numerator `s` coefficient.
    pub c2: T,
    /// Numerator constant.
    pub c3: T,
    /// Denominator `s²` coefficient.
    pub c4: T,
    /// Denominator `s` coefficient.
    pub c5: T,
    /// Denominator constant.
    pub c6: T,
}

impl<T: Scalar> SecondOrderCoefficients<T> {
    /// Constructs the coefficients of `(c1·s² + c2·s + c3) / (c4·s² + c5·s + c6)`.
    pub fn new(c1: T, c2: T, c3: T, c4: T, c5: T, c6: T) -> Self {
        Self {
            c1,
            c2,
            c3,
            c4,
            c5,
            c6,
        }
    }

    fn zeroed() -> Self {
        let zero = T::zero();
        Self::new(zero, zero, zero, zero, zero, zero)
    }

    /// Steady-state (DC) gain `c3 / c6`, or zero when the denominator constant vanishes.
    pub fn dc_gain(&self) -> T {
        if self.c6 == T::zero() {
            T::zero()
        } else {
            self.c3 / self.c6
        }
    }

    fn validate(&self) -> Result<(), FilterConfigError> {
        check_finite(&[self.c1, self.c2, self.c3, self.c4, self.c5, self.c6])
    }
}

/// The recurrence engine for second-order transfer functions discretized with the Tustin
/// transform. Holds two samples of input and output history.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SecondOrderKernel<T> {
    coefficients: SecondOrderCoefficients<T>,
    previous_inputs: [T; 2],
    previous_outputs: [T; 2],
}

impl<T: Scalar> SecondOrderKernel<T> {
    /// Creates a kernel with empty history.
    pub fn new(coefficients: SecondOrderCoefficients<T>) -> Self {
        Self {
            coefficients,
            previous_inputs: [T::zero(); 2],
            previous_outputs: [T::zero(); 2],
        }
    }

    /// The continuous transfer function coefficients.
    pub fn coefficients(&self) -> &SecondOrderCoefficients<T> {
        &self.coefficients
    }

    /// Inputs from the last two steps, most recent first.
    pub fn previous_inputs(&self) -> [T; 2] {
        self.previous_inputs
    }

    /// Outputs from the last two steps, most recent first.
    pub fn previous_outputs(&self) -> [T; 2] {
        self.previous_outputs
    }

    /// Computes the next output from `input`, then shifts the history.
    ///
    /// Returns `None`, leaving the history untouched, when `4·c4 + 2·c5·dt + c6·dt²` is zero.
    pub fn advance(&mut self, input: T, dt: T) -> Option<T> {
        let SecondOrderCoefficients {
            c1,
            c2,
            c3,
            c4,
            c5,
            c6,
        } = self.coefficients;
        let two = lit::<T>(2.0);
        let four = lit::<T>(4.0);
        let eight = lit::<T>(8.0);
        let dt2 = dt * dt;

        let den = four * c4 + two * c5 * dt + c6 * dt2;
        if den == T::zero() {
            trace_skip!("second-order step skipped: degenerate denominator");
            return None;
        }

        let ca = (four * c1 + two * c2 * dt + c3 * dt2) / den;
        let cb = (two * c3 * dt2 - eight * c1) / den;
        let cc = (four * c1 - two * c2 * dt + c3 * dt2) / den;
        let cd = (two * c6 * dt2 - eight * c4) / den;
        let ce = (four * c4 - two * c5 * dt + c6 * dt2) / den;

        let [u1, u2] = self.previous_inputs;
        let [y1, y2] = self.previous_outputs;
        let output = ca * input + cb * u1 + cc * u2 - cd * y1 - ce * y2;

        self.previous_inputs = [input, u1];
        self.previous_outputs = [output, y1];
        Some(output)
    }

    fn prime(&mut self, input: T, output: T) {
        self.previous_inputs = [input; 2];
        self.previous_outputs = [output; 2];
    }

    fn clear(&mut self) {
        self.prime(T::zero(), T::zero());
    }
}

/// The physical meaning assigned to a second-order kernel's coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SecondOrderShape {
    /// Arbitrary coefficients supplied by the caller.
    General,
    /// `1 / (c4·s² + c5·s + c6)`, with the denominator supplied by the caller.
    Aliasing,
    /// `ωn² / (s² + 2ζωn·s + ωn²)`.
    LowPass,
    /// `s² / (s² + 2ζωn·s + ωn²)`.
    HighPass,
    /// `2ζωn·s / (s² + 2ζωn·s + ωn²)`.
    BandPass,
    /// Notch `(s² + ωn²) / (s² + 2ζωn·s + ωn²)`.
    BandStop,
}

impl SecondOrderShape {
    /// Writes the constants fixed by this shape into `coefficients`.
    pub fn apply_fixed<T: Scalar>(self, coefficients: &mut SecondOrderCoefficients<T>) {
        let (zero, one) = (T::zero(), T::one());
        match self {
            SecondOrderShape::General => {}
            SecondOrderShape::Aliasing => {
                coefficients.c1 = zero;
                coefficients.c2 = zero;
                coefficients.c3 = one;
            }
            SecondOrderShape::LowPass => {
                coefficients.c1 = zero;
                coefficients.c2 = zero;
                coefficients.c4 = one;
            }
            SecondOrderShape::HighPass => {
                coefficients.c1 = one;
                coefficients.c4 = one;
                coefficients.c2 = zero;
                coefficients.c3 = zero;
            }
            SecondOrderShape::BandPass => {
                coefficients.c1 = zero;
                coefficients.c3 = zero;
                coefficients.c4 = one;
            }
            SecondOrderShape::BandStop => {
                coefficients.c1 = one;
                coefficients.c4 = one;
                coefficients.c2 = zero;
            }
        }
    }

    /// Writes the coefficients derived from natural frequency `wn` and damping ratio `zeta`.
    /// Shapes without a frequency mapping leave `coefficients` untouched.
    pub fn apply_natural_frequency<T: Scalar>(
        self,
        coefficients: &mut SecondOrderCoefficients<T>,
        wn: T,
        zeta: T,
    ) {
        let two_zeta_wn = lit::<T>(2.0) * zeta * wn;
        let wn_sq = wn * wn;
        match self {
            SecondOrderShape::General | SecondOrderShape::Aliasing => {}
            SecondOrderShape::LowPass => {
                coefficients.c5 = two_zeta_wn;
                coefficients.c3 = wn_sq;
                coefficients.c6 = wn_sq;
            }
            SecondOrderShape::HighPass => {
                coefficients.c5 = two_zeta_wn;
                coefficients.c6 = wn_sq;
            }
            SecondOrderShape::BandPass => {
                coefficients.c2 = two_zeta_wn;
                coefficients.c5 = two_zeta_wn;
                coefficients.c6 = wn_sq;
            }
            SecondOrderShape::BandStop => {
                coefficients.c5 = two_zeta_wn;
                coefficients.c3 = wn_sq;
                coefficients.c6 = wn_sq;
            }
        }
    }

    /// Whether this shape derives coefficients from a natural frequency and damping ratio.
    pub fn is_frequency_parametrized(self) -> bool {
        !matches!(self, SecondOrderShape::General | SecondOrderShape::Aliasing)
    }
}

/// A second-order discrete filter: a [`SecondOrderKernel`] tagged with a [`SecondOrderShape`].
///
/// Initialization pre-warms the output to the steady-state response `(c3 / c6) · target`,
/// so no transient follows the first step.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SecondOrderFilter<T> {
    state: FilterState<T>,
    kernel: SecondOrderKernel<T>,
    shape: SecondOrderShape,
    natural_frequency: T,
    damping_ratio: T,
}

impl<T: Scalar> SecondOrderFilter<T> {
    fn from_shape(shape: SecondOrderShape, mut coefficients: SecondOrderCoefficients<T>) -> Self {
        shape.apply_fixed(&mut coefficients);
        Self {
            state: FilterState::new(),
            kernel: SecondOrderKernel::new(coefficients),
            shape,
            natural_frequency: lit(DEFAULT_NATURAL_FREQUENCY),
            damping_ratio: T::FRAC_1_SQRT_2(),
        }
    }

    fn parametrized(shape: SecondOrderShape, wn: T, zeta: T) -> Result<Self, FilterConfigError> {
        let mut filter = Self::from_shape(shape, SecondOrderCoefficients::zeroed());
        filter.set_natural_frequency(wn, zeta)?;
        Ok(filter)
    }

    /// A filter realizing arbitrary coefficients.
    pub fn general(coefficients: SecondOrderCoefficients<T>) -> Result<Self, FilterConfigError> {
        coefficients.validate()?;
        Ok(Self::from_shape(SecondOrderShape::General, coefficients))
    }

    /// Aliasing filter `1 / (c4·s² + c5·s + c6)`.
    pub fn aliasing(c4: T, c5: T, c6: T) -> Result<Self, FilterConfigError> {
        let zero = T::zero();
        let coefficients = SecondOrderCoefficients::new(zero, zero, zero, c4, c5, c6);
        coefficients.validate()?;
        Ok(Self::from_shape(SecondOrderShape::Aliasing, coefficients))
    }

    /// Low-pass filter with natural frequency `wn` and damping ratio `zeta`.
    pub fn low_pass(wn: T, zeta: T) -> Result<Self, FilterConfigError> {
        Self::parametrized(SecondOrderShape::LowPass, wn, zeta)
    }

    /// High-pass filter with natural frequency `wn` and damping ratio `zeta`.
    pub fn high_pass(wn: T, zeta: T) -> Result<Self, FilterConfigError> {
        Self::parametrized(SecondOrderShape::HighPass, wn, zeta)
    }

    /// Band-pass filter centered on `wn`.
    pub fn band_pass(wn: T, zeta: T) -> Result<Self, FilterConfigError> {
        Self::parametrized(SecondOrderShape::BandPass, wn, zeta)
    }

    /// Band-stop (notch) filter centered on `wn`.
    pub fn band_stop(wn: T, zeta: T) -> Result<Self, FilterConfigError> {
        Self::parametrized(SecondOrderShape::BandStop, wn, zeta)
    }

    /// A frequency-parametrized shape at `ωn = 80`, `ζ = 1/√2`.
    ///
    /// `General` and `Aliasing` have no frequency mapping and come out with zeroed free
    /// coefficients, which makes every step a no-op until they are set.
    pub fn with_default_tuning(shape: SecondOrderShape) -> Self {
        let mut filter = Self::from_shape(shape, SecondOrderCoefficients::zeroed());
        let (wn, zeta) = (filter.natural_frequency, filter.damping_ratio);
        shape.apply_natural_frequency(&mut filter.kernel.coefficients, wn, zeta);
        filter
    }

    /// The shape this filter realizes.
    pub fn shape(&self) -> SecondOrderShape {
        self.shape
    }

    /// The underlying recurrence.
    pub fn kernel(&self) -> &SecondOrderKernel<T> {
        &self.kernel
    }

    /// The continuous transfer function coefficients.
    pub fn coefficients(&self) -> &SecondOrderCoefficients<T> {
        self.kernel.coefficients()
    }

    /// Last target value.
    pub fn input(&self) -> T {
        self.state.input()
    }

    /// Natural frequency last applied.
    pub fn natural_frequency(&self) -> T {
        self.natural_frequency
    }

    /// Damping ratio last applied.
    pub fn damping_ratio(&self) -> T {
        self.damping_ratio
    }

    /// Sets the natural frequency and damping ratio and re-derives the coefficients.
    ///
    /// Both must be finite and non-negative. On `General` and `Aliasing` filters the values are
    /// recorded but the coefficients are left alone.
    pub fn set_natural_frequency(&mut self, wn: T, zeta: T) -> Result<(), FilterConfigError> {
        if !wn.is_finite() || wn < T::zero() {
            return Err(FilterConfigError::InvalidNaturalFrequency);
        }
        if !zeta.is_finite() || zeta < T::zero() {
            return Err(FilterConfigError::InvalidDampingRatio);
        }

        self.natural_frequency = wn;
        self.damping_ratio = zeta;
        self.shape
            .apply_natural_frequency(&mut self.kernel.coefficients, wn, zeta);
        Ok(())
    }

    /// Replaces the coefficients. The constants fixed by the shape are reapplied on top, so
    /// e.g. a low-pass filter keeps `c1 = c2 = 0`, `c4 = 1`. History is preserved.
    pub fn set_coefficients(
        &mut self,
        mut coefficients: SecondOrderCoefficients<T>,
    ) -> Result<(), FilterConfigError> {
        coefficients.validate()?;
        self.shape.apply_fixed(&mut coefficients);
        self.kernel.coefficients = coefficients;
        Ok(())
    }

    /// Replaces the coefficients, then steps.
    pub fn step_with(
        &mut self,
        target: T,
        dt: T,
        coefficients: SecondOrderCoefficients<T>,
    ) -> Result<T, FilterConfigError> {
        self.set_coefficients(coefficients)?;
        Ok(self.step(target, dt))
    }
}

impl<T: Scalar> Filter<T> for SecondOrderFilter<T> {
    fn set(&mut self, target: T) {
        self.state.set_input(target);
    }

    fn get(&self) -> T {
        self.state.output()
    }

    fn init(&mut self) {
        let input = self.state.input();
        let output = self.kernel.coefficients.dc_gain() * input;
        self.kernel.prime(input, output);
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

        if let Some(output) = self.kernel.advance(target, dt) {
            self.state.set_output(output);
        }
        self.state.output()
    }

    fn phase(&self) -> Phase {
        self.state.phase()
    }
}

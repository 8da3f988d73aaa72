// PID controller with selectable integration scheme and reset-on-stop anti-windup
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

use crate::filter::{lit, Scalar};

/// How the three terms are combined into the output.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PidType {
    /// Parallel form: `Kp·e + I + Kd·de/dt`.
    #[default]
    Ideal,
    /// Series form: `Kp·(e + I + Kd·de/dt)`.
    Standard,
}

/// Numerical scheme used to accumulate the integral term.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IntegratorType {
    /// Forward rectangle: `Ki·dt·e[k]`.
    #[default]
    Rectangular,
    /// Trapezoid: `Ki/2·dt·(e[k] + e[k-1])`.
    Trapezoidal,
    /// Second-order Adams-Bashforth: `Ki·dt·(3/2·e[k] − 1/2·e[k-1])`.
    AdamsBashforth2,
    /// Third-order Adams-Bashforth: `Ki/12·dt·(23·e[k] − 16·e[k-1] + 5·e[k-2])`.
    AdamsBashforth3,
}

impl IntegratorType {
    /// The increment added to the integral accumulator this tick.
    pub fn delta<T: Scalar>(self, ki: T, dt: T, error: T, error_prev: T, error_prev2: T) -> T {
        match self {
            IntegratorType::Rectangular => ki * dt * error,
            IntegratorType::Trapezoidal => ki / lit::<T>(2.0) * dt * (error + error_prev),
            IntegratorType::AdamsBashforth2 => {
                ki * dt * (lit::<T>(1.5) * error - lit::<T>(0.5) * error_prev)
            }
            IntegratorType::AdamsBashforth3 => {
                ki / lit::<T>(12.0)
                    * dt
                    * (lit::<T>(23.0) * error - lit::<T>(16.0) * error_prev
                        + lit::<T>(5.0) * error_prev2)
            }
        }
    }
}

/// Errors raised when a PID gain cannot be used.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PidConfigError {
    /// The proportional gain is NaN or infinite.
    #[cfg_attr(feature = "std", error("Proportional gain must be finite"))]
    InvalidProportionalGain,
    /// The integral gain is NaN or infinite.
    #[cfg_attr(feature = "std", error("Integral gain must be finite"))]
    InvalidIntegralGain,
    /// The derivative gain is NaN or infinite.
    #[cfg_attr(feature = "std", error("Derivative gain must be finite"))]
    InvalidDerivativeGain,
}

/// Gains and scheme selections of a PID controller.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PidConfig<T> {
    /// Proportional gain coefficient.
    /// Defaults to 1.0.
    kp: T,

    /// Integral gain coefficient.
    /// Defaults to 0.0.
    ki: T,

    /// Derivative gain coefficient.
    /// Defaults to 0.0.
    kd: T,

    /// Parallel or series combination of the terms.
    /// Defaults to `Ideal`.
    pid_type: PidType,

    /// Integration scheme of the integral term.
    /// Defaults to `Rectangular`.
    integrator_type: IntegratorType,
}

impl<T: Scalar> Default for PidConfig<T> {
    fn default() -> Self {
        PidConfig {
            kp: T::one(),
            ki: T::zero(),
            kd: T::zero(),
            pid_type: PidType::Ideal,
            integrator_type: IntegratorType::Rectangular,
        }
    }
}

impl<T: Scalar> PidConfig<T> {
    /// Returns the proportional gain.
    pub fn kp(&self) -> T {
        self.kp
    }

    /// Returns the integral gain.
    pub fn ki(&self) -> T {
        self.ki
    }

    /// Returns the derivative gain.
    pub fn kd(&self) -> T {
        self.kd
    }

    /// Convenience method that returns the proportional, integral, and derivative gains together as a tuple.
    pub fn gains(&self) -> (T, T, T) {
        (self.kp, self.ki, self.kd)
    }

    /// Returns how the terms are combined.
    pub fn pid_type(&self) -> PidType {
        self.pid_type
    }

    /// Returns the integration scheme.
    pub fn integrator_type(&self) -> IntegratorType {
        self.integrator_type
    }

    /// Sets the proportional gain.
    ///
    /// Any finite gain is accepted; choosing gains that stabilize the loop is up to the caller.
    ///
    /// # Errors
    /// - `InvalidProportionalGain` if the gain is NaN or infinite.
    pub fn set_kp(&mut self, kp: T) -> Result<(), PidConfigError> {
        if !kp.is_finite() {
            return Err(PidConfigError::InvalidProportionalGain);
        }
        self.kp = kp;
        Ok(())
    }

    /// Sets the integral gain.
    ///
    /// # Errors
    /// - `InvalidIntegralGain` if the gain is NaN or infinite.
    pub fn set_ki(&mut self, ki: T) -> Result<(), PidConfigError> {
        if !ki.is_finite() {
            return Err(PidConfigError::InvalidIntegralGain);
        }
        self.ki = ki;
        Ok(())
    }

    /// Sets the derivative gain.
    ///
    /// # Errors
    /// - `InvalidDerivativeGain` if the gain is NaN or infinite.
    pub fn set_kd(&mut self, kd: T) -> Result<(), PidConfigError> {
        if !kd.is_finite() {
            return Err(PidConfigError::InvalidDerivativeGain);
        }
        self.kd = kd;
        Ok(())
    }

    /// Convenience method to set the proportional, integral, and derivative gains together.
    ///
    /// Either all three gains are applied or none is.
    pub fn set_gains(&mut self, kp: T, ki: T, kd: T) -> Result<(), PidConfigError> {
        let mut staged = *self;
        staged.set_kp(kp)?;
        staged.set_ki(ki)?;
        staged.set_kd(kd)?;
        *self = staged;
        Ok(())
    }

    /// Sets how the terms are combined.
    pub fn set_pid_type(&mut self, pid_type: PidType) {
        self.pid_type = pid_type;
    }

    /// Sets the integration scheme.
    pub fn set_integrator_type(&mut self, integrator_type: IntegratorType) {
        self.integrator_type = integrator_type;
    }
}

/// Builds a [`PidConfig`], validating every gain at `build` time.
///
/// ```rust
/// use tustin_control::pid::{IntegratorType, PidConfigBuilder, PidType};
///
/// let config = PidConfigBuilder::default()
///     .kp(2.0)
///     .ki(0.5)
///     .pid_type(PidType::Standard)
///     .integrator_type(IntegratorType::Trapezoidal)
///     .build()
///     .expect("Invalid PID config");
/// assert_eq!(config.gains(), (2.0, 0.5, 0.0));
/// ```
#[derive(Copy, Clone, Debug)]
pub struct PidConfigBuilder<T> {
    config: PidConfig<T>,
}

impl<T: Scalar> Default for PidConfigBuilder<T> {
    fn default() -> Self {
        Self {
            config: PidConfig::default(),
        }
    }
}

impl<T: Scalar> PidConfigBuilder<T> {
    pub fn kp(mut self, kp: T) -> Self {
        self.config.kp = kp;
        self
    }

    pub fn ki(mut self, ki: T) -> Self {
        self.config.ki = ki;
        self
    }

    pub fn kd(mut self, kd: T) -> Self {
        self.config.kd = kd;
        self
    }

    pub fn pid_type(mut self, pid_type: PidType) -> Self {
        self.config.pid_type = pid_type;
        self
    }

    pub fn integrator_type(mut self, integrator_type: IntegratorType) -> Self {
        self.config.integrator_type = integrator_type;
        self
    }

    /// Validates the gains and returns the configuration.
    pub fn build(self) -> Result<PidConfig<T>, PidConfigError> {
        let mut config = PidConfig::default();
        config.set_gains(self.config.kp, self.config.ki, self.config.kd)?;
        config.set_pid_type(self.config.pid_type);
        config.set_integrator_type(self.config.integrator_type);
        Ok(config)
    }
}

/// The transient state of a PID controller.
///
/// A context is always ready: every accumulator starts at zero and there is no
/// initialization phase.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PidContext<T> {
    integration: T,
    derivative: T,
    error: T,
    error_prev: T,
    error_prev2: T,
    output: T,
    stop: bool,
}

impl<T: Scalar> Default for PidContext<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar> PidContext<T> {
    /// Creates a zeroed context with integration enabled.
    pub fn new() -> Self {
        Self {
            integration: T::zero(),
            derivative: T::zero(),
            error: T::zero(),
            error_prev: T::zero(),
            error_prev2: T::zero(),
            output: T::zero(),
            stop: false,
        }
    }

    /// Last computed output.
    pub fn output(&self) -> T {
        self.output
    }

    /// Integral accumulator.
    pub fn integration(&self) -> T {
        self.integration
    }

    /// Backward-difference derivative of the error computed on the last tick.
    pub fn derivative(&self) -> T {
        self.derivative
    }

    /// Error supplied on the last tick.
    pub fn error(&self) -> T {
        self.error
    }

    /// Error supplied one tick before the last.
    pub fn error_prev(&self) -> T {
        self.error_prev
    }

    /// Error supplied two ticks before the last.
    pub fn error_prev2(&self) -> T {
        self.error_prev2
    }

    /// Whether the anti-windup stop is engaged.
    pub fn stop(&self) -> bool {
        self.stop
    }

    /// Engages or releases the anti-windup stop.
    ///
    /// While engaged, every tick clears the integral accumulator to zero. Releasing the stop
    /// lets the accumulator grow again from zero; the value held before the stop is not restored.
    pub fn set_stop(&mut self, stop: bool) {
        self.stop = stop;
    }
}

/// A functional implementation of a PID (Proportional-Integral-Derivative) controller.
///
/// This struct represents a PID controller, which computes the control output from
/// proportional, integral, and derivative terms of a supplied error. This implementation is
/// stateless so a context object must be passed in and returned with each call to `compute`.
///
/// ```rust
/// use tustin_control::pid::{FuncPidController, PidConfigBuilder, PidContext};
///
/// let config = PidConfigBuilder::default()
///     .kp(2.0)
///     .ki(0.2)
///     .build()
///     .expect("Invalid PID config");
/// let pid = FuncPidController::new(config);
/// let ctx = PidContext::new();
///
/// let (output, ctx) = pid.compute(ctx, 1.0, 0.01);
/// assert_eq!(output, ctx.output());
/// ```
#[derive(Copy, Clone, Debug)]
pub struct FuncPidController<T> {
    config: PidConfig<T>,
}

/// A stateful implementation of a PID (Proportional-Integral-Derivative) controller.
///
/// This implementation maintains its own [`PidContext`], so it can be used without passing a
/// context object.
///
/// ```rust
/// use tustin_control::pid::{PidConfig, PidController};
///
/// let mut pid = PidController::new(PidConfig::default());
/// assert!(pid.config_mut().set_ki(0.5).is_ok());
///
/// let output = pid.step(1.0, 0.01, false);
/// assert_eq!(output, pid.output());
/// ```
#[derive(Copy, Clone, Debug)]
pub struct PidController<T> {
    ctx: PidContext<T>,
    controller: FuncPidController<T>,
}

impl<T: Scalar> FuncPidController<T> {
    pub fn new(config: PidConfig<T>) -> Self {
        FuncPidController { config }
    }

    pub fn config(&self) -> &PidConfig<T> {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut PidConfig<T> {
        &mut self.config
    }

    /// Advances the controller by one tick of length `dt` with the given `error`.
    ///
    /// `dt` must be strictly positive; with `dt = 0` the derivative term is infinite or NaN.
    /// The derivative always uses a backward difference, whichever integration scheme is
    /// selected.
    pub fn compute(&self, mut ctx: PidContext<T>, error: T, dt: T) -> (T, PidContext<T>) {
        ctx.error = error;
        ctx.derivative = (error - ctx.error_prev) / dt;

        if ctx.stop {
            ctx.integration = T::zero();
        } else {
            ctx.integration = ctx.integration
                + self.config.integrator_type.delta(
                    self.config.ki,
                    dt,
                    error,
                    ctx.error_prev,
                    ctx.error_prev2,
                );
        }

        let PidConfig { kp, kd, .. } = self.config;
        ctx.output = match self.config.pid_type {
            PidType::Ideal => kp * error + ctx.integration + kd * ctx.derivative,
            PidType::Standard => kp * (error + ctx.integration + kd * ctx.derivative),
        };

        ctx.error_prev2 = ctx.error_prev;
        ctx.error_prev = error;
        (ctx.output, ctx)
    }
}

impl<T: Scalar> PidController<T> {
    pub fn new(config: PidConfig<T>) -> Self {
        Self {
            ctx: PidContext::new(),
            controller: FuncPidController::new(config),
        }
    }

    pub fn config(&self) -> &PidConfig<T> {
        &self.controller.config
    }

    pub fn config_mut(&mut self) -> &mut PidConfig<T> {
        &mut self.controller.config
    }

    pub fn context(&self) -> &PidContext<T> {
        &self.ctx
    }

    /// Advances the controller by one tick. `stop` engages the anti-windup reset for this tick
    /// and remains in effect until a later tick passes `false`.
    pub fn step(&mut self, error: T, dt: T, stop: bool) -> T {
        self.ctx.set_stop(stop);
        let (output, ctx) = self.controller.compute(self.ctx, error, dt);
        self.ctx = ctx;
        output
    }

    /// Last computed output.
    pub fn output(&self) -> T {
        self.ctx.output()
    }

    /// Integral accumulator.
    pub fn integration(&self) -> T {
        self.ctx.integration()
    }

    /// Clears the accumulator, error history, output and stop flag. Gains and type selections
    /// are kept.
    pub fn reset(&mut self) {
        self.ctx = PidContext::new();
    }
}

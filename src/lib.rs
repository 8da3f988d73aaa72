#![warn(missing_docs)]

//! # Tustin Control Library
//!
//! This library provides discrete-time control filters and a PID controller in Rust.
//!
//! Every filter approximates a continuous transfer function with the Tustin (bilinear) transform
//! and is advanced one caller-supplied time step at a time. The PID controller comes in the same
//! functional and stateful flavors.
//!
//! ## Features
//!
//! - First-order filters on a single recurrence kernel:
//!   - Integrator, derivator, lag (low-pass), washout (high-pass), lead-lag, or arbitrary
//!     `(c1·s + c2) / (c3·s + c4)`.
//!
//! - Second-order filters on a single two-pole recurrence kernel:
//!   - Low-pass, high-pass, band-pass and band-stop parametrized by natural frequency and damping
//!     ratio, an aliasing filter, or arbitrary `(c1·s² + c2·s + c3) / (c4·s² + c5·s + c6)`.
//!   - Initialization pre-warms the output to the steady-state response, avoiding a startup
//!     transient.
//!
//! - PID control:
//!   - Ideal (parallel) or standard (series) form.
//!   - Rectangular, trapezoidal, or 2nd/3rd order Adams-Bashforth integration.
//!   - Reset-on-stop anti-windup.
//!
//! A recurrence whose denominator vanishes for the supplied time step is skipped and the output
//! is held. Time steps are trusted to be strictly positive.
//!
//! ## Usage
//!
//! ### Filters
//!
//! ```rust
//! use tustin_control::filter::Filter;
//! use tustin_control::second_order::SecondOrderFilter;
//!
//! let mut lpf = SecondOrderFilter::low_pass(20.0_f64, core::f64::consts::FRAC_1_SQRT_2)
//!     .expect("Invalid filter parameters");
//!
//! // The first step initializes the filter from its target
//! let output = lpf.step(1.0, 0.001);
//! assert!((output - 1.0).abs() < 1e-12);
//! ```
//!
//! ### Functional PID Controller
//!
//! ```rust
//! use tustin_control::pid::{FuncPidController, IntegratorType, PidConfigBuilder, PidContext};
//!
//! let config = PidConfigBuilder::default()
//!     .kp(2.0)
//!     .ki(0.2)
//!     .integrator_type(IntegratorType::AdamsBashforth2)
//!     .build()
//!     .expect("Invalid PID config");
//! let pid = FuncPidController::new(config);
//! let ctx = PidContext::<f64>::new();
//!
//! let (output, ctx) = pid.compute(ctx, 0.5, 0.01);
//! assert_eq!(output, ctx.output());
//! ```
//!
//! ### Stateful PID Controller
//!
//! ```rust
//! use tustin_control::pid::{PidConfig, PidController};
//!
//! let mut pid = PidController::new(PidConfig::<f64>::default());
//! assert!(pid.config_mut().set_kp(2.0).is_ok());
//!
//! let output = pid.step(0.5, 0.01, false);
//! assert_eq!(output, 1.0);
//! ```
//!
//! ## License
//!
#![no_std]

#[cfg(feature = "std")]
extern crate std;

macro_rules! trace_skip {
    ($($arg:tt)*) => {
        #[cfg(feature = "defmt")]
        defmt::trace!($($arg)*);
    };
}

/// The filter state machine and the contract shared by every filter.
pub mod filter;

/// First-order recurrence kernel and shapes.
pub mod first_order;

/// Second-order recurrence kernel and shapes.
pub mod second_order;

/// The PID controller.
pub mod pid;

#[doc(hidden)]
#[cfg(feature = "simulation")]
pub mod sim;

#[doc = include_str!("../README.md")]
#[cfg(doctest)]
pub struct ReadmeDoctests;

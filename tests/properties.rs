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

//! Property-based tests over randomized inputs and tunings.

use tustin_control::filter::Filter;
use tustin_control::first_order::FirstOrderFilter;
use tustin_control::pid::{IntegratorType, PidConfigBuilder, PidController, PidContext};
use tustin_control::second_order::SecondOrderFilter;

use proptest::prelude::*;

fn integrator_type() -> impl Strategy<Value = IntegratorType> {
    prop_oneof![
        Just(IntegratorType::Rectangular),
        Just(IntegratorType::Trapezoidal),
        Just(IntegratorType::AdamsBashforth2),
        Just(IntegratorType::AdamsBashforth3),
    ]
}

proptest! {
    #[test]
    fn low_pass_output_stays_finite_and_bounded(
        wn in 1.0f64..200.0,
        zeta in 0.3f64..2.0,
        inputs in prop::collection::vec(-1.0f64..1.0, 1..200),
    ) {
        let mut filter = SecondOrderFilter::low_pass(wn, zeta).unwrap();
        for input in inputs {
            let output = filter.step(input, 0.001);
            prop_assert!(output.is_finite());
            // Worst-case gain for ζ ≥ 0.3 is about 2.2
            prop_assert!(output.abs() < 4.0);
        }
    }

    #[test]
    fn get_is_idempotent(
        corner in 0.1f64..100.0,
        inputs in prop::collection::vec(-10.0f64..10.0, 1..50),
    ) {
        let mut filter = FirstOrderFilter::lag(corner).unwrap();
        for input in inputs {
            filter.step(input, 0.01);
            let output = filter.get();
            prop_assert_eq!(filter.get(), output);
        }
    }

    #[test]
    fn first_order_reset_restores_fresh_filter(
        corner in 0.1f64..100.0,
        inputs in prop::collection::vec(-10.0f64..10.0, 1..50),
    ) {
        let fresh = FirstOrderFilter::washout(corner).unwrap();
        let mut filter = fresh;
        for input in &inputs {
            filter.step(*input, 0.01);
        }
        filter.reset();
        prop_assert_eq!(filter, fresh);

        // And it then replays identically
        let mut replay = fresh;
        for input in &inputs {
            prop_assert_eq!(filter.step(*input, 0.01), replay.step(*input, 0.01));
        }
    }

    #[test]
    fn pid_reset_restores_fresh_context(
        kp in -10.0f64..10.0,
        ki in -10.0f64..10.0,
        kd in -1.0f64..1.0,
        scheme in integrator_type(),
        errors in prop::collection::vec((-5.0f64..5.0, any::<bool>()), 1..50),
    ) {
        let config = PidConfigBuilder::default()
            .kp(kp)
            .ki(ki)
            .kd(kd)
            .integrator_type(scheme)
            .build()
            .unwrap();
        let mut pid = PidController::new(config);
        for (error, stop) in errors {
            pid.step(error, 0.01, stop);
        }
        pid.reset();
        prop_assert_eq!(*pid.context(), PidContext::new());
        prop_assert_eq!(*pid.config(), config);
    }

    #[test]
    fn stop_always_zeroes_integration(
        ki in -10.0f64..10.0,
        scheme in integrator_type(),
        errors in prop::collection::vec(-5.0f64..5.0, 1..20),
    ) {
        let config = PidConfigBuilder::default().ki(ki).integrator_type(scheme).build().unwrap();
        let mut pid = PidController::new(config);
        for error in &errors {
            pid.step(*error, 0.01, false);
        }
        pid.step(1.0, 0.01, true);
        prop_assert_eq!(pid.integration(), 0.0);
    }
}

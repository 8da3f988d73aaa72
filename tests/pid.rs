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

use fixtures::test_pid;

use tustin_control::pid::{
    IntegratorType, PidConfig, PidConfigBuilder, PidConfigError, PidContext, PidType,
};

use approx::assert_relative_eq;

mod test_pid_config {

    use core::f64;

    use super::test_pid::make_controller;
    use super::*;

    const NEW_GAIN: f64 = 10.0;
    // Only non-finite gains are invalid
    const INVALID_GAIN_VALUES: &[f64; 3] = &[f64::INFINITY, f64::NEG_INFINITY, f64::NAN];

    #[test]
    fn test_defaults() {
        let config = PidConfig::<f64>::default();
        assert_eq!(config.gains(), (1.0, 0.0, 0.0));
        assert_eq!(config.pid_type(), PidType::Ideal);
        assert_eq!(config.integrator_type(), IntegratorType::Rectangular);
    }

    #[test]
    fn test_get_and_set_kp() {
        let (mut pid, _) = make_controller();
        let config = pid.config_mut();

        assert!(config.set_kp(NEW_GAIN).is_ok());
        assert_eq!(config.kp(), NEW_GAIN);

        // Negative and zero gains are accepted
        assert!(config.set_kp(-1.0).is_ok());
        assert!(config.set_kp(0.0).is_ok());
        assert!(config.set_kp(NEW_GAIN).is_ok());

        for it in INVALID_GAIN_VALUES {
            assert_eq!(
                config.set_kp(*it),
                Err(PidConfigError::InvalidProportionalGain)
            );

            // Failing to set kp should not change the value
            assert_eq!(config.kp(), NEW_GAIN);
        }
    }

    #[test]
    fn test_get_and_set_ki() {
        let (mut pid, _) = make_controller();
        let config = pid.config_mut();

        assert!(config.set_ki(NEW_GAIN).is_ok());
        assert_eq!(config.ki(), NEW_GAIN);

        for it in INVALID_GAIN_VALUES {
            assert_eq!(config.set_ki(*it), Err(PidConfigError::InvalidIntegralGain));
            assert_eq!(config.ki(), NEW_GAIN);
        }
    }

    #[test]
    fn test_get_and_set_kd() {
        let (mut pid, _) = make_controller();
        let config = pid.config_mut();

        assert!(config.set_kd(NEW_GAIN).is_ok());
        assert_eq!(config.kd(), NEW_GAIN);

        for it in INVALID_GAIN_VALUES {
            assert_eq!(
                config.set_kd(*it),
                Err(PidConfigError::InvalidDerivativeGain)
            );
            assert_eq!(config.kd(), NEW_GAIN);
        }
    }

    #[test]
    fn test_set_gains_is_all_or_nothing() {
        let mut config = PidConfig::<f64>::default();
        assert!(config.set_gains(1.0, 2.0, 3.0).is_ok());
        assert_eq!(config.gains(), (1.0, 2.0, 3.0));

        assert_eq!(
            config.set_gains(4.0, 5.0, f64::NAN),
            Err(PidConfigError::InvalidDerivativeGain)
        );
        assert_eq!(config.gains(), (1.0, 2.0, 3.0));
    }

    #[test]
    fn test_build_gains() {
        let built_config = PidConfigBuilder::default()
            .kp(NEW_GAIN)
            .ki(2.0)
            .kd(0.5)
            .build();
        assert!(built_config.is_ok());
        assert_eq!(built_config.unwrap().gains(), (NEW_GAIN, 2.0, 0.5));

        for it in INVALID_GAIN_VALUES {
            assert_eq!(
                PidConfigBuilder::default().kp(*it).build().map(|_| ()),
                Err(PidConfigError::InvalidProportionalGain)
            );
            assert_eq!(
                PidConfigBuilder::default().ki(*it).build().map(|_| ()),
                Err(PidConfigError::InvalidIntegralGain)
            );
            assert_eq!(
                PidConfigBuilder::default().kd(*it).build().map(|_| ()),
                Err(PidConfigError::InvalidDerivativeGain)
            );
        }
    }

    #[test]
    fn test_build_selections() {
        let built_config = PidConfigBuilder::<f64>::default()
            .pid_type(PidType::Standard)
            .integrator_type(IntegratorType::AdamsBashforth3)
            .build()
            .unwrap();
        assert_eq!(built_config.pid_type(), PidType::Standard);
        assert_eq!(
            built_config.integrator_type(),
            IntegratorType::AdamsBashforth3
        );
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_error_messages() {
        assert_eq!(
            PidConfigError::InvalidIntegralGain.to_string(),
            "Integral gain must be finite"
        );
    }
}

mod test_pid_terms {

    use super::test_pid::{make_controller, make_integrating_controller, make_stateful_controller};
    use super::*;

    const DT: f64 = 0.01;
    const ERROR: f64 = 3.0;
    const KI: f64 = 2.0;
    const N_STEPS: usize = 100;

    #[test]
    fn test_pure_proportional_control() {
        let (pid, ctx) = make_controller();
        let (output, ctx) = pid.compute(ctx, 0.5, DT);
        assert_eq!(output, 0.5); // Assuming kp = 1.0
        assert_eq!(ctx.output(), output);

        let mut pid = make_stateful_controller();
        assert_eq!(pid.step(0.5, DT, false), 0.5);
        assert_eq!(pid.output(), 0.5);
    }

    #[test]
    fn test_rectangular_integration_is_exact() {
        let mut pid = make_integrating_controller(KI, IntegratorType::Rectangular);
        for _ in 0..N_STEPS {
            pid.step(ERROR, DT, false);
        }
        assert_relative_eq!(
            pid.integration(),
            KI * DT * ERROR * N_STEPS as f64,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_trapezoidal_integration_starts_from_zero_error() {
        let mut pid = make_integrating_controller(KI, IntegratorType::Trapezoidal);

        pid.step(ERROR, DT, false);
        assert_relative_eq!(pid.integration(), 0.5 * KI * DT * ERROR, epsilon = 1e-12);

        for _ in 1..N_STEPS {
            pid.step(ERROR, DT, false);
        }
        assert_relative_eq!(
            pid.integration(),
            KI * DT * ERROR * (N_STEPS as f64 - 0.5),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_adams_bashforth_2_integration() {
        let mut pid = make_integrating_controller(KI, IntegratorType::AdamsBashforth2);

        pid.step(ERROR, DT, false);
        assert_relative_eq!(pid.integration(), 1.5 * KI * DT * ERROR, epsilon = 1e-12);

        for _ in 1..N_STEPS {
            pid.step(ERROR, DT, false);
        }
        assert_relative_eq!(
            pid.integration(),
            KI * DT * ERROR * (N_STEPS as f64 + 0.5),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_adams_bashforth_3_integration() {
        let mut pid = make_integrating_controller(KI, IntegratorType::AdamsBashforth3);

        pid.step(ERROR, DT, false);
        assert_relative_eq!(
            pid.integration(),
            KI / 12.0 * DT * 23.0 * ERROR,
            epsilon = 1e-12
        );

        pid.step(ERROR, DT, false);
        assert_relative_eq!(
            pid.integration(),
            KI / 12.0 * DT * (23.0 + 7.0) * ERROR,
            epsilon = 1e-12
        );

        for _ in 2..N_STEPS {
            pid.step(ERROR, DT, false);
        }
        let weight = (23.0 + 7.0 + 12.0 * (N_STEPS as f64 - 2.0)) / 12.0;
        assert_relative_eq!(
            pid.integration(),
            KI * DT * ERROR * weight,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_integration_schemes_agree_on_a_ramp() {
        // All schemes integrate e(t) = t; the higher-order ones should be at least as accurate
        // as the rectangle once the startup samples are washed out
        let schemes = [
            IntegratorType::Rectangular,
            IntegratorType::Trapezoidal,
            IntegratorType::AdamsBashforth2,
            IntegratorType::AdamsBashforth3,
        ];
        let n = 1000;
        let expected = 0.5 * (n as f64 * DT).powi(2);
        for scheme in schemes {
            let mut pid = make_integrating_controller(1.0, scheme);
            for k in 0..n {
                pid.step(k as f64 * DT, DT, false);
            }
            assert_relative_eq!(pid.integration(), expected, max_relative = 0.01);
        }
    }

    #[test]
    fn test_derivative_is_backward_difference_for_every_scheme() {
        for scheme in [
            IntegratorType::Rectangular,
            IntegratorType::Trapezoidal,
            IntegratorType::AdamsBashforth2,
            IntegratorType::AdamsBashforth3,
        ] {
            let config = PidConfigBuilder::default()
                .kp(0.0)
                .kd(0.1)
                .integrator_type(scheme)
                .build()
                .unwrap();
            let mut pid = tustin_control::pid::PidController::new(config);
            pid.step(0.0, 0.1, false);
            let output = pid.step(1.0, 0.1, false);

            assert_relative_eq!(pid.context().derivative(), 10.0, epsilon = 1e-12);
            assert_relative_eq!(output, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_ideal_and_standard_forms() {
        let mut config = PidConfigBuilder::default()
            .kp(2.0)
            .ki(1.0)
            .build()
            .unwrap();
        let ideal = tustin_control::pid::FuncPidController::new(config);
        config.set_pid_type(PidType::Standard);
        let standard = tustin_control::pid::FuncPidController::new(config);

        let (ideal_output, ideal_ctx) = ideal.compute(PidContext::new(), 1.0, 0.5);
        let (standard_output, standard_ctx) = standard.compute(PidContext::new(), 1.0, 0.5);

        assert_eq!(ideal_ctx.integration(), 0.5);
        assert_eq!(standard_ctx.integration(), 0.5);
        assert_relative_eq!(ideal_output, 2.5);
        assert_relative_eq!(standard_output, 3.0);
    }

    #[test]
    fn test_zero_time_step_is_not_guarded() {
        let mut pid = make_stateful_controller();
        let output = pid.step(1.0, 0.0, false);
        assert!(pid.context().derivative().is_infinite());
        assert!(!output.is_finite());
    }
}

mod test_pid_anti_windup {

    use super::test_pid::make_integrating_controller;
    use super::*;

    const DT: f64 = 0.1;

    #[test]
    fn test_stop_clears_integration_until_released() {
        let mut pid = make_integrating_controller(1.0, IntegratorType::Rectangular);

        for _ in 0..10 {
            pid.step(1.0, DT, false);
        }
        assert!(pid.integration() > 0.0);

        // Engaging the stop zeroes the accumulator on that tick and every tick it stays engaged
        for _ in 0..5 {
            pid.step(1.0, DT, true);
            assert_eq!(pid.integration(), 0.0);
            assert!(pid.context().stop());
        }

        // Released: the accumulator restarts from zero rather than the value before the stop
        pid.step(1.0, DT, false);
        assert_relative_eq!(pid.integration(), DT, epsilon = 1e-12);
    }

    #[test]
    fn test_stop_in_functional_context() {
        let (mut pid, mut ctx) = super::test_pid::make_controller();
        assert!(!ctx.stop());
        assert!(pid.config_mut().set_ki(1.0).is_ok());

        (_, ctx) = pid.compute(ctx, 1.0, DT);
        assert!(ctx.integration() > 0.0);

        ctx.set_stop(true);
        (_, ctx) = pid.compute(ctx, 1.0, DT);
        assert_eq!(ctx.integration(), 0.0);
    }

    #[test]
    fn test_error_history_shifts_while_stopped() {
        let mut pid = make_integrating_controller(1.0, IntegratorType::AdamsBashforth3);

        for error in [1.0, 2.0, 3.0] {
            pid.step(error, DT, true);
        }
        let ctx = pid.context();
        assert_eq!(ctx.error(), 3.0);
        assert_eq!(ctx.error_prev(), 3.0);
        assert_eq!(ctx.error_prev2(), 2.0);
        assert_eq!(ctx.integration(), 0.0);
    }
}

mod test_pid_lifecycle {

    use super::test_pid::{make_controller, make_stateful_controller};
    use super::*;

    #[test]
    fn test_reset_equals_fresh_controller() {
        let config = PidConfigBuilder::default()
            .kp(1.5)
            .ki(0.7)
            .kd(0.05)
            .pid_type(PidType::Standard)
            .integrator_type(IntegratorType::Trapezoidal)
            .build()
            .unwrap();
        let mut pid = tustin_control::pid::PidController::new(config);

        for k in 0..20 {
            pid.step((k as f64).sin(), 0.01, k % 7 == 0);
        }
        pid.step(1.0, 0.01, true);
        pid.reset();

        assert_eq!(*pid.context(), PidContext::new());
        assert!(!pid.context().stop());
        assert_eq!(pid.output(), 0.0);
        assert_eq!(*pid.config(), config);
    }

    #[test]
    fn test_forwarding_to_stateful_pid_numerical_equivalence() {
        let (mut func_pid, mut ctx) = make_controller();
        let mut stateful_pid = make_stateful_controller();

        assert!(func_pid.config_mut().set_gains(2.0, 0.5, 0.01).is_ok());
        assert!(stateful_pid.config_mut().set_gains(2.0, 0.5, 0.01).is_ok());
        func_pid
            .config_mut()
            .set_integrator_type(IntegratorType::AdamsBashforth2);
        stateful_pid
            .config_mut()
            .set_integrator_type(IntegratorType::AdamsBashforth2);

        let mut expected: f64;
        for k in 0..1000usize {
            let error = (k as f64 * 0.01).sin();
            (expected, ctx) = func_pid.compute(ctx, error, 0.01);
            let result = stateful_pid.step(error, 0.01, false);
            assert_eq!(result, expected);
        }
        assert_eq!(ctx, *stateful_pid.context());
    }
}
